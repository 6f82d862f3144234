use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    PromptError(#[from] inquire::InquireError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Vault error ({code}): {message}")]
    VaultError { code: String, message: String },

    #[error("Crypto error: {message}")]
    CryptoError { message: String },

    #[error("Gateway error: {message}")]
    GatewayError { message: String },

    #[error("Could not {verb}: {error}")]
    ActionFailed { verb: String, error: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{message}")]
    UsageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Vault,
    Security,
    Gateway,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OpsError {
    pub fn vault(code: &str, message: impl Into<String>) -> Self {
        OpsError::VaultError {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        OpsError::CryptoError {
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        OpsError::UsageError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            OpsError::ApiError(_) => ErrorCategory::Network,
            OpsError::CsvError(_) | OpsError::SerializationError(_) => ErrorCategory::Data,
            OpsError::ValidationError { .. } => ErrorCategory::Data,
            OpsError::IoError(_) => ErrorCategory::System,
            OpsError::PromptError(_) | OpsError::UsageError { .. } => ErrorCategory::Input,
            OpsError::ConfigError { .. }
            | OpsError::ConfigValidationError { .. }
            | OpsError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            OpsError::VaultError { .. } | OpsError::NotFound { .. } => ErrorCategory::Vault,
            OpsError::CryptoError { .. } => ErrorCategory::Security,
            OpsError::GatewayError { .. } | OpsError::ActionFailed { .. } => {
                ErrorCategory::Gateway
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Gateway => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Input | ErrorCategory::Vault => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Security | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OpsError::ApiError(_) => {
                "Check that the vault endpoint is reachable and the API token is valid"
            }
            OpsError::CsvError(_) => "Check the CSV file format and column headers",
            OpsError::IoError(_) => "Check that the file exists and is readable",
            OpsError::SerializationError(_) => "The server returned an unexpected payload",
            OpsError::PromptError(_) => "Re-run the command from an interactive terminal",
            OpsError::ConfigError { .. }
            | OpsError::ConfigValidationError { .. }
            | OpsError::InvalidConfigValueError { .. } => {
                "Review the configuration file passed with --config"
            }
            OpsError::VaultError { .. } => "Run a sync and verify your access to the folder or team",
            OpsError::CryptoError { .. } => "The record or team keys could not be used; re-sync the vault",
            OpsError::GatewayError { .. } => "Make sure the gateway is online and try again",
            OpsError::ActionFailed { .. } => "Check the gateway logs for details",
            OpsError::NotFound { .. } => "Check the name or UID and try again",
            OpsError::ValidationError { .. } => "Fix the reported values and try again",
            OpsError::UsageError { .. } => "Run the command with --help to see its arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OpsError::ApiError(e) if e.is_timeout() => "The request timed out".to_string(),
            OpsError::ApiError(_) => "Could not reach the vault service".to_string(),
            OpsError::IoError(e) => format!("File error: {}", e),
            OpsError::VaultError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsError>;
