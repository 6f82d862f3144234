use crate::constants::{
    DEFAULT_CONFIG_FOLDER, DEFAULT_CONFIG_RECORD_TITLE, DEFAULT_ROOT_FOLDER,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OpsError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub vault: VaultConfig,
    pub router: Option<RouterConfig>,
    #[serde(default)]
    pub perms: PermsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Never wrap shared folder keys with a team's RSA key.
    pub forbid_rsa: Option<bool>,
}

/// Router settings fall back to the vault's when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermsConfig {
    pub root_folder: Option<String>,
    pub config_record_title: Option<String>,
    pub config_folder: Option<String>,
}

impl OpsConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpsError::ConfigError {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(path).map_err(OpsError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OpsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OpsError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("vault.endpoint", &self.vault.endpoint)?;

        if let Some(endpoint) = self.router.as_ref().and_then(|r| r.endpoint.as_deref()) {
            validate_url("router.endpoint", endpoint)?;
        }

        if let Some(timeout) = self.vault.timeout_seconds {
            validate_range("vault.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(token) = self.vault.token.as_deref() {
            if token.starts_with("${") {
                return Err(OpsError::InvalidConfigValueError {
                    field: "vault.token".to_string(),
                    value: token.to_string(),
                    reason: "Environment variable is not set".to_string(),
                });
            }
        }

        validate_non_empty_string("perms.root_folder", self.root_folder())?;
        validate_non_empty_string("perms.config_record_title", self.config_record_title())?;
        validate_non_empty_string("perms.config_folder", self.config_folder())?;

        Ok(())
    }
}

impl ConfigProvider for OpsConfig {
    fn vault_endpoint(&self) -> &str {
        &self.vault.endpoint
    }

    fn router_endpoint(&self) -> &str {
        self.router
            .as_ref()
            .and_then(|r| r.endpoint.as_deref())
            .unwrap_or(&self.vault.endpoint)
    }

    fn api_token(&self) -> Option<&str> {
        self.vault.token.as_deref()
    }

    fn router_token(&self) -> Option<&str> {
        self.router
            .as_ref()
            .and_then(|r| r.token.as_deref())
            .or(self.vault.token.as_deref())
    }

    fn timeout_seconds(&self) -> u64 {
        self.vault.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn forbid_rsa(&self) -> bool {
        self.vault.forbid_rsa.unwrap_or(false)
    }

    fn root_folder(&self) -> &str {
        self.perms.root_folder.as_deref().unwrap_or(DEFAULT_ROOT_FOLDER)
    }

    fn config_record_title(&self) -> &str {
        self.perms
            .config_record_title
            .as_deref()
            .unwrap_or(DEFAULT_CONFIG_RECORD_TITLE)
    }

    fn config_folder(&self) -> &str {
        self.perms
            .config_folder
            .as_deref()
            .unwrap_or(DEFAULT_CONFIG_FOLDER)
    }
}

impl Validate for OpsConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[vault]
endpoint = "https://vault.example.com/api"
"#;

        let config = OpsConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.vault_endpoint(), "https://vault.example.com/api");
        assert_eq!(config.router_endpoint(), "https://vault.example.com/api");
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert!(!config.forbid_rsa());
        assert_eq!(config.root_folder(), "[Perms]");
        assert_eq!(config.config_record_title(), "Perms Config");
        assert_eq!(config.config_folder(), "[Perms Config Folder]");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_router_overrides_vault_settings() {
        let toml_content = r#"
[vault]
endpoint = "https://vault.example.com/api"
token = "vault-token"
forbid_rsa = true

[router]
endpoint = "https://router.example.com"

[perms]
root_folder = "[Access]"
"#;

        let config = OpsConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.router_endpoint(), "https://router.example.com");
        assert_eq!(config.router_token(), Some("vault-token"));
        assert!(config.forbid_rsa());
        assert_eq!(config.root_folder(), "[Access]");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COMMANDER_OPS_TEST_TOKEN", "from-env");

        let toml_content = r#"
[vault]
endpoint = "https://vault.example.com"
token = "${COMMANDER_OPS_TEST_TOKEN}"
"#;

        let config = OpsConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_token(), Some("from-env"));
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[vault]
endpoint = "https://vault.example.com"
token = "${COMMANDER_OPS_SURELY_UNSET_VARIABLE}"
"#;

        let config = OpsConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(OpsError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_url = OpsConfig::from_toml_str("[vault]\nendpoint = \"not a url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_timeout = OpsConfig::from_toml_str(
            "[vault]\nendpoint = \"https://vault.example.com\"\ntimeout_seconds = 0\n",
        )
        .unwrap();
        assert!(bad_timeout.validate().is_err());

        let empty_root = OpsConfig::from_toml_str(
            "[vault]\nendpoint = \"https://vault.example.com\"\n[perms]\nroot_folder = \"\"\n",
        )
        .unwrap();
        assert!(empty_root.validate().is_err());
    }

    #[test]
    fn test_missing_vault_section_is_parse_error() {
        let result = OpsConfig::from_toml_str("[perms]\nroot_folder = \"x\"\n");
        assert!(matches!(
            result,
            Err(OpsError::ConfigValidationError { ref field, .. }) if field == "toml_parsing"
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[vault]\nendpoint = \"http://localhost:8080\"").unwrap();

        let config = OpsConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.vault_endpoint(), "http://localhost:8080");

        assert!(matches!(
            OpsConfig::from_file("/definitely/not/here.toml"),
            Err(OpsError::ConfigError { .. })
        ));
    }
}
