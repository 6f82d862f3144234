use crate::utils::error::{OpsError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(OpsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Loose boolean parsing for values typed at a prompt.
pub fn value_to_boolean(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("vault.endpoint", "https://example.com").is_ok());
        assert!(validate_url("vault.endpoint", "http://localhost:8900/api").is_ok());
        assert!(validate_url("vault.endpoint", "").is_err());
        assert!(validate_url("vault.endpoint", "invalid-url").is_err());
        assert!(validate_url("vault.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("vault.timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("vault.timeout_seconds", 0u64, 1, 600).is_err());
        assert!(validate_range("vault.timeout_seconds", 601u64, 1, 600).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("perms.root_folder", "[Perms]").is_ok());
        assert!(validate_non_empty_string("perms.root_folder", "   ").is_err());
    }

    #[test]
    fn test_value_to_boolean() {
        assert_eq!(value_to_boolean("Yes"), Some(true));
        assert_eq!(value_to_boolean(" off "), Some(false));
        assert_eq!(value_to_boolean("1"), Some(true));
        assert_eq!(value_to_boolean("maybe"), None);
    }
}
