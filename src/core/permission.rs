use crate::utils::error::OpsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PERMISSION_LEVELS: [&str; 5] = ["ro", "rw", "rws", "mgr", "admin"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[serde(rename = "ro")]
    ReadOnly,
    #[serde(rename = "rw")]
    ReadWrite,
    #[serde(rename = "rws")]
    ReadWriteShare,
    #[serde(rename = "mgr")]
    Manager,
    Admin,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::ReadOnly => "ro",
            PermissionLevel::ReadWrite => "rw",
            PermissionLevel::ReadWriteShare => "rws",
            PermissionLevel::Manager => "mgr",
            PermissionLevel::Admin => "admin",
        }
    }

    /// `(manage_records, manage_users, can_edit, can_share)`
    pub fn flags(self) -> PermissionUpdate {
        let (manage_records, manage_users, can_edit, can_share) = match self {
            PermissionLevel::ReadOnly => (false, false, false, false),
            PermissionLevel::ReadWrite => (false, false, true, false),
            PermissionLevel::ReadWriteShare => (false, false, true, true),
            PermissionLevel::Manager => (true, false, true, true),
            PermissionLevel::Admin => (true, true, true, true),
        };
        PermissionUpdate {
            manage_records: Some(manage_records),
            manage_users: Some(manage_users),
            can_edit: Some(can_edit),
            can_share: Some(can_share),
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ro" => Ok(PermissionLevel::ReadOnly),
            "rw" => Ok(PermissionLevel::ReadWrite),
            "rws" => Ok(PermissionLevel::ReadWriteShare),
            "mgr" => Ok(PermissionLevel::Manager),
            "admin" => Ok(PermissionLevel::Admin),
            other => Err(OpsError::ValidationError {
                message: format!(
                    "Invalid permission '{}'. Expected one of: {}",
                    other,
                    PERMISSION_LEVELS.join(", ")
                ),
            }),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team flags on a shared folder. `None` keeps the server's current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionUpdate {
    pub manage_records: Option<bool>,
    pub manage_users: Option<bool>,
    pub can_edit: Option<bool>,
    pub can_share: Option<bool>,
}

impl PermissionUpdate {
    /// Applied for levels that are not recognised.
    pub fn restrictive() -> Self {
        Self {
            manage_records: Some(false),
            manage_users: None,
            can_edit: Some(false),
            can_share: None,
        }
    }
}

pub fn permission_level_to_flags(level: &str) -> PermissionUpdate {
    level
        .parse::<PermissionLevel>()
        .map(PermissionLevel::flags)
        .unwrap_or_else(|_| PermissionUpdate::restrictive())
}
