//! Gateway action envelope and the per-command input documents.
//!
//! Optional inputs are sent as explicit `null`s.

use crate::utils::encoding::base64_url_encode;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

pub const ACTION_CREATE_USER: &str = "rm-create-user";
pub const ACTION_DELETE_USER: &str = "rm-delete-user";
pub const ACTION_CREATE_ROLE: &str = "rm-create-role";
pub const ACTION_DELETE_ROLE: &str = "rm-delete-role";
pub const ACTION_DELETE_GROUP: &str = "rm-delete-group";
pub const ACTION_ADD_USER_TO_ROLE: &str = "rm-add-user-to-role";
pub const ACTION_ROLE_LIST: &str = "rm-role-list";
pub const ACTION_RUN_SCRIPT: &str = "pam-rm-script";

/// 16 random bytes, base64url without padding.
pub fn conversation_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    base64_url_encode(&bytes)
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayAction<I: Serialize> {
    pub action: &'static str,
    pub is_scheduled: bool,
    pub gateway_destination: Option<String>,
    pub inputs: I,
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
}

impl<I: Serialize> GatewayAction<I> {
    pub fn new(action: &'static str, inputs: I) -> Self {
        Self {
            action,
            is_scheduled: true,
            gateway_destination: None,
            inputs,
            conversation_id: conversation_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInputs {
    pub configuration_uid: String,
    pub user: String,
    pub password: Option<String>,
    pub resource_uid: Option<String>,
    pub meta: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserInputs {
    pub configuration_uid: String,
    pub user: Option<String>,
    pub resource_uid: Option<String>,
    pub user_uid: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleInputs {
    pub configuration_uid: String,
    pub role: String,
    pub resource_uid: Option<String>,
    pub meta: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoleInputs {
    pub configuration_uid: String,
    pub role: String,
    pub resource_uid: Option<String>,
    pub meta: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGroupInputs {
    pub configuration_uid: String,
    pub group: String,
    pub resource_uid: Option<String>,
    pub meta: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserToRoleInputs {
    pub configuration_uid: String,
    pub resource_uid: Option<String>,
    pub user_uid: Option<String>,
    pub user: Option<String>,
    pub role_id: String,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleListInputs {
    pub configuration_uid: String,
    pub resource_uid: Option<String>,
    pub user_uid: Option<String>,
    pub database: Option<String>,
    pub include_roles: Option<Vec<String>>,
    pub exclude_roles: Option<Vec<String>>,
    pub include_users: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunScriptInputs {
    pub configuration_uid: String,
    pub script_content: String,
    pub resource_uid: Option<String>,
    pub user_uid: Option<String>,
    pub dry_run: bool,
}
