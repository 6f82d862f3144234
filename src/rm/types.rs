//! Gateway response documents and the account-type specific "meta" settings
//! that accompany create-user and create-role actions.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RmResponse {
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmScriptResponse {
    pub script: String,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmKeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub connect_database: Option<String>,
    #[serde(default)]
    pub dn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmRole {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub users: Vec<RmUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Str,
    Bool,
    Int,
    Dict,
    KeyValue,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Str => "str",
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::Dict => "dict",
            DataType::KeyValue => "key-value",
        })
    }
}

/// One attribute of a meta DTO. A field without a default must be filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub data_type: DataType,
    pub is_array: bool,
    pub default: Option<Value>,
}

impl FieldSpec {
    fn new(name: &'static str, data_type: DataType, is_array: bool, default: Option<Value>) -> Self {
        Self {
            name,
            data_type,
            is_array,
            default,
        }
    }

    fn text(name: &'static str, default: Option<&str>) -> Self {
        Self::new(name, DataType::Str, false, Some(json!(default)))
    }

    fn required_text(name: &'static str) -> Self {
        Self::new(name, DataType::Str, false, None)
    }

    fn flag(name: &'static str, default: bool) -> Self {
        Self::new(name, DataType::Bool, false, Some(json!(default)))
    }

    fn number(name: &'static str, default: Option<i64>) -> Self {
        Self::new(name, DataType::Int, false, Some(json!(default)))
    }

    fn list(name: &'static str, defaults: &[&str]) -> Self {
        Self::new(name, DataType::Str, true, Some(json!(defaults)))
    }

    fn key_values(name: &'static str) -> Self {
        Self::new(name, DataType::KeyValue, true, Some(json!([])))
    }

    fn dict(name: &'static str) -> Self {
        Self::new(name, DataType::Dict, false, Some(json!({})))
    }

    pub fn required(&self) -> bool {
        self.default.is_none()
    }
}

/// A meta DTO and the attribute table used to build it interactively.
pub trait MetaDto: Serialize + DeserializeOwned {
    fn fields() -> Vec<FieldSpec>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmAwsUserAddMeta {
    pub console_access: Option<bool>,
    pub path: Option<String>,
    pub permission_boundary_arn: Option<String>,
    pub password_reset_required: Option<bool>,
    pub tags: Vec<RmKeyValue>,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
    pub policies: Vec<String>,
}

impl MetaDto for RmAwsUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::flag("console_access", true),
            FieldSpec::text("path", Some("/")),
            FieldSpec::text("permission_boundary_arn", None),
            FieldSpec::flag("password_reset_required", false),
            FieldSpec::key_values("tags"),
            FieldSpec::list("roles", &[]),
            FieldSpec::list("groups", &[]),
            FieldSpec::list("policies", &[]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmAwsRoleAddMeta {
    pub policy_json: String,
    pub description: Option<String>,
}

impl MetaDto for RmAwsRoleAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::required_text("policy_json"),
            FieldSpec::text("description", None),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmAzureUserAddMeta {
    pub account_enabled: Option<bool>,
    pub display_name: Option<String>,
    pub on_premise_immutable_id: Option<String>,
    pub password_reset_required: Option<bool>,
    pub password_reset_required_with_mfa: Option<bool>,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

impl MetaDto for RmAzureUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::flag("account_enabled", true),
            FieldSpec::text("display_name", None),
            FieldSpec::text("on_premise_immutable_id", None),
            FieldSpec::flag("password_reset_required", false),
            FieldSpec::flag("password_reset_required_with_mfa", false),
            FieldSpec::list("roles", &[]),
            FieldSpec::list("groups", &[]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmAzureRoleAddMeta {
    pub policy_json: String,
    pub description: Option<String>,
}

impl MetaDto for RmAzureRoleAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::required_text("policy_json"),
            FieldSpec::text("description", None),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmMySQLUserAddMeta {
    pub authentication_plugin: Option<String>,
    pub authentication_value: Option<String>,
    pub roles: Vec<String>,
}

impl MetaDto for RmMySQLUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("authentication_plugin", None),
            FieldSpec::text("authentication_value", None),
            FieldSpec::list("roles", &[]),
        ]
    }
}

/// Grant lists hold `database.table.column` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmMySQLRoleAddMeta {
    pub grant_select: Vec<String>,
    pub grant_insert: Vec<String>,
    pub grant_update: Vec<String>,
    pub grant_delete: Vec<String>,
    pub grant_create: Vec<String>,
    pub grant_drop: Vec<String>,
    pub grant_alter: Vec<String>,
    pub grant_index: Vec<String>,
    pub grant_execute: Vec<String>,
    pub grant_create_view: Vec<String>,
    pub grant_show_view: Vec<String>,
    pub all_privileges: Vec<String>,
    pub grant_option: Vec<String>,
    pub roles: Vec<String>,
}

impl MetaDto for RmMySQLRoleAddMeta {
    fn fields() -> Vec<FieldSpec> {
        [
            "grant_select",
            "grant_insert",
            "grant_update",
            "grant_delete",
            "grant_create",
            "grant_drop",
            "grant_alter",
            "grant_index",
            "grant_execute",
            "grant_create_view",
            "grant_show_view",
            "all_privileges",
            "grant_option",
            "roles",
        ]
        .into_iter()
        .map(|name| FieldSpec::list(name, &[]))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmPostgreSqlUserAddMeta {
    pub superuser: Option<bool>,
    pub create_db: Option<bool>,
    pub create_role: Option<bool>,
    pub inherit: Option<bool>,
    pub login: Option<bool>,
    pub replication: Option<bool>,
    pub bypass_rls: Option<bool>,
    pub connection_limit: Option<i64>,
    pub valid_until: Option<String>,
    pub roles: Vec<String>,
    pub inc_in_roles: Vec<String>,
    pub inc_in_roles_as_admin: Vec<String>,
    pub sysid: Option<String>,
}

impl MetaDto for RmPostgreSqlUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::flag("superuser", false),
            FieldSpec::flag("create_db", false),
            FieldSpec::flag("create_role", false),
            FieldSpec::flag("inherit", false),
            FieldSpec::flag("login", true),
            FieldSpec::flag("replication", false),
            FieldSpec::flag("bypass_rls", false),
            FieldSpec::number("connection_limit", None),
            FieldSpec::text("valid_until", None),
            FieldSpec::list("roles", &[]),
            FieldSpec::list("inc_in_roles", &[]),
            FieldSpec::list("inc_in_roles_as_admin", &[]),
            FieldSpec::text("sysid", None),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmSqlServerUserAddMeta {
    pub allow_login: bool,
    pub use_windows_auth: bool,
    pub is_reader: bool,
    pub is_writer: bool,
    pub roles: Vec<String>,
}

impl MetaDto for RmSqlServerUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::flag("allow_login", true),
            FieldSpec::flag("use_windows_auth", false),
            FieldSpec::flag("is_reader", true),
            FieldSpec::flag("is_writer", true),
            FieldSpec::list("roles", &[]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmOracleUserAddMeta {
    pub allow_login: bool,
    pub allow_resource: bool,
    pub roles: Vec<String>,
}

impl MetaDto for RmOracleUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::flag("allow_login", true),
            FieldSpec::flag("allow_resource", true),
            FieldSpec::list("roles", &[]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmMongoDbUserAddMeta {
    pub roles: Vec<String>,
}

impl MetaDto for RmMongoDbUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::list("roles", &[])]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmLinuxUserAddMeta {
    pub system_user: Option<bool>,
    pub shell: Option<String>,
    pub no_login: Option<bool>,
    pub home_dir: Option<String>,
    pub do_not_create_home_dir: Option<bool>,
    pub allow_bad_names: Option<bool>,
    pub gecos_full_name: Option<String>,
    pub gecos_room_number: Option<String>,
    pub gecos_work_phone: Option<String>,
    pub gecos_home_phone: Option<String>,
    pub gecos_other: Option<String>,
    pub group: Option<String>,
    pub groups: Vec<String>,
    pub create_group: Option<bool>,
    pub validate_group: Option<bool>,
    pub uid: Option<String>,
    pub selinux_user_context: Option<String>,
    pub btrfs_subvolume: Option<bool>,
    pub system_dir_mode: Option<String>,
    pub non_system_dir_mode: Option<String>,
    pub use_password: Option<bool>,
    pub use_private_key: Option<bool>,
    pub use_private_key_type: Option<String>,
    pub private_key: Option<String>,
    pub authorized_keys: Vec<String>,
}

impl MetaDto for RmLinuxUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::flag("system_user", false),
            FieldSpec::text("shell", None),
            FieldSpec::flag("no_login", false),
            FieldSpec::text("home_dir", None),
            FieldSpec::flag("do_not_create_home_dir", false),
            FieldSpec::flag("allow_bad_names", false),
            FieldSpec::text("gecos_full_name", None),
            FieldSpec::text("gecos_room_number", None),
            FieldSpec::text("gecos_work_phone", None),
            FieldSpec::text("gecos_home_phone", None),
            FieldSpec::text("gecos_other", None),
            FieldSpec::text("group", None),
            FieldSpec::list("groups", &[]),
            FieldSpec::flag("create_group", false),
            FieldSpec::flag("validate_group", true),
            FieldSpec::text("uid", None),
            FieldSpec::text("selinux_user_context", None),
            FieldSpec::flag("btrfs_subvolume", false),
            FieldSpec::text("system_dir_mode", None),
            FieldSpec::text("non_system_dir_mode", None),
            FieldSpec::flag("use_password", true),
            FieldSpec::flag("use_private_key", false),
            FieldSpec::text("use_private_key_type", Some("ecdsa_sha2_nistp521")),
            FieldSpec::text("private_key", None),
            FieldSpec::list("authorized_keys", &[]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmWindowsUserAddMeta {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
    pub expire_days: i64,
    pub groups: Vec<String>,
}

impl MetaDto for RmWindowsUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("display_name", None),
            FieldSpec::text("description", None),
            FieldSpec::flag("disabled", false),
            FieldSpec::number("expire_days", Some(0)),
            FieldSpec::list("groups", &[]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmMacOsUserAddMeta {
    pub display_name: Option<String>,
    pub uid: Option<String>,
    pub gid: Option<String>,
    pub shell: Option<String>,
    pub home_dir: Option<String>,
    pub is_admin: bool,
    pub is_role_account: bool,
    pub groups: Vec<String>,
}

impl MetaDto for RmMacOsUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("display_name", None),
            FieldSpec::text("uid", None),
            FieldSpec::text("gid", None),
            FieldSpec::text("shell", None),
            FieldSpec::text("home_dir", None),
            FieldSpec::flag("is_admin", false),
            FieldSpec::flag("is_role_account", false),
            FieldSpec::list("groups", &[]),
        ]
    }
}

fn ldap_fields(object_class: &[&str]) -> Vec<FieldSpec> {
    vec![
        FieldSpec::list("object_class", object_class),
        FieldSpec::text("dn", None),
        FieldSpec::text("base_dn", None),
        FieldSpec::flag("auto_uid_number", true),
        FieldSpec::flag("gid_number_match_uid", true),
        FieldSpec::text("home_dir_base", Some("/home")),
        FieldSpec::text("first_rdn_component", None),
        FieldSpec::dict("attributes"),
        FieldSpec::list("groups", &[]),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmOpenLdapUserAddMeta {
    pub object_class: Vec<String>,
    pub dn: Option<String>,
    pub base_dn: Option<String>,
    pub auto_uid_number: bool,
    pub gid_number_match_uid: bool,
    pub home_dir_base: Option<String>,
    pub first_rdn_component: Option<String>,
    pub attributes: Option<serde_json::Map<String, Value>>,
    pub groups: Vec<String>,
}

impl MetaDto for RmOpenLdapUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        ldap_fields(&["top", "inetOrgPerson", "posixAccount"])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmAdUserAddMeta {
    pub object_class: Vec<String>,
    pub dn: Option<String>,
    pub base_dn: Option<String>,
    pub auto_uid_number: bool,
    pub gid_number_match_uid: bool,
    pub home_dir_base: Option<String>,
    pub first_rdn_component: Option<String>,
    pub attributes: Option<serde_json::Map<String, Value>>,
    pub groups: Vec<String>,
    pub user_account_control: Option<i64>,
}

impl MetaDto for RmAdUserAddMeta {
    fn fields() -> Vec<FieldSpec> {
        let mut fields = ldap_fields(&["top", "person", "organizationalPerson", "user"]);
        fields.push(FieldSpec::number("user_account_control", Some(512)));
        fields
    }
}
