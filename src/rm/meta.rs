use crate::domain::model::VaultRecord;
use crate::domain::ports::Prompt;
use crate::rm::types::*;
use crate::utils::display::Painter;
use crate::utils::error::{OpsError, Result};
use crate::utils::validation::value_to_boolean;
use serde_json::{json, Map, Value};
use std::path::Path;

const MAX_DISPLAY_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaClass {
    AwsUser,
    AzureUser,
    MySqlUser,
    PostgreSqlUser,
    SqlServerUser,
    OracleUser,
    MongoDbUser,
    LinuxUser,
    WindowsUser,
    MacOsUser,
    OpenLdapUser,
    AdUser,
    AwsRole,
    AzureRole,
    MySqlRole,
}

/// Editable copy of one meta attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaField {
    pub name: String,
    pub data_type: DataType,
    pub required: bool,
    pub is_array: bool,
    pub value: Value,
}

fn canonical_json<T: MetaDto>(values: Value) -> Result<String> {
    let dto: T = serde_json::from_value(values).map_err(|e| OpsError::ValidationError {
        message: format!("Invalid meta data: {}", e),
    })?;
    Ok(serde_json::to_string(&dto)?)
}

impl MetaClass {
    pub fn field_specs(self) -> Vec<FieldSpec> {
        match self {
            MetaClass::AwsUser => RmAwsUserAddMeta::fields(),
            MetaClass::AzureUser => RmAzureUserAddMeta::fields(),
            MetaClass::MySqlUser => RmMySQLUserAddMeta::fields(),
            MetaClass::PostgreSqlUser => RmPostgreSqlUserAddMeta::fields(),
            MetaClass::SqlServerUser => RmSqlServerUserAddMeta::fields(),
            MetaClass::OracleUser => RmOracleUserAddMeta::fields(),
            MetaClass::MongoDbUser => RmMongoDbUserAddMeta::fields(),
            MetaClass::LinuxUser => RmLinuxUserAddMeta::fields(),
            MetaClass::WindowsUser => RmWindowsUserAddMeta::fields(),
            MetaClass::MacOsUser => RmMacOsUserAddMeta::fields(),
            MetaClass::OpenLdapUser => RmOpenLdapUserAddMeta::fields(),
            MetaClass::AdUser => RmAdUserAddMeta::fields(),
            MetaClass::AwsRole => RmAwsRoleAddMeta::fields(),
            MetaClass::AzureRole => RmAzureRoleAddMeta::fields(),
            MetaClass::MySqlRole => RmMySQLRoleAddMeta::fields(),
        }
    }

    /// Deserializes `values` into the class DTO and serializes it back.
    fn to_json(self, values: Value) -> Result<String> {
        match self {
            MetaClass::AwsUser => canonical_json::<RmAwsUserAddMeta>(values),
            MetaClass::AzureUser => canonical_json::<RmAzureUserAddMeta>(values),
            MetaClass::MySqlUser => canonical_json::<RmMySQLUserAddMeta>(values),
            MetaClass::PostgreSqlUser => canonical_json::<RmPostgreSqlUserAddMeta>(values),
            MetaClass::SqlServerUser => canonical_json::<RmSqlServerUserAddMeta>(values),
            MetaClass::OracleUser => canonical_json::<RmOracleUserAddMeta>(values),
            MetaClass::MongoDbUser => canonical_json::<RmMongoDbUserAddMeta>(values),
            MetaClass::LinuxUser => canonical_json::<RmLinuxUserAddMeta>(values),
            MetaClass::WindowsUser => canonical_json::<RmWindowsUserAddMeta>(values),
            MetaClass::MacOsUser => canonical_json::<RmMacOsUserAddMeta>(values),
            MetaClass::OpenLdapUser => canonical_json::<RmOpenLdapUserAddMeta>(values),
            MetaClass::AdUser => canonical_json::<RmAdUserAddMeta>(values),
            MetaClass::AwsRole => canonical_json::<RmAwsRoleAddMeta>(values),
            MetaClass::AzureRole => canonical_json::<RmAzureRoleAddMeta>(values),
            MetaClass::MySqlRole => canonical_json::<RmMySQLRoleAddMeta>(values),
        }
    }

    /// Meta class for `pam-rm-user-add` against `record`, if it has one.
    pub fn for_user(record: &VaultRecord) -> Result<Option<MetaClass>> {
        match record.record_type.as_str() {
            "pamAwsConfiguration" => return Ok(Some(MetaClass::AwsUser)),
            "pamAzureConfiguration" => return Ok(Some(MetaClass::AzureUser)),
            _ => {}
        }

        let lookup = record.field_lookup();
        let text = |key: &str| lookup.get(key).and_then(Value::as_str).unwrap_or_default();

        match record.record_type.as_str() {
            "pamDatabase" => match text("databaseType") {
                "mysql" | "mariadb" => Ok(Some(MetaClass::MySqlUser)),
                "postgresql" => Ok(Some(MetaClass::PostgreSqlUser)),
                "mssql" => Ok(Some(MetaClass::SqlServerUser)),
                "oracle" => Ok(Some(MetaClass::OracleUser)),
                "mongodb" => Ok(Some(MetaClass::MongoDbUser)),
                _ => Err(OpsError::ValidationError {
                    message: "Database type was not set on the database record.".to_string(),
                }),
            },
            "pamMachine" => match text("operatingSystem") {
                "linux" => Ok(Some(MetaClass::LinuxUser)),
                "windows" => Ok(Some(MetaClass::WindowsUser)),
                "macos" => Ok(Some(MetaClass::MacOsUser)),
                _ => Err(OpsError::ValidationError {
                    message: "Operating system was not set on the machine record.".to_string(),
                }),
            },
            "pamDirectory" => match text("directoryType") {
                "openldap" => Ok(Some(MetaClass::OpenLdapUser)),
                "active_directory" => Ok(Some(MetaClass::AdUser)),
                _ => Err(OpsError::ValidationError {
                    message: "Directory type was not set on the directory record.".to_string(),
                }),
            },
            _ => Ok(None),
        }
    }

    /// Meta class for `pam-rm-role-create` against `record`, if it has one.
    pub fn for_role(record: &VaultRecord) -> Result<Option<MetaClass>> {
        match record.record_type.as_str() {
            "pamAwsConfiguration" => return Ok(Some(MetaClass::AwsRole)),
            "pamAzureConfiguration" => return Ok(Some(MetaClass::AzureRole)),
            _ => {}
        }

        if record.record_type != "pamDatabase" {
            return Ok(None);
        }
        match record.lookup_str("databaseType").as_deref() {
            Some("mysql") | Some("mariadb") => Ok(Some(MetaClass::MySqlRole)),
            _ => Err(OpsError::ValidationError {
                message: "Database type was not set on the database record.".to_string(),
            }),
        }
    }
}

/// Attribute list for `class`, sorted by name, holding the defaults.
pub fn get_meta_info(class: MetaClass) -> Vec<MetaField> {
    let mut fields: Vec<MetaField> = class
        .field_specs()
        .into_iter()
        .map(|spec| MetaField {
            name: spec.name.to_string(),
            data_type: spec.data_type,
            required: spec.required(),
            is_array: spec.is_array,
            value: spec.default.unwrap_or(Value::Null),
        })
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    fields
}

fn display_value(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Object(kv) => format!(
                    "{}={}",
                    kv.get("key").and_then(Value::as_str).unwrap_or_default(),
                    kv.get("value").and_then(Value::as_str).unwrap_or_default()
                ),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_DISPLAY_WIDTH {
        format!("{}...", text.chars().take(MAX_DISPLAY_WIDTH).collect::<String>())
    } else {
        text
    }
}

fn parse_scalar(data_type: DataType, input: &str) -> std::result::Result<Value, String> {
    let input = input.trim();
    match data_type {
        DataType::Bool => value_to_boolean(input)
            .map(Value::Bool)
            .ok_or_else(|| format!("'{}' is not a boolean value", input)),
        DataType::Int if input.is_empty() => Ok(Value::Null),
        DataType::Int => input
            .parse::<i64>()
            .map(|n| json!(n))
            .map_err(|_| format!("'{}' is not a number", input)),
        DataType::Dict if input.is_empty() => Ok(json!({})),
        DataType::Dict => serde_json::from_str::<Map<String, Value>>(input)
            .map(Value::Object)
            .map_err(|e| format!("Not a JSON object: {}", e)),
        DataType::KeyValue => match input.split_once('=') {
            Some((key, value)) => Ok(json!({"key": key.trim(), "value": value.trim()})),
            None => Err(format!("'{}' is not a key=value pair", input)),
        },
        DataType::Str => {
            let path = Path::new(input);
            if !input.is_empty() && path.is_file() {
                std::fs::read_to_string(path).map(Value::String).map_err(|e| e.to_string())
            } else {
                Ok(Value::String(input.to_string()))
            }
        }
    }
}

/// Converts what was typed at the `Value >` prompt into the field's JSON shape.
pub fn parse_value(field: &MetaField, input: &str) -> std::result::Result<Value, String> {
    if !field.is_array {
        return parse_scalar(field.data_type, input);
    }
    if input.trim().is_empty() {
        return Ok(json!([]));
    }
    input
        .split(',')
        .map(|item| parse_scalar(field.data_type, item))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Interactive review of the meta attributes until the user accepts them.
pub fn show_meta_menu(fields: &mut [MetaField], prompt: &dyn Prompt, painter: &Painter) -> Result<()> {
    loop {
        prompt.show("");
        prompt.show(&painter.header("Meta data is available for this record type."));
        for field in fields.iter() {
            let marker = if field.required { " (required)" } else { "" };
            prompt.show(&format!(
                " * {}{} = {}",
                painter.bold(&field.name),
                marker,
                display_value(&field.value)
            ));
        }

        let choice = prompt.text("[A]ccept, [E]dit >", None)?;
        match choice.trim().to_lowercase().as_str() {
            "a" | "accept" => return Ok(()),
            "e" | "edit" => {}
            _ => continue,
        }

        let name = prompt.text("Attribute >", None)?;
        let Some(field) = fields.iter_mut().find(|f| f.name == name.trim()) else {
            prompt.show(&painter.fail(&format!("Unknown attribute '{}'", name.trim())));
            continue;
        };
        let input = prompt.text("Value >", None)?;
        match parse_value(field, &input) {
            Ok(value) => field.value = value,
            Err(reason) => prompt.show(&painter.fail(&reason)),
        }
    }
}

/// Validated meta document for `class`, as JSON.
pub fn build_meta_json(fields: &[MetaField], class: MetaClass) -> Result<String> {
    for field in fields.iter().filter(|f| f.required) {
        let empty = match &field.value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        };
        if empty {
            return Err(OpsError::ValidationError {
                message: format!("Meta attribute '{}' is required.", field.name),
            });
        }
    }
    let values: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.clone(), f.value.clone()))
        .collect();
    class.to_json(Value::Object(values))
}

/// Validated, encrypted and base64 encoded meta document.
pub fn get_meta_data(fields: &[MetaField], class: MetaClass, key: &[u8]) -> Result<String> {
    let json = build_meta_json(fields, class)?;
    let encrypted = crate::crypto::encrypt_aes_v2(json.as_bytes(), key)?;
    Ok(crate::utils::encoding::base64_encode(&encrypted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::decrypt_aes_v2;
    use crate::domain::model::RecordField;
    use crate::testing::ScriptedPrompt;
    use crate::utils::encoding::base64_decode;
    use std::io::Write;

    fn record(record_type: &str, fields: &[(&str, &str)]) -> VaultRecord {
        VaultRecord {
            record_uid: "res1".to_string(),
            title: "Resource".to_string(),
            record_type: record_type.to_string(),
            record_key: None,
            fields: fields
                .iter()
                .map(|(label, value)| RecordField {
                    field_type: "text".to_string(),
                    label: Some(label.to_string()),
                    value: vec![json!(value)],
                })
                .collect(),
            folder_uids: Vec::new(),
        }
    }

    #[test]
    fn test_user_meta_class_lookup() {
        assert_eq!(
            MetaClass::for_user(&record("pamAwsConfiguration", &[])).unwrap(),
            Some(MetaClass::AwsUser)
        );
        assert_eq!(
            MetaClass::for_user(&record("pamDatabase", &[("databaseType", "mariadb")])).unwrap(),
            Some(MetaClass::MySqlUser)
        );
        assert!(MetaClass::for_user(&record("pamDatabase", &[("databaseType", "MySQL")])).is_err());
        assert_eq!(
            MetaClass::for_user(&record("pamMachine", &[("operatingSystem", "linux")])).unwrap(),
            Some(MetaClass::LinuxUser)
        );
        assert_eq!(
            MetaClass::for_user(&record("pamDirectory", &[("directoryType", "active_directory")]))
                .unwrap(),
            Some(MetaClass::AdUser)
        );
        assert_eq!(MetaClass::for_user(&record("login", &[])).unwrap(), None);

        let err = MetaClass::for_user(&record("pamMachine", &[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Operating system was not set on the machine record."
        );
    }

    #[test]
    fn test_role_meta_class_lookup() {
        assert_eq!(
            MetaClass::for_role(&record("pamAzureConfiguration", &[])).unwrap(),
            Some(MetaClass::AzureRole)
        );
        assert_eq!(
            MetaClass::for_role(&record("pamDatabase", &[("databaseType", "mysql")])).unwrap(),
            Some(MetaClass::MySqlRole)
        );
        let err = MetaClass::for_role(&record("pamDatabase", &[("databaseType", "postgresql")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Database type was not set on the database record."
        );
        assert!(MetaClass::for_role(&record("pamDatabase", &[])).is_err());
        assert_eq!(
            MetaClass::for_role(&record("pamMachine", &[("operatingSystem", "linux")])).unwrap(),
            None
        );
    }

    #[test]
    fn test_meta_info_sorted_with_defaults() {
        let fields = get_meta_info(MetaClass::AwsRole);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["description", "policy_json"]);
        assert!(fields[1].required);
        assert_eq!(fields[1].value, Value::Null);

        let ad = get_meta_info(MetaClass::AdUser);
        let uac = ad.iter().find(|f| f.name == "user_account_control").unwrap();
        assert_eq!(uac.value, json!(512));
        let classes = ad.iter().find(|f| f.name == "object_class").unwrap();
        assert_eq!(classes.value, json!(["top", "person", "organizationalPerson", "user"]));
    }

    #[test]
    fn test_parse_value_by_type() {
        let fields = get_meta_info(MetaClass::AwsUser);
        let tags = fields.iter().find(|f| f.name == "tags").unwrap();
        assert_eq!(
            parse_value(tags, "team=ops, env = prod").unwrap(),
            json!([{"key": "team", "value": "ops"}, {"key": "env", "value": "prod"}])
        );
        assert!(parse_value(tags, "novalue").is_err());

        let console = fields.iter().find(|f| f.name == "console_access").unwrap();
        assert_eq!(parse_value(console, "no").unwrap(), json!(false));
        assert!(parse_value(console, "sometimes").is_err());

        let roles = fields.iter().find(|f| f.name == "roles").unwrap();
        assert_eq!(parse_value(roles, " a , b").unwrap(), json!(["a", "b"]));
        assert_eq!(parse_value(roles, "").unwrap(), json!([]));
    }

    #[test]
    fn test_string_value_reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"Version\":\"2012-10-17\"}}").unwrap();

        let fields = get_meta_info(MetaClass::AwsRole);
        let policy = fields.iter().find(|f| f.name == "policy_json").unwrap();
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(
            parse_value(policy, &path).unwrap(),
            json!("{\"Version\":\"2012-10-17\"}")
        );
        assert_eq!(parse_value(policy, "inline").unwrap(), json!("inline"));
    }

    #[test]
    fn test_meta_menu_edits_then_accepts() {
        let prompt = ScriptedPrompt::new(&["e", "expire_days", "30", "x", "e", "bogus", "a"]);
        let mut fields = get_meta_info(MetaClass::WindowsUser);
        show_meta_menu(&mut fields, &prompt, &Painter::plain()).unwrap();

        let expire = fields.iter().find(|f| f.name == "expire_days").unwrap();
        assert_eq!(expire.value, json!(30));
        let shown = prompt.shown();
        assert!(shown.contains("Meta data is available for this record type."));
        assert!(shown.contains(" * expire_days = 0"));
        assert!(shown.contains("Unknown attribute 'bogus'"));
    }

    #[test]
    fn test_meta_menu_needs_an_explicit_choice() {
        let prompt = ScriptedPrompt::new(&["", "e", "", "", "a"]);
        let mut fields = get_meta_info(MetaClass::AwsRole);
        show_meta_menu(&mut fields, &prompt, &Painter::plain()).unwrap();
        let menus = prompt
            .asked()
            .iter()
            .filter(|q| q.as_str() == "[A]ccept, [E]dit >")
            .count();
        assert_eq!(menus, 4);

        let prompt = ScriptedPrompt::new(&[""]);
        let mut fields = get_meta_info(MetaClass::AwsRole);
        assert!(show_meta_menu(&mut fields, &prompt, &Painter::plain()).is_err());
    }

    #[test]
    fn test_meta_menu_truncates_long_values() {
        let prompt = ScriptedPrompt::new(&["a"]);
        let mut fields = get_meta_info(MetaClass::AwsRole);
        fields[1].value = json!("x".repeat(60));
        show_meta_menu(&mut fields, &prompt, &Painter::plain()).unwrap();
        assert!(prompt
            .shown()
            .contains(&format!(" * policy_json (required) = {}...", "x".repeat(40))));
    }

    #[test]
    fn test_meta_data_requires_required_fields() {
        let fields = get_meta_info(MetaClass::AwsRole);
        let err = build_meta_json(&fields, MetaClass::AwsRole).unwrap_err();
        assert!(err.to_string().contains("policy_json"));
    }

    #[test]
    fn test_meta_data_rejects_mistyped_values() {
        let mut fields = get_meta_info(MetaClass::SqlServerUser);
        fields.iter_mut().find(|f| f.name == "allow_login").unwrap().value = Value::Null;
        assert!(build_meta_json(&fields, MetaClass::SqlServerUser).is_err());
    }

    #[test]
    fn test_meta_data_is_encrypted_dto_json() {
        let key = [3u8; 32];
        let mut fields = get_meta_info(MetaClass::MySqlUser);
        fields.iter_mut().find(|f| f.name == "roles").unwrap().value = json!(["reader"]);

        let encoded = get_meta_data(&fields, MetaClass::MySqlUser, &key).unwrap();
        let plain = decrypt_aes_v2(&base64_decode(&encoded).unwrap(), &key).unwrap();
        let doc: Value = serde_json::from_slice(&plain).unwrap();
        assert_eq!(
            doc,
            json!({
                "authentication_plugin": null,
                "authentication_value": null,
                "roles": ["reader"]
            })
        );
    }
}
