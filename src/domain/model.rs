use crate::utils::encoding::{bytes_b64, opt_bytes_b64};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_uid: String,
    pub team_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    UserFolder,
    SharedFolder,
    SharedFolderFolder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub folder_uid: String,
    #[serde(default)]
    pub parent_uid: Option<String>,
    pub name: String,
    pub folder_type: FolderType,
    /// Owning shared folder for `shared_folder` and `shared_folder_folder` entries.
    #[serde(default)]
    pub shared_folder_uid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedFolder {
    pub shared_folder_uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "opt_bytes_b64")]
    pub shared_folder_key: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Vec<serde_json::Value>,
}

fn default_record_type() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultRecord {
    pub record_uid: String,
    pub title: String,
    #[serde(default = "default_record_type")]
    pub record_type: String,
    #[serde(default, with = "opt_bytes_b64")]
    pub record_key: Option<Vec<u8>>,
    #[serde(default)]
    pub fields: Vec<RecordField>,
    #[serde(default)]
    pub folder_uids: Vec<String>,
}

impl VaultRecord {
    /// Maps each field's label (or its type when unlabelled) to its first value.
    pub fn field_lookup(&self) -> HashMap<String, serde_json::Value> {
        self.fields
            .iter()
            .map(|field| {
                let key = match field.label.as_deref() {
                    Some(label) if !label.is_empty() => label.to_string(),
                    _ => field.field_type.clone(),
                };
                let value = field
                    .value
                    .first()
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                (key, value)
            })
            .collect()
    }

    pub fn lookup_str(&self, key: &str) -> Option<String> {
        self.field_lookup()
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn field_value(&self, field_type: &str) -> Option<&serde_json::Value> {
        self.fields
            .iter()
            .find(|f| f.field_type == field_type)
            .and_then(|f| f.value.first())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamKeys {
    #[serde(default, with = "opt_bytes_b64")]
    pub aes: Option<Vec<u8>>,
    #[serde(default, with = "opt_bytes_b64")]
    pub rsa: Option<Vec<u8>>,
    #[serde(default, with = "opt_bytes_b64")]
    pub ec: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl Attachment {
    pub fn matches(&self, name: &str) -> bool {
        self.id == name || self.title == name || self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub name: String,
    pub title: String,
    pub mime_type: String,
    #[serde(with = "bytes_b64")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    #[serde(rename = "controllerUid")]
    pub gateway_uid: String,
    #[serde(rename = "controllerName")]
    pub gateway_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptedKeyType {
    EncryptedByDataKeyGcm,
    EncryptedByPublicKeyEcc,
    EncryptedByPublicKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedKey {
    #[serde(with = "bytes_b64")]
    pub encrypted_key: Vec<u8>,
    pub encrypted_key_type: EncryptedKeyType,
}

/// One team entry of a shared folder update. Flags left as `None` are not
/// sent and keep their current value on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFolderTeamUpdate {
    pub team_uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_records: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_users: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_share: Option<bool>,
    pub typed_shared_folder_key: EncryptedKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFolderUpdateRequest {
    pub shared_folder_uid: String,
    pub force_update: bool,
    pub shared_folder_add_team: Vec<SharedFolderTeamUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "CMT_GENERAL")]
    General,
}

/// Raw reply from the router for a controller message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterResponse {
    #[serde(default)]
    pub response: Option<RouterResponseBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterResponseBody {
    /// JSON document produced by the gateway.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Snapshot of the vault as of the last sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultCache {
    #[serde(default)]
    pub records: Vec<VaultRecord>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub shared_folders: Vec<SharedFolder>,
}

impl VaultCache {
    pub fn record(&self, record_uid: &str) -> Option<&VaultRecord> {
        self.records.iter().find(|r| r.record_uid == record_uid)
    }

    pub fn folder(&self, folder_uid: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.folder_uid == folder_uid)
    }

    pub fn shared_folder(&self, shared_folder_uid: &str) -> Option<&SharedFolder> {
        self.shared_folders
            .iter()
            .find(|sf| sf.shared_folder_uid == shared_folder_uid)
    }

    pub fn find_record_by_title(&self, title: &str) -> Option<&VaultRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    /// `/a/b/c` for the record's first folder, or an empty string for records
    /// that live in the vault root.
    pub fn record_path(&self, record_uid: &str) -> String {
        let Some(folder_uid) = self
            .record(record_uid)
            .and_then(|r| r.folder_uids.iter().find(|uid| !uid.is_empty()))
        else {
            return String::new();
        };

        let mut names = Vec::new();
        let mut current = self.folder(folder_uid);
        while let Some(folder) = current {
            names.push(folder.name.as_str());
            // A parent loop would never terminate.
            if names.len() > self.folders.len() {
                break;
            }
            current = folder.parent_uid.as_deref().and_then(|p| self.folder(p));
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Folder named `name` directly under `parent_uid` (`None` is the vault root).
    pub fn find_child_folder(&self, parent_uid: Option<&str>, name: &str) -> Option<&Folder> {
        let wanted = name.to_lowercase();
        self.folders.iter().find(|f| {
            f.parent_uid.as_deref().filter(|p| !p.is_empty()) == parent_uid
                && f.name.to_lowercase() == wanted
        })
    }

    pub fn insert_folder(&mut self, folder: Folder) {
        self.folders.retain(|f| f.folder_uid != folder.folder_uid);
        self.folders.push(folder);
    }

    pub fn link_record(&mut self, record_uid: &str, folder_uid: &str) {
        if let Some(record) = self.records.iter_mut().find(|r| r.record_uid == record_uid) {
            if !record.folder_uids.iter().any(|f| f == folder_uid) {
                record.folder_uids.push(folder_uid.to_string());
            }
        }
    }
}
