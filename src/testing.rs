//! In-memory doubles for the ports, shared by the unit tests.

use crate::domain::model::{
    Attachment, AttachmentUpload, Folder, FolderType, Gateway, MessageType, RouterResponse,
    RouterResponseBody, SharedFolder, SharedFolderUpdateRequest, Team, TeamKeys, VaultCache,
    VaultRecord,
};
use crate::domain::ports::{ConfigProvider, GatewayRouter, Prompt, Storage, VaultApi};
use crate::utils::error::{OpsError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SHARED_FOLDER_KEY: [u8; 32] = [9u8; 32];

#[derive(Debug, Clone, Default)]
pub struct MockVaultState {
    pub teams: Vec<Team>,
    pub cache: VaultCache,
    pub team_keys: HashMap<String, TeamKeys>,
    pub attachments: HashMap<String, Vec<(Attachment, Vec<u8>)>>,
    pub shared_folder_updates: Vec<SharedFolderUpdateRequest>,
    pub moves: Vec<(String, String, bool)>,
    pub made_folders: Vec<Folder>,
    pub created_records: Vec<String>,
    pub failing_shared_folders: HashSet<String>,
    pub sync_count: usize,
    next_id: usize,
}

impl MockVaultState {
    fn next_uid(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockVault {
    state: Arc<Mutex<MockVaultState>>,
}

impl MockVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_teams(&self, teams: &[(&str, &str)]) {
        self.state.lock().await.teams = teams
            .iter()
            .map(|(uid, name)| Team {
                team_uid: uid.to_string(),
                team_name: name.to_string(),
            })
            .collect();
    }

    pub async fn set_team_keys(&self, team_uid: &str, keys: TeamKeys) {
        self.state
            .lock()
            .await
            .team_keys
            .insert(team_uid.to_string(), keys);
    }

    pub async fn add_record(&self, record: VaultRecord) {
        self.state.lock().await.cache.records.push(record);
    }

    pub async fn add_folder(&self, folder: Folder) {
        self.state.lock().await.cache.folders.push(folder);
    }

    pub async fn add_attachment(&self, record_uid: &str, attachment: Attachment, data: &[u8]) {
        self.state
            .lock()
            .await
            .attachments
            .entry(record_uid.to_string())
            .or_default()
            .push((attachment, data.to_vec()));
    }

    pub async fn fail_updates_for(&self, shared_folder_uid: &str) {
        self.state
            .lock()
            .await
            .failing_shared_folders
            .insert(shared_folder_uid.to_string());
    }

    pub async fn snapshot(&self) -> MockVaultState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl VaultApi for MockVault {
    async fn get_available_teams(&self) -> Result<Vec<Team>> {
        Ok(self.state.lock().await.teams.clone())
    }

    async fn sync_down(&self) -> Result<VaultCache> {
        let mut state = self.state.lock().await;
        state.sync_count += 1;
        Ok(state.cache.clone())
    }

    async fn load_team_keys(&self, team_uid: &str) -> Result<Option<TeamKeys>> {
        Ok(self.state.lock().await.team_keys.get(team_uid).cloned())
    }

    async fn make_folder(
        &self,
        name: &str,
        parent_uid: Option<&str>,
        folder_type: FolderType,
    ) -> Result<Folder> {
        let mut state = self.state.lock().await;
        let folder_uid = state.next_uid("folder");
        let shared_folder_uid = match folder_type {
            FolderType::UserFolder => None,
            FolderType::SharedFolder => Some(folder_uid.clone()),
            FolderType::SharedFolderFolder => parent_uid
                .and_then(|p| state.cache.folder(p))
                .and_then(|p| p.shared_folder_uid.clone()),
        };
        let folder = Folder {
            folder_uid: folder_uid.clone(),
            parent_uid: parent_uid.map(str::to_string),
            name: name.to_string(),
            folder_type,
            shared_folder_uid,
        };
        if folder_type == FolderType::SharedFolder {
            state.cache.shared_folders.push(SharedFolder {
                shared_folder_uid: folder_uid,
                name: name.to_string(),
                shared_folder_key: Some(SHARED_FOLDER_KEY.to_vec()),
            });
        }
        state.cache.folders.push(folder.clone());
        state.made_folders.push(folder.clone());
        Ok(folder)
    }

    async fn move_record(&self, record_uid: &str, folder_uid: &str, link: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .moves
            .push((record_uid.to_string(), folder_uid.to_string(), link));
        state.cache.link_record(record_uid, folder_uid);
        Ok(())
    }

    async fn update_shared_folder(&self, request: &SharedFolderUpdateRequest) -> Result<()> {
        let mut state = self.state.lock().await;
        if state
            .failing_shared_folders
            .contains(&request.shared_folder_uid)
        {
            return Err(OpsError::vault("access_denied", "You do not have permission"));
        }
        state.shared_folder_updates.push(request.clone());
        Ok(())
    }

    async fn create_record(&self, title: &str, record_type: &str, folder_uid: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let record_uid = state.next_uid("record");
        state.cache.records.push(VaultRecord {
            record_uid: record_uid.clone(),
            title: title.to_string(),
            record_type: record_type.to_string(),
            record_key: None,
            fields: Vec::new(),
            folder_uids: vec![folder_uid.to_string()],
        });
        state.created_records.push(record_uid.clone());
        Ok(record_uid)
    }

    async fn upload_attachment(&self, record_uid: &str, upload: &AttachmentUpload) -> Result<()> {
        let mut state = self.state.lock().await;
        let id = state.next_uid("attachment");
        let attachment = Attachment {
            id,
            name: upload.name.clone(),
            title: upload.title.clone(),
            mime_type: Some(upload.mime_type.clone()),
            size: upload.data.len() as u64,
        };
        state
            .attachments
            .entry(record_uid.to_string())
            .or_default()
            .push((attachment, upload.data.clone()));
        Ok(())
    }

    async fn list_attachments(&self, record_uid: &str) -> Result<Vec<Attachment>> {
        Ok(self
            .state
            .lock()
            .await
            .attachments
            .get(record_uid)
            .map(|items| items.iter().map(|(a, _)| a.clone()).collect())
            .unwrap_or_default())
    }

    async fn download_attachment(&self, record_uid: &str, attachment_id: &str) -> Result<Vec<u8>> {
        self.state
            .lock()
            .await
            .attachments
            .get(record_uid)
            .and_then(|items| items.iter().find(|(a, _)| a.id == attachment_id))
            .map(|(_, data)| data.clone())
            .ok_or_else(|| OpsError::vault("not_found", "Attachment not found"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockRouterState {
    pub gateways: Vec<Gateway>,
    pub replies: VecDeque<Option<String>>,
    pub sent: Vec<(serde_json::Value, String)>,
}

/// Replies are gateway payload documents, returned in order.
#[derive(Debug, Clone, Default)]
pub struct MockRouter {
    state: Arc<Mutex<MockRouterState>>,
}

impl MockRouter {
    pub fn new(gateways: &[(&str, &str)]) -> Self {
        let state = MockRouterState {
            gateways: gateways
                .iter()
                .map(|(uid, name)| Gateway {
                    gateway_uid: uid.to_string(),
                    gateway_name: name.to_string(),
                })
                .collect(),
            ..MockRouterState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn reply(&self, payload: serde_json::Value) {
        self.state
            .lock()
            .await
            .replies
            .push_back(Some(payload.to_string()));
    }

    pub async fn refuse(&self) {
        self.state.lock().await.replies.push_back(None);
    }

    pub async fn sent(&self) -> Vec<(serde_json::Value, String)> {
        self.state.lock().await.sent.clone()
    }
}

#[async_trait]
impl GatewayRouter for MockRouter {
    async fn list_gateways(&self) -> Result<Vec<Gateway>> {
        Ok(self.state.lock().await.gateways.clone())
    }

    async fn send_action(
        &self,
        action: &serde_json::Value,
        destination_gateway_uid: &str,
        _message_type: MessageType,
        _streaming: bool,
    ) -> Result<Option<RouterResponse>> {
        let mut state = self.state.lock().await;
        state
            .sent
            .push((action.clone(), destination_gateway_uid.to_string()));
        Ok(state.replies.pop_front().flatten().map(|payload| RouterResponse {
            response: Some(RouterResponseBody {
                payload: Some(payload),
            }),
        }))
    }
}

/// Answers prompts from a fixed script. Empty answers take the default;
/// running out of answers without a default is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: std::sync::Mutex<VecDeque<String>>,
    asked: std::sync::Mutex<Vec<String>>,
    shown: std::sync::Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: std::sync::Mutex::new(Vec::new()),
            shown: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> String {
        self.shown
            .lock()
            .map(|s| s.join("\n"))
            .unwrap_or_default()
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Prompt for ScriptedPrompt {
    fn text(&self, message: &str, default: Option<&str>) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        let answer = self
            .answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front());
        match answer {
            Some(answer) if !answer.is_empty() => Ok(answer),
            Some(_) => Ok(default.unwrap_or_default().to_string()),
            None => default
                .map(str::to_string)
                .ok_or_else(|| OpsError::usage(format!("No scripted answer for '{}'", message))),
        }
    }

    fn show(&self, text: &str) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(text.to_string());
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }
}

impl Storage for MockStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| OpsError::NotFound {
            message: format!("CSV file not found: {}", path),
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    pub forbid_rsa: bool,
}

impl ConfigProvider for TestConfig {
    fn vault_endpoint(&self) -> &str {
        "http://localhost"
    }

    fn router_endpoint(&self) -> &str {
        "http://localhost"
    }

    fn api_token(&self) -> Option<&str> {
        None
    }

    fn router_token(&self) -> Option<&str> {
        None
    }

    fn timeout_seconds(&self) -> u64 {
        5
    }

    fn forbid_rsa(&self) -> bool {
        self.forbid_rsa
    }

    fn root_folder(&self) -> &str {
        crate::constants::DEFAULT_ROOT_FOLDER
    }

    fn config_record_title(&self) -> &str {
        crate::constants::DEFAULT_CONFIG_RECORD_TITLE
    }

    fn config_folder(&self) -> &str {
        crate::constants::DEFAULT_CONFIG_FOLDER
    }
}
