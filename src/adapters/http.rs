use crate::domain::model::{
    Attachment, AttachmentUpload, Folder, FolderType, Gateway, MessageType, RouterResponse,
    SharedFolderUpdateRequest, Team, TeamKeys, VaultCache,
};
use crate::domain::ports::{ConfigProvider, GatewayRouter, VaultApi};
use crate::utils::encoding::base64_url_decode;
use crate::utils::error::{OpsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

fn build_client(timeout_seconds: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?)
}

fn join_url(endpoint: &str, command: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), command)
}

/// JSON-over-HTTP vault API. Every command is a POST to `<endpoint>/<command>`
/// answered with `{"result": "success", ...}`.
#[derive(Debug, Clone)]
pub struct HttpVaultClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpVaultClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_seconds)?,
            endpoint: endpoint.into(),
            token,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.vault_endpoint(),
            config.api_token().map(str::to_string),
            config.timeout_seconds(),
        )
    }

    async fn execute<B: Serialize + ?Sized, T: DeserializeOwned>(&self, command: &str, body: &B) -> Result<T> {
        let url = join_url(&self.endpoint, command);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Vault request: {}", command);
        let response = request.send().await?;
        let status = response.status();
        let value: Value = response.json().await?;

        let result = value.get("result").and_then(Value::as_str).unwrap_or_default();
        if result != "success" {
            let code = value
                .get("result_code")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("The vault rejected the request")
                .to_string();
            tracing::debug!("Vault command {} failed: {} {}", command, code, message);
            return Err(OpsError::VaultError { code, message });
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Deserialize)]
struct Empty {}

#[derive(Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<Team>,
}

#[derive(Deserialize)]
struct TeamKeysResponse {
    #[serde(default)]
    keys: Option<TeamKeys>,
}

#[derive(Deserialize)]
struct FolderResponse {
    folder: Folder,
}

#[derive(Deserialize)]
struct RecordAddResponse {
    record_uid: String,
}

#[derive(Deserialize)]
struct AttachmentsResponse {
    #[serde(default)]
    attachments: Vec<Attachment>,
}

#[derive(Deserialize)]
struct DownloadResponse {
    data: String,
}

#[async_trait]
impl VaultApi for HttpVaultClient {
    async fn get_available_teams(&self) -> Result<Vec<Team>> {
        let response: TeamsResponse = self.execute("get_available_teams", &json!({})).await?;
        Ok(response.teams)
    }

    async fn sync_down(&self) -> Result<VaultCache> {
        self.execute("sync_down", &json!({})).await
    }

    async fn load_team_keys(&self, team_uid: &str) -> Result<Option<TeamKeys>> {
        let response: TeamKeysResponse = self
            .execute("team_get_keys", &json!({ "team_uid": team_uid }))
            .await?;
        Ok(response.keys)
    }

    async fn make_folder(
        &self,
        name: &str,
        parent_uid: Option<&str>,
        folder_type: FolderType,
    ) -> Result<Folder> {
        let body = json!({
            "name": name,
            "parent_uid": parent_uid,
            "folder_type": folder_type,
        });
        let response: FolderResponse = self.execute("folder_add", &body).await?;
        Ok(response.folder)
    }

    async fn move_record(&self, record_uid: &str, folder_uid: &str, link: bool) -> Result<()> {
        let body = json!({ "record_uid": record_uid, "folder_uid": folder_uid, "link": link });
        let _: Empty = self.execute("move", &body).await?;
        Ok(())
    }

    async fn update_shared_folder(&self, request: &SharedFolderUpdateRequest) -> Result<()> {
        let _: Empty = self.execute("shared_folder_update_v3", request).await?;
        Ok(())
    }

    async fn create_record(&self, title: &str, record_type: &str, folder_uid: &str) -> Result<String> {
        let body = json!({ "title": title, "record_type": record_type, "folder_uid": folder_uid });
        let response: RecordAddResponse = self.execute("record_add", &body).await?;
        Ok(response.record_uid)
    }

    async fn upload_attachment(&self, record_uid: &str, upload: &AttachmentUpload) -> Result<()> {
        let body = json!({ "record_uid": record_uid, "attachment": upload });
        let _: Empty = self.execute("attachment_upload", &body).await?;
        Ok(())
    }

    async fn list_attachments(&self, record_uid: &str) -> Result<Vec<Attachment>> {
        let response: AttachmentsResponse = self
            .execute("attachment_list", &json!({ "record_uid": record_uid }))
            .await?;
        Ok(response.attachments)
    }

    async fn download_attachment(&self, record_uid: &str, attachment_id: &str) -> Result<Vec<u8>> {
        let body = json!({ "record_uid": record_uid, "attachment_id": attachment_id });
        let response: DownloadResponse = self.execute("attachment_download", &body).await?;
        base64_url_decode(&response.data)
    }
}

/// Router endpoints for gateway discovery and controller messages.
#[derive(Debug, Clone)]
pub struct HttpRouter {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ControllersResponse {
    #[serde(default)]
    controllers: Vec<Gateway>,
}

impl HttpRouter {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_seconds)?,
            endpoint: endpoint.into(),
            token,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.router_endpoint(),
            config.router_token().map(str::to_string),
            config.timeout_seconds(),
        )
    }

    fn post(&self, command: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(join_url(&self.endpoint, command));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl GatewayRouter for HttpRouter {
    async fn list_gateways(&self) -> Result<Vec<Gateway>> {
        let response = self.post("get_controllers").json(&json!({})).send().await?;
        let response = response.error_for_status()?;
        let controllers: ControllersResponse = response.json().await?;
        Ok(controllers.controllers)
    }

    async fn send_action(
        &self,
        action: &Value,
        destination_gateway_uid: &str,
        message_type: MessageType,
        streaming: bool,
    ) -> Result<Option<RouterResponse>> {
        let body = json!({
            "message_type": message_type,
            "destination_gateway_uid": destination_gateway_uid,
            "streaming": streaming,
            "payload": action,
        });
        let response = self.post("send_controller_message").json(&body).send().await?;
        if !response.status().is_success() {
            tracing::warn!(
                "⚠️ Router refused message for {}: {}",
                destination_gateway_uid,
                response.status()
            );
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }
}
