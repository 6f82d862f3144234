use crate::domain::model::{
    Attachment, AttachmentUpload, Folder, FolderType, Gateway, MessageType, RouterResponse,
    SharedFolderUpdateRequest, Team, TeamKeys, VaultCache,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Three-phase job run by `core::engine::PipelineEngine`.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;
    type Transformed: Send;
    type Output: Send;

    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, data: Self::Transformed) -> Result<Self::Output>;
}

pub trait ConfigProvider: Send + Sync {
    fn vault_endpoint(&self) -> &str;
    fn router_endpoint(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn router_token(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn forbid_rsa(&self) -> bool;
    fn root_folder(&self) -> &str;
    fn config_record_title(&self) -> &str;
    fn config_folder(&self) -> &str;
}

/// Vault operations the commands build on. Implementations own the
/// transport and the vault's encryption; this crate only sees plain models.
#[async_trait]
pub trait VaultApi: Send + Sync {
    async fn get_available_teams(&self) -> Result<Vec<Team>>;

    async fn sync_down(&self) -> Result<VaultCache>;

    async fn load_team_keys(&self, team_uid: &str) -> Result<Option<TeamKeys>>;

    async fn make_folder(
        &self,
        name: &str,
        parent_uid: Option<&str>,
        folder_type: FolderType,
    ) -> Result<Folder>;

    /// With `link` the record stays in its current folders as well.
    async fn move_record(&self, record_uid: &str, folder_uid: &str, link: bool) -> Result<()>;

    async fn update_shared_folder(&self, request: &SharedFolderUpdateRequest) -> Result<()>;

    async fn create_record(&self, title: &str, record_type: &str, folder_uid: &str)
        -> Result<String>;

    async fn upload_attachment(&self, record_uid: &str, upload: &AttachmentUpload) -> Result<()>;

    async fn list_attachments(&self, record_uid: &str) -> Result<Vec<Attachment>>;

    async fn download_attachment(&self, record_uid: &str, attachment_id: &str)
        -> Result<Vec<u8>>;
}

#[async_trait]
pub trait GatewayRouter: Send + Sync {
    async fn list_gateways(&self) -> Result<Vec<Gateway>>;

    /// `Ok(None)` means the router refused or failed to deliver the message.
    async fn send_action(
        &self,
        action: &serde_json::Value,
        destination_gateway_uid: &str,
        message_type: MessageType,
        streaming: bool,
    ) -> Result<Option<RouterResponse>>;
}

pub trait Prompt: Send + Sync {
    fn text(&self, message: &str, default: Option<&str>) -> Result<String>;

    /// Prints a line between questions.
    fn show(&self, text: &str);
}
