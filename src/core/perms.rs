use crate::constants::{CSV_MIME_TYPE, DEFAULT_ROOT_FOLDER};
use crate::core::apply::{ApplyOptions, ApplyPipeline, ApplySummary};
use crate::core::csv_template::{self, RecordSummary, ValidationReport};
use crate::core::engine::PipelineEngine;
use crate::core::permission::{self, PermissionUpdate};
use crate::core::session::VaultSession;
use crate::core::shared_folder;
use crate::domain::model::{AttachmentUpload, FolderType, Team};
use crate::domain::ports::{ConfigProvider, Prompt, VaultApi};
use crate::utils::error::{OpsError, Result};

/// Local time in `YYYY-MM-DDTHH:MM:SS.ffffff`, used in attachment titles.
pub fn iso_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Folder chain created or reused for one team grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFolderPath {
    /// The team's shared folder directly under the root.
    pub shared_folder_uid: String,
    /// Deepest folder of the path; records are linked here.
    pub leaf_uid: String,
    pub created: bool,
}

pub struct KeeperPerms<V: VaultApi, C: ConfigProvider> {
    session: VaultSession<V>,
    config: C,
    prompt: Option<Box<dyn Prompt>>,
}

impl<V: VaultApi, C: ConfigProvider> KeeperPerms<V, C> {
    pub fn new(api: V, config: C) -> Self {
        Self {
            session: VaultSession::new(api),
            config,
            prompt: None,
        }
    }

    /// Ask for the config folder and record title when the config record is created.
    pub fn interactive(mut self, prompt: Box<dyn Prompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn session(&self) -> &VaultSession<V> {
        &self.session
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn sync(&self) -> Result<()> {
        self.session.sync().await
    }

    pub async fn get_teams(&self) -> Result<Vec<Team>> {
        let teams = self.session.api().get_available_teams().await?;
        Ok(teams
            .into_iter()
            .map(|team| {
                if team.team_name.is_empty() {
                    Team {
                        team_name: format!("Team {}", team.team_uid),
                        team_uid: team.team_uid,
                    }
                } else {
                    team
                }
            })
            .collect())
    }

    pub async fn get_records(&self) -> Vec<RecordSummary> {
        let cache = self.session.cache().await;
        cache
            .records
            .iter()
            .map(|record| RecordSummary {
                uid: record.record_uid.clone(),
                title: record.title.clone(),
                folder_path: cache.record_path(&record.record_uid),
            })
            .collect()
    }

    pub async fn get_record_path(&self, record_uid: &str) -> String {
        self.session.cache().await.record_path(record_uid)
    }

    pub async fn get_team_uid_by_name(&self, team_name: &str) -> Result<Option<String>> {
        let name = team_name.to_lowercase();
        Ok(self
            .get_teams()
            .await?
            .into_iter()
            .find(|team| team.team_name.to_lowercase() == name)
            .map(|team| team.team_uid))
    }

    pub async fn generate_template(&self) -> Result<Vec<u8>> {
        let teams: Vec<String> = self
            .get_teams()
            .await?
            .into_iter()
            .map(|team| team.team_name)
            .collect();
        let records = self.get_records().await;
        let csv = csv_template::build_template(&teams, &records)?;
        tracing::info!(
            "📝 Template generated with {} records and {} teams",
            records.len(),
            teams.len()
        );
        Ok(csv)
    }

    pub async fn validate_csv(&self, data: &[u8]) -> Result<ValidationReport> {
        let teams: Vec<String> = self
            .get_teams()
            .await?
            .into_iter()
            .map(|team| team.team_name)
            .collect();
        let report = csv_template::validate(data, &teams)?;
        for issue in &report.issues {
            tracing::error!("{}", issue.message);
        }
        Ok(report)
    }

    pub async fn apply_permissions(&self, data: &[u8], options: ApplyOptions) -> Result<ApplySummary> {
        tracing::info!(
            "Applying permissions (dry-run: {}, root: {})",
            options.dry_run,
            options.root_name
        );
        let pipeline = ApplyPipeline::new(self, data, options);
        PipelineEngine::new("permissions apply", pipeline).run().await
    }

    pub async fn ensure_root_folder(&self, root_name: &str) -> Result<String> {
        let root_name = if root_name.trim().is_empty() {
            DEFAULT_ROOT_FOLDER
        } else {
            root_name
        };
        self.ensure_user_folder(root_name).await
    }

    async fn ensure_user_folder(&self, name: &str) -> Result<String> {
        if let Some(existing) = self.session.cache().await.find_child_folder(None, name) {
            return Ok(existing.folder_uid.clone());
        }
        let folder = self
            .session
            .api()
            .make_folder(name, None, FolderType::UserFolder)
            .await?;
        tracing::info!("📁 Created folder {}", name);
        let uid = folder.folder_uid.clone();
        self.session.remember_folder(folder).await;
        Ok(uid)
    }

    /// Builds `<root>/<team>/<segments...>`. The team folder is a shared
    /// folder and every deeper segment lives inside it.
    pub async fn ensure_team_folder_path(
        &self,
        team_name: &str,
        folder_path: &str,
        root_uid: &str,
    ) -> Result<TeamFolderPath> {
        let segments = std::iter::once(team_name)
            .chain(folder_path.split('/'))
            .map(str::trim)
            .filter(|segment| !segment.is_empty());

        let mut current = root_uid.to_string();
        let mut shared_folder_uid: Option<String> = None;
        let mut created = false;

        for segment in segments {
            let existing = self
                .session
                .cache()
                .await
                .find_child_folder(Some(&current), segment)
                .cloned();

            let folder = match existing {
                Some(folder) => folder,
                None => {
                    let folder_type = if shared_folder_uid.is_none() {
                        FolderType::SharedFolder
                    } else {
                        FolderType::SharedFolderFolder
                    };
                    let folder = self
                        .session
                        .api()
                        .make_folder(segment, Some(&current), folder_type)
                        .await?;
                    tracing::debug!("Created folder {} under {}", segment, current);
                    self.session.remember_folder(folder.clone()).await;
                    created = true;
                    folder
                }
            };

            if shared_folder_uid.is_none() {
                shared_folder_uid = Some(
                    folder
                        .shared_folder_uid
                        .clone()
                        .unwrap_or_else(|| folder.folder_uid.clone()),
                );
            }
            current = folder.folder_uid;
        }

        let shared_folder_uid = shared_folder_uid.ok_or_else(|| OpsError::ValidationError {
            message: format!("Failed to ensure folder path for team {}", team_name),
        })?;

        Ok(TeamFolderPath {
            shared_folder_uid,
            leaf_uid: current,
            created,
        })
    }

    pub async fn share_record_to_folder(&self, record_uid: &str, folder_uid: &str) -> Result<()> {
        self.session
            .api()
            .move_record(record_uid, folder_uid, true)
            .await?;
        self.session.remember_link(record_uid, folder_uid).await;
        Ok(())
    }

    pub async fn add_team_to_shared_folder(
        &self,
        team_uid: &str,
        shared_folder_uid: &str,
        permissions: PermissionUpdate,
    ) -> Result<()> {
        shared_folder::add_team_to_shared_folder(
            &self.session,
            shared_folder_uid,
            team_uid,
            permissions,
            self.config.forbid_rsa(),
        )
        .await
    }

    pub fn permission_level_to_flags(level: &str) -> PermissionUpdate {
        permission::permission_level_to_flags(level)
    }

    /// Attaches `data` to the config record.
    pub async fn store_in_vault(
        &self,
        file_name: &str,
        data: Vec<u8>,
        title: &str,
        mime_type: &str,
    ) -> Result<()> {
        let config_record_uid = self.get_config_record().await?;
        let upload = AttachmentUpload {
            name: file_name.to_string(),
            title: title.to_string(),
            mime_type: mime_type.to_string(),
            data,
        };
        self.session
            .api()
            .upload_attachment(&config_record_uid, &upload)
            .await?;
        tracing::info!(
            "📎 Stored {} in vault under record UID: {}",
            title,
            config_record_uid
        );
        Ok(())
    }

    pub async fn store_in_vault_bytes(&self, data: Vec<u8>, title: &str) -> Result<()> {
        self.store_in_vault(title, data, title, CSV_MIME_TYPE).await
    }

    /// UID of the record titled like the configured config record, created on first use.
    pub async fn get_config_record(&self) -> Result<String> {
        let title = self.config.config_record_title();
        if let Some(record) = self.session.cache().await.find_record_by_title(title) {
            return Ok(record.record_uid.clone());
        }
        self.create_record().await
    }

    pub async fn create_record(&self) -> Result<String> {
        let default_folder = self.config.config_folder();
        let default_title = self.config.config_record_title();

        let folder_name = match &self.prompt {
            Some(prompt) => prompt.text(
                &format!(
                    "Enter folder name for Perms Config record (default: {}): ",
                    default_folder
                ),
                Some(default_folder),
            )?,
            None => default_folder.to_string(),
        };
        let folder_uid = self.ensure_user_folder(&folder_name).await?;

        let record_title = match &self.prompt {
            Some(prompt) => prompt.text(
                &format!(
                    "Enter record title for Perms Config (default: {}): ",
                    default_title
                ),
                Some(default_title),
            )?,
            None => default_title.to_string(),
        };

        let record_uid = self
            .session
            .api()
            .create_record(&record_title, "general", &folder_uid)
            .await?;
        tracing::info!("Created config record {} in {}", record_title, folder_name);
        self.session.sync().await?;
        Ok(record_uid)
    }

    pub async fn download_from_vault(&self, attachment_title: &str) -> Result<Vec<u8>> {
        let config_record_uid = self.get_config_record().await?;
        let attachments = self
            .session
            .api()
            .list_attachments(&config_record_uid)
            .await?;
        let attachment = attachments
            .iter()
            .find(|a| a.matches(attachment_title))
            .ok_or_else(|| OpsError::NotFound {
                message: format!(
                    "Attachment \"{}\" not found in {} record",
                    attachment_title,
                    self.config.config_record_title()
                ),
            })?;
        self.session
            .api()
            .download_attachment(&config_record_uid, &attachment.id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Attachment, Folder, VaultRecord};
    use crate::testing::{MockVault, ScriptedPrompt, TestConfig};

    fn record(uid: &str, title: &str, folders: &[&str]) -> VaultRecord {
        VaultRecord {
            record_uid: uid.to_string(),
            title: title.to_string(),
            record_type: "login".to_string(),
            record_key: None,
            fields: Vec::new(),
            folder_uids: folders.iter().map(|f| f.to_string()).collect(),
        }
    }

    async fn perms_with(vault: &MockVault) -> KeeperPerms<MockVault, TestConfig> {
        let perms = KeeperPerms::new(vault.clone(), TestConfig::default());
        perms.sync().await.unwrap();
        perms
    }

    #[tokio::test]
    async fn test_generate_template_lists_records_and_teams() {
        let vault = MockVault::new();
        vault.set_teams(&[("t1", "Engineering"), ("t2", "")]).await;
        vault
            .add_folder(Folder {
                folder_uid: "f1".to_string(),
                parent_uid: None,
                name: "Ops".to_string(),
                folder_type: FolderType::UserFolder,
                shared_folder_uid: None,
            })
            .await;
        vault.add_record(record("r1", "Database", &["f1"])).await;

        let perms = perms_with(&vault).await;
        let csv = String::from_utf8(perms.generate_template().await.unwrap()).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec!["Record UID,Title,Folder Path,Engineering,Team t2", "r1,Database,/Ops,,"]
        );
    }

    #[tokio::test]
    async fn test_ensure_root_folder_reuses_existing() {
        let vault = MockVault::new();
        let perms = perms_with(&vault).await;

        let first = perms.ensure_root_folder("[Perms]").await.unwrap();
        let second = perms.ensure_root_folder("[perms]").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(vault.snapshot().await.made_folders.len(), 1);
    }

    #[tokio::test]
    async fn test_team_folder_path_types_and_reuse() {
        let vault = MockVault::new();
        let perms = perms_with(&vault).await;
        let root = perms.ensure_root_folder("[Perms]").await.unwrap();

        let path = perms
            .ensure_team_folder_path("Engineering", "/Ops//Db/", &root)
            .await
            .unwrap();
        assert!(path.created);

        let state = vault.snapshot().await;
        let kinds: Vec<(String, FolderType)> = state
            .made_folders
            .iter()
            .skip(1)
            .map(|f| (f.name.clone(), f.folder_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Engineering".to_string(), FolderType::SharedFolder),
                ("Ops".to_string(), FolderType::SharedFolderFolder),
                ("Db".to_string(), FolderType::SharedFolderFolder),
            ]
        );
        assert_eq!(path.shared_folder_uid, state.made_folders[1].folder_uid);
        assert_eq!(path.leaf_uid, state.made_folders[3].folder_uid);

        let again = perms
            .ensure_team_folder_path("engineering", "Ops/Db", &root)
            .await
            .unwrap();
        assert!(!again.created);
        assert_eq!(again.leaf_uid, path.leaf_uid);
        assert_eq!(vault.snapshot().await.made_folders.len(), 4);
    }

    #[tokio::test]
    async fn test_config_record_is_created_once() {
        let vault = MockVault::new();
        let perms = perms_with(&vault).await;

        let uid = perms.get_config_record().await.unwrap();
        assert_eq!(perms.get_config_record().await.unwrap(), uid);

        let state = vault.snapshot().await;
        assert_eq!(state.created_records, vec![uid.clone()]);
        assert_eq!(state.made_folders[0].name, "[Perms Config Folder]");
        assert_eq!(state.cache.record(&uid).unwrap().title, "Perms Config");
    }

    #[tokio::test]
    async fn test_interactive_config_record_uses_prompt_answers() {
        let vault = MockVault::new();
        let perms = KeeperPerms::new(vault.clone(), TestConfig::default())
            .interactive(Box::new(ScriptedPrompt::new(&["Team Configs", ""])));
        perms.sync().await.unwrap();

        let uid = perms.create_record().await.unwrap();
        let state = vault.snapshot().await;
        assert_eq!(state.made_folders[0].name, "Team Configs");
        assert_eq!(state.cache.record(&uid).unwrap().title, "Perms Config");
    }

    #[tokio::test]
    async fn test_store_and_download_attachment() {
        let vault = MockVault::new();
        let perms = perms_with(&vault).await;

        perms
            .store_in_vault_bytes(b"a,b\n".to_vec(), "Template_2024.csv")
            .await
            .unwrap();
        let data = perms.download_from_vault("Template_2024.csv").await.unwrap();
        assert_eq!(data, b"a,b\n");

        let err = perms.download_from_vault("missing").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attachment \"missing\" not found in Perms Config record"
        );
    }

    #[tokio::test]
    async fn test_download_matches_name_or_title() {
        let vault = MockVault::new();
        vault.add_record(record("cfg", "Perms Config", &[])).await;
        vault
            .add_attachment(
                "cfg",
                Attachment {
                    id: "att-9".to_string(),
                    name: "perms.csv".to_string(),
                    title: "Quarterly".to_string(),
                    mime_type: None,
                    size: 3,
                },
                b"csv",
            )
            .await;
        let perms = perms_with(&vault).await;

        assert_eq!(perms.download_from_vault("perms.csv").await.unwrap(), b"csv");
        assert_eq!(perms.download_from_vault("Quarterly").await.unwrap(), b"csv");
    }

    #[tokio::test]
    async fn test_team_uid_lookup_is_case_insensitive() {
        let vault = MockVault::new();
        vault.set_teams(&[("t1", "Engineering")]).await;
        let perms = perms_with(&vault).await;

        assert_eq!(
            perms.get_team_uid_by_name("ENGINEERING").await.unwrap(),
            Some("t1".to_string())
        );
        assert_eq!(perms.get_team_uid_by_name("Sales").await.unwrap(), None);
    }
}
