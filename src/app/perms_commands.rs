use crate::config::{ApplyArgs, PermsCommand, TemplateArgs, ValidateArgs};
use crate::constants::{CSV_MIME_TYPE, LOG_MIME_TYPE};
use crate::core::perms::iso_timestamp;
use crate::core::{ApplyOptions, ConfigProvider, KeeperPerms, Storage, VaultApi};
use crate::utils::display::Painter;
use crate::utils::error::{OpsError, Result};
use std::path::Path;

/// `perms template|validate|apply` on top of [`KeeperPerms`].
pub struct PermsCommands<V: VaultApi, C: ConfigProvider, S: Storage> {
    perms: KeeperPerms<V, C>,
    storage: S,
    painter: Painter,
}

impl<V: VaultApi, C: ConfigProvider, S: Storage> PermsCommands<V, C, S> {
    pub fn new(perms: KeeperPerms<V, C>, storage: S, painter: Painter) -> Self {
        Self {
            perms,
            storage,
            painter,
        }
    }

    pub async fn run(&self, command: &PermsCommand) -> Result<String> {
        self.perms.sync().await?;
        match command {
            PermsCommand::Template(args) => self.template(args).await,
            PermsCommand::Validate(args) => self.validate(args).await,
            PermsCommand::Apply(args) => self.apply(args).await,
        }
    }

    async fn load_source(&self, csv_path: Option<&str>, vault_csv: Option<&str>) -> Result<Vec<u8>> {
        match (vault_csv, csv_path) {
            (Some(title), _) => self.perms.download_from_vault(title).await,
            (None, Some(path)) => self.storage.read_file(path).await,
            (None, None) => Err(OpsError::usage("CSV path or vault CSV title is required")),
        }
    }

    pub async fn template(&self, args: &TemplateArgs) -> Result<String> {
        let output = match (&args.output, args.vault_only) {
            (_, true) => None,
            (Some(output), false) => Some(output.as_str()),
            (None, false) => {
                return Err(OpsError::usage(
                    "Output path is required unless --vault-only is used",
                ))
            }
        };

        let csv = self.perms.generate_template().await?;
        let timestamp = iso_timestamp();
        match output {
            None => {
                let title = format!("Template_{}.csv", timestamp);
                self.perms.store_in_vault_bytes(csv, &title).await?;
                Ok(self.painter.green(&format!("Template stored in vault as {}", title)))
            }
            Some(path) => {
                self.storage.write_file(path, &csv).await?;
                let file_name = Path::new(path)
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.to_string());
                let title = format!("Template_{}", timestamp);
                self.perms
                    .store_in_vault(&file_name, csv, &title, CSV_MIME_TYPE)
                    .await?;
                Ok(self.painter.green(&format!("Template written to {}", path)))
            }
        }
    }

    pub async fn validate(&self, args: &ValidateArgs) -> Result<String> {
        let source = self
            .load_source(args.csv_path.as_deref(), args.vault_csv.as_deref())
            .await;
        let data = match source {
            Ok(data) => data,
            Err(e @ OpsError::NotFound { .. }) if args.vault_csv.is_none() => {
                tracing::error!("{}", e);
                return Ok(self.painter.fail("Invalid"));
            }
            Err(e) => return Err(e),
        };

        let report = self.perms.validate_csv(&data).await?;
        if report.is_valid() {
            Ok(self.painter.green("Valid"))
        } else {
            Ok(self.painter.fail("Invalid"))
        }
    }

    pub async fn apply(&self, args: &ApplyArgs) -> Result<String> {
        let data = self
            .load_source(args.csv_path.as_deref(), args.vault_csv.as_deref())
            .await?;
        let root_name = args
            .root
            .clone()
            .unwrap_or_else(|| self.perms.config().root_folder().to_string());

        let started_at = iso_timestamp();
        let summary = self
            .perms
            .apply_permissions(
                &data,
                ApplyOptions {
                    dry_run: args.dry_run,
                    root_name,
                },
            )
            .await?;

        if summary.dry_run {
            return Ok(format!(
                "Dry run: {} permission(s) would be applied, {} skipped",
                summary.applied.len(),
                summary.skipped.len()
            ));
        }

        let title = format!("Apply_Log_{}", started_at);
        let log = summary.to_log(&started_at);
        self.perms
            .store_in_vault(&format!("{}.txt", title), log.into_bytes(), &title, LOG_MIME_TYPE)
            .await?;

        let line = format!(
            "Applied {} permission(s), skipped {}, failed {}",
            summary.applied.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        if summary.failed.is_empty() {
            Ok(self.painter.green(&line))
        } else {
            Ok(self.painter.fail(&line))
        }
    }
}
