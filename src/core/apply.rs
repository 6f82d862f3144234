use crate::core::csv_template::{self, PermissionRow};
use crate::core::perms::{KeeperPerms, TeamFolderPath};
use crate::core::permission::{permission_level_to_flags, PermissionUpdate};
use crate::domain::ports::{ConfigProvider, Pipeline, VaultApi};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub dry_run: bool,
    pub root_name: String,
}

/// One non-empty team cell resolved to a team UID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub line: usize,
    pub record_uid: String,
    pub folder_path: String,
    pub team_name: String,
    pub team_uid: String,
    pub level: String,
    pub permissions: PermissionUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGrant {
    pub line: usize,
    pub record_uid: String,
    pub team_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedGrant {
    pub grant: Grant,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyPlan {
    pub grants: Vec<Grant>,
    pub skipped: Vec<SkippedGrant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub dry_run: bool,
    pub root_name: String,
    pub applied: Vec<Grant>,
    pub skipped: Vec<SkippedGrant>,
    pub failed: Vec<FailedGrant>,
}

impl ApplySummary {
    /// Plain-text report stored next to the template in the vault.
    pub fn to_log(&self, started_at: &str) -> String {
        let mut log = String::new();
        let _ = writeln!(log, "Permissions apply log");
        let _ = writeln!(log, "Started: {}", started_at);
        let _ = writeln!(log, "Root folder: {}", self.root_name);

        let _ = writeln!(log, "Applied: {}", self.applied.len());
        for grant in &self.applied {
            let _ = writeln!(
                log,
                "  + {} for team {} to {} in {}",
                grant.level, grant.team_name, grant.record_uid, grant.folder_path
            );
        }

        let _ = writeln!(log, "Skipped: {}", self.skipped.len());
        for skipped in &self.skipped {
            let _ = writeln!(
                log,
                "  - line {}: {} for {}: {}",
                skipped.line, skipped.team_name, skipped.record_uid, skipped.reason
            );
        }

        let _ = writeln!(log, "Failed: {}", self.failed.len());
        for failed in &self.failed {
            let _ = writeln!(
                log,
                "  ! {}/{}: {}",
                failed.grant.record_uid, failed.grant.team_name, failed.error
            );
        }
        log
    }
}

/// Reads permission rows, resolves them to grants and applies each grant.
pub struct ApplyPipeline<'a, V: VaultApi, C: ConfigProvider> {
    perms: &'a KeeperPerms<V, C>,
    data: &'a [u8],
    options: ApplyOptions,
}

impl<'a, V: VaultApi, C: ConfigProvider> ApplyPipeline<'a, V, C> {
    pub fn new(perms: &'a KeeperPerms<V, C>, data: &'a [u8], options: ApplyOptions) -> Self {
        Self {
            perms,
            data,
            options,
        }
    }

    async fn apply_grant(&self, root_uid: &str, grant: &Grant) -> Result<()> {
        let TeamFolderPath {
            shared_folder_uid,
            leaf_uid,
            created,
        } = self
            .perms
            .ensure_team_folder_path(&grant.team_name, &grant.folder_path, root_uid)
            .await?;

        if created {
            self.perms.sync().await?;
        }

        self.perms
            .share_record_to_folder(&grant.record_uid, &leaf_uid)
            .await?;
        self.perms
            .add_team_to_shared_folder(&grant.team_uid, &shared_folder_uid, grant.permissions)
            .await
    }
}

#[async_trait]
impl<'a, V: VaultApi, C: ConfigProvider> Pipeline for ApplyPipeline<'a, V, C> {
    type Extracted = Vec<PermissionRow>;
    type Transformed = ApplyPlan;
    type Output = ApplySummary;

    async fn extract(&self) -> Result<Vec<PermissionRow>> {
        let rows = csv_template::read_rows(self.data)?;
        tracing::debug!("Read {} permission rows", rows.len());
        Ok(rows)
    }

    async fn transform(&self, rows: Vec<PermissionRow>) -> Result<ApplyPlan> {
        let teams: HashMap<String, String> = self
            .perms
            .get_teams()
            .await?
            .into_iter()
            .map(|team| (team.team_name.to_lowercase(), team.team_uid))
            .collect();

        let mut plan = ApplyPlan::default();
        for row in rows {
            tracing::debug!("Processing row {}: {}", row.line, row.record_uid);
            for (team_name, level) in &row.cells {
                if level.is_empty() {
                    continue;
                }
                let Some(team_uid) = teams.get(&team_name.to_lowercase()) else {
                    tracing::error!("Team {} not found", team_name);
                    plan.skipped.push(SkippedGrant {
                        line: row.line,
                        record_uid: row.record_uid.clone(),
                        team_name: team_name.clone(),
                        reason: "team not found".to_string(),
                    });
                    continue;
                };
                plan.grants.push(Grant {
                    line: row.line,
                    record_uid: row.record_uid.clone(),
                    folder_path: row.folder_path.clone(),
                    team_name: team_name.clone(),
                    team_uid: team_uid.clone(),
                    level: level.clone(),
                    permissions: permission_level_to_flags(level),
                });
            }
        }
        Ok(plan)
    }

    async fn load(&self, plan: ApplyPlan) -> Result<ApplySummary> {
        let mut summary = ApplySummary {
            dry_run: self.options.dry_run,
            root_name: self.options.root_name.clone(),
            skipped: plan.skipped,
            ..ApplySummary::default()
        };

        if self.options.dry_run {
            for grant in plan.grants {
                tracing::info!(
                    "[DRY-RUN] Would apply {} for team {} to {} in {}",
                    grant.level,
                    grant.team_name,
                    grant.record_uid,
                    grant.folder_path
                );
                summary.applied.push(grant);
            }
            tracing::info!("Dry-run complete, no changes applied or logged to vault.");
            return Ok(summary);
        }

        let root_uid = self.perms.ensure_root_folder(&self.options.root_name).await?;

        for grant in plan.grants {
            match self.apply_grant(&root_uid, &grant).await {
                Ok(()) => {
                    tracing::info!(
                        "✅ Applied {} for team {} to {}",
                        grant.level,
                        grant.team_name,
                        grant.record_uid
                    );
                    summary.applied.push(grant);
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to apply permission for {}/{}: {}",
                        grant.record_uid,
                        grant.team_name,
                        e
                    );
                    summary.failed.push(FailedGrant {
                        grant,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.perms.sync().await?;
        tracing::info!("Changes applied successfully");
        Ok(summary)
    }
}
