pub mod perms_commands;

use crate::adapters::{HttpRouter, HttpVaultClient, InquirePrompt};
use crate::config::cli::LocalStorage;
use crate::config::toml_config::OpsConfig;
use crate::config::{Cli, Commands, PermsCommand};
use crate::core::{ConfigProvider, KeeperPerms, VaultApi};
use crate::domain::ports::GatewayRouter;
use crate::rm::RemoteManager;
use crate::utils::display::Painter;
use crate::utils::error::{OpsError, Result};

pub use perms_commands::PermsCommands;

/// Builds the HTTP adapters from `config` and runs the parsed command.
pub async fn execute(cli: &Cli, config: OpsConfig) -> Result<String> {
    let painter = Painter::new(cli.color.is_enabled());
    let vault = HttpVaultClient::from_config(&config)?;

    match &cli.command {
        Commands::Perms { command } => {
            let interactive = matches!(command, PermsCommand::Apply(args) if args.interactive);
            let mut perms = KeeperPerms::new(vault, config);
            if interactive {
                perms = perms.interactive(Box::new(InquirePrompt));
            }
            PermsCommands::new(perms, LocalStorage::current_dir(), painter)
                .run(command)
                .await
        }
        command => {
            let router = HttpRouter::from_config(&config)?;
            let manager = RemoteManager::new(vault, router, Box::new(InquirePrompt), painter);
            manager.sync().await?;
            run_remote(&manager, command).await
        }
    }
}

/// Runs one `pam-rm-*` command against an already synced manager.
pub async fn run_remote<V: VaultApi, R: GatewayRouter>(
    manager: &RemoteManager<V, R>,
    command: &Commands,
) -> Result<String> {
    match command {
        Commands::UserAdd(args) => manager.create_user(args).await,
        Commands::UserDelete(args) => manager.delete_user(args).await,
        Commands::RoleCreate(args) => manager.create_role(args).await,
        Commands::RoleDelete(args) => manager.delete_role(args).await,
        Commands::GroupDelete(args) => manager.delete_group(args).await,
        Commands::RoleAddUser(args) => manager.add_user_to_role(args).await,
        Commands::RoleList(args) => manager.get_roles(args).await,
        Commands::Script(args) => manager.run_script(args).await,
        Commands::Perms { .. } => Err(OpsError::usage(
            "perms commands are not handled by the remote manager",
        )),
    }
}

/// `[vault]` and `[router]` settings resolved for logging.
pub fn describe_endpoints<C: ConfigProvider>(config: &C) -> String {
    format!(
        "vault={} router={} timeout={}s",
        config.vault_endpoint(),
        config.router_endpoint(),
        config.timeout_seconds()
    )
}
