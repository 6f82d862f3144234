pub mod cli;
pub mod toml_config;

use crate::constants::DEFAULT_CONFIG_PATH;
use crate::utils::display::ColorChoice;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "commander-ops")]
#[command(version, about = "Bulk team permissions and remote gateway account management")]
pub struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH, help = "Path to the TOML configuration file")]
    pub config: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Keeper Permissions Automation
    Perms {
        #[command(subcommand)]
        command: PermsCommand,
    },

    /// Create a user through a PAM gateway
    #[command(name = "pam-rm-user-add")]
    UserAdd(CreateUserArgs),

    /// Delete a user through a PAM gateway
    #[command(name = "pam-rm-user-delete")]
    UserDelete(UserTargetArgs),

    /// Create a role through a PAM gateway
    #[command(name = "pam-rm-role-create")]
    RoleCreate(RoleArgs),

    /// Delete a role through a PAM gateway
    #[command(name = "pam-rm-role-delete")]
    RoleDelete(RoleArgs),

    /// Delete a group through a PAM gateway
    #[command(name = "pam-rm-group-delete")]
    GroupDelete(GroupArgs),

    /// Add a user to a role through a PAM gateway
    #[command(name = "pam-rm-role-add")]
    RoleAddUser(AddUserToRoleArgs),

    /// List roles known to a PAM gateway
    #[command(name = "pam-rm-role-list")]
    RoleList(RoleListArgs),

    /// Run a script on a PAM gateway
    #[command(name = "pam-rm-script")]
    Script(RunScriptArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum PermsCommand {
    /// Generate CSV template with vault data
    Template(TemplateArgs),
    /// Validate CSV file before applying
    Validate(ValidateArgs),
    /// Apply permissions from CSV file
    Apply(ApplyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    /// Output CSV path
    pub output: Option<String>,

    /// Store template directly in vault without local file
    #[arg(long)]
    pub vault_only: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to CSV file
    pub csv_path: Option<String>,

    /// Attachment title in vault to validate instead of local path
    #[arg(long)]
    pub vault_csv: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// Path to CSV file
    pub csv_path: Option<String>,

    /// Simulate application without changes
    #[arg(long)]
    pub dry_run: bool,

    /// Enable interactive prompts for folder/record names
    #[arg(long)]
    pub interactive: bool,

    /// Root folder for permissions structure (defaults to perms.root_folder)
    #[arg(long)]
    pub root: Option<String>,

    /// Attachment title in vault to apply instead of local path
    #[arg(long)]
    pub vault_csv: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct GatewayArgs {
    /// Gateway name or UID.
    #[arg(long, short = 'g')]
    pub gateway: String,

    /// Resource UID
    #[arg(long = "resource-uid", short = 'r')]
    pub resource_uid: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateUserArgs {
    #[command(flatten)]
    pub target: GatewayArgs,

    /// User Name
    #[arg(long)]
    pub user: String,

    /// Password
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// Override the connect database
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct UserTargetArgs {
    #[command(flatten)]
    pub target: GatewayArgs,

    /// User UID
    #[arg(long = "user-uid", short = 'u')]
    pub user_uid: Option<String>,

    /// User Name
    #[arg(long)]
    pub user: Option<String>,

    /// Override the connect database
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RoleArgs {
    #[command(flatten)]
    pub target: GatewayArgs,

    /// Role Name
    #[arg(long)]
    pub role: String,

    /// Override the connect database
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct GroupArgs {
    #[command(flatten)]
    pub target: GatewayArgs,

    /// Group Name
    #[arg(long)]
    pub group: String,

    /// Override the connect database
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct AddUserToRoleArgs {
    #[command(flatten)]
    pub user: UserTargetArgs,

    /// Role Name or ID
    #[arg(long)]
    pub role: String,
}

#[derive(Debug, Clone, Args)]
pub struct RoleListArgs {
    #[command(flatten)]
    pub target: GatewayArgs,

    /// User UID
    #[arg(long = "user-uid", short = 'i')]
    pub user_uid: Option<String>,

    /// Exclude users attached to role.
    #[arg(long)]
    pub exclude_users: bool,

    /// Override the connect database
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RunScriptArgs {
    #[command(flatten)]
    pub target: GatewayArgs,

    /// Script File
    #[arg(long = "script-file", short = 'f')]
    pub script_file: String,

    /// User UID
    #[arg(long = "user-uid", short = 'u')]
    pub user_uid: Option<String>,

    /// View the script
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_perms_apply_defaults() {
        let cli = Cli::try_parse_from(["commander-ops", "perms", "apply", "perms.csv", "--dry-run"])
            .unwrap();
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        match cli.command {
            Commands::Perms {
                command: PermsCommand::Apply(args),
            } => {
                assert_eq!(args.csv_path.as_deref(), Some("perms.csv"));
                assert!(args.dry_run);
                assert!(!args.interactive);
                assert!(args.root.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_template_vault_only() {
        let cli = Cli::try_parse_from(["commander-ops", "perms", "template", "--vault-only"]).unwrap();
        match cli.command {
            Commands::Perms {
                command: PermsCommand::Template(args),
            } => {
                assert!(args.vault_only);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_user_add_short_flags() {
        let cli = Cli::try_parse_from([
            "commander-ops",
            "pam-rm-user-add",
            "-g",
            "Gateway 1",
            "--user",
            "jdoe",
            "-p",
            "s3cret",
            "-r",
            "res-uid",
        ])
        .unwrap();
        match cli.command {
            Commands::UserAdd(args) => {
                assert_eq!(args.target.gateway, "Gateway 1");
                assert_eq!(args.target.resource_uid.as_deref(), Some("res-uid"));
                assert_eq!(args.user, "jdoe");
                assert_eq!(args.password.as_deref(), Some("s3cret"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_role_add_and_list() {
        let cli = Cli::try_parse_from([
            "commander-ops",
            "pam-rm-role-add",
            "-g",
            "gw",
            "--role",
            "readers",
            "-u",
            "user-uid",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::RoleAddUser(ref args) if args.user.user_uid.as_deref() == Some("user-uid")
        ));

        let cli = Cli::try_parse_from([
            "commander-ops",
            "pam-rm-role-list",
            "-g",
            "gw",
            "-i",
            "user-uid",
            "--exclude-users",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::RoleList(ref args) if args.exclude_users));
    }

    #[test]
    fn test_gateway_is_required() {
        assert!(Cli::try_parse_from(["commander-ops", "pam-rm-role-create", "--role", "x"]).is_err());
        assert!(Cli::try_parse_from(["commander-ops", "pam-rm-script", "-g", "gw"]).is_err());
    }
}
