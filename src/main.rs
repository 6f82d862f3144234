use clap::Parser;
use commander_ops::constants::APP_NAME;
use commander_ops::utils::error::ErrorSeverity;
use commander_ops::utils::{logger, validation::Validate};
use commander_ops::{app, Cli, OpsConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("Starting {} with {:?}", APP_NAME, cli.command);

    let result = match OpsConfig::from_file(&cli.config) {
        Ok(config) => match config.validate() {
            Ok(()) => {
                tracing::debug!("{}", app::describe_endpoints(&config));
                app::execute(&cli, config).await
            }
            Err(e) => {
                tracing::error!("❌ Configuration validation failed: {}", e);
                Err(e)
            }
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
