pub mod adapters;
pub mod app;
pub mod config;
pub mod constants;
pub mod core;
pub mod crypto;
pub mod domain;
pub mod rm;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::cli::LocalStorage;
pub use config::toml_config::OpsConfig;
pub use config::Cli;
pub use core::KeeperPerms;
pub use rm::RemoteManager;
pub use utils::error::{OpsError, Result};
