pub mod apply;
pub mod csv_template;
pub mod engine;
pub mod permission;
pub mod perms;
pub mod session;
pub mod shared_folder;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, VaultApi};
pub use crate::utils::error::Result;
pub use apply::{ApplyOptions, ApplySummary};
pub use perms::KeeperPerms;
