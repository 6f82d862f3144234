pub const APP_NAME: &str = "commander-ops";
pub const DEFAULT_CONFIG_PATH: &str = "commander-ops.toml";

pub const DEFAULT_ROOT_FOLDER: &str = "[Perms]";
pub const DEFAULT_CONFIG_RECORD_TITLE: &str = "Perms Config";
pub const DEFAULT_CONFIG_FOLDER: &str = "[Perms Config Folder]";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const COLUMN_RECORD_UID: &str = "Record UID";
pub const COLUMN_TITLE: &str = "Title";
pub const COLUMN_FOLDER_PATH: &str = "Folder Path";
pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_RECORD_UID, COLUMN_TITLE, COLUMN_FOLDER_PATH];

pub const CSV_MIME_TYPE: &str = "text/csv";
pub const LOG_MIME_TYPE: &str = "text/plain";
