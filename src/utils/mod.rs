pub mod display;
pub mod encoding;
pub mod error;
pub mod logger;
pub mod validation;
