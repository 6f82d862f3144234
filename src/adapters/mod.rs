//! Concrete implementations of the domain ports.

pub mod http;
pub mod prompt;

pub use http::{HttpRouter, HttpVaultClient};
pub use prompt::InquirePrompt;
