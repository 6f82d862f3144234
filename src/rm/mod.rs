//! Remote management of accounts on PAM gateways (`pam-rm-*` commands).

pub mod action;
pub mod commands;
pub mod gateway;
pub mod meta;
pub mod types;

pub use commands::RemoteManager;
pub use gateway::GatewayContext;
