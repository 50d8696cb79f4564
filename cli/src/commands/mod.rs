//! Command implementations

pub mod config;
pub mod password;
pub mod provision;
pub mod version;
