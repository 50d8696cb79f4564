//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod parameters;
pub mod password;
pub mod request;
pub mod resources;

pub use config::{CaasConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, ProvisionError};
pub use parameters::{AssemblyInputs, ParameterTable, REQUIRED_KEYS, assemble_parameters};
pub use password::{PasswordPolicy, generate_password};
pub use request::{ProvisionInput, ProvisionRequest};
pub use resources::{
    AdminCredentials, Certificate, Registry, Resolved, ResourceGroup, Session, Vault,
};
