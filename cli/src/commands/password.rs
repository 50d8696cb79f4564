//! `caas-deploy password` — print a freshly generated admin password.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::domain::password::{PasswordPolicy, generate_password};

/// Arguments for the password command.
#[derive(Args)]
pub struct PasswordArgs {
    /// Lowercase letters to include
    #[arg(long, default_value_t = 10)]
    pub lowercase: usize,
    /// Uppercase letters to include
    #[arg(long, default_value_t = 10)]
    pub uppercase: usize,
    /// Digits to include
    #[arg(long, default_value_t = 10)]
    pub digits: usize,
    /// Symbols to include
    #[arg(long, default_value_t = 2)]
    pub symbols: usize,
}

impl From<&PasswordArgs> for PasswordPolicy {
    fn from(args: &PasswordArgs) -> Self {
        Self {
            lowercase: args.lowercase,
            uppercase: args.uppercase,
            digits: args.digits,
            symbols: args.symbols,
        }
    }
}

/// Run the password command.
///
/// # Errors
///
/// Returns an error if the class counts are all zero or exceed the length limit.
pub fn run(app: &AppContext, args: &PasswordArgs) -> Result<ExitCode> {
    let password = generate_password(&PasswordPolicy::from(args))?;
    if app.is_json() {
        println!("{}", serde_json::json!({ "password": password }));
    } else {
        println!("{password}");
    }
    Ok(ExitCode::SUCCESS)
}
