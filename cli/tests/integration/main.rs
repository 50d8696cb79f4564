//! Integration tests for caas-deploy
//!
//! These tests spawn the actual binary and test end-to-end behavior that
//! does not need a cloud account.

mod config_command;
