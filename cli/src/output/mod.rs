//! Output formatting module

pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::application::services::provision::ProvisionOutcome;
use crate::domain::config::CaasConfig;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// Print the final provisioning summary. The admin password is never shown.
    pub fn render_outcome(&self, outcome: &ProvisionOutcome) {
        if self.quiet {
            return;
        }
        println!();
        self.header("Cluster infrastructure");
        self.kv("subscription   ", &outcome.session.subscription_name);
        self.kv("resource group ", &outcome.resource_group.get().name);
        self.kv("location       ", &outcome.resource_group.get().location);
        self.kv("registry       ", &outcome.registry.get().login_server);
        self.kv("key vault      ", &outcome.vault.get().uri);
        self.kv("certificate    ", &outcome.certificate.get().thumbprint);
        self.kv("admin user     ", &outcome.credentials.get().username);
        self.kv("admin secret   ", &outcome.credentials.get().secret_name);
        self.kv("deployment     ", &outcome.deployment.provisioning_state);
        if let Some(finished) = outcome.deployment.timestamp {
            self.kv("finished       ", &finished.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        }

        let created = outcome.created();
        println!();
        if created.is_empty() {
            self.info("all resources already existed");
        } else {
            self.header("Created this run");
            for item in &created {
                println!("    {item}");
            }
        }
    }

    /// Print an info message prefixed with `i`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "i".style(self.styles.info));
        }
    }

    /// Print the effective configuration as `key: value` lines.
    pub fn render_config(&self, config: &CaasConfig, path: &std::path::Path) {
        self.header("Configuration");
        self.kv("file", &path.display().to_string());
        println!();
        for (key, value) in config.entries() {
            println!("  {key}: {value}");
        }
    }
}
