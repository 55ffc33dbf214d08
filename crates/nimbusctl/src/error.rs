//! Error types for nimbusctl
//!
//! Structured errors via thiserror, with suggestion text printed as a
//! cargo-style diagnostic at the binary edge.

use colored::Colorize;
use nimbusctl_core::CoreError;
use thiserror::Error;

/// Main error type for the nimbusctl application
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'nimbusctl profile set' to configure one.")]
    NoProfileConfigured,

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error(transparent)]
    Operation(#[from] CoreError),

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// A cancelled wait is a clean stop: the binary prints a plain note and
    /// exits 0, never the `error:` diagnostic.
    pub fn is_clean_stop(&self) -> bool {
        matches!(self, CliError::Operation(e) if e.is_cancelled())
    }

    /// Helpful follow-ups for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::ProfileNotFound { name } => vec![
                "List available profiles: nimbusctl profile list".to_string(),
                format!("Create profile '{name}': nimbusctl profile set {name} --endpoint <url> --subscription <id> --token <token>"),
            ],
            CliError::NoProfileConfigured => vec![
                "Create a profile: nimbusctl profile set <name> --endpoint <url> --subscription <id> --token <token>".to_string(),
                "Or export NIMBUS_ENDPOINT, NIMBUS_SUBSCRIPTION_ID and NIMBUS_TOKEN".to_string(),
            ],
            CliError::Operation(e) if e.is_timeout() => vec![
                "The operation keeps running server-side; check it with: nimbusctl operation status <tracking-id>".to_string(),
                "Resume waiting with: nimbusctl operation wait <tracking-id>".to_string(),
            ],
            CliError::Operation(e) if e.is_transient() => vec![
                "The service looks temporarily unavailable; retry the command".to_string(),
            ],
            CliError::InvalidInput { .. } => vec![
                "Check the command syntax: nimbusctl <command> --help".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr.
    pub fn print_diagnostic(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{self}");
        for tip in self.suggestions() {
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{tip}");
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::OutputError {
            message: format!("JSON error: {err}"),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::OutputError {
            message: format!("YAML error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::OutputError {
            message: format!("IO error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_suggestions_point_at_operation_commands() {
        let err = CliError::Operation(CoreError::OperationTimeout {
            tracking_id: "op-1".into(),
            waited: std::time::Duration::from_secs(300),
        });
        let tips = err.suggestions();
        assert!(tips.iter().any(|t| t.contains("operation status")));
        assert!(tips.iter().any(|t| t.contains("operation wait")));
    }

    #[test]
    fn test_cancelled_wait_is_a_clean_stop() {
        let cancelled = CliError::Operation(CoreError::OperationCancelled {
            tracking_id: "op-1".into(),
        });
        assert!(cancelled.is_clean_stop());

        // Everything else still exits through the diagnostic path.
        let timeout = CliError::Operation(CoreError::OperationTimeout {
            tracking_id: "op-1".into(),
            waited: std::time::Duration::from_secs(300),
        });
        assert!(!timeout.is_clean_stop());
        assert!(!CliError::NoProfileConfigured.is_clean_stop());
    }

    #[test]
    fn test_core_error_displays_transparently() {
        let err = CliError::Operation(CoreError::http(503, "backend unavailable"));
        assert!(err.to_string().contains("backend unavailable"));
    }
}
