//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Nimbus infrastructure-management CLI
#[derive(Parser, Debug)]
#[command(name = "nimbusctl")]
#[command(
    version,
    about = "Manage Nimbus VM images, data disks, and marketplace add-ons"
)]
#[command(long_about = "
Manage Nimbus VM images, data disks, and marketplace add-ons.

EXAMPLES:
    # Set up a profile
    nimbusctl profile set prod --endpoint https://management.nimbus.cloud/v1 \\
        --subscription sub-1234 --token <token>

    # List images as JSON for scripting
    nimbusctl image list -o json

    # Remove a disk, waiting for the operation to finish
    nimbusctl disk remove data-0 --wait

    # Re-query an operation after a timeout
    nimbusctl operation status <tracking-id>

For more help on a specific command, run:
    nimbusctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "NIMBUSCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "NIMBUSCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Answer destructive-operation prompts with yes
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Common arguments for commands that dispatch long-running operations
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait for the operation to complete
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait in seconds
    #[arg(long, default_value = "300", requires = "wait")]
    pub wait_timeout: u64,

    /// Initial polling interval in seconds (doubles up to a ceiling)
    #[arg(long, default_value = "1", requires = "wait")]
    pub wait_interval: u64,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// VM image library
    #[command(subcommand)]
    Image(ImageCommands),

    /// Data disk repository
    #[command(subcommand)]
    Disk(DiskCommands),

    /// Marketplace add-ons
    #[command(subcommand)]
    Addon(AddonCommands),

    /// Long-running operation inspection
    #[command(subcommand)]
    Operation(OperationCommands),

    /// Profile management
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ImageCommands {
    /// List all images in the image library
    List,
    /// Show one image by name
    Show { name: String },
    /// Remove an image from the library (destructive)
    Remove {
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DiskCommands {
    /// List all data disks
    List,
    /// Show one disk by name
    Show { name: String },
    /// Remove a disk (destructive)
    Remove {
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddonCommands {
    /// List purchased marketplace add-ons
    List,
    /// Show one add-on by name
    Show { name: String },
    /// Remove an add-on (destructive)
    Remove {
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum OperationCommands {
    /// Query the current status of an operation
    Status { tracking_id: String },
    /// Poll an operation until it reaches a terminal state
    Wait {
        tracking_id: String,
        /// Maximum time to wait in seconds
        #[arg(long, default_value = "300")]
        timeout: u64,
        /// Initial polling interval in seconds (doubles up to a ceiling)
        #[arg(long, default_value = "1")]
        interval: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommands {
    /// List configured profiles
    List,
    /// Create or update a profile
    Set {
        name: String,
        /// Management API root URL
        #[arg(long)]
        endpoint: String,
        /// Subscription id
        #[arg(long)]
        subscription: String,
        /// Bearer token for the management API
        #[arg(long)]
        token: String,
    },
    /// Show a profile (token elided)
    Show { name: Option<String> },
    /// Remove a profile
    Remove { name: String },
    /// Set the default profile
    Default { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_remove_accepts_wait_flags() {
        let cli = Cli::parse_from([
            "nimbusctl", "disk", "remove", "data-0", "--wait", "--wait-timeout", "600",
        ]);
        match cli.command {
            Commands::Disk(DiskCommands::Remove { name, wait }) => {
                assert_eq!(name, "data-0");
                assert!(wait.wait);
                assert_eq!(wait.wait_timeout, 600);
                assert_eq!(wait.wait_interval, 1);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_global_yes_flag() {
        let cli = Cli::parse_from(["nimbusctl", "image", "remove", "base", "-y"]);
        assert!(cli.yes);
    }
}
