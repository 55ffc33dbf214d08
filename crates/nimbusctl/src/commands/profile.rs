//! `nimbusctl profile` subcommands

use serde_json::json;
use tracing::info;

use crate::cli::ProfileCommands;
use crate::config::Profile;
use crate::connection::ConnectionManager;
use crate::error::{CliError, Result as CliResult};
use crate::output::{OutputFormat, print_output};

pub async fn handle(
    cmd: ProfileCommands,
    conn: &mut ConnectionManager,
    output: OutputFormat,
) -> CliResult<()> {
    match cmd {
        ProfileCommands::List => list(conn, output),
        ProfileCommands::Set {
            name,
            endpoint,
            subscription,
            token,
        } => set(conn, &name, endpoint, subscription, token),
        ProfileCommands::Show { name } => show(conn, name.as_deref(), output),
        ProfileCommands::Remove { name } => remove(conn, &name),
        ProfileCommands::Default { name } => set_default(conn, &name),
    }
}

fn list(conn: &ConnectionManager, output: OutputFormat) -> CliResult<()> {
    let rows: Vec<serde_json::Value> = conn
        .config
        .profiles
        .iter()
        .map(|(name, profile)| {
            json!({
                "name": name,
                "endpoint": profile.endpoint,
                "subscription": profile.subscription_id,
                "default": conn.config.default_profile.as_deref() == Some(name.as_str()),
            })
        })
        .collect();
    print_output(&rows, output)
}

fn set(
    conn: &mut ConnectionManager,
    name: &str,
    endpoint: String,
    subscription: String,
    token: String,
) -> CliResult<()> {
    conn.config.set_profile(
        name,
        Profile {
            endpoint,
            subscription_id: subscription,
            token,
        },
    );
    conn.save_config()?;
    info!(name, "profile saved");
    println!("Profile '{name}' saved");
    Ok(())
}

/// Show a profile with the token elided.
fn show(conn: &ConnectionManager, name: Option<&str>, output: OutputFormat) -> CliResult<()> {
    let (resolved, profile) = conn.config.resolve_profile(name).map_err(|e| match e {
        crate::config::ConfigError::NoDefaultProfile => CliError::NoProfileConfigured,
        crate::config::ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound { name },
        other => CliError::Config(other),
    })?;
    print_output(
        &json!({
            "name": resolved,
            "endpoint": profile.endpoint,
            "subscription": profile.subscription_id,
            "token": "***",
        }),
        output,
    )
}

fn remove(conn: &mut ConnectionManager, name: &str) -> CliResult<()> {
    conn.config
        .remove_profile(name)
        .map_err(|e| match e {
            crate::config::ConfigError::ProfileNotFound { name } => {
                CliError::ProfileNotFound { name }
            }
            other => CliError::Config(other),
        })?;
    conn.save_config()?;
    println!("Profile '{name}' removed");
    Ok(())
}

fn set_default(conn: &mut ConnectionManager, name: &str) -> CliResult<()> {
    if !conn.config.profiles.contains_key(name) {
        return Err(CliError::ProfileNotFound {
            name: name.to_string(),
        });
    }
    conn.config.default_profile = Some(name.to_string());
    conn.save_config()?;
    println!("Default profile set to '{name}'");
    Ok(())
}
