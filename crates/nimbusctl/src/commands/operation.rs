//! `nimbusctl operation` subcommands
//!
//! Direct access to the operation tracking endpoints, for re-querying an
//! operation after a timeout or resuming a wait from another terminal.

use tracing::debug;

use nimbusctl_core::{
    CoreError, FailureReason, ManagementApi, OperationStatus, OperationTracker, cancel_pair,
};

use crate::cli::OperationCommands;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{OutputFormat, print_output};

use super::wait::{poll_policy, spinner_progress};

pub async fn handle(
    cmd: OperationCommands,
    conn: &ConnectionManager,
    profile: Option<&str>,
    output: OutputFormat,
) -> CliResult<()> {
    match cmd {
        OperationCommands::Status { tracking_id } => {
            status(conn, profile, &tracking_id, output).await
        }
        OperationCommands::Wait {
            tracking_id,
            timeout,
            interval,
        } => wait(conn, profile, &tracking_id, timeout, interval, output).await,
    }
}

/// One status poll, no retry loop.
async fn status(
    conn: &ConnectionManager,
    profile: Option<&str>,
    tracking_id: &str,
    output: OutputFormat,
) -> CliResult<()> {
    let client = conn.create_client(profile)?;
    let descriptor = client.poll_status(tracking_id).await?;
    print_output(&descriptor, output)
}

/// Poll an operation until terminal, Ctrl-C cancels the local wait.
async fn wait(
    conn: &ConnectionManager,
    profile: Option<&str>,
    tracking_id: &str,
    timeout_secs: u64,
    interval_secs: u64,
    output: OutputFormat,
) -> CliResult<()> {
    let client = conn.create_client(profile)?;
    let (pb, progress) = spinner_progress(format!("Waiting for operation {tracking_id}"));

    // Cancelling only stops the local wait; the operation keeps running
    // server-side and can be re-queried with `operation status`.
    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("ctrl-c received, cancelling wait");
            handle.cancel();
        }
    });

    let tracker = OperationTracker::new(&client, poll_policy(timeout_secs, interval_secs))
        .with_cancel(token)
        .with_progress(progress);

    match tracker.track(tracking_id).await {
        Ok(descriptor) => {
            if descriptor.status == OperationStatus::Failed {
                return Err(CoreError::OperationFailed {
                    tracking_id: descriptor.tracking_id.clone(),
                    status_message: descriptor.status_message.clone().unwrap_or_default(),
                    reason: FailureReason::Reported,
                }
                .into());
            }
            print_output(&descriptor, output)
        }
        Err(e) => {
            pb.finish_and_clear();
            Err(e.into())
        }
    }
}
