//! Shared list/show/remove handlers for the managed entity families

use tracing::debug;

use nimbusctl_core::{
    ClientActionExecutor, ClientActionSpec, ConfirmationRequest, DispatchOutcome, EntityKind,
    ManagementApi, MapSpec, RecordedPrompt, RequestDescriptor,
};

use crate::cli::WaitArgs;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{OutputFormat, print_output};

use super::wait::{clear_spinner, deferred_spinner, policy_from_args};
use super::{interactive_coordinator, scripted_answer};

/// One remotely managed entity family and where it lives on the wire.
pub(crate) struct ResourceFamily {
    /// Singular noun used in messages, e.g. "image"
    pub noun: &'static str,
    /// Collection path under the subscription root, e.g. "/images"
    pub path: &'static str,
    pub kind: EntityKind,
    /// Envelope key the list endpoint wraps its entities in
    pub collection: &'static str,
}

impl ResourceFamily {
    fn entity_path(&self, name: &str) -> String {
        format!("{}/{}", self.path, name)
    }

    pub(crate) async fn list(
        &self,
        conn: &ConnectionManager,
        profile: Option<&str>,
        output: OutputFormat,
    ) -> CliResult<()> {
        let client = conn.create_client(profile)?;
        let executor = ClientActionExecutor::new(client, interactive_coordinator());
        let spec = ClientActionSpec::new(
            format!("{} list", self.noun),
            RequestDescriptor::get(self.path),
            MapSpec::collection(self.kind, self.collection),
        );
        let records = executor.execute(&spec, None).await?;
        print_output(&records, output)
    }

    pub(crate) async fn show(
        &self,
        conn: &ConnectionManager,
        profile: Option<&str>,
        name: &str,
        output: OutputFormat,
    ) -> CliResult<()> {
        let client = conn.create_client(profile)?;
        let executor = ClientActionExecutor::new(client, interactive_coordinator());
        let spec = ClientActionSpec::new(
            format!("{} show", self.noun),
            RequestDescriptor::get(self.entity_path(name)),
            MapSpec::entity(self.kind),
        );
        let records = executor.execute(&spec, None).await?;
        print_output(&records, output)
    }

    /// Remove one entity, confirming first unless `--yes` was given.
    ///
    /// With `--wait` the whole action runs through the executor, polling the
    /// acknowledged operation to a terminal state. Without it the request is
    /// dispatched once and an asynchronous acknowledgement is reported as a
    /// tracking id the user can follow up on.
    pub(crate) async fn remove(
        &self,
        conn: &ConnectionManager,
        profile: Option<&str>,
        name: &str,
        wait: &WaitArgs,
        assume_yes: bool,
        output: OutputFormat,
    ) -> CliResult<()> {
        let confirmation = ConfirmationRequest::proceed_or_cancel(
            format!("Remove {}", self.noun),
            format!(
                "This permanently removes {} '{}' from the subscription.",
                self.noun, name
            ),
        );
        let request = RequestDescriptor::delete(self.entity_path(name));
        let answer = scripted_answer(assume_yes);

        if wait.wait {
            let client = conn.create_client(profile)?;
            // Deferred so the spinner cannot draw over the confirmation
            // prompt and never starts for a synchronous response.
            let (spinner, progress) =
                deferred_spinner(format!("Removing {} '{}'", self.noun, name));
            let executor = ClientActionExecutor::new(client, interactive_coordinator())
                .with_poll_policy(policy_from_args(wait))
                .with_progress(progress);
            let spec = ClientActionSpec::new(
                format!("{} remove", self.noun),
                request,
                MapSpec::entity(self.kind),
            )
            .with_confirmation(confirmation);

            match executor.execute(&spec, answer).await {
                Ok(records) => {
                    let declined = executor
                        .coordinator()
                        .recorded()
                        .last()
                        .is_some_and(RecordedPrompt::declined);
                    if declined {
                        debug!(noun = self.noun, name, "removal declined");
                        return Ok(());
                    }
                    match output {
                        OutputFormat::Auto | OutputFormat::Table => {
                            println!("Removed {} '{}'", self.noun, name);
                        }
                        _ => print_output(&records, output)?,
                    }
                    Ok(())
                }
                Err(e) => {
                    clear_spinner(&spinner);
                    Err(e.into())
                }
            }
        } else {
            // Confirmation still precedes any remote call.
            let coordinator = interactive_coordinator();
            let choice = coordinator.confirm(&confirmation, answer);
            if confirmation.is_decline(choice) {
                debug!(noun = self.noun, name, "removal declined");
                return Ok(());
            }

            let client = conn.create_client(profile)?;
            match client.invoke(&request).await? {
                DispatchOutcome::Sync { operation, .. } => match output {
                    OutputFormat::Auto | OutputFormat::Table => {
                        println!("Removed {} '{}'", self.noun, name);
                    }
                    _ => print_output(&operation, output)?,
                },
                DispatchOutcome::Tracked(acknowledged) => match output {
                    OutputFormat::Auto | OutputFormat::Table => {
                        println!("Removal of {} '{}' accepted", self.noun, name);
                        println!("Tracking ID: {}", acknowledged.tracking_id);
                        println!(
                            "To wait for completion, run: nimbusctl operation wait {}",
                            acknowledged.tracking_id
                        );
                    }
                    _ => print_output(&acknowledged, output)?,
                },
            }
            Ok(())
        }
    }
}
