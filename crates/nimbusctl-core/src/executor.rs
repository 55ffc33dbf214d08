//! Client action execution: the orchestrator every command is built on
//!
//! `execute` runs one caller-described invocation end to end with a strict
//! ordering guarantee: confirmation precedes dispatch, dispatch precedes
//! tracking, tracking precedes mapping. The remote call is issued exactly
//! once; a declined confirmation short-circuits before any network traffic.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::api::ManagementApi;
use crate::confirm::{ConfirmationCoordinator, ConfirmationRequest};
use crate::error::{CoreError, FailureReason, Result};
use crate::mapper::{MapSpec, ResultRecord, map_entities};
use crate::operation::{DispatchOutcome, OperationDescriptor, OperationStatus, RequestDescriptor};
use crate::tracker::{CancelToken, OperationTracker, PollPolicy, ProgressCallback, ProgressEvent};

/// One command invocation's description: created, used, discarded.
pub struct ClientActionSpec {
    /// Command name stamped on every emitted record, supplied explicitly by
    /// the caller rather than derived from ambient context
    pub description: String,
    pub request: RequestDescriptor,
    pub map: MapSpec,
    /// Present when the operation is destructive and must be confirmed
    pub confirmation: Option<ConfirmationRequest>,
}

impl ClientActionSpec {
    pub fn new(description: impl Into<String>, request: RequestDescriptor, map: MapSpec) -> Self {
        ClientActionSpec {
            description: description.into(),
            request,
            map,
            confirmation: None,
        }
    }

    pub fn with_confirmation(mut self, request: ConfirmationRequest) -> Self {
        self.confirmation = Some(request);
        self
    }
}

/// Executes client actions against one management API session.
///
/// Commands run serially; the executor never parallelizes specs and never
/// issues concurrent calls against its API client.
pub struct ClientActionExecutor<A: ManagementApi> {
    api: A,
    policy: PollPolicy,
    coordinator: ConfirmationCoordinator,
    cancel: Option<CancelToken>,
    on_progress: Option<Arc<dyn Fn(ProgressEvent) + Send + Sync>>,
}

impl<A: ManagementApi> ClientActionExecutor<A> {
    pub fn new(api: A, coordinator: ConfirmationCoordinator) -> Self {
        ClientActionExecutor {
            api,
            policy: PollPolicy::default(),
            coordinator,
            cancel: None,
            on_progress: None,
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(Arc::from(callback));
        self
    }

    /// The confirmation coordinator, exposed so callers can inspect the
    /// prompts that were (or would have been) shown.
    pub fn coordinator(&self) -> &ConfirmationCoordinator {
        &self.coordinator
    }

    /// The underlying API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run one client action to completion.
    ///
    /// Returns the mapped result records, or an empty sequence when a flagged
    /// operation was declined (no remote call is made in that case).
    /// `scripted_answer` pre-answers the confirmation for non-interactive
    /// runs.
    #[instrument(skip_all, fields(command = %spec.description))]
    pub async fn execute(
        &self,
        spec: &ClientActionSpec,
        scripted_answer: Option<usize>,
    ) -> Result<Vec<ResultRecord>> {
        if let Some(confirmation) = &spec.confirmation {
            let choice = self.coordinator.confirm(confirmation, scripted_answer);
            if confirmation.is_decline(choice) {
                debug!("confirmation declined, skipping dispatch");
                return Ok(Vec::new());
            }
        }

        trace!(method = %spec.request.method, path = %spec.request.path, "dispatching");
        let outcome = self.api.invoke(&spec.request).await?;

        let (operation, payload) = match outcome {
            DispatchOutcome::Sync { operation, payload } => (operation, payload),
            DispatchOutcome::Tracked(acknowledged) => {
                let terminal = self.resolve(acknowledged).await?;
                if terminal.status == OperationStatus::Failed {
                    return Err(CoreError::OperationFailed {
                        tracking_id: terminal.tracking_id.clone(),
                        status_message: terminal.status_message.unwrap_or_default(),
                        reason: FailureReason::Reported,
                    });
                }
                let payload = self.fetch_completed(&terminal.tracking_id).await?;
                (terminal, payload)
            }
        };

        let records = map_entities(&spec.map, &payload, &operation, &spec.description);
        debug!(
            tracking_id = %operation.tracking_id,
            records = records.len(),
            "client action completed"
        );
        Ok(records)
    }

    /// Track an acknowledged operation to a terminal descriptor. A dispatch
    /// that already reports terminal status skips polling entirely.
    async fn resolve(&self, acknowledged: OperationDescriptor) -> Result<OperationDescriptor> {
        if acknowledged.status.is_terminal() {
            return Ok(acknowledged);
        }

        let mut tracker = OperationTracker::new(&self.api, self.policy.clone());
        if let Some(token) = &self.cancel {
            tracker = tracker.with_cancel(token.clone());
        }
        if let Some(callback) = &self.on_progress {
            let callback = callback.clone();
            tracker = tracker.with_progress(Box::new(move |event| callback(event)));
        }
        tracker.track(&acknowledged.tracking_id).await
    }

    async fn fetch_completed(&self, tracking_id: &str) -> Result<serde_json::Value> {
        match self.api.fetch_result(tracking_id).await {
            Ok(payload) => Ok(payload),
            // Success followed by a missing result is a failure with its own
            // reason code, never silently empty.
            Err(e) if e.is_not_found() => Err(CoreError::OperationFailed {
                tracking_id: tracking_id.to_string(),
                status_message: e.to_string(),
                reason: FailureReason::ResultNotFoundAfterSuccess,
            }),
            Err(e) => Err(e),
        }
    }
}
