//! # nimbusctl-core
//!
//! The shared execution core for Nimbus management commands. Every command,
//! whatever resource it touches, goes through the same substrate:
//!
//! - [`executor::ClientActionExecutor`] dispatches a described request,
//!   routes asynchronous acknowledgements through the tracker, maps the
//!   payload, and classifies failures.
//! - [`tracker::OperationTracker`] polls a long-running operation to a
//!   terminal state with backoff, a wait budget, and cooperative
//!   cancellation.
//! - [`mapper`] projects provider entities into uniform [`ResultRecord`]s
//!   from per-variant static field tables.
//! - [`confirm::ConfirmationCoordinator`] gates destructive operations
//!   behind an injected prompt surface with a scripted double for
//!   non-interactive runs.
//!
//! The remote service is reached only through the [`api::ManagementApi`]
//! trait; transport, auth, and credential loading live in the client that
//! implements it.

pub mod api;
pub mod confirm;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod operation;
pub mod tracker;

pub use api::ManagementApi;
pub use confirm::{
    CHOICE_DECLINE, CHOICE_PROCEED, Choice, ConfirmationCoordinator, ConfirmationRequest,
    PromptSurface, RecordedPrompt, ScriptedSurface,
};
pub use error::{CoreError, FailureReason, Result};
pub use executor::{ClientActionExecutor, ClientActionSpec};
pub use mapper::{EntityKind, MapSpec, ResultRecord, map_entities};
pub use operation::{
    DispatchOutcome, HttpMethod, OperationDescriptor, OperationStatus, RequestDescriptor,
};
pub use tracker::{
    CancelHandle, CancelToken, OperationTracker, PollPolicy, ProgressCallback, ProgressEvent,
    cancel_pair,
};
