//! The remote management API boundary
//!
//! Everything below this trait (framing, authentication, transport retries)
//! belongs to the concrete client. The core issues exactly three kinds of
//! calls: dispatch a request, poll an operation's status, and fetch the
//! result of a completed operation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::operation::{DispatchOutcome, OperationDescriptor, RequestDescriptor};

/// Remote service boundary consumed by the executor and tracker.
///
/// Implementations carry the session/credentials; the core never loads
/// credentials itself and never issues concurrent calls against one client.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Dispatch one request. Exactly one network round trip.
    async fn invoke(&self, request: &RequestDescriptor) -> Result<DispatchOutcome>;

    /// Query the current status of a tracked operation.
    async fn poll_status(&self, tracking_id: &str) -> Result<OperationDescriptor>;

    /// Retrieve the payload of an operation that reached terminal Succeeded.
    async fn fetch_result(&self, tracking_id: &str) -> Result<Value>;
}
