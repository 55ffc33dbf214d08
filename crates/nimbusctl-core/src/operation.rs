//! Operation descriptors and the two dispatch response shapes
//!
//! Every remote call is described by a [`RequestDescriptor`] and acknowledged
//! in one of two shapes: a synchronous payload ready for mapping, or an
//! operation that has to be tracked to a terminal state. The shape is carried
//! in [`DispatchOutcome`] so the executor dispatches on it without runtime
//! type inspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
}

impl OperationStatus {
    /// Succeeded and Failed are terminal; no further transition occurs.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::InProgress)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationStatus::InProgress => "in-progress",
            OperationStatus::Succeeded => "succeeded",
            OperationStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One remote operation as acknowledged and tracked by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Opaque id correlating the dispatched request with its eventual status
    pub tracking_id: String,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status_code: Option<u16>,
}

impl OperationDescriptor {
    /// Descriptor for a call that completed synchronously.
    pub fn succeeded(tracking_id: impl Into<String>) -> Self {
        OperationDescriptor {
            tracking_id: tracking_id.into(),
            status: OperationStatus::Succeeded,
            status_message: None,
            http_status_code: None,
        }
    }

    /// Descriptor for a freshly acknowledged asynchronous operation.
    pub fn in_progress(tracking_id: impl Into<String>) -> Self {
        OperationDescriptor {
            tracking_id: tracking_id.into(),
            status: OperationStatus::InProgress,
            status_message: None,
            http_status_code: None,
        }
    }
}

/// HTTP method of a management request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Wire-neutral description of one management API request
#[derive(Debug, Clone, Serialize)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Path relative to the subscription root, e.g. `/images`
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn get(path: impl Into<String>) -> Self {
        RequestDescriptor {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        RequestDescriptor {
            method: HttpMethod::Delete,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        RequestDescriptor {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// The two response shapes a dispatch can produce
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The call completed in one round trip; the payload is ready for mapping.
    /// The descriptor is terminal (synthesized from the response request id).
    Sync {
        operation: OperationDescriptor,
        payload: Value,
    },
    /// The call was acknowledged as a long-running operation.
    Tracked(OperationDescriptor),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(OperationStatus::Succeeded.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
        assert!(!OperationStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_status_serde_kebab_case() {
        let json = serde_json::to_string(&OperationStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: OperationStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(back, OperationStatus::Succeeded);
    }

    #[test]
    fn test_descriptor_constructors() {
        let d = OperationDescriptor::in_progress("op-1");
        assert_eq!(d.tracking_id, "op-1");
        assert_eq!(d.status, OperationStatus::InProgress);
        assert!(d.status_message.is_none());

        let d = OperationDescriptor::succeeded("req-7");
        assert!(d.status.is_terminal());
    }

    #[test]
    fn test_request_descriptor_helpers() {
        let r = RequestDescriptor::get("/images");
        assert_eq!(r.method, HttpMethod::Get);
        assert!(r.body.is_none());

        let r = RequestDescriptor::post("/addons", serde_json::json!({"plan": "basic"}));
        assert_eq!(r.method.to_string(), "POST");
        assert!(r.body.is_some());
    }
}
