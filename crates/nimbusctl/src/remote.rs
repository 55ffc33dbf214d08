//! HTTP client for the Nimbus management API
//!
//! Implements the core's `ManagementApi` boundary over reqwest. Response
//! shape discrimination happens here: `202 Accepted` plus the
//! `x-nimbus-request-id` header acknowledges a long-running operation; any
//! other success carries a synchronous JSON payload. Operation status lives
//! at `/operations/{id}`, completed results at `/operations/{id}/result`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, header};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use nimbusctl_core::{
    CoreError, DispatchOutcome, HttpMethod, ManagementApi, OperationDescriptor, OperationStatus,
    RequestDescriptor, Result,
};

/// Response header correlating every call with a tracking/request id
const REQUEST_ID_HEADER: &str = "x-nimbus-request-id";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client for one subscription on one management endpoint.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
    subscription_id: String,
    token: String,
}

impl ServiceClient {
    pub fn builder() -> ServiceClientBuilder {
        ServiceClientBuilder::default()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}{}",
            self.base_url.trim_end_matches('/'),
            self.subscription_id,
            path
        )
    }

    async fn send(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.url(path);
        trace!(%method, %url, "sending management request");

        let method = match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(classify_reqwest)
    }

    /// Turn an error-status response into a `RemoteInvocation` carrying the
    /// provider's message.
    async fn fail(&self, response: Response) -> CoreError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message(),
            Err(_) => format!("HTTP {status}"),
        };
        CoreError::http(status, message)
    }
}

fn classify_reqwest(err: reqwest::Error) -> CoreError {
    if err.is_timeout() {
        CoreError::request_timeout(err.to_string())
    } else {
        CoreError::unclassified(err)
    }
}

fn request_id(response: &Response) -> Option<String> {
    response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn json_body(response: Response) -> Result<Value> {
    let bytes = response.bytes().await.map_err(classify_reqwest)?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(CoreError::unclassified)
}

/// Provider error envelope: either flat or nested under `error`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Box<ErrorBody>>,
}

impl ErrorBody {
    fn message(&self) -> String {
        if let Some(inner) = &self.error {
            return inner.message();
        }
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "unspecified provider error".to_string(),
        }
    }
}

/// Wire shape of `/operations/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationStatusBody {
    id: String,
    status: OperationStatus,
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    http_status_code: Option<u16>,
}

#[async_trait]
impl ManagementApi for ServiceClient {
    async fn invoke(&self, request: &RequestDescriptor) -> Result<DispatchOutcome> {
        let response = self
            .send(request.method, &request.path, request.body.as_ref())
            .await?;

        if !response.status().is_success() {
            return Err(self.fail(response).await);
        }

        if response.status() == StatusCode::ACCEPTED {
            let tracking_id = request_id(&response).ok_or_else(|| {
                CoreError::http(
                    StatusCode::ACCEPTED.as_u16(),
                    format!("202 response without {REQUEST_ID_HEADER} header"),
                )
            })?;
            debug!(tracking_id, "dispatch acknowledged as long-running operation");
            return Ok(DispatchOutcome::Tracked(OperationDescriptor::in_progress(
                tracking_id,
            )));
        }

        let tracking_id = request_id(&response).unwrap_or_default();
        let payload = json_body(response).await?;
        Ok(DispatchOutcome::Sync {
            operation: OperationDescriptor::succeeded(tracking_id),
            payload,
        })
    }

    async fn poll_status(&self, tracking_id: &str) -> Result<OperationDescriptor> {
        let path = format!("/operations/{tracking_id}");
        let response = self.send(HttpMethod::Get, &path, None).await?;

        if !response.status().is_success() {
            return Err(self.fail(response).await);
        }

        let body: OperationStatusBody = serde_json::from_value(json_body(response).await?)
            .map_err(CoreError::unclassified)?;

        Ok(OperationDescriptor {
            tracking_id: body.id,
            status: body.status,
            status_message: body.error.as_ref().map(ErrorBody::message),
            http_status_code: body.http_status_code,
        })
    }

    async fn fetch_result(&self, tracking_id: &str) -> Result<Value> {
        let path = format!("/operations/{tracking_id}/result");
        let response = self.send(HttpMethod::Get, &path, None).await?;

        if !response.status().is_success() {
            return Err(self.fail(response).await);
        }
        json_body(response).await
    }
}

#[cfg(test)]
impl ServiceClient {
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

/// Builder for [`ServiceClient`]
#[derive(Debug, Default)]
pub struct ServiceClientBuilder {
    base_url: Option<String>,
    subscription_id: Option<String>,
    token: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl ServiceClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn subscription_id(mut self, id: &str) -> Self {
        self.subscription_id = Some(id.to_string());
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn user_agent(mut self, agent: &str) -> Self {
        self.user_agent = Some(agent.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> anyhow::Result<ServiceClient> {
        let base_url = self.base_url.ok_or_else(|| anyhow::anyhow!("base_url is required"))?;
        let subscription_id = self
            .subscription_id
            .ok_or_else(|| anyhow::anyhow!("subscription_id is required"))?;
        let token = self.token.ok_or_else(|| anyhow::anyhow!("token is required"))?;

        let mut http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT));
        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }

        Ok(ServiceClient {
            http: http.build()?,
            base_url,
            subscription_id,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_subscription_and_path() {
        let client = ServiceClient::builder()
            .base_url("https://management.nimbus.cloud/v1/")
            .subscription_id("sub-1234")
            .token("t")
            .build()
            .unwrap();
        assert_eq!(
            client.url("/images"),
            "https://management.nimbus.cloud/v1/sub-1234/images"
        );
    }

    #[test]
    fn test_error_body_message_variants() {
        let flat: ErrorBody =
            serde_json::from_value(serde_json::json!({"code": "QuotaExceeded", "message": "too many disks"}))
                .unwrap();
        assert_eq!(flat.message(), "QuotaExceeded: too many disks");

        let nested: ErrorBody = serde_json::from_value(
            serde_json::json!({"error": {"message": "no such image"}}),
        )
        .unwrap();
        assert_eq!(nested.message(), "no such image");

        let empty: ErrorBody = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.message(), "unspecified provider error");
    }

    #[test]
    fn test_builder_requires_credentials() {
        assert!(ServiceClient::builder().build().is_err());
        assert!(
            ServiceClient::builder()
                .base_url("https://x/v1")
                .subscription_id("s")
                .build()
                .is_err()
        );
    }
}
