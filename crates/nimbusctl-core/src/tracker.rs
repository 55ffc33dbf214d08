//! Operation tracking: poll a long-running operation to a terminal state
//!
//! Dispatched mutations are acknowledged with a tracking id which must be
//! polled until the provider reports Succeeded or Failed. Polling backs off
//! exponentially up to a ceiling, retries transient poll faults in place,
//! honors an overall wait budget, and stops promptly on cooperative
//! cancellation. Progress events are emitted through an optional callback so
//! a UI can drive spinners without the core knowing about terminals.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::api::ManagementApi;
use crate::error::{CoreError, FailureReason, Result};
use crate::operation::OperationDescriptor;

/// Polling configuration.
///
/// Defaults: start at 1s, double to a 30s ceiling, give up after 300s
/// overall, retry each transiently failing poll 3 times in place.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the second poll; doubles each iteration
    pub initial_interval: Duration,
    /// Backoff ceiling; intervals never exceed this
    pub max_interval: Duration,
    /// Overall wait budget; exceeding it while in progress is a timeout
    pub max_wait: Duration,
    /// In-place retries for a transiently failing poll request
    pub transient_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            max_wait: Duration::from_secs(300),
            transient_retries: 3,
        }
    }
}

/// Progress events emitted while tracking an operation
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Tracking has started
    Started { tracking_id: String },
    /// One polling iteration with the currently reported status
    Polling {
        tracking_id: String,
        status: String,
        elapsed: Duration,
    },
    /// The operation reached terminal Succeeded
    Completed { tracking_id: String },
    /// The operation reached terminal Failed
    Failed {
        tracking_id: String,
        message: String,
    },
}

/// Callback type for progress updates; the CLI wires this to a spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Create a linked cancellation pair.
///
/// The handle side requests cancellation; the token side is observed by the
/// tracker between poll iterations. Cancelling does not abort the remote
/// operation, only local tracking.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Requests cancellation of an in-flight `track` call.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observed cooperatively by the tracker between polls.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is requested. If the handle was dropped
    /// without cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Polls one operation to a terminal state against a [`ManagementApi`].
pub struct OperationTracker<'a, A: ManagementApi + ?Sized> {
    api: &'a A,
    policy: PollPolicy,
    cancel: Option<CancelToken>,
    on_progress: Option<ProgressCallback>,
}

impl<'a, A: ManagementApi + ?Sized> OperationTracker<'a, A> {
    pub fn new(api: &'a A, policy: PollPolicy) -> Self {
        OperationTracker {
            api,
            policy,
            cancel: None,
            on_progress: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Poll until the operation reports a terminal status.
    ///
    /// Returns the terminal descriptor (Succeeded or Failed; never
    /// InProgress). Fails with `OperationTimeout` when the wait budget runs
    /// out, `OperationCancelled` on cooperative abort, and `OperationFailed`
    /// (reason `status-poll-failed`) when a poll faults non-transiently.
    pub async fn track(&self, tracking_id: &str) -> Result<OperationDescriptor> {
        let start = Instant::now();
        let mut interval = self.policy.initial_interval;

        debug!(tracking_id, "tracking operation");
        self.emit(ProgressEvent::Started {
            tracking_id: tracking_id.to_string(),
        });

        loop {
            if self.cancelled() {
                debug!(tracking_id, "tracking cancelled before poll");
                return Err(CoreError::OperationCancelled {
                    tracking_id: tracking_id.to_string(),
                });
            }

            match self.poll_once(tracking_id).await? {
                Some(descriptor) => {
                    let elapsed = start.elapsed();
                    self.emit(ProgressEvent::Polling {
                        tracking_id: tracking_id.to_string(),
                        status: descriptor.status.to_string(),
                        elapsed,
                    });
                    trace!(tracking_id, status = %descriptor.status, ?elapsed, "poll result");

                    if descriptor.status.is_terminal() {
                        self.emit_terminal(&descriptor);
                        return Ok(descriptor);
                    }
                }
                // Transient retries exhausted; counts as elapsed time only.
                None => warn!(tracking_id, "poll failing transiently, will retry"),
            }

            if start.elapsed() >= self.policy.max_wait {
                debug!(tracking_id, "wait budget exhausted");
                return Err(CoreError::OperationTimeout {
                    tracking_id: tracking_id.to_string(),
                    waited: start.elapsed(),
                });
            }

            self.sleep_or_cancel(tracking_id, interval).await?;
            interval = (interval * 2).min(self.policy.max_interval);
        }
    }

    /// One polling iteration with in-place transient retries.
    ///
    /// `Ok(None)` means every attempt failed transiently; the caller treats
    /// that as elapsed time, not as an error. Non-transient faults end
    /// tracking as an operation failure so the tracker surfaces only
    /// operation-level errors.
    async fn poll_once(&self, tracking_id: &str) -> Result<Option<OperationDescriptor>> {
        for attempt in 0..=self.policy.transient_retries {
            match self.api.poll_status(tracking_id).await {
                Ok(descriptor) => return Ok(Some(descriptor)),
                Err(e) if e.is_transient() => {
                    trace!(tracking_id, attempt, error = %e, "transient poll fault");
                }
                Err(e) => {
                    return Err(CoreError::OperationFailed {
                        tracking_id: tracking_id.to_string(),
                        status_message: e.to_string(),
                        reason: FailureReason::StatusPollFailed,
                    });
                }
            }
        }
        Ok(None)
    }

    async fn sleep_or_cancel(&self, tracking_id: &str, interval: Duration) -> Result<()> {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => Ok(()),
                    _ = token.cancelled() => Err(CoreError::OperationCancelled {
                        tracking_id: tracking_id.to_string(),
                    }),
                }
            }
            None => {
                tokio::time::sleep(interval).await;
                Ok(())
            }
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(cb) = &self.on_progress {
            cb(event);
        }
    }

    fn emit_terminal(&self, descriptor: &OperationDescriptor) {
        use crate::operation::OperationStatus;
        match descriptor.status {
            OperationStatus::Succeeded => self.emit(ProgressEvent::Completed {
                tracking_id: descriptor.tracking_id.clone(),
            }),
            OperationStatus::Failed => self.emit(ProgressEvent::Failed {
                tracking_id: descriptor.tracking_id.clone(),
                message: descriptor.status_message.clone().unwrap_or_default(),
            }),
            OperationStatus::InProgress => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{DispatchOutcome, OperationStatus, RequestDescriptor};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted API double: each poll consumes the next queued response.
    struct PollScript {
        responses: Mutex<Vec<Result<OperationDescriptor>>>,
        polls: AtomicUsize,
    }

    impl PollScript {
        fn new(responses: Vec<Result<OperationDescriptor>>) -> Self {
            PollScript {
                responses: Mutex::new(responses),
                polls: AtomicUsize::new(0),
            }
        }

        fn poll_count(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ManagementApi for PollScript {
        async fn invoke(&self, _request: &RequestDescriptor) -> Result<DispatchOutcome> {
            unimplemented!("tracker tests never dispatch")
        }

        async fn poll_status(&self, tracking_id: &str) -> Result<OperationDescriptor> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                // Script exhausted: keep reporting in-progress.
                Ok(OperationDescriptor::in_progress(tracking_id))
            } else {
                responses.remove(0)
            }
        }

        async fn fetch_result(&self, _tracking_id: &str) -> Result<Value> {
            unimplemented!("tracker tests never fetch")
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(4),
            max_wait: Duration::from_millis(80),
            transient_retries: 2,
        }
    }

    fn terminal(tracking_id: &str, status: OperationStatus) -> OperationDescriptor {
        OperationDescriptor {
            tracking_id: tracking_id.to_string(),
            status,
            status_message: None,
            http_status_code: None,
        }
    }

    #[tokio::test]
    async fn test_returns_on_first_terminal_status() {
        let api = PollScript::new(vec![
            Ok(OperationDescriptor::in_progress("op-1")),
            Ok(terminal("op-1", OperationStatus::Succeeded)),
        ]);

        let tracker = OperationTracker::new(&api, fast_policy());
        let descriptor = tracker.track("op-1").await.unwrap();

        assert_eq!(descriptor.status, OperationStatus::Succeeded);
        assert_eq!(api.poll_count(), 2);
    }

    #[tokio::test]
    async fn test_returns_terminal_failed_descriptor() {
        let api = PollScript::new(vec![Ok(OperationDescriptor {
            tracking_id: "op-2".into(),
            status: OperationStatus::Failed,
            status_message: Some("QuotaExceeded".into()),
            http_status_code: None,
        })]);

        let tracker = OperationTracker::new(&api, fast_policy());
        let descriptor = tracker.track("op-2").await.unwrap();

        assert_eq!(descriptor.status, OperationStatus::Failed);
        assert_eq!(descriptor.status_message.as_deref(), Some("QuotaExceeded"));
    }

    #[tokio::test]
    async fn test_timeout_after_budget_with_bounded_polls() {
        // Script exhausted immediately: every poll reports in-progress.
        let api = PollScript::new(vec![]);

        let policy = fast_policy();
        let max_wait = policy.max_wait;
        let tracker = OperationTracker::new(&api, policy);
        let err = tracker.track("op-3").await.unwrap_err();

        assert!(err.is_timeout());
        assert!(api.poll_count() >= 1);
        // Backoff bounds the iteration count well below budget/initial.
        let ceiling = (max_wait.as_millis() + 1) as usize;
        assert!(api.poll_count() <= ceiling, "polled {} times", api.poll_count());
    }

    #[tokio::test]
    async fn test_transient_poll_faults_retried_in_place() {
        let api = PollScript::new(vec![
            Err(CoreError::http(503, "backend unavailable")),
            Err(CoreError::request_timeout("poll timed out")),
            Ok(terminal("op-4", OperationStatus::Succeeded)),
        ]);

        let tracker = OperationTracker::new(&api, fast_policy());
        let descriptor = tracker.track("op-4").await.unwrap();

        assert_eq!(descriptor.status, OperationStatus::Succeeded);
        assert_eq!(api.poll_count(), 3);
    }

    #[tokio::test]
    async fn test_non_transient_poll_fault_is_operation_failure() {
        let api = PollScript::new(vec![Err(CoreError::http(404, "unknown operation"))]);

        let tracker = OperationTracker::new(&api, fast_policy());
        let err = tracker.track("op-5").await.unwrap_err();

        match err {
            CoreError::OperationFailed {
                tracking_id,
                reason,
                ..
            } => {
                assert_eq!(tracking_id, "op-5");
                assert_eq!(reason, FailureReason::StatusPollFailed);
            }
            other => panic!("expected OperationFailed, got {other:?}"),
        }
        assert_eq!(api.poll_count(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_stops_polling_promptly() {
        let api = PollScript::new(vec![]);
        let (handle, token) = cancel_pair();

        let policy = PollPolicy {
            // Long interval so cancellation is observed mid-sleep.
            initial_interval: Duration::from_secs(30),
            max_interval: Duration::from_secs(30),
            max_wait: Duration::from_secs(300),
            transient_retries: 0,
        };

        let tracker = OperationTracker::new(&api, policy).with_cancel(token);
        let track = tracker.track("op-6");
        tokio::pin!(track);

        // Let the first poll happen, then cancel.
        tokio::select! {
            _ = &mut track => panic!("should not finish before cancel"),
            _ = tokio::time::sleep(Duration::from_millis(20)) => handle.cancel(),
        }

        let err = track.await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(api.poll_count(), 1);
    }

    #[tokio::test]
    async fn test_progress_events_reach_callback() {
        let api = PollScript::new(vec![
            Ok(OperationDescriptor::in_progress("op-7")),
            Ok(terminal("op-7", OperationStatus::Succeeded)),
        ]);

        let seen: std::sync::Arc<Mutex<Vec<String>>> = Default::default();
        let sink = seen.clone();
        let tracker = OperationTracker::new(&api, fast_policy()).with_progress(Box::new(
            move |event| {
                let label = match event {
                    ProgressEvent::Started { .. } => "started",
                    ProgressEvent::Polling { .. } => "polling",
                    ProgressEvent::Completed { .. } => "completed",
                    ProgressEvent::Failed { .. } => "failed",
                };
                sink.lock().unwrap().push(label.to_string());
            },
        ));

        tracker.track("op-7").await.unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.first().map(String::as_str), Some("started"));
        assert_eq!(events.last().map(String::as_str), Some("completed"));
        assert!(events.iter().any(|e| e == "polling"));
    }
}
