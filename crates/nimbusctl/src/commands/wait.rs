//! Spinner-backed progress reporting for tracked operations
//!
//! Bridges the core tracker's [`ProgressEvent`] stream to an indicatif
//! spinner so the terminal shows live status while a removal or an explicit
//! `operation wait` polls the service.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use nimbusctl_core::{PollPolicy, ProgressCallback, ProgressEvent};

use crate::cli::WaitArgs;

/// Build a poll policy from user-supplied timeout and interval seconds.
///
/// The backoff ceiling stays at the default unless the requested interval
/// already exceeds it; the interval is clamped to at least one second so a
/// zero never busy-loops the service.
pub(crate) fn poll_policy(timeout_secs: u64, interval_secs: u64) -> PollPolicy {
    let defaults = PollPolicy::default();
    let initial = Duration::from_secs(interval_secs.max(1));
    PollPolicy {
        initial_interval: initial,
        max_interval: defaults.max_interval.max(initial),
        max_wait: Duration::from_secs(timeout_secs),
        transient_retries: defaults.transient_retries,
    }
}

pub(crate) fn policy_from_args(args: &WaitArgs) -> PollPolicy {
    poll_policy(args.wait_timeout, args.wait_interval)
}

fn make_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message);
    pb
}

fn drive(pb: &ProgressBar, event: ProgressEvent) {
    match event {
        ProgressEvent::Started { tracking_id } => {
            pb.set_message(format!("Operation {tracking_id} started"));
        }
        ProgressEvent::Polling {
            tracking_id,
            status,
            elapsed,
        } => {
            pb.set_message(format!(
                "Operation {tracking_id}: {status} ({}s elapsed)",
                elapsed.as_secs()
            ));
        }
        ProgressEvent::Completed { tracking_id } => {
            pb.finish_with_message(format!("Operation {tracking_id}: succeeded"));
        }
        ProgressEvent::Failed {
            tracking_id,
            message,
        } => {
            pb.finish_with_message(format!("Operation {tracking_id} failed: {message}"));
        }
    }
}

/// Create a spinner and a progress callback that drives it.
///
/// The callback finishes the spinner on terminal events; callers must clear
/// it themselves on error paths that never reach a terminal event, such as a
/// wait timeout.
pub(crate) fn spinner_progress(initial_message: String) -> (ProgressBar, ProgressCallback) {
    let pb = make_spinner(initial_message);
    let pb_clone = pb.clone();
    let callback: ProgressCallback = Box::new(move |event| drive(&pb_clone, event));
    (pb, callback)
}

/// Like [`spinner_progress`], but the spinner only starts ticking on the
/// first progress event.
///
/// Tracking begins after any interactive confirmation and only for
/// asynchronous acknowledgements, so a deferred spinner never redraws over a
/// prompt and never dangles after a synchronous response. The returned cell
/// is empty until the first event; callers clear it on non-terminal error
/// paths with [`clear_spinner`].
pub(crate) fn deferred_spinner(
    initial_message: String,
) -> (Arc<OnceLock<ProgressBar>>, ProgressCallback) {
    let cell: Arc<OnceLock<ProgressBar>> = Arc::new(OnceLock::new());
    let shared = cell.clone();
    let callback: ProgressCallback = Box::new(move |event| {
        let pb = shared.get_or_init(|| make_spinner(initial_message.clone()));
        drive(pb, event);
    });
    (cell, callback)
}

pub(crate) fn clear_spinner(cell: &OnceLock<ProgressBar>) {
    if let Some(pb) = cell.get() {
        pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_policy_keeps_default_ceiling_for_small_intervals() {
        let policy = poll_policy(600, 5);
        assert_eq!(policy.initial_interval, Duration::from_secs(5));
        assert_eq!(policy.max_interval, Duration::from_secs(30));
        assert_eq!(policy.max_wait, Duration::from_secs(600));
    }

    #[test]
    fn test_poll_policy_raises_ceiling_to_large_interval() {
        let policy = poll_policy(300, 60);
        assert_eq!(policy.max_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_poll_policy_clamps_zero_interval() {
        let policy = poll_policy(300, 0);
        assert_eq!(policy.initial_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_deferred_spinner_waits_for_first_event() {
        let (cell, callback) = deferred_spinner("Removing disk 'data-0'".into());

        // Nothing on screen while a confirmation could still be pending and
        // nothing dangles if no event ever fires (synchronous response).
        assert!(cell.get().is_none());
        clear_spinner(&cell);
        assert!(cell.get().is_none());

        callback(ProgressEvent::Started {
            tracking_id: "op-1".into(),
        });
        assert!(cell.get().is_some());
    }
}
