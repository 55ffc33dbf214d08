//! Interactive confirmation for destructive operations
//!
//! The prompt surface is an injected capability with two implementations: a
//! real terminal prompt (in the CLI crate) and a scripted double for
//! non-interactive and test runs. The coordinator records every request it
//! handles so scripted runs can verify the exact prompt that would have been
//! shown. Declining is a valid outcome, not an error: the executor returns an
//! empty result sequence without contacting the remote API.

use std::sync::Mutex;

use tracing::debug;

/// Index of the accepting choice in a standard proceed/cancel request
pub const CHOICE_PROCEED: usize = 0;
/// Index of the declining choice; decline is identified by index, never by
/// matching label text
pub const CHOICE_DECLINE: usize = 1;

/// Attempts at reading a valid interactive answer before falling back to the
/// default choice
const MAX_PROMPT_ATTEMPTS: usize = 3;

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub help: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, help: impl Into<String>) -> Self {
        Choice {
            label: label.into(),
            help: help.into(),
        }
    }
}

/// A confirmation prompt: created by the executor immediately before a
/// flagged dispatch, consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub message: String,
    pub caption: String,
    pub choices: Vec<Choice>,
    pub default_index: usize,
}

impl ConfirmationRequest {
    /// Standard destructive-operation prompt: proceed/cancel, defaulting to
    /// cancel.
    pub fn proceed_or_cancel(caption: impl Into<String>, message: impl Into<String>) -> Self {
        ConfirmationRequest {
            message: message.into(),
            caption: caption.into(),
            choices: vec![
                Choice::new("Yes", "Continue with the operation"),
                Choice::new("No", "Abort without contacting the service"),
            ],
            default_index: CHOICE_DECLINE,
        }
    }

    /// Whether the given answer declines the operation.
    #[must_use]
    pub fn is_decline(&self, choice: usize) -> bool {
        choice == CHOICE_DECLINE
    }
}

/// Pluggable prompt surface.
///
/// `present` blocks for one interactive round and returns the chosen index.
/// An error (closed terminal, unparseable input) makes the coordinator
/// re-prompt up to a bound, then fall back to the request's default.
pub trait PromptSurface: Send + Sync {
    fn present(&self, request: &ConfirmationRequest) -> std::io::Result<usize>;
}

/// Scripted double: returns a pre-programmed answer and records what it was
/// shown. The seam for deterministic, non-interactive testing.
pub struct ScriptedSurface {
    answer: usize,
    seen: Mutex<Vec<ConfirmationRequest>>,
}

impl ScriptedSurface {
    pub fn new(answer: usize) -> Self {
        ScriptedSurface {
            answer,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every request this surface was asked to present, in order.
    pub fn seen(&self) -> Vec<ConfirmationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl PromptSurface for ScriptedSurface {
    fn present(&self, request: &ConfirmationRequest) -> std::io::Result<usize> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.answer)
    }
}

/// One handled confirmation: the prompt that was (or would have been) shown
/// and the answer it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub request: ConfirmationRequest,
    pub answer: usize,
}

impl RecordedPrompt {
    #[must_use]
    pub fn declined(&self) -> bool {
        self.request.is_decline(self.answer)
    }
}

/// Collects one answer per confirmation request, interactively or scripted.
pub struct ConfirmationCoordinator {
    surface: Box<dyn PromptSurface>,
    recorded: Mutex<Vec<RecordedPrompt>>,
}

impl ConfirmationCoordinator {
    pub fn new(surface: Box<dyn PromptSurface>) -> Self {
        ConfirmationCoordinator {
            surface,
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Resolve one confirmation request to a choice index.
    ///
    /// A pre-supplied scripted answer short-circuits all interactive I/O;
    /// the request is still recorded so callers can verify the prompt that
    /// would have been shown. Interactively, an invalid or failed read
    /// re-prompts up to a bound and then falls back to the default choice.
    pub fn confirm(&self, request: &ConfirmationRequest, scripted_answer: Option<usize>) -> usize {
        let answer = self.resolve(request, scripted_answer);
        self.recorded.lock().unwrap().push(RecordedPrompt {
            request: request.clone(),
            answer,
        });
        answer
    }

    fn resolve(&self, request: &ConfirmationRequest, scripted_answer: Option<usize>) -> usize {
        if let Some(answer) = scripted_answer {
            debug!(caption = %request.caption, answer, "confirmation answered by script");
            return answer;
        }

        for _ in 0..MAX_PROMPT_ATTEMPTS {
            match self.surface.present(request) {
                Ok(choice) if choice < request.choices.len() => return choice,
                Ok(choice) => {
                    debug!(choice, "choice out of range, re-prompting");
                }
                Err(e) => {
                    debug!(error = %e, "prompt failed, re-prompting");
                }
            }
        }

        debug!(
            default = request.default_index,
            "prompt attempts exhausted, using default choice"
        );
        request.default_index
    }

    /// Every confirmation this coordinator handled, in order.
    pub fn recorded(&self) -> Vec<RecordedPrompt> {
        self.recorded.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Surface whose answers are consumed one per present() call.
    struct FlakySurface {
        answers: Mutex<Vec<std::io::Result<usize>>>,
        presented: Mutex<usize>,
    }

    impl FlakySurface {
        fn new(answers: Vec<std::io::Result<usize>>) -> Self {
            FlakySurface {
                answers: Mutex::new(answers),
                presented: Mutex::new(0),
            }
        }
    }

    impl PromptSurface for FlakySurface {
        fn present(&self, _request: &ConfirmationRequest) -> std::io::Result<usize> {
            *self.presented.lock().unwrap() += 1;
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                Err(std::io::Error::other("no input"))
            } else {
                answers.remove(0)
            }
        }
    }

    fn request() -> ConfirmationRequest {
        ConfirmationRequest::proceed_or_cancel(
            "Remove image",
            "This operation deletes the image 'base' from the library.",
        )
    }

    #[test]
    fn test_scripted_answer_skips_interactive_io() {
        let surface = ScriptedSurface::new(CHOICE_PROCEED);
        let coordinator = ConfirmationCoordinator::new(Box::new(surface));

        let answer = coordinator.confirm(&request(), Some(CHOICE_DECLINE));

        assert_eq!(answer, CHOICE_DECLINE);
        // The request is recorded even though nothing was presented.
        let recorded = coordinator.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].request.caption, "Remove image");
        assert_eq!(recorded[0].answer, CHOICE_DECLINE);
        assert!(recorded[0].declined());
    }

    #[test]
    fn test_interactive_answer_returned() {
        let coordinator =
            ConfirmationCoordinator::new(Box::new(FlakySurface::new(vec![Ok(CHOICE_PROCEED)])));
        assert_eq!(coordinator.confirm(&request(), None), CHOICE_PROCEED);
    }

    #[test]
    fn test_invalid_input_reprompts_then_succeeds() {
        let coordinator = ConfirmationCoordinator::new(Box::new(FlakySurface::new(vec![
            Ok(9), // out of range
            Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "??")),
            Ok(CHOICE_PROCEED),
        ])));
        assert_eq!(coordinator.confirm(&request(), None), CHOICE_PROCEED);
    }

    #[test]
    fn test_exhausted_retries_fall_back_to_default() {
        let coordinator = ConfirmationCoordinator::new(Box::new(FlakySurface::new(vec![])));
        let req = request();
        assert_eq!(coordinator.confirm(&req, None), req.default_index);
    }

    #[test]
    fn test_decline_identified_by_index_not_label() {
        let mut req = request();
        // Relabeling must not change which index declines.
        req.choices[CHOICE_DECLINE].label = "Abort".to_string();
        assert!(req.is_decline(CHOICE_DECLINE));
        assert!(!req.is_decline(CHOICE_PROCEED));
    }

    #[test]
    fn test_scripted_surface_records_requests() {
        let surface = ScriptedSurface::new(CHOICE_PROCEED);
        let req = request();
        assert_eq!(surface.present(&req).unwrap(), CHOICE_PROCEED);
        let seen = surface.seen();
        assert_eq!(seen, vec![req]);
    }
}
