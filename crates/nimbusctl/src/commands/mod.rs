//! Command handlers
//!
//! Each submodule owns one top-level noun of the CLI. The entity families
//! (image, disk, addon) share their list/show/remove plumbing through
//! [`resource::ResourceFamily`]; `operation` and `profile` have their own
//! handlers.

pub mod addon;
pub mod disk;
pub mod image;
pub mod operation;
pub mod profile;

mod resource;
mod wait;

use nimbusctl_core::{CHOICE_PROCEED, ConfirmationCoordinator};

use crate::prompt::InteractivePrompt;

/// Coordinator backed by the interactive terminal prompt.
pub(crate) fn interactive_coordinator() -> ConfirmationCoordinator {
    ConfirmationCoordinator::new(Box::new(InteractivePrompt))
}

/// `--yes` pre-answers every confirmation with the proceed choice.
pub(crate) fn scripted_answer(assume_yes: bool) -> Option<usize> {
    assume_yes.then_some(CHOICE_PROCEED)
}
