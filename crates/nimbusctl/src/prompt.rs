//! Interactive prompt surface backed by dialoguer

use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;

use nimbusctl_core::{ConfirmationRequest, PromptSurface};

/// Terminal implementation of the confirmation prompt.
///
/// Presents the request's choices as a select list with the default
/// highlighted; dialoguer re-reads until a valid selection, so invalid
/// keystrokes never reach the coordinator.
pub struct InteractivePrompt;

impl PromptSurface for InteractivePrompt {
    fn present(&self, request: &ConfirmationRequest) -> std::io::Result<usize> {
        let items: Vec<String> = request
            .choices
            .iter()
            .map(|choice| {
                if choice.help.is_empty() {
                    choice.label.clone()
                } else {
                    format!("{} ({})", choice.label, choice.help)
                }
            })
            .collect();

        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{}\n{}", request.caption, request.message))
            .items(&items)
            .default(request.default_index)
            .interact()
            .map_err(|e| match e {
                dialoguer::Error::IO(io) => io,
            })
    }
}
