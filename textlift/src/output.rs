//! Output routing.
//!
//! Recognized text goes to exactly one sink per request. Cursor
//! insertion, text frames, and image replacement mutate the document;
//! the clipboard does not. Successful document mutations are
//! acknowledged to the caller; clipboard success is deliberately silent
//! to avoid notification fatigue.

use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::TextliftError;
use crate::host::{Clipboard, DocumentContext, GraphicSelection, RemovalOutcome};

/// Fixed text frame defaults; no layout negotiation with the host.
pub const TEXT_FRAME_WIDTH_MM: u32 = 100;
pub const TEXT_FRAME_HEIGHT_MM: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Cursor,
    TextBox,
    ReplaceImage,
    Clipboard,
}

impl OutputMode {
    pub const ALL: [OutputMode; 4] = [
        OutputMode::Cursor,
        OutputMode::TextBox,
        OutputMode::ReplaceImage,
        OutputMode::Clipboard,
    ];

    /// Stable identifier used in settings and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Cursor => "cursor",
            OutputMode::TextBox => "textbox",
            OutputMode::ReplaceImage => "replace-image",
            OutputMode::Clipboard => "clipboard",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = TextliftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                TextliftError::Validation(format!(
                    "unknown output mode \"{s}\"; expected one of cursor, textbox, \
                     replace-image, clipboard"
                ))
            })
    }
}

/// What a dispatch did.
///
/// `Partial` means the document was mutated but a follow-up step could
/// not be completed; the warning must reach the user. `succeeded()` is
/// true for both `Done` and `Partial`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Done { acknowledgement: Option<String> },
    Partial {
        acknowledgement: String,
        warning: String,
    },
    Failed { message: String },
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, DispatchOutcome::Failed { .. })
    }
}

/// Routes `text` to the selected sink. One-shot and stateless; empty
/// text is valid and inserts zero-length content.
pub fn dispatch(
    text: &str,
    mode: OutputMode,
    document: &mut dyn DocumentContext,
    clipboard: &mut dyn Clipboard,
) -> DispatchOutcome {
    info!(mode = %mode, chars = text.chars().count(), "dispatching recognized text");
    let outcome = match mode {
        OutputMode::Cursor => insert_at_cursor(text, document),
        OutputMode::TextBox => insert_into_text_frame(text, document),
        OutputMode::ReplaceImage => replace_image(text, document),
        OutputMode::Clipboard => copy_to_clipboard(text, clipboard),
    };
    if let DispatchOutcome::Failed { message } = &outcome {
        warn!(mode = %mode, "dispatch failed: {message}");
    }
    outcome
}

fn require_text_document(
    document: &dyn DocumentContext,
    operation: &str,
) -> Option<DispatchOutcome> {
    if document.kind().is_text_capable() {
        None
    } else {
        Some(DispatchOutcome::Failed {
            message: format!(
                "cannot {operation}: the active document does not accept text insertion; \
                 open the result in a text document or use the clipboard instead"
            ),
        })
    }
}

fn insert_at_cursor(text: &str, document: &mut dyn DocumentContext) -> DispatchOutcome {
    if let Some(failed) = require_text_document(document, "insert text at the cursor") {
        return failed;
    }
    match document.insert_at_cursor(text) {
        Ok(()) => DispatchOutcome::Done {
            acknowledgement: Some(format!(
                "Inserted {} characters at the cursor.",
                text.chars().count()
            )),
        },
        Err(e) => DispatchOutcome::Failed {
            message: format!("could not insert text at the cursor: {e}"),
        },
    }
}

fn insert_into_text_frame(text: &str, document: &mut dyn DocumentContext) -> DispatchOutcome {
    if let Some(failed) = require_text_document(document, "create a text box") {
        return failed;
    }
    match document.create_text_frame(text, TEXT_FRAME_WIDTH_MM, TEXT_FRAME_HEIGHT_MM) {
        Ok(()) => DispatchOutcome::Done {
            acknowledgement: Some(format!(
                "Created a text box with {} characters.",
                text.chars().count()
            )),
        },
        Err(e) => DispatchOutcome::Failed {
            message: format!("could not create a text box: {e}"),
        },
    }
}

fn replace_image(text: &str, document: &mut dyn DocumentContext) -> DispatchOutcome {
    // Hard precondition: the OCR'd graphic must still be selected.
    let graphic = match document.selected_graphic() {
        GraphicSelection::Found(graphic) => graphic,
        GraphicSelection::NotFound => {
            return DispatchOutcome::Failed {
                message: "no suitable image is selected; the original image must still be \
                          selected to replace it with text"
                    .to_string(),
            }
        }
        GraphicSelection::Unsupported(reason) => {
            return DispatchOutcome::Failed {
                message: format!("the current selection cannot be replaced ({reason})"),
            }
        }
    };
    if let Some(failed) = require_text_document(document, "replace the image with text") {
        return failed;
    }

    if let Err(e) = document.insert_at_anchor(&graphic, text) {
        return DispatchOutcome::Failed {
            message: format!("could not insert text at the image position: {e}"),
        };
    }

    // Text is in the document from here on; a failed removal is a
    // partial success, never a silent one.
    let acknowledgement = format!(
        "Replaced the selected image with {} characters of text.",
        text.chars().count()
    );
    match document.remove_graphic(&graphic) {
        Ok(RemovalOutcome::Removed) => DispatchOutcome::Done {
            acknowledgement: Some(acknowledgement),
        },
        Ok(RemovalOutcome::NotRemovable(reason)) => DispatchOutcome::Partial {
            acknowledgement: format!(
                "Inserted {} characters at the image position.",
                text.chars().count()
            ),
            warning: format!("the image could not be removed and remains in the document ({reason})"),
        },
        Err(e) => DispatchOutcome::Partial {
            acknowledgement: format!(
                "Inserted {} characters at the image position.",
                text.chars().count()
            ),
            warning: format!("the image could not be removed and remains in the document ({e})"),
        },
    }
}

fn copy_to_clipboard(text: &str, clipboard: &mut dyn Clipboard) -> DispatchOutcome {
    if clipboard.set_text(text) {
        // Silent on purpose.
        DispatchOutcome::Done {
            acknowledgement: None,
        }
    } else {
        DispatchOutcome::Failed {
            message: "could not place the text on the system clipboard; \
                      check clipboard access and try again"
                .to_string(),
        }
    }
}
