//! Host editor collaborators.
//!
//! The pipeline never talks to a real editor directly; everything it
//! needs from the host (selection lookup, graphic export, text
//! insertion, clipboard) goes through the traits here. Editor
//! integrations implement [`DocumentContext`]; tests use scripted
//! doubles; the CLI runs against [`HeadlessDocument`].

use std::path::Path;

use tracing::warn;

use crate::error::{Result, TextliftError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Spreadsheet,
    Presentation,
    Drawing,
    Other,
}

impl DocumentKind {
    /// Whether text can be inserted into the document body.
    pub fn is_text_capable(&self) -> bool {
        matches!(self, DocumentKind::Text)
    }
}

/// Opaque reference to a graphic object in the host document. Valid only
/// as long as the host keeps the object alive and selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicHandle {
    pub id: u64,
    pub name: String,
}

/// Result of resolving the current selection to a single graphic.
///
/// `Unsupported` covers selections that exist but are not a single
/// recognizable image: grouped shapes, multi-object selections, objects
/// without pixel data. The reason string is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicSelection {
    Found(GraphicHandle),
    NotFound,
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    /// The host has no removal capability for this object type.
    NotRemovable(String),
}

pub trait DocumentContext {
    fn kind(&self) -> DocumentKind;

    /// Resolves the current selection to at most one graphic object.
    fn selected_graphic(&self) -> GraphicSelection;

    /// Writes the graphic's pixel data to `dest` in the given MIME type.
    fn export_graphic(&self, graphic: &GraphicHandle, dest: &Path, mime_type: &str) -> Result<()>;

    /// Inserts text at the current edit cursor without replacing content.
    fn insert_at_cursor(&mut self, text: &str) -> Result<()>;

    /// Creates a floating text frame anchored at the cursor with the
    /// given content and size.
    fn create_text_frame(&mut self, text: &str, width_mm: u32, height_mm: u32) -> Result<()>;

    /// Inserts text at the anchor position of `graphic`.
    fn insert_at_anchor(&mut self, graphic: &GraphicHandle, text: &str) -> Result<()>;

    fn remove_graphic(&mut self, graphic: &GraphicHandle) -> Result<RemovalOutcome>;
}

/// Stand-in context for runs without a host editor (the CLI). Carries no
/// selection and refuses document mutations.
#[derive(Debug, Default)]
pub struct HeadlessDocument;

impl HeadlessDocument {
    fn no_document<T>(operation: &str) -> Result<T> {
        Err(TextliftError::OutputDispatch(format!(
            "cannot {operation}: no document is attached"
        )))
    }
}

impl DocumentContext for HeadlessDocument {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Other
    }

    fn selected_graphic(&self) -> GraphicSelection {
        GraphicSelection::NotFound
    }

    fn export_graphic(&self, _graphic: &GraphicHandle, _dest: &Path, _mime: &str) -> Result<()> {
        Self::no_document("export a graphic")
    }

    fn insert_at_cursor(&mut self, _text: &str) -> Result<()> {
        Self::no_document("insert text at the cursor")
    }

    fn create_text_frame(&mut self, _text: &str, _width_mm: u32, _height_mm: u32) -> Result<()> {
        Self::no_document("create a text frame")
    }

    fn insert_at_anchor(&mut self, _graphic: &GraphicHandle, _text: &str) -> Result<()> {
        Self::no_document("insert text at an anchor")
    }

    fn remove_graphic(&mut self, _graphic: &GraphicHandle) -> Result<RemovalOutcome> {
        Self::no_document("remove a graphic")
    }
}

/// Plain-text clipboard access.
pub trait Clipboard {
    /// Places `text` as the sole plain-text flavor on the clipboard.
    /// Returns false when the clipboard could not be reached.
    fn set_text(&mut self, text: &str) -> bool;
}

/// System clipboard backed by `arboard`. The platform clipboard context
/// is opened per call; some platforms invalidate long-lived handles.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> bool {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(text.to_string()) {
                Ok(()) => true,
                Err(e) => {
                    warn!("could not write to the system clipboard: {e}");
                    false
                }
            },
            Err(e) => {
                warn!("could not open the system clipboard: {e}");
                false
            }
        }
    }
}
