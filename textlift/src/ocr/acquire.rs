//! Image acquisition from one of two heterogeneous sources.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, TextliftError};
use crate::host::{DocumentContext, GraphicSelection};

/// Where the pipeline gets its image from. Exactly one variant is active
/// per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A caller-supplied image file. The pipeline reads it in place and
    /// never takes ownership.
    FilePath(PathBuf),
    /// The graphic object currently selected in the host document,
    /// resolved at acquisition time.
    DocumentSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredImage {
    pub path: PathBuf,
    /// True when the file was created for this run and must be removed
    /// by the pipeline; false for user-supplied files.
    pub temporary: bool,
}

pub fn acquire(source: &ImageSource, document: &dyn DocumentContext) -> Result<AcquiredImage> {
    match source {
        ImageSource::FilePath(path) => acquire_file(path),
        ImageSource::DocumentSelection => acquire_selection(document),
    }
}

fn acquire_file(path: &Path) -> Result<AcquiredImage> {
    let metadata = fs::metadata(path).map_err(|e| {
        TextliftError::ImageFileInvalid(format!(
            "{} cannot be read ({e}); check that the file exists and the path is correct",
            path.display()
        ))
    })?;
    if !metadata.is_file() {
        return Err(TextliftError::ImageFileInvalid(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    // Readability probe; permission problems surface here instead of
    // deep inside the engine invocation.
    fs::File::open(path).map_err(|e| {
        TextliftError::ImageFileInvalid(format!(
            "{} exists but cannot be opened ({e}); check file permissions",
            path.display()
        ))
    })?;

    debug!("using caller-supplied image {}", path.display());
    Ok(AcquiredImage {
        path: path.to_path_buf(),
        temporary: false,
    })
}

fn acquire_selection(document: &dyn DocumentContext) -> Result<AcquiredImage> {
    let graphic = match document.selected_graphic() {
        GraphicSelection::Found(graphic) => graphic,
        GraphicSelection::NotFound => {
            return Err(TextliftError::ImageAcquisition(
                "nothing is selected; select a single image in the document and try again"
                    .to_string(),
            ))
        }
        GraphicSelection::Unsupported(reason) => {
            return Err(TextliftError::ImageAcquisition(format!(
                "the selection is not a single recognizable image ({reason}); \
                 grouped or nested shapes are not supported"
            )))
        }
    };

    let dest = super::temp_image_path("textlift-img-")?;
    if let Err(e) = document.export_graphic(&graphic, &dest, "image/png") {
        if let Err(remove_err) = fs::remove_file(&dest) {
            warn!(
                "could not remove temp file {} after failed export: {remove_err}",
                dest.display()
            );
        }
        return Err(TextliftError::ImageAcquisition(format!(
            "the selected image \"{}\" has no exportable pixel data ({e})",
            graphic.name
        )));
    }

    debug!(
        graphic = %graphic.name,
        dest = %dest.display(),
        "selection exported for recognition"
    );
    Ok(AcquiredImage {
        path: dest,
        temporary: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DocumentKind, GraphicHandle, HeadlessDocument, RemovalOutcome};

    /// Minimal context whose selection and export behavior are scripted.
    struct SelectionContext {
        selection: GraphicSelection,
        export_fails: bool,
    }

    impl DocumentContext for SelectionContext {
        fn kind(&self) -> DocumentKind {
            DocumentKind::Text
        }

        fn selected_graphic(&self) -> GraphicSelection {
            self.selection.clone()
        }

        fn export_graphic(&self, _graphic: &GraphicHandle, dest: &Path, _mime: &str) -> Result<()> {
            if self.export_fails {
                return Err(TextliftError::ImageAcquisition(
                    "provider error".to_string(),
                ));
            }
            fs::write(dest, b"fake png bytes")?;
            Ok(())
        }

        fn insert_at_cursor(&mut self, _text: &str) -> Result<()> {
            unreachable!("acquisition never mutates the document")
        }

        fn create_text_frame(&mut self, _text: &str, _w: u32, _h: u32) -> Result<()> {
            unreachable!("acquisition never mutates the document")
        }

        fn insert_at_anchor(&mut self, _graphic: &GraphicHandle, _text: &str) -> Result<()> {
            unreachable!("acquisition never mutates the document")
        }

        fn remove_graphic(&mut self, _graphic: &GraphicHandle) -> Result<RemovalOutcome> {
            unreachable!("acquisition never mutates the document")
        }
    }

    fn handle() -> GraphicHandle {
        GraphicHandle {
            id: 1,
            name: "Image1".to_string(),
        }
    }

    #[test]
    fn test_file_source_passes_through_without_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        fs::write(&path, b"bytes").unwrap();

        let acquired = acquire(&ImageSource::FilePath(path.clone()), &HeadlessDocument).unwrap();
        assert_eq!(acquired.path, path);
        assert!(!acquired.temporary);
    }

    #[test]
    fn test_missing_file_is_invalid_and_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");

        let result = acquire(&ImageSource::FilePath(missing), &HeadlessDocument);
        assert!(matches!(result, Err(TextliftError::ImageFileInvalid(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_directory_path_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let result = acquire(
            &ImageSource::FilePath(dir.path().to_path_buf()),
            &HeadlessDocument,
        );
        assert!(matches!(result, Err(TextliftError::ImageFileInvalid(_))));
    }

    #[test]
    fn test_empty_selection_fails_with_selection_message() {
        let ctx = SelectionContext {
            selection: GraphicSelection::NotFound,
            export_fails: false,
        };
        let result = acquire(&ImageSource::DocumentSelection, &ctx);
        match result {
            Err(TextliftError::ImageAcquisition(message)) => {
                assert!(message.contains("nothing is selected"), "message: {message}");
            }
            other => panic!("expected ImageAcquisition, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_selection_reports_reason() {
        let ctx = SelectionContext {
            selection: GraphicSelection::Unsupported("grouped shapes".to_string()),
            export_fails: false,
        };
        let result = acquire(&ImageSource::DocumentSelection, &ctx);
        match result {
            Err(TextliftError::ImageAcquisition(message)) => {
                assert!(message.contains("grouped shapes"), "message: {message}");
            }
            other => panic!("expected ImageAcquisition, got {other:?}"),
        }
    }

    #[test]
    fn test_export_failure_is_distinct_from_no_selection() {
        let ctx = SelectionContext {
            selection: GraphicSelection::Found(handle()),
            export_fails: true,
        };
        let result = acquire(&ImageSource::DocumentSelection, &ctx);
        match result {
            Err(TextliftError::ImageAcquisition(message)) => {
                assert!(
                    message.contains("exportable pixel data"),
                    "message: {message}"
                );
                assert!(!message.contains("nothing is selected"));
            }
            other => panic!("expected ImageAcquisition, got {other:?}"),
        }
    }

    #[test]
    fn test_successful_selection_export_is_temporary() {
        let ctx = SelectionContext {
            selection: GraphicSelection::Found(handle()),
            export_fails: false,
        };
        let acquired = acquire(&ImageSource::DocumentSelection, &ctx).unwrap();
        assert!(acquired.temporary);
        assert!(acquired.path.exists());
        fs::remove_file(&acquired.path).unwrap();
    }
}
