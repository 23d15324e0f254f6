#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};

use textlift::error::{Result, TextliftError};
use textlift::host::{
    Clipboard, DocumentContext, DocumentKind, GraphicHandle, GraphicSelection, RemovalOutcome,
};

/// Writes a small generated PNG under `dir` and returns its path.
pub fn write_test_png(dir: &Path, name: &str) -> PathBuf {
    let image = RgbImage::from_fn(120, 40, |x, _y| {
        let v = ((x * 2) % 256) as u8;
        Rgb([v, v, v])
    });
    let path = dir.join(name);
    DynamicImage::ImageRgb8(image)
        .save(&path)
        .expect("failed to write test image");
    path
}

/// Fake engine executable: answers `--version` and `--list-langs`, and
/// writes `recognized_text` to the requested output base on recognition.
#[cfg(unix)]
pub fn fake_engine(dir: &Path, recognized_text: &str) -> PathBuf {
    let script = format!(
        "#!/bin/sh\n\
         case \"$1\" in\n\
           --version) echo 'tesseract 5.3.1'; exit 0 ;;\n\
           --list-langs) echo 'List of available languages (2):'; echo eng; echo deu; exit 0 ;;\n\
         esac\n\
         printf '%s\\n' '{recognized_text}' > \"$2.txt\"\n\
         exit 0\n"
    );
    write_engine_script(dir, &script)
}

/// Fake engine that validates but fails every recognition.
#[cfg(unix)]
pub fn failing_engine(dir: &Path) -> PathBuf {
    let script = "#!/bin/sh\n\
                  case \"$1\" in\n\
                    --version) echo 'tesseract 5.3.1'; exit 0 ;;\n\
                  esac\n\
                  echo 'simulated engine failure' >&2\n\
                  exit 1\n";
    write_engine_script(dir, script)
}

/// Fake engine that writes an empty text output.
#[cfg(unix)]
pub fn silent_engine(dir: &Path) -> PathBuf {
    let script = "#!/bin/sh\n\
                  case \"$1\" in\n\
                    --version) echo 'tesseract 5.3.1'; exit 0 ;;\n\
                  esac\n\
                  : > \"$2.txt\"\n\
                  exit 0\n";
    write_engine_script(dir, script)
}

#[cfg(unix)]
fn write_engine_script(dir: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let binary = dir.join("tesseract");
    fs::write(&binary, script).expect("failed to write fake engine");
    fs::set_permissions(&binary, fs::Permissions::from_mode(0o755))
        .expect("failed to mark fake engine executable");
    binary
}

/// Snapshot of pipeline-owned temp files currently in the system temp
/// directory; diffing two snapshots detects leaks.
pub fn textlift_temp_files() -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    if let Ok(entries) = fs::read_dir(std::env::temp_dir()) {
        for entry in entries.flatten() {
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with("textlift-")
            {
                files.insert(entry.path());
            }
        }
    }
    files
}

/// Scripted document context that records every mutation.
pub struct MockDocument {
    pub kind: DocumentKind,
    pub selection: GraphicSelection,
    pub removable: bool,
    pub export_fails: bool,
    pub cursor_insertions: Vec<String>,
    pub text_frames: Vec<(String, u32, u32)>,
    pub anchor_insertions: Vec<(u64, String)>,
    pub removed_graphics: Vec<u64>,
}

impl MockDocument {
    pub fn text_with_selection() -> Self {
        Self {
            kind: DocumentKind::Text,
            selection: GraphicSelection::Found(GraphicHandle {
                id: 7,
                name: "Image7".to_string(),
            }),
            removable: true,
            export_fails: false,
            cursor_insertions: Vec::new(),
            text_frames: Vec::new(),
            anchor_insertions: Vec::new(),
            removed_graphics: Vec::new(),
        }
    }

    pub fn text_without_selection() -> Self {
        Self {
            selection: GraphicSelection::NotFound,
            ..Self::text_with_selection()
        }
    }

    pub fn non_text() -> Self {
        Self {
            kind: DocumentKind::Spreadsheet,
            ..Self::text_with_selection()
        }
    }

    /// Total number of document mutations performed.
    pub fn mutation_count(&self) -> usize {
        self.cursor_insertions.len()
            + self.text_frames.len()
            + self.anchor_insertions.len()
            + self.removed_graphics.len()
    }
}

impl DocumentContext for MockDocument {
    fn kind(&self) -> DocumentKind {
        self.kind
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
        let image = RgbImage::from_pixel(60, 20, Rgb([240, 240, 240]));
        DynamicImage::ImageRgb8(image)
            .save(dest)
            .map_err(TextliftError::from)
    }

    fn insert_at_cursor(&mut self, text: &str) -> Result<()> {
        self.cursor_insertions.push(text.to_string());
        Ok(())
    }

    fn create_text_frame(&mut self, text: &str, width_mm: u32, height_mm: u32) -> Result<()> {
        self.text_frames
            .push((text.to_string(), width_mm, height_mm));
        Ok(())
    }

    fn insert_at_anchor(&mut self, graphic: &GraphicHandle, text: &str) -> Result<()> {
        self.anchor_insertions.push((graphic.id, text.to_string()));
        Ok(())
    }

    fn remove_graphic(&mut self, graphic: &GraphicHandle) -> Result<RemovalOutcome> {
        if !self.removable {
            return Ok(RemovalOutcome::NotRemovable(
                "object type has no removal capability".to_string(),
            ));
        }
        self.removed_graphics.push(graphic.id);
        Ok(RemovalOutcome::Removed)
    }
}

/// Clipboard double; records the last write.
#[derive(Debug, Default)]
pub struct MockClipboard {
    pub contents: Option<String>,
    pub fail: bool,
}

impl Clipboard for MockClipboard {
    fn set_text(&mut self, text: &str) -> bool {
        if self.fail {
            return false;
        }
        self.contents = Some(text.to_string());
        true
    }
}
