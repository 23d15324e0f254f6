//! Pipeline orchestration.
//!
//! A run is a fixed linear sequence (locate engine, acquire image,
//! preprocess, recognize) where any stage failure short-circuits the
//! rest. No stage is retried; retrying with corrected inputs is the
//! caller's decision. Failures never cross the pipeline boundary as
//! error values: callers always get an [`OcrOutcome`].

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::preprocess::preprocess_image;
use super::{acquire, locator, ImageSource, OcrEngine, OcrOptions};
use crate::config::Config;
use crate::error::Result;
use crate::host::DocumentContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    LocateEngine,
    AcquireImage,
    Preprocess,
    Recognize,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::LocateEngine => "locate-engine",
            PipelineStage::AcquireImage => "acquire-image",
            PipelineStage::Preprocess => "preprocess",
            PipelineStage::Recognize => "recognize",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a pipeline run. `text` is present iff `success`; it may be
/// empty, which is a valid "no text found" outcome. `message` is present
/// iff not `success` and is always actionable user-facing prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutcome {
    pub success: bool,
    pub text: Option<String>,
    pub message: Option<String>,
}

impl OcrOutcome {
    fn ok(text: String) -> Self {
        Self {
            success: true,
            text: Some(text),
            message: None,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            text: None,
            message: Some(message),
        }
    }
}

/// Best-effort progress reporting. Invoked at each stage transition with
/// a human-readable status line; has no effect on control flow.
pub type ProgressObserver<'a> = &'a dyn Fn(PipelineStage, &str);

pub struct OcrPipeline<'a> {
    configured_engine_path: String,
    timeout: Duration,
    options: OcrOptions,
    observer: Option<ProgressObserver<'a>>,
}

impl<'a> OcrPipeline<'a> {
    pub fn new(config: &Config, options: OcrOptions) -> Self {
        Self {
            configured_engine_path: config.engine.binary_path.clone(),
            timeout: Duration::from_secs(config.engine.timeout_secs),
            options,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: ProgressObserver<'a>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runs the pipeline for one image. Every temporary file created by
    /// acquisition or preprocessing is removed before this returns, on
    /// success and failure alike.
    pub fn run(&self, source: &ImageSource, document: &dyn DocumentContext) -> OcrOutcome {
        let mut temps = TempGuard::default();
        let result = self.run_stages(source, document, &mut temps);
        drop(temps);

        match result {
            Ok(text) => {
                info!(chars = text.len(), "OCR succeeded");
                self.report(PipelineStage::Done, "OCR complete.");
                OcrOutcome::ok(text)
            }
            Err(e) => {
                warn!("OCR failed: {e}");
                let message = e.to_string();
                self.report(PipelineStage::Done, &format!("OCR failed: {message}"));
                OcrOutcome::failure(message)
            }
        }
    }

    fn run_stages(
        &self,
        source: &ImageSource,
        document: &dyn DocumentContext,
        temps: &mut TempGuard,
    ) -> Result<String> {
        self.report(PipelineStage::LocateEngine, "Locating OCR engine...");
        let binary = locator::locate(&self.configured_engine_path)?;
        let engine = OcrEngine::new(binary).with_timeout(self.timeout);

        self.report(PipelineStage::AcquireImage, "Acquiring image...");
        let acquired = acquire(source, document)?;
        if acquired.temporary {
            temps.track(acquired.path.clone());
        }

        self.report(PipelineStage::Preprocess, "Preparing image...");
        let prepared = preprocess_image(&acquired.path, self.options.grayscale, self.options.binarize);
        if prepared != acquired.path {
            temps.track(prepared.clone());
        }

        self.report(
            PipelineStage::Recognize,
            &format!("Recognizing text (language: {})...", self.options.language),
        );
        engine.recognize(&prepared, &self.options)
    }

    fn report(&self, stage: PipelineStage, message: &str) {
        if let Some(observer) = self.observer {
            observer(stage, message);
        }
        debug!(stage = %stage, "{message}");
    }
}

/// Temporary files owned by a single run. Removal happens on drop so it
/// covers every exit path, early returns and unwinding included.
#[derive(Default)]
struct TempGuard {
    paths: Vec<PathBuf>,
}

impl TempGuard {
    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => debug!("removed temporary image {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("could not remove temporary image {}: {e}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_text_present_iff_success() {
        let ok = OcrOutcome::ok("hello".to_string());
        assert!(ok.success);
        assert_eq!(ok.text.as_deref(), Some("hello"));
        assert_eq!(ok.message, None);

        let failed = OcrOutcome::failure("engine missing".to_string());
        assert!(!failed.success);
        assert_eq!(failed.text, None);
        assert_eq!(failed.message.as_deref(), Some("engine missing"));
    }

    #[test]
    fn test_empty_text_is_a_valid_success() {
        let ok = OcrOutcome::ok(String::new());
        assert!(ok.success);
        assert_eq!(ok.text.as_deref(), Some(""));
    }

    #[test]
    fn test_temp_guard_removes_tracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let tracked = dir.path().join("tracked.png");
        let untracked = dir.path().join("untracked.png");
        fs::write(&tracked, b"a").unwrap();
        fs::write(&untracked, b"b").unwrap();

        let mut guard = TempGuard::default();
        guard.track(tracked.clone());
        drop(guard);

        assert!(!tracked.exists());
        assert!(untracked.exists());
    }

    #[test]
    fn test_temp_guard_tolerates_already_removed_files() {
        let mut guard = TempGuard::default();
        guard.track(PathBuf::from("/tmp/textlift-never-created.png"));
        drop(guard);
    }

    #[test]
    fn test_stage_names_are_stable() {
        assert_eq!(PipelineStage::LocateEngine.to_string(), "locate-engine");
        assert_eq!(PipelineStage::Recognize.to_string(), "recognize");
        assert_eq!(PipelineStage::Done.to_string(), "done");
    }
}
