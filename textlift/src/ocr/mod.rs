//! OCR job pipeline.
//!
//! This module owns the path from "the user asked for OCR" to "here is
//! the recognized text":
//!
//! - `locator` finds and validates the engine binary
//! - `acquire` turns an [`ImageSource`] into a readable image file
//! - `preprocess` applies optional grayscale/binarization
//! - `engine` invokes the engine binary and collects its output
//! - `pipeline` sequences the above and owns temp-file cleanup
//!
//! Routing the recognized text into the document is a separate concern,
//! handled by [`crate::output`] after the pipeline returns.

mod acquire;
mod engine;
mod locator;
mod pipeline;
mod preprocess;

pub use acquire::{acquire, AcquiredImage, ImageSource};
pub use engine::OcrEngine;
pub use locator::{locate, validate};
pub use pipeline::{OcrOutcome, OcrPipeline, PipelineStage, ProgressObserver};
pub use preprocess::{preprocess_image, BINARIZE_THRESHOLD};

use std::path::PathBuf;

use crate::config::OcrConfig;
use crate::error::{Result, TextliftError};

pub const PSM_MAX: u8 = 13;
pub const OEM_MAX: u8 = 3;

/// Recognition parameters for a single invocation. Immutable once built;
/// construction validates the full set, so downstream code never checks
/// ranges again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    pub language: String,
    pub psm: u8,
    pub oem: u8,
    pub grayscale: bool,
    pub binarize: bool,
}

impl OcrOptions {
    pub fn new(
        language: impl Into<String>,
        psm: u8,
        oem: u8,
        grayscale: bool,
        binarize: bool,
    ) -> Result<Self> {
        let language = language.into();
        if language.trim().is_empty() {
            return Err(TextliftError::Validation(
                "recognition language must not be empty".to_string(),
            ));
        }
        if psm > PSM_MAX {
            return Err(TextliftError::Validation(format!(
                "page segmentation mode {psm} is out of range (0-{PSM_MAX})"
            )));
        }
        if oem > OEM_MAX {
            return Err(TextliftError::Validation(format!(
                "engine mode {oem} is out of range (0-{OEM_MAX})"
            )));
        }
        Ok(Self {
            language,
            psm,
            oem,
            grayscale,
            binarize,
        })
    }

    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        Self::new(
            config.language.clone(),
            config.psm,
            config.oem,
            config.grayscale,
            config.binarize,
        )
    }
}

/// Reserves a fresh temporary PNG path. The caller owns the file.
pub(crate) fn temp_image_path(prefix: &str) -> std::io::Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".png")
        .tempfile()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}
