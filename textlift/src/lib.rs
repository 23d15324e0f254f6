//! textlift: extract text from images with an external OCR engine and
//! route it into a host document editor.
//!
//! The crate is built around one synchronous request/response pipeline:
//! locate the engine binary, acquire an image (a caller-supplied file or
//! the host document's current selection), optionally preprocess it,
//! invoke the engine, and hand the recognized text to one of four output
//! sinks (cursor, text box, image replacement, clipboard). The host
//! editor is only ever reached through the traits in [`host`], so the
//! pipeline runs the same against a real editor integration, the
//! headless CLI, or test doubles.

pub mod config;
pub mod error;
pub mod host;
pub mod ocr;
pub mod output;
pub mod settings;

pub use config::Config;
pub use error::{Result, TextliftError};
pub use ocr::{ImageSource, OcrEngine, OcrOptions, OcrOutcome, OcrPipeline};
pub use output::{dispatch, DispatchOutcome, OutputMode};
