use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextliftError {
    #[error("OCR engine not found: {0}")]
    EngineNotFound(String),

    #[error("OCR engine failed to execute: {0}")]
    EngineInvocation(String),

    #[error("Image acquisition failed: {0}")]
    ImageAcquisition(String),

    #[error("Invalid image file: {0}")]
    ImageFileInvalid(String),

    #[error("OCR error: {0}")]
    OcrRuntime(String),

    #[error("OCR timed out after {seconds} seconds")]
    OcrTimeout { seconds: u64 },

    #[error("Output dispatch failed: {0}")]
    OutputDispatch(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TextliftError>;
