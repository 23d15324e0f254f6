use serde::Deserialize;
use std::env;

pub const DEFAULT_LANGUAGE: &str = "eng";
pub const DEFAULT_PSM: u8 = 3;
pub const DEFAULT_OEM: u8 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Path to the engine binary. Empty triggers auto-detection.
    pub binary_path: String,
    pub timeout_secs: u64,
}

/// Default recognition parameters. A per-invocation
/// [`OcrOptions`](crate::ocr::OcrOptions) is built from these when the
/// caller does not supply its own values.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub language: String,
    pub psm: u8,
    pub oem: u8,
    pub grayscale: bool,
    pub binarize: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            engine: EngineConfig {
                binary_path: env::var("TEXTLIFT_ENGINE_PATH").unwrap_or_default(),
                timeout_secs: parse_env_or("TEXTLIFT_OCR_TIMEOUT", DEFAULT_TIMEOUT_SECS),
            },
            ocr: OcrConfig {
                language: env::var("TEXTLIFT_LANGUAGE")
                    .unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),
                psm: parse_env_or("TEXTLIFT_PSM", DEFAULT_PSM),
                oem: parse_env_or("TEXTLIFT_OEM", DEFAULT_OEM),
                grayscale: parse_env_or("TEXTLIFT_GRAYSCALE", false),
                binarize: parse_env_or("TEXTLIFT_BINARIZE", false),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                binary_path: String::new(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            ocr: OcrConfig {
                language: DEFAULT_LANGUAGE.to_string(),
                psm: DEFAULT_PSM,
                oem: DEFAULT_OEM,
                grayscale: false,
                binarize: false,
            },
        }
    }
}
