//! Engine binary discovery and validation.
//!
//! `locate` resolves a usable engine binary in a fixed order: explicit
//! configured path, then the system PATH, then a short list of
//! platform-conventional install directories. `validate` runs the
//! binary's version query and separates "missing" from "present but
//! broken" from "working"; the three cases need different remediation
//! messages upstream.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Result, TextliftError};

#[cfg(windows)]
const BINARY_NAMES: &[&str] = &["tesseract.exe"];
#[cfg(not(windows))]
const BINARY_NAMES: &[&str] = &["tesseract"];

#[cfg(windows)]
const WELL_KNOWN_DIRS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR",
    r"C:\Program Files (x86)\Tesseract-OCR",
];
#[cfg(not(windows))]
const WELL_KNOWN_DIRS: &[&str] = &["/usr/local/bin", "/opt/homebrew/bin", "/usr/bin"];

/// Finds the engine binary. First match wins; an empty `configured_path`
/// goes straight to auto-detection. Pure function of filesystem and PATH
/// state: repeated calls with unchanged state return the same result.
pub fn locate(configured_path: &str) -> Result<PathBuf> {
    if !configured_path.is_empty() {
        let path = Path::new(configured_path);
        if is_executable_file(path) {
            debug!("using configured engine path {}", path.display());
            return Ok(path.to_path_buf());
        }
        debug!(
            "configured engine path {} is not an executable file; falling back to search",
            path.display()
        );
    }

    for name in BINARY_NAMES {
        if let Ok(found) = which::which(name) {
            debug!("found engine on PATH: {}", found.display());
            return Ok(found);
        }
    }

    for dir in WELL_KNOWN_DIRS {
        for name in BINARY_NAMES {
            let candidate = Path::new(dir).join(name);
            if is_executable_file(&candidate) {
                debug!("found engine at well-known location {}", candidate.display());
                return Ok(candidate);
            }
        }
    }

    Err(TextliftError::EngineNotFound(format!(
        "no OCR engine binary was found; set an explicit engine path in the settings, \
         or install tesseract so it is on PATH (also checked: {})",
        WELL_KNOWN_DIRS.join(", ")
    )))
}

/// Runs the engine's version query and returns the parsed version.
///
/// Errors distinguish a missing binary ([`TextliftError::EngineNotFound`])
/// from one that exists but will not run ([`TextliftError::EngineInvocation`]).
pub fn validate(path: &Path) -> Result<String> {
    let output = Command::new(path).arg("--version").output();
    match output {
        Ok(out) if out.status.success() => {
            parse_version(&out.stdout, &out.stderr).ok_or_else(|| {
                TextliftError::EngineInvocation(format!(
                    "{} ran but its version query produced no output; the installation \
                     may be corrupt",
                    path.display()
                ))
            })
        }
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            Err(TextliftError::EngineInvocation(format!(
                "{} exited with {} on its version query: {}",
                path.display(),
                out.status,
                stderr.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TextliftError::EngineNotFound(format!(
                "{} does not exist; check the configured engine path",
                path.display()
            )))
        }
        Err(e) => Err(TextliftError::EngineInvocation(format!(
            "{} could not be executed ({e}); check file permissions",
            path.display()
        ))),
    }
}

// Engine major versions disagree on whether the banner goes to stdout or
// stderr, so both streams are checked.
fn parse_version(stdout: &[u8], stderr: &[u8]) -> Option<String> {
    for raw in [stdout, stderr] {
        let text = String::from_utf8_lossy(raw);
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(version) = line.strip_prefix("tesseract ") {
                return Some(version.trim().to_string());
            }
            return Some(line.to_string());
        }
    }
    None
}

fn is_executable_file(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
