//! Engine invocation.
//!
//! The engine runs as a child process. Recognition output goes through
//! an output-base file rather than a pipe so large results cannot
//! deadlock the child, and the wait loop enforces a timeout so a hung
//! engine never blocks the caller indefinitely.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{locator, OcrOptions};
use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{Result, TextliftError};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);
const STDERR_EXCERPT_CHARS: usize = 200;

/// A located engine binary plus invocation policy. Cheap to construct;
/// the binary itself is only touched when a query runs.
pub struct OcrEngine {
    binary: PathBuf,
    timeout: Duration,
    // Session-scoped cache of installed language packs; reset via refresh().
    languages: Option<Vec<String>>,
}

impl OcrEngine {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            languages: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Queries the engine version, confirming the binary still works.
    pub fn version(&self) -> Result<String> {
        locator::validate(&self.binary)
    }

    /// Runs recognition on `image_path` and returns the engine's text
    /// output verbatim, embedded newlines included, nothing trimmed.
    /// Empty text is a valid result, not an error.
    pub fn recognize(&self, image_path: &Path, options: &OcrOptions) -> Result<String> {
        let work_dir = tempfile::Builder::new().prefix("textlift-ocr-").tempdir()?;
        let out_base = work_dir.path().join("output");
        let stderr_path = work_dir.path().join("stderr.log");
        let stderr_sink = fs::File::create(&stderr_path)?;

        debug!(
            image = %image_path.display(),
            language = %options.language,
            oem = options.oem,
            psm = options.psm,
            "invoking OCR engine"
        );

        let mut child = Command::new(&self.binary)
            .arg(image_path)
            .arg(&out_base)
            .args(["-l", &options.language])
            .args(["--oem", &options.oem.to_string()])
            .args(["--psm", &options.psm.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_sink))
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TextliftError::EngineNotFound(format!(
                    "engine binary {} disappeared before invocation; re-run engine detection",
                    self.binary.display()
                )),
                _ => TextliftError::EngineInvocation(format!(
                    "could not start {}: {e}",
                    self.binary.display()
                )),
            })?;

        let status = self.wait_with_timeout(&mut child)?;
        let stderr_text = fs::read_to_string(&stderr_path).unwrap_or_default();

        if !status.success() {
            return Err(TextliftError::OcrRuntime(format!(
                "engine exited with {status} for {}: {}",
                image_path.display(),
                excerpt(&stderr_text)
            )));
        }

        // The engine writes its text next to the requested output base.
        let text_path = out_base.with_extension("txt");
        let text = fs::read_to_string(&text_path).map_err(|e| {
            TextliftError::OcrRuntime(format!(
                "engine reported success but produced no text output for {} ({e})",
                image_path.display()
            ))
        })?;

        debug!(chars = text.len(), "recognition finished");
        Ok(text)
    }

    fn wait_with_timeout(&self, child: &mut Child) -> Result<ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill() {
                    warn!("could not kill timed-out engine process: {e}");
                }
                let _ = child.wait();
                return Err(TextliftError::OcrTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
            std::thread::sleep(WAIT_POLL_INTERVAL);
        }
    }

    /// Installed language packs, `eng` pinned first when present. Cached
    /// for the life of this engine value; call [`refresh`](Self::refresh)
    /// after installing packs.
    pub fn list_languages(&mut self) -> Result<Vec<String>> {
        if let Some(languages) = &self.languages {
            return Ok(languages.clone());
        }
        let languages = self.query_languages()?;
        self.languages = Some(languages.clone());
        Ok(languages)
    }

    /// Drops cached engine answers so the next query hits the binary.
    pub fn refresh(&mut self) {
        self.languages = None;
    }

    fn query_languages(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.binary)
            .arg("--list-langs")
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TextliftError::EngineNotFound(format!(
                    "engine binary {} disappeared; re-run engine detection",
                    self.binary.display()
                )),
                _ => TextliftError::EngineInvocation(format!(
                    "could not query languages from {}: {e}",
                    self.binary.display()
                )),
            })?;

        if !output.status.success() {
            return Err(TextliftError::EngineInvocation(format!(
                "language query exited with {}: {}",
                output.status,
                excerpt(&String::from_utf8_lossy(&output.stderr))
            )));
        }

        // The header line ("List of available languages (N):") may land
        // on either stream depending on engine version.
        let mut languages: Vec<String> = Vec::new();
        for raw in [&output.stdout, &output.stderr] {
            for line in String::from_utf8_lossy(raw).lines() {
                let line = line.trim();
                if line.is_empty() || line.contains("languages") {
                    continue;
                }
                languages.push(line.to_string());
            }
        }
        languages.sort();
        languages.dedup();
        if let Some(pos) = languages.iter().position(|l| l == "eng") {
            let eng = languages.remove(pos);
            languages.insert(0, eng);
        }
        Ok(languages)
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "(no diagnostic output)".to_string();
    }
    let mut excerpt: String = trimmed.chars().take(STDERR_EXCERPT_CHARS).collect();
    if trimmed.chars().count() > STDERR_EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}
