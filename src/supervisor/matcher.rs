//! Pattern matching over accumulated emulator output

use regex::Regex;
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)for Title (.+)").expect("valid title pattern"));
static SHADER_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Shader cache loaded (\d+) entries").expect("valid shader count pattern")
});
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v([\d+.]+) \[").expect("valid version pattern"));

/// What one supervised run has revealed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessObservation {
    pub title_id: Option<String>,
    /// `Some(0)` is a real observation; `None` means not seen yet
    pub shader_count: Option<u64>,
    pub emulator_version: Option<String>,
}

impl ProcessObservation {
    /// A report, once both the title and the shader count have been seen
    pub fn report(&self) -> Option<RunReport> {
        match (&self.title_id, self.shader_count) {
            (Some(title), Some(count)) => Some(RunReport {
                ran_title_id: title.clone(),
                compiled_shaders: count,
                emulator_version: self.emulator_version.clone(),
            }),
            _ => None,
        }
    }
}

/// Facts confirmed by a supervised run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub ran_title_id: String,
    pub compiled_shaders: u64,
    pub emulator_version: Option<String>,
}

/// Accumulates raw stdout and re-scans all of it on every chunk.
///
/// Patterns may straddle write boundaries, so matching is never line based.
#[derive(Debug, Default)]
pub struct OutputMatcher {
    buffer: Vec<u8>,
    observation: ProcessObservation,
}

impl OutputMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return a report once title and count are both known
    pub fn feed(&mut self, chunk: &[u8]) -> Option<RunReport> {
        self.buffer.extend_from_slice(chunk);
        let text = String::from_utf8_lossy(&self.buffer);

        if let Some(caps) = VERSION_RE.captures(&text) {
            self.observation.emulator_version = Some(caps[1].to_string());
        }

        if let Some(caps) = TITLE_RE.captures(&text) {
            let title = caps[1].trim();
            if !title.is_empty() {
                self.observation.title_id = Some(title.to_string());
            }
        }

        if let Some(count) = SHADER_COUNT_RE
            .captures(&text)
            .and_then(|caps| caps[1].parse::<u64>().ok())
        {
            self.observation.shader_count = Some(count);
        }

        self.observation.report()
    }

    pub fn observation(&self) -> &ProcessObservation {
        &self.observation
    }
}
