use crate::batch::compile_patterns;
use crate::constants::{DEFAULT_DIRECTORY, DEFAULT_JOBS, DEFAULT_PATTERNS, DEFAULT_TARGET_SIZE_KB};
use crate::error::{OptimizeError, Result};
use crate::processing::OptimizeOptions;
use glob::Pattern;
use std::path::PathBuf;

/// Everything one batch run needs. Defaults reproduce the original
/// hard-coded setup: `Pictures/`, `*.jpg` + `*.JPG`, 1920x1200, quality 82.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub directory: PathBuf,
    pub patterns: Vec<String>,
    pub options: OptimizeOptions,
    /// Informational. Nothing reads this to pick a quality or size.
    pub target_size_kb: u32,
    /// 1 processes files strictly one after another.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            options: OptimizeOptions::default(),
            target_size_kb: DEFAULT_TARGET_SIZE_KB,
            jobs: DEFAULT_JOBS,
        }
    }
}

impl BatchConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Checks every setting and returns the compiled file patterns.
    pub fn validate(&self) -> Result<Vec<Pattern>> {
        self.options.validate()?;
        if self.jobs == 0 {
            return Err(OptimizeError::InvalidJobs(self.jobs));
        }
        compile_patterns(&self.patterns)
    }
}
