//! Hand-off to an external similarity (copy detection) engine.
//!
//! The extractor stages one folder per student; a [`SimilarityJob`] names
//! those folders together with the thresholds the engine should apply.

use crate::types::errors::ToolError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File written by [`ManifestEngine`] next to the staged test folder.
pub const JOB_FILE_NAME: &str = "similarity_job.json";

/// Everything a copy-detection run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityJob {
    /// Folders whose submissions are checked.
    pub test_dirs: Vec<PathBuf>,
    /// Folders checked against. Starts with the test folder so students are
    /// compared with each other.
    pub reference_dirs: Vec<PathBuf>,
    /// Code handed out to every student, excluded from matching.
    pub boilerplate_dirs: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub noise_threshold: u32,
    pub guarantee_threshold: u32,
    /// Minimum similarity (0.0 to 1.0) shown in the report.
    pub display_threshold: f64,
    /// Skip files directly inside the test folders; only per-student
    /// subfolders are compared.
    pub ignore_leaf: bool,
}

impl SimilarityJob {
    pub fn new(test_dir: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            reference_dirs: vec![test_dir.clone()],
            test_dirs: vec![test_dir],
            boilerplate_dirs: Vec::new(),
            extensions,
            noise_threshold: 0,
            guarantee_threshold: 0,
            display_threshold: 0.0,
            ignore_leaf: true,
        }
    }

    pub fn with_reference(mut self, dir: PathBuf) -> Self {
        self.reference_dirs.push(dir);
        self
    }

    pub fn with_boilerplate(mut self, dir: PathBuf) -> Self {
        self.boilerplate_dirs.push(dir);
        self
    }

    pub fn with_thresholds(mut self, noise: u32, guarantee: u32, display: f64) -> Self {
        self.noise_threshold = noise;
        self.guarantee_threshold = guarantee;
        self.display_threshold = display;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityOutcome {
    pub report_path: PathBuf,
}

/// Runs a similarity job.
pub trait SimilarityEngine {
    fn run(&self, job: &SimilarityJob) -> Result<SimilarityOutcome, ToolError>;
}

/// Engine that only writes the job as JSON for an external tool to pick up.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestEngine;

impl ManifestEngine {
    pub fn manifest_path(test_dir: &Path) -> PathBuf {
        match test_dir.parent() {
            Some(parent) => parent.join(JOB_FILE_NAME),
            None => PathBuf::from(JOB_FILE_NAME),
        }
    }
}

impl SimilarityEngine for ManifestEngine {
    fn run(&self, job: &SimilarityJob) -> Result<SimilarityOutcome, ToolError> {
        let test_dir = job
            .test_dirs
            .first()
            .ok_or_else(|| ToolError::Similarity("job has no test folder".to_string()))?;

        for dir in &job.test_dirs {
            if !dir.is_dir() {
                return Err(ToolError::Similarity(format!(
                    "{} does not exist; run plagiarism:extract first",
                    dir.display()
                )));
            }
        }

        let path = Self::manifest_path(test_dir);
        let json = serde_json::to_string_pretty(job)
            .map_err(|e| ToolError::Similarity(format!("Failed to serialize job: {e}")))?;
        fs::write(&path, json).map_err(|e| ToolError::io(&path, e))?;

        log::info!("Similarity job written to {}", path.display());
        Ok(SimilarityOutcome { report_path: path })
    }
}

#[cfg(test)]
#[path = "tests/similarity_tests.rs"]
mod tests;
