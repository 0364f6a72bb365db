use crate::services::extract::{ExtractMode, ExtractOptions, Grouping, NamingPolicy};
use crate::services::session::{Granularity, Roster, SessionLayout};
use crate::services::similarity::SimilarityJob;
use serde::Deserialize;
use std::path::PathBuf;

// ── Raw JSON shape ───────────────────────────────────
// Every key is optional here; required keys are checked in one pass so all
// of them can be reported together.

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawConfig {
    pub pwd: Option<String>,
    pub submissions: Option<String>,
    pub reports: Option<String>,
    pub plagiarism: Option<RawPlagiarism>,
    pub session: Option<RawSession>,
    pub testbench: Option<RawTestbench>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawPlagiarism {
    pub pwd: Option<String>,
    pub test: Option<String>,
    pub reference: Option<String>,
    pub boilerplate: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub threshold: Option<u32>,
    pub percentage: Option<f64>,
    pub guarantee_threshold: Option<u32>,
    pub mode: Option<String>, // "archive_in_folder", "single_archive", "plain_directory"
    pub prefix: Option<bool>,
    pub name_filter: Option<Vec<String>>,
    pub workers: Option<usize>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawSession {
    pub pwd: Option<String>,
    pub sessions: Option<String>,
    pub session_list: Option<Vec<RawRosterEntry>>,
    pub session_name_format: Option<String>,
    pub table_name_format: Option<String>,
    pub use_folder_name: Option<bool>,
    pub granularity: Option<String>, // "folder", "file", "unit"
    #[serde(rename = "match")]
    pub match_strategy: Option<String>, // "substring", "token"
    pub report_ambiguity: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawTestbench {
    pub pwd: Option<String>,
    pub test: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub single_file: Option<bool>,
    pub file_filter: Option<Vec<String>>,
    pub workers: Option<usize>,
}

/// A roster session: either a bare member list or a labeled one.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawRosterEntry {
    Members(Vec<String>),
    Labeled { label: String, members: Vec<String> },
}

// ── Validated configuration ──────────────────────────

#[derive(Debug, Clone)]
pub struct PlagiarismConfig {
    pub test: PathBuf,
    pub reference: Option<PathBuf>,
    pub boilerplate: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub noise_threshold: u32,
    pub guarantee_threshold: u32,
    pub display_threshold: f64,
    pub mode: ExtractMode,
    pub prefix: bool,
    pub name_filter: Vec<String>,
    pub workers: usize,
}

impl PlagiarismConfig {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::new(self.mode, self.extensions.clone())
            .with_naming(NamingPolicy::Flatten {
                prefix_with_unit: self.prefix,
            })
            .with_name_filter(&self.name_filter)
            .with_workers(self.workers)
    }

    pub fn similarity_job(&self) -> SimilarityJob {
        let mut job = SimilarityJob::new(self.test.clone(), self.extensions.clone()).with_thresholds(
            self.noise_threshold,
            self.guarantee_threshold,
            self.display_threshold,
        );
        if let Some(reference) = &self.reference {
            job = job.with_reference(reference.clone());
        }
        if let Some(boilerplate) = &self.boilerplate {
            job = job.with_boilerplate(boilerplate.clone());
        }
        job
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub roster: Roster,
    pub layout: SessionLayout,
    pub granularity: Granularity,
    pub report_ambiguity: bool,
}

#[derive(Debug, Clone)]
pub struct TestbenchConfig {
    pub test: PathBuf,
    pub extensions: Vec<String>,
    pub single_file: bool,
    pub file_filter: Vec<String>,
    pub workers: usize,
}

impl TestbenchConfig {
    /// Base names grouped per archive, so each submission lands ready for a
    /// grading harness. `file_filter` lists exact file stems.
    pub fn extract_options(&self) -> ExtractOptions {
        let mode = if self.single_file {
            ExtractMode::SingleArchive
        } else {
            ExtractMode::ArchiveInFolder
        };
        ExtractOptions::new(mode, self.extensions.clone())
            .with_naming(NamingPolicy::BaseName)
            .with_grouping(Grouping::PerArchive)
            .with_stem_filter(&self.file_filter)
            .with_workers(self.workers)
    }
}
