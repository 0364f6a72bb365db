//! JSON configuration, validated once into immutable typed sections.

pub mod models;

pub use models::*;

use crate::services::extract::ExtractMode;
use crate::services::session::{
    Granularity, MatchStrategy, NameTemplate, Roster, RosterSession, SessionLayout,
};
use crate::types::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SESSION_FORMAT: &str = "Session-{no}";
const DEFAULT_TABLE_FORMAT: &str = "Table-{no}";

#[derive(Debug, Clone)]
pub struct Config {
    pub submissions: PathBuf,
    pub reports: Option<PathBuf>,
    plagiarism: Option<PlagiarismConfig>,
    session: Option<SessionConfig>,
    testbench: Option<TestbenchConfig>,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Validate `raw`. Every missing required key is reported in one error;
    /// invalid values are checked afterwards.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let missing = missing_keys(&raw);
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let pwd = PathBuf::from(raw.pwd.unwrap_or_default());
        let submissions = pwd.join(required(raw.submissions, "submissions")?);
        let reports = raw.reports.map(|r| pwd.join(r));

        let plagiarism = raw
            .plagiarism
            .map(|p| build_plagiarism(p, &pwd))
            .transpose()?;
        let session = raw.session.map(|s| build_session(s, &pwd)).transpose()?;
        let testbench = raw
            .testbench
            .map(|t| build_testbench(t, &pwd))
            .transpose()?;

        Ok(Self {
            submissions,
            reports,
            plagiarism,
            session,
            testbench,
        })
    }

    pub fn plagiarism(&self) -> Result<&PlagiarismConfig, ConfigError> {
        self.plagiarism
            .as_ref()
            .ok_or(ConfigError::SectionMissing("plagiarism"))
    }

    pub fn session(&self) -> Result<&SessionConfig, ConfigError> {
        self.session
            .as_ref()
            .ok_or(ConfigError::SectionMissing("session"))
    }

    pub fn testbench(&self) -> Result<&TestbenchConfig, ConfigError> {
        self.testbench
            .as_ref()
            .ok_or(ConfigError::SectionMissing("testbench"))
    }

    /// Trees routed by `session:group`: submissions, then reports if set.
    pub fn grouping_sources(&self) -> Vec<PathBuf> {
        let mut sources = vec![self.submissions.clone()];
        sources.extend(self.reports.clone());
        sources
    }
}

// ── Helpers ──────────────────────────────────────────

fn missing_keys(raw: &RawConfig) -> Vec<String> {
    let mut missing = Vec::new();
    let mut check = |key: &str, present: bool| {
        if !present {
            missing.push(key.to_string());
        }
    };

    check("submissions", raw.submissions.is_some());
    if let Some(p) = &raw.plagiarism {
        check("plagiarism.test", p.test.is_some());
        check("plagiarism.extensions", p.extensions.is_some());
        check("plagiarism.threshold", p.threshold.is_some());
        check("plagiarism.percentage", p.percentage.is_some());
    }
    if let Some(s) = &raw.session {
        check("session.sessions", s.sessions.is_some());
        check("session.session_list", s.session_list.is_some());
    }
    if let Some(t) = &raw.testbench {
        check("testbench.test", t.test.is_some());
        check("testbench.extensions", t.extensions.is_some());
    }
    missing
}

fn required<T>(value: Option<T>, key: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingKeys(vec![key.to_string()]))
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn section_dir(pwd: &Path, section_pwd: Option<String>) -> PathBuf {
    match section_pwd {
        Some(dir) => pwd.join(dir),
        None => pwd.to_path_buf(),
    }
}

fn extensions(value: Option<Vec<String>>, key: &str) -> Result<Vec<String>, ConfigError> {
    let list = required(value, key)?;
    if list.is_empty() || list.iter().any(|e| e.is_empty()) {
        return Err(invalid(key, "must list at least one non-empty extension"));
    }
    Ok(list)
}

fn build_plagiarism(raw: RawPlagiarism, pwd: &Path) -> Result<PlagiarismConfig, ConfigError> {
    let dir = section_dir(pwd, raw.pwd);

    let display_threshold = required(raw.percentage, "plagiarism.percentage")?;
    if !(0.0..=1.0).contains(&display_threshold) {
        return Err(invalid(
            "plagiarism.percentage",
            format!("{display_threshold} is outside 0.0..=1.0"),
        ));
    }

    let mode = match raw.mode.as_deref() {
        None => ExtractMode::ArchiveInFolder,
        Some(value) => ExtractMode::from_config(value).ok_or_else(|| {
            invalid(
                "plagiarism.mode",
                format!(
                    "\"{value}\"; expected archive_in_folder, single_archive or plain_directory"
                ),
            )
        })?,
    };

    let noise_threshold = required(raw.threshold, "plagiarism.threshold")?;

    Ok(PlagiarismConfig {
        test: dir.join(required(raw.test, "plagiarism.test")?),
        reference: raw.reference.map(|r| dir.join(r)),
        boilerplate: raw.boilerplate.map(|b| dir.join(b)),
        extensions: extensions(raw.extensions, "plagiarism.extensions")?,
        noise_threshold,
        guarantee_threshold: raw.guarantee_threshold.unwrap_or(noise_threshold),
        display_threshold,
        mode,
        prefix: raw.prefix.unwrap_or(true),
        name_filter: raw.name_filter.unwrap_or_default(),
        workers: raw.workers.unwrap_or(1),
    })
}

fn build_session(raw: RawSession, pwd: &Path) -> Result<SessionConfig, ConfigError> {
    let dir = section_dir(pwd, raw.pwd);
    let root = dir.join(required(raw.sessions, "session.sessions")?);

    let sessions = required(raw.session_list, "session.session_list")?
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            RawRosterEntry::Members(members) => RosterSession {
                label: (i + 1).to_string(),
                members,
            },
            RawRosterEntry::Labeled { label, members } => RosterSession { label, members },
        })
        .collect();

    let strategy = match raw.match_strategy.as_deref() {
        None => MatchStrategy::default(),
        Some(value) => MatchStrategy::from_config(value).ok_or_else(|| {
            invalid(
                "session.match",
                format!("\"{value}\"; expected substring or token"),
            )
        })?,
    };

    let granularity = match raw.granularity.as_deref() {
        Some(value) => Granularity::from_config(value).ok_or_else(|| {
            invalid(
                "session.granularity",
                format!("\"{value}\"; expected folder, file or unit"),
            )
        })?,
        None if raw.use_folder_name.unwrap_or(false) => Granularity::Folder,
        None => Granularity::File,
    };

    let session_format = NameTemplate::parse(
        "session.session_name_format",
        raw.session_name_format
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_FORMAT),
        SessionLayout::SESSION_PLACEHOLDERS,
    )?;
    let table_format = NameTemplate::parse(
        "session.table_name_format",
        raw.table_name_format
            .as_deref()
            .unwrap_or(DEFAULT_TABLE_FORMAT),
        SessionLayout::TABLE_PLACEHOLDERS,
    )?;

    let roster = Roster::new(sessions, strategy)?;
    let layout = SessionLayout::new(root, session_format, table_format);
    layout.validate(&roster)?;

    Ok(SessionConfig {
        roster,
        layout,
        granularity,
        report_ambiguity: raw.report_ambiguity.unwrap_or(false),
    })
}

fn build_testbench(raw: RawTestbench, pwd: &Path) -> Result<TestbenchConfig, ConfigError> {
    let dir = section_dir(pwd, raw.pwd);
    Ok(TestbenchConfig {
        test: dir.join(required(raw.test, "testbench.test")?),
        extensions: extensions(raw.extensions, "testbench.extensions")?,
        single_file: raw.single_file.unwrap_or(false),
        file_filter: raw.file_filter.unwrap_or_default(),
        workers: raw.workers.unwrap_or(1),
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
