use crate::services::encoding::EncodingCandidateList;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Shape of the submissions root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractMode {
    /// One folder per student, each holding one or more `.zip` archives.
    ArchiveInFolder,
    /// One `.zip` per student directly under the root.
    SingleArchive,
    /// One folder per student holding raw files, walked recursively.
    PlainDirectory,
}

impl ExtractMode {
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "archive_in_folder" => Some(Self::ArchiveInFolder),
            "single_archive" => Some(Self::SingleArchive),
            "plain_directory" => Some(Self::PlainDirectory),
            _ => None,
        }
    }
}

/// How an archive member's relative path becomes a destination file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NamingPolicy {
    /// Replace path separators with `%`, optionally prefixed by the unit name.
    Flatten { prefix_with_unit: bool },
    /// Keep only the member's own file name.
    BaseName,
}

/// Which folder under the destination root receives a unit's files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grouping {
    /// One folder per student.
    PerStudent,
    /// One folder per archive, named after the archive without extension.
    PerArchive,
}

/// Which member base names survive filtering. Empty token lists accept
/// everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    /// A lowercased token appears anywhere in the lowercased base name.
    Contains(Vec<String>),
    /// The base name without its last extension equals a token exactly.
    Stem(Vec<String>),
}

impl Default for NameFilter {
    fn default() -> Self {
        NameFilter::Contains(Vec::new())
    }
}

impl NameFilter {
    pub fn is_empty(&self) -> bool {
        match self {
            NameFilter::Contains(tokens) | NameFilter::Stem(tokens) => tokens.is_empty(),
        }
    }

    pub fn accepts(&self, base_name: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        match self {
            NameFilter::Contains(tokens) => {
                let base = base_name.to_lowercase();
                tokens.iter().any(|token| base.contains(token.as_str()))
            }
            NameFilter::Stem(tokens) => {
                let stem = Path::new(base_name)
                    .file_stem()
                    .map(|s| s.to_string_lossy())
                    .unwrap_or_default();
                tokens.iter().any(|token| token.as_str() == stem.as_ref())
            }
        }
    }
}

/// Everything the extractor needs besides the source and destination roots.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub mode: ExtractMode,
    pub naming: NamingPolicy,
    pub grouping: Grouping,
    /// Suffixes a member name must end with to be extracted.
    pub extensions: Vec<String>,
    name_filter: NameFilter,
    pub encodings: EncodingCandidateList,
    /// Units processed concurrently. `1` keeps everything on the calling thread.
    pub workers: usize,
}

impl ExtractOptions {
    pub fn new(mode: ExtractMode, extensions: Vec<String>) -> Self {
        Self {
            mode,
            naming: NamingPolicy::Flatten {
                prefix_with_unit: true,
            },
            grouping: Grouping::PerStudent,
            extensions,
            name_filter: NameFilter::default(),
            encodings: EncodingCandidateList::default(),
            workers: 1,
        }
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_name_filter<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.name_filter = NameFilter::Contains(
            tokens
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        );
        self
    }

    /// Keep only members whose file stem is one of `stems`, compared exactly.
    pub fn with_stem_filter<I, S>(mut self, stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.name_filter = NameFilter::Stem(
            stems
                .into_iter()
                .map(|t| t.as_ref().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        );
        self
    }

    pub fn with_encodings(mut self, encodings: EncodingCandidateList) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn name_filter(&self) -> &NameFilter {
        &self.name_filter
    }
}

/// Where a unit's raw files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSource {
    /// A student folder whose `.zip` files are extracted.
    ArchiveFolder(PathBuf),
    /// A single archive sitting directly under the submissions root.
    Archive(PathBuf),
    /// A plain directory tree.
    Directory(PathBuf),
}

/// One student's raw deliverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionUnit {
    /// Folder name, or archive stem for single-archive submissions.
    pub name: String,
    pub source: UnitSource,
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub units: usize,
    pub files_written: usize,
    /// Members with a matching extension rejected by the name filter.
    pub files_filtered: usize,
    /// Members deleted after encoding normalization failed.
    pub files_discarded: usize,
    pub corrupt_archives: usize,
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    pub(crate) fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }

    pub(crate) fn merge(&mut self, other: ExtractionReport) {
        self.units += other.units;
        self.files_written += other.files_written;
        self.files_filtered += other.files_filtered;
        self.files_discarded += other.files_discarded;
        self.corrupt_archives += other.corrupt_archives;
        self.warnings.extend(other.warnings);
    }
}
