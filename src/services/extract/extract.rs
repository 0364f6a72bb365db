use super::flatten::{destination_name, has_allowed_extension, passes_name_filter};
use super::types::{
    ExtractMode, ExtractOptions, ExtractionReport, Grouping, NamingPolicy, SubmissionUnit,
    UnitSource,
};
use super::units::{archive_file_name, archive_stem, archives_in, scan_units};
use crate::types::errors::{ArchiveError, ToolError};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extract every student's archives found in per-student folders.
///
/// Shorthand for [`extract_with`] in [`ExtractMode::ArchiveInFolder`] with
/// flattened names.
pub fn extract(
    submissions: &Path,
    dest_root: &Path,
    extensions: &[String],
    name_filter: Option<&[String]>,
    flatten_prefix: bool,
) -> Result<ExtractionReport, ToolError> {
    let options = ExtractOptions::new(ExtractMode::ArchiveInFolder, extensions.to_vec())
        .with_naming(NamingPolicy::Flatten {
            prefix_with_unit: flatten_prefix,
        })
        .with_name_filter(name_filter.unwrap_or_default());
    extract_with(submissions, dest_root, &options)
}

/// Extract all units under `submissions` into `dest_root`.
///
/// Steps per matching member:
/// 1. Apply the name filter
/// 2. Compute the destination name from the naming policy
/// 3. Copy the bytes verbatim
/// 4. Normalize to UTF-8, deleting the copy if no encoding fits
///
/// Failures inside one unit are recorded in the report and never stop the
/// batch. Only an unreadable submissions root or an uncreatable destination
/// root is an error.
pub fn extract_with(
    submissions: &Path,
    dest_root: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ToolError> {
    if !submissions.is_dir() {
        return Err(ToolError::io(
            submissions,
            io::Error::new(
                io::ErrorKind::NotFound,
                "Submissions path is not a directory",
            ),
        ));
    }

    fs::create_dir_all(dest_root).map_err(|e| ToolError::io(dest_root, e))?;

    let units = scan_units(submissions, options.mode)?;

    let mut report = ExtractionReport::default();
    let mut written: HashSet<PathBuf> = HashSet::new();
    for (unit_report, unit_written) in run_units(&units, dest_root, options) {
        report.merge(unit_report);
        let mut unit_written: Vec<PathBuf> = unit_written.into_iter().collect();
        unit_written.sort();
        for dest_path in unit_written {
            if !written.insert(dest_path.clone()) {
                report.files_written -= 1;
                report.warn(format!(
                    "{} is produced by more than one member; keeping the last",
                    dest_path.display()
                ));
            }
        }
    }

    log::info!(
        "Extracted {} files from {} submissions ({} discarded, {} unreadable archives)",
        report.files_written,
        report.units,
        report.files_discarded,
        report.corrupt_archives
    );
    Ok(report)
}

/// Units of one run, each paired with the destinations it wrote, in unit
/// order.
///
/// Per-archive folders are shared by every student submitting an archive
/// with the same stem, so that grouping always runs on the calling thread.
fn run_units(
    units: &[SubmissionUnit],
    dest_root: &Path,
    options: &ExtractOptions,
) -> Vec<(ExtractionReport, HashSet<PathBuf>)> {
    if options.workers > 1 && options.grouping == Grouping::PerArchive {
        log::debug!("Per-archive folders may be shared between students; extracting sequentially");
    } else if options.workers > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
        {
            Ok(pool) => {
                return pool.install(|| {
                    units
                        .par_iter()
                        .map(|unit| run_unit(unit, dest_root, options))
                        .collect()
                })
            }
            Err(e) => log::warn!("Worker pool unavailable ({e}); extracting sequentially"),
        }
    }

    units
        .iter()
        .map(|unit| run_unit(unit, dest_root, options))
        .collect()
}

/// Extract a single unit. Never fails; problems end up in the report.
pub fn extract_unit(
    unit: &SubmissionUnit,
    dest_root: &Path,
    options: &ExtractOptions,
) -> ExtractionReport {
    run_unit(unit, dest_root, options).0
}

fn run_unit(
    unit: &SubmissionUnit,
    dest_root: &Path,
    options: &ExtractOptions,
) -> (ExtractionReport, HashSet<PathBuf>) {
    let mut job = UnitJob {
        unit,
        options,
        report: ExtractionReport {
            units: 1,
            ..Default::default()
        },
        written: HashSet::new(),
    };

    match &unit.source {
        UnitSource::ArchiveFolder(folder) => {
            log::info!("Extracting: {}", folder.display());
            match archives_in(folder) {
                Ok(archives) => {
                    for archive in archives {
                        let target = job.target_for_archive(dest_root, &archive);
                        job.extract_archive(&archive, &target);
                    }
                }
                Err(e) => job.report.warn(format!("{} could not be listed: {e}", unit.name)),
            }
        }
        UnitSource::Archive(archive) => {
            log::info!("Extracting: {}", archive.display());
            let target = job.target_for_archive(dest_root, archive);
            job.extract_archive(archive, &target);
        }
        UnitSource::Directory(dir) => {
            log::info!("Extracting: {}", dir.display());
            let target = dest_root.join(&unit.name);
            job.extract_directory(dir, &target);
        }
    }

    (job.report, job.written)
}

struct UnitJob<'a> {
    unit: &'a SubmissionUnit,
    options: &'a ExtractOptions,
    report: ExtractionReport,
    /// Destinations written successfully during this unit.
    written: HashSet<PathBuf>,
}

impl UnitJob<'_> {
    fn target_for_archive(&self, dest_root: &Path, archive: &Path) -> PathBuf {
        match self.options.grouping {
            Grouping::PerStudent => dest_root.join(&self.unit.name),
            Grouping::PerArchive => dest_root.join(archive_stem(archive)),
        }
    }

    fn extract_archive(&mut self, archive: &Path, target: &Path) {
        if let Err(e) = self.extract_zip_members(archive, target) {
            self.report.corrupt_archives += 1;
            self.report
                .warn(format!("{} has invalid zip file! {e}", self.unit.name));
        }
    }

    fn extract_zip_members(
        &mut self,
        archive_path: &Path,
        target: &Path,
    ) -> Result<(), ArchiveError> {
        let file = fs::File::open(archive_path).map_err(|source| ArchiveError::Open {
            path: archive_path.to_path_buf(),
            source,
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|source| ArchiveError::Corrupt {
            path: archive_path.to_path_buf(),
            source,
        })?;
        let prefix = archive_file_name(archive_path);

        if let Err(e) = fs::create_dir_all(target) {
            self.report
                .warn(format!("Failed to create {}: {e}", target.display()));
            return Ok(());
        }

        for i in 0..archive.len() {
            let mut entry = match archive.by_index(i) {
                Ok(entry) => entry,
                Err(e) => {
                    self.report.warn(format!(
                        "Skipping entry {i} of {}: {e}",
                        archive_path.display()
                    ));
                    continue;
                }
            };

            if entry.is_dir() {
                continue;
            }

            let member = entry.name().to_string();
            let Some(dest_path) = self.plan_member(&member, &prefix, target) else {
                continue;
            };

            let copied = fs::File::create(&dest_path)
                .and_then(|mut out| io::copy(&mut entry, &mut out).map(|_| ()));
            if let Err(e) = copied {
                self.report.warn(format!(
                    "Failed to extract {member} from {}: {e}",
                    archive_path.display()
                ));
                let _ = fs::remove_file(&dest_path);
                continue;
            }

            self.normalize_member(&dest_path);
        }
        Ok(())
    }

    fn extract_directory(&mut self, dir: &Path, target: &Path) {
        if let Err(e) = fs::create_dir_all(target) {
            self.report
                .warn(format!("Failed to create {}: {e}", target.display()));
            return;
        }

        let unit = self.unit;
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    self.report
                        .warn(format!("Skipping unreadable entry in {}: {e}", dir.display()));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(dir) {
                Ok(rel) => rel.to_string_lossy().to_string(),
                Err(_) => continue,
            };

            let Some(dest_path) = self.plan_member(&relative, &unit.name, target) else {
                continue;
            };

            if let Err(e) = fs::copy(entry.path(), &dest_path) {
                self.report
                    .warn(format!("Failed to copy {}: {e}", entry.path().display()));
                let _ = fs::remove_file(&dest_path);
                continue;
            }

            self.normalize_member(&dest_path);
        }
    }

    /// Apply filters and naming; `None` means the member is skipped.
    fn plan_member(&mut self, member: &str, prefix: &str, target: &Path) -> Option<PathBuf> {
        if !has_allowed_extension(member, self.options) {
            return None;
        }

        if !passes_name_filter(member, self.options) {
            self.report.files_filtered += 1;
            return None;
        }

        let name = destination_name(member, prefix, self.options.naming);
        if name.is_empty() || name == "." || name == ".." {
            return None;
        }

        let dest_path = target.join(name);
        if self.written.contains(&dest_path) {
            self.report.warn(format!(
                "{} is produced by more than one member; keeping the last",
                dest_path.display()
            ));
        }
        Some(dest_path)
    }

    fn normalize_member(&mut self, dest_path: &Path) {
        match self.options.encodings.normalize_file(dest_path) {
            Ok(_) => {
                if self.written.insert(dest_path.to_path_buf()) {
                    self.report.files_written += 1;
                }
            }
            Err(e) => {
                self.report.warn(format!(
                    "{} couldn't be converted to UTF-8 ({e}). Removing...",
                    dest_path.display()
                ));
                if let Err(e) = fs::remove_file(dest_path) {
                    self.report
                        .warn(format!("Failed to remove {}: {e}", dest_path.display()));
                }
                if self.written.remove(dest_path) {
                    self.report.files_written -= 1;
                }
                self.report.files_discarded += 1;
            }
        }
    }
}
