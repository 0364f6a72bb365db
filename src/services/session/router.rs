use super::layout::SessionLayout;
use super::roster::{Roster, RoutingResult};
use crate::services::fs_utils::file_utils::{copy_into, sorted_entries};
use crate::types::errors::ToolError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What name is matched against the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Granularity {
    /// Each student folder is matched by its own name and copied item by item.
    #[default]
    Folder,
    /// Each file inside a student folder is matched by its file name.
    File,
    /// Each top-level entry (folder or file) is matched and copied whole.
    Unit,
}

impl Granularity {
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "folder" => Some(Self::Folder),
            "file" => Some(Self::File),
            "unit" => Some(Self::Unit),
            _ => None,
        }
    }
}

/// Counts of a routing pass. `ambiguous` lists names that matched more than
/// one roster entry, collected only when ambiguity reporting is on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingReport {
    pub routed: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub ambiguous: Vec<String>,
}

impl RoutingReport {
    pub(crate) fn merge(&mut self, other: RoutingReport) {
        self.routed += other.routed;
        self.unmatched += other.unmatched;
        self.failed += other.failed;
        self.ambiguous.extend(other.ambiguous);
    }
}

/// Copies items of a source tree into the session/table folders of a layout.
///
/// The layout is expected to exist already (see [`SessionLayout::create`]);
/// only error buckets are created on demand.
pub struct Router<'a> {
    roster: &'a Roster,
    layout: &'a SessionLayout,
    granularity: Granularity,
    report_ambiguity: bool,
}

impl<'a> Router<'a> {
    pub fn new(roster: &'a Roster, layout: &'a SessionLayout, granularity: Granularity) -> Self {
        Self {
            roster,
            layout,
            granularity,
            report_ambiguity: false,
        }
    }

    pub fn report_ambiguity(mut self, enabled: bool) -> Self {
        self.report_ambiguity = enabled;
        self
    }

    /// Route every entry of `source`. Copy failures are counted and logged;
    /// only an unreadable `source` is an error.
    pub fn route(&self, source: &Path) -> Result<RoutingReport, ToolError> {
        let mut report = RoutingReport::default();
        let entries = sorted_entries(source).map_err(|e| ToolError::io(source, e))?;

        for (name, path) in entries {
            match self.granularity {
                Granularity::Unit => {
                    log::info!("Processing: {name}");
                    let decision = self.lookup(&name, &mut report);
                    self.deliver(&path, decision, None, &mut report);
                }
                Granularity::Folder | Granularity::File => {
                    if path.is_dir() {
                        self.route_folder(&name, &path, &mut report);
                    } else {
                        log::debug!("Skipping stray file {}", path.display());
                    }
                }
            }
        }
        Ok(report)
    }

    fn route_folder(&self, folder: &str, path: &Path, report: &mut RoutingReport) {
        let folder_decision =
            (self.granularity == Granularity::Folder).then(|| self.lookup(folder, report));

        let items = match sorted_entries(path) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Cannot read {}: {e}", path.display());
                report.failed += 1;
                return;
            }
        };

        for (name, item) in items {
            log::info!("Processing: {name}");
            let decision = match &folder_decision {
                Some(decision) => decision.clone(),
                None => self.lookup(&name, report),
            };
            self.deliver(&item, decision, Some(folder), report);
        }
    }

    fn lookup(&self, name: &str, report: &mut RoutingReport) -> RoutingResult {
        if !self.report_ambiguity {
            return self.roster.find(name);
        }

        let hits = self.roster.find_all(name);
        if hits.len() > 1 {
            let members: Vec<&str> = hits.iter().map(|h| h.member.as_str()).collect();
            log::warn!(
                "{name} matches several roster entries ({}); using {}",
                members.join(", "),
                members[0]
            );
            report.ambiguous.push(name.to_string());
        }
        hits.into_iter().next()
    }

    fn deliver(
        &self,
        item: &Path,
        decision: RoutingResult,
        folder: Option<&str>,
        report: &mut RoutingReport,
    ) {
        let dest_dir: PathBuf = match &decision {
            Some(hit) => self.layout.table_dir(hit),
            None => {
                let dir = self.layout.error_dir(folder);
                if let Err(e) = fs::create_dir_all(&dir) {
                    log::warn!("Cannot create {}: {e}", dir.display());
                    report.failed += 1;
                    return;
                }
                dir
            }
        };

        match copy_into(item, &dest_dir) {
            Ok(_) if decision.is_some() => report.routed += 1,
            Ok(_) => report.unmatched += 1,
            Err(e) => {
                log::warn!(
                    "Failed to copy {} into {}: {e}",
                    item.display(),
                    dest_dir.display()
                );
                report.failed += 1;
            }
        }
    }
}

/// Route one source tree into an existing layout.
pub fn route(
    source: &Path,
    layout: &SessionLayout,
    roster: &Roster,
    granularity: Granularity,
) -> Result<RoutingReport, ToolError> {
    Router::new(roster, layout, granularity).route(source)
}

/// Build the layout for `roster`, then route each of `sources` into it.
pub fn group(
    sources: &[PathBuf],
    layout: &SessionLayout,
    roster: &Roster,
    granularity: Granularity,
    report_ambiguity: bool,
) -> Result<RoutingReport, ToolError> {
    layout.create(roster)?;

    let router = Router::new(roster, layout, granularity).report_ambiguity(report_ambiguity);
    let mut report = RoutingReport::default();
    for source in sources {
        log::info!("Grouping {}", source.display());
        report.merge(router.route(source)?);
    }
    log::info!(
        "Grouped {} item(s), {} unmatched, {} failed",
        report.routed,
        report.unmatched,
        report.failed
    );
    Ok(report)
}
