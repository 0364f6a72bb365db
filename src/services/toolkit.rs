//! One entry point per command, driven by a validated [`Config`].

use crate::services::config::Config;
use crate::services::extract::{extract_with, ExtractionReport};
use crate::services::session::{group, RoutingReport};
use crate::services::similarity::{SimilarityEngine, SimilarityOutcome};
use crate::types::errors::ToolResult;

pub struct Toolkit {
    config: Config,
}

impl Toolkit {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stage every submission for copy detection.
    pub fn plagiarism_extract(&self) -> ToolResult<ExtractionReport> {
        let plagiarism = self.config.plagiarism()?;
        log::info!(
            "Extracting {} into {}",
            self.config.submissions.display(),
            plagiarism.test.display()
        );
        extract_with(
            &self.config.submissions,
            &plagiarism.test,
            &plagiarism.extract_options(),
        )
    }

    /// Hand the staged tree to `engine`.
    pub fn plagiarism_check(&self, engine: &dyn SimilarityEngine) -> ToolResult<SimilarityOutcome> {
        let job = self.config.plagiarism()?.similarity_job();
        engine.run(&job)
    }

    /// Extract submissions with their original file names, one folder per
    /// archive.
    pub fn testbench_extract(&self) -> ToolResult<ExtractionReport> {
        let testbench = self.config.testbench()?;
        extract_with(
            &self.config.submissions,
            &testbench.test,
            &testbench.extract_options(),
        )
    }

    /// Create the session/table tree and copy submissions (and reports, when
    /// configured) into it.
    pub fn session_group(&self) -> ToolResult<RoutingReport> {
        let session = self.config.session()?;

        for overlap in session.roster.overlaps() {
            log::warn!(
                "Roster identifier {} (session {}) also matches names containing {} (session {})",
                overlap.inner.member,
                overlap.inner.session,
                overlap.outer.member,
                overlap.outer.session
            );
        }

        group(
            &self.config.grouping_sources(),
            &session.layout,
            &session.roster,
            session.granularity,
            session.report_ambiguity,
        )
    }
}
