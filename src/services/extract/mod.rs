//! Submission extraction for similarity checking and test benches.
//!
//! Walks a submissions root, pulls matching members out of zip archives or
//! plain folders, flattens their paths and stores UTF-8 copies per student.

mod extract;
mod flatten;
mod types;
mod units;

pub use extract::{extract, extract_unit, extract_with};
pub use flatten::{base_name, destination_name, flatten_name, FLATTEN_SEPARATOR};
pub use types::{
    ExtractMode, ExtractOptions, ExtractionReport, Grouping, NameFilter, NamingPolicy,
    SubmissionUnit, UnitSource,
};
pub use units::scan_units;

#[cfg(test)]
#[path = "tests/flatten_tests.rs"]
mod flatten_tests;

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod extract_tests;
