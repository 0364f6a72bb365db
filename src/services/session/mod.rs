//! Routing of submissions into session/table folders from a roster.

mod layout;
mod roster;
mod router;

pub use layout::{NameTemplate, SessionLayout, ERROR_BUCKET};
pub use roster::{
    MatchStrategy, Roster, RosterOverlap, RosterSession, RoutingMatch, RoutingResult,
};
pub use router::{group, route, Granularity, Router, RoutingReport};

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod roster_tests;

#[cfg(test)]
#[path = "tests/layout_tests.rs"]
mod layout_tests;

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod router_tests;
