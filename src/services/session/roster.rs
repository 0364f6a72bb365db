use crate::types::errors::ConfigError;
use serde::Serialize;
use std::collections::HashSet;

/// How a member identifier must appear in a name to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MatchStrategy {
    /// Anywhere in the name.
    #[default]
    Substring,
    /// Only where not surrounded by other letters or digits, so `12` does not
    /// match inside `123`.
    Token,
}

impl MatchStrategy {
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "substring" => Some(Self::Substring),
            "token" => Some(Self::Token),
            _ => None,
        }
    }

    fn matches(self, name: &str, id: &str) -> bool {
        match self {
            MatchStrategy::Substring => name.contains(id),
            MatchStrategy::Token => {
                // Resume one character past each hit so overlapping
                // occurrences are checked too.
                let mut from = 0;
                while let Some(pos) = name.get(from..).and_then(|rest| rest.find(id)) {
                    let start = from + pos;
                    let before = name[..start].chars().next_back();
                    let after = name[start + id.len()..].chars().next();
                    if !before.is_some_and(char::is_alphanumeric)
                        && !after.is_some_and(char::is_alphanumeric)
                    {
                        return true;
                    }
                    from = start + name[start..].chars().next().map_or(1, char::len_utf8);
                }
                false
            }
        }
    }
}

/// One session: a label plus its ordered member identifiers (tables).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterSession {
    pub label: String,
    pub members: Vec<String>,
}

/// A roster hit: which session, which table, and the identifier that matched.
/// Ordinals are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingMatch {
    pub session: String,
    pub session_no: usize,
    pub table_no: usize,
    pub member: String,
}

/// `None` means the name matched no roster entry.
pub type RoutingResult = Option<RoutingMatch>;

/// Two roster identifiers where one contains the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterOverlap {
    /// The shorter identifier, which also matches names meant for `outer`.
    pub inner: RoutingMatch,
    pub outer: RoutingMatch,
}

/// Ordered mapping from session to member identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    sessions: Vec<RosterSession>,
    strategy: MatchStrategy,
}

impl Roster {
    /// Validate and build a roster.
    ///
    /// Identifiers must be non-empty and unique within their session. Labels
    /// and identifiers end up in folder names, so neither may hold a path
    /// separator or be `.`, `..` or empty.
    pub fn new(sessions: Vec<RosterSession>, strategy: MatchStrategy) -> Result<Self, ConfigError> {
        for (i, session) in sessions.iter().enumerate() {
            let key = || format!("session.session_list[{i}]");
            if !is_folder_safe(&session.label) {
                return Err(ConfigError::InvalidValue {
                    key: key(),
                    reason: format!("label \"{}\" is not a valid folder name", session.label),
                });
            }

            let mut seen = HashSet::new();
            for member in &session.members {
                if member.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: key(),
                        reason: "member identifiers must not be empty".to_string(),
                    });
                }
                if !is_folder_safe(member) {
                    return Err(ConfigError::InvalidValue {
                        key: key(),
                        reason: format!("\"{member}\" is not a valid folder name"),
                    });
                }
                if !seen.insert(member.as_str()) {
                    return Err(ConfigError::InvalidValue {
                        key: key(),
                        reason: format!("\"{member}\" appears twice in session {}", session.label),
                    });
                }
            }
        }
        Ok(Self { sessions, strategy })
    }

    pub fn sessions(&self) -> &[RosterSession] {
        &self.sessions
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// First roster entry found in `name`, scanning sessions then members in
    /// configured order.
    pub fn find(&self, name: &str) -> RoutingResult {
        self.entries()
            .find(|(_, _, _, id)| self.strategy.matches(name, id))
            .map(|(label, session_no, table_no, id)| {
                routing_match(label, session_no, table_no, id)
            })
    }

    /// Every roster entry found in `name`, in roster order. `find` returns the
    /// first of these.
    pub fn find_all(&self, name: &str) -> Vec<RoutingMatch> {
        self.entries()
            .filter(|(_, _, _, id)| self.strategy.matches(name, id))
            .map(|(label, session_no, table_no, id)| {
                routing_match(label, session_no, table_no, id)
            })
            .collect()
    }

    /// Identifier pairs where one would also match names carrying the other.
    pub fn overlaps(&self) -> Vec<RosterOverlap> {
        let entries: Vec<_> = self.entries().collect();
        let mut out = Vec::new();

        for (i, a) in entries.iter().enumerate() {
            for (j, b) in entries.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (a_label, a_s, a_t, a_id) = *a;
                let (b_label, b_s, b_t, b_id) = *b;
                // Equal identifiers are reported once, inner first in roster order.
                if a_id == b_id && i > j {
                    continue;
                }
                if self.strategy.matches(b_id, a_id) {
                    out.push(RosterOverlap {
                        inner: routing_match(a_label, a_s, a_t, a_id),
                        outer: routing_match(b_label, b_s, b_t, b_id),
                    });
                }
            }
        }
        out
    }

    fn entries(&self) -> impl Iterator<Item = (&str, usize, usize, &str)> {
        self.sessions.iter().enumerate().flat_map(|(s, session)| {
            session
                .members
                .iter()
                .enumerate()
                .map(move |(t, id)| (session.label.as_str(), s + 1, t + 1, id.as_str()))
        })
    }
}

/// A single, non-special path component.
pub(crate) fn is_folder_safe(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains('/')
        && !value.contains('\\')
}

fn routing_match(label: &str, session_no: usize, table_no: usize, id: &str) -> RoutingMatch {
    RoutingMatch {
        session: label.to_string(),
        session_no,
        table_no,
        member: id.to_string(),
    }
}
