use super::roster::{is_folder_safe, Roster, RoutingMatch};
use crate::types::errors::{ConfigError, ToolError};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Bucket receiving everything no roster entry matched.
pub const ERROR_BUCKET: &str = "ERROR";

/// Compiled regex for `{name}` placeholders in folder name templates.
static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_]*)\}").expect("Invalid regex"));

/// Folder name template such as `Session-{no}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    raw: String,
}

impl NameTemplate {
    /// Parse `raw`, accepting only the placeholders in `allowed`.
    pub fn parse(key: &str, raw: &str, allowed: &[&str]) -> Result<Self, ConfigError> {
        for caps in RE_PLACEHOLDER.captures_iter(raw) {
            let name = &caps[1];
            if !allowed.contains(&name) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!(
                        "unknown placeholder {{{name}}}; expected one of {}",
                        allowed
                            .iter()
                            .map(|a| format!("{{{a}}}"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                });
            }
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                reason: "folder name templates must not contain path separators".to_string(),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn render(&self, values: &[(&str, &str)]) -> String {
        RE_PLACEHOLDER
            .replace_all(&self.raw, |caps: &Captures| {
                values
                    .iter()
                    .find(|(key, _)| *key == &caps[1])
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_default()
            })
            .to_string()
    }
}

/// Destination tree for grouped submissions:
/// `<root>/<session>/<table>/` plus `<root>/ERROR/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    root: PathBuf,
    session_format: NameTemplate,
    table_format: NameTemplate,
}

impl SessionLayout {
    pub const SESSION_PLACEHOLDERS: &'static [&'static str] = &["no", "label"];
    pub const TABLE_PLACEHOLDERS: &'static [&'static str] = &["no", "id"];

    pub fn new(root: PathBuf, session_format: NameTemplate, table_format: NameTemplate) -> Self {
        Self {
            root,
            session_format,
            table_format,
        }
    }

    /// Layout with the default `Session-{no}` / `Table-{no}` names.
    pub fn with_defaults(root: PathBuf) -> Self {
        Self::new(
            root,
            NameTemplate {
                raw: "Session-{no}".to_string(),
            },
            NameTemplate {
                raw: "Table-{no}".to_string(),
            },
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_dir(&self, session_no: usize, label: &str) -> PathBuf {
        let no = session_no.to_string();
        self.root.join(
            self.session_format
                .render(&[("no", no.as_str()), ("label", label)]),
        )
    }

    /// Folder for a roster match.
    pub fn table_dir(&self, hit: &RoutingMatch) -> PathBuf {
        let no = hit.table_no.to_string();
        self.session_dir(hit.session_no, &hit.session).join(
            self.table_format
                .render(&[("no", no.as_str()), ("id", hit.member.as_str())]),
        )
    }

    /// `ERROR/`, or `ERROR/<folder>/` when a student folder is known.
    pub fn error_dir(&self, folder: Option<&str>) -> PathBuf {
        let bucket = self.root.join(ERROR_BUCKET);
        match folder {
            Some(folder) => bucket.join(folder),
            None => bucket,
        }
    }

    /// Check that every folder rendered for `roster` is a plain, distinct
    /// name directly under its parent, and that none is the error bucket.
    pub fn validate(&self, roster: &Roster) -> Result<(), ConfigError> {
        let mut session_names = HashSet::new();
        for (s, session) in roster.sessions().iter().enumerate() {
            let no = (s + 1).to_string();
            let name = self
                .session_format
                .render(&[("no", no.as_str()), ("label", session.label.as_str())]);
            check_folder_name("session.session_name_format", &name, &mut session_names)?;
            if name == ERROR_BUCKET {
                return Err(ConfigError::InvalidValue {
                    key: "session.session_name_format".to_string(),
                    reason: format!("session {no} renders to the reserved name {ERROR_BUCKET}"),
                });
            }

            let mut table_names = HashSet::new();
            for (t, member) in session.members.iter().enumerate() {
                let no = (t + 1).to_string();
                let name = self
                    .table_format
                    .render(&[("no", no.as_str()), ("id", member.as_str())]);
                check_folder_name("session.table_name_format", &name, &mut table_names)?;
            }
        }
        Ok(())
    }

    /// Create every session/table folder of `roster` plus the error bucket.
    /// Existing folders are left as they are.
    pub fn create(&self, roster: &Roster) -> Result<(), ToolError> {
        self.validate(roster)?;
        let mkdir = |path: &Path| fs::create_dir_all(path).map_err(|e| ToolError::io(path, e));

        mkdir(&self.root)?;
        for (s, session) in roster.sessions().iter().enumerate() {
            mkdir(&self.session_dir(s + 1, &session.label))?;
            for (t, member) in session.members.iter().enumerate() {
                mkdir(&self.table_dir(&RoutingMatch {
                    session: session.label.clone(),
                    session_no: s + 1,
                    table_no: t + 1,
                    member: member.clone(),
                }))?;
            }
        }
        mkdir(&self.error_dir(None))
    }
}

fn check_folder_name(
    key: &str,
    name: &str,
    seen: &mut HashSet<String>,
) -> Result<(), ConfigError> {
    if !is_folder_safe(name) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("renders to \"{name}\", which is not a valid folder name"),
        });
    }
    if !seen.insert(name.to_string()) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("renders \"{name}\" more than once"),
        });
    }
    Ok(())
}
