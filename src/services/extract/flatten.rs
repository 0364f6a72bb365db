//! Destination naming and member filters.

use super::types::{ExtractOptions, NamingPolicy};

/// Replaces every path separator in a flattened name.
pub const FLATTEN_SEPARATOR: char = '%';

/// Turn `relative` into a single path component.
///
/// `relative` may use `/` or `\`. With a prefix the result is
/// `<prefix>%<flattened path>`, which keeps entries from different archives
/// apart inside one student folder.
pub fn flatten_name(relative: &str, prefix: Option<&str>) -> String {
    let flat: String = relative
        .chars()
        .map(|c| if is_separator(c) { FLATTEN_SEPARATOR } else { c })
        .collect();
    match prefix {
        Some(prefix) => format!("{prefix}{FLATTEN_SEPARATOR}{flat}"),
        None => flat,
    }
}

/// Last component of `relative`, splitting on either separator.
pub fn base_name(relative: &str) -> &str {
    relative.rsplit(is_separator).next().unwrap_or(relative)
}

/// Destination file name for a member according to the naming policy.
pub fn destination_name(relative: &str, unit_prefix: &str, naming: NamingPolicy) -> String {
    match naming {
        NamingPolicy::Flatten {
            prefix_with_unit: true,
        } => flatten_name(relative, Some(unit_prefix)),
        NamingPolicy::Flatten {
            prefix_with_unit: false,
        } => flatten_name(relative, None),
        NamingPolicy::BaseName => base_name(relative).to_string(),
    }
}

/// Whether `name` ends with one of the allowed suffixes.
pub fn has_allowed_extension(name: &str, options: &ExtractOptions) -> bool {
    options
        .extensions
        .iter()
        .any(|ext| !ext.is_empty() && name.ends_with(ext.as_str()))
}

/// Whether the base name of `relative` passes the name filter.
/// An empty filter accepts everything.
pub fn passes_name_filter(relative: &str, options: &ExtractOptions) -> bool {
    options.name_filter().accepts(base_name(relative))
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}
