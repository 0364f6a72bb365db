use super::candidates::EncodingCandidateList;
use crate::types::errors::EncodingError;
use std::fs;
use std::path::Path;

/// Text decoded by the first candidate that accepted the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// Name of the candidate that succeeded.
    pub encoding: &'static str,
}

impl EncodingCandidateList {
    /// Decode `bytes` with the first candidate that accepts them.
    pub fn normalize(&self, bytes: &[u8]) -> Result<Normalized, EncodingError> {
        self.candidates()
            .iter()
            .find_map(|candidate| {
                candidate.decode(bytes).map(|text| Normalized {
                    text,
                    encoding: candidate.name(),
                })
            })
            .ok_or(EncodingError::Undecodable { len: bytes.len() })
    }

    /// Rewrite the file at `path` as UTF-8.
    ///
    /// On failure the file is left untouched; deciding whether to discard it
    /// is up to the caller.
    pub fn normalize_file(&self, path: &Path) -> Result<&'static str, EncodingError> {
        let raw = fs::read(path).map_err(|source| EncodingError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let normalized = self.normalize(&raw)?;

        if normalized.text.as_bytes() != raw.as_slice() {
            fs::write(path, normalized.text.as_bytes()).map_err(|source| EncodingError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }

        log::debug!("{} decoded as {}", path.display(), normalized.encoding);
        Ok(normalized.encoding)
    }
}

/// Decode `bytes` with the default fallback chain.
pub fn normalize(bytes: &[u8]) -> Result<Normalized, EncodingError> {
    EncodingCandidateList::default_chain().normalize(bytes)
}

/// Rewrite `path` as UTF-8 using the default fallback chain.
pub fn normalize_file(path: &Path) -> Result<&'static str, EncodingError> {
    EncodingCandidateList::default_chain().normalize_file(path)
}
