//! Encoding normalization for extracted submission files.
//!
//! Tries an ordered chain of strict decoders and keeps the first that
//! succeeds. Permissive single-byte code pages accept any input, so the chain
//! keeps them at the very end.

mod candidates;
mod normalize;

pub use candidates::{Candidate, EncodingCandidateList};
pub use normalize::{normalize, normalize_file, Normalized};

#[cfg(test)]
#[path = "tests/encoding_tests.rs"]
mod tests;
