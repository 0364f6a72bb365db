pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;

pub use services::config::Config;
pub use services::similarity::{ManifestEngine, SimilarityEngine};
pub use services::toolkit::Toolkit;
pub use types::errors::{ConfigError, ToolError, ToolResult};
