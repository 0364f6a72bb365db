pub mod config;
pub mod encoding;
pub mod extract;
pub mod fs_utils;
pub mod session;
pub mod similarity;
pub mod toolkit;
