pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

/// Shown in the page footer and `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
