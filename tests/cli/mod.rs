//! CLI command tests

#[cfg(feature = "cli")]
pub mod export_tests;
