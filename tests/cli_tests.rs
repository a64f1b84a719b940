//! CLI command tests

mod cli;
