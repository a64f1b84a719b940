//! Command line interface of the export engine

pub mod commands;
pub mod error;
