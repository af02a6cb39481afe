//! Command-line parsing and output formatting

pub mod args;
pub mod output;
