//! Terminal output formatting for parkstat
//!
//! This crate renders assembled analytics reports as terminal tables or as
//! JSON for dashboards and scripts.

pub mod output;

pub use output::{JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
