//! File I/O for run configurations and verification reports.

pub mod report;

pub use report::{read_config, read_report, write_config, write_report};
