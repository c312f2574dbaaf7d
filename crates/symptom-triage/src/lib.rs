pub mod catalog;
pub mod config;
pub mod error;
pub mod grouping;
pub mod telemetry;
pub mod triage;
