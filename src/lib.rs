//! Service library behind the facility readiness assessment: scoring,
//! classification, session orchestration, and report generation, plus the
//! configuration and telemetry plumbing shared with the binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
