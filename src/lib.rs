//! Clone a Java assignment repository, check that it compiles, run
//! Checkstyle over it, and turn the outcome into a pass/fail verdict.
//!
//! [`pipeline::run`] drives the three steps; [`report::write_report`]
//! persists what they found.

pub mod build;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod sources;
pub mod style;
pub mod workspace;
