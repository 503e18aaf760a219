//! Testing infrastructure for viscose integration tests.
//!
//! This crate provides utilities for writing robust integration tests:
//! - `TestWorld`: Fluent interface for declarative test setup
//! - `assertions`: Custom assertions over `--format json` output
//! - `fixtures`: Stats export and worksheet generation
//! - `process`: Background process management for `viscose watch`

pub mod assertions;
pub mod fixtures;
pub mod process;
pub mod world;

pub use world::{CliResult, TestWorld};
