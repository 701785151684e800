//! Mock inputs for testing collectors without a running name server.
//!
//! This module provides `MockSource` and `MockRunner` plus pre-built
//! statistics documents and status reports in [`scenarios`].

mod inputs;
pub mod scenarios;

pub use inputs::{MockRunner, MockSource};
