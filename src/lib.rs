//! namedstat - BIND name server statistics agent library.
//!
//! Turns the name server's XML statistics channel and `rndc status` output
//! into flat metric items and low-level discovery records. The `namedstatd`
//! daemon drives it on a timer and ships the records as JSON lines.

pub mod collector;
pub mod config;
pub mod model;
pub mod sink;
