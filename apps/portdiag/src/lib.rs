//! portdiag core library.
//!
//! This crate estimates how hard a C/C++ source tree would be to port to a
//! restricted OpenHarmony-class target that lacks Linux-only kernel
//! facilities. It is pattern based: nothing is parsed or compiled.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `rules`: Blocking/needs-rework/safe rule tables and match modes.
//! - `inventory`: Source file enumeration and line statistics.
//! - `scan`: API usage, build dependency and reserved path scanners.
//! - `grade`: Grade policy table.
//! - `report`: Report assembly and recommendation policy.
//! - `analyze`: Parallel scan runner tying the above together.
//! - `models`: Finding and report structs.
//! - `output`: Human/JSON printers.
//! - `error`: Fatal error type.
//! - `utils`: Console prefixes.
pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod grade;
pub mod inventory;
pub mod models;
pub mod output;
pub mod report;
pub mod rules;
pub mod scan;
pub mod utils;
