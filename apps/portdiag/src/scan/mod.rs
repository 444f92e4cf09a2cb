//! Independent scanners. Each one reads nothing but the filesystem root and
//! its own rule data, and returns results that merge without coordination.

pub mod deps;
pub mod paths;
pub mod usage;

pub use deps::{scan_dependencies, Allowlist};
pub use paths::PathScanner;
pub use usage::UsageAccumulator;
