//! Shared data models for scan findings and the assembled report.
//!
//! Every value here is produced once per scan and never mutated after the
//! report is assembled. Field names double as the JSON document shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of files listed per API finding. The count stays exact.
pub const MAX_FINDING_FILES: usize = 10;
/// Maximum number of reserved-path usages kept in a report.
pub const MAX_PATH_USAGES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Severity tier of a detection rule.
pub enum Tier {
    /// No feasible equivalent on the target.
    Blocking,
    /// Known but non-trivial migration path.
    NeedsRework,
    /// Portable as-is; listed for reference, never scanned.
    Safe,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Blocking => "blocking",
            Tier::NeedsRework => "needs_rework",
            Tier::Safe => "safe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Whether a dependency is known to exist on the target.
pub enum Availability {
    Yes,
    No,
    Unknown,
}

impl Availability {
    pub fn glyph(self) -> &'static str {
        match self {
            Availability::Yes => "✓",
            Availability::No => "✗",
            Availability::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
/// Single-letter porting difficulty, A (trivial) to D (not recommended).
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// File counts per category plus the total line volume.
pub struct FileStats {
    pub c: usize,
    pub cpp: usize,
    pub h: usize,
    pub total_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Aggregated matches of one rule across the tree.
pub struct ApiFinding {
    pub name: String,
    pub tier: Tier,
    pub count: usize,
    pub files: Vec<String>,
    pub guidance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A package or library declared by the build file.
pub struct DependencyFinding {
    pub name: String,
    pub required: bool,
    pub availability: Availability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A literal `/proc/...` or `/sys/...` path embedded in a source file.
pub struct PathUsageFinding {
    pub file: String,
    pub literal: String,
}

#[derive(Debug, Clone, Serialize)]
/// Complete diagnostic result handed to the printers.
pub struct DiagnosticReport {
    pub project_path: String,
    pub file_stats: FileStats,
    pub api_usages: Vec<ApiFinding>,
    pub dependencies: Vec<DependencyFinding>,
    pub path_usages: Vec<PathUsageFinding>,
    pub grade: Grade,
    pub estimated_effort: String,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DiagnosticReport {
    pub fn findings_in(&self, tier: Tier) -> impl Iterator<Item = &ApiFinding> {
        self.api_usages.iter().filter(move |u| u.tier == tier)
    }
}
