//! Analysis runner.
//!
//! Validates the root, enumerates files once, scans each file in parallel
//! into local partial results, and merges them in traversal order before the
//! report is assembled. The build-file dependency scan runs independently of
//! the per-file pass.

use crate::error::{DiagnosticError, Result};
use crate::inventory::{self, SourceFile};
use crate::models::{DiagnosticReport, FileStats, PathUsageFinding};
use crate::report;
use crate::rules::RuleTable;
use crate::scan::paths::cap_path_usages;
use crate::scan::{scan_dependencies, usage, Allowlist, PathScanner, UsageAccumulator};
use glob::Pattern;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run needs besides the root path.
pub struct AnalyzeOptions {
    pub rules: RuleTable,
    pub allowlist: Allowlist,
    pub excludes: Vec<Pattern>,
}

impl AnalyzeOptions {
    pub fn builtin(rules: RuleTable) -> Self {
        AnalyzeOptions {
            rules,
            allowlist: Allowlist::builtin(),
            excludes: Vec::new(),
        }
    }
}

/// One file's contribution to every accumulator.
struct FilePartial {
    stats: FileStats,
    usage: UsageAccumulator,
    paths: Vec<PathUsageFinding>,
}

/// Fail early when the root is missing or not a directory.
pub fn validate_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(DiagnosticError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DiagnosticError::RootNotDirectory(root.to_path_buf()));
    }
    Ok(fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf()))
}

/// Run the full diagnostic over `root`.
pub fn run_analysis(root: &Path, opts: &AnalyzeOptions) -> Result<DiagnosticReport> {
    let abs_root = validate_root(root)?;
    let files = inventory::collect_files(&abs_root, &opts.excludes);
    tracing::info!("scanning {} files under {}", files.len(), abs_root.display());

    let path_scanner = PathScanner::new();
    let per_file: Vec<FilePartial> = files
        .par_iter()
        .map(|f| scan_one(f, &opts.rules, &path_scanner))
        .collect();

    let mut stats = FileStats::default();
    let mut usage_acc = UsageAccumulator::default();
    let mut path_lists: Vec<Vec<PathUsageFinding>> = Vec::with_capacity(per_file.len());
    for part in per_file {
        stats = stats.merge(part.stats);
        usage_acc = usage_acc.merge(part.usage);
        path_lists.push(part.paths);
    }
    let api_usages = usage_acc.into_findings(&opts.rules);
    let path_usages = cap_path_usages(path_lists);
    let dependencies = scan_dependencies(&abs_root, &opts.allowlist);
    tracing::info!(
        "found {} api findings, {} dependencies, {} path usages",
        api_usages.len(),
        dependencies.len(),
        path_usages.len()
    );

    Ok(report::assemble(
        abs_root.to_string_lossy().to_string(),
        stats,
        api_usages,
        dependencies,
        path_usages,
    ))
}

fn scan_one(file: &SourceFile, rules: &RuleTable, paths: &PathScanner) -> FilePartial {
    let mut stats = FileStats::default();
    let content = match inventory::read_lossy(&file.path) {
        Some(s) => s,
        None => {
            stats.record(file.category, 0);
            return FilePartial {
                stats,
                usage: UsageAccumulator::default(),
                paths: Vec::new(),
            };
        }
    };
    stats.record(file.category, inventory::count_lines(&content));
    let path_hits = if file.category.is_source() {
        paths.scan_file(&file.rel, &content)
    } else {
        Vec::new()
    };
    FilePartial {
        stats,
        usage: usage::scan_file(rules, &file.rel, &content),
        paths: path_hits,
    }
}
