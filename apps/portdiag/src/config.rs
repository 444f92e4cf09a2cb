//! Configuration discovery and effective settings resolution.
//!
//! portdiag reads `portdiag.toml|yaml|yml` from the analyzed root (or the
//! closest ancestor, stopping at a `.git` directory) and merges it with CLI
//! flags to produce an `Effective` config.
//! Defaults:
//! - `format`: `human`
//! - `output`: none (no JSON file is written)
//! - `exclude`: empty
//! - `matchMode`: `substring`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{DiagnosticError, Result};
use crate::rules::MatchMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["portdiag.toml", "portdiag.yaml", "portdiag.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `portdiag.toml|yaml`.
pub struct PortdiagConfig {
    pub format: Option<String>,
    /// JSON report path, relative to the directory holding the config.
    pub output: Option<String>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default, rename = "matchMode", alias = "match_mode")]
    pub match_mode: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub format: String,
    pub output: Option<PathBuf>,
    pub excludes: Vec<String>,
    pub match_mode: MatchMode,
    /// Directory of the config file that was applied, if any.
    pub config_dir: Option<PathBuf>,
}

/// Walk upward from `start` looking for a config file.
///
/// Stops at the first directory with a `portdiag.toml|yaml|yml` or a `.git`
/// directory; returns `start` when neither is found.
pub fn detect_config_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `PortdiagConfig` from `dir` if present. A malformed file is reported
/// and ignored.
pub fn load_config(dir: &Path) -> Option<PortdiagConfig> {
    let toml_path = dir.join(CONFIG_FILES[0]);
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!("ignoring invalid {}: {}", toml_path.display(), e);
                None
            }
        };
    }
    for yml in &CONFIG_FILES[1..] {
        let p = dir.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    tracing::warn!("ignoring invalid {}: {}", p.display(), e);
                    None
                }
            };
        }
    }
    None
}

fn parse_format(value: &str) -> Result<String> {
    match value {
        "human" | "json" => Ok(value.to_string()),
        _ => Err(DiagnosticError::InvalidOption {
            name: "format",
            value: value.to_string(),
            expected: "human|json",
        }),
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_root: Option<&str>,
    cli_format: Option<&str>,
    cli_output: Option<&str>,
    cli_excludes: &[String],
    cli_match_mode: Option<&str>,
) -> Result<Effective> {
    let root = PathBuf::from(cli_root.unwrap_or("."));
    let cfg_dir = detect_config_root(&root);
    let loaded = load_config(&cfg_dir);
    let config_dir = loaded.as_ref().map(|_| cfg_dir.clone());
    let cfg = loaded.unwrap_or_default();

    let format = match cli_format.map(str::to_string).or(cfg.format) {
        Some(f) => parse_format(&f)?,
        None => "human".to_string(),
    };

    let output = match cli_output {
        Some(p) => Some(PathBuf::from(p)),
        None => cfg.output.map(|p| cfg_dir.join(p)),
    };

    let excludes = if cli_excludes.is_empty() {
        cfg.exclude.unwrap_or_default()
    } else {
        cli_excludes.to_vec()
    };

    let match_mode = match cli_match_mode.map(str::to_string).or(cfg.match_mode) {
        Some(m) => m.parse()?,
        None => MatchMode::default(),
    };

    Ok(Effective {
        root,
        format,
        output,
        excludes,
        match_mode,
        config_dir,
    })
}
