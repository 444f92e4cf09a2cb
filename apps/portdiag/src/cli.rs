//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "portdiag",
    version,
    about = "Porting feasibility diagnostics for C/C++ trees",
    long_about = "portdiag scans a C/C++ source tree for Linux-only APIs, /proc and /sys paths, and build dependencies, then grades how hard a port to an OpenHarmony-class target would be.\n\nConfiguration precedence: CLI > portdiag.toml > defaults.",
    after_help = "Examples:\n  portdiag analyze ./libfoo\n  portdiag analyze ./libfoo --output report.json\n  portdiag analyze . --format json --exclude 'third_party/**'\n  portdiag rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current portdiag version.")]
    Version,
    /// Analyze a source tree
    #[command(
        about = "Analyze a source tree",
        long_about = "Scan sources and headers for blocking and needs-rework APIs, read CMakeLists.txt for dependencies, and print a graded report. Exits 0 whatever the grade.",
        after_help = "Examples:\n  portdiag analyze ./src --output report.json\n  portdiag analyze ./src --match-mode word"
    )]
    Analyze {
        #[arg(help = "Source tree root (default: current dir)")]
        root: Option<String>,
        #[arg(long, short = 'o', help = "Also write the full JSON report to this path")]
        output: Option<String>,
        #[arg(long, help = "Console format: human|json (default: human)")]
        format: Option<String>,
        #[arg(long, action = clap::ArgAction::Append, help = "Glob of root-relative paths to skip (repeatable)")]
        exclude: Vec<String>,
        #[arg(long, help = "Pattern matching: substring|word (default: substring)")]
        match_mode: Option<String>,
    },
    /// List detection rules
    #[command(
        about = "List detection rules",
        long_about = "Print the blocking, needs-rework and safe API tables."
    )]
    Rules {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        format: Option<String>,
    },
}
