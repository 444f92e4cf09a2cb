//! portdiag CLI binary entry point.
//! Resolves configuration, runs the analysis and prints the report.

use clap::Parser;
use portdiag::analyze::{self, AnalyzeOptions};
use portdiag::cli::{Cli, Commands};
use portdiag::error::DiagnosticError;
use portdiag::rules::{MatchMode, RuleTable};
use portdiag::{config, inventory, output, utils};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn fail(err: &DiagnosticError, code: i32) -> ! {
    eprintln!("{} {}", utils::error_prefix(), err);
    std::process::exit(code);
}

fn main() {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rules { format } => {
            let table = RuleTable::builtin(MatchMode::default()).unwrap_or_else(|e| fail(&e, 2));
            let format = format.unwrap_or_else(|| "human".to_string());
            if let Err(e) = output::print_rules(&table, &format) {
                fail(&e, 1);
            }
        }
        Commands::Analyze {
            root,
            output,
            format,
            exclude,
            match_mode,
        } => {
            let eff = config::resolve_effective(
                root.as_deref(),
                format.as_deref(),
                output.as_deref(),
                &exclude,
                match_mode.as_deref(),
            )
            .unwrap_or_else(|e| fail(&e, 2));
            if eff.config_dir.is_none() && eff.format != "json" {
                eprintln!(
                    "{} {}",
                    utils::note_prefix(),
                    "No portdiag.toml found; using defaults."
                );
            }
            let rules = RuleTable::builtin(eff.match_mode).unwrap_or_else(|e| fail(&e, 2));
            let excludes =
                inventory::compile_excludes(&eff.excludes).unwrap_or_else(|e| fail(&e, 2));
            let opts = AnalyzeOptions {
                excludes,
                ..AnalyzeOptions::builtin(rules)
            };
            let report = analyze::run_analysis(&eff.root, &opts).unwrap_or_else(|e| fail(&e, 2));

            // Console first, so a failed write never loses the report
            if let Err(e) = output::print_report(&report, &eff.format) {
                fail(&e, 1);
            }
            if let Some(path) = eff.output.as_ref() {
                match output::write_report(&report, path) {
                    Ok(()) => eprintln!(
                        "{} {}",
                        utils::info_prefix(),
                        format!("Report saved to {}", path.display())
                    ),
                    Err(e) => fail(&e, 1),
                }
            }
        }
    }
}
