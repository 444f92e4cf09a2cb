//! Output rendering for diagnostic reports and the rule table.
//!
//! Supports `human` (default) and `json` outputs. Rendering is pure: the
//! `render_*`/`compose_*` functions build strings and values, and the
//! `print_*` wrappers only write them to stdout.

use crate::error::{DiagnosticError, Result};
use crate::models::{DiagnosticReport, Tier};
use crate::rules::RuleTable;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fs;
use std::path::Path;

const BOX_WIDTH: usize = 60;
const MAX_REWORK_SHOWN: usize = 10;
const MAX_DEPS_SHOWN: usize = 10;
const MAX_PATHS_SHOWN: usize = 5;

pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Print a report in the requested format.
pub fn print_report(report: &DiagnosticReport, output: &str) -> Result<()> {
    match output {
        "json" => println!("{}", to_json(report)?),
        _ => print!("{}", render_human(report, use_colors(output))),
    }
    Ok(())
}

/// Serialize the full report as pretty JSON.
pub fn to_json(report: &DiagnosticReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the full JSON report to `path`.
pub fn write_report(report: &DiagnosticReport, path: &Path) -> Result<()> {
    let body = to_json(report)?;
    fs::write(path, body).map_err(|source| DiagnosticError::WriteReport {
        path: path.to_path_buf(),
        source,
    })
}

fn section(title: &str, color: bool) -> String {
    let head = format!("[{}]", title);
    if color {
        format!("{}\n", head.bold())
    } else {
        format!("{}\n", head)
    }
}

fn boxed_line(text: &str) -> String {
    let inner = BOX_WIDTH - 1;
    format!("║ {:<inner$}║\n", text, inner = inner)
}

/// Render the console summary.
pub fn render_human(report: &DiagnosticReport, color: bool) -> String {
    let mut out = String::new();
    let bar = "═".repeat(BOX_WIDTH);
    out.push_str(&format!("╔{}╗\n", bar));
    out.push_str(&format!(
        "║{:^width$}║\n",
        "Porting Feasibility Report",
        width = BOX_WIDTH
    ));
    out.push_str(&format!("╠{}╣\n", bar));
    out.push_str(&boxed_line(&format!("Grade: {}", report.grade)));
    out.push_str(&boxed_line(&format!(
        "Estimated effort: {}",
        report.estimated_effort
    )));
    out.push_str(&format!("╚{}╝\n\n", bar));

    let stats = &report.file_stats;
    out.push_str(&section("Files", color));
    out.push_str(&format!("  C files: {}\n", stats.c));
    out.push_str(&format!("  C++ files: {}\n", stats.cpp));
    out.push_str(&format!("  Headers: {}\n", stats.h));
    out.push_str(&format!("  Total lines: {}\n\n", stats.total_lines));

    let blocking: Vec<_> = report.findings_in(Tier::Blocking).collect();
    if !blocking.is_empty() {
        out.push_str(&section("Blocking APIs (not portable)", color));
        for u in blocking {
            let name = if color {
                u.name.red().bold().to_string()
            } else {
                u.name.clone()
            };
            out.push_str(&format!("  {}: {} occurrence(s)\n", name, u.count));
            out.push_str(&format!("    guidance: {}\n", u.guidance));
        }
        out.push('\n');
    }

    let rework: Vec<_> = report.findings_in(Tier::NeedsRework).collect();
    if !rework.is_empty() {
        out.push_str(&section("APIs needing rework", color));
        for u in rework.iter().take(MAX_REWORK_SHOWN) {
            let name = if color {
                u.name.yellow().to_string()
            } else {
                u.name.clone()
            };
            out.push_str(&format!(
                "  {}: {} occurrence(s) -> {}\n",
                name, u.count, u.guidance
            ));
        }
        if rework.len() > MAX_REWORK_SHOWN {
            out.push_str(&format!(
                "  ... {} more\n",
                rework.len() - MAX_REWORK_SHOWN
            ));
        }
        out.push('\n');
    }

    if !report.dependencies.is_empty() {
        out.push_str(&section("Dependencies", color));
        for d in report.dependencies.iter().take(MAX_DEPS_SHOWN) {
            out.push_str(&format!("  {} {}\n", d.availability.glyph(), d.name));
        }
        out.push('\n');
    }

    if !report.path_usages.is_empty() {
        out.push_str(&section("/proc and /sys usage", color));
        for p in report.path_usages.iter().take(MAX_PATHS_SHOWN) {
            out.push_str(&format!("  {}: \"{}\"\n", p.file, p.literal));
        }
        out.push('\n');
    }

    out.push_str(&section("Risks", color));
    for risk in &report.risks {
        out.push_str(&format!("  ⚠ {}\n", risk));
    }
    out.push('\n');

    out.push_str(&section("Recommendations", color));
    for rec in &report.recommendations {
        out.push_str(&format!("  → {}\n", rec));
    }
    out
}

/// Compose the rule table as JSON (pure) for testing/snapshot purposes.
pub fn compose_rules_json(table: &RuleTable) -> JsonVal {
    let scored = table.scored().iter().map(|r| &r.rule);
    let items: Vec<_> = scored
        .chain(table.safe().iter())
        .map(|r| {
            json!({
                "pattern": r.pattern,
                "tier": r.tier.label(),
                "guidance": r.guidance,
            })
        })
        .collect();
    json!({"rules": items})
}

/// Print the rule table, safe reference APIs included.
pub fn print_rules(table: &RuleTable, output: &str) -> Result<()> {
    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&compose_rules_json(table))?);
        return Ok(());
    }
    let color = use_colors(output);
    for r in table.scored().iter().map(|c| &c.rule) {
        let tag = match r.tier {
            Tier::Blocking if color => "⟦blocking⟧".red().bold().to_string(),
            Tier::Blocking => "⟦blocking⟧".to_string(),
            _ if color => "⟦rework⟧".yellow().bold().to_string(),
            _ => "⟦rework⟧".to_string(),
        };
        println!("{} {} — {}", tag, r.pattern, r.guidance);
    }
    let safe: Vec<&str> = table.safe().iter().map(|r| r.pattern.as_str()).collect();
    if !safe.is_empty() {
        let tag = if color {
            "⟦safe⟧".green().bold().to_string()
        } else {
            "⟦safe⟧".to_string()
        };
        println!("{} {}", tag, safe.join(", "));
    }
    Ok(())
}
