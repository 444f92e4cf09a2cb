//! Reserved host path detection.
//!
//! Looks for quoted string literals that start with `/proc/` or `/sys/`.
//! These introspection trees are absent or restricted on the target.

use crate::models::{PathUsageFinding, MAX_PATH_USAGES};
use regex::Regex;

const RESERVED_PATH_LITERAL: &str = r#"["'](/(?:proc|sys)/[^"']+)["']"#;

pub struct PathScanner {
    literal: Regex,
}

impl PathScanner {
    pub fn new() -> Self {
        PathScanner {
            // constant pattern, verified by tests
            literal: Regex::new(RESERVED_PATH_LITERAL).expect("reserved path regex"),
        }
    }

    /// All reserved-path literals in one file, in textual order.
    pub fn scan_file(&self, rel: &str, content: &str) -> Vec<PathUsageFinding> {
        self.literal
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| PathUsageFinding {
                file: rel.to_string(),
                literal: m.as_str().to_string(),
            })
            .collect()
    }
}

impl Default for PathScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenate per-file results in traversal order and keep the first
/// `MAX_PATH_USAGES`.
pub fn cap_path_usages<I>(per_file: I) -> Vec<PathUsageFinding>
where
    I: IntoIterator<Item = Vec<PathUsageFinding>>,
{
    per_file
        .into_iter()
        .flatten()
        .take(MAX_PATH_USAGES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_proc_literal() {
        let scanner = PathScanner::new();
        let found = scanner.scan_file("mem.c", r#"FILE *f = fopen("/proc/self/status", "r");"#);
        assert_eq!(
            found,
            vec![PathUsageFinding {
                file: "mem.c".into(),
                literal: "/proc/self/status".into(),
            }]
        );
    }

    #[test]
    fn test_single_quotes_and_sys() {
        let scanner = PathScanner::new();
        let found = scanner.scan_file("cpu.c", "open('/sys/devices/system/cpu/online');");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].literal, "/sys/devices/system/cpu/online");
    }

    #[test]
    fn test_ignores_unquoted_and_other_roots() {
        let scanner = PathScanner::new();
        let text = "// reads /proc/meminfo\nopen(\"/etc/passwd\");\nopen(\"/process/x\");";
        assert!(scanner.scan_file("a.c", text).is_empty());
    }

    #[test]
    fn test_cap_keeps_first_found_order() {
        let scanner = PathScanner::new();
        let many: String = (0..15).map(|i| format!("\"/proc/{}/stat\"\n", i)).collect();
        let first = scanner.scan_file("b.c", &many);
        let second = scanner.scan_file("a.c", &many);
        let capped = cap_path_usages(vec![first, second]);
        assert_eq!(capped.len(), MAX_PATH_USAGES);
        assert_eq!(capped[0].file, "b.c");
        assert_eq!(capped[0].literal, "/proc/0/stat");
        assert_eq!(capped[15].file, "a.c");
    }
}
