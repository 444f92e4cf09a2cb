//! Build-file dependency scanning.
//!
//! Reads `CMakeLists.txt` at the project root and collects names from three
//! declaration forms, in this order:
//! - `find_package(Name ...)`: always required.
//! - `pkg_check_modules(PREFIX [REQUIRED] ... modules...)`: always required.
//! - `target_link_libraries(target ... libs...)`: never required.
//!
//! Each name is checked case-insensitively against the target allowlist.
//! A miss yields `unknown`, never `no`. The first occurrence of a name wins.

use crate::inventory;
use crate::models::{Availability, DependencyFinding};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

pub const BUILD_FILE: &str = "CMakeLists.txt";

const TARGET_LIBRARIES: &[&str] = &[
    "pthread", "dl", "rt", "m", "z", "ssl", "crypto", "curl", "sqlite3", "jpeg", "png", "xml2",
];

/// Link-item keywords that are never library names.
const LINK_KEYWORDS: &[&str] = &[
    "PUBLIC",
    "PRIVATE",
    "INTERFACE",
    "LINK_PUBLIC",
    "LINK_PRIVATE",
    "LINK_INTERFACE_LIBRARIES",
    "debug",
    "optimized",
    "general",
];

const PKG_KEYWORDS: &[&str] = &[
    "REQUIRED",
    "QUIET",
    "IMPORTED_TARGET",
    "GLOBAL",
    "NO_CMAKE_PATH",
    "NO_CMAKE_ENVIRONMENT_PATH",
];

#[derive(Debug, Clone)]
/// Libraries known to ship on the target, stored lowercase.
pub struct Allowlist {
    names: BTreeSet<String>,
}

impl Allowlist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Allowlist {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(TARGET_LIBRARIES)
    }

    /// `libfoo` also matches an allowlisted `foo`.
    pub fn availability(&self, name: &str) -> Availability {
        let lower = name.to_ascii_lowercase();
        let bare = lower.strip_prefix("lib").filter(|s| !s.is_empty());
        if self.names.contains(&lower) || bare.is_some_and(|b| self.names.contains(b)) {
            Availability::Yes
        } else {
            Availability::Unknown
        }
    }
}

impl Default for Allowlist {
    fn default() -> Self {
        Self::builtin()
    }
}

struct DeclarationPatterns {
    find_package: Regex,
    pkg_check_modules: Regex,
    target_link_libraries: Regex,
    link_flag: Regex,
    identifier: Regex,
}

impl DeclarationPatterns {
    fn new() -> Self {
        // constant patterns, verified by tests
        let re = |p: &str| Regex::new(p).expect("declaration regex");
        DeclarationPatterns {
            find_package: re(r"(?i)\bfind_package\s*\(\s*(\w+)"),
            pkg_check_modules: re(r"(?i)\bpkg_check_modules\s*\(([^)]*)\)"),
            target_link_libraries: re(r"(?i)\btarget_link_libraries\s*\(([^)]*)\)"),
            link_flag: re(r"^-l(\w+)$"),
            identifier: re(r"^\w+$"),
        }
    }
}

/// Scan `<root>/CMakeLists.txt`. A missing file yields no dependencies.
pub fn scan_dependencies(root: &Path, allowlist: &Allowlist) -> Vec<DependencyFinding> {
    let path = root.join(BUILD_FILE);
    if !path.is_file() {
        tracing::debug!("no {} under {}", BUILD_FILE, root.display());
        return Vec::new();
    }
    match inventory::read_lossy(&path) {
        Some(content) => parse_build_file(&content, allowlist),
        None => Vec::new(),
    }
}

/// Extract dependency declarations from build-file text.
pub fn parse_build_file(content: &str, allowlist: &Allowlist) -> Vec<DependencyFinding> {
    let pats = DeclarationPatterns::new();
    let mut raw: Vec<(String, bool)> = Vec::new();

    for cap in pats.find_package.captures_iter(content) {
        raw.push((cap[1].to_string(), true));
    }

    for cap in pats.pkg_check_modules.captures_iter(content) {
        let mut args = cap[1].split_whitespace();
        // first argument is the result variable prefix
        if args.next().is_none() {
            continue;
        }
        for arg in args.filter(|a| !PKG_KEYWORDS.contains(a)) {
            let module: String = arg
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !module.is_empty() {
                raw.push((module, true));
            }
        }
    }

    for cap in pats.target_link_libraries.captures_iter(content) {
        // skip the target the libraries are linked into
        for item in cap[1].split_whitespace().skip(1) {
            if LINK_KEYWORDS.contains(&item) {
                continue;
            }
            if let Some(flag) = pats.link_flag.captures(item) {
                raw.push((flag[1].to_string(), false));
            } else if pats.identifier.is_match(item) {
                raw.push((item.to_string(), false));
            }
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .filter(|(name, _)| seen.insert(name.clone()))
        .map(|(name, required)| DependencyFinding {
            availability: allowlist.availability(&name),
            name,
            required,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_package_and_link_flag() {
        let text = "find_package(Threads REQUIRED)\nadd_executable(app main.c)\ntarget_link_libraries(app PRIVATE -lsqlite3)\n";
        let deps = parse_build_file(text, &Allowlist::builtin());
        assert_eq!(
            deps,
            vec![
                DependencyFinding {
                    name: "Threads".into(),
                    required: true,
                    availability: Availability::Unknown,
                },
                DependencyFinding {
                    name: "sqlite3".into(),
                    required: false,
                    availability: Availability::Yes,
                },
            ]
        );
    }

    #[test]
    fn test_allowlist_is_case_insensitive() {
        let allow = Allowlist::builtin();
        assert_eq!(allow.availability("SQLite3"), Availability::Yes);
        assert_eq!(allow.availability("libcurl"), Availability::Yes);
        assert_eq!(allow.availability("lib"), Availability::Unknown);
        assert_eq!(allow.availability("Qt5"), Availability::Unknown);
    }

    #[test]
    fn test_pkg_check_modules_names_are_always_required() {
        let text = "pkg_check_modules(GLIB REQUIRED glib-2.0 gio-2.0>=2.56)\npkg_check_modules(XML QUIET libxml-2.0)\n";
        let deps = parse_build_file(text, &Allowlist::builtin());
        let got: Vec<_> = deps.iter().map(|d| (d.name.as_str(), d.required)).collect();
        assert_eq!(got, vec![("glib", true), ("gio", true), ("libxml", true)]);
    }

    #[test]
    fn test_pkg_check_modules_without_keyword_is_required() {
        let deps = parse_build_file("pkg_check_modules(XML libxml-2.0)\n", &Allowlist::builtin());
        assert_eq!(
            deps,
            vec![DependencyFinding {
                name: "libxml".into(),
                required: true,
                availability: Availability::Unknown,
            }]
        );
    }

    #[test]
    fn test_link_keywords_and_non_names_are_filtered() {
        let text = "target_link_libraries(core PUBLIC m INTERFACE ${EXTRA_LIBS} Threads::Threads PRIVATE -ldl)";
        let deps = parse_build_file(text, &Allowlist::builtin());
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["m", "dl"]);
        assert!(deps.iter().all(|d| !d.required));
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let text = "find_package(ZLIB)\npkg_check_modules(Z z)\ntarget_link_libraries(a ZLIB z -lz ZLIB png)\ntarget_link_libraries(b z)";
        let deps = parse_build_file(text, &Allowlist::builtin());
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["ZLIB", "z", "png"]);
        // pkg-config module `z` is collected before the optional link item
        assert!(deps[1].required);
        assert!(!deps[2].required);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_missing_build_file_yields_nothing() {
        let dir = tempdir().unwrap();
        assert!(scan_dependencies(dir.path(), &Allowlist::builtin()).is_empty());
    }

    #[test]
    fn test_reads_build_file_from_root() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(BUILD_FILE), "FIND_PACKAGE(CURL)\n").unwrap();
        let deps = scan_dependencies(dir.path(), &Allowlist::builtin());
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].availability, Availability::Yes);
    }
}
