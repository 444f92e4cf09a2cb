//! Source tree enumeration and file statistics.
//!
//! Files are discovered with a recursive glob under the root and classified
//! by extension. The resulting list, sorted by relative path, is the
//! traversal order every scanner follows.

use crate::error::{DiagnosticError, Result};
use crate::models::FileStats;
use glob::{glob_with, MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    C,
    Cpp,
    Header,
}

impl Category {
    /// Classify by extension. Matching is case-sensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" => Some(Category::C),
            "cpp" | "cc" | "cxx" => Some(Category::Cpp),
            "h" | "hpp" => Some(Category::Header),
            _ => None,
        }
    }

    /// Translation units, as opposed to headers.
    pub fn is_source(self) -> bool {
        !matches!(self, Category::Header)
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Root-relative path with `/` separators.
    pub rel: String,
    pub category: Category,
}

/// Compile exclusion globs, rejecting malformed patterns up front.
pub fn compile_excludes(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| DiagnosticError::InvalidPattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Enumerate classified files under `root`, skipping excluded paths.
pub fn collect_files(root: &Path, excludes: &[Pattern]) -> Vec<SourceFile> {
    let pattern = format!(
        "{}/**/*",
        Pattern::escape(&root.to_string_lossy()).trim_end_matches('/')
    );
    let opts = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    let entries = match glob_with(&pattern, opts) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!("cannot enumerate {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<SourceFile> = entries
        .flatten()
        .filter(|p| p.is_file())
        .filter_map(|path| {
            let category = Category::from_path(&path)?;
            let rel = relative_path(root, &path);
            if excludes.iter().any(|ex| ex.matches(&rel)) {
                tracing::debug!("excluded {}", rel);
                return None;
            }
            Some(SourceFile {
                path,
                rel,
                category,
            })
        })
        .collect();
    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    files
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read a file leniently. Invalid UTF-8 sequences are dropped rather than
/// rejected; `None` means the file could not be opened at all.
pub fn read_lossy(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(decode_dropping_invalid(&bytes)),
        Err(e) => {
            tracing::debug!("skipping unreadable {}: {}", path.display(), e);
            None
        }
    }
}

/// Keep only the valid UTF-8 runs, so `io_\xffuring` reads as `io_uring`.
pub fn decode_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Count lines the way the report defines them: `\r\n` is one break, a lone
/// `\r`, form feed or Unicode separator is a break too, and trailing text
/// after the last break is one more line.
pub fn count_lines(text: &str) -> usize {
    let mut lines = 0;
    let mut open = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if is_line_break(c) {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            lines += 1;
            open = false;
        } else {
            open = true;
        }
    }
    lines + usize::from(open)
}

impl FileStats {
    /// Count one file. Unreadable files pass `lines = 0`.
    pub fn record(&mut self, category: Category, lines: usize) {
        match category {
            Category::C => self.c += 1,
            Category::Cpp => self.cpp += 1,
            Category::Header => self.h += 1,
        }
        self.total_lines += lines;
    }

    pub fn merge(mut self, other: FileStats) -> FileStats {
        self.c += other.c;
        self.cpp += other.cpp;
        self.h += other.h;
        self.total_lines += other.total_lines;
        self
    }
}
