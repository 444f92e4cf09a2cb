//! Detection rule table.
//!
//! Rules are plain data grouped by tier. `RuleTable` compiles the scored
//! tiers once and is handed to the usage scanner by the caller, so tests and
//! embedders can inject their own rule sets.

use crate::error::{DiagnosticError, Result};
use crate::models::Tier;
use regex::Regex;
use std::str::FromStr;

/// Blocking patterns are regular expressions.
const BLOCKING_RULES: &[(&str, &str)] = &[
    ("io_uring", "io_uring async I/O is not supported on the target"),
    ("clone.*CLONE_NEW", "Linux namespaces are not supported on the target"),
    ("unshare", "Linux namespaces are not supported on the target"),
    ("setns", "Linux namespaces are not supported on the target"),
    ("perf_event_open", "Linux perf events are not supported on the target"),
    ("bpf", "eBPF is not supported on the target"),
    ("mount.*MS_", "mount flags are restricted on the target"),
    ("pivot_root", "switching the root filesystem is not supported"),
];

/// Needs-rework patterns are literal identifiers.
const NEEDS_REWORK_RULES: &[(&str, &str)] = &[
    ("epoll_create", "epoll -> poll() or select()"),
    ("epoll_ctl", "epoll -> poll() or select()"),
    ("epoll_wait", "epoll -> poll() or select()"),
    ("inotify_init", "inotify -> target file watcher service"),
    ("inotify_add_watch", "inotify -> target file watcher service"),
    ("eventfd", "eventfd -> pipe()"),
    ("signalfd", "signalfd -> signal() handler"),
    ("timerfd_create", "timerfd -> timer_create()"),
    ("timerfd_settime", "timerfd -> timer_settime()"),
    ("getauxval", "getauxval -> read manually or compile conditionally"),
    ("prctl", "prctl -> partially supported, verify each option"),
    ("sched_setaffinity", "CPU affinity -> partially supported"),
];

const SAFE_APIS: &[&str] = &[
    "pthread_", "socket", "bind", "listen", "accept", "connect", "open", "read", "write", "close",
    "lseek", "fstat", "malloc", "free", "realloc", "calloc", "memcpy", "memset", "strcmp",
    "strlen", "printf", "fprintf", "sprintf", "snprintf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How rule patterns are anchored when searched in file text.
pub enum MatchMode {
    /// Raw substring/regex search, matching inside longer identifiers,
    /// comments and string literals alike.
    #[default]
    Substring,
    /// The match must start at an identifier boundary; literal rules must
    /// also end at one.
    Word,
}

impl FromStr for MatchMode {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(MatchMode::Substring),
            "word" => Ok(MatchMode::Word),
            _ => Err(DiagnosticError::InvalidOption {
                name: "match mode",
                value: s.to_string(),
                expected: "substring|word",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single detection rule.
pub struct Rule {
    pub pattern: String,
    pub tier: Tier,
    pub guidance: String,
    /// Literal rules are escaped before compilation.
    pub literal: bool,
}

impl Rule {
    pub fn regex(pattern: &str, tier: Tier, guidance: &str) -> Self {
        Rule {
            pattern: pattern.to_string(),
            tier,
            guidance: guidance.to_string(),
            literal: false,
        }
    }

    pub fn literal(pattern: &str, tier: Tier, guidance: &str) -> Self {
        Rule {
            literal: true,
            ..Rule::regex(pattern, tier, guidance)
        }
    }
}

/// A scored rule with its compiled matcher.
pub struct CompiledRule {
    pub rule: Rule,
    matcher: Regex,
}

impl CompiledRule {
    /// Number of non-overlapping matches in `text`.
    pub fn count_in(&self, text: &str) -> usize {
        self.matcher.find_iter(text).count()
    }
}

/// Rules handed to the usage scanner. Only blocking and needs-rework rules
/// are compiled; safe rules are kept for the `rules` listing.
pub struct RuleTable {
    scored: Vec<CompiledRule>,
    safe: Vec<Rule>,
}

impl RuleTable {
    /// Build a table from arbitrary rules. Order is preserved and breaks
    /// ties when findings are sorted.
    pub fn new(rules: Vec<Rule>, mode: MatchMode) -> Result<Self> {
        let mut scored = Vec::new();
        let mut safe = Vec::new();
        for rule in rules {
            if rule.tier == Tier::Safe {
                safe.push(rule);
                continue;
            }
            let matcher = compile(&rule, mode)?;
            scored.push(CompiledRule { rule, matcher });
        }
        Ok(RuleTable { scored, safe })
    }

    /// The built-in table for OpenHarmony-class targets.
    pub fn builtin(mode: MatchMode) -> Result<Self> {
        Self::new(builtin_rules(), mode)
    }

    pub fn scored(&self) -> &[CompiledRule] {
        &self.scored
    }

    pub fn safe(&self) -> &[Rule] {
        &self.safe
    }
}

/// The built-in rules in table order: blocking, needs-rework, then safe.
pub fn builtin_rules() -> Vec<Rule> {
    let blocking = BLOCKING_RULES
        .iter()
        .map(|(p, g)| Rule::regex(p, Tier::Blocking, g));
    let rework = NEEDS_REWORK_RULES
        .iter()
        .map(|(p, g)| Rule::literal(p, Tier::NeedsRework, g));
    let safe = SAFE_APIS
        .iter()
        .map(|p| Rule::literal(p, Tier::Safe, "portable, no action needed"));
    blocking.chain(rework).chain(safe).collect()
}

fn compile(rule: &Rule, mode: MatchMode) -> Result<Regex> {
    let body = if rule.literal {
        regex::escape(&rule.pattern)
    } else {
        rule.pattern.clone()
    };
    let src = match (mode, rule.literal) {
        (MatchMode::Substring, _) => body,
        (MatchMode::Word, true) => format!(r"\b{}\b", body),
        (MatchMode::Word, false) => format!(r"\b(?:{})", body),
    };
    Regex::new(&src).map_err(|e| DiagnosticError::InvalidPattern {
        pattern: rule.pattern.clone(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(table: &'a RuleTable, pattern: &str) -> &'a CompiledRule {
        table
            .scored()
            .iter()
            .find(|r| r.rule.pattern == pattern)
            .unwrap()
    }

    #[test]
    fn test_builtin_splits_safe_from_scored() {
        let table = RuleTable::builtin(MatchMode::Substring).unwrap();
        assert_eq!(table.scored().len(), 20);
        assert!(table.safe().iter().all(|r| r.tier == Tier::Safe));
        assert!(table.scored().iter().all(|r| r.rule.tier != Tier::Safe));
        // blocking rules come first in table order
        assert_eq!(table.scored()[0].rule.tier, Tier::Blocking);
    }

    #[test]
    fn test_substring_mode_matches_inside_identifiers() {
        let table = RuleTable::builtin(MatchMode::Substring).unwrap();
        let bpf = find(&table, "bpf");
        assert_eq!(bpf.count_in("int ebpf_map; bpf(BPF_PROG_LOAD);"), 2);
        let ns = find(&table, "clone.*CLONE_NEW");
        assert_eq!(ns.count_in("clone(fn, stack, CLONE_NEWNS, 0);"), 1);
        // case-sensitive
        assert_eq!(bpf.count_in("BPF"), 0);
    }

    #[test]
    fn test_word_mode_anchors_at_identifier_boundaries() {
        let table = RuleTable::builtin(MatchMode::Word).unwrap();
        let bpf = find(&table, "bpf");
        assert_eq!(bpf.count_in("int ebpf_map; bpf(BPF_PROG_LOAD);"), 1);
        let ev = find(&table, "eventfd");
        assert_eq!(ev.count_in("eventfd(0, 0); my_eventfd_wrapper();"), 1);
        // regex rules only need a leading boundary so CLONE_NEWNS still counts
        let ns = find(&table, "clone.*CLONE_NEW");
        assert_eq!(ns.count_in("clone(fn, stack, CLONE_NEWNS, 0);"), 1);
    }

    #[test]
    fn test_literal_rules_are_escaped() {
        let rules = vec![Rule::literal("a.b", Tier::NeedsRework, "g")];
        let table = RuleTable::new(rules, MatchMode::Substring).unwrap();
        assert_eq!(table.scored()[0].count_in("a.b axb"), 1);
    }

    #[test]
    fn test_invalid_custom_pattern_is_reported() {
        let rules = vec![Rule::regex("(unclosed", Tier::Blocking, "g")];
        match RuleTable::new(rules, MatchMode::Substring) {
            Err(DiagnosticError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
            _ => panic!("expected InvalidPattern"),
        }
    }

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("word".parse::<MatchMode>().unwrap(), MatchMode::Word);
        assert_eq!(" Substring ".parse::<MatchMode>().unwrap(), MatchMode::Substring);
        assert!("tokens".parse::<MatchMode>().is_err());
    }
}
