//! API usage scanning.
//!
//! `scan_file` is a pure function of one file's text and yields a partial
//! accumulator. Partials merge by summing counts and unioning file sets, so
//! files can be scanned in any order or in parallel.

use crate::models::{ApiFinding, Tier, MAX_FINDING_FILES};
use crate::rules::RuleTable;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct RuleHits {
    count: usize,
    files: BTreeSet<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// Per-rule hit counts keyed by the rule's index in its table.
pub struct UsageAccumulator {
    hits: BTreeMap<usize, RuleHits>,
}

impl UsageAccumulator {
    pub fn merge(mut self, other: UsageAccumulator) -> UsageAccumulator {
        for (idx, theirs) in other.hits {
            let ours = self.hits.entry(idx).or_default();
            ours.count += theirs.count;
            ours.files.extend(theirs.files);
        }
        self
    }

    /// Turn the merged hits into findings: blocking first, then by
    /// descending count. Ties keep rule table order.
    pub fn into_findings(self, rules: &RuleTable) -> Vec<ApiFinding> {
        let scored = rules.scored();
        let mut findings: Vec<ApiFinding> = self
            .hits
            .into_iter()
            .filter_map(|(idx, hits)| {
                let rule = &scored.get(idx)?.rule;
                Some(ApiFinding {
                    name: rule.pattern.clone(),
                    tier: rule.tier,
                    count: hits.count,
                    files: hits.files.into_iter().take(MAX_FINDING_FILES).collect(),
                    guidance: rule.guidance.clone(),
                })
            })
            .collect();
        findings.sort_by_key(|f| (f.tier != Tier::Blocking, std::cmp::Reverse(f.count)));
        findings
    }
}

/// Count every scored rule in one file's content.
pub fn scan_file(rules: &RuleTable, rel: &str, content: &str) -> UsageAccumulator {
    let mut acc = UsageAccumulator::default();
    for (idx, rule) in rules.scored().iter().enumerate() {
        let n = rule.count_in(content);
        if n > 0 {
            let hits = acc.hits.entry(idx).or_default();
            hits.count += n;
            hits.files.insert(rel.to_string());
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{MatchMode, Rule};

    fn builtin() -> RuleTable {
        RuleTable::builtin(MatchMode::Substring).unwrap()
    }

    #[test]
    fn test_counts_sum_across_files() {
        let rules = builtin();
        let a = scan_file(&rules, "a.c", "pivot_root(a, b);\npivot_root(c, d);\n");
        let b = scan_file(&rules, "b.c", "/* pivot_root */ pivot_root(x, y); pivot_root();");
        let findings = a.merge(b).into_findings(&rules);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name, "pivot_root");
        assert_eq!(findings[0].count, 5);
        let files: BTreeSet<_> = findings[0].files.iter().cloned().collect();
        assert_eq!(files, BTreeSet::from(["a.c".to_string(), "b.c".to_string()]));
    }

    #[test]
    fn test_blocking_and_rework_from_single_file() {
        let rules = builtin();
        let text = "io_uring_setup(8, &p);\nepoll_wait(a);\nepoll_wait(b);\nepoll_wait(c);\n";
        let findings = scan_file(&rules, "loop.c", text).into_findings(&rules);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].tier, Tier::Blocking);
        assert_eq!(findings[0].name, "io_uring");
        assert_eq!(findings[0].count, 1);
        assert_eq!(findings[1].tier, Tier::NeedsRework);
        assert_eq!(findings[1].name, "epoll_wait");
        assert_eq!(findings[1].count, 3);
    }

    #[test]
    fn test_blocking_sorts_before_more_frequent_rework() {
        let rules = builtin();
        let text = "setns(fd, 0);\nprctl(1); prctl(2); prctl(3);\neventfd(0,0); eventfd(1,0);";
        let findings = scan_file(&rules, "x.c", text).into_findings(&rules);
        let order: Vec<_> = findings.iter().map(|f| (f.name.as_str(), f.count)).collect();
        assert_eq!(order, vec![("setns", 1), ("prctl", 3), ("eventfd", 2)]);
    }

    #[test]
    fn test_file_list_is_capped_but_count_is_not() {
        let rules = builtin();
        let acc = (0..15)
            .map(|i| scan_file(&rules, &format!("f{:02}.c", i), "signalfd(); signalfd();"))
            .fold(UsageAccumulator::default(), UsageAccumulator::merge);
        let findings = acc.into_findings(&rules);
        assert_eq!(findings[0].count, 30);
        assert_eq!(findings[0].files.len(), MAX_FINDING_FILES);
    }

    #[test]
    fn test_safe_rules_are_never_reported() {
        let rules = builtin();
        let acc = scan_file(&rules, "s.c", "malloc(4); printf(\"x\"); pthread_create();");
        assert!(acc.into_findings(&rules).is_empty());
    }

    #[test]
    fn test_injected_rule_table() {
        let rules = RuleTable::new(
            vec![Rule::literal("fork", Tier::NeedsRework, "use posix_spawn")],
            MatchMode::Substring,
        )
        .unwrap();
        let findings = scan_file(&rules, "p.c", "fork(); vfork();").into_findings(&rules);
        assert_eq!(findings[0].count, 2);
        assert_eq!(findings[0].guidance, "use posix_spawn");
    }
}
