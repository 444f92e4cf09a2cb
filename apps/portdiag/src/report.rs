//! Report assembly: grading plus recommendation policy.

use crate::grade::{self, GradeInputs};
use crate::models::{
    ApiFinding, Availability, DependencyFinding, DiagnosticReport, FileStats, Grade,
    PathUsageFinding, Tier,
};

/// What the recommendation rows look at.
struct Signals {
    grade: Grade,
    has_blocking: bool,
    has_unknown_dependency: bool,
}

struct RecommendationRule {
    applies: fn(&Signals) -> bool,
    advice: &'static [&'static str],
}

const RECOMMENDATION_POLICY: &[RecommendationRule] = &[
    RecommendationRule {
        applies: |s| matches!(s.grade, Grade::C | Grade::D),
        advice: &[
            "evaluate alternative libraries",
            "confirm porting necessity with the team",
        ],
    },
    RecommendationRule {
        applies: |s| s.has_blocking,
        advice: &["isolate Linux-specific code into a separate module"],
    },
    RecommendationRule {
        applies: |s| s.has_unknown_dependency,
        advice: &["verify dependency availability on the target"],
    },
];

/// Totals fed to the grade policy.
pub fn grade_inputs(api_usages: &[ApiFinding], path_usages: &[PathUsageFinding]) -> GradeInputs {
    let sum = |tier: Tier| -> usize {
        api_usages
            .iter()
            .filter(|u| u.tier == tier)
            .map(|u| u.count)
            .sum()
    };
    GradeInputs {
        blocking: sum(Tier::Blocking),
        needs_rework: sum(Tier::NeedsRework),
        path_usages: path_usages.len(),
    }
}

/// Combine raw findings into the final report.
pub fn assemble(
    project_path: String,
    file_stats: FileStats,
    api_usages: Vec<ApiFinding>,
    dependencies: Vec<DependencyFinding>,
    path_usages: Vec<PathUsageFinding>,
) -> DiagnosticReport {
    let outcome = grade::calculate(&grade_inputs(&api_usages, &path_usages));
    let signals = Signals {
        grade: outcome.grade,
        has_blocking: api_usages.iter().any(|u| u.tier == Tier::Blocking),
        has_unknown_dependency: dependencies
            .iter()
            .any(|d| d.availability == Availability::Unknown),
    };
    let mut recommendations: Vec<String> = Vec::new();
    for rule in RECOMMENDATION_POLICY.iter().filter(|r| (r.applies)(&signals)) {
        for advice in rule.advice {
            if !recommendations.iter().any(|r| r == advice) {
                recommendations.push(advice.to_string());
            }
        }
    }
    DiagnosticReport {
        project_path,
        file_stats,
        api_usages,
        dependencies,
        path_usages,
        grade: outcome.grade,
        estimated_effort: outcome.effort,
        risks: outcome.risks,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(name: &str, tier: Tier, count: usize) -> ApiFinding {
        ApiFinding {
            name: name.into(),
            tier,
            count,
            files: vec!["a.c".into()],
            guidance: "g".into(),
        }
    }

    fn dep(name: &str, availability: Availability) -> DependencyFinding {
        DependencyFinding {
            name: name.into(),
            required: true,
            availability,
        }
    }

    #[test]
    fn test_clean_tree_is_grade_a_without_recommendations() {
        let r = assemble("/p".into(), FileStats::default(), vec![], vec![], vec![]);
        assert_eq!(r.grade, Grade::A);
        assert_eq!(r.estimated_effort, "< 1 day");
        assert_eq!(r.risks, vec!["straightforward port".to_string()]);
        assert!(r.recommendations.is_empty());
        assert_eq!(r.findings_in(Tier::Blocking).count(), 0);
    }

    #[test]
    fn test_blocking_and_unknown_dependency_recommendations_in_order() {
        let r = assemble(
            "/p".into(),
            FileStats::default(),
            vec![finding("bpf", Tier::Blocking, 1), finding("prctl", Tier::NeedsRework, 3)],
            vec![dep("pthread", Availability::Yes), dep("Qt5", Availability::Unknown)],
            vec![],
        );
        assert_eq!(r.grade, Grade::C);
        assert_eq!(
            r.recommendations,
            vec![
                "evaluate alternative libraries",
                "confirm porting necessity with the team",
                "isolate Linux-specific code into a separate module",
                "verify dependency availability on the target",
            ]
        );
    }

    #[test]
    fn test_rework_only_grade_c_skips_isolation_advice() {
        let r = assemble(
            "/p".into(),
            FileStats::default(),
            vec![finding("epoll_wait", Tier::NeedsRework, 25)],
            vec![dep("z", Availability::Yes)],
            vec![],
        );
        assert_eq!(r.grade, Grade::C);
        assert_eq!(r.recommendations.len(), 2);
    }

    #[test]
    fn test_path_usages_feed_grade() {
        let paths: Vec<_> = (0..11)
            .map(|i| PathUsageFinding {
                file: "a.c".into(),
                literal: format!("/proc/{}/stat", i),
            })
            .collect();
        let inputs = grade_inputs(&[], &paths);
        assert_eq!(inputs.path_usages, 11);
        let r = assemble("/p".into(), FileStats::default(), vec![], vec![], paths);
        assert_eq!(r.grade, Grade::C);
    }
}
