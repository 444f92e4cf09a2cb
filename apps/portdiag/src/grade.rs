//! Porting grade policy.
//!
//! The grade is a pure function of three totals. The policy is an ordered
//! table evaluated top-down; the first matching row wins.

use crate::models::Grade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GradeInputs {
    /// Sum of blocking-tier occurrence counts.
    pub blocking: usize,
    /// Sum of needs-rework-tier occurrence counts.
    pub needs_rework: usize,
    /// Number of reserved-path usages kept in the report.
    pub path_usages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub grade: Grade,
    pub effort: String,
    pub risks: Vec<String>,
}

struct GradeRule {
    applies: fn(&GradeInputs) -> bool,
    grade: Grade,
    effort: &'static str,
    risk: &'static str,
}

const GRADE_POLICY: &[GradeRule] = &[
    GradeRule {
        applies: |i| i.blocking > 5 || i.path_usages > 20,
        grade: Grade::D,
        effort: "not recommended",
        risk: "deep dependency on Linux-specific features",
    },
    GradeRule {
        applies: |i| i.blocking > 0 || i.path_usages > 10,
        grade: Grade::C,
        effort: "1-2 weeks",
        risk: "core logic needs restructuring",
    },
    GradeRule {
        applies: |i| i.needs_rework > 20,
        grade: Grade::C,
        effort: "1-2 weeks",
        risk: "large number of APIs need adaptation",
    },
    GradeRule {
        applies: |i| i.needs_rework > 5,
        grade: Grade::B,
        effort: "1-3 days",
        risk: "moderate amount of changes",
    },
    GradeRule {
        applies: |_| true,
        grade: Grade::A,
        effort: "< 1 day",
        risk: "straightforward port",
    },
];

pub fn calculate(inputs: &GradeInputs) -> GradeOutcome {
    let rule = GRADE_POLICY
        .iter()
        .find(|r| (r.applies)(inputs))
        .unwrap_or(&GRADE_POLICY[GRADE_POLICY.len() - 1]);
    GradeOutcome {
        grade: rule.grade,
        effort: rule.effort.to_string(),
        risks: vec![rule.risk.to_string()],
    }
}
