//! Skill-Gap Engine — set-based matching of a candidate's skills against a
//! target skill list.
//!
//! Pure and synchronous: no I/O, no shared state, a fresh `GapReport` per
//! call. The surrounding handlers own persistence and HTTP translation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum SkillGapError {
    #[error("Invalid input: {0} must be an array of strings")]
    InvalidInput(&'static str),
}

impl From<SkillGapError> for AppError {
    fn from(e: SkillGapError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Result of comparing a candidate's skills against a target role's
/// required skills.
///
/// Invariants: `matched_skills` and `missing_skills` are disjoint and
/// together equal the normalized, deduplicated target list; both keep the
/// first-appearance order of the target sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    /// Match percentage, 0–100, two-decimal precision.
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Compares a candidate's skill collection against a target-role skill list.
///
/// Both inputs may contain duplicates and mixed case; every skill is
/// lowercased before comparison. An empty target yields score 0 with empty
/// matched/missing lists, never a divide-by-zero.
pub fn compute_skill_gap(candidate_skills: &[String], target_skills: &[String]) -> GapReport {
    let candidate: HashSet<String> = candidate_skills
        .iter()
        .map(|skill| skill.to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    let mut matched_skills = Vec::new();
    let mut missing_skills = Vec::new();

    for skill in target_skills {
        let skill = skill.to_lowercase();
        if !seen.insert(skill.clone()) {
            continue;
        }
        if candidate.contains(&skill) {
            matched_skills.push(skill);
        } else {
            missing_skills.push(skill);
        }
    }

    let target_count = matched_skills.len() + missing_skills.len();
    let score = if target_count > 0 {
        round_two_decimals(matched_skills.len() as f64 / target_count as f64 * 100.0)
    } else {
        0.0
    };

    GapReport {
        score,
        matched_skills,
        missing_skills,
    }
}

/// Boundary validation for caller-supplied skill lists: accepts only a JSON
/// array of strings. Handlers call this before touching the engine so a bad
/// payload surfaces as `InvalidInput` instead of a generic body rejection.
pub fn skill_list_from_json(value: &Value, field: &'static str) -> Result<Vec<String>, SkillGapError> {
    let items = value
        .as_array()
        .ok_or(SkillGapError::InvalidInput(field))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(String::from)
                .ok_or(SkillGapError::InvalidInput(field))
        })
        .collect()
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partial_overlap_scores_two_thirds() {
        let report = compute_skill_gap(
            &skills(&["Python", "React", "SQL"]),
            &skills(&["python", "react", "docker"]),
        );
        assert_eq!(report.score, 66.67);
        assert_eq!(report.matched_skills, skills(&["python", "react"]));
        assert_eq!(report.missing_skills, skills(&["docker"]));
    }

    #[test]
    fn test_empty_candidate_misses_every_target() {
        let report = compute_skill_gap(&[], &skills(&["aws", "sql"]));
        assert_eq!(report.score, 0.0);
        assert!(report.matched_skills.is_empty());
        assert_eq!(report.missing_skills, skills(&["aws", "sql"]));
    }

    #[test]
    fn test_empty_target_scores_zero() {
        let report = compute_skill_gap(&skills(&["go"]), &[]);
        assert_eq!(report.score, 0.0);
        assert!(report.matched_skills.is_empty());
        assert!(report.missing_skills.is_empty());
    }

    #[test]
    fn test_comparison_is_case_insensitive() {
        let report = compute_skill_gap(&skills(&["Python"]), &skills(&["PYTHON"]));
        assert_eq!(report.score, 100.0);
        assert_eq!(report.matched_skills, skills(&["python"]));
        assert!(report.missing_skills.is_empty());
    }

    #[test]
    fn test_full_overlap_scores_one_hundred() {
        let report = compute_skill_gap(
            &skills(&["rust", "sql", "docker"]),
            &skills(&["Docker", "Rust"]),
        );
        assert_eq!(report.score, 100.0);
        assert!(report.missing_skills.is_empty());
    }

    #[test]
    fn test_duplicate_targets_are_deduplicated() {
        let report = compute_skill_gap(&skills(&["rust"]), &skills(&["Rust", "rust", "SQL"]));
        assert_eq!(report.matched_skills, skills(&["rust"]));
        assert_eq!(report.missing_skills, skills(&["sql"]));
        assert_eq!(report.score, 50.0);
    }

    #[test]
    fn test_duplicate_candidates_are_harmless() {
        let report = compute_skill_gap(
            &skills(&["rust", "Rust", "RUST"]),
            &skills(&["rust", "go"]),
        );
        assert_eq!(report.score, 50.0);
        assert_eq!(report.matched_skills, skills(&["rust"]));
    }

    #[test]
    fn test_output_order_follows_target_first_appearance() {
        let report = compute_skill_gap(
            &skills(&["c", "a"]),
            &skills(&["b", "a", "c", "d"]),
        );
        assert_eq!(report.matched_skills, skills(&["a", "c"]));
        assert_eq!(report.missing_skills, skills(&["b", "d"]));
    }

    #[test]
    fn test_matched_and_missing_partition_the_target_set() {
        let target = skills(&["Rust", "SQL", "rust", "Docker", "AWS"]);
        let report = compute_skill_gap(&skills(&["sql", "aws"]), &target);

        let mut union: Vec<String> = report
            .matched_skills
            .iter()
            .chain(report.missing_skills.iter())
            .cloned()
            .collect();
        union.sort();

        let mut expected: Vec<String> = target
            .iter()
            .map(|s| s.to_lowercase())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        expected.sort();
        assert_eq!(union, expected);

        for skill in &report.matched_skills {
            assert!(!report.missing_skills.contains(skill));
        }
    }

    #[test]
    fn test_score_rounds_to_two_decimals() {
        let report = compute_skill_gap(&skills(&["rust"]), &skills(&["rust", "go", "zig"]));
        assert_eq!(report.score, 33.33);
    }

    #[test]
    fn test_same_input_yields_same_output() {
        let candidate = skills(&["Python", "SQL"]);
        let target = skills(&["sql", "aws", "python"]);
        assert_eq!(
            compute_skill_gap(&candidate, &target),
            compute_skill_gap(&candidate, &target)
        );
    }

    #[test]
    fn test_report_serializes_with_camel_case_keys() {
        let report = compute_skill_gap(&skills(&["rust"]), &skills(&["rust", "go"]));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["score"], json!(50.0));
        assert_eq!(value["matchedSkills"], json!(["rust"]));
        assert_eq!(value["missingSkills"], json!(["go"]));
    }

    #[test]
    fn test_skill_list_accepts_array_of_strings() {
        let value = json!(["Rust", "SQL"]);
        assert_eq!(
            skill_list_from_json(&value, "target_skills").unwrap(),
            skills(&["Rust", "SQL"])
        );
    }

    #[test]
    fn test_skill_list_rejects_plain_string() {
        let value = json!("python");
        let err = skill_list_from_json(&value, "target_skills").unwrap_err();
        assert!(matches!(err, SkillGapError::InvalidInput("target_skills")));
    }

    #[test]
    fn test_skill_list_rejects_mixed_array() {
        let value = json!(["rust", 3]);
        assert!(skill_list_from_json(&value, "target_skills").is_err());
    }

    #[test]
    fn test_skill_list_accepts_empty_array() {
        assert!(skill_list_from_json(&json!([]), "target_skills")
            .unwrap()
            .is_empty());
    }
}
