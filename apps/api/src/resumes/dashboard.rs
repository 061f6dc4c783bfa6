use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::resume::{Project, SkillGroup};

/// Aggregated view of a stored resume for the dashboard charts.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Skill count per category.
    pub skills_breakdown: BTreeMap<String, usize>,
    pub projects_count: usize,
}

/// Counts skills per category and totals projects for a single resume.
pub fn format_for_dashboard(skills: &[SkillGroup], projects: &[Project]) -> DashboardSummary {
    let mut skills_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    for group in skills {
        *skills_breakdown.entry(group.category.clone()).or_default() += group.list.len();
    }

    DashboardSummary {
        skills_breakdown,
        projects_count: projects.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(category: &str, list: &[&str]) -> SkillGroup {
        SkillGroup {
            category: category.to_string(),
            list: list.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_counts_skills_per_category() {
        let skills = vec![
            group("Languages", &["Rust", "SQL"]),
            group("Tools", &["Docker"]),
        ];
        let summary = format_for_dashboard(&skills, &[]);
        assert_eq!(summary.skills_breakdown["Languages"], 2);
        assert_eq!(summary.skills_breakdown["Tools"], 1);
        assert_eq!(summary.projects_count, 0);
    }

    #[test]
    fn test_repeated_categories_accumulate() {
        let skills = vec![
            group("Languages", &["Rust"]),
            group("Languages", &["Python", "Go"]),
        ];
        let summary = format_for_dashboard(&skills, &[]);
        assert_eq!(summary.skills_breakdown["Languages"], 3);
        assert_eq!(summary.skills_breakdown.len(), 1);
    }

    #[test]
    fn test_counts_projects() {
        let projects = vec![Project::default(), Project::default()];
        let summary = format_for_dashboard(&[], &projects);
        assert_eq!(summary.projects_count, 2);
        assert!(summary.skills_breakdown.is_empty());
    }
}
