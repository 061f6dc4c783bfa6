use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub contact: Option<Json<Contact>>,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub skills: Json<Vec<SkillGroup>>,
    pub projects: Json<Vec<Project>>,
    /// Key of the original uploaded document in object storage.
    pub s3_file_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured resume document as returned by the NLP parsing service.
///
/// Every field is lenient: the parser is an external collaborator and may
/// omit sections it could not extract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Bullet points.
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
}

/// One categorized skill list, e.g. `{"category": "Languages", "list": ["Rust", "SQL"]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillGroup {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Flattens categorized skill groups into one skill sequence, preserving
/// group order then in-group order. Input to the skill-gap engine.
pub fn flatten_skills(groups: &[SkillGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|group| group.list.iter().cloned())
        .collect()
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
    fn test_flatten_preserves_group_then_list_order() {
        let groups = vec![
            group("Languages", &["Python", "Rust"]),
            group("Tools", &["Docker"]),
        ];
        assert_eq!(flatten_skills(&groups), vec!["Python", "Rust", "Docker"]);
    }

    #[test]
    fn test_flatten_empty_groups() {
        assert!(flatten_skills(&[]).is_empty());
        assert!(flatten_skills(&[group("Languages", &[])]).is_empty());
    }

    #[test]
    fn test_parsed_resume_tolerates_missing_sections() {
        let json = r#"{
            "summary": "Backend engineer",
            "skills": [{"category": "Languages", "list": ["Go"]}]
        }"#;
        let parsed: ParsedResume = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.summary.as_deref(), Some("Backend engineer"));
        assert_eq!(parsed.skills.len(), 1);
        assert!(parsed.title.is_none());
        assert!(parsed.experience.is_empty());
        assert!(parsed.projects.is_empty());
    }

    #[test]
    fn test_skill_group_tolerates_missing_category() {
        let parsed: SkillGroup = serde_json::from_str(r#"{"list": ["sql"]}"#).unwrap();
        assert_eq!(parsed.category, "");
        assert_eq!(parsed.list, vec!["sql"]);
    }
}
