use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Server-assigned identity of a project
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Frontend,
    Backend,
    Fullstack,
    Mobile,
    Wordpress,
    Ai,
    #[default]
    #[serde(other)]
    Other,
}

impl ProjectType {
    /// Every category, in the order the showcase renders them
    pub const ALL: [ProjectType; 7] = [
        ProjectType::Frontend,
        ProjectType::Backend,
        ProjectType::Fullstack,
        ProjectType::Mobile,
        ProjectType::Wordpress,
        ProjectType::Ai,
        ProjectType::Other,
    ];

    /// Wire value sent in form fields and query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Frontend => "frontend",
            ProjectType::Backend => "backend",
            ProjectType::Fullstack => "fullstack",
            ProjectType::Mobile => "mobile",
            ProjectType::Wordpress => "wordpress",
            ProjectType::Ai => "ai",
            ProjectType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectType::Frontend => "Frontend",
            ProjectType::Backend => "Backend",
            ProjectType::Fullstack => "Fullstack",
            ProjectType::Mobile => "Mobile",
            ProjectType::Wordpress => "WordPress",
            ProjectType::Ai => "AI",
            ProjectType::Other => "Other",
        }
    }

    /// Heading used for a category section (e.g. "Frontend Projects")
    pub fn section_title(&self) -> String {
        format!("{} Projects", self.label())
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown project type '{0}'. Expected one of: frontend, backend, fullstack, mobile, wordpress, ai, other")]
pub struct UnknownProjectType(pub String);

impl FromStr for ProjectType {
    type Err = UnknownProjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ProjectType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownProjectType(s.to_string()))
    }
}

#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(from = "ProjectRecord")]
pub struct Project {
    /// Server-assigned identifier
    pub id: ProjectId,
    /// Title of the project
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Category the project is grouped under
    pub project_type: ProjectType,
    /// The server's `projectType` when it is not a known category ("" when
    /// absent). Sent back verbatim on every write.
    pub unrecognized_type: Option<String>,
    /// Technologies used, in display order
    pub technologies: Vec<String>,
    /// Absolute image URL, when the server stores one
    pub image_url: Option<String>,
    /// Server-relative image path for uploaded images
    pub image_path: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub privacy_policy: Option<String>,
    /// Starred projects get a badge and can be listed first
    pub featured: bool,
    /// Relative position within its category, smaller first
    pub order: i64,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

/// Wire shape of a project record
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRecord {
    #[serde(rename = "_id", alias = "id")]
    id: ProjectId,
    title: String,
    description: String,
    #[serde(default)]
    project_type: Option<String>,
    #[serde(default)]
    technologies: Vec<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    image_path: Option<String>,
    #[serde(default)]
    project_url: Option<String>,
    #[serde(default)]
    github_url: Option<String>,
    #[serde(default)]
    privacy_policy: Option<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    order: i64,
    #[serde(default)]
    created_at: Option<Timestamp>,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        // Absent, null or unknown categories group under Other
        let raw = record.project_type.unwrap_or_default();
        let (project_type, unrecognized_type) = match raw.parse::<ProjectType>() {
            Ok(project_type) => (project_type, None),
            Err(_) => (ProjectType::Other, Some(raw)),
        };

        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            project_type,
            unrecognized_type,
            technologies: record.technologies,
            image_url: record.image_url,
            image_path: record.image_path,
            project_url: record.project_url,
            github_url: record.github_url,
            privacy_policy: record.privacy_policy,
            featured: record.featured,
            order: record.order,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl Project {
    /// Image location to display, resolving server-relative paths against `base_url`
    pub fn display_image(&self, base_url: &str) -> Option<String> {
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            return Some(resolve_asset(url, base_url));
        }
        self.image_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| resolve_asset(p, base_url))
    }
}

fn resolve_asset(location: &str, base_url: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            location.trim_start_matches('/')
        )
    }
}

/// Split a comma-separated technology field into trimmed, non-empty entries
pub fn split_technologies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_technologies(technologies: &[String]) -> String {
    technologies.join(", ")
}

/// Editable fields of a project, sent as multipart form data on create and update
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub project_type: Option<ProjectType>,
    /// Raw category carried over from a record whose type is not a known one
    pub unrecognized_type: Option<String>,
    pub technologies: Vec<String>,
    pub project_url: String,
    pub github_url: String,
    pub privacy_policy: String,
    pub featured: bool,
    pub order: i64,
}

impl ProjectForm {
    /// Prefill a form with the current values of `project`
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            project_type: Some(project.project_type),
            unrecognized_type: project.unrecognized_type.clone(),
            technologies: project.technologies.clone(),
            project_url: project.project_url.clone().unwrap_or_default(),
            github_url: project.github_url.clone().unwrap_or_default(),
            privacy_policy: project.privacy_policy.clone().unwrap_or_default(),
            featured: project.featured,
            order: project.order,
        }
    }

    fn project_type_field(&self) -> String {
        match (self.project_type, &self.unrecognized_type) {
            (Some(ProjectType::Other), Some(raw)) => raw.clone(),
            (Some(project_type), _) => project_type.as_str().to_string(),
            (None, _) => String::new(),
        }
    }

    /// Text parts in the order the backend expects them
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("projectType", self.project_type_field()),
            ("technologies", join_technologies(&self.technologies)),
            ("projectUrl", self.project_url.clone()),
            ("githubUrl", self.github_url.clone()),
            ("privacyPolicy", self.privacy_policy.clone()),
            ("featured", self.featured.to_string()),
            ("order", self.order.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_record() {
        let json = r#"{
            "_id": "65f1c0",
            "title": "Weather App",
            "description": "Forecasts",
            "projectType": "frontend",
            "technologies": ["React", "Vite"],
            "imagePath": "/uploads/weather.png",
            "featured": true,
            "order": 3,
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();

        assert_eq!(project.id, ProjectId::from("65f1c0"));
        assert_eq!(project.project_type, ProjectType::Frontend);
        assert_eq!(project.technologies, vec!["React", "Vite"]);
        assert!(project.featured);
        assert_eq!(project.order, 3);
        assert!(project.created_at.is_some());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"id": "a", "title": "T", "description": "D"}"#;

        let project: Project = serde_json::from_str(json).unwrap();

        assert_eq!(project.id.as_str(), "a");
        assert_eq!(project.project_type, ProjectType::Other);
        assert!(project.technologies.is_empty());
        assert!(!project.featured);
        assert_eq!(project.order, 0);
    }

    #[test]
    fn test_unknown_project_type_maps_to_other() {
        let json = r#"{"_id": "a", "title": "T", "description": "D", "projectType": "game"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.project_type, ProjectType::Other);
        assert_eq!(project.unrecognized_type.as_deref(), Some("game"));

        let json = r#"{"_id": "a", "title": "T", "description": "D", "projectType": null}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.project_type, ProjectType::Other);
        assert_eq!(project.unrecognized_type.as_deref(), Some(""));

        let json = r#"{"_id": "a", "title": "T", "description": "D", "projectType": "other"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.unrecognized_type, None);
    }

    #[test]
    fn test_unknown_project_type_is_sent_back_unchanged() {
        let json = r#"{"_id": "a", "title": "T", "description": "D", "projectType": "game"}"#;
        let project: Project = serde_json::from_str(json).unwrap();

        let mut form = ProjectForm::from_project(&project);
        assert!(form.fields().contains(&("projectType", "game".to_string())));

        form.project_type = Some(ProjectType::Mobile);
        assert!(form.fields().contains(&("projectType", "mobile".to_string())));
    }

    #[test]
    fn test_project_type_parse() {
        assert_eq!("AI".parse::<ProjectType>().unwrap(), ProjectType::Ai);
        assert_eq!(" wordpress ".parse::<ProjectType>().unwrap(), ProjectType::Wordpress);
        assert!("games".parse::<ProjectType>().is_err());
        assert_eq!(ProjectType::Wordpress.section_title(), "WordPress Projects");
    }

    #[test]
    fn test_split_technologies() {
        assert_eq!(
            split_technologies("Rust, Tokio ,, axum "),
            vec!["Rust", "Tokio", "axum"]
        );
        assert!(split_technologies("  ").is_empty());
        assert_eq!(
            join_technologies(&["Rust".to_string(), "Tokio".to_string()]),
            "Rust, Tokio"
        );
    }

    #[test]
    fn test_display_image_resolution() {
        let mut project = Project {
            image_path: Some("/uploads/a.png".to_string()),
            ..Project::default()
        };
        assert_eq!(
            project.display_image("https://site.dev/").as_deref(),
            Some("https://site.dev/uploads/a.png")
        );

        project.image_url = Some("https://cdn.dev/b.png".to_string());
        assert_eq!(
            project.display_image("https://site.dev").as_deref(),
            Some("https://cdn.dev/b.png")
        );

        assert_eq!(Project::default().display_image("https://site.dev"), None);
    }

    #[test]
    fn test_form_fields_from_project() {
        let project = Project {
            id: ProjectId::from("p1"),
            title: "Folio".to_string(),
            description: "Site".to_string(),
            project_type: ProjectType::Fullstack,
            technologies: vec!["Rust".to_string(), "React".to_string()],
            github_url: Some("https://github.com/me/folio".to_string()),
            featured: true,
            order: 2,
            ..Project::default()
        };

        let fields = ProjectForm::from_project(&project).fields();

        assert_eq!(
            fields,
            vec![
                ("title", "Folio".to_string()),
                ("description", "Site".to_string()),
                ("projectType", "fullstack".to_string()),
                ("technologies", "Rust, React".to_string()),
                ("projectUrl", String::new()),
                ("githubUrl", "https://github.com/me/folio".to_string()),
                ("privacyPolicy", String::new()),
                ("featured", "true".to_string()),
                ("order", "2".to_string()),
            ]
        );
    }
}
