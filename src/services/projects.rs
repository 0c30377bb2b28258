use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    client::{ApiError, PortfolioBackend},
    models::{
        project::{Project, ProjectForm, ProjectType},
        upload::{ImageUpload, ImageValidationError, mime_type_for},
    },
    services::reorder::ProjectBoard,
};

#[derive(Debug, Error)]
pub enum FetchProjectsError {
    #[error("{}", .0.user_message("Failed to load projects"))]
    Api(#[from] ApiError),
}

/// Fetch the authoritative project list into a fresh board
pub async fn fetch_board(
    backend: &impl PortfolioBackend,
) -> Result<ProjectBoard, FetchProjectsError> {
    let projects = backend.list_projects().await?;
    tracing::debug!(count = projects.len(), "projects loaded");
    Ok(ProjectBoard::new(projects))
}

#[derive(Debug, Error)]
pub enum ShowProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("{}", .0.user_message("Failed to load project"))]
    Api(ApiError),
}

/// Look a project up by its URL slug. Free text is slugified first, so
/// `"Weather App"` and `"weather-app"` find the same project.
pub async fn project_by_slug(
    backend: &impl PortfolioBackend,
    query: &str,
) -> Result<Project, ShowProjectError> {
    let slug = slug::slugify(query);
    backend.project_by_slug(&slug).await.map_err(|e| match e {
        ApiError::Status { status: 404, .. } => ShowProjectError::ProjectNotFound(slug.clone()),
        other => ShowProjectError::Api(other),
    })
}

#[derive(Debug, Error)]
pub enum ResolveProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project name is ambiguous. Multiple projects found: {}", .0.join(", "))]
    AmbiguousProjectName(Vec<String>),
}

/// Find a project by exact id, or by a case-insensitive fragment of its title
pub fn resolve_project<'a>(
    projects: &'a [Project],
    query: &str,
) -> Result<&'a Project, ResolveProjectError> {
    if let Some(project) = projects.iter().find(|p| p.id.as_str() == query) {
        return Ok(project);
    }

    let matching: Vec<_> = projects
        .iter()
        .filter(|p| p.title.to_lowercase().contains(&query.to_lowercase()))
        .collect();

    match matching.len() {
        0 => Err(ResolveProjectError::ProjectNotFound(query.to_string())),
        1 => Ok(matching[0]),
        _ => {
            // An exact title match wins over partial ones
            if let Some(exact) = matching
                .iter()
                .find(|p| p.title.eq_ignore_ascii_case(query))
            {
                return Ok(*exact);
            }
            Err(ResolveProjectError::AmbiguousProjectName(
                matching.iter().map(|p| p.title.clone()).collect(),
            ))
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageFileError {
    #[error("Failed to read image '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ImageValidationError),
}

/// Read and validate an image from disk before any request is made
pub fn load_image(path: &Path) -> Result<ImageUpload, ImageFileError> {
    let mime_type = mime_type_for(path).ok_or_else(|| {
        ImageValidationError::UnsupportedType(
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    })?;

    let bytes = std::fs::read(path).map_err(|e| ImageFileError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(ImageUpload::new(file_name, mime_type.to_string(), bytes)?)
}

#[derive(Debug, Error)]
pub enum ProjectFormError {
    #[error("Please fill in all required fields (title, description, project type)")]
    MissingRequiredFields,

    #[error(transparent)]
    Image(#[from] ImageFileError),
}

fn validate_form(form: &ProjectForm) -> Result<(), ProjectFormError> {
    if form.title.trim().is_empty()
        || form.description.trim().is_empty()
        || form.project_type.is_none()
    {
        return Err(ProjectFormError::MissingRequiredFields);
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum SaveProjectError {
    #[error(transparent)]
    Invalid(#[from] ProjectFormError),

    #[error(transparent)]
    Resolve(#[from] ResolveProjectError),

    #[error("{}", .0.user_message("An error occurred while saving the project"))]
    Api(#[from] ApiError),
}

pub struct CreateProjectParameters {
    pub form: ProjectForm,
    pub image: Option<PathBuf>,
}

pub async fn create_project(
    backend: &impl PortfolioBackend,
    token: &str,
    parameters: CreateProjectParameters,
) -> Result<Project, SaveProjectError> {
    validate_form(&parameters.form)?;
    let image = parameters
        .image
        .as_deref()
        .map(load_image)
        .transpose()
        .map_err(ProjectFormError::from)?;

    let project = backend
        .create_project(token, &parameters.form, image.as_ref())
        .await?;

    tracing::info!(id = %project.id, title = %project.title, "project created");
    Ok(project)
}

/// Field overrides for an edit; `None` keeps the current value
#[derive(Debug, Default, Clone)]
pub struct ProjectEdits {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_type: Option<ProjectType>,
    pub technologies: Option<Vec<String>>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub privacy_policy: Option<String>,
    pub featured: Option<bool>,
    pub order: Option<i64>,
}

impl ProjectEdits {
    pub fn apply(self, form: &mut ProjectForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(project_type) = self.project_type {
            form.project_type = Some(project_type);
            form.unrecognized_type = None;
        }
        if let Some(technologies) = self.technologies {
            form.technologies = technologies;
        }
        if let Some(project_url) = self.project_url {
            form.project_url = project_url;
        }
        if let Some(github_url) = self.github_url {
            form.github_url = github_url;
        }
        if let Some(privacy_policy) = self.privacy_policy {
            form.privacy_policy = privacy_policy;
        }
        if let Some(featured) = self.featured {
            form.featured = featured;
        }
        if let Some(order) = self.order {
            form.order = order;
        }
    }
}

pub struct UpdateProjectParameters {
    pub project: String,
    pub edits: ProjectEdits,
    pub image: Option<PathBuf>,
}

pub async fn update_project(
    board: &mut ProjectBoard,
    backend: &impl PortfolioBackend,
    token: &str,
    parameters: UpdateProjectParameters,
) -> Result<Project, SaveProjectError> {
    let current = resolve_project(board.visible(), &parameters.project)?;
    let id = current.id.clone();

    let mut form = ProjectForm::from_project(current);
    parameters.edits.apply(&mut form);
    validate_form(&form)?;

    let image = parameters
        .image
        .as_deref()
        .map(load_image)
        .transpose()
        .map_err(ProjectFormError::from)?;

    let updated = backend
        .update_project(token, &id, &form, image.as_ref())
        .await?;

    tracing::info!(id = %id, "project updated");
    board.put(updated.clone());

    Ok(updated)
}

/// Flip the featured flag, then reload the list so the board reflects the server.
/// A failed reload does not undo the saved flag; the board keeps the server's
/// copy of the one record instead.
pub async fn toggle_featured(
    board: &mut ProjectBoard,
    backend: &impl PortfolioBackend,
    token: &str,
    project: &str,
) -> Result<bool, SaveProjectError> {
    let current = resolve_project(board.visible(), project)?;
    let id = current.id.clone();

    let mut form = ProjectForm::from_project(current);
    form.featured = !form.featured;
    let featured = form.featured;

    let updated = backend.update_project(token, &id, &form, None).await?;
    match backend.list_projects().await {
        Ok(projects) => board.replace(projects),
        Err(e) => {
            tracing::warn!(error = %e, "could not reload projects after toggling featured");
            board.put(updated);
        }
    }

    tracing::info!(id = %id, featured, "featured flag updated");
    Ok(featured)
}

#[derive(Debug, Error)]
pub enum DeleteProjectError {
    #[error("Deletion not confirmed")]
    NotConfirmed,

    #[error(transparent)]
    Resolve(#[from] ResolveProjectError),

    #[error("{}", .0.user_message("Failed to delete project"))]
    Api(#[from] ApiError),
}

pub struct DeleteProjectParameters {
    pub project: String,
    pub confirmed: bool,
}

/// Delete after explicit confirmation. The board only drops the project once
/// the server has accepted the delete.
pub async fn delete_project(
    board: &mut ProjectBoard,
    backend: &impl PortfolioBackend,
    token: &str,
    parameters: DeleteProjectParameters,
) -> Result<Project, DeleteProjectError> {
    let project = resolve_project(board.visible(), &parameters.project)?.clone();

    if !parameters.confirmed {
        return Err(DeleteProjectError::NotConfirmed);
    }

    backend.delete_project(token, &project.id).await?;
    board.remove(&project.id);

    tracing::info!(id = %project.id, title = %project.title, "project deleted");
    Ok(project)
}
