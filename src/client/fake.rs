//! In-memory backend used by the service tests.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::{
    client::{ApiError, ContactMessage, Credentials, PasswordChange, PortfolioBackend},
    models::{
        project::{Project, ProjectForm, ProjectId},
        upload::ImageUpload,
        user::{LoginResponse, User},
    },
};

pub const VALID_TOKEN: &str = "valid-token";

#[derive(Default)]
pub struct FakeBackend {
    pub projects: Mutex<Vec<Project>>,
    /// Updates to these ids answer 500
    pub failing_updates: HashSet<ProjectId>,
    pub fail_deletes: bool,
    /// Listing answers 503
    pub fail_lists: bool,
    pub fail_contact: bool,
    pub update_calls: Mutex<Vec<(ProjectId, ProjectForm)>>,
    pub contact_calls: Mutex<Vec<ContactMessage>>,
    pub password_calls: Mutex<Vec<PasswordChange>>,
    pub request_count: Mutex<usize>,
}

impl FakeBackend {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> usize {
        *self.request_count.lock().unwrap()
    }

    fn record(&self) {
        *self.request_count.lock().unwrap() += 1;
    }

    fn check_token(token: &str) -> Result<(), ApiError> {
        if token == VALID_TOKEN {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: 401,
                message: Some("Invalid token".to_string()),
            })
        }
    }

    fn apply(form: &ProjectForm, project: &mut Project) {
        project.title = form.title.clone();
        project.description = form.description.clone();
        project.project_type = form.project_type.unwrap_or_default();
        project.unrecognized_type = form.unrecognized_type.clone();
        project.technologies = form.technologies.clone();
        project.featured = form.featured;
        project.order = form.order;
    }
}

pub fn admin() -> User {
    User {
        id: "u1".to_string(),
        username: "admin".to_string(),
        ..User::default()
    }
}

impl PortfolioBackend for FakeBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.record();
        if self.fail_lists {
            return Err(ApiError::Status {
                status: 503,
                message: None,
            });
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Project, ApiError> {
        self.record();
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| slug::slugify(&p.title) == slug)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: Some("Project not found".to_string()),
            })
    }

    async fn create_project(
        &self,
        token: &str,
        form: &ProjectForm,
        image: Option<&ImageUpload>,
    ) -> Result<Project, ApiError> {
        self.record();
        Self::check_token(token)?;
        let mut projects = self.projects.lock().unwrap();
        let mut project = Project {
            id: ProjectId(format!("p{}", projects.len() + 1)),
            image_path: image.map(|i| format!("/uploads/{}", i.file_name)),
            ..Project::default()
        };
        Self::apply(form, &mut project);
        projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        token: &str,
        id: &ProjectId,
        form: &ProjectForm,
        _image: Option<&ImageUpload>,
    ) -> Result<Project, ApiError> {
        self.record();
        Self::check_token(token)?;
        self.update_calls
            .lock()
            .unwrap()
            .push((id.clone(), form.clone()));
        if self.failing_updates.contains(id) {
            return Err(ApiError::Status {
                status: 500,
                message: None,
            });
        }
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                message: Some("Project not found".to_string()),
            })?;
        Self::apply(form, project);
        Ok(project.clone())
    }

    async fn delete_project(&self, token: &str, id: &ProjectId) -> Result<(), ApiError> {
        self.record();
        Self::check_token(token)?;
        if self.fail_deletes {
            return Err(ApiError::Status {
                status: 500,
                message: Some("Database unavailable".to_string()),
            });
        }
        self.projects.lock().unwrap().retain(|p| &p.id != id);
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.record();
        if credentials.username == "admin" && credentials.password == "hunter22" {
            Ok(LoginResponse {
                token: VALID_TOKEN.to_string(),
                user: admin(),
            })
        } else {
            Err(ApiError::Status {
                status: 401,
                message: Some("Invalid credentials".to_string()),
            })
        }
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.record();
        Self::check_token(token)?;
        Ok(admin())
    }

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), ApiError> {
        self.record();
        Self::check_token(token)?;
        if change.current_password != "hunter22" {
            return Err(ApiError::Status {
                status: 400,
                message: Some("Current password is incorrect".to_string()),
            });
        }
        self.password_calls.lock().unwrap().push(change.clone());
        Ok(())
    }

    async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        self.record();
        if self.fail_contact {
            return Err(ApiError::Status {
                status: 503,
                message: None,
            });
        }
        self.contact_calls.lock().unwrap().push(message.clone());
        Ok(())
    }
}
