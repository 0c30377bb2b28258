use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    project::{Project, ProjectForm, ProjectId},
    upload::ImageUpload,
    user::{LoginResponse, User},
};

pub mod http;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (network, DNS, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Server responded with status {status}{}", status_detail(.message))]
    Status { status: u16, message: Option<String> },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

fn status_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl ApiError {
    /// Human readable message: the server's own message when it sent one, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    #[cfg(test)]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

/// Error payload shape used by the backend (`{"message": "..."}`)
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recaptcha_token: Option<String>,
}

/// The portfolio REST API as consumed by this client. Mutating calls take the
/// bearer token explicitly; the caller owns the session.
pub trait PortfolioBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;

    async fn project_by_slug(&self, slug: &str) -> Result<Project, ApiError>;

    async fn create_project(
        &self,
        token: &str,
        form: &ProjectForm,
        image: Option<&ImageUpload>,
    ) -> Result<Project, ApiError>;

    async fn update_project(
        &self,
        token: &str,
        id: &ProjectId,
        form: &ProjectForm,
        image: Option<&ImageUpload>,
    ) -> Result<Project, ApiError>;

    async fn delete_project(&self, token: &str, id: &ProjectId) -> Result<(), ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    async fn change_password(&self, token: &str, change: &PasswordChange)
    -> Result<(), ApiError>;

    async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError>;
}

#[cfg(test)]
pub(crate) mod fake;
