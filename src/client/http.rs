//! reqwest implementation of [`PortfolioBackend`].

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::{
    client::{ApiError, ContactMessage, Credentials, ErrorBody, PasswordChange, PortfolioBackend},
    models::{
        project::{Project, ProjectForm, ProjectId},
        upload::ImageUpload,
        user::{LoginResponse, User},
    },
};

/// HTTP client for one portfolio backend
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    api_url: String,
}

impl HttpBackend {
    /// `api_url` is the API root, e.g. `https://api.example.dev/api`
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    pub fn with_client(client: Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.bearer_auth(token)
    }

    fn project_form(form: &ProjectForm, image: Option<&ImageUpload>) -> Result<Form, ApiError> {
        let mut multipart = Form::new();
        for (name, value) in form.fields() {
            multipart = multipart.text(name, value);
        }
        if let Some(image) = image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)?;
            multipart = multipart.part("image", part);
        }
        Ok(multipart)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        tracing::debug!(status = status.as_u16(), ?message, "api request rejected");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(request).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl PortfolioBackend for HttpBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        tracing::debug!("fetching projects");
        Self::send_json(self.client.get(self.url("/projects"))).await
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Project, ApiError> {
        Self::send_json(self.client.get(self.url(&format!("/projects/slug/{slug}")))).await
    }

    async fn create_project(
        &self,
        token: &str,
        form: &ProjectForm,
        image: Option<&ImageUpload>,
    ) -> Result<Project, ApiError> {
        let multipart = Self::project_form(form, image)?;
        let request = self
            .authorized(self.client.post(self.url("/projects")), token)
            .multipart(multipart);
        Self::send_json(request).await
    }

    async fn update_project(
        &self,
        token: &str,
        id: &ProjectId,
        form: &ProjectForm,
        image: Option<&ImageUpload>,
    ) -> Result<Project, ApiError> {
        let multipart = Self::project_form(form, image)?;
        let request = self
            .authorized(self.client.put(self.url(&format!("/projects/{id}"))), token)
            .multipart(multipart);
        Self::send_json(request).await
    }

    async fn delete_project(&self, token: &str, id: &ProjectId) -> Result<(), ApiError> {
        let request = self.authorized(self.client.delete(self.url(&format!("/projects/{id}"))), token);
        Self::send(request).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        Self::send_json(self.client.post(self.url("/auth/login")).json(credentials)).await
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        Self::send_json(self.authorized(self.client.get(self.url("/auth/me")), token)).await
    }

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), ApiError> {
        let request = self
            .authorized(self.client.put(self.url("/auth/change-password")), token)
            .json(change);
        Self::send(request).await?;
        Ok(())
    }

    async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        Self::send(self.client.post(self.url("/contact")).json(message)).await?;
        Ok(())
    }
}
