use thiserror::Error;

use crate::client::{ApiError, ContactMessage, PortfolioBackend};

#[derive(Debug, Error)]
pub enum SendContactError {
    #[error("Please fill in all required fields.")]
    MissingRequiredFields,

    #[error("{}", .0.user_message("Failed to send message. Please try again."))]
    Api(#[from] ApiError),
}

pub struct SendContactParameters {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub recaptcha_token: Option<String>,
}

pub async fn send_contact(
    backend: &impl PortfolioBackend,
    parameters: SendContactParameters,
) -> Result<(), SendContactError> {
    if parameters.name.trim().is_empty()
        || parameters.email.trim().is_empty()
        || parameters.message.trim().is_empty()
    {
        return Err(SendContactError::MissingRequiredFields);
    }

    let message = ContactMessage {
        name: parameters.name.trim().to_string(),
        email: parameters.email.trim().to_string(),
        subject: parameters.subject,
        message: parameters.message,
        recaptcha_token: parameters.recaptcha_token,
    };
    backend.send_contact(&message).await?;

    tracing::info!(email = %message.email, "contact message sent");
    Ok(())
}
