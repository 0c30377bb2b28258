use thiserror::Error;

use crate::{
    client::{ApiError, Credentials, PasswordChange, PortfolioBackend},
    models::{session::StoredSession, user::User},
    storage::{SessionStorage, StorageError},
};

/// Minimum length accepted for a new password
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("{}", .0.user_message("Login failed"))]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in. Run `folio login` first")]
    NotSignedIn,
}

#[derive(Debug, Error, PartialEq)]
pub enum PasswordValidationError {
    #[error("All password fields are required")]
    MissingFields,

    #[error("New password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,

    #[error("New passwords do not match")]
    Mismatch,
}

#[derive(Debug, Error)]
pub enum ChangePasswordError {
    #[error(transparent)]
    Invalid(#[from] PasswordValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{}", .0.user_message("Password change failed"))]
    Api(#[from] ApiError),
}

pub struct ChangePasswordParameters {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Outcome of validating a stored token on startup
#[derive(Debug, PartialEq)]
pub enum RestoreOutcome {
    /// No token was stored
    SignedOut,
    /// The stored token was rejected and has been cleared
    Expired,
    SignedIn(User),
}

/// Explicit auth context owned by the application root. Commands that need a
/// token borrow it from here instead of reading shared storage themselves.
pub struct Session<S: SessionStorage> {
    storage: S,
    state: StoredSession,
}

impl<S: SessionStorage> Session<S> {
    /// Load whatever the storage holds without contacting the server
    pub fn open(storage: S) -> Result<Self, StorageError> {
        let state = storage.load()?;
        Ok(Self { storage, state })
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.is_signed_in()
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn token(&self) -> Result<&str, SessionError> {
        self.state
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::NotSignedIn)
    }

    pub async fn login(
        &mut self,
        backend: &impl PortfolioBackend,
        username: &str,
        password: &str,
    ) -> Result<User, LoginError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let credentials = Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let response = backend.login(&credentials).await.inspect_err(|e| {
            tracing::warn!(error = %e, username = %credentials.username, "login rejected");
        })?;

        let user = response.user.clone();
        let state = StoredSession::signed_in(response.token, response.user);
        self.storage.save(&state)?;
        self.state = state;

        tracing::info!(username = %credentials.username, "logged in");
        Ok(user)
    }

    /// Check the stored token against the server. Any rejection clears it,
    /// forcing a fresh login; there is no refresh.
    pub async fn restore(
        &mut self,
        backend: &impl PortfolioBackend,
    ) -> Result<RestoreOutcome, StorageError> {
        let Ok(token) = self.token() else {
            return Ok(RestoreOutcome::SignedOut);
        };

        let checked = backend.current_user(token).await;
        match checked {
            Ok(user) => {
                self.state.user = Some(user.clone());
                Ok(RestoreOutcome::SignedIn(user))
            }
            Err(e) => {
                tracing::info!(error = %e, "stored session rejected");
                self.logout()?;
                Ok(RestoreOutcome::Expired)
            }
        }
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.clear()?;
        self.state = StoredSession::default();
        Ok(())
    }

    pub async fn change_password(
        &self,
        backend: &impl PortfolioBackend,
        parameters: ChangePasswordParameters,
    ) -> Result<(), ChangePasswordError> {
        validate_password_change(&parameters)?;
        let token = self.token()?;

        let change = PasswordChange {
            current_password: parameters.current_password,
            new_password: parameters.new_password,
        };
        backend.change_password(token, &change).await?;

        tracing::info!("password changed");
        Ok(())
    }
}

pub fn validate_password_change(
    parameters: &ChangePasswordParameters,
) -> Result<(), PasswordValidationError> {
    if parameters.current_password.is_empty()
        || parameters.new_password.is_empty()
        || parameters.confirm_password.is_empty()
    {
        return Err(PasswordValidationError::MissingFields);
    }
    if parameters.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordValidationError::TooShort);
    }
    if parameters.new_password != parameters.confirm_password {
        return Err(PasswordValidationError::Mismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeBackend, VALID_TOKEN, admin};
    use crate::storage::json::JsonFileStorage;

    fn session_in(dir: &tempfile::TempDir) -> Session<JsonFileStorage> {
        Session::open(JsonFileStorage::new(dir.path().join("session.json"))).unwrap()
    }

    fn password_change(current: &str, new: &str, confirm: &str) -> ChangePasswordParameters {
        ChangePasswordParameters {
            current_password: current.to_string(),
            new_password: new.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_token_and_user() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        let mut session = session_in(&dir);

        let user = session.login(&backend, "admin", "hunter22").await.unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(session.token().unwrap(), VALID_TOKEN);

        let reopened = session_in(&dir);
        assert!(reopened.is_signed_in());
        assert_eq!(reopened.user(), Some(&admin()));
    }

    #[tokio::test]
    async fn test_wrong_credentials_persist_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        let mut session = session_in(&dir);

        let result = session.login(&backend, "admin", "wrong").await;

        match result {
            Err(e @ LoginError::Api(_)) => assert_eq!(e.to_string(), "Invalid credentials"),
            other => panic!("Expected Api error, got {other:?}"),
        }
        assert!(!session.is_signed_in());
        assert!(matches!(session.token(), Err(SessionError::NotSignedIn)));
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn test_blank_credentials_skip_the_request() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        let mut session = session_in(&dir);

        let result = session.login(&backend, "  ", "secret").await;

        assert!(matches!(result, Err(LoginError::MissingCredentials)));
        assert_eq!(backend.requests(), 0);
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("session.json"));
        storage
            .save(&StoredSession::signed_in(VALID_TOKEN.to_string(), admin()))
            .unwrap();
        let mut session = Session::open(storage).unwrap();

        let outcome = session.restore(&FakeBackend::default()).await.unwrap();

        assert_eq!(outcome, RestoreOutcome::SignedIn(admin()));
        assert!(session.is_signed_in());
    }

    #[tokio::test]
    async fn test_restore_clears_rejected_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = JsonFileStorage::new(path.clone());
        storage
            .save(&StoredSession::signed_in("expired".to_string(), admin()))
            .unwrap();
        let mut session = Session::open(storage).unwrap();

        let outcome = session.restore(&FakeBackend::default()).await.unwrap();

        assert_eq!(outcome, RestoreOutcome::Expired);
        assert!(!session.is_signed_in());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_restore_without_token_makes_no_request() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        let mut session = session_in(&dir);

        assert_eq!(session.restore(&backend).await.unwrap(), RestoreOutcome::SignedOut);
        assert_eq!(backend.requests(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        let mut session = session_in(&dir);
        session.login(&backend, "admin", "hunter22").await.unwrap();

        session.logout().unwrap();

        assert!(!session.is_signed_in());
        assert!(session.user().is_none());
        assert!(!session_in(&dir).is_signed_in());
    }

    #[test]
    fn test_password_validation() {
        assert_eq!(
            validate_password_change(&password_change("", "abcdef", "abcdef")),
            Err(PasswordValidationError::MissingFields)
        );
        assert_eq!(
            validate_password_change(&password_change("old", "abc", "abc")),
            Err(PasswordValidationError::TooShort)
        );
        assert_eq!(
            validate_password_change(&password_change("old", "abcdef", "abcdeg")),
            Err(PasswordValidationError::Mismatch)
        );
        assert_eq!(
            validate_password_change(&password_change("old", "abcdef", "abcdef")),
            Ok(())
        );
    }

    #[tokio::test]
    async fn test_change_password_sends_after_validation() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        let mut session = session_in(&dir);
        session.login(&backend, "admin", "hunter22").await.unwrap();

        let mismatch = session
            .change_password(&backend, password_change("hunter22", "newpass1", "newpass2"))
            .await;
        assert!(matches!(mismatch, Err(ChangePasswordError::Invalid(_))));
        assert!(backend.password_calls.lock().unwrap().is_empty());

        session
            .change_password(&backend, password_change("hunter22", "newpass1", "newpass1"))
            .await
            .unwrap();
        assert_eq!(backend.password_calls.lock().unwrap()[0].new_password, "newpass1");

        let wrong_current = session
            .change_password(&backend, password_change("nope", "newpass1", "newpass1"))
            .await;
        match wrong_current {
            Err(e) => assert_eq!(e.to_string(), "Current password is incorrect"),
            Ok(()) => panic!("Expected the server to reject the current password"),
        }
    }

    #[tokio::test]
    async fn test_change_password_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(&dir);

        let result = session
            .change_password(
                &FakeBackend::default(),
                password_change("hunter22", "newpass1", "newpass1"),
            )
            .await;

        assert!(matches!(
            result,
            Err(ChangePasswordError::Session(SessionError::NotSignedIn))
        ));
    }
}
