use crate::error::AuthError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    /// True when the account was created by this sign-in.
    pub new_user: bool,
}

/// External identity backend that delivers and checks one-time passcodes.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Sends a code to `email`, creating the account if it does not exist.
    async fn request_code(&self, email: &str) -> Result<(), AuthError>;

    async fn verify_code(&self, email: &str, code: &str) -> Result<AuthSession, AuthError>;

    /// The signed-in session, if any.
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}
