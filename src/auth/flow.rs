use super::identity::{AuthSession, IdentityService};
use crate::error::AuthError;
use crate::validators::{self, Validator, run_validators};
use std::sync::Arc;
use tracing::{info, warn};

pub const EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const OTP_LENGTH_MESSAGE: &str = "Please enter all 6 digits.";
pub const OTP_DIGITS_MESSAGE: &str = "Code must contain only numbers.";
pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStage {
    Email,
    Otp { email: String },
}

/// Copy shown on the login card.
#[derive(Debug, Clone)]
pub struct AuthCopy {
    pub name: String,
    pub heading: String,
    pub subheading: String,
    pub otp_heading: String,
    pub otp_subheading: String,
}

impl Default for AuthCopy {
    fn default() -> Self {
        Self {
            name: "Swaddle".to_string(),
            heading: "The best way to track referrals.".to_string(),
            subheading: "Welcome, let's get started by entering your email below.".to_string(),
            otp_heading: "Keep an eye out for a verification code.".to_string(),
            otp_subheading: "Enter the 6-digit code we sent to verify your identity.".to_string(),
        }
    }
}

pub fn email_validators() -> Vec<Validator> {
    vec![validators::email(EMAIL_MESSAGE)]
}

pub fn otp_validators() -> Vec<Validator> {
    vec![
        validators::exact_length(OTP_LENGTH, OTP_LENGTH_MESSAGE),
        validators::digits_only(OTP_DIGITS_MESSAGE),
    ]
}

/// Two-stage email then one-time-passcode login.
pub struct AuthFlow {
    service: Arc<dyn IdentityService>,
    copy: AuthCopy,
    stage: AuthStage,
    error: Option<String>,
}

impl AuthFlow {
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        Self {
            service,
            copy: AuthCopy::default(),
            stage: AuthStage::Email,
            error: None,
        }
    }

    pub fn with_copy(mut self, copy: AuthCopy) -> Self {
        self.copy = copy;
        self
    }

    pub fn stage(&self) -> &AuthStage {
        &self.stage
    }

    pub fn copy(&self) -> &AuthCopy {
        &self.copy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_email(&self) -> Option<&str> {
        match &self.stage {
            AuthStage::Email => None,
            AuthStage::Otp { email } => Some(email),
        }
    }

    pub fn heading(&self) -> &str {
        match self.stage {
            AuthStage::Email => &self.copy.heading,
            AuthStage::Otp { .. } => &self.copy.otp_heading,
        }
    }

    pub fn subheading(&self) -> &str {
        match self.stage {
            AuthStage::Email => &self.copy.subheading,
            AuthStage::Otp { .. } => &self.copy.otp_subheading,
        }
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        self.error = Some(err.to_string());
        err
    }

    /// Validates the address, requests a code and moves to the OTP stage.
    pub async fn submit_email(&mut self, email: &str) -> Result<(), AuthError> {
        self.error = None;
        let email = email.trim();
        if let Err(message) = run_validators(&email_validators(), email) {
            return Err(self.fail(AuthError::InvalidInput(message)));
        }

        match self.service.request_code(email).await {
            Ok(()) => {
                info!(email, "verification code requested");
                self.stage = AuthStage::Otp {
                    email: email.to_string(),
                };
                Ok(())
            }
            Err(err) => {
                warn!(email, error = %err, "failed to send code");
                Err(self.fail(err))
            }
        }
    }

    pub async fn verify(&mut self, code: &str) -> Result<AuthSession, AuthError> {
        self.error = None;
        let Some(email) = self.pending_email().map(str::to_string) else {
            return Err(self.fail(AuthError::NoPendingCode));
        };
        let code = code.trim();
        if let Err(message) = run_validators(&otp_validators(), code) {
            return Err(self.fail(AuthError::InvalidInput(message)));
        }

        match self.service.verify_code(&email, code).await {
            Ok(session) => {
                info!(user_id = %session.user_id, "signed in");
                Ok(session)
            }
            Err(err) => {
                warn!(email = %email, error = %err, "code verification failed");
                Err(self.fail(err))
            }
        }
    }

    pub async fn resend(&mut self) -> Result<(), AuthError> {
        self.error = None;
        let Some(email) = self.pending_email().map(str::to_string) else {
            return Err(self.fail(AuthError::NoPendingCode));
        };
        self.service
            .request_code(&email)
            .await
            .map_err(|err| self.fail(err))
    }

    /// Returns to the email stage to use a different address.
    pub fn back(&mut self) {
        self.stage = AuthStage::Email;
        self.error = None;
    }

    pub async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        self.service.current_session().await
    }

    /// Ends the signed-in session and resets the card to the email stage.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        self.service.sign_out().await.map_err(|err| self.fail(err))?;
        info!("signed out");
        self.back();
        Ok(())
    }
}
