use super::identity::{AuthSession, IdentityService};
use crate::error::AuthError;
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::info;

const CODE_TTL: Duration = Duration::from_secs(10 * 60);
const RESEND_INTERVAL: Duration = Duration::from_secs(30);

struct PendingCode {
    code: String,
    issued_at: Instant,
}

#[derive(Default)]
struct Directory {
    users: HashMap<String, String>,
    pending: HashMap<String, PendingCode>,
    active: Option<AuthSession>,
}

/// In-process identity backend for local runs and tests. Codes are logged, not mailed.
pub struct InMemoryIdentity {
    directory: Mutex<Directory>,
    fixed_code: Option<String>,
    resend_interval: Duration,
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self {
            directory: Mutex::new(Directory::default()),
            fixed_code: None,
            resend_interval: RESEND_INTERVAL,
        }
    }

    /// Issues `code` for every request instead of a random one.
    pub fn with_fixed_code(mut self, code: impl Into<String>) -> Self {
        self.fixed_code = Some(code.into());
        self
    }

    pub fn with_resend_interval(mut self, interval: Duration) -> Self {
        self.resend_interval = interval;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The code currently pending for `email`.
    pub fn issued_code(&self, email: &str) -> Option<String> {
        self.lock()
            .pending
            .get(&normalize(email))
            .map(|pending| pending.code.clone())
    }

    pub fn has_user(&self, email: &str) -> bool {
        self.lock().users.contains_key(&normalize(email))
    }

    fn generate_code(&self) -> String {
        match &self.fixed_code {
            Some(code) => code.clone(),
            None => format!("{:06}", rand::thread_rng().gen_range(0..1_000_000)),
        }
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityService for InMemoryIdentity {
    async fn request_code(&self, email: &str) -> Result<(), AuthError> {
        let key = normalize(email);
        let code = self.generate_code();
        {
            let mut directory = self.lock();
            if let Some(pending) = directory.pending.get(&key) {
                if pending.issued_at.elapsed() < self.resend_interval {
                    return Err(AuthError::RateLimited);
                }
            }
            directory.pending.insert(
                key.clone(),
                PendingCode {
                    code: code.clone(),
                    issued_at: Instant::now(),
                },
            );
        }
        info!(email = %key, code = %code, "verification code issued");
        Ok(())
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<AuthSession, AuthError> {
        let key = normalize(email);
        let mut directory = self.lock();
        let Some(pending) = directory.pending.get(&key) else {
            return Err(AuthError::NoPendingCode);
        };
        if pending.issued_at.elapsed() > CODE_TTL || pending.code != code {
            return Err(AuthError::InvalidCode);
        }
        directory.pending.remove(&key);

        let next_id = directory.users.len() + 1;
        let mut new_user = false;
        let user_id = directory
            .users
            .entry(key.clone())
            .or_insert_with(|| {
                new_user = true;
                format!("user-{next_id}")
            })
            .clone();
        info!(email = %key, user_id = %user_id, new_user, "sign-in verified");

        let session = AuthSession {
            user_id,
            email: key,
            new_user,
        };
        directory.active = Some(session.clone());
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.lock().active.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.lock().active.take().ok_or(AuthError::NotSignedIn)?;
        info!(user_id = %session.user_id, "signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issues_and_verifies_codes() {
        let identity = InMemoryIdentity::new();
        identity.request_code("Ada@Example.com ").await.expect("request");
        let code = identity.issued_code("ada@example.com").expect("code");
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let session = identity
            .verify_code("ada@example.com", &code)
            .await
            .expect("verify");
        assert_eq!(session.email, "ada@example.com");
        assert!(session.new_user);
        assert!(identity.has_user("ada@example.com"));
        assert!(identity.issued_code("ada@example.com").is_none());
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_and_stays_pending() {
        let identity = InMemoryIdentity::new().with_fixed_code("123456");
        identity.request_code("ada@example.com").await.expect("request");
        assert_eq!(
            identity.verify_code("ada@example.com", "000000").await,
            Err(AuthError::InvalidCode)
        );
        assert!(identity.issued_code("ada@example.com").is_some());
    }

    #[tokio::test]
    async fn returning_user_keeps_id() {
        let identity = InMemoryIdentity::new()
            .with_fixed_code("111111")
            .with_resend_interval(Duration::ZERO);
        identity.request_code("ada@example.com").await.expect("request");
        let first = identity
            .verify_code("ada@example.com", "111111")
            .await
            .expect("verify");
        identity.request_code("ada@example.com").await.expect("request");
        let second = identity
            .verify_code("ada@example.com", "111111")
            .await
            .expect("verify");
        assert_eq!(first.user_id, second.user_id);
        assert!(!second.new_user);
    }

    #[tokio::test]
    async fn rapid_resend_is_rate_limited() {
        let identity = InMemoryIdentity::new();
        identity.request_code("ada@example.com").await.expect("request");
        assert_eq!(
            identity.request_code("ada@example.com").await,
            Err(AuthError::RateLimited)
        );
    }

    #[tokio::test]
    async fn sign_out_ends_the_session() {
        let identity = InMemoryIdentity::new().with_fixed_code("123456");
        assert_eq!(identity.current_session().await, Ok(None));

        identity.request_code("ada@example.com").await.expect("request");
        let session = identity
            .verify_code("ada@example.com", "123456")
            .await
            .expect("verify");
        assert_eq!(identity.current_session().await, Ok(Some(session)));

        identity.sign_out().await.expect("sign out");
        assert_eq!(identity.current_session().await, Ok(None));
        assert_eq!(identity.sign_out().await, Err(AuthError::NotSignedIn));
        assert!(identity.has_user("ada@example.com"));
    }

    #[tokio::test]
    async fn verify_without_request_fails() {
        let identity = InMemoryIdentity::new();
        assert_eq!(
            identity.verify_code("ada@example.com", "123456").await,
            Err(AuthError::NoPendingCode)
        );
    }
}
