use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::User;
use crate::infrastructure::google::GoogleProfile;
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

/// Registration and session issuance. Credential material is handled by
/// `infrastructure::security`; this service owns the account fields only.
#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self, password, handle))]
    pub async fn register(
        &self,
        email: String,
        handle: String,
        password: String,
    ) -> Result<(User, String), DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "email and password are required".into(),
            ));
        }

        let hash = hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(email.to_lowercase(), handle, hash);
        self.repo.create(&user).await?;

        let token = self
            .keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok((user, token))
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .repo
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let hash = user.password_hash.as_deref().ok_or(DomainError::Unauthorized)?;
        let valid = verify_password(password, hash).map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }

    /// Find-or-create for federated sign-in; the identity provider already
    /// verified the account.
    #[instrument(skip(self, profile))]
    pub async fn login_google(&self, profile: GoogleProfile) -> Result<String, DomainError> {
        let user = match self.repo.find_by_google_id(&profile.sub).await? {
            Some(user) => user,
            None => {
                let handle = if profile.name.trim().is_empty() {
                    profile.email.clone()
                } else {
                    profile.name.clone()
                };
                let user = User::from_google(profile.email.to_lowercase(), handle, profile.sub);
                self.repo.create(&user).await?;
                user
            }
        };

        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryUserRepository;

    fn service() -> AuthService<MemoryUserRepository> {
        AuthService::new(
            Arc::new(MemoryUserRepository::default()),
            JwtKeys::new("test-secret".into()),
        )
    }

    #[tokio::test]
    async fn register_normalizes_account_and_handle() {
        let service = service();
        let (user, token) = service
            .register(
                "Ada@Example.com".into(),
                "  Ada   Lovelace ".into(),
                "pw".into(),
            )
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.handle, "Ada Lovelace");

        let claims = service.keys().verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let service = service();
        service
            .register("ada@example.com".into(), "Ada".into(), "pw".into())
            .await
            .unwrap();

        let result = service
            .register("ada@example.com".into(), "Other".into(), "pw".into())
            .await;
        assert!(matches!(result, Err(DomainError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn login_verifies_credentials() {
        let service = service();
        service
            .register("ada@example.com".into(), "Ada".into(), "correct".into())
            .await
            .unwrap();

        assert!(service.login("ada@example.com", "correct").await.is_ok());
        assert!(matches!(
            service.login("ada@example.com", "wrong").await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            service.login("nobody@example.com", "correct").await,
            Err(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn google_sign_in_creates_once_then_reuses() {
        let service = service();
        let profile = GoogleProfile {
            sub: "google-sub-1".into(),
            email: "ada@example.com".into(),
            name: "Ada Lovelace".into(),
        };

        let first = service.login_google(profile.clone()).await.unwrap();
        let second = service.login_google(profile).await.unwrap();

        let first_sub = service.keys().verify_token(&first).unwrap().sub;
        let second_sub = service.keys().verify_token(&second).unwrap().sub;
        assert_eq!(first_sub, second_sub);
    }
}
