use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::{User, remove_first_post};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, DomainError>;
    /// Push a denormalized copy onto the user's post list.
    async fn append_post(&self, user_id: Uuid, post: &Post) -> Result<(), DomainError>;
    /// Remove the first cache entry with this id. A missing entry is drift,
    /// not an error.
    async fn remove_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError>;
    /// Rewrite the whole cache from the canonical store.
    async fn replace_posts(&self, user_id: Uuid, posts: &[Post]) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, DomainError> {
        let query = format!(
            "SELECT id, email, handle, password_hash, google_id, posts, created_at \
             FROM users WHERE {} = $1",
            column
        );
        sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to find user by {} {}: {}", column, value, e);
                DomainError::Internal(format!("database error: {}", e))
            })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, handle, password_hash, google_id, posts, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.handle)
        .bind(&user.password_hash)
        .bind(&user.google_id)
        .bind(Json(&user.posts))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create user: {}", e);
            if e.as_database_error()
                .and_then(|db| db.constraint())
                .map(|c| c.contains("users_email") || c.contains("users_google_id"))
                == Some(true)
            {
                DomainError::EmailTaken(user.email.clone())
            } else {
                DomainError::Internal(format!("database error: {}", e))
            }
        })?;

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, handle, password_hash, google_id, posts, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find user by id {}: {}", id, e);
            DomainError::Internal(format!("database error: {}", e))
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("email", email).await
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, DomainError> {
        self.find_one("google_id", google_id).await
    }

    async fn append_post(&self, user_id: Uuid, post: &Post) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET posts = posts || $2 WHERE id = $1")
            .bind(user_id)
            .bind(Json(post))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to append post for user {}: {}", user_id, e);
                DomainError::Internal(format!("database error: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user_id));
        }

        info!(user_id = %user_id, post_id = %post.id, "post appended to owner list");
        Ok(())
    }

    async fn remove_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let mut posts = user.posts;
        if !remove_first_post(&mut posts, post_id) {
            warn!(user_id = %user_id, post_id = %post_id, "post missing from owner list");
            return Ok(());
        }

        self.replace_posts(user_id, &posts).await?;
        info!(user_id = %user_id, post_id = %post_id, "post removed from owner list");
        Ok(())
    }

    async fn replace_posts(&self, user_id: Uuid, posts: &[Post]) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET posts = $2 WHERE id = $1")
            .bind(user_id)
            .bind(Json(posts))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to rewrite post list for user {}: {}", user_id, e);
                DomainError::Internal(format!("database error: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user_id));
        }

        Ok(())
    }
}
