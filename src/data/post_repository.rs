use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    /// Unordered at the storage layer; callers impose their own ordering.
    async fn list_all(&self) -> Result<Vec<Post>, DomainError>;
    /// Canonical posts for one author, oldest first.
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError>;
    /// Remove the canonical record, returning it so the caller can reconcile
    /// the author's denormalized list.
    async fn delete(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: &Post) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts
                (id, author_id, title, description, markdown, sanitized_html,
                 author_handle, author_email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.markdown)
        .bind(&post.sanitized_html)
        .bind(&post.author_handle)
        .bind(&post.author_email)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, description, markdown, sanitized_html,
                   author_handle, author_email, created_at
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn list_all(&self) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, description, markdown, sanitized_html,
                   author_handle, author_email, created_at
            FROM posts
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching posts: {}", e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, description, markdown, sanitized_html,
                   author_handle, author_email, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching posts for {}: {}", author_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let deleted = sqlx::query_as::<_, Post>(
            r#"
            DELETE FROM posts WHERE id = $1
            RETURNING id, author_id, title, description, markdown, sanitized_html,
                      author_handle, author_email, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to delete post {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })?;

        if deleted.is_some() {
            info!(post_id = %id, "post deleted");
        }

        Ok(deleted)
    }
}
