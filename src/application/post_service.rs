use std::sync::Arc;

use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::post::Post;
use crate::domain::user::User;

/// Owns the post lifecycle: every write path derives the sanitized form and
/// keeps the author's denormalized list in step with the canonical table.
#[derive(Clone)]
pub struct PostService<P: PostRepository + 'static, U: UserRepository + 'static> {
    posts: Arc<P>,
    users: Arc<U>,
}

impl<P, U> PostService<P, U>
where
    P: PostRepository + 'static,
    U: UserRepository + 'static,
{
    pub fn new(posts: Arc<P>, users: Arc<U>) -> Self {
        Self { posts, users }
    }

    #[instrument(skip(self, author, title, description, markdown))]
    pub async fn compose(
        &self,
        author: &User,
        title: String,
        description: String,
        markdown: String,
    ) -> Result<Post, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::Validation("title is required".into()));
        }
        if markdown.trim().is_empty() {
            return Err(DomainError::Validation("post body is required".into()));
        }

        let post = Post::new(author, title, description, markdown);
        if post.sanitized_html.trim().is_empty() {
            // non-empty markdown must never sanitize to nothing
            error!(
                author_id = %author.id,
                "sanitizer produced empty output for non-empty markdown"
            );
            return Err(DomainError::Validation(
                "post body could not be rendered".into(),
            ));
        }

        self.posts.create(&post).await?;

        // second, non-transactional write; the canonical row already exists,
        // so a failure here leaves an orphan the profile read will repair
        if let Err(e) = self.users.append_post(author.id, &post).await {
            error!(
                post_id = %post.id,
                author_id = %author.id,
                "failed to append post to owner list: {}", e
            );
            return Err(e);
        }

        Ok(post)
    }

    pub async fn post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn all_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.posts.list_all().await
    }

    /// Delete a post on behalf of `viewer_id`. Authorization is re-derived
    /// here from the stored author, never from anything client-supplied.
    #[instrument(skip(self))]
    pub async fn delete(&self, viewer_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let post = self.post(post_id).await?;
        if !policy::can_manage(Some(viewer_id), &post) {
            warn!(viewer_id = %viewer_id, post_id = %post_id, "delete refused for non-owner");
            return Err(DomainError::Forbidden);
        }

        let deleted = self
            .posts
            .delete(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;

        // canonical row is gone; now reconcile the owner's list
        self.users.remove_post(deleted.author_id, deleted.id).await?;
        Ok(())
    }

    /// Canonical posts for `user` in creation order, repairing the embedded
    /// cache when it has drifted from the post table.
    pub async fn owned_posts(&self, user: &User) -> Result<Vec<Post>, DomainError> {
        let canonical = self.posts.list_by_author(user.id).await?;

        let cached: Vec<Uuid> = user.posts.iter().map(|p| p.id).collect();
        let actual: Vec<Uuid> = canonical.iter().map(|p| p.id).collect();
        if cached != actual {
            warn!(
                user_id = %user.id,
                cached = cached.len(),
                canonical = actual.len(),
                "owner post list drifted, rewriting from canonical store"
            );
            self.users.replace_posts(user.id, &canonical).await?;
        }

        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{MemoryPostRepository, MemoryUserRepository};

    async fn service_with_author() -> (
        PostService<MemoryPostRepository, MemoryUserRepository>,
        Arc<MemoryUserRepository>,
        User,
    ) {
        let posts = Arc::new(MemoryPostRepository::default());
        let users = Arc::new(MemoryUserRepository::default());
        let author = User::new("ada@example.com".into(), "Ada".into(), "hash".into());
        users.create(&author).await.unwrap();
        (PostService::new(posts, Arc::clone(&users)), users, author)
    }

    #[tokio::test]
    async fn compose_rejects_blank_title() {
        let (service, _, author) = service_with_author().await;
        let result = service
            .compose(&author, "   ".into(), String::new(), "body".into())
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn compose_rejects_blank_body() {
        let (service, _, author) = service_with_author().await;
        let result = service
            .compose(&author, "Title".into(), String::new(), " \n ".into())
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn compose_persists_and_appends_to_owner_list() {
        let (service, users, author) = service_with_author().await;
        let post = service
            .compose(
                &author,
                "Hello".into(),
                "summary".into(),
                "# Hello".into(),
            )
            .await
            .unwrap();

        assert!(post.sanitized_html.contains("<h1>"));

        let fetched = service.post(post.id).await.unwrap();
        assert_eq!(fetched.title, "Hello");

        let owner = users.find_by_id(author.id).await.unwrap().unwrap();
        assert_eq!(owner.posts.len(), 1);
        assert_eq!(owner.posts[0].id, post.id);
    }

    #[tokio::test]
    async fn compose_strips_script_payloads() {
        let (service, _, author) = service_with_author().await;
        let post = service
            .compose(
                &author,
                "Hello".into(),
                String::new(),
                "# Hello <script>alert(1)</script>".into(),
            )
            .await
            .unwrap();

        assert!(post.sanitized_html.contains("Hello"));
        assert!(!post.sanitized_html.contains("<script"));
        assert!(!post.sanitized_html.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_canonical_and_cached_copies() {
        let (service, users, author) = service_with_author().await;
        let post = service
            .compose(&author, "T".into(), String::new(), "body".into())
            .await
            .unwrap();

        service.delete(author.id, post.id).await.unwrap();

        assert!(matches!(
            service.post(post.id).await,
            Err(DomainError::PostNotFound(_))
        ));
        let owner = users.find_by_id(author.id).await.unwrap().unwrap();
        assert!(owner.posts.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_post_is_not_found() {
        let (service, _, author) = service_with_author().await;
        let result = service.delete(author.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden() {
        let (service, users, author) = service_with_author().await;
        let post = service
            .compose(&author, "T".into(), String::new(), "body".into())
            .await
            .unwrap();

        let intruder = User::new("eve@example.com".into(), "Eve".into(), "hash".into());
        users.create(&intruder).await.unwrap();

        let result = service.delete(intruder.id, post.id).await;
        assert!(matches!(result, Err(DomainError::Forbidden)));
        // the post survives the refused attempt
        assert!(service.post(post.id).await.is_ok());
    }

    #[tokio::test]
    async fn owned_posts_repairs_drifted_cache() {
        let (service, users, author) = service_with_author().await;
        let first = service
            .compose(&author, "First".into(), String::new(), "one".into())
            .await
            .unwrap();
        let second = service
            .compose(&author, "Second".into(), String::new(), "two".into())
            .await
            .unwrap();

        // simulate a crash between the canonical delete and the cache write
        service.posts.delete(first.id).await.unwrap();

        let stale = users.find_by_id(author.id).await.unwrap().unwrap();
        assert_eq!(stale.posts.len(), 2);

        let owned = service.owned_posts(&stale).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, second.id);

        let repaired = users.find_by_id(author.id).await.unwrap().unwrap();
        assert_eq!(repaired.posts.len(), 1);
        assert_eq!(repaired.posts[0].id, second.id);
    }
}
