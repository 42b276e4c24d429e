use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::sanitize::sanitize;
use crate::domain::user::User;

/// A published post. The canonical record lives in the post table; the
/// author's user row carries a denormalized copy.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    /// Short summary shown in the feed.
    pub description: String,
    /// Raw user-submitted markdown, kept as the source of truth for the
    /// rendered form.
    pub markdown: String,
    /// Derived from `markdown` at construction time, never set directly.
    pub sanitized_html: String,
    pub author_handle: String,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author: &User, title: String, description: String, markdown: String) -> Self {
        let sanitized_html = sanitize(&markdown);
        Self {
            id: Uuid::new_v4(),
            author_id: author.id,
            title,
            description,
            markdown,
            sanitized_html,
            author_handle: author.handle.clone(),
            author_email: author.email.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_derives_sanitized_html() {
        let author = User::new("a@example.com".into(), "Ada".into(), "hash".into());
        let post = Post::new(
            &author,
            "Hello".into(),
            String::new(),
            "# Hello <script>alert(1)</script>".into(),
        );

        assert_eq!(post.author_id, author.id);
        assert_eq!(post.author_handle, "Ada");
        assert!(post.sanitized_html.contains("<h1>"));
        assert!(!post.sanitized_html.contains("<script"));
    }
}
