//! Feed assembly. Storage hands back posts unordered; ordering and viewer
//! context are decided here, not in the repositories.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::post::Post;

/// One feed entry; the full body stays behind the single-post view.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub author_handle: String,
    pub created_at: DateTime<Utc>,
}

/// The assembled global feed plus the viewer context for rendering. The feed
/// is public and never filtered by ownership.
#[derive(Debug)]
pub struct Feed {
    pub authenticated: bool,
    pub posts: Vec<PostSummary>,
}

/// Order posts newest first. The sort is stable, so posts sharing a
/// timestamp keep their incoming order.
pub fn assemble(mut posts: Vec<Post>, viewer: Option<Uuid>) -> Feed {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Feed {
        authenticated: viewer.is_some(),
        posts: posts
            .into_iter()
            .map(|p| PostSummary {
                id: p.id,
                title: p.title,
                description: p.description,
                author_handle: p.author_handle,
                created_at: p.created_at,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;
    use chrono::Duration;

    fn post_at(author: &User, title: &str, at: DateTime<Utc>) -> Post {
        let mut post = Post::new(author, title.into(), String::new(), "body".into());
        post.created_at = at;
        post
    }

    #[test]
    fn newest_posts_come_first() {
        let author = User::new("a@example.com".into(), "Ada".into(), "hash".into());
        let base = Utc::now();
        let posts = vec![
            post_at(&author, "old", base - Duration::hours(2)),
            post_at(&author, "new", base),
            post_at(&author, "middle", base - Duration::hours(1)),
        ];

        let feed = assemble(posts, None);

        let titles: Vec<&str> = feed.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["new", "middle", "old"]);
        for pair in feed.posts.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn timestamp_ties_keep_insertion_order() {
        let author = User::new("a@example.com".into(), "Ada".into(), "hash".into());
        let at = Utc::now();
        let first = post_at(&author, "first", at);
        let second = post_at(&author, "second", at);
        let ids = (first.id, second.id);

        let feed = assemble(vec![first, second], None);

        assert_eq!(feed.posts[0].id, ids.0);
        assert_eq!(feed.posts[1].id, ids.1);
    }

    #[test]
    fn viewer_context_is_attached() {
        let author = User::new("a@example.com".into(), "Ada".into(), "hash".into());
        let posts = vec![post_at(&author, "t", Utc::now())];

        assert!(assemble(posts.clone(), Some(author.id)).authenticated);
        assert!(!assemble(posts, None).authenticated);
    }

    #[test]
    fn feed_is_not_filtered_by_ownership() {
        let ada = User::new("a@example.com".into(), "Ada".into(), "hash".into());
        let eve = User::new("e@example.com".into(), "Eve".into(), "hash".into());
        let posts = vec![
            post_at(&ada, "ada's", Utc::now()),
            post_at(&eve, "eve's", Utc::now()),
        ];

        let feed = assemble(posts, Some(ada.id));
        assert_eq!(feed.posts.len(), 2);
    }
}
