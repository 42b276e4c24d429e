use uuid::Uuid;

use crate::domain::post::Post;

/// Whether `viewer` may manage (delete) `post`. Only the author may; an
/// unauthenticated viewer is always a visitor. Visitors can still read any
/// post, this only gates the management affordances.
pub fn can_manage(viewer: Option<Uuid>, post: &Post) -> bool {
    viewer.is_some_and(|id| id == post.author_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;

    fn post() -> Post {
        let author = User::new(
            "author@example.com".into(),
            "Author".into(),
            "hash".into(),
        );
        Post::new(&author, "Title".into(), String::new(), "body".into())
    }

    #[test]
    fn author_can_manage() {
        let post = post();
        assert!(can_manage(Some(post.author_id), &post));
    }

    #[test]
    fn other_user_cannot_manage() {
        let post = post();
        assert!(!can_manage(Some(Uuid::new_v4()), &post));
    }

    #[test]
    fn anonymous_viewer_cannot_manage() {
        let post = post();
        assert!(!can_manage(None, &post));
    }
}
