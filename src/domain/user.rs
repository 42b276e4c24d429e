use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::post::Post;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    /// Account identifier used to log in.
    pub email: String,
    /// Display name, whitespace-normalized.
    pub handle: String,
    /// Argon2 PHC string; absent for accounts created via federated sign-in.
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    /// Denormalized cache of owned posts in creation order. The post table
    /// is canonical; this list is advisory and repaired on read.
    #[sqlx(json)]
    pub posts: Vec<Post>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, handle: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            handle: normalize_handle(&handle),
            password_hash: Some(password_hash),
            google_id: None,
            posts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn from_google(email: String, handle: String, google_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            handle: normalize_handle(&handle),
            password_hash: None,
            google_id: Some(google_id),
            posts: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Collapse whitespace runs in a display handle to single spaces.
pub fn normalize_handle(handle: &str) -> String {
    handle.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove the first entry with `post_id` from a denormalized post list.
/// The list is expected to hold at most one entry per id; duplicates beyond
/// the first are left alone. Returns whether an entry was removed.
pub fn remove_first_post(posts: &mut Vec<Post>, post_id: Uuid) -> bool {
    match posts.iter().position(|p| p.id == post_id) {
        Some(index) => {
            posts.remove(index);
            true
        }
        None => false,
    }
}
