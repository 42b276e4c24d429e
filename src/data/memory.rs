//! In-memory repository fakes for service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::{User, remove_first_post};

#[derive(Default)]
pub struct MemoryPostRepository {
    pub posts: Mutex<Vec<Post>>,
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, post: &Post) -> Result<(), DomainError> {
        self.posts.lock().unwrap().push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        match posts.iter().position(|p| p.id == id) {
            Some(index) => Ok(Some(posts.remove(index))),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    pub users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::EmailTaken(user.email.clone()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn append_post(&self, user_id: Uuid, post: &Post) -> Result<(), DomainError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(DomainError::UserNotFound(user_id))?;
        user.posts.push(post.clone());
        Ok(())
    }

    async fn remove_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(DomainError::UserNotFound(user_id))?;
        remove_first_post(&mut user.posts, post_id);
        Ok(())
    }

    async fn replace_posts(&self, user_id: Uuid, posts: &[Post]) -> Result<(), DomainError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(DomainError::UserNotFound(user_id))?;
        user.posts = posts.to_vec();
        Ok(())
    }
}
