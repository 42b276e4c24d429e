use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use maud::html;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("account already registered: {0}")]
    EmailTaken(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::UserNotFound(_) | DomainError::PostNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::EmailTaken(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            DomainError::Unauthorized => "Please log in to continue.".to_string(),
            DomainError::Forbidden => "You do not have permission to manage this post.".to_string(),
            // internal details stay in the logs
            DomainError::Internal(_) => "There was an error. Please try again.".to_string(),
            other => other.to_string(),
        };
        let body = html! {
            (maud::DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (status.as_u16()) }
                }
                body {
                    main {
                        h1 { (status.as_u16()) " " (status.canonical_reason().unwrap_or("")) }
                        p { (message) }
                        p { a href="/home" { "Back to the feed" } }
                    }
                }
            }
        };
        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body.into_string())
    }
}
