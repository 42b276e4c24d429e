pub mod auth_service;
pub mod feed;
pub mod post_service;
