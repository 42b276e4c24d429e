use serde::Deserialize;
use uuid::Uuid;

/// Compose form; field names match the template inputs.
#[derive(Debug, Deserialize)]
pub struct ComposeForm {
    #[serde(rename = "postTitle")]
    pub post_title: String,
    /// Short summary shown in the feed.
    #[serde(rename = "postBody", default)]
    pub post_body: String,
    #[serde(rename = "postMarkdown")]
    pub post_markdown: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    /// Account identifier (email).
    pub username: String,
    pub userhandle: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(rename = "postId")]
    pub post_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: String,
    #[serde(default)]
    pub state: String,
}
