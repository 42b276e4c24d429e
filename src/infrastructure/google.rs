//! Google OAuth collaborator. The protocol details live here; the rest of
//! the system only sees [`GoogleProfile`].

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::warn;

use crate::domain::error::DomainError;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// The verified identity handed back after the code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct GoogleOAuth {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleOAuth {
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            http: Client::new(),
            client_id,
            client_secret,
            redirect_url,
        }
    }

    /// Consent-screen URL the browser is redirected to. `state` is echoed
    /// back on the callback and verified against the state cookie.
    pub fn authorize_url(&self, state: &str) -> String {
        let url = Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("scope", "openid email profile"),
                ("state", state),
            ],
        )
        .expect("static endpoint URL");
        url.into()
    }

    /// Exchange the authorization code for tokens and fetch the profile.
    pub async fn exchange(&self, code: &str) -> Result<GoogleProfile, DomainError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "identity provider rejected the authorization code");
            return Err(DomainError::Unauthorized);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Internal(format!("malformed token response: {}", e)))?;

        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "userinfo request was refused");
            return Err(DomainError::Unauthorized);
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::Internal(format!("malformed userinfo response: {}", e)))
    }
}
