//! Cookie-backed sessions. The cookie holds a signed token whose subject is
//! the user id; extractors below recover the viewer from it.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;

pub const SESSION_COOKIE: &str = "session";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(24))
        .finish()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Short-lived CSRF state for the federated sign-in round trip.
pub fn state_cookie(state: String) -> Cookie<'static> {
    Cookie::build(OAUTH_STATE_COOKIE, state)
        .path("/auth/google")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(10))
        .finish()
}

pub fn clear_state_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, "");
    cookie.set_path("/auth/google");
    cookie.make_removal();
    cookie
}

/// The authenticated viewer. Extraction fails with 401 when the session
/// cookie is missing, expired, or signed with a different key.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser {
    pub id: Uuid,
}

fn session_user(req: &HttpRequest) -> Option<SessionUser> {
    let keys = req.app_data::<web::Data<JwtKeys>>()?;
    let cookie = req.cookie(SESSION_COOKIE)?;
    let claims = keys.verify_token(cookie.value()).ok()?;
    let id = Uuid::parse_str(&claims.sub).ok()?;
    Some(SessionUser { id })
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match session_user(req) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(DomainError::Unauthorized.into())),
        }
    }
}

/// Optional viewer; never fails. Requests without a valid session are
/// visitors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewer(pub Option<SessionUser>);

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        self.0.map(|user| user.id)
    }

    pub fn authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequest for Viewer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Viewer(session_user(req))))
    }
}
