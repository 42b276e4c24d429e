use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::google::GoogleOAuth;
use crate::presentation::dto::{OAuthCallback, SigninForm, SignupForm};
use crate::presentation::pages;
use crate::presentation::session::{
    OAUTH_STATE_COOKIE, Viewer, clear_session_cookie, clear_state_cookie, session_cookie,
    state_cookie,
};

type Auth = web::Data<AuthService<PostgresUserRepository>>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(login_page)
        .service(signup_page)
        .service(signup)
        .service(signin)
        .service(logout)
        .service(google)
        .service(google_callback);
}

fn signed_in(token: String, location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .cookie(session_cookie(token))
        .insert_header((header::LOCATION, location))
        .finish()
}

#[get("/")]
async fn index(viewer: Viewer) -> HttpResponse {
    pages::html(pages::login(viewer.authenticated(), None))
}

#[get("/login")]
async fn login_page(viewer: Viewer) -> HttpResponse {
    pages::html(pages::login(viewer.authenticated(), None))
}

#[get("/signup1")]
async fn signup_page() -> HttpResponse {
    pages::html(pages::signup(None))
}

#[post("/signup")]
async fn signup(auth: Auth, form: web::Form<SignupForm>) -> Result<HttpResponse, DomainError> {
    let form = form.into_inner();
    match auth
        .register(form.username, form.userhandle, form.password)
        .await
    {
        Ok((user, token)) => {
            info!(user_id = %user.id, email = %user.email, "user registered");
            Ok(signed_in(token, "/home"))
        }
        Err(DomainError::EmailTaken(_)) => Ok(pages::html_with(
            StatusCode::CONFLICT,
            pages::signup(Some("That account is already registered.")),
        )),
        Err(e) => Err(e),
    }
}

#[post("/signin")]
async fn signin(auth: Auth, form: web::Form<SigninForm>) -> Result<HttpResponse, DomainError> {
    match auth.login(&form.username, &form.password).await {
        Ok(token) => {
            info!(email = %form.username, "user logged in");
            Ok(signed_in(token, "/home"))
        }
        Err(DomainError::Unauthorized) => Ok(pages::html_with(
            StatusCode::UNAUTHORIZED,
            pages::login(false, Some("Incorrect email or password.")),
        )),
        Err(e) => Err(e),
    }
}

#[get("/logout")]
async fn logout() -> HttpResponse {
    HttpResponse::SeeOther()
        .cookie(clear_session_cookie())
        .insert_header((header::LOCATION, "/"))
        .finish()
}

#[get("/auth/google")]
async fn google(oauth: web::Data<Option<GoogleOAuth>>) -> Result<HttpResponse, DomainError> {
    let Some(oauth) = oauth.get_ref() else {
        return Err(DomainError::Internal(
            "federated sign-in is not configured".into(),
        ));
    };

    let state = Uuid::new_v4().to_string();
    let url = oauth.authorize_url(&state);
    Ok(HttpResponse::SeeOther()
        .cookie(state_cookie(state))
        .insert_header((header::LOCATION, url))
        .finish())
}

#[get("/auth/google/callback")]
async fn google_callback(
    req: HttpRequest,
    query: web::Query<OAuthCallback>,
    oauth: web::Data<Option<GoogleOAuth>>,
    auth: Auth,
) -> Result<HttpResponse, DomainError> {
    let Some(oauth) = oauth.get_ref() else {
        return Err(DomainError::Internal(
            "federated sign-in is not configured".into(),
        ));
    };

    let expected = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    if expected.as_deref() != Some(query.state.as_str()) {
        warn!("oauth state mismatch");
        return Err(DomainError::Unauthorized);
    }

    let profile = oauth.exchange(&query.code).await?;
    let token = auth.login_google(profile).await?;

    Ok(HttpResponse::SeeOther()
        .cookie(session_cookie(token))
        .cookie(clear_state_cookie())
        .insert_header((header::LOCATION, "/"))
        .finish())
}
