mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer, web};

use crate::application::auth_service::AuthService;
use crate::application::post_service::PostService;
use crate::data::post_repository::PostgresPostRepository;
use crate::data::user_repository::PostgresUserRepository;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::{create_pool, run_migrations};
use crate::infrastructure::google::GoogleOAuth;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::RequestTrace;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));

    let keys = JwtKeys::new(config.session_secret.clone());
    let auth_service = AuthService::new(Arc::clone(&user_repo), keys.clone());
    let post_service = PostService::new(post_repo, user_repo);
    let google = config
        .google
        .clone()
        .map(|g| GoogleOAuth::new(g.client_id, g.client_secret, g.redirect_url));

    let bind = (config.host.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    // posts embed user-derived HTML; the sanitizer is the
                    // first line of defense and this header the second
                    .add((
                        "Content-Security-Policy",
                        "default-src 'self'; style-src 'self' 'unsafe-inline'; \
                         img-src https: data:; script-src 'none'; form-action 'self'",
                    )),
            )
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(keys.clone()))
            .app_data(web::Data::new(google.clone()))
            .configure(handlers::auth::configure)
            .configure(handlers::post::configure)
            .route("/health", web::get().to(handlers::health))
    })
    .bind(bind)?
    .run()
    .await?;

    // drain connections before exit
    pool.close().await;
    Ok(())
}
