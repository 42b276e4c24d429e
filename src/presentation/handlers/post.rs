use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::application::feed;
use crate::application::post_service::PostService;
use crate::data::post_repository::PostgresPostRepository;
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::presentation::dto::{ComposeForm, DeleteForm};
use crate::presentation::handlers::{request_id, see_other};
use crate::presentation::pages;
use crate::presentation::session::{SessionUser, Viewer};

type Posts = web::Data<PostService<PostgresPostRepository, PostgresUserRepository>>;
type Auth = web::Data<AuthService<PostgresUserRepository>>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(compose_form)
        .service(compose)
        .service(profile)
        .service(post_view)
        .service(delete);
}

#[get("/home")]
async fn home(viewer: Viewer, posts: Posts) -> Result<HttpResponse, DomainError> {
    let feed = feed::assemble(posts.all_posts().await?, viewer.id());
    Ok(pages::html(pages::home(&feed)))
}

#[get("/compose")]
async fn compose_form(_user: SessionUser) -> HttpResponse {
    pages::html(pages::compose())
}

#[post("/compose")]
async fn compose(
    req: HttpRequest,
    user: SessionUser,
    form: web::Form<ComposeForm>,
    auth: Auth,
    posts: Posts,
) -> Result<HttpResponse, DomainError> {
    let author = auth.get_user(user.id).await?;
    let form = form.into_inner();
    let post = posts
        .compose(&author, form.post_title, form.post_body, form.post_markdown)
        .await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post.id,
        author_id = %author.id,
        "post composed"
    );
    Ok(see_other("/home"))
}

#[get("/profile")]
async fn profile(user: SessionUser, auth: Auth, posts: Posts) -> Result<HttpResponse, DomainError> {
    let me = auth.get_user(user.id).await?;
    let owned = posts.owned_posts(&me).await?;
    Ok(pages::html(pages::profile(&me.handle, &owned)))
}

#[get("/posts/{post_id}")]
async fn post_view(
    viewer: Viewer,
    path: web::Path<Uuid>,
    posts: Posts,
) -> Result<HttpResponse, DomainError> {
    let post = posts.post(path.into_inner()).await?;
    let owner = policy::can_manage(viewer.id(), &post);
    Ok(pages::html(pages::post_page(
        &post,
        owner,
        viewer.authenticated(),
    )))
}

#[post("/delete")]
async fn delete(
    req: HttpRequest,
    user: SessionUser,
    form: web::Form<DeleteForm>,
    posts: Posts,
) -> Result<HttpResponse, DomainError> {
    posts.delete(user.id, form.post_id).await?;
    info!(
        request_id = %request_id(&req),
        post_id = %form.post_id,
        viewer_id = %user.id,
        "post deleted"
    );
    Ok(see_other("/profile"))
}
