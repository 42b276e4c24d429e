//! Server-rendered pages. Everything here is typed markup; the only
//! `PreEscaped` content is post HTML that already went through the
//! sanitizer at write time.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::application::feed::Feed;
use crate::domain::post::Post;

const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#fafafa;--fg:#111;--fg2:#555;--fg3:#999;--accent:#1a5fb4;--border:rgba(26,95,180,.18)}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;line-height:1.6;color:var(--fg);background:var(--bg);min-height:100vh;display:flex;flex-direction:column;align-items:center;padding:1.5rem 1rem}
main{max-width:680px;width:100%;flex:1}
nav{max-width:680px;width:100%;display:flex;gap:1rem;margin-bottom:1.5rem}
nav a{color:var(--accent);text-decoration:none;font-weight:600}
nav a:hover{text-decoration:underline}
a{color:var(--accent)}
h1{margin-bottom:1rem;letter-spacing:-.01em}
.card{padding:1.25rem;border:1px solid var(--border);border-radius:10px;margin-bottom:1rem;background:#fff}
.card h2{font-size:1.15rem}
.card h2 a{text-decoration:none;color:var(--fg)}
.card h2 a:hover{color:var(--accent)}
.byline{color:var(--fg3);font-size:.85rem;margin-bottom:.5rem}
.summary{color:var(--fg2);margin:.75rem 0}
.empty{color:var(--fg3)}
.error{color:#a51d2d;margin-bottom:1rem}
.post-body{margin:1rem 0;line-height:1.75}
.post-body h1,.post-body h2,.post-body h3{margin:1.25rem 0 .5rem}
.post-body p{margin:.75rem 0}
.post-body ul,.post-body ol{margin:.75rem 0;padding-left:1.5rem}
.post-body pre{background:var(--bg);border:1px solid var(--border);border-radius:6px;padding:.75rem 1rem;overflow-x:auto;margin:.75rem 0;font-size:.85rem}
.post-body code{font-family:ui-monospace,Menlo,monospace;font-size:.9em}
.post-body blockquote{border-left:3px solid var(--border);padding-left:1rem;margin:.75rem 0;color:var(--fg2)}
form{display:flex;flex-direction:column;gap:.5rem;max-width:420px}
form.wide{max-width:none}
label{font-weight:600;font-size:.9rem}
input,textarea{font:inherit;padding:.5rem .65rem;border:1px solid var(--border);border-radius:6px;background:#fff}
button{font:inherit;font-weight:600;padding:.5rem 1rem;border:none;border-radius:6px;background:var(--accent);color:#fff;cursor:pointer;align-self:flex-start;margin-top:.5rem}
button.danger{background:#a51d2d}
"#;

pub fn html(markup: Markup) -> HttpResponse {
    html_with(StatusCode::OK, markup)
}

pub fn html_with(status: StatusCode, markup: Markup) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(markup.into_string())
}

fn page_shell(title: &str, authenticated: bool, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                nav {
                    a href="/home" { "Home" }
                    @if authenticated {
                        a href="/compose" { "Compose" }
                        a href="/profile" { "Profile" }
                        a href="/logout" { "Log out" }
                    } @else {
                        a href="/login" { "Log in" }
                        a href="/signup1" { "Sign up" }
                    }
                }
                main { (body) }
            }
        }
    }
}

fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %e, %Y").to_string()
}

pub fn home(feed: &Feed) -> Markup {
    page_shell(
        "Latest posts",
        feed.authenticated,
        html! {
            h1 { "Latest posts" }
            @if feed.posts.is_empty() {
                p class="empty" { "Nothing here yet." }
            }
            @for post in &feed.posts {
                article class="card" {
                    h2 { a href={"/posts/" (post.id)} { (post.title) } }
                    p class="byline" { "by " (post.author_handle) " on " (format_date(&post.created_at)) }
                    @if !post.description.is_empty() {
                        p { (post.description) }
                    }
                }
            }
        },
    )
}

pub fn compose() -> Markup {
    page_shell(
        "Compose",
        true,
        html! {
            h1 { "Compose" }
            form class="wide" method="post" action="/compose" {
                label for="postTitle" { "Title" }
                input type="text" id="postTitle" name="postTitle" required;
                label for="postBody" { "Summary" }
                input type="text" id="postBody" name="postBody";
                label for="postMarkdown" { "Body (Markdown)" }
                textarea id="postMarkdown" name="postMarkdown" rows="14" required {}
                button type="submit" { "Publish" }
            }
        },
    )
}

pub fn profile(handle: &str, posts: &[Post]) -> Markup {
    page_shell(
        handle,
        true,
        html! {
            h1 { (handle) }
            @if posts.is_empty() {
                p class="empty" { "You have not written anything yet." }
            }
            @for post in posts {
                article class="card" {
                    h2 { a href={"/posts/" (post.id)} { (post.title) } }
                    p class="byline" { (format_date(&post.created_at)) }
                }
            }
        },
    )
}

/// Single post. Owners get the management affordances; visitors read only.
pub fn post_page(post: &Post, owner: bool, authenticated: bool) -> Markup {
    page_shell(
        &post.title,
        authenticated,
        html! {
            article {
                h1 { (post.title) }
                p class="byline" { "by " (post.author_handle) " on " (format_date(&post.created_at)) }
                @if !post.description.is_empty() {
                    p class="summary" { (post.description) }
                }
                div class="post-body" {
                    (PreEscaped(post.sanitized_html.as_str()))
                }
                @if owner {
                    form method="post" action="/delete" {
                        input type="hidden" name="postId" value=(post.id);
                        button type="submit" class="danger" { "Delete" }
                    }
                }
            }
        },
    )
}

pub fn login(authenticated: bool, error: Option<&str>) -> Markup {
    page_shell(
        "Log in",
        authenticated,
        html! {
            h1 { "Log in" }
            @if let Some(message) = error {
                p class="error" { (message) }
            }
            form method="post" action="/signin" {
                label for="username" { "Email" }
                input type="email" id="username" name="username" required;
                label for="password" { "Password" }
                input type="password" id="password" name="password" required;
                button type="submit" { "Log in" }
            }
            p { a href="/auth/google" { "Sign in with Google" } }
            p { "No account? " a href="/signup1" { "Sign up" } }
        },
    )
}

pub fn signup(error: Option<&str>) -> Markup {
    page_shell(
        "Sign up",
        false,
        html! {
            h1 { "Sign up" }
            @if let Some(message) = error {
                p class="error" { (message) }
            }
            form method="post" action="/signup" {
                label for="username" { "Email" }
                input type="email" id="username" name="username" required;
                label for="userhandle" { "Display name" }
                input type="text" id="userhandle" name="userhandle" required;
                label for="password" { "Password" }
                input type="password" id="password" name="password" required;
                button type="submit" { "Create account" }
            }
            p { "Already registered? " a href="/login" { "Log in" } }
        },
    )
}
