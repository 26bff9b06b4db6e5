//! HTTP server: blog API, blog pages and the contact endpoint

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::contact::{self, ContactInput, ContactService};
use crate::content::{by_tag, neighbours, tag_index, Blog, HtmlRenderer};
use crate::templates;
use crate::Portfolio;

/// Everything a request handler needs
pub struct AppState {
    pub config: SiteConfig,
    pub blog: Blog,
    pub renderer: HtmlRenderer,
    pub contact: ContactService,
}

impl AppState {
    pub fn new(portfolio: &Portfolio) -> Self {
        Self {
            config: portfolio.config.clone(),
            blog: portfolio.blog(),
            renderer: portfolio.renderer(),
            contact: portfolio.contact_service(),
        }
    }
}

type SharedState = Arc<AppState>;

/// Build the application router; unmatched paths are served from `public_dir`
pub fn router(state: SharedState, public_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/tags", get(list_tags))
        .route("/api/contact", post(submit_contact))
        .route("/blog", get(blog_index))
        .route("/blog/tags/:tag", get(blog_tag))
        .route("/blog/:slug", get(blog_post))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(portfolio: &Portfolio, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(portfolio));
    let app = router(state, &portfolio.public_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run filesystem-bound pipeline work off the async workers
async fn blocking<T, F>(state: &SharedState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&AppState) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            tracing::error!("Content task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn list_posts(State(state): State<SharedState>) -> Result<Response, StatusCode> {
    let summaries = blocking(&state, |s| s.blog.summaries()).await?;
    Ok(Json(summaries).into_response())
}

async fn get_post(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Response, StatusCode> {
    let post = blocking(&state, move |s| s.blog.find_post(&slug)).await?;
    Ok(match post {
        Some(post) => Json(post).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Post not found" })),
        )
            .into_response(),
    })
}

async fn list_tags(State(state): State<SharedState>) -> Result<Response, StatusCode> {
    let tags = blocking(&state, |s| tag_index(&s.blog.summaries())).await?;
    Ok(Json(tags).into_response())
}

async fn blog_index(State(state): State<SharedState>) -> Result<Html<String>, StatusCode> {
    let page = blocking(&state, |s| {
        let summaries = s.blog.summaries();
        let posts: Vec<_> = summaries.iter().collect();
        templates::render_index(&s.config, "Blog Posts", &posts)
    })
    .await?;
    Ok(Html(page))
}

async fn blog_tag(
    State(state): State<SharedState>,
    Path(tag): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let page = blocking(&state, move |s| {
        let summaries = s.blog.summaries();
        let posts = by_tag(&summaries, &tag);
        let heading = format!("Posts tagged \"{}\"", tag);
        templates::render_index(&s.config, &heading, &posts)
    })
    .await?;
    Ok(Html(page))
}

async fn blog_post(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Response, StatusCode> {
    let page = blocking(&state, move |s| {
        let post = s.blog.find_post(&slug)?;
        let summaries = s.blog.summaries();
        let (newer, older) = neighbours(&summaries, &slug);
        let body = s.renderer.render(&post.body);
        Some(templates::render_post(&s.config, &post, &body, newer, older))
    })
    .await?;

    Ok(match page {
        Some(html) => Html(html).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html(templates::render_not_found(&state.config)),
        )
            .into_response(),
    })
}

async fn submit_contact(State(state): State<SharedState>, body: Bytes) -> Response {
    match serde_json::from_slice::<ContactInput>(&body) {
        Ok(input) => state.contact.submit(input).await.into_response(),
        Err(e) => {
            tracing::debug!("Rejected contact request body: {}", e);
            contact::invalid_request()
        }
    }
}
