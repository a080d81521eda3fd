//! Legal pages and the FAQ.
//!
//! Legal pages are markdown files from the content directory; the FAQ comes
//! from the translation catalogs so it follows the visitor's locale.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, response::IntoResponse, routing::get};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub page: PageContext,
    pub title: String,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// One FAQ question.
#[derive(Debug, Clone, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// FAQ page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub page: PageContext,
    pub entries: Vec<FaqEntry>,
}

/// Serve a content page by slug.
fn serve_content_page(state: &AppState, slug: &str, page: PageContext) -> Result<ContentPageTemplate> {
    let content = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        page,
        title: content.meta.title.clone(),
        description: content.meta.description.clone().unwrap_or_default(),
        updated_at: content.meta.updated_at,
        content_html: content.content_html.clone(),
    })
}

/// Display the Privacy Policy page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn privacy(State(state): State<AppState>, page: PageContext) -> Result<impl IntoResponse> {
    serve_content_page(&state, "privacy", page)
}

/// Display the Terms of Service page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn terms(State(state): State<AppState>, page: PageContext) -> Result<impl IntoResponse> {
    serve_content_page(&state, "terms", page)
}

/// Display the Refund Policy page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn refund(State(state): State<AppState>, page: PageContext) -> Result<impl IntoResponse> {
    serve_content_page(&state, "refund", page)
}

/// Display the Cookie Policy page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn cookies(State(state): State<AppState>, page: PageContext) -> Result<impl IntoResponse> {
    serve_content_page(&state, "cookies", page)
}

/// Display the Disclaimer page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn disclaimer(State(state): State<AppState>, page: PageContext) -> Result<impl IntoResponse> {
    serve_content_page(&state, "disclaimer", page)
}

/// Display the FAQ page.
#[instrument(skip(page))]
pub async fn faq(page: PageContext) -> impl IntoResponse {
    let entries = page.translator().list::<FaqEntry>("faq.questions");
    FaqTemplate { page, entries }
}

/// Create the pages routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/privacy", get(privacy))
        .route("/terms", get(terms))
        .route("/refund", get(refund))
        .route("/cookies", get(cookies))
        .route("/disclaimer", get(disclaimer))
        .route("/faq", get(faq))
}
