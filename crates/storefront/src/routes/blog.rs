//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use crate::content::Post;
use crate::error::{AppError, Result};
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;

/// Post view for templates.
#[derive(Debug, Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub author: String,
    pub author_initials: String,
    pub category: Option<String>,
    pub published_at: NaiveDate,
    pub featured_image: Option<String>,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            excerpt: post.meta.excerpt.clone(),
            author: post
                .meta
                .author
                .clone()
                .unwrap_or_else(|| "De Legends".to_string()),
            author_initials: post.author_initials(),
            category: post.meta.category.clone(),
            published_at: post.meta.published_at,
            featured_image: post.meta.featured_image.clone(),
            content_html: post.content_html.clone(),
            reading_time_minutes: post.reading_time_minutes,
        }
    }
}

/// Blog index query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub category: Option<String>,
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub page: PageContext,
    pub posts: Vec<PostView>,
    pub categories: Vec<String>,
    pub active_category: Option<String>,
}

impl BlogIndexTemplate {
    fn is_active_category(&self, category: &str) -> bool {
        self.active_category.as_deref() == Some(category)
    }
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub page: PageContext,
    pub post: PostView,
    pub recent_posts: Vec<PostView>,
}

/// Number of recent posts to show under an article.
const RECENT_POSTS_COUNT: usize = 3;

/// Distinct post categories in first-seen order.
fn categories<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in posts.filter_map(|p| p.meta.category.as_deref()) {
        if !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

/// Display the blog index page with all published posts.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
    page: PageContext,
) -> impl IntoResponse {
    let active_category = query.category.filter(|c| !c.is_empty());
    let posts = state
        .content()
        .get_published_posts()
        .filter(|post| {
            active_category
                .as_deref()
                .is_none_or(|c| post.meta.category.as_deref() == Some(c))
        })
        .map(PostView::from)
        .collect();

    BlogIndexTemplate {
        page,
        posts,
        categories: categories(state.content().get_published_posts()),
        active_category,
    }
}

/// Display a single blog post by slug.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist or is a draft.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let post = state
        .content()
        .get_post(&slug)
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    let recent_posts = state
        .content()
        .get_recent_posts(RECENT_POSTS_COUNT, Some(&slug))
        .into_iter()
        .map(PostView::from)
        .collect();

    Ok(BlogShowTemplate {
        page,
        post: PostView::from(post),
        recent_posts,
    })
}

/// Create the blog routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{slug}", get(show))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::content::ContentStore;

    fn shipped_content() -> ContentStore {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content");
        ContentStore::load(&dir).unwrap()
    }

    #[test]
    fn test_post_view_defaults_author() {
        let content = shipped_content();
        let post = content.get_published_posts().next().unwrap();
        let view = PostView::from(post);
        assert!(!view.author.is_empty());
        assert!(!view.author_initials.is_empty());
        assert_eq!(view.slug, post.slug);
    }

    #[test]
    fn test_categories_are_distinct() {
        let content = shipped_content();
        let cats = categories(content.get_published_posts());
        let mut deduped = cats.clone();
        deduped.dedup();
        assert_eq!(cats.len(), deduped.len());
        assert!(!cats.is_empty());
    }
}
