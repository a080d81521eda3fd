//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::api::Review;
use crate::catalog::{BRANCHES, Branch, SERVICE_MENU};
use crate::filters;
use crate::page::PageContext;
use crate::routes::blog::PostView;
use crate::routes::services::MenuItemView;
use crate::state::AppState;

/// Reviews shown in the testimonials strip.
const HOME_REVIEW_COUNT: usize = 6;

/// Featured blog posts shown on the home page.
const HOME_POST_COUNT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    /// First entry of each menu category.
    pub highlights: Vec<MenuItemView>,
    pub reviews: Vec<Review>,
    pub posts: Vec<PostView>,
    pub branches: &'static [Branch],
}

/// Display the home page.
///
/// Reviews come from the backend; a failure there only hides the strip.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let reviews = match state.api().approved_reviews().await {
        Ok(reviews) => reviews.into_iter().take(HOME_REVIEW_COUNT).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load approved reviews");
            Vec::new()
        }
    };

    let highlights = SERVICE_MENU
        .iter()
        .filter_map(|category| category.items.first())
        .map(|item| MenuItemView::new(item, page.translator()))
        .collect();

    let posts = state
        .content()
        .get_featured_posts()
        .take(HOME_POST_COUNT)
        .map(PostView::from)
        .collect();

    HomeTemplate {
        page,
        highlights,
        reviews,
        posts,
        branches: BRANCHES,
    }
}
