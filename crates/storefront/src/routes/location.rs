//! Branch selection before the booking wizard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{BRANCHES, Branch, find_branch};
use crate::error::Result;
use crate::filters;
use crate::page::{Flash, PageContext, set_flash};
use crate::state::AppState;
use crate::stores::{BookingCart, BookingDetailsPatch};

/// Branch picker template.
#[derive(Template, WebTemplate)]
#[template(path = "booking/select_location.html")]
pub struct SelectLocationTemplate {
    pub page: PageContext,
    pub branches: &'static [Branch],
    /// Currently selected branch id.
    pub selected: Option<String>,
}

impl SelectLocationTemplate {
    fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }
}

/// Branch choice form.
#[derive(Debug, Deserialize)]
pub struct SelectLocationForm {
    pub location: String,
}

/// Display the branches.
#[instrument(skip(session, page))]
pub async fn show(session: Session, page: PageContext) -> impl IntoResponse {
    let cart = BookingCart::load(&session).await;
    SelectLocationTemplate {
        page,
        branches: BRANCHES,
        selected: cart.details.location.map(|location| location.id),
    }
}

/// Store the chosen branch and continue to the wizard.
#[instrument(skip(session))]
pub async fn select(session: Session, Form(form): Form<SelectLocationForm>) -> Result<Response> {
    let Some(branch) = find_branch(&form.location) else {
        set_flash(&session, Flash::error("booking.errors.noLocation")).await;
        return Ok(Redirect::to("/select-location").into_response());
    };

    let mut cart = BookingCart::load(&session).await;
    cart.update_details(BookingDetailsPatch {
        location: Some(branch.to_ref()),
        ..BookingDetailsPatch::default()
    });
    cart.save(&session).await?;
    tracing::info!(location = branch.id, "Location selected");

    Ok(Redirect::to("/guest-booking").into_response())
}

/// Forget the chosen branch and pick again.
#[instrument(skip(session))]
pub async fn change(session: Session) -> Result<Redirect> {
    let mut cart = BookingCart::load(&session).await;
    cart.clear_location();
    cart.save(&session).await?;
    Ok(Redirect::to("/select-location"))
}

/// Create the location routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show).post(select))
        .route("/change", post(change))
}
