//! About page, shop locations and barber profiles.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use delegends_core::BarberId;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{Barber, Salon};
use crate::catalog::BRANCHES;
use crate::error::{AppError, Result};
use crate::filters;
use crate::page::{PageContext, translator_for};
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
    pub barbers: Vec<Barber>,
    pub locations: Vec<LocationView>,
}

/// A shop shown on the about page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationView {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl From<Salon> for LocationView {
    fn from(salon: Salon) -> Self {
        Self {
            name: salon.name,
            address: salon.address,
            phone: salon.phone,
        }
    }
}

/// The built-in branches, for when the backend lists no salons.
fn branch_locations() -> Vec<LocationView> {
    BRANCHES
        .iter()
        .map(|branch| LocationView {
            name: branch.name.to_string(),
            address: Some(branch.address.to_string()),
            phone: None,
        })
        .collect()
}

async fn load_locations(state: &AppState) -> Vec<LocationView> {
    match state.api().list_salons().await {
        Ok(salons) if !salons.is_empty() => salons.into_iter().map(LocationView::from).collect(),
        Ok(_) => branch_locations(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load salons");
            branch_locations()
        }
    }
}

/// Team page template.
#[derive(Template, WebTemplate)]
#[template(path = "team/index.html")]
pub struct TeamTemplate {
    pub page: PageContext,
    pub barbers: Vec<Barber>,
}

/// Barber profile fragment (HTMX modal body).
#[derive(Template, WebTemplate)]
#[template(path = "partials/barber_profile.html")]
pub struct BarberProfileTemplate {
    pub barber: Barber,
    pub book_label: String,
    pub specialties_label: String,
}

/// Barbers for listing pages. A backend failure shows the empty state.
async fn load_barbers(state: &AppState) -> Vec<Barber> {
    state.api().list_barbers().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load barbers");
        Vec::new()
    })
}

/// Display the about page.
#[instrument(skip(state, page))]
pub async fn about(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let barbers = load_barbers(&state).await;
    let locations = load_locations(&state).await;
    AboutTemplate {
        page,
        barbers,
        locations,
    }
}

/// Display the team page.
#[instrument(skip(state, page))]
pub async fn index(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let barbers = load_barbers(&state).await;
    TeamTemplate { page, barbers }
}

/// Barber profile fragment.
///
/// # Errors
///
/// Returns 404 if no barber has the id.
#[instrument(skip(state, session))]
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<BarberId>,
    session: Session,
) -> Result<impl IntoResponse> {
    let t = translator_for(&state, &session).await;

    let barber = state
        .api()
        .list_barbers()
        .await?
        .into_iter()
        .find(|barber| barber.id == id)
        .ok_or_else(|| AppError::NotFound(format!("barber {id}")))?;

    Ok(BarberProfileTemplate {
        barber,
        book_label: t.t("common.bookAppointment").to_string(),
        specialties_label: t.t("team.specialties").to_string(),
    })
}

/// Create the team routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(profile))
}
