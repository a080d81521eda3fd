//! Service menu and "book this service".

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{self, MenuItem, SERVICE_MENU, match_backend_service};
use crate::error::Result;
use crate::filters;
use crate::i18n::Translator;
use crate::page::{Flash, PageContext, set_flash};
use crate::state::AppState;
use crate::stores::{BookingCart, BookingCartError, SelectedService};

/// Menu entry with its strings resolved.
#[derive(Debug, Clone)]
pub struct MenuItemView {
    pub key: &'static str,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: &'static str,
}

impl MenuItemView {
    #[must_use]
    pub fn new(item: &MenuItem, t: &Translator) -> Self {
        Self {
            key: item.key,
            name: t.t(&item.name_key()).to_string(),
            description: t.t(&item.description_key()).to_string(),
            price: item.price().to_string(),
            image: item.image,
        }
    }
}

/// Menu category with its strings resolved.
#[derive(Debug, Clone)]
pub struct MenuCategoryView {
    pub key: &'static str,
    pub title: String,
    pub emoji: &'static str,
    pub items: Vec<MenuItemView>,
}

/// Services page template.
#[derive(Template, WebTemplate)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub page: PageContext,
    pub categories: Vec<MenuCategoryView>,
}

/// Display the service menu.
#[instrument(skip(page))]
pub async fn index(page: PageContext) -> impl IntoResponse {
    let t = page.translator();
    let categories = SERVICE_MENU
        .iter()
        .map(|category| MenuCategoryView {
            key: category.key,
            title: t.t(&format!("servicesPage.{}", category.key)).to_string(),
            emoji: category.emoji,
            items: category
                .items
                .iter()
                .map(|item| MenuItemView::new(item, t))
                .collect(),
        })
        .collect();

    ServicesTemplate { page, categories }
}

/// "Book" button on a menu entry.
#[derive(Debug, Deserialize)]
pub struct BookServiceForm {
    pub item: String,
}

/// Add the backend service matching a menu entry to the booking cart, then
/// continue to branch selection.
///
/// The backend's service list is not keyed like the menu, so the service is
/// matched by price (see [`match_backend_service`]).
#[instrument(skip(state, session))]
pub async fn book(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<BookServiceForm>,
) -> Result<Response> {
    let Some(item) = catalog::find_menu_item(&form.item) else {
        set_flash(&session, Flash::error("servicesPage.unknownService")).await;
        return Ok(Redirect::to("/services").into_response());
    };

    let services = match state.api().list_services().await {
        Ok(services) => services,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load services for booking");
            set_flash(&session, Flash::error("servicesPage.bookingUnavailable")).await;
            return Ok(Redirect::to("/services").into_response());
        }
    };

    let Some(service) = match_backend_service(item, &services) else {
        set_flash(&session, Flash::error("servicesPage.bookingUnavailable")).await;
        return Ok(Redirect::to("/services").into_response());
    };

    let mut cart = BookingCart::load(&session).await;
    match cart.add_service(SelectedService::from(service)) {
        Ok(()) => {
            cart.save(&session).await?;
            tracing::info!(menu_item = item.key, service_id = %service.id, "Service added to booking cart");
        }
        Err(BookingCartError::AlreadyInCart(_)) => {
            set_flash(&session, Flash::info("servicesPage.alreadySelected")).await;
        }
    }

    Ok(Redirect::to("/select-location").into_response())
}

/// Create the services routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/book", post(book))
}
