//! Checkout and order confirmation.
//!
//! Checkout hands the cart to a hosted payment page; this server never sees
//! card details. The payment page returns to `/order-success?session_id=…`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, CheckoutRequest, Order};
use crate::error::{AppError, Result};
use crate::filters;
use crate::page::PageContext;
use crate::payments::{CheckoutForm, checkout_items, hosted_redirect};
use crate::routes::cart::CartView;
use crate::state::AppState;
use crate::stores::ShoppingCart;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub form: CheckoutForm,
    /// Inline error: a translation key or a backend message.
    pub error: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct OrderSuccessTemplate {
    pub page: PageContext,
    pub order: Option<Order>,
}

/// Return query of the hosted checkout.
#[derive(Debug, Deserialize)]
pub struct OrderSuccessQuery {
    pub session_id: Option<String>,
}

/// Display the checkout form. An empty cart goes back to the cart page.
#[instrument(skip(session, page))]
pub async fn show(session: Session, page: PageContext) -> Response {
    let cart = ShoppingCart::load(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let form = page
        .user
        .as_ref()
        .map(|user| CheckoutForm {
            name: user.name.clone(),
            email: user.email.clone(),
            ..CheckoutForm::default()
        })
        .unwrap_or_default();

    CheckoutTemplate {
        page,
        cart: CartView::from(&cart),
        form,
        error: None,
    }
    .into_response()
}

/// Validate the form and redirect to the hosted checkout.
///
/// A rejected customer token signs the customer out instead of showing a
/// banner.
#[instrument(skip(state, session, page, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = ShoppingCart::load(&session).await;

    let prepared = form
        .validate()
        .and_then(|customer| Ok((customer, checkout_items(&cart)?)));
    let (customer, items) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            let error = Some(e.message_key().to_string());
            return Ok(CheckoutTemplate {
                page,
                cart: CartView::from(&cart),
                form,
                error,
            }
            .into_response());
        }
    };

    let token = page.user.as_ref().map(|user| user.token.as_str());
    let request = CheckoutRequest {
        items,
        customer_info: &customer,
    };

    let error = match state.api().create_checkout_session(token, &request).await {
        Ok(response) => match hosted_redirect(response) {
            Ok(url) => {
                tracing::info!(items = cart.item_count(), "Redirecting to hosted checkout");
                return Ok(Redirect::to(&url).into_response());
            }
            Err(e) => e.message_key().to_string(),
        },
        Err(ApiError::Unauthorized) => return Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create checkout session");
            e.user_message("checkout.errors.paymentUnavailable").to_string()
        }
    };

    Ok(CheckoutTemplate {
        page,
        cart: CartView::from(&cart),
        form,
        error: Some(error),
    }
    .into_response())
}

/// Order confirmation after the hosted checkout.
///
/// The cart is cleared once the backend knows the order.
#[instrument(skip(state, session, page))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrderSuccessQuery>,
    page: PageContext,
) -> Result<Response> {
    let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return Ok(Redirect::to("/").into_response());
    };

    let order = match state.api().order_by_session(&session_id).await {
        Ok(order) => {
            ShoppingCart::clear_persisted(&session).await?;
            tracing::info!(order_id = %order.id, "Order confirmed");
            Some(order)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load order for checkout session");
            None
        }
    };

    Ok(OrderSuccessTemplate { page, order }.into_response())
}

/// Create the checkout routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(show).post(submit))
        .route("/order-success", get(success))
}
