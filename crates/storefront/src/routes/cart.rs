//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session (see [`ShoppingCart`]); prices are
//! taken from the backend when a product is added.

use std::num::NonZeroU32;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use delegends_core::ProductId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::i18n::Translator;
use crate::page::{Flash, PageContext, set_flash, translator_for};
use crate::routes::is_htmx;
use crate::state::AppState;
use crate::stores::{CartError, ShoppingCart};

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&ShoppingCart> for CartView {
    fn from(cart: &ShoppingCart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id.to_string(),
                    title: item.title.clone(),
                    image_url: item.image_url.clone(),
                    quantity: item.quantity.get(),
                    price: item.price.to_string(),
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            total: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data: an absolute quantity or a +/- step.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub delta: Option<i32>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub t: Translator,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub t: Translator,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session, page))]
pub async fn show(session: Session, page: PageContext) -> impl IntoResponse {
    let cart = ShoppingCart::load(&session).await;
    CartShowTemplate {
        t: page.translator().clone(),
        page,
        cart: CartView::from(&cart),
    }
}

/// Re-render the cart items after a change, or go back to the cart page
/// for plain form posts.
async fn cart_changed(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    cart: &ShoppingCart,
) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            t: translator_for(state, session).await,
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Add item to cart (HTMX).
///
/// The product is fetched so the stored price and title come from the
/// backend, not the form. Out-of-stock products are refused. Returns the
/// count badge and an HTMX trigger.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = NonZeroU32::new(form.quantity.unwrap_or(1)).unwrap_or(NonZeroU32::MIN);

    let product = match state.api().get_product(&form.product_id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add item to cart");
            set_flash(&session, Flash::error("cart.addFailed")).await;
            return Ok(Redirect::to("/products").into_response());
        }
    };

    if !product.in_stock() {
        tracing::info!(product_id = %product.id, "Refused out-of-stock product");
        set_flash(&session, Flash::error("cart.outOfStock")).await;
        let target = format!("/product/{}", urlencoding::encode(product.id.as_str()));
        if is_htmx(&headers) {
            return Ok((AppendHeaders([("HX-Redirect", target)]), "").into_response());
        }
        return Ok(Redirect::to(&target).into_response());
    }

    let mut cart = ShoppingCart::load(&session).await;
    cart.add(&product, quantity);
    cart.save(&session).await?;
    tracing::info!(product_id = %product.id, quantity, "Added to cart");

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response());
    }

    set_flash(&session, Flash::success("cart.added")).await;
    Ok(Redirect::to("/cart").into_response())
}

/// Update cart item quantity (HTMX).
///
/// Quantities below one are refused; the line stays as it was.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = ShoppingCart::load(&session).await;

    let result = match (form.quantity, form.delta) {
        (Some(quantity), _) => cart.set_quantity(&form.product_id, quantity),
        (None, Some(delta)) => cart.adjust(&form.product_id, delta),
        (None, None) => Err(CartError::InvalidQuantity),
    };

    match result {
        Ok(()) => cart.save(&session).await?,
        Err(e) => tracing::debug!(error = %e, "Cart update ignored"),
    }

    Ok(cart_changed(&state, &session, &headers, &cart).await)
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = ShoppingCart::load(&session).await;
    if cart.remove(&form.product_id) {
        cart.save(&session).await?;
    }
    Ok(cart_changed(&state, &session, &headers, &cart).await)
}

/// Empty the cart and remove it from the session.
#[instrument(skip(state, session, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    let mut cart = ShoppingCart::load(&session).await;
    cart.clear();
    ShoppingCart::clear_persisted(&session).await?;
    Ok(cart_changed(&state, &session, &headers, &cart).await)
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: ShoppingCart::load(&session).await.item_count(),
    }
}

/// Create the cart routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show))
        .route("/add", post(add))
        .route("/update", post(update))
        .route("/remove", post(remove))
        .route("/clear", post(clear))
        .route("/count", get(count))
}
