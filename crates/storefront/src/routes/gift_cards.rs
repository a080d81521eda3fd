//! Gift cards: purchase and balance check.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use delegends_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{GiftCard, GiftCardPurchase, GiftCardType};
use crate::catalog::{GIFT_CARD_DENOMINATIONS, PHYSICAL_CARD_SHIPPING_EUROS, find_denomination};
use crate::filters;
use crate::i18n::Translator;
use crate::page::{Flash, PageContext, set_flash, translator_for};
use crate::payments::gift_card_total;
use crate::state::AppState;

/// Denomination display data.
#[derive(Debug, Clone)]
pub struct DenominationView {
    pub euros: i64,
    pub amount: String,
    pub popular: bool,
    pub multiple_services: bool,
}

/// Gift cards page template.
#[derive(Template, WebTemplate)]
#[template(path = "gift_cards/index.html")]
pub struct GiftCardsTemplate {
    pub page: PageContext,
    pub denominations: Vec<DenominationView>,
    pub shipping_euros: i64,
}

/// Purchase confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "gift_cards/purchased.html")]
pub struct GiftCardPurchasedTemplate {
    pub page: PageContext,
    pub code: Option<String>,
    pub total: String,
    pub recipient_email: String,
    pub physical: bool,
}

/// Balance check fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/gift_card_balance.html")]
pub struct GiftCardBalanceTemplate {
    pub t: Translator,
    pub code: String,
    pub balance: Option<String>,
    pub expires_at: Option<String>,
    /// Translation key of the problem, when the card is not usable.
    pub error: Option<&'static str>,
}

/// Purchase form data.
#[derive(Debug, Deserialize)]
pub struct PurchaseForm {
    pub amount: i64,
    #[serde(default)]
    pub card_type: GiftCardType,
    #[serde(default)]
    pub purchaser_name: String,
    #[serde(default)]
    pub purchaser_email: String,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_email: String,
    #[serde(default)]
    pub message: String,
}

impl PurchaseForm {
    /// Translation key of the first problem, if any.
    fn problem(&self) -> Option<&'static str> {
        if find_denomination(self.amount).is_none() {
            return Some("giftCards.errors.invalidAmount");
        }
        let required = [
            &self.purchaser_name,
            &self.purchaser_email,
            &self.recipient_name,
            &self.recipient_email,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Some("giftCards.errors.missingFields");
        }
        if Email::parse(&self.purchaser_email).is_err() || Email::parse(&self.recipient_email).is_err()
        {
            return Some("giftCards.errors.invalidEmail");
        }
        None
    }
}

/// Balance check query.
#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    #[serde(default)]
    pub code: String,
}

/// Display the gift card options.
#[instrument(skip(page))]
pub async fn index(page: PageContext) -> impl IntoResponse {
    GiftCardsTemplate {
        page,
        denominations: GIFT_CARD_DENOMINATIONS
            .iter()
            .map(|d| DenominationView {
                euros: d.euros,
                amount: d.amount().to_string(),
                popular: d.popular,
                multiple_services: d.covers_multiple_services(),
            })
            .collect(),
        shipping_euros: PHYSICAL_CARD_SHIPPING_EUROS,
    }
}

/// Buy a gift card.
///
/// When the backend answers with a hosted payment page the customer is
/// sent there; otherwise the issued card is shown.
#[instrument(skip(state, session, page, form), fields(amount = form.amount))]
pub async fn purchase(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<PurchaseForm>,
) -> Response {
    if let Some(problem) = form.problem() {
        set_flash(&session, Flash::error(problem)).await;
        return Redirect::to("/gift-cards").into_response();
    }
    let Some(denomination) = find_denomination(form.amount) else {
        return Redirect::to("/gift-cards").into_response();
    };

    let request = GiftCardPurchase {
        amount: denomination.amount(),
        card_type: form.card_type,
        purchaser_name: form.purchaser_name.trim(),
        purchaser_email: form.purchaser_email.trim(),
        recipient_name: form.recipient_name.trim(),
        recipient_email: form.recipient_email.trim(),
        message: form.message.trim(),
    };

    let card: GiftCard = match state.api().purchase_gift_card(&request).await {
        Ok(card) => card,
        Err(e) => {
            tracing::warn!(error = %e, "Gift card purchase failed");
            let message = e.user_message("giftCards.errors.purchaseFailed").to_string();
            set_flash(&session, Flash::error(message)).await;
            return Redirect::to("/gift-cards").into_response();
        }
    };

    if let Some(url) = card
        .url
        .as_deref()
        .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
    {
        return Redirect::to(url).into_response();
    }

    tracing::info!(amount = denomination.euros, "Gift card purchased");
    GiftCardPurchasedTemplate {
        page,
        code: card.code,
        total: gift_card_total(denomination.amount(), form.card_type).to_string(),
        recipient_email: request.recipient_email.to_string(),
        physical: form.card_type == GiftCardType::Physical,
    }
    .into_response()
}

/// Check a gift card's balance (HTMX fragment).
#[instrument(skip(state, session, query))]
pub async fn validate(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ValidateQuery>,
) -> impl IntoResponse {
    let t = translator_for(&state, &session).await;
    let code = query.code.trim().to_uppercase();

    let mut view = GiftCardBalanceTemplate {
        t,
        code: code.clone(),
        balance: None,
        expires_at: None,
        error: None,
    };

    if code.is_empty() {
        view.error = Some("giftCards.errors.missingCode");
        return view;
    }

    match state.api().validate_gift_card(&code).await {
        Ok(card) if card.valid != Some(false) => {
            view.balance = card.balance.map(|b| b.to_string());
            view.expires_at = card.expires_at.map(|at| at.format("%Y-%m-%d").to_string());
        }
        Ok(_) => view.error = Some("giftCards.errors.invalidCode"),
        Err(e) => {
            tracing::debug!(error = %e, "Gift card validation failed");
            view.error = Some("giftCards.errors.invalidCode");
        }
    }
    view
}

/// Create the gift card routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/purchase", post(purchase))
        .route("/validate", get(validate))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> PurchaseForm {
        PurchaseForm {
            amount: 50,
            card_type: GiftCardType::Virtual,
            purchaser_name: "Jonas".to_string(),
            purchaser_email: "jonas@example.lt".to_string(),
            recipient_name: "Tomas".to_string(),
            recipient_email: "tomas@example.lt".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_purchase_form_problems() {
        assert_eq!(form().problem(), None);
        assert_eq!(
            PurchaseForm { amount: 60, ..form() }.problem(),
            Some("giftCards.errors.invalidAmount")
        );
        assert_eq!(
            PurchaseForm {
                recipient_name: " ".to_string(),
                ..form()
            }
            .problem(),
            Some("giftCards.errors.missingFields")
        );
        assert_eq!(
            PurchaseForm {
                recipient_email: "tomas".to_string(),
                ..form()
            }
            .problem(),
            Some("giftCards.errors.invalidEmail")
        );
    }

    #[test]
    fn test_purchase_form_parses_card_type() {
        let form: PurchaseForm = serde_json::from_value(serde_json::json!({
            "amount": 100,
            "card_type": "physical",
            "purchaser_name": "Jonas",
            "purchaser_email": "jonas@example.lt",
            "recipient_name": "Tomas",
            "recipient_email": "tomas@example.lt"
        }))
        .unwrap();
        assert_eq!(form.card_type, GiftCardType::Physical);
        assert_eq!(form.problem(), None);
    }
}
