//! Payment flows.
//!
//! Three flows, none of which touch card data on this server:
//!
//! - Product orders go to a hosted checkout page (`POST /checkout`).
//! - Unpaid account bookings go to a hosted payment session, which sends
//!   the customer back to `/bookings?payment=success&booking_id=…`.
//! - Guest bookings paid by card save the card with a setup intent that the
//!   browser confirms with Stripe.js before the booking is created.

use delegends_core::{BookingId, Email, Money};
use serde::Deserialize;
use thiserror::Error;

use crate::api::{CheckoutItem, GiftCardType, OrderCustomer, RedirectUrl};
use crate::catalog::PHYSICAL_CARD_SHIPPING_EUROS;
use crate::stores::ShoppingCart;

/// Payment flow errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please fill in all required fields")]
    MissingCustomerInfo,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// The backend answered without a hosted page to send the customer to.
    #[error("Payment provider did not return a redirect URL")]
    MissingRedirect,
}

impl PaymentError {
    /// Translation key for the inline message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::EmptyCart => "checkout.errors.emptyCart",
            Self::MissingCustomerInfo => "checkout.errors.missingCustomerInfo",
            Self::InvalidEmail => "checkout.errors.invalidEmail",
            Self::MissingRedirect => "checkout.errors.paymentUnavailable",
        }
    }
}

/// Checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl CheckoutForm {
    /// Validate and normalize the customer details.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank or the email is malformed.
    pub fn validate(&self) -> Result<OrderCustomer, PaymentError> {
        let customer = OrderCustomer {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        };

        if [&customer.name, &customer.email, &customer.phone, &customer.address]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(PaymentError::MissingCustomerInfo);
        }
        Email::parse(&customer.email).map_err(|_| PaymentError::InvalidEmail)?;

        Ok(customer)
    }
}

/// Cart lines as the checkout endpoint expects them.
///
/// # Errors
///
/// Returns `PaymentError::EmptyCart` for an empty cart.
pub fn checkout_items(cart: &ShoppingCart) -> Result<Vec<CheckoutItem<'_>>, PaymentError> {
    if cart.is_empty() {
        return Err(PaymentError::EmptyCart);
    }

    Ok(cart
        .items()
        .iter()
        .map(|item| CheckoutItem {
            id: &item.product_id,
            title: &item.title,
            price: item.price,
            quantity: item.quantity.get(),
            image_url: item.image_url.as_deref(),
        })
        .collect())
}

/// The hosted page to redirect to.
///
/// # Errors
///
/// Returns `PaymentError::MissingRedirect` when no usable URL was returned.
pub fn hosted_redirect(response: RedirectUrl) -> Result<String, PaymentError> {
    response
        .url
        .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
        .ok_or(PaymentError::MissingRedirect)
}

/// Query string of `/bookings` after a hosted booking payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentReturnQuery {
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
}

/// Outcome of a hosted booking payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReturn {
    /// Paid; the booking should be marked paid.
    Success(BookingId),
    Cancelled,
}

impl PaymentReturnQuery {
    /// Interpret the return parameters. `None` for a plain page visit.
    #[must_use]
    pub fn outcome(&self) -> Option<PaymentReturn> {
        match (self.payment.as_deref(), &self.booking_id) {
            (Some("success"), Some(id)) if !id.as_str().is_empty() => {
                Some(PaymentReturn::Success(id.clone()))
            }
            (Some("cancelled"), _) => Some(PaymentReturn::Cancelled),
            _ => None,
        }
    }
}

/// What the purchaser pays for a gift card: physical cards add postage.
#[must_use]
pub fn gift_card_total(amount: Money, card_type: GiftCardType) -> Money {
    match card_type {
        GiftCardType::Virtual => amount,
        GiftCardType::Physical => amount + Money::from_major(PHYSICAL_CARD_SHIPPING_EUROS),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use delegends_core::ProductId;

    use super::*;
    use crate::api::Product;

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Jonas".to_string(),
            email: " jonas@example.lt ".to_string(),
            phone: "+37060000000".to_string(),
            address: "Pilies g. 1, Vilnius".to_string(),
        }
    }

    #[test]
    fn test_checkout_form_validation() {
        let customer = form().validate().unwrap();
        assert_eq!(customer.email, "jonas@example.lt");

        let missing = CheckoutForm {
            address: "  ".to_string(),
            ..form()
        };
        assert_eq!(missing.validate().unwrap_err(), PaymentError::MissingCustomerInfo);

        let bad_email = CheckoutForm {
            email: "jonas".to_string(),
            ..form()
        };
        assert_eq!(bad_email.validate().unwrap_err(), PaymentError::InvalidEmail);
    }

    #[test]
    fn test_checkout_items() {
        let mut cart = ShoppingCart::default();
        assert_eq!(checkout_items(&cart).unwrap_err(), PaymentError::EmptyCart);

        cart.add(
            &Product {
                id: ProductId::new("p1"),
                title: "Beard oil".to_string(),
                description: String::new(),
                price: Money::from_cents(1999),
                image_url: Some("https://cdn.example/oil.jpg".to_string()),
                category: None,
                stock: Some(3),
            },
            NonZeroU32::new(2).unwrap(),
        );
        let items = checkout_items(&cart).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);

        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json[0]["_id"], "p1");
        assert_eq!(json[0]["imageUrl"], "https://cdn.example/oil.jpg");
    }

    #[test]
    fn test_hosted_redirect() {
        assert_eq!(
            hosted_redirect(RedirectUrl {
                url: Some("https://checkout.stripe.com/c/pay/cs_test".to_string())
            }),
            Ok("https://checkout.stripe.com/c/pay/cs_test".to_string())
        );
        assert_eq!(
            hosted_redirect(RedirectUrl { url: None }),
            Err(PaymentError::MissingRedirect)
        );
        assert_eq!(
            hosted_redirect(RedirectUrl {
                url: Some("javascript:alert(1)".to_string())
            }),
            Err(PaymentError::MissingRedirect)
        );
    }

    #[test]
    fn test_payment_return_outcome() {
        let success = PaymentReturnQuery {
            payment: Some("success".to_string()),
            booking_id: Some(BookingId::new("b1")),
        };
        assert_eq!(success.outcome(), Some(PaymentReturn::Success(BookingId::new("b1"))));

        let no_id = PaymentReturnQuery {
            payment: Some("success".to_string()),
            booking_id: None,
        };
        assert_eq!(no_id.outcome(), None);

        let cancelled = PaymentReturnQuery {
            payment: Some("cancelled".to_string()),
            booking_id: None,
        };
        assert_eq!(cancelled.outcome(), Some(PaymentReturn::Cancelled));
        assert_eq!(PaymentReturnQuery::default().outcome(), None);
    }

    #[test]
    fn test_gift_card_total() {
        let fifty = Money::from_major(50);
        assert_eq!(gift_card_total(fifty, GiftCardType::Virtual), fifty);
        assert_eq!(gift_card_total(fifty, GiftCardType::Physical), Money::from_major(55));
    }
}
