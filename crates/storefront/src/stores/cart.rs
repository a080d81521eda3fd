//! Retail shopping cart.

use std::num::NonZeroU32;

use delegends_core::{Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;

use crate::api::Product;
use crate::models::session_keys;

/// Cart operation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities are at least one; use `remove` to drop a line.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    pub image_url: Option<String>,
    pub price: Money,
    pub category: Option<String>,
    pub quantity: NonZeroU32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity.get()
    }
}

/// The visitor's retail cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCart {
    items: Vec<CartItem>,
}

impl ShoppingCart {
    /// Load the cart from the session (empty when absent).
    pub async fn load(session: &Session) -> Self {
        super::load_or_default(session, session_keys::CART).await
    }

    /// Persist the cart to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        super::store(session, session_keys::CART, self).await
    }

    /// Remove the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_persisted(session: &Session) -> Result<(), tower_sessions::session::Error> {
        super::remove_key(session, session_keys::CART).await
    }

    /// Add a product. A product already in the cart has its quantity raised.
    pub fn add(&mut self, product: &Product, quantity: NonZeroU32) {
        if let Some(item) = self.find_mut(&product.id) {
            item.quantity = item.quantity.saturating_add(quantity.get());
            return;
        }

        self.items.push(CartItem {
            product_id: product.id.clone(),
            title: product.title.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            category: product.category.clone(),
            quantity,
        });
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for zero and
    /// `CartError::NotInCart` for an unknown product.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        let quantity = NonZeroU32::new(quantity).ok_or(CartError::InvalidQuantity)?;
        let item = self
            .find_mut(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Step a line's quantity up or down. A step that would go below one is
    /// ignored and the line stays as it was.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` for an unknown product.
    pub fn adjust(&mut self, product_id: &ProductId, delta: i32) -> Result<(), CartError> {
        let item = self
            .find_mut(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;

        let next = i64::from(item.quantity.get()) + i64::from(delta);
        if let Some(quantity) = u32::try_from(next).ok().and_then(NonZeroU32::new) {
            item.quantity = quantity;
        }
        Ok(())
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    /// Empty the in-memory cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity.get()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stores::test_session;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: String::new(),
            price: Money::from_cents(cents),
            image_url: None,
            category: Some("beards".to_string()),
            stock: None,
        }
    }

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_add_existing_product_increments_quantity() {
        let mut cart = ShoppingCart::default();
        cart.add(&product("p1", 1500), qty(1));
        cart.add(&product("p1", 1500), qty(2));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity.get(), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_and_count() {
        let mut cart = ShoppingCart::default();
        cart.add(&product("p1", 1500), qty(2));
        cart.add(&product("p2", 999), qty(1));

        assert_eq!(cart.total(), Money::from_cents(3999));
        assert_eq!(cart.item_count(), 3);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_set_quantity_rejects_zero() {
        let mut cart = ShoppingCart::default();
        cart.add(&product("p1", 1500), qty(2));

        assert_eq!(
            cart.set_quantity(&ProductId::new("p1"), 0),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(cart.items()[0].quantity.get(), 2);

        cart.set_quantity(&ProductId::new("p1"), 5).unwrap();
        assert_eq!(cart.items()[0].quantity.get(), 5);
    }

    #[test]
    fn test_set_quantity_unknown_product() {
        let mut cart = ShoppingCart::default();
        assert!(matches!(
            cart.set_quantity(&ProductId::new("nope"), 1),
            Err(CartError::NotInCart(_))
        ));
    }

    #[test]
    fn test_adjust_never_drops_below_one() {
        let mut cart = ShoppingCart::default();
        cart.add(&product("p1", 1500), qty(1));

        cart.adjust(&ProductId::new("p1"), -1).unwrap();
        assert_eq!(cart.items()[0].quantity.get(), 1);

        cart.adjust(&ProductId::new("p1"), 1).unwrap();
        assert_eq!(cart.items()[0].quantity.get(), 2);
    }

    #[test]
    fn test_remove() {
        let mut cart = ShoppingCart::default();
        cart.add(&product("p1", 1500), qty(1));
        assert!(cart.remove(&ProductId::new("p1")));
        assert!(!cart.remove(&ProductId::new("p1")));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_persistence_round_trip_and_clear() {
        let session = test_session();
        let mut cart = ShoppingCart::default();
        cart.add(&product("p1", 1500), qty(2));
        cart.save(&session).await.unwrap();

        let loaded = ShoppingCart::load(&session).await;
        assert_eq!(loaded, cart);

        ShoppingCart::clear_persisted(&session).await.unwrap();
        assert!(
            session
                .get::<serde_json::Value>(session_keys::CART)
                .await
                .unwrap()
                .is_none()
        );
        assert!(ShoppingCart::load(&session).await.is_empty());
    }
}
