//! Salons, services, barbers, products and reviews.

use delegends_core::ProductId;
use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{Barber, NewReview, Product, Review, Salon, Service};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List all salons.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_salons(&self) -> Result<Vec<Salon>, ApiError> {
        self.get("/salons", None).await
    }

    /// List bookable services (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        if let Some(CacheValue::Services(services)) = self.inner.cache.get(&CacheKey::Services).await
        {
            debug!("Cache hit for services");
            return Ok(services);
        }

        let services: Vec<Service> = self.get("/services", None).await?;
        self.inner
            .cache
            .insert(CacheKey::Services, CacheValue::Services(services.clone()))
            .await;
        Ok(services)
    }

    /// List barbers (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_barbers(&self) -> Result<Vec<Barber>, ApiError> {
        if let Some(CacheValue::Barbers(barbers)) = self.inner.cache.get(&CacheKey::Barbers).await {
            debug!("Cache hit for barbers");
            return Ok(barbers);
        }

        let barbers: Vec<Barber> = self.get("/barbers", None).await?;
        self.inner
            .cache
            .insert(CacheKey::Barbers, CacheValue::Barbers(barbers.clone()))
            .await;
        Ok(barbers)
    }

    /// List retail products (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get("/products", None).await?;
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Get a product by id (cached).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .get(&format!("/products/{}", urlencoding::encode(id.as_str())), None)
            .await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List approved reviews (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn approved_reviews(&self) -> Result<Vec<Review>, ApiError> {
        if let Some(CacheValue::Reviews(reviews)) =
            self.inner.cache.get(&CacheKey::ApprovedReviews).await
        {
            debug!("Cache hit for reviews");
            return Ok(reviews);
        }

        let reviews: Vec<Review> = self.get("/reviews/approved", None).await?;
        self.inner
            .cache
            .insert(CacheKey::ApprovedReviews, CacheValue::Reviews(reviews.clone()))
            .await;
        Ok(reviews)
    }

    /// Submit a review for a completed booking. It appears after moderation.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, review), fields(booking_id = %review.booking_id))]
    pub async fn create_review(
        &self,
        token: &str,
        review: &NewReview<'_>,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::POST, "/reviews", review, Some(token))
            .await
    }

    /// Reviews written by the signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn my_reviews(&self, token: &str) -> Result<Vec<Review>, ApiError> {
        self.get("/reviews/my-reviews", Some(token)).await
    }
}
