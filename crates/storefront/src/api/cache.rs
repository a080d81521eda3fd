//! Cache types for public catalog responses.

use delegends_core::ProductId;

use super::types::{Barber, Job, Product, Review, Service};

/// Cache key for catalog reads. Nothing keyed by a customer is cached.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Services,
    Barbers,
    Products,
    Product(ProductId),
    ApprovedReviews,
    Jobs,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Services(Vec<Service>),
    Barbers(Vec<Barber>),
    Products(Vec<Product>),
    Product(Box<Product>),
    Reviews(Vec<Review>),
    Jobs(Vec<Job>),
}
