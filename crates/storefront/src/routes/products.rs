//! Product listing and detail pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use delegends_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use crate::api::Product;
use crate::catalog::PRODUCT_CATEGORIES;
use crate::error::Result;
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;

/// Category filter chip.
#[derive(Debug, Clone)]
pub struct CategoryChip {
    /// Query value; empty for "show all".
    pub value: &'static str,
    pub label: String,
    pub active: bool,
}

impl CategoryChip {
    /// Link to the filtered grid.
    #[must_use]
    pub fn href(&self) -> String {
        if self.value.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?category={}", urlencoding::encode(self.value))
        }
    }
}

/// Product listing query.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    pub category: Option<String>,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub page: PageContext,
    pub categories: Vec<CategoryChip>,
    pub products: Vec<Product>,
    /// The backend could not be reached.
    pub unavailable: bool,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: Product,
}

/// Keep products in `category`; no category (or an unknown one) keeps all.
fn filter_by_category(products: Vec<Product>, category: Option<&str>) -> Vec<Product> {
    let Some(category) = category.filter(|c| PRODUCT_CATEGORIES.iter().any(|(v, _)| v == c))
    else {
        return products;
    };
    products
        .into_iter()
        .filter(|p| p.category.as_deref() == Some(category))
        .collect()
}

/// Display the product grid.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
    page: PageContext,
) -> impl IntoResponse {
    let selected = query.category.as_deref().filter(|c| !c.is_empty());

    let (products, unavailable) = match state.api().list_products().await {
        Ok(products) => (filter_by_category(products, selected), false),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            (Vec::new(), true)
        }
    };

    let mut categories = vec![CategoryChip {
        value: "",
        label: page.t("productsPage.showAll"),
        active: selected.is_none(),
    }];
    categories.extend(PRODUCT_CATEGORIES.iter().map(|(value, key)| CategoryChip {
        value,
        label: page.t(key),
        active: selected == Some(*value),
    }));

    ProductsTemplate {
        page,
        categories,
        products,
        unavailable,
    }
}

/// Display one product.
///
/// # Errors
///
/// Returns 404 when the backend does not know the product.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let product = state.api().get_product(&id).await?;
    Ok(ProductShowTemplate { page, product })
}

#[cfg(test)]
mod tests {
    use delegends_core::Money;

    use super::*;

    fn product(id: &str, category: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            title: id.to_string(),
            description: String::new(),
            price: Money::from_major(10),
            image_url: None,
            category: category.map(String::from),
            stock: None,
        }
    }

    #[test]
    fn test_filter_by_category() {
        let products = vec![
            product("wax", Some("Hair care")),
            product("oil", Some("Beards")),
            product("misc", None),
        ];

        assert_eq!(filter_by_category(products.clone(), None).len(), 3);
        let beards = filter_by_category(products.clone(), Some("Beards"));
        assert_eq!(beards.len(), 1);
        assert_eq!(beards[0].id.as_str(), "oil");
        // Unknown categories show everything
        assert_eq!(filter_by_category(products, Some("Hats")).len(), 3);
    }
}
