//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::ProductId;

/// Catalog product as served by the products service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub product_id: ProductId,

    /// Document identifier assigned by the catalog store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Product name
    pub name: String,

    /// Product price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Reduced price while on sale
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount_price: Option<Decimal>,

    /// Long-form description
    #[serde(default)]
    pub description: String,

    /// Primary image, when the service sends one separately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Gallery images
    #[serde(default)]
    pub images: Vec<String>,

    /// Available sizes
    #[serde(default)]
    pub sizes: Vec<String>,

    /// Available colors
    #[serde(default)]
    pub colors: Vec<String>,

    /// Top-level category, e.g. `men`
    #[serde(default)]
    pub main_category: String,

    /// Second-level category, e.g. `trainers`
    #[serde(default)]
    pub sub_category: String,

    /// Brand name
    #[serde(default)]
    pub brand: String,

    /// Average rating
    #[serde(default)]
    pub ratings: f64,

    /// Number of reviews
    #[serde(default)]
    pub review_count: u32,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,

    /// Marketing bullet points
    #[serde(default)]
    pub features: Vec<String>,
}

impl Product {
    /// Creates a product with only the fields a cart needs.
    pub fn new(product_id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            product_id,
            id: None,
            name: name.into(),
            price,
            discount_price: None,
            description: String::new(),
            image: None,
            images: Vec::new(),
            sizes: Vec::new(),
            colors: Vec::new(),
            main_category: String::new(),
            sub_category: String::new(),
            brand: String::new(),
            ratings: 0.0,
            review_count: 0,
            stock: 0,
            features: Vec::new(),
        }
    }

    /// The image shown for this product in a cart: the primary image,
    /// otherwise the first gallery image.
    pub fn thumbnail(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}
