//! Items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    ids::ProductId,
    pricing::{self, PriceError},
    products::Product,
    variants::VariantKey,
};

/// One line of a cart.
///
/// The unit price is a snapshot taken when the line was created; the line
/// total is always derived from it and the quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    product_id: ProductId,
    #[serde(default)]
    key: VariantKey,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    unit_price: Decimal,
    quantity: u32,
    #[serde(default, rename = "totalPrice", with = "rust_decimal::serde::float")]
    line_total: Decimal,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

/// The data needed to create a cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    /// Product identifier
    pub product_id: ProductId,

    /// Product name at the time of adding
    pub name: String,

    /// Product image at the time of adding
    pub image: Option<String>,

    /// Unit price at the time of adding
    pub unit_price: Decimal,

    /// Selected size
    pub size: Option<String>,

    /// Selected color
    pub color: Option<String>,
}

impl NewCartItem {
    /// Snapshots a catalog product in the given size and color.
    pub fn from_product(product: &Product, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            image: product.thumbnail().map(str::to_string),
            unit_price: product.price,
            size: size.map(str::to_string),
            color: color.map(str::to_string),
        }
    }

    /// The variant key this line will be stored under.
    pub fn key(&self) -> VariantKey {
        VariantKey::new(&self.product_id, self.size.as_deref(), self.color.as_deref())
    }
}

impl CartItem {
    /// Creates a line for `quantity` units of `item`.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] for negative prices or if the line total
    /// overflows.
    pub fn new(item: NewCartItem, quantity: u32) -> Result<Self, PriceError> {
        let unit_price = pricing::validate_unit_price(item.unit_price)?;
        let key = item.key();

        Ok(Self {
            line_total: pricing::line_total(unit_price, quantity)?,
            product_id: item.product_id,
            key,
            name: item.name,
            image: item.image,
            unit_price,
            quantity,
            size: item.size,
            color: item.color,
        })
    }

    /// Returns this line with a new quantity, priced at the stored unit price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the line total overflows.
    pub fn with_quantity(&self, quantity: u32) -> Result<Self, PriceError> {
        Ok(Self {
            quantity,
            line_total: pricing::line_total(self.unit_price, quantity)?,
            ..self.clone()
        })
    }

    /// Re-derives the key and line total from the stored inputs.
    ///
    /// Used when reading lines from outside the reducer, where neither can be
    /// trusted.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] for negative prices or overflowing totals.
    pub fn normalized(self) -> Result<Self, PriceError> {
        let quantity = self.quantity;

        CartItem::new(
            NewCartItem {
                product_id: self.product_id,
                name: self.name,
                image: self.image,
                unit_price: self.unit_price,
                size: self.size,
                color: self.color,
            },
            quantity,
        )
    }

    /// Product identifier
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Variant key
    pub fn key(&self) -> &VariantKey {
        &self.key
    }

    /// Product name at the time of adding
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product image at the time of adding
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Unit price at the time of adding
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `quantity * unit_price`
    pub fn line_total(&self) -> Decimal {
        self.line_total
    }

    /// Selected size
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Selected color
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}
