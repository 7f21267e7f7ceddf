//! Cart
//!
//! The cart is an immutable snapshot. Every action is applied through
//! [`Cart::apply`], which returns a complete replacement whose aggregates are
//! recomputed from the full item list.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::{CartItem, NewCartItem},
    pricing::{self, PriceError},
    variants::VariantKey,
};

/// Errors raised when an action cannot be applied to a cart.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Items must be added in quantities of at least one.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// The resulting quantity does not fit the quantity type.
    #[error("quantity for {0} is too large")]
    QuantityOverflow(VariantKey),

    /// Price validation or arithmetic failed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add units of a product variant, accumulating onto an existing line.
    Add {
        /// What to add
        item: NewCartItem,
        /// How many units, at least one
        quantity: u32,
    },

    /// Remove a line; absent keys are ignored.
    Remove(VariantKey),

    /// Set the quantity of a line; zero or below removes it.
    UpdateQuantity {
        /// Line to update
        key: VariantKey,
        /// New quantity
        quantity: i64,
    },

    /// Drop every line.
    Clear,

    /// Replace every line wholesale.
    Replace(Vec<CartItem>),
}

/// Cart snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CartRecord")]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(rename = "totalItems")]
    total_items: u64,
    #[serde(rename = "totalPrice", with = "rust_decimal::serde::float")]
    total_price: Decimal,
}

/// Cart as read from outside the reducer. Its aggregates are ignored.
#[derive(Debug, Deserialize)]
struct CartRecord {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl TryFrom<CartRecord> for Cart {
    type Error = CartError;

    fn try_from(record: CartRecord) -> Result<Self, Self::Error> {
        Cart::from_items(record.items)
    }
}

impl Cart {
    /// An empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from lines of unknown provenance.
    ///
    /// Keys and line totals are re-derived, lines with a zero quantity are
    /// dropped and lines sharing a key are merged, keeping the first price.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line has an invalid price or the merged
    /// quantities overflow.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Result<Self, CartError> {
        let mut merged: Vec<CartItem> = Vec::new();
        let mut positions: FxHashMap<VariantKey, usize> = FxHashMap::default();

        for item in items {
            if item.quantity() == 0 {
                continue;
            }

            let item = item.normalized()?;

            match positions.get(item.key()).and_then(|&i| merged.get_mut(i)) {
                Some(existing) => {
                    *existing = accumulate(existing, item.quantity())?;
                }
                None => {
                    positions.insert(item.key().clone(), merged.len());
                    merged.push(item);
                }
            }
        }

        Self::with_items(merged)
    }

    /// Applies an action, returning the resulting snapshot.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: an add with a quantity of zero.
    /// - [`CartError::QuantityOverflow`]: a quantity outgrew `u32`.
    /// - [`CartError::Price`]: price validation or arithmetic failed.
    pub fn apply(&self, action: CartAction) -> Result<Self, CartError> {
        match action {
            CartAction::Add { item, quantity } => self.add(item, quantity),
            CartAction::Remove(key) => self.remove(&key),
            CartAction::UpdateQuantity { key, quantity } => self.update_quantity(&key, quantity),
            CartAction::Clear => Ok(Self::new()),
            CartAction::Replace(items) => Self::from_items(items),
        }
    }

    fn add(&self, item: NewCartItem, quantity: u32) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }

        let key = item.key();
        let mut items = self.items.clone();

        match items.iter_mut().find(|existing| *existing.key() == key) {
            Some(existing) => *existing = accumulate(existing, quantity)?,
            None => items.push(CartItem::new(item, quantity)?),
        }

        Self::with_items(items)
    }

    fn remove(&self, key: &VariantKey) -> Result<Self, CartError> {
        if self.get(key).is_none() {
            return Ok(self.clone());
        }

        let items: Vec<CartItem> = self
            .items
            .iter()
            .filter(|item| item.key() != key)
            .cloned()
            .collect();

        Self::with_items(items)
    }

    fn update_quantity(&self, key: &VariantKey, quantity: i64) -> Result<Self, CartError> {
        if quantity <= 0 {
            return self.remove(key);
        }

        let quantity =
            u32::try_from(quantity).map_err(|_err| CartError::QuantityOverflow(key.clone()))?;

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.key() == key {
                    item.with_quantity(quantity)
                } else {
                    Ok(item.clone())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::with_items(items)
    }

    fn with_items(items: Vec<CartItem>) -> Result<Self, CartError> {
        let total_items = items.iter().map(|item| u64::from(item.quantity())).sum();
        let total_price = pricing::sum(items.iter().map(CartItem::line_total))?;

        Ok(Self {
            items,
            total_items,
            total_price,
        })
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Looks up a line by key.
    pub fn get(&self, key: &VariantKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Sum of all quantities.
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Sum of all line totals.
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn accumulate(existing: &CartItem, quantity: u32) -> Result<CartItem, CartError> {
    let total = existing
        .quantity()
        .checked_add(quantity)
        .ok_or_else(|| CartError::QuantityOverflow(existing.key().clone()))?;

    Ok(existing.with_quantity(total)?)
}
