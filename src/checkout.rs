//! Checkout
//!
//! Builds the order payload submitted to the cart service. Names and images
//! are not part of an order line; the service only records what was bought
//! and at which price.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    ids::{ProductId, UserId},
    items::CartItem,
    pricing::{self, PriceError},
};

/// Errors raised while building an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// An order needs at least one line.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Price arithmetic failed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment
    #[default]
    CreditCard,

    /// PayPal
    Paypal,

    /// Cash on delivery
    Cod,
}

/// Delivery speed chosen at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Three to five working days, free.
    #[default]
    Standard,

    /// Next working day.
    Express,
}

impl ShippingMethod {
    /// Delivery charge for this method.
    pub fn cost(self) -> Decimal {
        match self {
            ShippingMethod::Standard => Decimal::ZERO,
            ShippingMethod::Express => Decimal::new(9_99, 2),
        }
    }
}

/// Where the order is delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Street address
    pub address: String,
    /// Town or city
    pub city: String,
    /// County or state
    pub state: String,
    /// Postcode
    pub postal_code: String,
    /// Country
    pub country: String,
}

/// Shipping and payment fields collected by the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDetails {
    /// Delivery address
    pub shipping_address: ShippingAddress,
    /// Delivery speed
    pub shipping_method: ShippingMethod,
    /// Payment method
    pub payment_method: PaymentMethod,
}

/// A purchased line as recorded by the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product identifier
    pub product_id: ProductId,
    /// Unit price paid
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Units bought
    pub quantity: u32,
    /// Selected size
    pub size: Option<String>,
    /// Selected color
    pub color: Option<String>,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id().clone(),
            price: item.unit_price(),
            quantity: item.quantity(),
            size: item.size().map(str::to_string),
            color: item.color().map(str::to_string),
        }
    }
}

/// The payload of a checkout call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOrder {
    /// Buyer
    pub user_id: UserId,
    /// Purchased lines
    #[serde(rename = "product_cart")]
    pub lines: Vec<OrderLine>,
    /// Sum of line totals
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Delivery address
    pub shipping_address: ShippingAddress,
    /// Delivery charge
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_cost: Decimal,
    /// `total_amount + shipping_cost`
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    /// Payment method
    pub payment_method: PaymentMethod,
    /// When the order was built
    pub created_at: Timestamp,
}

impl CheckoutOrder {
    /// Builds an order from a cart snapshot.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart has no lines.
    /// - [`OrderError::Price`]: the total cost overflowed.
    pub fn from_cart(
        cart: &Cart,
        user_id: UserId,
        details: CheckoutDetails,
        created_at: Timestamp,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let shipping_cost = details.shipping_method.cost();
        let total_cost = pricing::sum([cart.total_price(), shipping_cost])?;

        Ok(Self {
            user_id,
            lines: cart.items().iter().map(OrderLine::from).collect(),
            total_amount: cart.total_price(),
            shipping_address: details.shipping_address,
            shipping_cost,
            total_cost,
            payment_method: details.payment_method,
            created_at,
        })
    }
}
