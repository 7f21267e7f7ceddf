//! Prices

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Symbols stripped from textual prices before parsing.
const CURRENCY_SYMBOLS: [char; 3] = ['£', '$', '€'];

/// Errors that can occur while calculating or reading prices.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// A price was below zero.
    #[error("price {0} is negative")]
    Negative(Decimal),

    /// A multiplication or sum left the representable range.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// A textual price could not be read as a number.
    #[error("{0:?} is not a price")]
    Unparseable(String),
}

/// Checks that a unit price can be placed in a cart.
///
/// # Errors
///
/// Returns [`PriceError::Negative`] for prices below zero.
pub fn validate_unit_price(price: Decimal) -> Result<Decimal, PriceError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(PriceError::Negative(price));
    }

    Ok(price)
}

/// Calculates `quantity * unit_price`.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the product is not representable.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Result<Decimal, PriceError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(PriceError::Overflow)
}

/// Sums a sequence of amounts.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the sum is not representable.
pub fn sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, PriceError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or(PriceError::Overflow)
}

/// Rounds to whole pence, halves away from zero.
pub fn round_to_pence(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount for display, e.g. `£29.99`.
pub fn format_price(amount: Decimal) -> String {
    Money::from_decimal(round_to_pence(amount), iso::GBP).to_string()
}

/// Formats an amount with two decimal places and no symbol, e.g. `29.99`.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_to_pence(amount))
}

/// Reads a price that may carry a currency symbol, such as `"£29.99"`.
///
/// # Errors
///
/// Returns [`PriceError::Unparseable`] if what remains is not a number.
pub fn parse_price(text: &str) -> Result<Decimal, PriceError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c))
        .collect();

    cleaned
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| PriceError::Unparseable(text.to_string()))
}
