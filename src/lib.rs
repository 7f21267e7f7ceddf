//! Solecart
//!
//! Solecart is the cart domain of a shoe and apparel storefront: variant
//! keyed cart lines, an immutable cart reducer that keeps its aggregates in
//! step with its lines, price helpers and checkout order construction.

pub mod cart;
pub mod checkout;
pub mod ids;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod variants;
