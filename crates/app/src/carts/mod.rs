//! Carts

mod errors;
mod manager;
mod models;

pub use errors::*;
pub use manager::*;
pub use models::*;
