//! Storefront client: the cart state manager, its collaborators and the
//! wiring between them.

pub mod carts;
pub mod config;
pub mod context;
pub mod observability;
pub mod render;
pub mod services;
pub mod session;
pub mod storage;
