//! Clients for the storefront's remote services

pub mod auth_api;
pub mod catalog;
mod errors;
mod http;
pub mod remote_cart;

pub use auth_api::{AuthApi, AuthResponse, HttpAuthApi, NewAccount, UserProfile};
pub use catalog::{Collection, HttpProductCatalog, ProductCatalog};
pub use errors::ServiceError;
pub use http::{HttpService, build_client};
pub use remote_cart::{HttpRemoteCartService, RemoteCart, RemoteCartService, Transaction};
