//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::{
    carts::CartStateManager,
    config::ClientConfig,
    services::{
        HttpAuthApi, HttpProductCatalog, HttpRemoteCartService, HttpService, ProductCatalog,
        RemoteCartService, ServiceError, build_client,
    },
    session::AuthSession,
    storage::{DurableStore, FileStore, MemoryStore, StoreError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] ServiceError),

    #[error("failed to open store: {0}")]
    Store(#[source] StoreError),
}

/// Everything a front-end needs, wired together once per session.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn ProductCatalog>,
    pub remote_cart: Arc<dyn RemoteCartService>,
    pub session: Arc<AuthSession>,
    pub cart: Arc<CartStateManager>,
}

impl AppContext {
    /// Build application context from configuration, restoring the stored
    /// session and cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built or the store
    /// directory cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AppInitError> {
        let http = build_client(config.services.request_timeout()).map_err(AppInitError::HttpClient)?;

        let store: Arc<dyn DurableStore> = if config.storage.ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::open(&config.storage.data_dir).map_err(AppInitError::Store)?)
        };

        let services = &config.services;

        let catalog = HttpProductCatalog::new(
            HttpService::new("products", &services.products_url, http.clone()),
            HttpService::new("recommendations", &services.recommendations_url, http.clone()),
        );
        let remote_cart: Arc<dyn RemoteCartService> = Arc::new(HttpRemoteCartService::new(
            HttpService::new("cart", &services.cart_url, http.clone()),
        ));
        let auth_api = HttpAuthApi::new(HttpService::new("auth", &services.auth_url, http));

        let session = Arc::new(AuthSession::new(store.clone(), Arc::new(auth_api)));

        if let Err(error) = session.restore() {
            warn!(%error, "failed to restore session, continuing signed out");
        }

        let cart = Arc::new(CartStateManager::new(store, remote_cart.clone(), session.clone()));
        cart.restore();

        Ok(Self {
            catalog: Arc::new(catalog),
            remote_cart,
            session,
            cart,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use solecart::cart::Cart;
    use testresult::TestResult;

    use super::*;
    use crate::{
        carts::{CART_KEY, Lifecycle},
        session::{AuthSessionProvider, AuthState},
    };

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        config: ClientConfig,
    }

    #[test]
    fn context_restores_from_data_dir() -> TestResult {
        let dir = tempfile::tempdir()?;
        FileStore::open(dir.path())?.set(CART_KEY, &serde_json::to_string(&Cart::new())?)?;

        let data_dir = dir.path().to_string_lossy().to_string();
        let Harness { config } = Harness::try_parse_from(["solecart", "--data-dir", &data_dir])?;

        let context = AppContext::from_config(&config)?;

        assert_eq!(context.cart.snapshot().lifecycle, Lifecycle::Ready);
        assert_eq!(context.session.current(), AuthState::SignedOut);

        Ok(())
    }
}
