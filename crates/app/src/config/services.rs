//! Service Config

use std::time::Duration;

use clap::Args;

/// Base URLs of the storefront services.
#[derive(Debug, Clone, Args)]
pub struct ServicesConfig {
    /// Products service base URL
    #[arg(long, env = "PRODUCTS_URL", default_value = "http://localhost:8001", global = true)]
    pub products_url: String,

    /// Cart and orders service base URL
    #[arg(long, env = "CART_URL", default_value = "http://localhost:8002", global = true)]
    pub cart_url: String,

    /// Recommendation service base URL
    #[arg(
        long,
        env = "RECOMMENDATIONS_URL",
        default_value = "http://localhost:8003/api",
        global = true
    )]
    pub recommendations_url: String,

    /// Auth service base URL
    #[arg(long, env = "AUTH_URL", default_value = "http://localhost:8004/api", global = true)]
    pub auth_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 10, global = true)]
    pub request_timeout_seconds: u64,
}

impl ServicesConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
