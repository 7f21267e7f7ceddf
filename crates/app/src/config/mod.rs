//! Client configuration

use clap::Args;

mod logging;
mod services;
mod storage;

pub use logging::{LogFormat, LoggingConfig};
pub use services::ServicesConfig;
pub use storage::StorageConfig;

/// Settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Remote service locations.
    #[command(flatten)]
    pub services: ServicesConfig,

    /// Where carts and sessions are kept between runs.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
