//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Durable store settings.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding the stored cart and session
    #[arg(long, env = "SOLECART_DATA_DIR", default_value = ".solecart", global = true)]
    pub data_dir: PathBuf,

    /// Keep everything in memory for this run only
    #[arg(long, env = "SOLECART_EPHEMERAL", global = true)]
    pub ephemeral: bool,
}
