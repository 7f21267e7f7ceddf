use std::io;

use clap::{Parser, Subcommand};
use solecart_app::{config::ClientConfig, context::AppContext, observability};

mod auth;
mod cart;
mod products;

#[derive(Debug, Parser)]
#[command(name = "solecart", about = "Solecart storefront client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect and change the shopping cart
    Cart(cart::CartCommand),

    /// Sign in and out
    Auth(auth::AuthCommand),

    /// Browse the catalog
    Products(products::ProductsCommand),
}

impl Cli {
    /// Parses arguments, reading a `.env` file first if there is one.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_subscriber(&self.config.logging).map_err(|error| error.to_string())?;

        let context = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Auth(command) => auth::run(&context, command).await,
            Commands::Products(command) => products::run(&context, command).await,
        }
    }
}

pub(crate) fn output_error(error: io::Error) -> String {
    format!("failed to write output: {error}")
}
