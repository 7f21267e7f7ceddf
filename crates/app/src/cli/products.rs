use std::io::{self, Write};

use clap::{Args, Subcommand};
use solecart::{ids::ProductId, pricing::format_price};
use solecart_app::{context::AppContext, render, services::Collection};

use crate::cli::output_error;

#[derive(Debug, Args)]
pub(crate) struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductsSubcommand {
    /// Show one product
    Get {
        /// Product identifier
        product_id: String,
    },

    /// List every product
    List,

    /// List products in a category
    Category {
        /// Category name, e.g. `men`
        name: String,
    },

    /// Search products by keyword, or by meaning with `--semantic`
    Search {
        /// Search text
        query: String,

        /// Rank by semantic similarity
        #[arg(long)]
        semantic: bool,

        /// Number of semantic matches
        #[arg(long, default_value_t = 5)]
        top_k: u32,
    },

    /// Show a curated listing
    Collection {
        #[arg(value_enum)]
        collection: Collection,
    },

    /// Top products in each category
    Recommend,
}

pub(crate) async fn run(context: &AppContext, command: ProductsCommand) -> Result<(), String> {
    let catalog = &context.catalog;

    let products = match command.command {
        ProductsSubcommand::Get { product_id } => {
            let product = catalog
                .get_product(&ProductId::new(product_id.as_str()))
                .await
                .map_err(|error| format!("failed to fetch product: {error}"))?;

            return write_product_detail(&product).map_err(output_error);
        }
        ProductsSubcommand::List => catalog.list_products().await,
        ProductsSubcommand::Category { name } => catalog.products_by_category(&name).await,
        ProductsSubcommand::Search {
            query,
            semantic: true,
            top_k,
        } => catalog.semantic_search(&query, top_k).await,
        ProductsSubcommand::Search { query, .. } => catalog.search(&query).await,
        ProductsSubcommand::Collection { collection } => catalog.collection(collection).await,
        ProductsSubcommand::Recommend => {
            let grouped = catalog
                .recommendations()
                .await
                .map_err(|error| format!("failed to fetch recommendations: {error}"))?;

            let mut out = io::stdout().lock();

            for (category, products) in grouped {
                writeln!(out, "{category}").map_err(output_error)?;
                render::write_products(&mut out, &products).map_err(output_error)?;
            }

            return Ok(());
        }
    }
    .map_err(|error| format!("failed to fetch products: {error}"))?;

    render::write_products(&mut io::stdout().lock(), &products).map_err(output_error)
}

fn write_product_detail(product: &solecart::products::Product) -> io::Result<()> {
    let mut out = io::stdout().lock();

    writeln!(out, "{} ({})", product.name, product.product_id)?;
    writeln!(out, "price: {}", format_price(product.price))?;

    if let Some(discounted) = product.discount_price {
        writeln!(out, "sale price: {}", format_price(discounted))?;
    }

    if !product.brand.is_empty() {
        writeln!(out, "brand: {}", product.brand)?;
    }

    writeln!(out, "sizes: {}", product.sizes.join(", "))?;
    writeln!(out, "colors: {}", product.colors.join(", "))?;
    writeln!(out, "in stock: {}", product.stock)?;

    if !product.description.is_empty() {
        writeln!(out, "\n{}", product.description)?;
    }

    Ok(())
}
