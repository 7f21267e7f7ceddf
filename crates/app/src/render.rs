//! Terminal rendering for carts, products and orders.

use std::io;

use solecart::{pricing::format_price, products::Product};
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{carts::CartView, services::Transaction};

/// Writes the cart as a table followed by its totals.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_cart(out: &mut impl io::Write, view: &CartView) -> io::Result<()> {
    if let Some(error) = &view.error {
        writeln!(out, "error: {error}")?;
    }

    if view.order_placed {
        match &view.order_id {
            Some(order_id) => writeln!(out, "order placed: {order_id}")?,
            None => writeln!(out, "order placed")?,
        }
    }

    let cart = &view.cart;

    if cart.is_empty() {
        return writeln!(out, "Your cart is empty");
    }

    let mut builder = Builder::default();
    builder.push_record(["Key", "Item", "Size", "Color", "Qty", "Price", "Total"]);

    for item in cart.items() {
        builder.push_record([
            item.key().to_string(),
            item.name().to_string(),
            item.size().unwrap_or("-").to_string(),
            item.color().unwrap_or("-").to_string(),
            item.quantity().to_string(),
            format_price(item.unit_price()),
            format_price(item.line_total()),
        ]);
    }

    writeln!(out, "{}", finish(builder, 4..7))?;
    writeln!(out, "Items: {}", cart.total_items())?;
    writeln!(out, "Total: {}", format_price(cart.total_price()))
}

/// Writes products as a table.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_products(out: &mut impl io::Write, products: &[Product]) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products found");
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Brand", "Category", "Price", "Sizes", "Colors"]);

    for product in products {
        let price = match product.discount_price {
            Some(discounted) if discounted < product.price => {
                format!("{} (was {})", format_price(discounted), format_price(product.price))
            }
            _ => format_price(product.price),
        };

        builder.push_record([
            product.product_id.to_string(),
            product.name.clone(),
            product.brand.clone(),
            product.main_category.clone(),
            price,
            product.sizes.join(", "),
            product.colors.join(", "),
        ]);
    }

    writeln!(out, "{}", finish(builder, 4..5))
}

/// Writes order history as a table.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_transactions(out: &mut impl io::Write, transactions: &[Transaction]) -> io::Result<()> {
    if transactions.is_empty() {
        return writeln!(out, "No orders found");
    }

    let mut builder = Builder::default();
    builder.push_record(["Order", "Placed", "Lines", "Payment", "Total"]);

    for transaction in transactions {
        builder.push_record([
            transaction
                .order_id
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            transaction.created_at.clone(),
            transaction.lines.len().to_string(),
            format!("{:?}", transaction.payment_method),
            format_price(transaction.total_cost),
        ]);
    }

    writeln!(out, "{}", finish(builder, 4..5))
}

fn finish(builder: Builder, numeric: std::ops::Range<usize>) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(numeric), Alignment::right());

    table
}
