use std::io;

use clap::{Args, Subcommand, ValueEnum};
use solecart::{
    checkout::{CheckoutDetails, PaymentMethod, ShippingAddress, ShippingMethod},
    ids::ProductId,
    pricing::format_price,
    variants::VariantKey,
};
use solecart_app::{
    carts::PushOutcome,
    context::AppContext,
    render,
    session::AuthSessionProvider,
};

use crate::cli::output_error;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,

    /// Add a product to the cart
    Add(AddArgs),

    /// Remove a line by its key
    Remove {
        /// Line key, as shown by `cart show`
        key: String,
    },

    /// Set the quantity of a line; zero or below removes it
    Update {
        /// Line key, as shown by `cart show`
        key: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Empty the cart
    Clear {
        /// Leave the cart saved to your account alone
        #[arg(long)]
        local_only: bool,
    },

    /// Place an order for everything in the cart
    Checkout(CheckoutArgs),

    /// Save the cart to your account
    Sync,

    /// List your past orders
    History,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product identifier
    product_id: String,

    /// Number of units
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Size
    #[arg(long)]
    size: Option<String>,

    /// Color
    #[arg(long)]
    color: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Shipping {
    /// Free, three to five working days
    Standard,
    /// Next working day
    Express,
}

impl From<Shipping> for ShippingMethod {
    fn from(shipping: Shipping) -> Self {
        match shipping {
            Shipping::Standard => ShippingMethod::Standard,
            Shipping::Express => ShippingMethod::Express,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Payment {
    CreditCard,
    Paypal,
    Cod,
}

impl From<Payment> for PaymentMethod {
    fn from(payment: Payment) -> Self {
        match payment {
            Payment::CreditCard => PaymentMethod::CreditCard,
            Payment::Paypal => PaymentMethod::Paypal,
            Payment::Cod => PaymentMethod::Cod,
        }
    }
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Street address
    #[arg(long)]
    address: String,

    /// Town or city
    #[arg(long)]
    city: String,

    /// County or state
    #[arg(long, default_value = "")]
    state: String,

    /// Postcode
    #[arg(long)]
    postal_code: String,

    /// Country
    #[arg(long, default_value = "United Kingdom")]
    country: String,

    /// Delivery speed
    #[arg(long, value_enum, default_value_t = Shipping::Standard)]
    shipping: Shipping,

    /// Payment method
    #[arg(long, value_enum, default_value_t = Payment::CreditCard)]
    payment: Payment,
}

impl From<CheckoutArgs> for CheckoutDetails {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            shipping_address: ShippingAddress {
                address: args.address,
                city: args.city,
                state: args.state,
                postal_code: args.postal_code,
                country: args.country,
            },
            shipping_method: args.shipping.into(),
            payment_method: args.payment.into(),
        }
    }
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add(args) => add(context, args).await?,
        CartSubcommand::Remove { key } => {
            context
                .cart
                .remove_item(&VariantKey::from(key.as_str()))
                .map_err(|error| format!("failed to remove item: {error}"))?;
        }
        CartSubcommand::Update { key, quantity } => {
            context
                .cart
                .update_quantity(&VariantKey::from(key.as_str()), quantity)
                .map_err(|error| format!("failed to update quantity: {error}"))?;
        }
        CartSubcommand::Clear { local_only } => {
            let result = if local_only {
                context.cart.clear_local_only()
            } else {
                context.cart.clear().await
            };

            result.map_err(|error| format!("failed to clear cart: {error}"))?;
        }
        CartSubcommand::Checkout(args) => return checkout(context, args).await,
        CartSubcommand::Sync => return sync(context).await,
        CartSubcommand::History => return history(context).await,
    }

    render::write_cart(&mut io::stdout().lock(), &context.cart.snapshot()).map_err(output_error)
}

async fn add(context: &AppContext, args: AddArgs) -> Result<(), String> {
    let product_id = ProductId::new(args.product_id.as_str());

    let product = context
        .catalog
        .get_product(&product_id)
        .await
        .map_err(|error| format!("failed to fetch product {product_id}: {error}"))?;

    context
        .cart
        .add_item(&product, args.quantity, args.size.as_deref(), args.color.as_deref())
        .map_err(|error| format!("failed to add {}: {error}", product.name))?;

    Ok(())
}

async fn checkout(context: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let details = CheckoutDetails::from(args);
    let shipping = details.shipping_method.cost();
    let subtotal = context.cart.cart().total_price();

    let order_id = context
        .cart
        .checkout(details)
        .await
        .map_err(|error| error.user_message())?;

    println!("order_id: {order_id}");
    println!("subtotal: {}", format_price(subtotal));
    println!("shipping: {}", format_price(shipping));

    Ok(())
}

async fn sync(context: &AppContext) -> Result<(), String> {
    let outcome = context
        .cart
        .push_to_remote()
        .await
        .map_err(|error| format!("failed to sync cart: {error}"))?;

    match outcome {
        PushOutcome::Saved { lines } => println!("saved {lines} line(s) to your account"),
        PushOutcome::SkippedEmpty => println!("cart is empty, nothing to save"),
    }

    Ok(())
}

async fn history(context: &AppContext) -> Result<(), String> {
    let state = context.session.current();
    let user_id = state
        .user_id()
        .ok_or_else(|| "you must be logged in to view orders".to_string())?;

    let transactions = context
        .remote_cart
        .transactions(user_id)
        .await
        .map_err(|error| format!("failed to fetch orders: {error}"))?;

    render::write_transactions(&mut io::stdout().lock(), &transactions).map_err(output_error)
}
