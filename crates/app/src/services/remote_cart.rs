//! Remote cart service: saved carts, checkout and order history.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::IgnoredAny};
use solecart::{
    cart::Cart,
    checkout::{CheckoutOrder, OrderLine, PaymentMethod},
    ids::{OrderId, ProductId, UserId},
    items::{CartItem, NewCartItem},
};
use tracing::debug;

use crate::services::{HttpService, ServiceError};

/// A cart stored on the server for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCart {
    /// Validated lines, in server order
    pub items: Vec<CartItem>,
}

/// A past order as recorded by the cart service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    pub order_id: Option<OrderId>,
    #[serde(rename = "product_cart")]
    pub lines: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: String,
}

/// Calls to the cart service that back a signed-in user's cart.
#[automock]
#[async_trait]
pub trait RemoteCartService: Send + Sync {
    /// Fetches the user's saved cart, if the service has one.
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<RemoteCart>, ServiceError>;

    /// Replaces the user's saved cart with `cart`.
    async fn save_cart(&self, user_id: &UserId, cart: &Cart) -> Result<(), ServiceError>;

    /// Submits an order and returns the id the service assigned to it.
    async fn submit_checkout(&self, order: &CheckoutOrder) -> Result<OrderId, ServiceError>;

    /// Deletes the user's saved cart.
    async fn clear_cart(&self, user_id: &UserId) -> Result<(), ServiceError>;

    /// The user's order history, newest last.
    async fn transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>, ServiceError>;
}

/// A cart line as the service stores it. Nothing about it is trusted until
/// [`RemoteCartItem::validate`] has run.
#[derive(Debug, Clone, Deserialize)]
struct RemoteCartItem {
    product_id: ProductId,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    quantity: i64,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

impl RemoteCartItem {
    fn validate(self) -> Result<CartItem, String> {
        let quantity = u32::try_from(self.quantity)
            .ok()
            .filter(|quantity| *quantity >= 1)
            .ok_or_else(|| format!("invalid quantity {} for {}", self.quantity, self.product_id))?;

        let item = NewCartItem {
            product_id: self.product_id,
            name: self.name,
            image: self.image,
            unit_price: self.price,
            size: self.size,
            color: self.color,
        };

        CartItem::new(item, quantity).map_err(|error| error.to_string())
    }
}

/// `GET /cart/{user}` answers with either the cart document or an envelope
/// saying there is none.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GetCartResponse {
    Found {
        items: Vec<RemoteCartItem>,
    },
    Missing {
        #[serde(rename = "message")]
        _message: String,
        #[serde(rename = "cart")]
        _cart: Option<IgnoredAny>,
    },
}

impl GetCartResponse {
    fn into_cart(self) -> Result<Option<RemoteCart>, String> {
        match self {
            GetCartResponse::Missing { .. } => Ok(None),
            GetCartResponse::Found { items } => {
                let items = items
                    .into_iter()
                    .map(RemoteCartItem::validate)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Some(RemoteCart { items }))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TransactionsResponse {
    Orders(Vec<Transaction>),
    None {
        #[serde(rename = "message")]
        _message: String,
    },
}

#[derive(Debug, Deserialize)]
struct CheckoutReceipt {
    order_id: Option<OrderId>,
    #[serde(default)]
    transaction_id: Option<String>,
}

/// A cart line in the shape `POST /save_cart` validates against.
#[derive(Debug, Serialize)]
struct SavedLine<'a> {
    product_id: &'a ProductId,
    id: &'a ProductId,
    key: &'a str,
    name: &'a str,
    image: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    quantity: u32,
    #[serde(rename = "totalPrice", with = "rust_decimal::serde::float")]
    total_price: Decimal,
    size: Option<&'a str>,
    color: Option<&'a str>,
}

impl<'a> From<&'a CartItem> for SavedLine<'a> {
    fn from(item: &'a CartItem) -> Self {
        Self {
            product_id: item.product_id(),
            id: item.product_id(),
            key: item.key().as_str(),
            name: item.name(),
            image: item.image().unwrap_or_default(),
            price: item.unit_price(),
            quantity: item.quantity(),
            total_price: item.line_total(),
            size: item.size(),
            color: item.color(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SaveCartRequest<'a> {
    user_id: &'a UserId,
    items: Vec<SavedLine<'a>>,
    #[serde(rename = "totalItems")]
    total_items: u64,
    #[serde(rename = "totalPrice", with = "rust_decimal::serde::float")]
    total_price: Decimal,
}

impl<'a> SaveCartRequest<'a> {
    fn new(user_id: &'a UserId, cart: &'a Cart) -> Self {
        Self {
            user_id,
            items: cart.items().iter().map(SavedLine::from).collect(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRemoteCartService {
    service: HttpService,
}

impl HttpRemoteCartService {
    #[must_use]
    pub fn new(service: HttpService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RemoteCartService for HttpRemoteCartService {
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<RemoteCart>, ServiceError> {
        let response: GetCartResponse = self.service.get(&format!("cart/{user_id}"), &[]).await?;

        response
            .into_cart()
            .map_err(|reason| ServiceError::malformed(self.service.name(), reason))
    }

    async fn save_cart(&self, user_id: &UserId, cart: &Cart) -> Result<(), ServiceError> {
        let _: IgnoredAny = self
            .service
            .post("save_cart", &SaveCartRequest::new(user_id, cart))
            .await?;

        debug!(%user_id, lines = cart.len(), "remote cart saved");

        Ok(())
    }

    async fn submit_checkout(&self, order: &CheckoutOrder) -> Result<OrderId, ServiceError> {
        let receipt: CheckoutReceipt = self.service.post("checkout", order).await?;

        debug!(order_id = ?receipt.order_id, transaction_id = ?receipt.transaction_id, "checkout accepted");

        receipt
            .order_id
            .ok_or_else(|| ServiceError::malformed(self.service.name(), "checkout reply had no order_id"))
    }

    async fn clear_cart(&self, user_id: &UserId) -> Result<(), ServiceError> {
        let _: IgnoredAny = self
            .service
            .get(&format!("clear_cart/{user_id}"), &[])
            .await?;

        Ok(())
    }

    async fn transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>, ServiceError> {
        let response: TransactionsResponse = self
            .service
            .get(&format!("transactions/{user_id}"), &[])
            .await?;

        Ok(match response {
            TransactionsResponse::Orders(orders) => orders,
            TransactionsResponse::None { .. } => Vec::new(),
        })
    }
}
