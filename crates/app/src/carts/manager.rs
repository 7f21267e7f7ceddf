//! Cart state manager.

use std::sync::Arc;

use jiff::Timestamp;
use solecart::{
    cart::{Cart, CartAction},
    checkout::{CheckoutDetails, CheckoutOrder},
    ids::{OrderId, UserId},
    items::NewCartItem,
    products::Product,
    variants::VariantKey,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::{
    carts::{
        CartManagerError, CartSyncError, CartView, CheckoutError, Lifecycle, PushOutcome,
        ReconcileOutcome,
    },
    services::RemoteCartService,
    session::{AuthSessionProvider, AuthState},
    storage::DurableStore,
};

/// Store key the cart snapshot is written under.
pub const CART_KEY: &str = "cart";

const FETCH_FAILED: &str = "Failed to fetch cart. Please try again.";

/// Owns the session's cart.
///
/// Every mutation replaces the snapshot in one step, writes it through to
/// the durable store and then notifies subscribers. Remote calls only touch
/// the cart once they have resolved.
pub struct CartStateManager {
    store: Arc<dyn DurableStore>,
    remote: Arc<dyn RemoteCartService>,
    auth: Arc<dyn AuthSessionProvider>,
    view: watch::Sender<CartView>,
}

impl CartStateManager {
    pub fn new(
        store: Arc<dyn DurableStore>,
        remote: Arc<dyn RemoteCartService>,
        auth: Arc<dyn AuthSessionProvider>,
    ) -> Self {
        Self {
            store,
            remote,
            auth,
            view: watch::Sender::new(CartView::default()),
        }
    }

    /// Loads the stored cart and makes the manager ready.
    ///
    /// A missing, unreadable or invalid snapshot restores as an empty cart.
    /// Calling this again once restored returns the current cart.
    pub fn restore(&self) -> Cart {
        let mut first = false;

        self.view.send_if_modified(|view| {
            if view.lifecycle != Lifecycle::Uninitialized {
                return false;
            }

            view.lifecycle = Lifecycle::Restoring;
            first = true;
            true
        });

        if !first {
            return self.cart();
        }

        let cart = self.load();

        self.view.send_modify(|view| {
            view.cart = cart.clone();
            view.lifecycle = Lifecycle::Ready;
        });

        cart
    }

    /// A copy of everything the manager exposes.
    pub fn snapshot(&self) -> CartView {
        self.view.borrow().clone()
    }

    /// A copy of the current cart.
    pub fn cart(&self) -> Cart {
        self.view.borrow().cart.clone()
    }

    /// Observes every subsequent view.
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.view.subscribe()
    }

    /// Adds `quantity` units of a product in the given size and color.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager is not ready, `quantity` is zero, or
    /// the product's price is invalid.
    pub fn add_item(
        &self,
        product: &Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Cart, CartManagerError> {
        let item = NewCartItem::from_product(product, size, color);

        self.mutate(CartAction::Add { item, quantity }, |_| {})
    }

    /// Removes a line. Unknown keys leave the cart as it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager is not ready.
    pub fn remove_item(&self, key: &VariantKey) -> Result<Cart, CartManagerError> {
        self.mutate(CartAction::Remove(key.clone()), |_| {})
    }

    /// Sets a line's quantity; zero or below removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager is not ready or the quantity
    /// overflows.
    pub fn update_quantity(&self, key: &VariantKey, quantity: i64) -> Result<Cart, CartManagerError> {
        self.mutate(
            CartAction::UpdateQuantity {
                key: key.clone(),
                quantity,
            },
            |_| {},
        )
    }

    /// Empties the cart without contacting the cart service.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager is not ready.
    pub fn clear_local_only(&self) -> Result<Cart, CartManagerError> {
        self.mutate(CartAction::Clear, |view| {
            view.order_placed = false;
            view.order_id = None;
        })
    }

    /// Empties the cart, then asks the cart service to drop the signed-in
    /// user's saved cart. A failed remote clear is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager is not ready.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, CartManagerError> {
        let cart = self.clear_local_only()?;

        let state = self.auth.current();

        if let Some(user_id) = state.user_id() {
            if let Err(error) = self.remote.clear_cart(user_id).await {
                warn!(%user_id, %error, "failed to clear remote cart");
            }
        }

        Ok(cart)
    }

    /// Submits the cart as an order.
    ///
    /// On success the cart is emptied and the order id is recorded on the
    /// view. On failure the cart is left exactly as it was and the error's
    /// message is recorded instead.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AuthenticationRequired`]: nobody is signed in.
    /// - [`CheckoutError::Validation`]: the cart is empty.
    /// - [`CheckoutError::RemoteUnavailable`]: the cart service failed.
    /// - [`CheckoutError::MalformedResponse`]: no order id came back.
    #[instrument(skip_all)]
    pub async fn checkout(&self, details: CheckoutDetails) -> Result<OrderId, CheckoutError> {
        match self.submit(details).await {
            Ok(order_id) => {
                info!(%order_id, "order placed");

                Ok(order_id)
            }
            Err(error) => {
                warn!(%error, "checkout failed");

                let message = error.user_message();
                self.settle(|view| view.error = Some(message));

                Err(error)
            }
        }
    }

    async fn submit(&self, details: CheckoutDetails) -> Result<OrderId, CheckoutError> {
        let AuthState::SignedIn { user_id, .. } = self.auth.current() else {
            return Err(CheckoutError::AuthenticationRequired);
        };

        let view = self.snapshot();

        if view.lifecycle != Lifecycle::Ready {
            return Err(CheckoutError::NotReady);
        }

        let order = CheckoutOrder::from_cart(&view.cart, user_id, details, Timestamp::now())?;

        self.begin_remote();

        let order_id = self.remote.submit_checkout(&order).await?;

        self.mutate(CartAction::Clear, |view| {
            view.loading = false;
            view.order_placed = true;
            view.order_id = Some(order_id.clone());
        })
        .map_err(|_err| CheckoutError::NotReady)?;

        Ok(order_id)
    }

    /// Replaces the local cart with the user's server-side cart, when the
    /// server has a non-empty one.
    ///
    /// Local lines added while signed out are discarded in that case. Fetch
    /// failures leave the local cart untouched and are recorded on the view
    /// without being returned.
    #[instrument(skip_all, fields(%user_id))]
    pub async fn reconcile_with_remote(&self, user_id: &UserId) -> ReconcileOutcome {
        self.begin_remote();

        let remote = match self.remote.get_cart(user_id).await {
            Ok(remote) => remote,
            Err(error) => {
                warn!(%error, "failed to fetch remote cart");
                self.settle(|view| view.error = Some(FETCH_FAILED.to_string()));

                return ReconcileOutcome::Failed;
            }
        };

        if self.auth.current().user_id() != Some(user_id) {
            debug!("session changed while fetching, ignoring remote cart");
            self.settle(|_| {});

            return ReconcileOutcome::Stale;
        }

        let Some(items) = remote.map(|remote| remote.items).filter(|items| !items.is_empty()) else {
            debug!("no remote cart, keeping local");
            self.settle(|_| {});

            return ReconcileOutcome::KeptLocal;
        };

        match self.mutate(CartAction::Replace(items), |view| view.loading = false) {
            Ok(cart) => {
                info!(lines = cart.len(), "local cart replaced by remote cart");

                ReconcileOutcome::Replaced { lines: cart.len() }
            }
            Err(error) => {
                warn!(%error, "remote cart could not be applied");
                self.settle(|view| view.error = Some(FETCH_FAILED.to_string()));

                ReconcileOutcome::Failed
            }
        }
    }

    /// Saves the local cart as the signed-in user's server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the manager is not ready, or
    /// the cart service fails.
    #[instrument(skip(self))]
    pub async fn push_to_remote(&self) -> Result<PushOutcome, CartSyncError> {
        let AuthState::SignedIn { user_id, .. } = self.auth.current() else {
            return Err(CartSyncError::AuthenticationRequired);
        };

        let view = self.snapshot();

        if view.lifecycle != Lifecycle::Ready {
            return Err(CartSyncError::NotReady);
        }

        if view.cart.is_empty() {
            return Ok(PushOutcome::SkippedEmpty);
        }

        self.begin_remote();

        let result = self.remote.save_cart(&user_id, &view.cart).await;

        self.settle(|_| {});

        result?;

        Ok(PushOutcome::Saved {
            lines: view.cart.len(),
        })
    }

    /// Follows sign-in changes until the provider goes away.
    ///
    /// Signing in reconciles with the new user's server-side cart and signing
    /// out empties the local cart. The state at the time of the call is the
    /// starting point and triggers nothing by itself.
    ///
    /// Changes that arrive faster than they are handled collapse into the
    /// latest state, so a new session for any user, including the same one,
    /// is treated as sign-out followed by sign-in.
    pub async fn watch_auth(&self, mut changes: watch::Receiver<AuthState>) {
        let mut previous = changes.borrow_and_update().clone();

        while changes.changed().await.is_ok() {
            let current = changes.borrow_and_update().clone();

            match (&previous, &current) {
                (AuthState::SignedOut, AuthState::SignedIn { user_id, .. }) => {
                    self.reconcile_with_remote(user_id).await;
                }
                (AuthState::SignedIn { .. }, AuthState::SignedOut) => {
                    if let Err(error) = self.clear_local_only() {
                        warn!(%error, "failed to clear cart on sign-out");
                    }
                }
                (
                    AuthState::SignedIn {
                        user_id: from,
                        session: before,
                    },
                    AuthState::SignedIn {
                        user_id: to,
                        session: after,
                    },
                ) if from != to || before != after => {
                    if let Err(error) = self.clear_local_only() {
                        warn!(%error, "failed to clear cart on session change");
                    }

                    self.reconcile_with_remote(to).await;
                }
                _ => {}
            }

            previous = current;
        }

        debug!("auth provider dropped, no longer watching");
    }

    fn load(&self) -> Cart {
        let raw = match self.store.get(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored cart, starting empty");
                return Cart::new();
            }
            Err(error) => {
                warn!(%error, "failed to read stored cart, starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                debug!(lines = cart.len(), total_items = cart.total_items(), "restored cart");
                cart
            }
            Err(error) => {
                warn!(%error, "stored cart is invalid, starting empty");
                Cart::new()
            }
        }
    }

    fn persist(&self, cart: &Cart) {
        let result = serde_json::to_string(cart)
            .map_err(|error| error.to_string())
            .and_then(|json| self.store.set(CART_KEY, &json).map_err(|error| error.to_string()));

        if let Err(error) = result {
            warn!(%error, "failed to persist cart");
        }
    }

    /// Applies `action`, persists the result and notifies subscribers.
    ///
    /// The write happens while the view is held, so writes land in the order
    /// the mutations were applied.
    fn mutate(
        &self,
        action: CartAction,
        also: impl FnOnce(&mut CartView),
    ) -> Result<Cart, CartManagerError> {
        let mut outcome = Err(CartManagerError::NotReady);

        self.view.send_if_modified(|view| {
            if view.lifecycle != Lifecycle::Ready {
                return false;
            }

            let next = match view.cart.apply(action) {
                Ok(next) => next,
                Err(error) => {
                    outcome = Err(error.into());
                    return false;
                }
            };

            self.persist(&next);

            let before = view.clone();

            view.cart = next;
            also(view);

            outcome = Ok(view.cart.clone());

            *view != before
        });

        if let Ok(cart) = &outcome {
            debug!(lines = cart.len(), total_items = cart.total_items(), "cart updated");
        }

        outcome
    }

    fn begin_remote(&self) {
        self.view.send_modify(|view| {
            view.loading = true;
            view.error = None;
        });
    }

    /// Ends a remote call without touching the cart.
    fn settle(&self, also: impl FnOnce(&mut CartView)) {
        self.view.send_modify(|view| {
            view.loading = false;
            also(view);
        });
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use solecart::{
        checkout::{ShippingAddress, ShippingMethod},
        ids::ProductId,
        items::CartItem,
    };
    use testresult::TestResult;

    use super::*;
    use crate::{
        services::{RemoteCart, ServiceError, remote_cart::MockRemoteCartService},
        session::MockAuthSessionProvider,
        storage::{MemoryStore, MockDurableStore, StoreError},
    };

    fn provider(state: AuthState) -> MockAuthSessionProvider {
        let mut provider = MockAuthSessionProvider::new();
        provider.expect_current().returning(move || state.clone());
        provider
    }

    fn signed_in() -> AuthState {
        AuthState::SignedIn {
            user_id: UserId::new("u1"),
            session: 1,
        }
    }

    fn manager(
        store: Arc<dyn DurableStore>,
        remote: MockRemoteCartService,
        auth: AuthState,
    ) -> CartStateManager {
        let manager = CartStateManager::new(store, Arc::new(remote), Arc::new(provider(auth)));
        manager.restore();
        manager
    }

    fn trainer() -> Product {
        Product::new(ProductId::numeric(1), "Trainer", Decimal::new(29_99, 2))
    }

    fn boot() -> Product {
        Product::new(ProductId::numeric(2), "Boot", Decimal::new(80, 0))
    }

    fn details() -> CheckoutDetails {
        CheckoutDetails {
            shipping_address: ShippingAddress {
                address: "1 High Street".to_string(),
                city: "London".to_string(),
                postal_code: "N1 1AA".to_string(),
                country: "United Kingdom".to_string(),
                ..ShippingAddress::default()
            },
            shipping_method: ShippingMethod::Standard,
            ..CheckoutDetails::default()
        }
    }

    fn remote_line(id: u64, price: Decimal, quantity: u32) -> Result<CartItem, Box<dyn std::error::Error>> {
        let product = Product::new(ProductId::numeric(id), "Remote", price);

        Ok(CartItem::new(NewCartItem::from_product(&product, None, None), quantity)?)
    }

    #[test]
    fn operations_wait_for_restore() {
        let manager = CartStateManager::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockRemoteCartService::new()),
            Arc::new(provider(AuthState::SignedOut)),
        );

        assert_eq!(manager.snapshot().lifecycle, Lifecycle::Uninitialized);
        assert_eq!(
            manager.add_item(&trainer(), 1, None, None),
            Err(CartManagerError::NotReady)
        );
    }

    #[test]
    fn restore_recomputes_stored_totals() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        store.set(
            CART_KEY,
            r#"{
                "items": [{
                    "product_id": 1, "id": 1, "key": "1-M-Black", "name": "Trainer",
                    "image": "t.jpg", "price": 29.99, "quantity": 3, "totalPrice": 5,
                    "size": "M", "color": "Black"
                }],
                "totalItems": 99,
                "totalPrice": 0
            }"#,
        )?;

        let manager = manager(store, MockRemoteCartService::new(), AuthState::SignedOut);
        let view = manager.snapshot();

        assert_eq!(view.lifecycle, Lifecycle::Ready);
        assert_eq!(view.cart.total_items(), 3);
        assert_eq!(view.cart.total_price(), Decimal::new(89_97, 2));

        Ok(())
    }

    #[test]
    fn invalid_snapshot_restores_empty() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        store.set(CART_KEY, r#"{"items": [{"name": "no id"}]}"#)?;

        let manager = manager(store, MockRemoteCartService::new(), AuthState::SignedOut);

        assert!(manager.cart().is_empty());
        assert_eq!(manager.snapshot().lifecycle, Lifecycle::Ready);

        Ok(())
    }

    #[test]
    fn mutations_write_through() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(store.clone(), MockRemoteCartService::new(), AuthState::SignedOut);

        manager.add_item(&trainer(), 2, Some("M"), Some("Black"))?;
        manager.add_item(&trainer(), 1, Some("M"), Some("Black"))?;

        let stored: Cart = serde_json::from_str(&store.get(CART_KEY)?.ok_or("nothing stored")?)?;

        assert_eq!(stored, manager.cart());
        assert_eq!(stored.total_items(), 3);
        assert_eq!(stored.total_price(), Decimal::new(89_97, 2));

        Ok(())
    }

    #[test]
    fn persistence_failure_is_not_fatal() -> TestResult {
        let mut store = MockDurableStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .returning(|_, _| Err(StoreError::Io(std::io::Error::other("disk full"))));

        let manager = manager(Arc::new(store), MockRemoteCartService::new(), AuthState::SignedOut);

        let cart = manager.add_item(&trainer(), 1, None, None)?;

        assert_eq!(cart.total_items(), 1);
        assert_eq!(manager.cart(), cart);

        Ok(())
    }

    #[test]
    fn zero_quantity_add_is_rejected_without_writing() -> TestResult {
        let mut store = MockDurableStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_set().never();

        let manager = manager(Arc::new(store), MockRemoteCartService::new(), AuthState::SignedOut);

        assert!(matches!(
            manager.add_item(&trainer(), 0, None, None),
            Err(CartManagerError::Cart(_))
        ));
        assert!(manager.cart().is_empty());

        Ok(())
    }

    #[test]
    fn removing_unknown_key_does_not_notify() -> TestResult {
        let manager = manager(
            Arc::new(MemoryStore::new()),
            MockRemoteCartService::new(),
            AuthState::SignedOut,
        );
        manager.add_item(&trainer(), 1, None, None)?;

        let mut changes = manager.subscribe();
        changes.borrow_and_update();

        manager.remove_item(&VariantKey::from("missing-default-default"))?;

        assert!(!changes.has_changed()?);

        Ok(())
    }

    #[test]
    fn views_are_isolated_copies() -> TestResult {
        let manager = manager(
            Arc::new(MemoryStore::new()),
            MockRemoteCartService::new(),
            AuthState::SignedOut,
        );
        manager.add_item(&trainer(), 1, None, None)?;

        let mut view = manager.snapshot();
        view.cart = Cart::new();

        assert_eq!(manager.cart().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_requires_sign_in() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_submit_checkout().never();

        let manager = manager(Arc::new(MemoryStore::new()), remote, AuthState::SignedOut);
        manager.add_item(&trainer(), 1, None, None)?;

        let result = manager.checkout(details()).await;

        assert!(matches!(result, Err(CheckoutError::AuthenticationRequired)));
        assert_eq!(manager.cart().len(), 1);
        assert!(manager.snapshot().error.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_checkout_makes_no_call() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_submit_checkout().never();

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());

        let result = manager.checkout(details()).await;

        assert!(matches!(result, Err(CheckoutError::Validation(_))));

        Ok(())
    }

    #[tokio::test]
    async fn failed_checkout_preserves_cart() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_submit_checkout().times(1).returning(|_| {
            Err(ServiceError::Status {
                service: "cart",
                status: 500,
                message: Some("Out of stock".to_string()),
            })
        });

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;
        manager.add_item(&boot(), 2, Some("9"), None)?;

        let before = manager.cart();

        let result = manager.checkout(details()).await;

        assert!(matches!(result, Err(CheckoutError::RemoteUnavailable(_))));

        let view = manager.snapshot();

        assert_eq!(view.cart, before);
        assert_eq!(view.cart.total_items(), 3);
        assert!(!view.loading);
        assert!(!view.order_placed);
        assert_eq!(view.error.as_deref(), Some("Out of stock"));

        Ok(())
    }

    #[tokio::test]
    async fn reply_without_order_id_preserves_cart() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote
            .expect_submit_checkout()
            .returning(|_| Err(ServiceError::MalformedResponse {
                service: "cart",
                reason: "checkout reply had no order_id".to_string(),
            }));

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;

        let result = manager.checkout(details()).await;

        assert!(matches!(result, Err(CheckoutError::MalformedResponse(_))));
        assert_eq!(manager.cart().len(), 1);
        assert_eq!(
            manager.snapshot().error.as_deref(),
            Some(crate::carts::CHECKOUT_FAILED)
        );

        Ok(())
    }

    #[tokio::test]
    async fn successful_checkout_clears_cart() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        let mut remote = MockRemoteCartService::new();
        remote
            .expect_submit_checkout()
            .times(1)
            .withf(|order| {
                order.user_id == UserId::new("u1")
                    && order.lines.len() == 2
                    && order.total_cost == Decimal::new(189_99, 2)
            })
            .returning(|_| Ok(OrderId::numeric(42)));

        let manager = manager(store.clone(), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;
        manager.add_item(&boot(), 2, None, None)?;

        let order_id = manager.checkout(details()).await?;

        let view = manager.snapshot();

        assert_eq!(order_id, OrderId::numeric(42));
        assert!(view.cart.items().is_empty());
        assert_eq!(view.cart.total_items(), 0);
        assert_eq!(view.cart.total_price(), Decimal::ZERO);
        assert!(view.order_placed);
        assert_eq!(view.order_id, Some(OrderId::numeric(42)));

        let stored: Cart = serde_json::from_str(&store.get(CART_KEY)?.ok_or("nothing stored")?)?;
        assert!(stored.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_replaces_local_cart() -> TestResult {
        let line = remote_line(9, Decimal::new(15, 0), 2)?;

        let mut remote = MockRemoteCartService::new();
        remote.expect_get_cart().times(1).returning(move |_| {
            Ok(Some(RemoteCart {
                items: vec![line.clone()],
            }))
        });

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;

        let outcome = manager.reconcile_with_remote(&UserId::new("u1")).await;

        assert_eq!(outcome, ReconcileOutcome::Replaced { lines: 1 });
        assert_eq!(manager.cart().total_price(), Decimal::new(30, 0));
        assert!(manager.cart().items().iter().all(|item| item.name() == "Remote"));

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_keeps_local_cart_without_remote_one() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_get_cart().returning(|_| Ok(None));

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;

        let outcome = manager.reconcile_with_remote(&UserId::new("u1")).await;

        assert_eq!(outcome, ReconcileOutcome::KeptLocal);
        assert_eq!(manager.cart().len(), 1);
        assert!(!manager.snapshot().loading);

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_failure_keeps_local_cart() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_get_cart().returning(|_| {
            Err(ServiceError::Status {
                service: "cart",
                status: 503,
                message: None,
            })
        });

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;
        let before = manager.cart();

        let outcome = manager.reconcile_with_remote(&UserId::new("u1")).await;

        assert_eq!(outcome, ReconcileOutcome::Failed);
        assert_eq!(manager.cart(), before);
        assert!(manager.snapshot().error.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_ignores_cart_for_other_user() -> TestResult {
        let line = remote_line(9, Decimal::new(15, 0), 2)?;

        let mut remote = MockRemoteCartService::new();
        remote
            .expect_get_cart()
            .returning(move |_| Ok(Some(RemoteCart { items: vec![line.clone()] })));

        let manager = manager(Arc::new(MemoryStore::new()), remote, AuthState::SignedOut);

        let outcome = manager.reconcile_with_remote(&UserId::new("u1")).await;

        assert_eq!(outcome, ReconcileOutcome::Stale);
        assert!(manager.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn clear_contacts_service_only_when_signed_in() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_clear_cart().never();

        let manager = manager(Arc::new(MemoryStore::new()), remote, AuthState::SignedOut);
        manager.add_item(&trainer(), 1, None, None)?;

        assert!(manager.clear().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn remote_clear_failure_is_swallowed() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_clear_cart().times(1).returning(|_| {
            Err(ServiceError::Status {
                service: "cart",
                status: 500,
                message: None,
            })
        });

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;

        let cart = manager.clear().await?;

        assert!(cart.is_empty());
        assert!(manager.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn push_skips_empty_cart() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_save_cart().never();

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());

        assert_eq!(manager.push_to_remote().await?, PushOutcome::SkippedEmpty);

        Ok(())
    }

    #[tokio::test]
    async fn push_saves_for_signed_in_user() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote
            .expect_save_cart()
            .times(1)
            .withf(|user_id, cart| user_id.as_str() == "u1" && cart.total_items() == 2)
            .returning(|_, _| Ok(()));

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&boot(), 2, None, None)?;

        assert_eq!(manager.push_to_remote().await?, PushOutcome::Saved { lines: 1 });

        Ok(())
    }

    #[tokio::test]
    async fn signing_in_reconciles() -> TestResult {
        let line = remote_line(9, Decimal::new(15, 0), 1)?;

        let mut remote = MockRemoteCartService::new();
        remote
            .expect_get_cart()
            .times(1)
            .returning(move |_| Ok(Some(RemoteCart { items: vec![line.clone()] })));

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        let (changes, receiver) = watch::channel(AuthState::SignedOut);

        let ((), sent) = tokio::join!(manager.watch_auth(receiver), async move {
            let sent = changes.send(signed_in());
            drop(changes);
            sent
        });
        sent?;

        assert_eq!(manager.cart().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn signing_out_clears_local_cart() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_clear_cart().never();

        let manager = manager(Arc::new(MemoryStore::new()), remote, AuthState::SignedOut);
        manager.add_item(&trainer(), 1, None, None)?;

        let (changes, receiver) = watch::channel(signed_in());

        let ((), sent) = tokio::join!(manager.watch_auth(receiver), async move {
            let sent = changes.send(AuthState::SignedOut);
            drop(changes);
            sent
        });
        sent?;

        assert!(manager.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn signing_out_and_back_in_between_polls_clears_local_cart() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        remote.expect_get_cart().times(1).returning(|_| Ok(None));

        let manager = manager(Arc::new(MemoryStore::new()), remote, signed_in());
        manager.add_item(&trainer(), 1, None, None)?;

        let (changes, receiver) = watch::channel(signed_in());

        let ((), sent) = tokio::join!(manager.watch_auth(receiver), async move {
            changes.send(AuthState::SignedOut)?;
            changes.send(AuthState::SignedIn {
                user_id: UserId::new("u1"),
                session: 2,
            })?;
            drop(changes);

            Ok::<_, watch::error::SendError<AuthState>>(())
        });
        sent?;

        assert!(manager.cart().is_empty());

        Ok(())
    }
}
