//! Cart manager models.

use solecart::{cart::Cart, ids::OrderId};

/// Where the manager is in its start-up sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Restoring,
    Ready,
}

/// Everything a front-end renders about the cart.
///
/// Views are owned copies; changing one has no effect on the manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartView {
    pub cart: Cart,
    pub lifecycle: Lifecycle,

    /// A remote call is in flight.
    pub loading: bool,

    /// Message from the last failed remote call.
    pub error: Option<String>,

    pub order_placed: bool,
    pub order_id: Option<OrderId>,
}

/// What reconciling with the server-side cart did to the local cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The local cart was replaced by the server's.
    Replaced { lines: usize },

    /// The server had no cart, or an empty one.
    KeptLocal,

    /// The user signed out or changed before the server answered.
    Stale,

    /// The fetch failed; the local cart is unchanged.
    Failed,
}

/// Result of pushing the local cart to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Saved { lines: usize },

    /// Empty carts are never pushed.
    SkippedEmpty,
}
