//! Sign-in state

use mockall::automock;
use solecart::ids::UserId;
use tokio::sync::watch;

mod errors;
mod auth_session;

pub use auth_session::AuthSession;
pub use errors::SessionError;

/// Whether someone is signed in, and as whom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn {
        user_id: UserId,
        /// Bumped on every sign-in, so signing out and back in as the same
        /// user is a change even when a watcher only sees the end state.
        session: u64,
    },
}

impl AuthState {
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            AuthState::SignedIn { user_id, .. } => Some(user_id),
            AuthState::SignedOut => None,
        }
    }
}

/// Source of the current sign-in state and its changes.
#[automock]
pub trait AuthSessionProvider: Send + Sync {
    /// The state right now.
    fn current(&self) -> AuthState;

    /// A receiver that observes every subsequent change.
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}
