//! Token storage on top of the auth service.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::{
    services::{AuthApi, AuthResponse, NewAccount, UserProfile},
    session::{AuthSessionProvider, AuthState, SessionError},
    storage::DurableStore,
};

const TOKEN_KEY: &str = "authToken";
const USER_KEY: &str = "user";

struct SignedIn {
    token: Zeroizing<String>,
    profile: UserProfile,
}

/// Holds the signed-in user's token and profile, mirrored to the durable
/// store so a restart keeps the user signed in.
pub struct AuthSession {
    store: Arc<dyn DurableStore>,
    api: Arc<dyn AuthApi>,
    signed_in: RwLock<Option<SignedIn>>,
    sessions: AtomicU64,
    state: watch::Sender<AuthState>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn DurableStore>, api: Arc<dyn AuthApi>) -> Self {
        Self {
            store,
            api,
            signed_in: RwLock::new(None),
            sessions: AtomicU64::new(0),
            state: watch::Sender::new(AuthState::SignedOut),
        }
    }

    /// Loads a previously stored session.
    ///
    /// A stored profile that cannot be read is discarded along with its
    /// token, leaving the session signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn restore(&self) -> Result<AuthState, SessionError> {
        let token = self.store.get(TOKEN_KEY)?;
        let user = self.store.get(USER_KEY)?;

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(self.current());
        };

        let profile = match serde_json::from_str::<UserProfile>(&user) {
            Ok(profile) if profile.id.is_some() => profile,
            Ok(_) => {
                warn!("stored user has no id, discarding session");
                return self.forget();
            }
            Err(error) => {
                warn!(%error, "stored user is unreadable, discarding session");
                return self.forget();
            }
        };

        self.sign_in(Zeroizing::new(token), profile)
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth service rejects the credentials, the
    /// reply lacks a token or user id, or the session cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, SessionError> {
        let response = self.api.login(email, password).await?;
        let token = response.token.ok_or(SessionError::MissingToken)?;

        self.persist_and_sign_in(Zeroizing::new(token), response.user)
    }

    /// Creates an account, signing in when the service issues a token
    /// straight away.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails or the session cannot be
    /// persisted.
    pub async fn register(&self, account: &NewAccount) -> Result<UserProfile, SessionError> {
        let AuthResponse { token, user } = self.api.register(account).await?;

        match token {
            Some(token) => self.persist_and_sign_in(Zeroizing::new(token), user),
            None => {
                info!(email = %user.email, "account registered");
                Ok(user)
            }
        }
    }

    /// Signs out, removing the stored token and profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.forget()?;

        info!("signed out");

        Ok(())
    }

    /// Profile of the signed-in user.
    pub fn profile(&self) -> Option<UserProfile> {
        let guard = self.signed_in.read().ok()?;

        guard.as_ref().map(|signed_in| signed_in.profile.clone())
    }

    /// Bearer token of the signed-in user.
    pub fn token(&self) -> Option<Zeroizing<String>> {
        let guard = self.signed_in.read().ok()?;

        guard.as_ref().map(|signed_in| signed_in.token.clone())
    }

    fn persist_and_sign_in(
        &self,
        token: Zeroizing<String>,
        profile: UserProfile,
    ) -> Result<UserProfile, SessionError> {
        if profile.id.is_none() {
            return Err(SessionError::MissingUserId);
        }

        let user = serde_json::to_string(&profile)?;

        self.store.set(TOKEN_KEY, &token)?;
        self.store.set(USER_KEY, &user)?;

        self.sign_in(token, profile.clone())?;

        info!(email = %profile.email, "signed in");

        Ok(profile)
    }

    fn sign_in(&self, token: Zeroizing<String>, profile: UserProfile) -> Result<AuthState, SessionError> {
        let user_id = profile.user_id().ok_or(SessionError::MissingUserId)?;

        *self.signed_in.write().map_err(|_err| SessionError::Poisoned)? =
            Some(SignedIn { token, profile });

        let state = AuthState::SignedIn {
            user_id,
            session: self.sessions.fetch_add(1, Ordering::Relaxed) + 1,
        };
        self.publish(state.clone());

        Ok(state)
    }

    fn forget(&self) -> Result<AuthState, SessionError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;

        *self.signed_in.write().map_err(|_err| SessionError::Poisoned)? = None;

        self.publish(AuthState::SignedOut);

        Ok(AuthState::SignedOut)
    }

    fn publish(&self, state: AuthState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }

            *current = state;
            true
        });
    }
}

impl AuthSessionProvider for AuthSession {
    fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use solecart::ids::UserId;
    use testresult::TestResult;

    use super::*;
    use crate::{
        services::{AuthResponse, auth_api::MockAuthApi},
        storage::MemoryStore,
    };

    fn profile(id: Option<&str>) -> UserProfile {
        UserProfile {
            id: id.map(str::to_string),
            first_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ..UserProfile::default()
        }
    }

    fn session(api: MockAuthApi) -> (AuthSession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());

        (AuthSession::new(store.clone(), Arc::new(api)), store)
    }

    #[tokio::test]
    async fn login_persists_and_publishes() -> TestResult {
        let mut api = MockAuthApi::new();
        api.expect_login().times(1).returning(|_, _| {
            Ok(AuthResponse {
                token: Some("jwt".to_string()),
                user: profile(Some("u1")),
            })
        });

        let (session, store) = session(api);
        let mut changes = session.subscribe();

        session.login("ada@example.com", "secret").await?;

        assert!(changes.has_changed()?);
        assert_eq!(
            *changes.borrow_and_update(),
            AuthState::SignedIn {
                user_id: UserId::new("u1"),
                session: 1,
            }
        );
        assert_eq!(store.get("authToken")?.as_deref(), Some("jwt"));
        assert!(store.get("user")?.is_some_and(|user| user.contains("\"firstName\":\"Ada\"")));

        Ok(())
    }

    #[tokio::test]
    async fn signing_back_in_is_a_new_session() -> TestResult {
        let mut api = MockAuthApi::new();
        api.expect_login().times(2).returning(|_, _| {
            Ok(AuthResponse {
                token: Some("jwt".to_string()),
                user: profile(Some("u1")),
            })
        });

        let (session, _store) = session(api);
        let mut changes = session.subscribe();

        session.login("ada@example.com", "secret").await?;
        let first = changes.borrow_and_update().clone();

        session.logout()?;
        session.login("ada@example.com", "secret").await?;

        assert!(changes.has_changed()?);
        assert_ne!(*changes.borrow_and_update(), first);
        assert_eq!(
            session.current(),
            AuthState::SignedIn {
                user_id: UserId::new("u1"),
                session: 2,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn login_without_user_id_stays_signed_out() -> TestResult {
        let mut api = MockAuthApi::new();
        api.expect_login().returning(|_, _| {
            Ok(AuthResponse {
                token: Some("jwt".to_string()),
                user: profile(None),
            })
        });

        let (session, store) = session(api);

        let result = session.login("ada@example.com", "secret").await;

        assert!(matches!(result, Err(SessionError::MissingUserId)));
        assert_eq!(session.current(), AuthState::SignedOut);
        assert!(store.get("authToken")?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn registration_without_token_does_not_sign_in() -> TestResult {
        let mut api = MockAuthApi::new();
        api.expect_register().returning(|_| {
            Ok(AuthResponse {
                token: None,
                user: profile(None),
            })
        });

        let (session, _store) = session(api);

        let account = NewAccount {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            address: "1 High Street".to_string(),
            phone_number: "+44 7911 123456".to_string(),
        };

        let user = session.register(&account).await?;

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(session.current(), AuthState::SignedOut);

        Ok(())
    }

    #[test]
    fn restore_reads_stored_session() -> TestResult {
        let (session, store) = session(MockAuthApi::new());

        store.set("authToken", "jwt")?;
        store.set("user", &serde_json::to_string(&profile(Some("u7")))?)?;

        let state = session.restore()?;

        assert_eq!(state.user_id(), Some(&UserId::new("u7")));
        assert_eq!(session.token().as_deref().map(String::as_str), Some("jwt"));

        Ok(())
    }

    #[test]
    fn unreadable_profile_is_discarded() -> TestResult {
        let (session, store) = session(MockAuthApi::new());

        store.set("authToken", "jwt")?;
        store.set("user", "{not json")?;

        assert_eq!(session.restore()?, AuthState::SignedOut);
        assert!(store.get("authToken")?.is_none());
        assert!(store.get("user")?.is_none());

        Ok(())
    }

    #[test]
    fn logout_clears_store_and_notifies() -> TestResult {
        let (session, store) = session(MockAuthApi::new());

        store.set("authToken", "jwt")?;
        store.set("user", &serde_json::to_string(&profile(Some("u7")))?)?;
        session.restore()?;

        let mut changes = session.subscribe();
        session.logout()?;

        assert!(changes.has_changed()?);
        assert_eq!(*changes.borrow_and_update(), AuthState::SignedOut);
        assert!(store.get("authToken")?.is_none());
        assert!(session.profile().is_none());

        Ok(())
    }
}
