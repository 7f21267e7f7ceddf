//! Auth service client.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use solecart::ids::UserId;

use crate::services::{HttpService, ServiceError};

/// The signed-in user as the auth service describes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl UserProfile {
    /// The id carts and orders are filed under, once the service has issued one.
    pub fn user_id(&self) -> Option<UserId> {
        self.id.as_deref().map(UserId::new)
    }
}

/// Reply to a login or registration.
///
/// Registration replies carry no token; the account exists but is not
/// signed in.
#[derive(Deserialize)]
pub struct AuthResponse {
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
    pub user: UserProfile,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

/// Fields of the registration form.
#[derive(Clone, Serialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub phone_number: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[automock]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a token.
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError>;

    /// Creates an account.
    async fn register(&self, account: &NewAccount) -> Result<AuthResponse, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    service: HttpService,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(service: HttpService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        self.service
            .post("auth/login", &LoginRequest { email, password })
            .await
    }

    async fn register(&self, account: &NewAccount) -> Result<AuthResponse, ServiceError> {
        self.service.post("auth/register", account).await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn login_reply_accepts_access_token() -> TestResult {
        let response: AuthResponse = serde_json::from_str(
            r#"{"access_token": "jwt", "user": {"id": "66f0", "firstName": "Ada", "email": "ada@example.com"}}"#,
        )?;

        assert_eq!(response.token.as_deref(), Some("jwt"));
        assert_eq!(response.user.user_id(), Some(UserId::new("66f0")));

        Ok(())
    }

    #[test]
    fn registration_reply_has_no_token() -> TestResult {
        let response: AuthResponse = serde_json::from_str(
            r#"{"message": "User registered successfully", "user": {"firstName": "Ada", "email": "ada@example.com", "country": "United Kingdom"}}"#,
        )?;

        assert!(response.token.is_none());
        assert!(response.user.user_id().is_none());

        Ok(())
    }

    #[test]
    fn debug_output_hides_secrets() {
        let account = NewAccount {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            address: String::new(),
            phone_number: String::new(),
        };

        assert!(!format!("{account:?}").contains("hunter2"));
    }
}
