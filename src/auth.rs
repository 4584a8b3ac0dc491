use time::OffsetDateTime;

use crate::client::AuthApi;
use crate::credentials::CredentialStore;
use crate::error::Result;
use crate::observability::{AUTH_LOGINS, AUTH_LOGOUTS};
use crate::types::{AuthRequest, User};

/// Where the session stands.
///
/// `Loading` only exists between construction and [`AuthContext::bootstrap`];
/// every other transition lands on `Anonymous` or `Authenticated`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AuthState {
    #[default]
    Loading,
    Anonymous,
    Authenticated(User),
}

/// Holds the signed-in user and the credential that proves it.
///
/// All session transitions go through here: bootstrap from a stored token,
/// login, signup, logout, and the balance updates that chat and purchase
/// responses carry. The credential store is shared with the HTTP client, so
/// storing or clearing a token here changes what the client sends on the
/// next request.
pub struct AuthContext<A: AuthApi> {
    api: A,
    credentials: CredentialStore,
    state: AuthState,
}

impl<A: AuthApi> AuthContext<A> {
    pub fn new(api: A, credentials: CredentialStore) -> Self {
        Self {
            api,
            credentials,
            state: AuthState::Loading,
        }
    }

    /// Resolve the initial session state from any stored credential.
    ///
    /// A stored token that no longer resolves to a profile is discarded
    /// rather than surfaced: a stale credential at startup is not an error
    /// the user can act on.
    pub async fn bootstrap(&mut self) {
        if !self.credentials.has_token() {
            self.state = AuthState::Anonymous;
            return;
        }
        match self.api.profile().await {
            Ok(user) => {
                self.state = AuthState::Authenticated(user);
            }
            Err(_) => {
                self.credentials.clear();
                self.state = AuthState::Anonymous;
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let response = self.api.login(&AuthRequest::new(email, password)).await?;
        self.credentials.store(&response.token)?;
        self.state = AuthState::Authenticated(response.user);
        AUTH_LOGINS.click();
        Ok(())
    }

    pub async fn signup(&mut self, email: &str, password: &str) -> Result<()> {
        let response = self.api.register(&AuthRequest::new(email, password)).await?;
        self.credentials.store(&response.token)?;
        self.state = AuthState::Authenticated(response.user);
        AUTH_LOGINS.click();
        Ok(())
    }

    /// Drop the credential and return to an anonymous session.
    pub fn logout(&mut self) {
        self.credentials.clear();
        self.state = AuthState::Anonymous;
        AUTH_LOGOUTS.click();
    }

    /// Overwrite the cached balance with a server-reported one.
    ///
    /// The backend is authoritative for credits; the client never computes a
    /// balance by subtraction. No-op while anonymous.
    pub fn update_balance(&mut self, credits: i64) {
        if let AuthState::Authenticated(user) = &mut self.state {
            user.credits = credits;
        }
    }

    pub fn update_subscription(
        &mut self,
        subscription_type: Option<String>,
        subscription_ends_at: Option<OffsetDateTime>,
    ) {
        if let AuthState::Authenticated(user) = &mut self.state {
            user.subscription_type = subscription_type;
            user.subscription_ends_at = subscription_ends_at;
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user().map(|u| u.email.as_str())
    }

    /// Current credit balance in cents, zero while anonymous.
    pub fn balance(&self) -> i64 {
        self.user().map(|u| u.credits).unwrap_or(0)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::Error;
    use crate::types::AuthResponse;

    use super::*;

    struct StubAuth {
        login: Mutex<Option<Result<AuthResponse>>>,
        register: Mutex<Option<Result<AuthResponse>>>,
        profile: Mutex<Option<Result<User>>>,
    }

    impl StubAuth {
        fn empty() -> Self {
            Self {
                login: Mutex::new(None),
                register: Mutex::new(None),
                profile: Mutex::new(None),
            }
        }

        fn with_login(response: Result<AuthResponse>) -> Self {
            let stub = Self::empty();
            *stub.login.lock().unwrap() = Some(response);
            stub
        }

        fn with_profile(response: Result<User>) -> Self {
            let stub = Self::empty();
            *stub.profile.lock().unwrap() = Some(response);
            stub
        }
    }

    #[async_trait]
    impl AuthApi for StubAuth {
        async fn login(&self, _: &AuthRequest) -> Result<AuthResponse> {
            self.login.lock().unwrap().take().unwrap()
        }

        async fn register(&self, _: &AuthRequest) -> Result<AuthResponse> {
            self.register.lock().unwrap().take().unwrap()
        }

        async fn profile(&self) -> Result<User> {
            self.profile.lock().unwrap().take().unwrap()
        }
    }

    fn test_user(credits: i64) -> User {
        User {
            email: "pat@example.com".to_string(),
            credits,
            subscription_type: None,
            subscription_ends_at: None,
        }
    }

    #[tokio::test]
    async fn bootstrap_without_token_is_anonymous() {
        let mut auth = AuthContext::new(StubAuth::empty(), CredentialStore::in_memory());
        assert_eq!(auth.state(), &AuthState::Loading);
        auth.bootstrap().await;
        assert_eq!(auth.state(), &AuthState::Anonymous);
    }

    #[tokio::test]
    async fn bootstrap_with_valid_token_resolves_profile() {
        let credentials = CredentialStore::in_memory();
        credentials.store("tok-1").unwrap();
        let mut auth = AuthContext::new(
            StubAuth::with_profile(Ok(test_user(500))),
            credentials.clone(),
        );
        auth.bootstrap().await;
        assert!(auth.is_authenticated());
        assert_eq!(auth.balance(), 500);
        assert!(credentials.has_token());
    }

    #[tokio::test]
    async fn bootstrap_discards_stale_token() {
        let credentials = CredentialStore::in_memory();
        credentials.store("tok-stale").unwrap();
        let mut auth = AuthContext::new(
            StubAuth::with_profile(Err(Error::authentication("Invalid token"))),
            credentials.clone(),
        );
        auth.bootstrap().await;
        assert_eq!(auth.state(), &AuthState::Anonymous);
        assert!(!credentials.has_token());
    }

    #[tokio::test]
    async fn login_stores_token_and_user() {
        let credentials = CredentialStore::in_memory();
        let mut auth = AuthContext::new(
            StubAuth::with_login(Ok(AuthResponse {
                token: "tok-2".to_string(),
                user: test_user(1500),
            })),
            credentials.clone(),
        );
        auth.login("pat@example.com", "hunter2").await.unwrap();
        assert_eq!(credentials.token().as_deref(), Some("tok-2"));
        assert_eq!(auth.email(), Some("pat@example.com"));
        assert_eq!(auth.balance(), 1500);
    }

    #[tokio::test]
    async fn failed_login_leaves_state_untouched() {
        let credentials = CredentialStore::in_memory();
        let mut auth = AuthContext::new(
            StubAuth::with_login(Err(Error::authentication("Invalid credentials"))),
            credentials.clone(),
        );
        auth.bootstrap().await;
        let err = auth.login("pat@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }));
        assert_eq!(auth.state(), &AuthState::Anonymous);
        assert!(!credentials.has_token());
    }

    #[tokio::test]
    async fn logout_clears_credential() {
        let credentials = CredentialStore::in_memory();
        credentials.store("tok-3").unwrap();
        let mut auth = AuthContext::new(
            StubAuth::with_profile(Ok(test_user(100))),
            credentials.clone(),
        );
        auth.bootstrap().await;
        auth.logout();
        assert_eq!(auth.state(), &AuthState::Anonymous);
        assert!(!credentials.has_token());
    }

    #[tokio::test]
    async fn update_balance_is_noop_while_anonymous() {
        let mut auth = AuthContext::new(StubAuth::empty(), CredentialStore::in_memory());
        auth.bootstrap().await;
        auth.update_balance(9999);
        assert_eq!(auth.balance(), 0);
        assert_eq!(auth.state(), &AuthState::Anonymous);
    }
}
