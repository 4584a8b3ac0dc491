use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The authenticated account as reported by the backend.
///
/// Credits are denominated in the smallest currency unit (cents). The balance
/// is mutated in place whenever the backend reports a new value; everything
/// else is backend-owned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// The account's email address.
    pub email: String,

    /// Credit balance in cents.
    pub credits: i64,

    /// Subscription plan name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,

    /// Subscription expiry, if any.
    #[serde(default, with = "crate::utils::time::option")]
    pub subscription_ends_at: Option<OffsetDateTime>,
}

impl User {
    /// Create a new `User` with the given email and balance and no
    /// subscription metadata.
    pub fn new(email: impl Into<String>, credits: i64) -> Self {
        Self {
            email: email.into(),
            credits,
            subscription_type: None,
            subscription_ends_at: None,
        }
    }

    /// The balance formatted as dollars, e.g. `$1.50`.
    pub fn balance_display(&self) -> String {
        format!("${:.2}", self.credits as f64 / 100.0)
    }
}

/// Response to a successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// The bearer credential to attach to subsequent requests.
    pub token: String,

    /// The authenticated account.
    pub user: User,
}

/// Credentials submitted to the login and registration endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthRequest {
    /// The account's email address.
    pub email: String,

    /// The account's password.
    pub password: String,
}

impl AuthRequest {
    /// Create a new `AuthRequest`.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}
