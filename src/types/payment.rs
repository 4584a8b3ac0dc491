use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The body of a `POST /credits/verify-payment` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifyPaymentRequest {
    /// The gateway-issued payment reference.
    pub reference: String,

    /// The amount that was charged, in cents.
    pub amount: i64,
}

impl VerifyPaymentRequest {
    /// Create a new `VerifyPaymentRequest`.
    pub fn new(reference: impl Into<String>, amount: i64) -> Self {
        Self {
            reference: reference.into(),
            amount,
        }
    }
}

/// The body of a successful `POST /credits/verify-payment` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifyPaymentResponse {
    /// The account balance after the credits were applied, in cents.
    #[serde(rename = "newBalance")]
    pub new_balance: i64,

    /// How many credits the payment added.
    #[serde(rename = "creditsAdded")]
    pub credits_added: i64,

    /// Subscription plan granted by the purchase, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,

    /// Subscription expiry granted by the purchase, if any.
    #[serde(default, with = "crate::utils::time::option")]
    pub subscription_ends_at: Option<OffsetDateTime>,
}
