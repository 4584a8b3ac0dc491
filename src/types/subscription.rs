use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The body of a `GET /credits/subscription` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionStatus {
    /// Whether the account currently has an active subscription.
    pub active: bool,

    /// The plan name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,

    /// When the subscription expires, if any.
    #[serde(default, with = "crate::utils::time::option")]
    pub subscription_ends_at: Option<OffsetDateTime>,
}
