use std::env;

use async_trait::async_trait;
use rand::Rng;

use crate::auth::AuthContext;
use crate::client::{AuthApi, CreditsApi};
use crate::error::{Error, Result};
use crate::observability::{PAYMENTS_CANCELLED, PAYMENTS_VERIFIED};
use crate::types::{
    CreditPackage, PACKAGES, SubscriptionStatus, VerifyPaymentRequest, VerifyPaymentResponse,
};

/// Smallest charge the gateway accepts, in cents.
const MIN_AMOUNT_CENTS: i64 = 100;

/// Settings for the card-collection gateway.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub public_key: String,
    pub currency: String,
}

impl GatewayConfig {
    /// Read the gateway key from GEMIDOC_PAYSTACK_KEY.
    pub fn from_env() -> Self {
        Self {
            public_key: env::var("GEMIDOC_PAYSTACK_KEY").unwrap_or_default(),
            currency: "USD".to_string(),
        }
    }

    /// Check that the configured key is present and is a public key.
    pub fn validate(&self) -> Result<()> {
        if self.public_key.is_empty() || !self.public_key.starts_with("pk_") {
            return Err(Error::validation(
                "Payment gateway public key is missing or malformed",
                Some("public_key".to_string()),
            ));
        }
        Ok(())
    }
}

/// What the gateway needs to collect a card payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkout {
    pub email: String,
    pub amount_cents: i64,
    pub currency: String,
    pub reference: String,
}

/// How a gateway interaction ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The charge went through; `reference` identifies it for verification.
    Success { reference: String },
    /// The user closed the gateway without paying.
    Cancelled,
    /// The gateway reported a failure.
    Failed(String),
}

/// Collects a card payment for a checkout.
///
/// The production implementation hands off to the hosted payment widget;
/// the terminal binary substitutes a prompt, and tests substitute scripts.
#[async_trait]
pub trait PaymentGateway {
    async fn collect(&self, checkout: &Checkout) -> GatewayOutcome;
}

/// How a whole purchase attempt ended, after verification.
#[derive(Clone, Debug, PartialEq)]
pub enum PurchaseOutcome {
    Verified(VerifyPaymentResponse),
    Cancelled,
    Failed(String),
}

/// Drives a credit purchase end to end.
///
/// Validates the checkout, runs the gateway, then has the backend verify
/// the charge. Credits are only ever granted by the backend's verification
/// response; a gateway success alone changes nothing.
pub struct PurchaseFlow<C: CreditsApi> {
    api: C,
    config: GatewayConfig,
}

impl<C: CreditsApi> PurchaseFlow<C> {
    pub fn new(api: C, config: GatewayConfig) -> Self {
        Self { api, config }
    }

    /// The packages on offer.
    pub fn packages(&self) -> &'static [CreditPackage] {
        PACKAGES
    }

    fn new_reference() -> String {
        let n: u32 = rand::thread_rng().gen_range(1..=1_000_000_000);
        format!("CRD_{n}")
    }

    /// Run one purchase: collect payment, verify it, apply the new balance.
    ///
    /// Preconditions fail before the gateway is ever invoked. A cancelled or
    /// failed gateway interaction is a normal outcome, not an error; only
    /// verification failures surface as `Err`, and those leave the cached
    /// balance untouched.
    pub async fn purchase<A: AuthApi, G: PaymentGateway>(
        &self,
        auth: &mut AuthContext<A>,
        package: &CreditPackage,
        gateway: &G,
    ) -> Result<PurchaseOutcome> {
        self.config.validate()?;
        let Some(email) = auth.email() else {
            return Err(Error::authentication("Sign in to purchase credits"));
        };
        if !email.contains('@') {
            return Err(Error::validation(
                "Account email is not valid",
                Some("email".to_string()),
            ));
        }
        if package.amount_cents < MIN_AMOUNT_CENTS {
            return Err(Error::validation(
                "Amount is below the gateway minimum",
                Some("amount".to_string()),
            ));
        }

        let checkout = Checkout {
            email: email.to_string(),
            amount_cents: package.amount_cents,
            currency: self.config.currency.clone(),
            reference: Self::new_reference(),
        };

        match gateway.collect(&checkout).await {
            GatewayOutcome::Success { reference } => {
                let request = VerifyPaymentRequest::new(&reference, package.amount_cents);
                let response = self.api.verify_payment(&request).await?;
                auth.update_balance(response.new_balance);
                auth.update_subscription(
                    response.subscription_type.clone(),
                    response.subscription_ends_at,
                );
                PAYMENTS_VERIFIED.click();
                Ok(PurchaseOutcome::Verified(response))
            }
            GatewayOutcome::Cancelled => {
                PAYMENTS_CANCELLED.click();
                Ok(PurchaseOutcome::Cancelled)
            }
            GatewayOutcome::Failed(message) => Ok(PurchaseOutcome::Failed(message)),
        }
    }

    /// `GET /credits/subscription` passthrough.
    pub async fn subscription_status(&self) -> Result<SubscriptionStatus> {
        self.api.subscription().await
    }
}

/// User-facing confirmation for a verified purchase.
pub fn success_message(response: &VerifyPaymentResponse) -> String {
    format!(
        "Payment verified: {} credits added. Your balance is now ${:.2}.",
        response.credits_added,
        response.new_balance as f64 / 100.0
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::credentials::CredentialStore;
    use crate::types::{AuthRequest, AuthResponse, User};

    use super::*;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            public_key: "pk_test_abc123".to_string(),
            currency: "USD".to_string(),
        }
    }

    struct StubCredits {
        verify: Mutex<Option<Result<VerifyPaymentResponse>>>,
    }

    impl StubCredits {
        fn new(verify: Result<VerifyPaymentResponse>) -> Self {
            Self {
                verify: Mutex::new(Some(verify)),
            }
        }

        // Panics if verification is ever reached.
        fn unused() -> Self {
            Self {
                verify: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CreditsApi for StubCredits {
        async fn verify_payment(
            &self,
            _: &VerifyPaymentRequest,
        ) -> Result<VerifyPaymentResponse> {
            self.verify
                .lock()
                .unwrap()
                .take()
                .expect("verify_payment should not be called")
        }

        async fn subscription(&self) -> Result<SubscriptionStatus> {
            unimplemented!("not exercised")
        }
    }

    struct StubAuth;

    #[async_trait]
    impl AuthApi for StubAuth {
        async fn login(&self, _: &AuthRequest) -> Result<AuthResponse> {
            Ok(AuthResponse {
                token: "tok".to_string(),
                user: User {
                    email: "pat@example.com".to_string(),
                    credits: 100,
                    subscription_type: None,
                    subscription_ends_at: None,
                },
            })
        }

        async fn register(&self, _: &AuthRequest) -> Result<AuthResponse> {
            unimplemented!("not exercised")
        }

        async fn profile(&self) -> Result<User> {
            unimplemented!("not exercised")
        }
    }

    struct ScriptedGateway {
        outcome: GatewayOutcome,
        checkouts: Mutex<Vec<Checkout>>,
    }

    impl ScriptedGateway {
        fn new(outcome: GatewayOutcome) -> Self {
            Self {
                outcome,
                checkouts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn collect(&self, checkout: &Checkout) -> GatewayOutcome {
            self.checkouts.lock().unwrap().push(checkout.clone());
            self.outcome.clone()
        }
    }

    async fn signed_in_auth() -> AuthContext<StubAuth> {
        let mut auth = AuthContext::new(StubAuth, CredentialStore::in_memory());
        auth.login("pat@example.com", "hunter2").await.unwrap();
        auth
    }

    #[tokio::test]
    async fn malformed_key_fails_before_gateway() {
        let flow = PurchaseFlow::new(
            StubCredits::unused(),
            GatewayConfig {
                public_key: "sk_live_oops".to_string(),
                currency: "USD".to_string(),
            },
        );
        let mut auth = signed_in_auth().await;
        let gateway = ScriptedGateway::new(GatewayOutcome::Cancelled);
        let err = flow
            .purchase(&mut auth, &PACKAGES[0], &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(gateway.checkouts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_purchase_is_rejected() {
        let flow = PurchaseFlow::new(StubCredits::unused(), test_config());
        let mut auth = AuthContext::new(StubAuth, CredentialStore::in_memory());
        auth.logout();
        let gateway = ScriptedGateway::new(GatewayOutcome::Cancelled);
        let err = flow
            .purchase(&mut auth, &PACKAGES[0], &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }));
    }

    #[tokio::test]
    async fn cancelled_gateway_skips_verification() {
        let credits = StubCredits::unused();
        let flow = PurchaseFlow::new(credits, test_config());
        let mut auth = signed_in_auth().await;
        let gateway = ScriptedGateway::new(GatewayOutcome::Cancelled);
        let outcome = flow
            .purchase(&mut auth, &PACKAGES[0], &gateway)
            .await
            .unwrap();
        assert_eq!(outcome, PurchaseOutcome::Cancelled);
        assert_eq!(auth.balance(), 100);
    }

    #[tokio::test]
    async fn verified_purchase_applies_balance() {
        let credits = StubCredits::new(Ok(VerifyPaymentResponse {
            new_balance: 15000,
            credits_added: 120,
            subscription_type: None,
            subscription_ends_at: None,
        }));
        let flow = PurchaseFlow::new(credits, test_config());
        let mut auth = signed_in_auth().await;
        let gateway = ScriptedGateway::new(GatewayOutcome::Success {
            reference: "CRD_123".to_string(),
        });
        let outcome = flow
            .purchase(&mut auth, &PACKAGES[1], &gateway)
            .await
            .unwrap();
        let PurchaseOutcome::Verified(response) = outcome else {
            panic!("expected verification");
        };
        assert_eq!(auth.balance(), 15000);
        assert!(success_message(&response).contains("$150.00"));

        let checkouts = gateway.checkouts.lock().unwrap();
        assert_eq!(checkouts.len(), 1);
        assert_eq!(checkouts[0].amount_cents, PACKAGES[1].amount_cents);
        assert!(checkouts[0].reference.starts_with("CRD_"));
    }

    #[tokio::test]
    async fn failed_verification_leaves_balance() {
        let credits = StubCredits::new(Err(Error::not_found("Unknown reference")));
        let flow = PurchaseFlow::new(credits, test_config());
        let mut auth = signed_in_auth().await;
        let gateway = ScriptedGateway::new(GatewayOutcome::Success {
            reference: "CRD_999".to_string(),
        });
        let err = flow
            .purchase(&mut auth, &PACKAGES[0], &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(auth.balance(), 100);
    }

    #[tokio::test]
    async fn gateway_failure_is_reported_not_raised() {
        let credits = StubCredits::unused();
        let flow = PurchaseFlow::new(credits, test_config());
        let mut auth = signed_in_auth().await;
        let gateway =
            ScriptedGateway::new(GatewayOutcome::Failed("Card declined".to_string()));
        let outcome = flow
            .purchase(&mut auth, &PACKAGES[0], &gateway)
            .await
            .unwrap();
        assert_eq!(outcome, PurchaseOutcome::Failed("Card declined".to_string()));
    }
}
