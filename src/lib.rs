// Public modules
pub mod auth;
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod credentials;
pub mod credits;
pub mod error;
pub mod history;
pub mod observability;
pub mod render;
pub mod types;
pub mod utils;

// Re-exports
pub use auth::{AuthContext, AuthState};
pub use client::{AuthApi, ChatApi, CreditsApi, GemiDoc, HistoryApi};
pub use client_logger::ClientLogger;
pub use credentials::CredentialStore;
pub use credits::{
    Checkout, GatewayConfig, GatewayOutcome, PaymentGateway, PurchaseFlow, PurchaseOutcome,
};
pub use error::{Error, Result};
pub use history::{HistoryView, RestoredSession};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
