// Public modules
pub mod chat;
pub mod credit_package;
pub mod history;
pub mod message;
pub mod payment;
pub mod subscription;
pub mod user;

// Re-exports
pub use chat::{ChatMode, ChatRequest, ChatResponse, DIAGNOSIS_COST, GENERAL_COST};
pub use credit_package::{CreditPackage, PACKAGES};
pub use history::{HistoryResponse, SessionRecord, StoredMessage, Transaction};
pub use message::{AssistantMessage, Message, MessageRole, TranscriptEntry, UserMessage};
pub use payment::{VerifyPaymentRequest, VerifyPaymentResponse};
pub use subscription::SubscriptionStatus;
pub use user::{AuthRequest, AuthResponse, User};
