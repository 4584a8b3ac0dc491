//! Logging trait for GemiDoc client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to
//! capture the API interactions that move money or credits: chat replies
//! (which carry the post-charge balance) and payment verifications.

use crate::types::{ChatResponse, VerifyPaymentResponse};

/// A trait for logging GemiDoc client operations.
///
/// Implement this trait to record balance-affecting API traffic.
///
/// # Example
///
/// ```rust,ignore
/// use gemidoc::{ChatResponse, ClientLogger, VerifyPaymentResponse};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_chat_response(&self, response: &ChatResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "chat: balance={}", response.new_balance).unwrap();
///     }
///
///     fn log_payment_verified(&self, response: &VerifyPaymentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "payment: +{} credits", response.credits_added).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a successful chat response.
    ///
    /// Called once per successful `chat` call with the reply and the new
    /// balance the backend reported.
    fn log_chat_response(&self, response: &ChatResponse);

    /// Log a successful payment verification.
    ///
    /// Called once per successful `verify_payment` call.
    fn log_payment_verified(&self, response: &VerifyPaymentResponse);
}
