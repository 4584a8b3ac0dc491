use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::MessageRole;

/// A single message of a stored conversation, as returned by `GET /history`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMessage {
    /// The role of the message.
    pub role: MessageRole,

    /// The text content of the message.
    pub content: String,

    /// When the message was recorded.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,
}

/// An ordered past conversation. The backend returns each session as a bare
/// array of messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SessionRecord(pub Vec<StoredMessage>);

impl SessionRecord {
    /// When the conversation started, taken from its first message.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        self.0.first().map(|m| m.created_at)
    }

    /// Number of messages in the conversation.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the record holds no messages.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A read-only payment record displayed in history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Amount paid, in cents.
    pub amount: i64,

    /// When the payment was recorded.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// The amount formatted as dollars, e.g. `+$5.00`.
    pub fn amount_display(&self) -> String {
        format!("+${:.2}", self.amount as f64 / 100.0)
    }
}

/// The body of a `GET /history` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryResponse {
    /// Past conversations, most recent first.
    #[serde(rename = "chatHistory")]
    pub chat_history: Vec<SessionRecord>,

    /// Past payments, most recent first.
    #[serde(rename = "transactionHistory")]
    pub transaction_history: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nested_sessions() {
        let json = r#"{
            "chatHistory": [
                [
                    {"role":"user","content":"hi","created_at":"2024-05-01T12:00:00Z"},
                    {"role":"assistant","content":"hello","created_at":"2024-05-01T12:00:05Z"}
                ]
            ],
            "transactionHistory": [
                {"amount":500,"created_at":"2024-04-30T09:00:00Z"}
            ]
        }"#;
        let history: HistoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(history.chat_history.len(), 1);
        assert_eq!(history.chat_history[0].len(), 2);
        assert_eq!(history.transaction_history[0].amount, 500);
    }

    #[test]
    fn session_started_at() {
        let history: HistoryResponse = serde_json::from_str(
            r#"{"chatHistory":[[]],"transactionHistory":[]}"#,
        )
        .unwrap();
        assert!(history.chat_history[0].is_empty());
        assert!(history.chat_history[0].started_at().is_none());
    }

    #[test]
    fn transaction_display() {
        let tx: Transaction = serde_json::from_str(
            r#"{"amount":1500,"created_at":"2024-04-30T09:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount_display(), "+$15.00");
    }
}
