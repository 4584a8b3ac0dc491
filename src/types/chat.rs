use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::TranscriptEntry;

/// Per-message cost of a general question, in credits.
pub const GENERAL_COST: i64 = 5;

/// Per-message cost of a diagnosis request, in credits.
pub const DIAGNOSIS_COST: i64 = 50;

/// The conversation mode, which determines per-message cost.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// General health questions.
    #[default]
    General,

    /// Symptom diagnosis requests.
    Diagnosis,
}

impl ChatMode {
    /// The per-message cost of this mode, in credits.
    pub fn cost(&self) -> i64 {
        match self {
            ChatMode::General => GENERAL_COST,
            ChatMode::Diagnosis => DIAGNOSIS_COST,
        }
    }

    /// The cost formatted as dollars, e.g. `$0.05`.
    pub fn cost_display(&self) -> String {
        format!("${:.2}", self.cost() as f64 / 100.0)
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::General => write!(f, "general"),
            ChatMode::Diagnosis => write!(f, "diagnosis"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(ChatMode::General),
            "diagnosis" => Ok(ChatMode::Diagnosis),
            other => Err(format!("unknown chat mode: {other}")),
        }
    }
}

/// The body of a `POST /chat` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The new user message.
    pub message: String,

    /// The prior transcript, role+content pairs only.
    pub history: Vec<TranscriptEntry>,

    /// The conversation mode.
    #[serde(rename = "type")]
    pub mode: ChatMode,

    /// Opaque identifier, stable for the lifetime of one conversation.
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// The body of a successful `POST /chat` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub reply: String,

    /// The account balance after this message was charged, in cents.
    #[serde(rename = "newBalance")]
    pub new_balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn mode_costs() {
        assert_eq!(ChatMode::General.cost(), 5);
        assert_eq!(ChatMode::Diagnosis.cost(), 50);
        assert_eq!(ChatMode::General.cost_display(), "$0.05");
        assert_eq!(ChatMode::Diagnosis.cost_display(), "$0.50");
    }

    #[test]
    fn mode_parse() {
        assert_eq!("general".parse::<ChatMode>().unwrap(), ChatMode::General);
        assert_eq!(
            "Diagnosis".parse::<ChatMode>().unwrap(),
            ChatMode::Diagnosis
        );
        assert!("triage".parse::<ChatMode>().is_err());
    }

    #[test]
    fn request_wire_shape() {
        let request = ChatRequest {
            message: "hi".to_string(),
            history: vec![TranscriptEntry::new(MessageRole::Assistant, "hello")],
            mode: ChatMode::Diagnosis,
            session_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "diagnosis");
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["history"][0]["role"], "assistant");
    }

    #[test]
    fn response_wire_shape() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"reply":"hello","newBalance":95}"#).unwrap();
        assert_eq!(response.reply, "hello");
        assert_eq!(response.new_balance, 95);
    }
}
