//! Conversation state and the send loop.

use std::time::Instant;

use uuid::Uuid;

use crate::auth::AuthContext;
use crate::client::{AuthApi, ChatApi};
use crate::error::{Error, Result};
use crate::history::RestoredSession;
use crate::observability::{
    CHAT_CREDIT_DENIALS, CHAT_SEND_ERRORS, CHAT_SENDS, CHAT_TURN_DURATION,
};
use crate::types::{ChatMode, ChatRequest, Message};

/// Opens every fresh conversation.
pub const GREETING: &str = "Hello! I am Dr. Gemini, your AI health assistant. How can I help you today? You can ask a general health question or request a diagnosis for your symptoms.";

/// Pre-filled draft when diagnosis mode is selected.
pub const DIAGNOSIS_SCAFFOLD: &str = "I would like a diagnosis. Here are my symptoms: ";

/// Shown in the transcript when a send fails without a backend message.
const GENERIC_SEND_FAILURE: &str = "Sorry, something went wrong. Please try again.";

/// What happened to a send request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The turn completed and the transcript grew by two messages.
    Replied,
    /// Nothing was sent: the input was blank or a send was already in flight.
    Skipped,
}

/// One conversation with the assistant.
///
/// Owns the transcript, the draft input, the chat mode, and the session id
/// the backend uses to group messages. At most one send is in flight at a
/// time; a send attempted while another is outstanding is skipped rather
/// than queued.
pub struct ChatSession<C: ChatApi> {
    client: C,
    messages: Vec<Message>,
    draft: String,
    in_flight: bool,
    mode: ChatMode,
    session_id: String,
}

impl<C: ChatApi> ChatSession<C> {
    pub fn new(client: C) -> Self {
        let mut session = Self {
            client,
            messages: Vec::new(),
            draft: String::new(),
            in_flight: false,
            mode: ChatMode::General,
            session_id: String::new(),
        };
        session.start_new_session();
        session
    }

    /// Reset to a fresh conversation: greeting, new session id, general mode.
    pub fn start_new_session(&mut self) {
        self.messages = vec![Message::assistant(GREETING)];
        self.draft.clear();
        self.mode = ChatMode::General;
        self.session_id = Uuid::new_v4().to_string();
    }

    /// Swap the transcript for a past conversation.
    ///
    /// The replacement is atomic: either the whole restored transcript is
    /// adopted, or (for an empty one) a fresh conversation starts instead.
    /// Mode and draft are left alone.
    pub fn restore_session(&mut self, restored: RestoredSession) {
        if restored.messages.is_empty() {
            self.start_new_session();
            return;
        }
        self.messages = restored.messages;
        self.session_id = restored.session_id;
    }

    /// Switch chat mode, checking the balance up front for diagnosis.
    ///
    /// Selecting diagnosis without enough credits fails and changes nothing;
    /// selecting it with enough credits pre-fills the draft with a symptom
    /// scaffold. Switching back to general discards an untouched scaffold.
    pub fn select_mode(&mut self, mode: ChatMode, balance: i64) -> Result<()> {
        if mode == ChatMode::Diagnosis && balance < mode.cost() {
            CHAT_CREDIT_DENIALS.click();
            return Err(Error::insufficient_credit(format!(
                "Diagnosis requires {} credits",
                mode.cost()
            )));
        }
        self.mode = mode;
        match mode {
            ChatMode::Diagnosis => {
                self.draft = DIAGNOSIS_SCAFFOLD.to_string();
            }
            ChatMode::General => {
                if self.draft == DIAGNOSIS_SCAFFOLD {
                    self.draft.clear();
                }
            }
        }
        Ok(())
    }

    /// Send one user message and wait for the reply.
    ///
    /// Blank input and sends attempted while another is outstanding are
    /// skipped. An insufficient balance fails before anything is sent or
    /// appended. Otherwise the user message lands in the transcript
    /// immediately, and the turn always ends with exactly one assistant
    /// message: the reply, or an error entry when the call failed. The
    /// balance is only updated from the backend's response.
    pub async fn send<A: AuthApi>(
        &mut self,
        auth: &mut AuthContext<A>,
        text: &str,
    ) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return Ok(SendOutcome::Skipped);
        }
        if auth.balance() < self.mode.cost() {
            CHAT_CREDIT_DENIALS.click();
            return Err(Error::insufficient_credit(format!(
                "This message requires {} credits",
                self.mode.cost()
            )));
        }

        let history = self.messages.iter().map(Message::to_entry).collect();
        let request = ChatRequest {
            message: text.to_string(),
            history,
            mode: self.mode,
            session_id: self.session_id.clone(),
        };

        self.messages.push(Message::user(text));
        self.draft.clear();
        self.in_flight = true;
        CHAT_SENDS.click();
        let start = Instant::now();

        let result = self.client.chat(&request).await;
        CHAT_TURN_DURATION.add(start.elapsed().as_secs_f64());

        let outcome = match result {
            Ok(response) => {
                self.messages.push(Message::assistant(&response.reply));
                auth.update_balance(response.new_balance);
                Ok(SendOutcome::Replied)
            }
            Err(err) => {
                CHAT_SEND_ERRORS.click();
                let content = err
                    .backend_message()
                    .unwrap_or(GENERIC_SEND_FAILURE)
                    .to_string();
                self.messages.push(Message::error(&content));
                Err(err)
            }
        };
        self.in_flight = false;
        outcome
    }

    pub fn transcript(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}
