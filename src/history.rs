use crate::client::HistoryApi;
use crate::error::Result;
use crate::types::{Message, MessageRole, SessionRecord, Transaction};

/// A past conversation lifted out of history, ready to continue.
///
/// Produced by [`HistoryView::restore`] and consumed whole by the chat
/// session, which swaps its transcript for this one.
#[derive(Clone, Debug)]
pub struct RestoredSession {
    pub messages: Vec<Message>,
    pub session_id: String,
}

/// A fetched snapshot of chat sessions and credit transactions.
///
/// Holds whatever the backend returned at fetch time; it does not refresh
/// itself. Clearing is the one mutation, and it touches chat sessions only.
#[derive(Debug, Default)]
pub struct HistoryView {
    chat_history: Vec<SessionRecord>,
    transactions: Vec<Transaction>,
}

impl HistoryView {
    /// Fetch both histories in one call.
    pub async fn fetch<H: HistoryApi>(api: &H) -> Result<Self> {
        let response = api.history().await?;
        Ok(Self {
            chat_history: response.chat_history,
            transactions: response.transaction_history,
        })
    }

    /// Past chat sessions, most recent ordering as returned by the backend.
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.chat_history
    }

    /// Credit purchases and deductions.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_empty(&self) -> bool {
        self.chat_history.is_empty() && self.transactions.is_empty()
    }

    /// Delete all chat sessions, leaving transactions untouched.
    ///
    /// Does nothing and returns `Ok(false)` unless `confirmed` is set; the
    /// caller is expected to have asked the user first. Local state is only
    /// emptied after the backend accepts the delete.
    pub async fn clear_chat_history<H: HistoryApi>(
        &mut self,
        api: &H,
        confirmed: bool,
    ) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }
        api.clear_history().await?;
        self.chat_history.clear();
        Ok(true)
    }

    /// Turn a stored session into a transcript the chat session can adopt.
    ///
    /// Returns `None` for an out-of-range index or an empty record. The
    /// restored session id is derived from the first message's timestamp so
    /// that continuing the conversation appends to the same backend session.
    pub fn restore(&self, index: usize) -> Option<RestoredSession> {
        let record = self.chat_history.get(index)?;
        let first = record.0.first()?;
        let session_id = format!("restored-{}", first.created_at.unix_timestamp());
        let messages = record
            .0
            .iter()
            .map(|stored| match stored.role {
                MessageRole::User => Message::user(&stored.content),
                MessageRole::Assistant => Message::assistant(&stored.content),
            })
            .collect();
        Some(RestoredSession {
            messages,
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::macros::datetime;

    use crate::error::Error;
    use crate::types::{HistoryResponse, StoredMessage};

    use super::*;

    struct StubHistory {
        history: Mutex<Option<Result<HistoryResponse>>>,
        clear: Mutex<Option<Result<()>>>,
        clear_calls: Mutex<usize>,
    }

    impl StubHistory {
        fn new(history: Result<HistoryResponse>, clear: Result<()>) -> Self {
            Self {
                history: Mutex::new(Some(history)),
                clear: Mutex::new(Some(clear)),
                clear_calls: Mutex::new(0),
            }
        }

        fn clear_calls(&self) -> usize {
            *self.clear_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl HistoryApi for StubHistory {
        async fn history(&self) -> Result<HistoryResponse> {
            self.history.lock().unwrap().take().unwrap()
        }

        async fn clear_history(&self) -> Result<()> {
            *self.clear_calls.lock().unwrap() += 1;
            self.clear.lock().unwrap().take().unwrap()
        }
    }

    fn sample_response() -> HistoryResponse {
        HistoryResponse {
            chat_history: vec![SessionRecord(vec![
                StoredMessage {
                    role: MessageRole::User,
                    content: "I have a headache".to_string(),
                    created_at: datetime!(2024-05-01 12:00:00 UTC),
                },
                StoredMessage {
                    role: MessageRole::Assistant,
                    content: "How long has it lasted?".to_string(),
                    created_at: datetime!(2024-05-01 12:00:05 UTC),
                },
            ])],
            transaction_history: vec![Transaction {
                amount: 1500,
                created_at: datetime!(2024-05-02 09:00:00 UTC),
            }],
        }
    }

    #[tokio::test]
    async fn fetch_splits_histories() {
        let stub = StubHistory::new(Ok(sample_response()), Ok(()));
        let view = HistoryView::fetch(&stub).await.unwrap();
        assert_eq!(view.sessions().len(), 1);
        assert_eq!(view.transactions().len(), 1);
        assert!(!view.is_empty());
    }

    #[tokio::test]
    async fn unconfirmed_clear_never_reaches_backend() {
        let stub = StubHistory::new(Ok(sample_response()), Ok(()));
        let mut view = HistoryView::fetch(&stub).await.unwrap();
        let cleared = view.clear_chat_history(&stub, false).await.unwrap();
        assert!(!cleared);
        assert_eq!(stub.clear_calls(), 0);
        assert_eq!(view.sessions().len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_sessions_only() {
        let stub = StubHistory::new(Ok(sample_response()), Ok(()));
        let mut view = HistoryView::fetch(&stub).await.unwrap();
        let cleared = view.clear_chat_history(&stub, true).await.unwrap();
        assert!(cleared);
        assert_eq!(stub.clear_calls(), 1);
        assert!(view.sessions().is_empty());
        assert_eq!(view.transactions().len(), 1);
    }

    #[tokio::test]
    async fn failed_clear_leaves_sessions_in_place() {
        let stub = StubHistory::new(
            Ok(sample_response()),
            Err(Error::service_unavailable("Try again later", None)),
        );
        let mut view = HistoryView::fetch(&stub).await.unwrap();
        let err = view.clear_chat_history(&stub, true).await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable { .. }));
        assert_eq!(view.sessions().len(), 1);
    }

    #[tokio::test]
    async fn restore_rebuilds_transcript() {
        let stub = StubHistory::new(Ok(sample_response()), Ok(()));
        let view = HistoryView::fetch(&stub).await.unwrap();
        let restored = view.restore(0).unwrap();
        assert_eq!(restored.messages.len(), 2);
        assert_eq!(restored.messages[0].role(), MessageRole::User);
        assert_eq!(restored.messages[0].content(), "I have a headache");
        assert!(!restored.messages[1].is_error());
        assert!(restored.session_id.starts_with("restored-"));
    }

    #[tokio::test]
    async fn restore_out_of_range_is_none() {
        let stub = StubHistory::new(Ok(sample_response()), Ok(()));
        let view = HistoryView::fetch(&stub).await.unwrap();
        assert!(view.restore(7).is_none());
    }
}
