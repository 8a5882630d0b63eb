use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    claim::ExtractionEnvelope, decision::FraudDecision, error::Result,
    evaluation::EvaluationReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only chat transcript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatExchange {
    messages: Vec<ChatMessage>,
}

impl ChatExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Record one question/answer turn
    pub fn record_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.push(ChatMessage::user(question));
        self.push(ChatMessage::assistant(answer));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Per-reviewer state: the chat transcript plus the most recent claim,
/// decision and evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub chat_history: ChatExchange,
    pub last_claim: Option<ExtractionEnvelope>,
    pub last_decision: Option<FraudDecision>,
    pub last_evaluation: Option<EvaluationReport>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            chat_history: ChatExchange::new(),
            last_claim: None,
            last_decision: None,
            last_evaluation: None,
        }
    }

    /// Replace the previous claim and its decision
    pub fn record_claim(&mut self, claim: ExtractionEnvelope, decision: FraudDecision) {
        self.last_claim = Some(claim);
        self.last_decision = Some(decision);
    }
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for storing and retrieving review sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: ReviewSession) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<ReviewSession>>;
    /// Returns whether a session was removed
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// In-memory implementation of SessionStorage
#[derive(Clone, Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, ReviewSession>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: ReviewSession) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ReviewSession>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.sessions.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        claim::{ClaimFields, ExtractionEnvelope},
        decision::FraudDecision,
    };

    #[test]
    fn chat_history_is_ordered() {
        let mut history = ChatExchange::new();
        history.record_turn("hello", "hi there");
        history.record_turn("summary?", "upload first");

        let roles: Vec<ChatRole> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant
            ]
        );
        assert_eq!(history.messages()[2].content, "summary?");

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[1]["role"], "assistant");
    }

    #[test]
    fn new_claim_supersedes_previous() {
        let mut session = ReviewSession::new();
        let first = ExtractionEnvelope::fallback();
        let mut second = ExtractionEnvelope::fallback();
        second.result = ClaimFields::new().with("Claim ID", "CLM-2");

        session.record_claim(first, FraudDecision::from_score(0.9, vec![]));
        session.record_claim(second.clone(), FraudDecision::from_score(0.3, vec![]));

        assert_eq!(session.last_claim, Some(second));
        assert!(!session.last_decision.unwrap().is_fraudulent());
    }

    #[tokio::test]
    async fn storage_lifecycle() {
        let storage = InMemorySessionStorage::new();
        let session = ReviewSession::new();
        let id = session.id.clone();

        storage.save(session).await.unwrap();
        assert!(storage.get(&id).await.unwrap().is_some());
        assert_eq!(storage.len(), 1);

        assert!(storage.delete(&id).await.unwrap());
        assert!(storage.get(&id).await.unwrap().is_none());
        assert!(!storage.delete(&id).await.unwrap());
        assert!(storage.is_empty());
    }
}
