use chrono::{DateTime, Utc};
use fraud_intake::{ChatExchange, DEFAULT_SAMPLE_SIZE, ExtractionEnvelope, FraudDecision};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct RelayChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /v1/chat`
#[derive(Debug, Serialize, Deserialize)]
pub struct BackendChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub sample_size: Option<u32>,
}

impl EvaluateRequest {
    pub fn sample_size(&self) -> u32 {
        self.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE)
    }
}

/// Query string of `POST /v1/extract`
#[derive(Debug, Default, Deserialize)]
pub struct ExtractQuery {
    pub doc_type: Option<String>,
    pub classify_if_missing: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub claim_id: String,
    pub nodes_created: usize,
    pub relationships_created: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub session_id: String,
    pub extraction: ExtractionEnvelope,
    pub decision: FraudDecision,
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionChatResponse {
    pub response: String,
    pub history: ChatExchange,
}
