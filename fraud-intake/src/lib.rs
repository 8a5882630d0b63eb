pub mod assistant;
pub mod claim;
pub mod dashboard;
pub mod decision;
pub mod error;
pub mod evaluation;
pub mod monitoring;
pub mod random;
pub mod session;

// Re-export commonly used types
pub use assistant::{chatbot_answer, explain};
pub use claim::{
    ClaimFields, DocumentUpload, ExtractionEnvelope, ExtractionOptions, TokenUsage, extract_claim,
    field_keys,
};
pub use dashboard::{
    ClaimTypeCount, DailyCounts, DashboardAggregate, DashboardHeadline, FraudAlert, RiskLevel,
    dashboard_aggregate,
};
pub use decision::{FRAUD_THRESHOLD, FraudDecision, evaluate_claim};
pub use error::{IntakeError, Result};
pub use evaluation::{
    ClaimLabel, DEFAULT_SAMPLE_SIZE, EvaluationReport, MisclassifiedSample, evaluate_model,
};
pub use monitoring::{LogLevel, LogLine, SystemSnapshot, system_snapshot};
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use session::{
    ChatExchange, ChatMessage, ChatRole, InMemorySessionStorage, ReviewSession, SessionStorage,
};
