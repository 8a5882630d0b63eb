//! Rule-based assistant replies. Everything here is a pure function of its
//! inputs.

use crate::claim::{ClaimFields, field_keys};

const MISSING: &str = "N/A";

pub const FRAUD_LIKELIHOOD_SENTENCE: &str =
    "Overall, these patterns increase the fraud likelihood for this claim.";

pub const GENERIC_JUSTIFICATION: &str = "I analyze historical links, unusual patterns, amounts, and relationships in the Neo4j graph to justify the decision.";

pub const HOW_FRAUD_WORKS_ANSWER: &str = "Our system detects fraud by combining:\n\
- Document analysis using LLMs\n\
- Relationship graphs in Neo4j\n\
- Historical patterns of suspicious activity.";

pub const SUMMARY_ANSWER: &str = "Upload a document on the Upload & Detect page, and I’ll summarize key claim details for you.";

pub const NEO4J_ANSWER: &str = "Neo4j stores entities (claimants, agents, providers, policies) and their relationships to spot hidden fraud rings.";

pub const GREETING_ANSWER: &str =
    "Hello 👋 I’m your Fraud Assistant. Ask me about claims, fraud logic, or how the system works.";

pub const FALLBACK_ANSWER: &str = "Great question. Right now I’m a demo bot. In the full version, I’ll use your documentation and graph data to give precise, explainable answers. 🧠";

/// Reply shown when the chat relay cannot reach the backend
pub const OFFLINE_ANSWER: &str =
    "I'm having trouble connecting to the brain (Backend). <br><i>Error: Connection refused</i>";

/// A keyword rule: matches when every keyword in any one group is present
struct ChatRule {
    any_of: &'static [&'static [&'static str]],
    answer: &'static str,
}

const CHAT_RULES: &[ChatRule] = &[
    ChatRule {
        any_of: &[&["fraud", "how"]],
        answer: HOW_FRAUD_WORKS_ANSWER,
    },
    ChatRule {
        any_of: &[&["summary"]],
        answer: SUMMARY_ANSWER,
    },
    ChatRule {
        any_of: &[&["neo4j"]],
        answer: NEO4J_ANSWER,
    },
    ChatRule {
        any_of: &[&["hi"], &["hello"]],
        answer: GREETING_ANSWER,
    },
];

impl ChatRule {
    fn matches(&self, message: &str) -> bool {
        self.any_of
            .iter()
            .any(|group| group.iter().all(|kw| message.contains(kw)))
    }
}

/// Explain a decision for the given claim.
///
/// Questions containing "why" get the claim-specific rationale; anything else
/// gets the generic justification.
pub fn explain(claim: &ClaimFields, question: &str) -> String {
    if !question.to_lowercase().contains("why") {
        return GENERIC_JUSTIFICATION.to_string();
    }

    let holder = claim.get(field_keys::POLICY_HOLDER).unwrap_or(MISSING);
    let amount = claim.get(field_keys::CLAIM_AMOUNT).unwrap_or(MISSING);

    format!(
        "\nBased on the graph analysis and claim details:\n\n\
         - The claimant **{holder}** is linked to multiple high-value claims.\n\
         - The claim amount **{amount}** is unusual for similar incidents.\n\
         - Connections between claimant, agent, and service providers match known fraud patterns.\n\
         \n{FRAUD_LIKELIHOOD_SENTENCE}"
    )
}

/// Answer a free-text chat message; the first matching rule wins
pub fn chatbot_answer(message: &str) -> String {
    let message = message.to_lowercase();
    CHAT_RULES
        .iter()
        .find(|rule| rule.matches(&message))
        .map(|rule| rule.answer)
        .unwrap_or(FALLBACK_ANSWER)
        .to_string()
}
