use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    claim::{ClaimFields, field_keys},
    error::IntakeError,
    random::{RandomSource, round_to},
};

/// Scores strictly above this are flagged as fraudulent
pub const FRAUD_THRESHOLD: f64 = 0.7;
pub const MIN_MOCK_SCORE: f64 = 0.2;
pub const MAX_MOCK_SCORE: f64 = 0.98;

pub const FRAUD_SIGNALS: [&str; 3] = [
    "Shared contact between claimant & service provider",
    "Unusual claim frequency in last 6 months",
    "High amount vs peer claims in same region",
];

pub const LEGIT_SIGNALS: [&str; 2] = [
    "No suspicious relationships detected",
    "Claim profile matches historical legitimate patterns",
];

/// Outcome of evaluating a claim.
///
/// `is_fraudulent` is derived from `fraud_score` on construction and cannot be
/// set independently; payloads where the two disagree fail to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDecision")]
pub struct FraudDecision {
    is_fraudulent: bool,
    fraud_score: f64,
    rules_triggered: Vec<String>,
}

#[derive(Deserialize)]
struct RawDecision {
    is_fraudulent: bool,
    fraud_score: f64,
    #[serde(default)]
    rules_triggered: Vec<String>,
}

impl TryFrom<RawDecision> for FraudDecision {
    type Error = IntakeError;

    fn try_from(raw: RawDecision) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&raw.fraud_score) {
            return Err(IntakeError::InconsistentDecision(format!(
                "fraud_score {} outside [0, 1]",
                raw.fraud_score
            )));
        }
        let decision = Self::from_score(raw.fraud_score, raw.rules_triggered);
        if decision.is_fraudulent != raw.is_fraudulent {
            return Err(IntakeError::InconsistentDecision(format!(
                "is_fraudulent={} disagrees with fraud_score={}",
                raw.is_fraudulent, raw.fraud_score
            )));
        }
        Ok(decision)
    }
}

impl FraudDecision {
    pub fn from_score(fraud_score: f64, rules_triggered: Vec<String>) -> Self {
        Self {
            is_fraudulent: fraud_score > FRAUD_THRESHOLD,
            fraud_score,
            rules_triggered,
        }
    }

    pub fn is_fraudulent(&self) -> bool {
        self.is_fraudulent
    }

    pub fn fraud_score(&self) -> f64 {
        self.fraud_score
    }

    pub fn rules_triggered(&self) -> &[String] {
        &self.rules_triggered
    }
}

/// Mock policy: draws a score and attaches the fixed signal list for its side
/// of the threshold. The claim fields are not inspected yet.
pub fn evaluate_claim(fields: &ClaimFields, rng: &mut dyn RandomSource) -> FraudDecision {
    let score = round_to(rng.uniform_f64(MIN_MOCK_SCORE, MAX_MOCK_SCORE), 2);
    let signals: &[&str] = if score > FRAUD_THRESHOLD {
        &FRAUD_SIGNALS
    } else {
        &LEGIT_SIGNALS
    };
    let decision =
        FraudDecision::from_score(score, signals.iter().map(|s| s.to_string()).collect());

    info!(
        claim_id = fields.get(field_keys::CLAIM_ID).unwrap_or("unknown"),
        fraud_score = decision.fraud_score,
        is_fraudulent = decision.is_fraudulent,
        "Fraud decision produced"
    );

    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn flag_always_matches_score() {
        let mut rng = SeededRandom::new(99);
        let fields = ClaimFields::fallback();
        for _ in 0..500 {
            let d = evaluate_claim(&fields, &mut rng);
            assert_eq!(d.is_fraudulent(), d.fraud_score() > FRAUD_THRESHOLD);
            assert!((MIN_MOCK_SCORE..=MAX_MOCK_SCORE).contains(&d.fraud_score()));
            assert_eq!(d.fraud_score(), round_to(d.fraud_score(), 2));
        }
    }

    #[test]
    fn threshold_is_strict() {
        let fields = ClaimFields::new();
        let mut rng = ScriptedRandom::floats([0.70, 0.71, 0.704]);

        let at = evaluate_claim(&fields, &mut rng);
        assert!(!at.is_fraudulent());
        assert_eq!(at.rules_triggered().len(), LEGIT_SIGNALS.len());

        let above = evaluate_claim(&fields, &mut rng);
        assert!(above.is_fraudulent());
        assert_eq!(above.rules_triggered()[0], FRAUD_SIGNALS[0]);

        // rounds down to 0.70
        let rounded = evaluate_claim(&fields, &mut rng);
        assert_eq!(rounded.fraud_score(), 0.7);
        assert!(!rounded.is_fraudulent());
    }

    #[test]
    fn inconsistent_payloads_are_rejected() {
        let bad = serde_json::json!({
            "is_fraudulent": true,
            "fraud_score": 0.3,
            "rules_triggered": []
        });
        assert!(serde_json::from_value::<FraudDecision>(bad).is_err());

        let out_of_range = serde_json::json!({
            "is_fraudulent": true,
            "fraud_score": 1.5
        });
        assert!(serde_json::from_value::<FraudDecision>(out_of_range).is_err());

        let good = serde_json::json!({
            "is_fraudulent": true,
            "fraud_score": 0.85,
            "rules_triggered": ["x"]
        });
        let d: FraudDecision = serde_json::from_value(good).unwrap();
        assert!(d.is_fraudulent());
        assert_eq!(d.rules_triggered(), ["x".to_string()]);
    }
}
