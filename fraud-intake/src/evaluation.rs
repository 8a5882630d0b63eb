use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_SIZE: u32 = 500;

const BASE_SAMPLE: u32 = 100;
// [[tn, fp], [fn, tp]] per 100 samples
const BASE_CONFUSION: [[u32; 2]; 2] = [[45, 5], [8, 42]];

const MISCLASSIFIED: [(&str, ClaimLabel, f64); 4] = [
    ("CLM-102", ClaimLabel::Fraud, 0.45),
    ("CLM-156", ClaimLabel::Legit, 0.62),
    ("CLM-189", ClaimLabel::Fraud, 0.38),
    ("CLM-201", ClaimLabel::Legit, 0.55),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimLabel {
    Legit,
    Fraud,
}

impl ClaimLabel {
    pub fn opposite(self) -> Self {
        match self {
            ClaimLabel::Legit => ClaimLabel::Fraud,
            ClaimLabel::Fraud => ClaimLabel::Legit,
        }
    }
}

/// A sample the model got wrong; `predicted` is always the other label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MisclassifiedSample {
    pub claim_id: String,
    pub actual: ClaimLabel,
    pub predicted: ClaimLabel,
    /// Model confidence in the wrong prediction
    pub confidence: f64,
}

pub fn misclassified_samples() -> Vec<MisclassifiedSample> {
    MISCLASSIFIED
        .iter()
        .map(|(claim_id, actual, confidence)| MisclassifiedSample {
            claim_id: claim_id.to_string(),
            actual: *actual,
            predicted: actual.opposite(),
            confidence: *confidence,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub sample_size: u32,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub confusion_matrix: [[u32; 2]; 2],
    pub misclassified: Vec<MisclassifiedSample>,
}

/// Mock evaluation run: fixed metrics, confusion matrix scaled to the sample
pub fn evaluate_model(sample_size: u32) -> EvaluationReport {
    let scale = |n: u32| (u64::from(n) * u64::from(sample_size) / u64::from(BASE_SAMPLE)) as u32;
    let confusion_matrix = BASE_CONFUSION.map(|row| row.map(scale));

    EvaluationReport {
        sample_size,
        accuracy: 94.2,
        precision: 91.5,
        recall: 88.9,
        confusion_matrix,
        misclassified: misclassified_samples(),
    }
}
