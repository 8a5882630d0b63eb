use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::{
    error::{IntakeError, Result},
    random::{RandomSource, round_to},
};

/// Recognized ClaimFields keys
pub mod field_keys {
    pub const CLAIM_ID: &str = "Claim ID";
    pub const POLICY_HOLDER: &str = "Policy Holder";
    pub const POLICY_ID: &str = "Policy ID";
    pub const CLAIM_AMOUNT: &str = "Claim Amount";
    pub const INCIDENT_TYPE: &str = "Incident Type";
    pub const REGION: &str = "Region";

    pub const ALL: [&str; 6] = [
        CLAIM_ID,
        POLICY_HOLDER,
        POLICY_ID,
        CLAIM_AMOUNT,
        INCIDENT_TYPE,
        REGION,
    ];
}

pub const AUTO_DETECT: &str = "Auto-Detect";
pub const UNKNOWN_DOC_TYPE: &str = "Unknown";
pub const EXTRACTION_MODEL: &str = "mock-extractor-v1";

const COST_PER_1K_TOKENS: f64 = 0.03;
const BASE_PROMPT_TOKENS: u64 = 200;
const COMPLETION_TOKENS: u64 = 120;

/// Field name to display-string map extracted from a claim document.
///
/// Values are free-form strings; nothing is parsed into amounts or dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimFields(BTreeMap<String, String>);

impl ClaimFields {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read fields from a JSON object, or from the `result` of an extraction
    /// envelope. Scalar values are stringified; nested values are skipped.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value
            .get("result")
            .filter(|inner| inner.is_object())
            .unwrap_or(value)
            .as_object()?;

        Some(
            object
                .iter()
                .filter_map(|(key, value)| {
                    let text = match value {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Number(n) => n.to_string(),
                        serde_json::Value::Bool(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((key.clone(), text))
                })
                .collect(),
        )
    }

    /// Fixed values returned when the extraction backend is unreachable
    pub fn fallback() -> Self {
        Self::new()
            .with(field_keys::CLAIM_ID, "CLM-0000")
            .with(field_keys::POLICY_HOLDER, "John Doe")
            .with(field_keys::POLICY_ID, "POL-000000")
            .with(field_keys::CLAIM_AMOUNT, "$45,000")
            .with(field_keys::INCIDENT_TYPE, "Medical Treatment")
            .with(field_keys::REGION, "Unknown")
    }
}

impl FromIterator<(String, String)> for ClaimFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An uploaded document: opaque bytes plus the declared name and media type
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Rejects uploads with no file name or no content
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(IntakeError::InputError("No selected file".to_string()));
        }
        if self.bytes.is_empty() {
            return Err(IntakeError::InputError(format!(
                "File {} is empty",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// Options passed alongside an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOptions {
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default = "default_classify")]
    pub classify_if_missing: bool,
}

fn default_classify() -> bool {
    true
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            doc_type: None,
            classify_if_missing: true,
        }
    }
}

impl ExtractionOptions {
    /// The caller's hint, ignoring blanks and the "Auto-Detect" placeholder
    pub fn doc_type_hint(&self) -> Option<&str> {
        self.doc_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != AUTO_DETECT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    pub fn cost_estimate(&self) -> f64 {
        round_to(self.total_tokens as f64 / 1000.0 * COST_PER_1K_TOKENS, 4)
    }
}

/// Response shape of the extraction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionEnvelope {
    pub doc_type: String,
    pub model: String,
    pub result: ClaimFields,
    pub usage: TokenUsage,
    pub cost_estimate: f64,
}

impl ExtractionEnvelope {
    /// Envelope served when the extraction backend cannot be reached
    pub fn fallback() -> Self {
        let usage = TokenUsage::new(0, 0);
        Self {
            doc_type: "Medical Bill".to_string(),
            model: "mock-fallback".to_string(),
            result: ClaimFields::fallback(),
            usage,
            cost_estimate: usage.cost_estimate(),
        }
    }
}

/// Guess a document type from keywords in the file name
pub fn classify_document(file_name: &str) -> &'static str {
    let name = file_name.to_lowercase();
    if name.contains("police") {
        "Police Report"
    } else if ["bill", "medical", "invoice"].iter().any(|k| name.contains(k)) {
        "Medical Bill"
    } else if ["estimate", "repair"].iter().any(|k| name.contains(k)) {
        "Repair Estimate"
    } else {
        "Claim Form"
    }
}

fn incident_type_for(doc_type: &str) -> &'static str {
    match doc_type {
        "Police Report" => "Theft",
        "Medical Bill" => "Medical Treatment",
        "Repair Estimate" => "Property Damage",
        _ => "Auto Accident",
    }
}

/// Mock extraction: validates the upload, resolves a document type and fills
/// the six recognized fields.
pub fn extract_claim(
    upload: &DocumentUpload,
    options: &ExtractionOptions,
    rng: &mut dyn RandomSource,
) -> Result<ExtractionEnvelope> {
    upload.validate()?;

    let doc_type = match options.doc_type_hint() {
        Some(hint) => hint.to_string(),
        None if options.classify_if_missing => classify_document(&upload.file_name).to_string(),
        None => UNKNOWN_DOC_TYPE.to_string(),
    };
    debug!(file_name = %upload.file_name, doc_type = %doc_type, "Resolved document type");

    let result = ClaimFields::new()
        .with(
            field_keys::CLAIM_ID,
            format!("CLM-{}", rng.uniform_int(1000, 9999)),
        )
        .with(field_keys::POLICY_HOLDER, "John Doe")
        .with(
            field_keys::POLICY_ID,
            format!("POL-{}", rng.uniform_int(100_000, 999_999)),
        )
        .with(field_keys::CLAIM_AMOUNT, "$45,000")
        .with(field_keys::INCIDENT_TYPE, incident_type_for(&doc_type))
        .with(field_keys::REGION, "North District");

    let usage = TokenUsage::new(
        BASE_PROMPT_TOKENS + upload.bytes.len() as u64 / 4,
        COMPLETION_TOKENS,
    );

    info!(
        file_name = %upload.file_name,
        content_type = %upload.content_type,
        bytes = upload.bytes.len(),
        doc_type = %doc_type,
        "Claim fields extracted"
    );

    Ok(ExtractionEnvelope {
        doc_type,
        model: EXTRACTION_MODEL.to_string(),
        result,
        usage,
        cost_estimate: usage.cost_estimate(),
    })
}
