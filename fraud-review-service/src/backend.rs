//! Mock implementation of the backend contract (`/v1/*`), backed by the
//! intake stubs. Errors use a FastAPI-style `{detail}` body.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Json,
};
use fraud_intake::{
    ClaimFields, EvaluationReport, ExtractionEnvelope, ExtractionOptions, FraudDecision,
    chatbot_answer, evaluate_claim, evaluate_model, extract_claim, field_keys,
};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    models::{BackendChatRequest, ChatResponse, EvaluateRequest, ExtractQuery, IngestResponse},
    service::{ApiError, ApiResult, AppState},
    upload::read_upload_form,
};

fn detail_error(status: StatusCode, detail: &str) -> ApiError {
    (status, Json(json!({ "detail": detail })))
}

fn claim_fields_from(payload: &Value) -> Result<ClaimFields, ApiError> {
    ClaimFields::from_json(payload).ok_or_else(|| {
        detail_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Expected a JSON object of claim fields",
        )
    })
}

pub async fn extract(
    State(state): State<AppState>,
    Query(query): Query<ExtractQuery>,
    multipart: Multipart,
) -> ApiResult<ExtractionEnvelope> {
    let form = read_upload_form(multipart)
        .await
        .map_err(|e| detail_error(e.status(), &e.body_text()))?;

    let form_classify = form.classify_if_missing;
    let form_doc_type = form.doc_type.clone();
    let (upload, _) = form
        .into_parts()
        .map_err(|e| detail_error(StatusCode::BAD_REQUEST, &e.to_string()))?;

    let options = ExtractionOptions {
        doc_type: query.doc_type.or(form_doc_type),
        classify_if_missing: query.classify_if_missing.or(form_classify).unwrap_or(true),
    };

    state
        .rng
        .with(|rng| extract_claim(&upload, &options, rng))
        .map(Json)
        .map_err(|e| detail_error(StatusCode::BAD_REQUEST, &e.to_string()))
}

pub async fn chat(Json(request): Json<BackendChatRequest>) -> Json<ChatResponse> {
    Json(ChatResponse {
        response: chatbot_answer(&request.query),
    })
}

pub async fn ingest_to_graph(Json(payload): Json<Value>) -> ApiResult<IngestResponse> {
    let fields = claim_fields_from(&payload)?;
    let claim_id = fields
        .get(field_keys::CLAIM_ID)
        .unwrap_or("unknown")
        .to_string();

    // one node per field, linked to the claim node
    let nodes_created = fields.len();
    let relationships_created = nodes_created.saturating_sub(1);

    info!(claim_id = %claim_id, nodes_created, "Claim ingested into mock graph");

    Ok(Json(IngestResponse {
        status: "ingested".to_string(),
        claim_id,
        nodes_created,
        relationships_created,
    }))
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<FraudDecision> {
    let fields = claim_fields_from(&payload).inspect_err(|_| {
        warn!("Analyze request without claim fields");
    })?;
    Ok(Json(state.rng.with(|rng| evaluate_claim(&fields, rng))))
}

pub async fn evaluate(Query(request): Query<EvaluateRequest>) -> Json<EvaluationReport> {
    Json(evaluate_model(request.sample_size()))
}
