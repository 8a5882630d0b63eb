//! UI-facing routes that forward to `BACKEND_URL`

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

use crate::{
    models::{EvaluateRequest, RelayChatRequest},
    relay::RelayResponse,
    service::{AppState, bad_request_error, multipart_error},
    upload::read_upload_form,
};

pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(e) => return multipart_error(&e).into_response(),
    };
    let (upload, options) = match form.into_parts() {
        Ok(parts) => parts,
        Err(e) => return bad_request_error(&e.to_string()).into_response(),
    };

    state.relay.extract(upload, &options).await.into_response()
}

pub async fn fraud_ingest(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> RelayResponse {
    state.relay.ingest_to_graph(&payload).await
}

pub async fn fraud_analyze(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> RelayResponse {
    state.relay.analyze(&payload).await
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<RelayChatRequest>,
) -> RelayResponse {
    state.relay.chat(&request.message).await
}

pub async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> RelayResponse {
    state.relay.evaluate(request.sample_size()).await
}
