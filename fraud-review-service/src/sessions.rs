//! Review-session handlers. Each request loads the session, works on its own
//! copy and saves it back.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use fraud_intake::{
    EvaluationReport, ReviewSession, chatbot_answer, evaluate_claim, evaluate_model, explain,
    extract_claim,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    models::{
        ClaimResponse, EvaluateRequest, ExplainRequest, ExplainResponse, SessionChatRequest,
        SessionChatResponse, SessionCreated,
    },
    service::{
        ApiError, ApiResult, AppState, bad_request_error, conflict_error, internal_error,
        multipart_error, not_found_error,
    },
    upload::read_upload_form,
};

fn validate_session_id(session_id: &str) -> Result<(), ApiError> {
    Uuid::parse_str(session_id)
        .map(|_| ())
        .map_err(|_| bad_request_error("Invalid session ID format"))
}

async fn load_session(state: &AppState, session_id: &str) -> Result<ReviewSession, ApiError> {
    validate_session_id(session_id)?;

    match state.session_storage.get(session_id).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => {
            info!(session_id = %session_id, "Session not found");
            Err(not_found_error("Session not found", session_id))
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to load session");
            Err(internal_error("Failed to load session", &e.to_string()))
        }
    }
}

async fn save_session(state: &AppState, session: ReviewSession) -> Result<(), ApiError> {
    let session_id = session.id.clone();
    state.session_storage.save(session).await.map_err(|e| {
        error!(session_id = %session_id, error = %e, "Failed to save session");
        internal_error("Failed to save session", &e.to_string())
    })
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let session = ReviewSession::new();
    let created = SessionCreated {
        session_id: session.id.clone(),
        created_at: session.created_at,
    };

    save_session(&state, session).await?;
    info!(session_id = %created.session_id, "Review session started");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ReviewSession> {
    load_session(&state, &session_id).await.map(Json)
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_session_id(&session_id)?;

    match state.session_storage.delete(&session_id).await {
        Ok(true) => {
            info!(session_id = %session_id, "Review session ended");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(not_found_error("Session not found", &session_id)),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to delete session");
            Err(internal_error("Failed to delete session", &e.to_string()))
        }
    }
}

/// Extract fields from the uploaded document, score them and keep both on the
/// session, replacing any earlier claim.
pub async fn upload_claim(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<ClaimResponse> {
    let mut session = load_session(&state, &session_id).await?;

    let form = read_upload_form(multipart)
        .await
        .map_err(|e| multipart_error(&e))?;
    let (upload, options) = form
        .into_parts()
        .map_err(|e| bad_request_error(&e.to_string()))?;

    let (extraction, decision) = state
        .rng
        .with(|rng| {
            let extraction = extract_claim(&upload, &options, rng)?;
            let decision = evaluate_claim(&extraction.result, rng);
            Ok::<_, fraud_intake::IntakeError>((extraction, decision))
        })
        .map_err(|e| bad_request_error(&e.to_string()))?;

    session.record_claim(extraction.clone(), decision.clone());
    save_session(&state, session).await?;

    info!(
        session_id = %session_id,
        doc_type = %extraction.doc_type,
        fraud_score = decision.fraud_score(),
        "Claim processed"
    );

    Ok(Json(ClaimResponse {
        session_id,
        extraction,
        decision,
    }))
}

pub async fn explain_claim(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ExplainRequest>,
) -> ApiResult<ExplainResponse> {
    let session = load_session(&state, &session_id).await?;

    if request.question.trim().is_empty() {
        return Err(bad_request_error("Question cannot be empty"));
    }

    let claim = session.last_claim.as_ref().ok_or_else(|| {
        conflict_error(
            "Upload a document first to ask why it is flagged or how the decision was made.",
        )
    })?;

    Ok(Json(ExplainResponse {
        answer: explain(&claim.result, &request.question),
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SessionChatRequest>,
) -> ApiResult<SessionChatResponse> {
    let mut session = load_session(&state, &session_id).await?;

    if request.message.trim().is_empty() {
        return Err(bad_request_error("Message cannot be empty"));
    }

    let response = chatbot_answer(&request.message);
    session
        .chat_history
        .record_turn(request.message, response.clone());
    let history = session.chat_history.clone();
    save_session(&state, session).await?;

    Ok(Json(SessionChatResponse { response, history }))
}

pub async fn evaluate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<EvaluateRequest>,
) -> ApiResult<EvaluationReport> {
    let mut session = load_session(&state, &session_id).await?;

    let report = evaluate_model(request.sample_size());
    session.last_evaluation = Some(report.clone());
    save_session(&state, session).await?;

    Ok(Json(report))
}
