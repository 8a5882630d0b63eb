//! HTTP relay to the remote backend.
//!
//! Every call is a single round trip with a per-route timeout and no retry.
//! Failures never escape this module: they become a [`RelayResponse`] with the
//! status and body the UI expects.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fraud_intake::{DocumentUpload, ExtractionEnvelope, ExtractionOptions, assistant};
use reqwest::{Client, RequestBuilder, multipart};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RelayTimeouts;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Backend unreachable or timed out
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend replied with something that is not JSON
    #[error("invalid JSON from backend (status={status})")]
    Decode { status: u16, text: String },

    /// Backend replied with a non-2xx status
    #[error("backend returned {status}")]
    Backend { status: u16, detail: Value },

    /// Request rejected before any network call
    #[error("{0}")]
    Input(String),
}

/// Backend endpoints reachable through the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayRoute {
    Extract,
    Chat,
    IngestToGraph,
    Analyze,
    Evaluate,
}

impl RelayRoute {
    pub fn path(self) -> &'static str {
        match self {
            RelayRoute::Extract => "/v1/extract",
            RelayRoute::Chat => "/v1/chat",
            RelayRoute::IngestToGraph => "/v1/fraud/ingest_to_graph",
            RelayRoute::Analyze => "/v1/fraud/analyze",
            RelayRoute::Evaluate => "/v1/evaluate",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            RelayRoute::Extract => "Backend connection failed",
            RelayRoute::Chat => "Chat backend failed",
            RelayRoute::IngestToGraph => "Graph ingestion failed",
            RelayRoute::Analyze => "Fraud analysis failed",
            RelayRoute::Evaluate => "Evaluation failed",
        }
    }

    fn timeout(self, timeouts: &RelayTimeouts) -> Duration {
        match self {
            RelayRoute::Extract => timeouts.extract,
            RelayRoute::Chat => timeouts.chat,
            RelayRoute::IngestToGraph | RelayRoute::Analyze => timeouts.graph,
            RelayRoute::Evaluate => timeouts.evaluate,
        }
    }
}

impl RelayError {
    /// Status and JSON body reported to the caller for this failure
    pub fn into_response_parts(self, route: RelayRoute) -> (StatusCode, Value) {
        match self {
            RelayError::Transport(e) => {
                let mut body = json!({
                    "error": route.failure_message(),
                    "details": e.to_string(),
                });
                match route {
                    RelayRoute::Extract => {
                        if let (Some(target), Ok(Value::Object(fallback))) = (
                            body.as_object_mut(),
                            serde_json::to_value(ExtractionEnvelope::fallback()),
                        ) {
                            target.extend(fallback);
                            target.insert("mock_fallback".to_string(), Value::Bool(true));
                        }
                    }
                    RelayRoute::Chat => {
                        body["response"] = json!(assistant::OFFLINE_ANSWER);
                    }
                    _ => {}
                }
                (StatusCode::SERVICE_UNAVAILABLE, body)
            }
            RelayError::Decode { status, text } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": format!("invalid_json_from_backend (status={status})"),
                    "text": text,
                }),
            ),
            RelayError::Backend { status, detail } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({
                    "error": format!("backend_{status}"),
                    "detail": detail,
                }),
            ),
            RelayError::Input(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
        }
    }
}

/// Outcome of a relay call, ready to hand back to the client
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl RelayResponse {
    fn from_result(route: RelayRoute, result: Result<Value, RelayError>) -> Self {
        match result {
            Ok(body) => Self {
                status: StatusCode::OK,
                body,
            },
            Err(e) => {
                warn!(route = route.path(), error = %e, "Relay call failed");
                let (status, body) = e.into_response_parts(route);
                Self { status, body }
            }
        }
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Client for the remote backend
#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
    timeouts: RelayTimeouts,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, timeouts: RelayTimeouts) -> Result<Self, RelayError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: RelayRoute) -> String {
        format!("{}{}", self.base_url, route.path())
    }

    /// Forward a document to `/v1/extract`
    pub async fn extract(&self, upload: DocumentUpload, options: &ExtractionOptions) -> RelayResponse {
        let route = RelayRoute::Extract;
        let result = self.try_extract(upload, options).await;
        RelayResponse::from_result(route, result)
    }

    async fn try_extract(
        &self,
        upload: DocumentUpload,
        options: &ExtractionOptions,
    ) -> Result<Value, RelayError> {
        upload
            .validate()
            .map_err(|e| RelayError::Input(e.to_string()))?;

        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|_| {
                RelayError::Input(format!("Invalid content type: {}", upload.content_type))
            })?;
        let form = multipart::Form::new().part("file", part);

        let mut params = vec![(
            "classify_if_missing",
            options.classify_if_missing.to_string(),
        )];
        if let Some(doc_type) = options.doc_type_hint() {
            params.push(("doc_type", doc_type.to_string()));
        }

        let request = self
            .client
            .post(self.url(RelayRoute::Extract))
            .query(&params)
            .multipart(form);
        self.send(RelayRoute::Extract, request).await
    }

    /// Forward a chat message to `/v1/chat` as `{query}`
    pub async fn chat(&self, message: &str) -> RelayResponse {
        let request = self
            .client
            .post(self.url(RelayRoute::Chat))
            .json(&json!({ "query": message }));
        let result = self.send(RelayRoute::Chat, request).await;
        RelayResponse::from_result(RelayRoute::Chat, result)
    }

    /// Forward extracted fields to `/v1/fraud/ingest_to_graph`
    pub async fn ingest_to_graph(&self, payload: &Value) -> RelayResponse {
        self.forward_json(RelayRoute::IngestToGraph, payload).await
    }

    /// Forward graph data to `/v1/fraud/analyze`
    pub async fn analyze(&self, payload: &Value) -> RelayResponse {
        self.forward_json(RelayRoute::Analyze, payload).await
    }

    /// Start an evaluation run on the backend
    pub async fn evaluate(&self, sample_size: u32) -> RelayResponse {
        let request = self
            .client
            .post(self.url(RelayRoute::Evaluate))
            .query(&[("sample_size", sample_size)]);
        let result = self.send(RelayRoute::Evaluate, request).await;
        RelayResponse::from_result(RelayRoute::Evaluate, result)
    }

    async fn forward_json(&self, route: RelayRoute, payload: &Value) -> RelayResponse {
        let request = self.client.post(self.url(route)).json(payload);
        let result = self.send(route, request).await;
        RelayResponse::from_result(route, result)
    }

    async fn send(&self, route: RelayRoute, request: RequestBuilder) -> Result<Value, RelayError> {
        info!(route = route.path(), base_url = %self.base_url, "Forwarding to backend");

        let response = request.timeout(route.timeout(&self.timeouts)).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body: Value =
            serde_json::from_str(&text).map_err(|_| RelayError::Decode { status, text })?;

        if !(200..300).contains(&status) {
            let detail = body.get("detail").cloned().unwrap_or(body);
            return Err(RelayError::Backend { status, detail });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::post};
    use fraud_intake::field_keys;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    use crate::service::{AppState, SharedRandom, build_router};

    // nothing listens on port 1
    const UNREACHABLE: &str = "http://127.0.0.1:1";

    fn pdf() -> DocumentUpload {
        DocumentUpload::new("claim.pdf", "application/pdf", b"%PDF-1.4 body".to_vec())
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn mock_backend() -> String {
        let state = AppState::new(
            UNREACHABLE,
            RelayTimeouts::default(),
            Arc::new(fraud_intake::InMemorySessionStorage::new()),
            SharedRandom::seeded(17),
        )
        .unwrap();
        serve(build_router(state)).await
    }

    #[tokio::test]
    async fn unreachable_extract_returns_fallback() {
        let relay = RelayClient::new(UNREACHABLE, RelayTimeouts::default()).unwrap();
        let response = relay.extract(pdf(), &ExtractionOptions::default()).await;

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body["error"], "Backend connection failed");
        assert!(response.body["details"].is_string());
        assert_eq!(response.body["mock_fallback"], true);
        assert_eq!(response.body["doc_type"], "Medical Bill");
        assert_eq!(response.body["result"][field_keys::POLICY_HOLDER], "John Doe");
    }

    #[tokio::test]
    async fn unreachable_routes_report_503() {
        let relay = RelayClient::new(UNREACHABLE, RelayTimeouts::default()).unwrap();

        let chat = relay.chat("hello").await;
        assert_eq!(chat.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(chat.body["error"], "Chat backend failed");
        assert_eq!(chat.body["response"], assistant::OFFLINE_ANSWER);

        let ingest = relay.ingest_to_graph(&json!({"Claim ID": "CLM-1"})).await;
        assert_eq!(ingest.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ingest.body["error"], "Graph ingestion failed");
        assert!(ingest.body.get("mock_fallback").is_none());

        let analyze = relay.analyze(&json!({})).await;
        assert_eq!(analyze.body["error"], "Fraud analysis failed");

        let evaluate = relay.evaluate(10).await;
        assert_eq!(evaluate.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(evaluate.body["error"], "Evaluation failed");
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_before_network() {
        let relay = RelayClient::new(UNREACHABLE, RelayTimeouts::default()).unwrap();
        let empty = DocumentUpload::new("claim.pdf", "application/pdf", Vec::new());
        let response = relay.extract(empty, &ExtractionOptions::default()).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.get("mock_fallback").is_none());
    }

    #[tokio::test]
    async fn relays_to_live_mock_backend() {
        let base = mock_backend().await;
        let relay = RelayClient::new(&base, RelayTimeouts::default()).unwrap();

        let options = ExtractionOptions {
            doc_type: Some("Police Report".to_string()),
            classify_if_missing: false,
        };
        let extracted = relay.extract(pdf(), &options).await;
        assert_eq!(extracted.status, StatusCode::OK);
        let envelope: ExtractionEnvelope = serde_json::from_value(extracted.body).unwrap();
        assert_eq!(envelope.doc_type, "Police Report");
        for key in field_keys::ALL {
            assert!(envelope.result.get(key).is_some_and(|v| !v.is_empty()));
        }

        let chat = relay.chat("hello").await;
        assert_eq!(chat.status, StatusCode::OK);
        assert_eq!(chat.body["response"], assistant::GREETING_ANSWER);

        let analyzed = relay.analyze(&serde_json::to_value(&envelope).unwrap()).await;
        assert_eq!(analyzed.status, StatusCode::OK);
        let score = analyzed.body["fraud_score"].as_f64().unwrap();
        assert_eq!(analyzed.body["is_fraudulent"], score > 0.7);

        let evaluated = relay.evaluate(100).await;
        assert_eq!(evaluated.body["confusion_matrix"][0][0], 45);
    }

    #[tokio::test]
    async fn backend_errors_pass_through() {
        let base = mock_backend().await;
        let relay = RelayClient::new(&base, RelayTimeouts::default()).unwrap();

        let response = relay.analyze(&json!([1, 2, 3])).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["error"], "backend_422");
        assert!(response.body["detail"].is_string());
    }

    #[tokio::test]
    async fn non_json_bodies_are_decode_errors() {
        let app = Router::new().route("/v1/chat", post(|| async { "plain text reply" }));
        let base = serve(app).await;
        let relay = RelayClient::new(&base, RelayTimeouts::default()).unwrap();

        let response = relay.chat("hi").await;
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.body["error"], "invalid_json_from_backend (status=200)");
        assert_eq!(response.body["text"], "plain text reply");
    }

    #[tokio::test]
    async fn slow_backend_times_out_into_fallback() {
        let app = Router::new().route(
            "/v1/chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                axum::Json(json!({"response": "too late"}))
            }),
        );
        let base = serve(app).await;
        let timeouts = RelayTimeouts {
            chat: Duration::from_millis(200),
            ..Default::default()
        };
        let relay = RelayClient::new(&base, timeouts).unwrap();

        let started = std::time::Instant::now();
        let response = relay.chat("hi").await;

        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body["error"], "Chat backend failed");
        assert!(response.body["details"].is_string());
        assert_eq!(response.body["response"], assistant::OFFLINE_ANSWER);
    }

    #[test]
    fn backend_detail_is_preserved() {
        let (status, body) = RelayError::Backend {
            status: 404,
            detail: json!("Not Found"),
        }
        .into_response_parts(RelayRoute::Analyze);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "backend_404", "detail": "Not Found"}));
    }
}
