//! Axum router realizing the HTTP boundary (C8, §4.8/§6).
//!
//! Handlers are thin: decode the request, call into the core's two pure
//! functions, map `Result<String, TransformError>` to a JSON body and
//! status code per §7. Nothing here ever matches on the transformation
//! passes themselves — only on the error taxonomy they surface.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use bpmn_pnml_core::error::{KnownError, TransformError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{metrics::Metrics, ratelimit::RequestGate};

pub struct AppState {
    pub metrics: Metrics,
    pub gate: RequestGate,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/transform", post(transform))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    BpmnToPnml,
    PnmlToBpmn,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::BpmnToPnml => "bpmntopnml",
            Direction::PnmlToBpmn => "pnmltobpmn",
        }
    }

    fn parse(raw: &str) -> Result<Self, KnownError> {
        match raw {
            "bpmntopnml" => Ok(Direction::BpmnToPnml),
            "pnmltobpmn" => Ok(Direction::PnmlToBpmn),
            other => Err(KnownError::UnexpectedQueryParameter(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransformQuery {
    direction: String,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => body.into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics render failure").into_response()
        }
    }
}

async fn transform(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransformQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let direction = match Direction::parse(&query.direction) {
        Ok(d) => d,
        Err(known) => return transform_error_response(TransformError::Known(known)),
    };

    if !state.gate.admit() {
        return transform_error_response(TransformError::Known(KnownError::NoRequestTokensAvailable));
    }

    let xml = match extract_xml(&headers, &body, direction) {
        Ok(xml) => xml,
        Err(known) => return transform_error_response(TransformError::Known(known)),
    };

    let started = Instant::now();
    let result = match direction {
        Direction::BpmnToPnml => bpmn_pnml_core::transform_bpmn_to_pnml(&xml),
        Direction::PnmlToBpmn => bpmn_pnml_core::transform_pnml_to_bpmn(&xml),
    };
    let elapsed = started.elapsed().as_secs_f64();
    state
        .metrics
        .duration_seconds
        .with_label_values(&[direction.as_str()])
        .observe(elapsed);

    match result {
        Ok(output) => {
            state
                .metrics
                .requests_total
                .with_label_values(&[direction.as_str(), "ok"])
                .inc();
            let key = match direction {
                Direction::BpmnToPnml => "pnml",
                Direction::PnmlToBpmn => "bpmn",
            };
            Json(json!({ key: output })).into_response()
        }
        Err(err) => {
            state
                .metrics
                .requests_total
                .with_label_values(&[direction.as_str(), "error"])
                .inc();
            transform_error_response(err)
        }
    }
}

/// Accepts a form field (`bpmn=`/`pnml=`) or a raw body with an `*/xml`
/// content type, per §6.
fn extract_xml(headers: &HeaderMap, body: &Bytes, direction: Direction) -> Result<String, KnownError> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let field = match direction {
            Direction::BpmnToPnml => "bpmn",
            Direction::PnmlToBpmn => "pnml",
        };
        let pairs: std::collections::HashMap<String, String> =
            form_urlencoded::parse(body).collect();
        return pairs
            .get(field)
            .cloned()
            .ok_or_else(|| KnownError::MalformedInput(format!("missing form field '{field}'")));
    }

    if content_type.contains("xml") || content_type.is_empty() {
        return String::from_utf8(body.to_vec())
            .map_err(|_| KnownError::MalformedInput("request body is not valid UTF-8".to_string()));
    }

    Err(KnownError::MalformedInput(format!(
        "unsupported content type: {content_type}"
    )))
}

fn transform_error_response(err: TransformError) -> Response {
    let status = StatusCode::BAD_REQUEST;
    let body = Json(json!({ "error": err.caller_message() }));
    if !err.is_known() {
        tracing::warn!(%err, "transform request failed");
    }
    (status, body).into_response()
}

mod form_urlencoded {
    //! A tiny `application/x-www-form-urlencoded` decoder so the HTTP
    //! boundary doesn't need a dedicated form-parsing crate for two fields.

    pub fn parse(input: &[u8]) -> impl Iterator<Item = (String, String)> + '_ {
        input
            .split(|&b| b == b'&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, |&b| b == b'=');
                let key = parts.next()?;
                let value = parts.next().unwrap_or(b"");
                Some((decode(key), decode(value)))
            })
    }

    fn decode(raw: &[u8]) -> String {
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            match raw[i] {
                b'+' => {
                    out.push(b' ');
                    i += 1;
                }
                b'%' if i + 2 < raw.len() => {
                    let hex = std::str::from_utf8(&raw[i + 1..i + 3]).ok();
                    if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                        out.push(byte);
                        i += 3;
                    } else {
                        out.push(raw[i]);
                        i += 1;
                    }
                }
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState { metrics: Metrics::new().unwrap(), gate: RequestGate::new(false, 0) })
    }

    #[tokio::test]
    async fn rejects_unknown_direction() {
        let router = build_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transform?direction=sideways")
                    .header("content-type", "application/xml")
                    .body(Body::from("<x/>"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn transforms_a_raw_xml_body() {
        let router = build_router(test_state());
        let bpmn_xml = r#"<?xml version="1.0"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <process id="P1">
    <startEvent id="s1"/>
    <endEvent id="e1"/>
    <sequenceFlow id="f1" sourceRef="s1" targetRef="e1"/>
  </process>
</definitions>"#;
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transform?direction=bpmntopnml")
                    .header("content-type", "application/xml")
                    .body(Body::from(bpmn_xml))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
