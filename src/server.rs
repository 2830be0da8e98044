//! HTTP boundary: a single intake endpoint over the core pipeline.
//!
//! Exactly one endpoint, one method, one file parameter:
//! `POST /intake` with a multipart `file` field carrying the PDF. Success
//! returns the corrected record as JSON; failure returns a JSON error
//! envelope with a non-2xx status. The two diagnostic reply failures keep
//! their inspection payload — a malformed reply ships back the raw model
//! output so a human can see what the service actually said.
//!
//! Requests are independent: the router holds only the shared config, and
//! the pipeline it calls into has no cross-request state, so concurrent
//! uploads need no locking here.

use crate::config::IntakeConfig;
use crate::error::IntakeError;
use crate::intake;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Maximum accepted upload size. Scanned multi-page contracts run large,
/// but nothing legitimate approaches this.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// JSON error envelope returned with every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Human-readable summary of what failed.
    pub error: String,
    /// Raw generation reply, attached when parsing it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Additional failure detail for other error kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Build the intake router around a shared config.
pub fn router(config: IntakeConfig) -> Router {
    Router::new()
        .route("/intake", post(handle_intake))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(config))
}

/// Bind and serve the intake endpoint until the process exits.
pub async fn serve(config: IntakeConfig, addr: SocketAddr) -> Result<(), IntakeError> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| IntakeError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Intake endpoint listening on http://{}/intake", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| IntakeError::Internal(format!("Server error: {}", e)))
}

/// `POST /intake` — accept one PDF upload, return the extracted record.
async fn handle_intake(
    State(config): State<Arc<IntakeConfig>>,
    mut multipart: Multipart,
) -> Response {
    let bytes = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => match field.bytes().await {
                Ok(bytes) => break bytes,
                Err(e) => {
                    return envelope_response(
                        StatusCode::BAD_REQUEST,
                        ErrorEnvelope {
                            error: "Failed to read uploaded file".into(),
                            raw: None,
                            details: Some(e.to_string()),
                        },
                    );
                }
            },
            Ok(Some(_)) => continue,
            Ok(None) => {
                return envelope_response(
                    StatusCode::BAD_REQUEST,
                    ErrorEnvelope {
                        error: "Missing multipart field 'file'".into(),
                        raw: None,
                        details: None,
                    },
                );
            }
            Err(e) => {
                return envelope_response(
                    StatusCode::BAD_REQUEST,
                    ErrorEnvelope {
                        error: "Malformed multipart request".into(),
                        raw: None,
                        details: Some(e.to_string()),
                    },
                );
            }
        }
    };

    match intake::parse_contract_bytes(&bytes, &config).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => {
            warn!("Intake request failed: {}", err);
            envelope_response(status_for(&err), envelope_for(err))
        }
    }
}

/// Map an intake error to its boundary status.
fn status_for(err: &IntakeError) -> StatusCode {
    match err {
        IntakeError::NotAPdf { .. }
        | IntakeError::FileNotFound { .. }
        | IntakeError::PermissionDenied { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map an intake error to its envelope, preserving diagnostic payloads.
fn envelope_for(err: IntakeError) -> ErrorEnvelope {
    match err {
        IntakeError::EmptyReply => ErrorEnvelope {
            error: "Generation service returned empty content".into(),
            raw: None,
            details: None,
        },
        IntakeError::MalformedReply { raw } => ErrorEnvelope {
            error: "Failed to parse model output".into(),
            raw: Some(raw),
            details: None,
        },
        other => ErrorEnvelope {
            error: "Intake failed".into(),
            raw: None,
            details: Some(other.to_string()),
        },
    }
}

fn envelope_response(status: StatusCode, envelope: ErrorEnvelope) -> Response {
    (status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_failures_map_to_500_with_payload() {
        let err = IntakeError::MalformedReply {
            raw: "Sure! Here you go".into(),
        };
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);

        let envelope = envelope_for(err);
        assert_eq!(envelope.error, "Failed to parse model output");
        assert_eq!(envelope.raw.as_deref(), Some("Sure! Here you go"));
        assert!(envelope.details.is_none());
    }

    #[test]
    fn bad_uploads_map_to_400() {
        let err = IntakeError::NotAPdf {
            path: "/tmp/upload.pdf".into(),
            magic: *b"PK\x03\x04",
        };
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn envelope_omits_absent_payloads() {
        let envelope = envelope_for(IntakeError::EmptyReply);
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("empty content"));
        assert!(!json.contains("raw"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn infrastructure_failures_carry_detail_text() {
        let envelope = envelope_for(IntakeError::OcrFailed {
            detail: "tesseract not found".into(),
        });
        assert!(envelope.details.unwrap().contains("tesseract"));
    }
}
