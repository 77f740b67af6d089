//! Mobile pairing listener
//!
//! Serves the phone page and forwards `POST /submit` to the session manager.
//! Holds no state of its own.

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::business::PairingManager;
use crate::error::PairingError;

const MOBILE_PAGE: &str = include_str!("../../assets/mobile.html");

#[derive(Debug, Default, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    key: Option<String>,
}

/// Routes of the phone-facing listener
pub fn mobile_router(pairing: Arc<PairingManager>) -> Router {
    Router::new()
        .route("/mobile_page", get(mobile_page))
        .route("/submit", post(submit))
        .with_state(pairing)
}

/// Serve the phone-facing routes until `shutdown` resolves
pub async fn serve_mobile(
    listener: TcpListener,
    pairing: Arc<PairingManager>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    tracing::info!("Pairing listener on {}", listener.local_addr()?);
    axum::serve(listener, mobile_router(pairing))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Pairing listener stopped");
    Ok(())
}

async fn mobile_page() -> Html<&'static str> {
    Html(MOBILE_PAGE)
}

async fn submit(
    State(pairing): State<Arc<PairingManager>>,
    Json(body): Json<SubmitRequest>,
) -> impl IntoResponse {
    let key = body.key.unwrap_or_default();
    let content = body.content.unwrap_or_default();

    let outcome = tokio::task::spawn_blocking(move || pairing.submit(&key, &content)).await;

    match outcome {
        Ok(Ok(_)) => (StatusCode::OK, "OK"),
        Ok(Err(e)) => (status_for(&e), rejection_body(&e)),
        Err(e) => {
            tracing::error!("Submission task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error")
        }
    }
}

fn status_for(error: &PairingError) -> StatusCode {
    StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::FORBIDDEN)
}

fn rejection_body(error: &PairingError) -> &'static str {
    match error {
        PairingError::NoSession => "Session expired.",
        PairingError::KeyMismatch => "Invalid session key.",
        PairingError::EmptyContent => "Error",
    }
}
