//! Desktop bridge
//!
//! JSON over HTTP on the loopback interface so a desktop front end can drive
//! [`DesktopApi`]. Anything that touches disk or hashes a PIN runs on the
//! blocking pool.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::business::DesktopApi;
use crate::error::SlotError;

type Api = Arc<DesktopApi>;

#[derive(Debug, Deserialize)]
struct PairingRequest {
    target_id: String,
    ip: String,
}

#[derive(Debug, Deserialize)]
struct SlotRequest {
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_password: bool,
    #[serde(default)]
    shortcut: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PinRequest {
    pin: String,
}

pub fn desktop_router(api: Api) -> Router {
    Router::new()
        .route("/api/state", get(state))
        .route("/api/interfaces", get(interfaces))
        .route("/api/pairing", post(begin_pairing).delete(cancel_pairing))
        .route("/api/slots/:id", put(upsert_slot).delete(delete_slot))
        .route("/api/reset", post(reset_all))
        .route("/api/pin", get(has_pin).post(set_pin))
        .route("/api/pin/verify", post(verify_pin))
        .route("/api/hotkeys/reload", post(reload_hotkeys))
        .route("/api/poll", get(poll_received))
        .with_state(api)
}

/// Serve the desktop routes until `shutdown` resolves
pub async fn serve_desktop(
    listener: TcpListener,
    api: Api,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    tracing::info!("Desktop bridge on {}", listener.local_addr()?);
    axum::serve(listener, desktop_router(api))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Desktop bridge stopped");
    Ok(())
}

async fn blocking<T, F>(api: Api, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&DesktopApi) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&api))
        .await
        .map_err(|e| {
            tracing::error!("Desktop task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        })
}

fn slot_error_status(error: &SlotError) -> StatusCode {
    match error {
        SlotError::PinStorage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_response(status: StatusCode, message: impl ToString) -> Response {
    (status, Json(json!({ "error": message.to_string() }))).into_response()
}

async fn state(State(api): State<Api>) -> Response {
    let doc = api.get_initial_state();
    Json(json!({
        "slots": doc.slots,
        "has_pin": doc.pin_hash().is_some(),
    }))
    .into_response()
}

async fn interfaces(State(api): State<Api>) -> Response {
    match blocking(api, |api| api.get_interfaces()).await {
        Ok(list) => Json(list).into_response(),
        Err(response) => response,
    }
}

async fn begin_pairing(State(api): State<Api>, Json(req): Json<PairingRequest>) -> Response {
    match blocking(api, move |api| api.begin_pairing(&req.target_id, &req.ip)).await {
        Ok(Ok(info)) => Json(info).into_response(),
        Ok(Err(e)) => match e.downcast_ref::<SlotError>() {
            Some(invalid) => error_response(slot_error_status(invalid), invalid),
            None => {
                tracing::error!("Failed to start pairing: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
            }
        },
        Err(response) => response,
    }
}

async fn cancel_pairing(State(api): State<Api>) -> StatusCode {
    api.cancel_pairing();
    StatusCode::NO_CONTENT
}

async fn upsert_slot(
    State(api): State<Api>,
    Path(id): Path<String>,
    Json(req): Json<SlotRequest>,
) -> Response {
    let outcome = blocking(api, move |api| {
        api.upsert_slot(&id, req.text, req.is_password, req.shortcut)
    })
    .await;
    match outcome {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(e)) => error_response(slot_error_status(&e), e),
        Err(response) => response,
    }
}

async fn delete_slot(State(api): State<Api>, Path(id): Path<String>) -> Response {
    match blocking(api, move |api| api.delete_slot(&id)).await {
        Ok(deleted) => Json(json!({ "deleted": deleted })).into_response(),
        Err(response) => response,
    }
}

async fn reset_all(State(api): State<Api>) -> Response {
    match blocking(api, |api| api.reset_all()).await {
        Ok(reset) => Json(json!({ "reset": reset })).into_response(),
        Err(response) => response,
    }
}

async fn has_pin(State(api): State<Api>) -> Json<serde_json::Value> {
    Json(json!({ "has_pin": api.has_pin() }))
}

async fn set_pin(State(api): State<Api>, Json(req): Json<PinRequest>) -> Response {
    match blocking(api, move |api| api.set_pin(&req.pin)).await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(e)) => error_response(slot_error_status(&e), e),
        Err(response) => response,
    }
}

async fn verify_pin(State(api): State<Api>, Json(req): Json<PinRequest>) -> Response {
    match blocking(api, move |api| api.verify_pin(&req.pin)).await {
        Ok(valid) => Json(json!({ "valid": valid })).into_response(),
        Err(response) => response,
    }
}

async fn reload_hotkeys(State(api): State<Api>) -> StatusCode {
    api.reload_hotkeys();
    StatusCode::ACCEPTED
}

async fn poll_received(State(api): State<Api>) -> Json<serde_json::Value> {
    Json(json!({ "received": api.poll_received() }))
}
