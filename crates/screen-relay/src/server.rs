//! Embedded web server hosting the record page.
//!
//! `GET /` serves the page, `GET /api/state` the current [`ViewState`], and
//! `POST /api/record` presses the record button.

use crate::{AppError, AppResult, RecordControl};

use std::{panic::Location, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use error_location::ErrorLocation;
use screen_relay_core::{CaptureUploadFlow, ViewState};
use serde::Serialize;
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Shared state for web handlers.
#[derive(Clone)]
pub struct WebState {
    pub(crate) flow: Arc<CaptureUploadFlow>,
    pub(crate) control: Arc<RecordControl>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the page and API routes.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(serve_page))
        .route("/api/state", get(view_state))
        .route("/api/record", post(press_record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on `listener` until `shutdown_rx` turns true.
#[instrument(skip(listener, state, shutdown_rx))]
pub async fn serve(
    listener: TcpListener,
    state: WebState,
    mut shutdown_rx: watch::Receiver<bool>,
) -> AppResult<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Web server listening");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
            info!("Web server shutting down");
        })
        .await
        .map_err(|e| AppError::ServerError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

async fn serve_page() -> Html<&'static str> {
    Html(PAGE_HTML)
}

async fn view_state(State(state): State<WebState>) -> Json<ViewState> {
    Json(state.flow.view())
}

async fn press_record(State(state): State<WebState>) -> Response {
    match state.control.press().await {
        Ok(outcome) => (StatusCode::ACCEPTED, Json(outcome)).into_response(),
        Err(e) => {
            error!(error = ?e, "Record press failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

const PAGE_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Screen Relay</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem; background: #111; color: #eee; }
  button { font-size: 1.2rem; padding: 0.6rem 1.6rem; border-radius: 6px; border: 0; cursor: pointer; }
  button.recording { background: #c0392b; color: #fff; }
  button:disabled { opacity: 0.5; cursor: wait; }
  video { display: block; margin-top: 1.5rem; max-width: 100%; background: #000; }
  #error { color: #e74c3c; min-height: 1.2em; }
</style>
</head>
<body>
<h1>Screen Relay</h1>
<button id="record">Record</button>
<p id="error"></p>
<video id="video" controls></video>
<script>
const button = document.getElementById("record");
const video = document.getElementById("video");
const errorLine = document.getElementById("error");

function render(view) {
  const state = view.status.state;
  button.disabled = state === "uploading";
  button.classList.toggle("recording", state === "recording");
  button.textContent =
    state === "recording" ? "Stop" : state === "uploading" ? "Uploading..." : "Record";
  if (view.link && video.getAttribute("src") !== view.link) {
    video.setAttribute("src", view.link);
  }
  errorLine.textContent = view.last_error || "";
}

async function refresh() {
  try {
    const response = await fetch("/api/state");
    render(await response.json());
  } catch (e) {
    errorLine.textContent = "Lost contact with screen-relay";
  }
}

button.addEventListener("click", async () => {
  await fetch("/api/record", { method: "POST" });
  refresh();
});

refresh();
setInterval(refresh, 500);
</script>
</body>
</html>
"##;
