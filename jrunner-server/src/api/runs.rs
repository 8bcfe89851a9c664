//! Run API Handlers
//!
//! HTTP endpoints for launching runs, streaming their output as
//! server-sent events, and stopping them.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use futures_util::Stream;
use jrunner_core::domain::run::RunEvent;
use jrunner_core::dto::runs::{StartRunRequest, StartRunResponse};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::run_service;

/// POST /api/run
/// Launch a command as a new run
pub async fn start_run(
    State(state): State<AppState>,
    Json(req): Json<StartRunRequest>,
) -> ApiResult<Json<StartRunResponse>> {
    tracing::info!("Run requested: {}", req.name);

    let id = run_service::start_run(&state.runs, req).map_err(|e| match e {
        run_service::RunError::NotFound(id) => ApiError::NotFound(format!("Run {} not found", id)),
        run_service::RunError::ValidationError(msg) => ApiError::BadRequest(msg),
    })?;

    Ok(Json(StartRunResponse { id }))
}

/// GET /api/runs/{id}/stream
/// Subscribe to a run's output; replays the backlog, then streams live
/// events until the run ends
pub async fn stream_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Sse<KeepAliveStream<EventStream>>> {
    tracing::debug!("Streaming run: {}", id);

    let rx = run_service::attach(&state.runs, id).map_err(|e| match e {
        run_service::RunError::NotFound(id) => ApiError::NotFound(format!("Run {} not found", id)),
        run_service::RunError::ValidationError(msg) => ApiError::BadRequest(msg),
    })?;

    Ok(Sse::new(EventStream { rx, done: false }).keep_alive(KeepAlive::default()))
}

/// POST /api/runs/{id}/stop
/// Request termination of a running process
pub async fn stop_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    tracing::info!("Stopping run: {}", id);

    run_service::stop_run(&state.runs, id).map_err(|e| match e {
        run_service::RunError::NotFound(id) => ApiError::NotFound(format!("Run {} not found", id)),
        run_service::RunError::ValidationError(msg) => ApiError::BadRequest(msg),
    })?;

    Ok(Json(serde_json::json!({ "stopped": true })))
}

/// Adapts a run subscription into server-sent events. Output chunks become
/// default `message` events; the terminal event is a named `end` event,
/// after which the stream closes.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<RunEvent>,
    done: bool,
}

impl Stream for EventStream {
    type Item = Result<Event, axum::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(RunEvent::Chunk(chunk))) => {
                Poll::Ready(Some(Event::default().json_data(&chunk)))
            }
            Poll::Ready(Some(RunEvent::End { code })) => {
                this.done = true;
                Poll::Ready(Some(
                    Event::default()
                        .event("end")
                        .json_data(serde_json::json!({ "code": code })),
                ))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
