//! Column API Handlers
//!
//! HTTP endpoints for the board column lifecycle. Column changes can move
//! scripts, so every response carries both lists.

use axum::{
    Json,
    extract::{Path, State},
};
use jrunner_core::dto::columns::{ColumnPayload, ColumnsResponse, ReorderRequest};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::column_service;

/// POST /api/columns
/// Create a new column
pub async fn create_column(
    State(state): State<AppState>,
    Json(payload): Json<ColumnPayload>,
) -> ApiResult<Json<ColumnsResponse>> {
    tracing::info!("Creating column: {}", payload.name);

    let (columns, custom_scripts) = column_service::create_column(&state.store, &payload.name)
        .await
        .map_err(|e| match e {
            column_service::ColumnError::NotFound(msg) => ApiError::NotFound(msg),
            column_service::ColumnError::ValidationError(msg) => ApiError::BadRequest(msg),
            column_service::ColumnError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(ColumnsResponse {
        columns,
        custom_scripts,
    }))
}

/// PUT /api/columns/{id}
/// Rename a column
pub async fn rename_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ColumnPayload>,
) -> ApiResult<Json<ColumnsResponse>> {
    tracing::info!("Renaming column {} to {}", id, payload.name);

    let (columns, custom_scripts) =
        column_service::rename_column(&state.store, &id, &payload.name)
            .await
            .map_err(|e| match e {
                column_service::ColumnError::NotFound(msg) => ApiError::NotFound(msg),
                column_service::ColumnError::ValidationError(msg) => ApiError::BadRequest(msg),
                column_service::ColumnError::StoreError(err) => ApiError::StoreError(err),
            })?;

    Ok(Json(ColumnsResponse {
        columns,
        custom_scripts,
    }))
}

/// DELETE /api/columns/{id}
/// Delete a column; its scripts move to the fallback column
pub async fn delete_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ColumnsResponse>> {
    tracing::info!("Deleting column: {}", id);

    let (columns, custom_scripts) = column_service::delete_column(&state.store, &id)
        .await
        .map_err(|e| match e {
            column_service::ColumnError::NotFound(msg) => ApiError::NotFound(msg),
            column_service::ColumnError::ValidationError(msg) => ApiError::BadRequest(msg),
            column_service::ColumnError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(ColumnsResponse {
        columns,
        custom_scripts,
    }))
}

/// POST /api/columns/reorder
/// Persist a new column display order
pub async fn reorder_columns(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<ColumnsResponse>> {
    tracing::debug!("Reordering columns: {:?}", req.order);

    let (columns, custom_scripts) = column_service::reorder_columns(&state.store, &req.order)
        .await
        .map_err(|e| match e {
            column_service::ColumnError::NotFound(msg) => ApiError::NotFound(msg),
            column_service::ColumnError::ValidationError(msg) => ApiError::BadRequest(msg),
            column_service::ColumnError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(ColumnsResponse {
        columns,
        custom_scripts,
    }))
}
