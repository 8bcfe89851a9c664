//! Script API Handlers
//!
//! HTTP endpoints for the merged script view and for editing manifest
//! scripts, custom scripts, and per-user overrides.

use axum::{Json, extract::State};
use jrunner_core::dto::scripts::{
    ArrangeRequest, CustomScriptPayload, CustomScriptsResponse, DeleteCustomScript,
    DeleteScriptRequest, DeleteScriptResponse, HideRequest, PackageScriptPayload,
    PackageScriptsResponse, ScriptsView,
};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::script_service;

// =============================================================================
// Merged View
// =============================================================================

/// GET /api/scripts
/// The full merged view: manifest scripts, custom scripts with overrides
/// applied, and the column layout
pub async fn get_scripts(State(state): State<AppState>) -> ApiResult<Json<ScriptsView>> {
    tracing::debug!("Loading script view");

    let view = script_service::load_view(&state.store)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(view))
}

/// POST /api/init
/// Create the custom-script config file if it does not exist yet
pub async fn init_config(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    tracing::info!("Initializing custom-script config");

    script_service::init(&state.store)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(serde_json::json!({ "initialized": true })))
}

// =============================================================================
// Custom Scripts
// =============================================================================

/// POST /api/custom-scripts
/// Create a new custom script
pub async fn create_custom_script(
    State(state): State<AppState>,
    Json(payload): Json<CustomScriptPayload>,
) -> ApiResult<Json<CustomScriptsResponse>> {
    tracing::info!("Creating custom script: {}", payload.name);

    let custom_scripts = script_service::create_custom_script(&state.store, payload)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(CustomScriptsResponse { custom_scripts }))
}

/// PUT /api/custom-scripts
/// Update an existing custom script, optionally renaming it
pub async fn update_custom_script(
    State(state): State<AppState>,
    Json(payload): Json<CustomScriptPayload>,
) -> ApiResult<Json<CustomScriptsResponse>> {
    tracing::info!("Updating custom script: {}", payload.name);

    let custom_scripts = script_service::update_custom_script(&state.store, payload)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(CustomScriptsResponse { custom_scripts }))
}

/// DELETE /api/custom-scripts
/// Delete a custom script by name
pub async fn delete_custom_script(
    State(state): State<AppState>,
    Json(req): Json<DeleteCustomScript>,
) -> ApiResult<Json<CustomScriptsResponse>> {
    tracing::info!("Deleting custom script: {}", req.name);

    let custom_scripts = script_service::delete_custom_script(&state.store, &req.name)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(CustomScriptsResponse { custom_scripts }))
}

/// POST /api/custom-scripts/arrange
/// Persist a new ordering and column assignment for custom scripts
pub async fn arrange_custom_scripts(
    State(state): State<AppState>,
    Json(req): Json<ArrangeRequest>,
) -> ApiResult<Json<CustomScriptsResponse>> {
    tracing::debug!("Arranging {} custom scripts", req.order.len());

    let custom_scripts =
        script_service::arrange_custom_scripts(&state.store, &req.order, &req.column_id_by_name)
            .await
            .map_err(|e| match e {
                script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
                script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
                script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
            })?;

    Ok(Json(CustomScriptsResponse { custom_scripts }))
}

// =============================================================================
// Manifest Scripts
// =============================================================================

/// POST /api/package-scripts
/// Create or rename a manifest script; `originalName` selects the entry to
/// replace
pub async fn upsert_package_script(
    State(state): State<AppState>,
    Json(payload): Json<PackageScriptPayload>,
) -> ApiResult<Json<PackageScriptsResponse>> {
    tracing::info!("Saving package script: {}", payload.name);

    let package_scripts = script_service::upsert_package_script(&state.store, payload)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(PackageScriptsResponse { package_scripts }))
}

/// POST /api/delete-script
/// Delete a script from the manifest, the custom config, or both
pub async fn delete_script(
    State(state): State<AppState>,
    Json(req): Json<DeleteScriptRequest>,
) -> ApiResult<Json<DeleteScriptResponse>> {
    tracing::info!("Deleting script: {}", req.name);

    let (package_scripts, custom_scripts) = script_service::delete_script(&state.store, req)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(DeleteScriptResponse {
        package_scripts,
        custom_scripts,
    }))
}

// =============================================================================
// Overrides
// =============================================================================

/// POST /api/overrides/hide
/// Set a script's per-user hidden flag
pub async fn hide_script(
    State(state): State<AppState>,
    Json(req): Json<HideRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    tracing::info!("Setting hidden={} for script: {}", req.hidden, req.name);

    script_service::set_override_hidden(&state.store, req)
        .await
        .map_err(|e| match e {
            script_service::ScriptError::NotFound(msg) => ApiError::NotFound(msg),
            script_service::ScriptError::ValidationError(msg) => ApiError::BadRequest(msg),
            script_service::ScriptError::StoreError(err) => ApiError::StoreError(err),
        })?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
