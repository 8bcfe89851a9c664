//! Script DTOs: merged view, custom-script and manifest-script mutations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::column::Column;
use crate::domain::script::ScriptDefinition;

/// Manifest script map, in manifest order. Values are command strings.
pub type PackageScripts = serde_json::Map<String, serde_json::Value>;

/// Package name and version surfaced alongside the script map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Merged configuration view returned by `GET /api/scripts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptsView {
    pub package_scripts: PackageScripts,
    pub package_meta: PackageMeta,
    pub custom_scripts: Vec<ScriptDefinition>,
    pub initialized: bool,
    pub overrides_present: bool,
    pub hidden_scripts: Vec<String>,
    pub columns: Vec<Column>,
}

/// Body of `POST`/`PUT /api/custom-scripts`. `original_name` is set on
/// update and names the entry being replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomScriptPayload {
    pub name: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub column_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

/// Body of `DELETE /api/custom-scripts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCustomScript {
    pub name: String,
}

/// Body of `POST /api/package-scripts`. `original_name` renames an existing
/// manifest script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageScriptPayload {
    pub name: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

/// Body of `POST /api/delete-script`; at least one flag must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteScriptRequest {
    pub name: String,
    #[serde(default)]
    pub remove_from_package: bool,
    #[serde(default)]
    pub remove_from_custom: bool,
}

/// Body of `POST /api/overrides/hide`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HideRequest {
    pub name: String,
    pub hidden: bool,
}

/// Body of `POST /api/custom-scripts/arrange`: full board order plus the
/// column each script landed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeRequest {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub column_id_by_name: HashMap<String, String>,
}

/// Updated custom-script collection returned by custom-script mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomScriptsResponse {
    pub custom_scripts: Vec<ScriptDefinition>,
}

/// Updated manifest script map returned by `POST /api/package-scripts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageScriptsResponse {
    pub package_scripts: PackageScripts,
}

/// Both collections, returned by `POST /api/delete-script`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteScriptResponse {
    pub package_scripts: PackageScripts,
    pub custom_scripts: Vec<ScriptDefinition>,
}
