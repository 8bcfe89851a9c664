//! Column DTOs

use serde::{Deserialize, Serialize};

use crate::domain::column::Column;
use crate::domain::script::ScriptDefinition;

/// Body of `POST /api/columns` and `PUT /api/columns/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPayload {
    pub name: String,
}

/// Body of `POST /api/columns/reorder`: column ids in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub order: Vec<String>,
}

/// Updated columns plus the scripts they hold, returned by every column
/// mutation. Deleting a column reassigns its scripts, so both lists can
/// change together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsResponse {
    pub columns: Vec<Column>,
    pub custom_scripts: Vec<ScriptDefinition>,
}
