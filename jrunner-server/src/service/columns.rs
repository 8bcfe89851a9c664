//! Column service
//!
//! Lifecycle of the board columns stored in the shared config file. Column
//! mutations can move scripts around (deletion reassigns them to the
//! fallback column), so every operation returns both the columns and the
//! merged scripts.

use jrunner_core::domain::column::{self, Column, DEFAULT_COLUMN_ID};
use jrunner_core::domain::script::ScriptDefinition;

use crate::service::scripts::effective_board;
use crate::store::{ConfFile, ConfigStore, StoreError};

/// Service error type
#[derive(Debug)]
pub enum ColumnError {
    NotFound(String),
    ValidationError(String),
    StoreError(StoreError),
}

impl From<StoreError> for ColumnError {
    fn from(err: StoreError) -> Self {
        ColumnError::StoreError(err)
    }
}

type Board = (Vec<Column>, Vec<ScriptDefinition>);

/// Create a column, deriving its id from the name
pub async fn create_column(store: &ConfigStore, name: &str) -> Result<Board, ColumnError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ColumnError::ValidationError(
            "Column name is required".to_string(),
        ));
    }

    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);
    let id = column::unique_column_id(name, &conf.columns);
    conf.columns.push(Column {
        id: id.clone(),
        name: name.to_string(),
    });
    store.write_conf(&conf).await?;
    tracing::info!("Created column {} ({})", name, id);

    board(store, &conf).await
}

/// Rename a column by id
pub async fn rename_column(store: &ConfigStore, id: &str, name: &str) -> Result<Board, ColumnError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ColumnError::ValidationError(
            "Column name is required".to_string(),
        ));
    }

    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);
    let Some(target) = conf.columns.iter_mut().find(|column| column.id == id) else {
        return Err(ColumnError::NotFound(format!("Column \"{id}\" not found")));
    };
    target.name = name.to_string();
    store.write_conf(&conf).await?;
    tracing::info!("Renamed column {} to {}", id, name);

    board(store, &conf).await
}

/// Delete a column by id, moving its scripts to the fallback column
pub async fn delete_column(store: &ConfigStore, id: &str) -> Result<Board, ColumnError> {
    if id == DEFAULT_COLUMN_ID {
        return Err(ColumnError::ValidationError(
            "The default column cannot be deleted".to_string(),
        ));
    }

    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);
    let Some(pos) = conf.columns.iter().position(|column| column.id == id) else {
        return Err(ColumnError::NotFound(format!("Column \"{id}\" not found")));
    };
    conf.columns.remove(pos);
    for script in &mut conf.scripts {
        if script.column_id == id {
            script.column_id = DEFAULT_COLUMN_ID.to_string();
        }
    }
    store.write_conf(&conf).await?;
    tracing::info!("Deleted column {}", id);

    board(store, &conf).await
}

/// Persist a new display order; ids not listed keep their relative order
/// behind the listed ones, unknown ids are ignored
pub async fn reorder_columns(store: &ConfigStore, order: &[String]) -> Result<Board, ColumnError> {
    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);

    let mut ordered = Vec::with_capacity(conf.columns.len());
    for id in order {
        if let Some(pos) = conf.columns.iter().position(|column| column.id == *id) {
            ordered.push(conf.columns.remove(pos));
        }
    }
    ordered.append(&mut conf.columns);
    conf.columns = ordered;

    store.write_conf(&conf).await?;
    tracing::debug!("Reordered {} columns", conf.columns.len());

    board(store, &conf).await
}

async fn board(store: &ConfigStore, conf: &ConfFile) -> Result<Board, ColumnError> {
    let overrides = store.read_overrides().await?.unwrap_or_default();
    Ok(effective_board(conf, &overrides))
}

// =============================================================================
// Tests
// =============================================================================
