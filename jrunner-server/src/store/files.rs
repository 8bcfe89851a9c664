//! JSON file helpers
//!
//! Every config write goes through [`write_json_atomic`]: the value is
//! serialized to a temp sibling and renamed into place, so a reader never
//! observes a partially written file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::store::StoreError;

/// Reads and parses a JSON file, returning `None` when it does not exist.
pub async fn read_json_opt<T>(path: &Path) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::io(path, err)),
    };
    let value = serde_json::from_str(&content).map_err(|err| StoreError::parse(path, err))?;
    Ok(Some(value))
}

/// Serializes a value as pretty JSON and replaces the file atomically.
pub async fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
{
    let json =
        serde_json::to_string_pretty(value).map_err(|err| StoreError::parse(path, err))?;
    let tmp = tmp_sibling(path);
    fs::write(&tmp, format!("{json}\n"))
        .await
        .map_err(|err| StoreError::io(&tmp, err))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|err| StoreError::io(path, err))?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

// =============================================================================
// Tests
// =============================================================================
