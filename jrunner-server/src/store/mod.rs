//! Config store
//!
//! Typed access to the three configuration files the dashboard works with:
//! the package manifest (required), the shared custom-script config, and
//! the per-user override file (both optional). Load gives back strongly
//! typed values with defaults filled in; every write replaces the whole
//! file atomically.

pub mod files;

use std::path::{Path, PathBuf};

use jrunner_core::domain::column::Column;
use jrunner_core::domain::script::{OverrideEntry, ScriptDefinition};
use jrunner_core::dto::scripts::{PackageMeta, PackageScripts};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

/// Project package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Shared custom-script config, committed with the project.
pub const CONF_FILE: &str = "jrunner-conf.json";

/// Per-user override file, kept out of version control.
pub const OVERRIDES_FILE: &str = ".jrunner-conf-overrides.json";

const GITIGNORE_FILE: &str = ".gitignore";

/// Errors from reading or writing the config files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The package manifest is a hard requirement; without it the tool has
    /// nothing to run.
    #[error("package.json not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Shape of the shared custom-script config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfFile {
    #[serde(default)]
    pub scripts: Vec<ScriptDefinition>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl ConfFile {
    /// The structure a fresh config file starts with.
    pub fn starter() -> Self {
        Self {
            scripts: Vec::new(),
            columns: vec![Column::fallback()],
        }
    }
}

/// Shape of the per-user override file. Override columns replace the base
/// columns entirely when at least one is defined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverridesFile {
    #[serde(default)]
    pub scripts: Vec<OverrideEntry>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// Owns the project directory and all reads/writes of the config files.
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn conf_path(&self) -> PathBuf {
        self.root.join(CONF_FILE)
    }

    fn overrides_path(&self) -> PathBuf {
        self.root.join(OVERRIDES_FILE)
    }

    fn gitignore_path(&self) -> PathBuf {
        self.root.join(GITIGNORE_FILE)
    }

    // =========================================================================
    // Package manifest
    // =========================================================================

    /// Reads the whole manifest. Unlike the other files, a missing or
    /// unparseable manifest is an error.
    pub async fn read_manifest(&self) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
        let path = self.manifest_path();
        match files::read_json_opt(&path).await? {
            Some(manifest) => Ok(manifest),
            None => Err(StoreError::ManifestMissing(path)),
        }
    }

    /// Rewrites the manifest, preserving every field outside `scripts`.
    pub async fn write_manifest(
        &self,
        manifest: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), StoreError> {
        files::write_json_atomic(&self.manifest_path(), manifest).await
    }

    // =========================================================================
    // Custom-script config and overrides
    // =========================================================================

    /// Reads the custom-script config; `None` means not yet initialized.
    pub async fn read_conf(&self) -> Result<Option<ConfFile>, StoreError> {
        files::read_json_opt(&self.conf_path()).await
    }

    pub async fn write_conf(&self, conf: &ConfFile) -> Result<(), StoreError> {
        files::write_json_atomic(&self.conf_path(), conf).await
    }

    /// Reads the override file; `None` means no overrides exist.
    pub async fn read_overrides(&self) -> Result<Option<OverridesFile>, StoreError> {
        files::read_json_opt(&self.overrides_path()).await
    }

    pub async fn write_overrides(&self, overrides: &OverridesFile) -> Result<(), StoreError> {
        files::write_json_atomic(&self.overrides_path(), overrides).await
    }

    /// Creates the custom-script config if absent. Returns whether the file
    /// was created; an existing file is never touched.
    pub async fn initialize(&self) -> Result<bool, StoreError> {
        if self.read_conf().await?.is_some() {
            return Ok(false);
        }
        self.write_conf(&ConfFile::starter()).await?;
        tracing::info!("Created {}", CONF_FILE);
        Ok(true)
    }

    /// Registers the override file in `.gitignore`, once. The check is by
    /// substring so hand-maintained ignore files are left alone.
    pub async fn ensure_gitignore_entry(&self) -> Result<(), StoreError> {
        let path = self.gitignore_path();
        let current = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(StoreError::io(&path, err)),
        };
        if current.contains(OVERRIDES_FILE) {
            return Ok(());
        }

        let mut next = current;
        if !next.is_empty() && !next.ends_with('\n') {
            next.push('\n');
        }
        next.push_str(OVERRIDES_FILE);
        next.push('\n');
        fs::write(&path, next)
            .await
            .map_err(|err| StoreError::io(&path, err))?;
        tracing::info!("Added {} to {}", OVERRIDES_FILE, GITIGNORE_FILE);
        Ok(())
    }
}

/// Extracts the script map from a manifest, keeping only string commands.
pub fn manifest_scripts(manifest: &serde_json::Map<String, serde_json::Value>) -> PackageScripts {
    let mut scripts = PackageScripts::new();
    if let Some(entries) = manifest.get("scripts").and_then(|v| v.as_object()) {
        for (name, command) in entries {
            if command.is_string() {
                scripts.insert(name.clone(), command.clone());
            }
        }
    }
    scripts
}

/// Extracts the package name/version surfaced in the dashboard header.
pub fn manifest_meta(manifest: &serde_json::Map<String, serde_json::Value>) -> PackageMeta {
    PackageMeta {
        name: manifest
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        version: manifest
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_manifest(manifest: &str) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(MANIFEST_FILE), manifest)
            .await
            .unwrap();
        let store = ConfigStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let read = store.read_manifest().await;
        assert!(matches!(read, Err(StoreError::ManifestMissing(_))));
    }

    #[tokio::test]
    async fn test_manifest_scripts_and_meta_extraction() {
        let (_dir, store) = store_with_manifest(
            r#"{"name":"demo","version":"1.2.3","scripts":{"build":"tsc","weird":42}}"#,
        )
        .await;
        let manifest = store.read_manifest().await.unwrap();

        let scripts = manifest_scripts(&manifest);
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts.get("build").and_then(|v| v.as_str()), Some("tsc"));

        let meta = manifest_meta(&manifest);
        assert_eq!(meta.name, "demo");
        assert_eq!(meta.version, "1.2.3");
    }

    #[tokio::test]
    async fn test_manifest_rewrite_preserves_unrelated_fields() {
        let (_dir, store) = store_with_manifest(
            r#"{"name":"demo","dependencies":{"left":"1.0.0"},"scripts":{"a":"true"}}"#,
        )
        .await;

        let mut manifest = store.read_manifest().await.unwrap();
        let scripts = manifest
            .get_mut("scripts")
            .and_then(|v| v.as_object_mut())
            .unwrap();
        scripts.insert("b".to_string(), serde_json::Value::String("false".into()));
        store.write_manifest(&manifest).await.unwrap();

        let reread = store.read_manifest().await.unwrap();
        assert!(reread.get("dependencies").is_some());
        assert_eq!(manifest_scripts(&reread).len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        assert!(store.initialize().await.unwrap());

        let mut conf = store.read_conf().await.unwrap().unwrap();
        assert_eq!(conf.columns, vec![Column::fallback()]);
        conf.scripts.push(ScriptDefinition {
            name: "keepme".to_string(),
            command: vec!["true".to_string()],
            description: String::new(),
            color: String::new(),
            column_id: "custom".to_string(),
            hidden: false,
        });
        store.write_conf(&conf).await.unwrap();

        assert!(!store.initialize().await.unwrap());
        let reread = store.read_conf().await.unwrap().unwrap();
        assert_eq!(reread.scripts.len(), 1);
    }

    #[tokio::test]
    async fn test_gitignore_entry_appended_once() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(".gitignore"), "node_modules")
            .await
            .unwrap();
        let store = ConfigStore::new(dir.path());

        store.ensure_gitignore_entry().await.unwrap();
        store.ensure_gitignore_entry().await.unwrap();

        let content = tokio::fs::read_to_string(dir.path().join(".gitignore"))
            .await
            .unwrap();
        assert_eq!(content, format!("node_modules\n{OVERRIDES_FILE}\n"));
    }

    #[tokio::test]
    async fn test_overrides_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        assert!(store.read_overrides().await.unwrap().is_none());

        tokio::fs::write(dir.path().join(OVERRIDES_FILE), "{}")
            .await
            .unwrap();
        let overrides = store.read_overrides().await.unwrap().unwrap();
        assert!(overrides.scripts.is_empty());
        assert!(overrides.columns.is_empty());
    }
}
