//! Script service
//!
//! Business logic for the merged configuration view and for custom-script,
//! manifest-script, and override mutations.

use jrunner_core::domain::column::{self, Column};
use jrunner_core::domain::script::{self, OverrideEntry, ScriptDefinition};
use jrunner_core::dto::scripts::{
    CustomScriptPayload, DeleteScriptRequest, HideRequest, PackageScriptPayload, PackageScripts,
    ScriptsView,
};

use crate::store::{self, ConfFile, ConfigStore, OverridesFile, StoreError};

/// Service error type
#[derive(Debug)]
pub enum ScriptError {
    NotFound(String),
    ValidationError(String),
    StoreError(StoreError),
}

impl From<StoreError> for ScriptError {
    fn from(err: StoreError) -> Self {
        ScriptError::StoreError(err)
    }
}

/// Builds the merged view of all three config sources.
pub async fn load_view(store: &ConfigStore) -> Result<ScriptsView, ScriptError> {
    let manifest = store.read_manifest().await?;
    let conf = store.read_conf().await?;
    let overrides = store.read_overrides().await?;

    let initialized = conf.is_some();
    let overrides_present = overrides.is_some();
    let conf = conf.unwrap_or_else(ConfFile::starter);
    let overrides = overrides.unwrap_or_default();

    let (columns, custom_scripts) = effective_board(&conf, &overrides);

    Ok(ScriptsView {
        package_scripts: store::manifest_scripts(&manifest),
        package_meta: store::manifest_meta(&manifest),
        custom_scripts,
        initialized,
        overrides_present,
        hidden_scripts: script::hidden_names(&conf.scripts, &overrides.scripts),
        columns,
    })
}

/// Creates the custom-script config if needed. Returns whether a file was
/// created.
pub async fn init(store: &ConfigStore) -> Result<bool, ScriptError> {
    Ok(store.initialize().await?)
}

/// Create a new custom script
pub async fn create_custom_script(
    store: &ConfigStore,
    payload: CustomScriptPayload,
) -> Result<Vec<ScriptDefinition>, ScriptError> {
    let script = validate_payload(&payload)?;
    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);

    if conf
        .scripts
        .iter()
        .any(|existing| script::same_name(&existing.name, &script.name))
    {
        return Err(ScriptError::ValidationError(format!(
            "A script named \"{}\" already exists",
            script.name
        )));
    }

    tracing::info!("Created custom script: {}", script.name);
    conf.scripts.push(script);
    store.write_conf(&conf).await?;

    merged_scripts(store, &conf).await
}

/// Update (and possibly rename) an existing custom script
pub async fn update_custom_script(
    store: &ConfigStore,
    payload: CustomScriptPayload,
) -> Result<Vec<ScriptDefinition>, ScriptError> {
    let script = validate_payload(&payload)?;
    let original = payload
        .original_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&script.name)
        .to_string();

    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);
    let Some(index) = conf
        .scripts
        .iter()
        .position(|existing| script::same_name(&existing.name, &original))
    else {
        return Err(ScriptError::NotFound(format!(
            "Script \"{original}\" not found"
        )));
    };

    let collision = conf.scripts.iter().enumerate().any(|(i, existing)| {
        i != index && script::same_name(&existing.name, &script.name)
    });
    if collision {
        return Err(ScriptError::ValidationError(format!(
            "A script named \"{}\" already exists",
            script.name
        )));
    }

    // The legacy hidden flag lives in the entry, not the modal; keep it.
    let hidden = conf.scripts[index].hidden;
    conf.scripts[index] = ScriptDefinition { hidden, ..script };
    store.write_conf(&conf).await?;
    tracing::info!("Updated custom script: {} -> {}", original, conf.scripts[index].name);

    merged_scripts(store, &conf).await
}

/// Delete a custom script by name
pub async fn delete_custom_script(
    store: &ConfigStore,
    name: &str,
) -> Result<Vec<ScriptDefinition>, ScriptError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScriptError::ValidationError(
            "Script name is required".to_string(),
        ));
    }

    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);
    conf.scripts
        .retain(|script| !script::same_name(&script.name, name));
    store.write_conf(&conf).await?;
    tracing::info!("Deleted custom script: {}", name);

    merged_scripts(store, &conf).await
}

/// Create, update, or rename a manifest script
pub async fn upsert_package_script(
    store: &ConfigStore,
    payload: PackageScriptPayload,
) -> Result<PackageScripts, ScriptError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ScriptError::ValidationError(
            "Script name is required".to_string(),
        ));
    }
    let command = script::join_command(&payload.command);
    if command.is_empty() {
        return Err(ScriptError::ValidationError(
            "At least one command is required".to_string(),
        ));
    }

    let mut manifest = store.read_manifest().await?;
    let mut scripts = manifest
        .get("scripts")
        .and_then(|value| value.as_object())
        .cloned()
        .unwrap_or_default();

    let original = payload
        .original_name
        .as_deref()
        .map(str::trim)
        .filter(|original| !original.is_empty());
    match original {
        Some(original) => {
            if !scripts.contains_key(original) {
                return Err(ScriptError::NotFound(format!(
                    "Script \"{original}\" not found in {}",
                    store::MANIFEST_FILE
                )));
            }
            let collision = scripts
                .keys()
                .any(|key| key != original && script::same_name(key, name));
            if collision {
                return Err(ScriptError::ValidationError(format!(
                    "A script named \"{name}\" already exists in {}",
                    store::MANIFEST_FILE
                )));
            }
            // Renaming drops the old key; a plain update overwrites in place.
            if original != name {
                scripts.shift_remove(original);
            }
        }
        None => {
            if scripts.keys().any(|key| script::same_name(key, name)) {
                return Err(ScriptError::ValidationError(format!(
                    "A script named \"{name}\" already exists in {}",
                    store::MANIFEST_FILE
                )));
            }
        }
    }

    scripts.insert(name.to_string(), serde_json::Value::String(command));
    manifest.insert("scripts".to_string(), serde_json::Value::Object(scripts));
    store.write_manifest(&manifest).await?;
    tracing::info!("Saved package script: {}", name);

    Ok(store::manifest_scripts(&manifest))
}

/// Delete a script from the manifest, the custom config, or both
pub async fn delete_script(
    store: &ConfigStore,
    req: DeleteScriptRequest,
) -> Result<(PackageScripts, Vec<ScriptDefinition>), ScriptError> {
    if !req.remove_from_package && !req.remove_from_custom {
        return Err(ScriptError::ValidationError(
            "Nothing to delete: pick at least one source".to_string(),
        ));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ScriptError::ValidationError(
            "Script name is required".to_string(),
        ));
    }

    let mut manifest = store.read_manifest().await?;
    if req.remove_from_package {
        if let Some(scripts) = manifest
            .get_mut("scripts")
            .and_then(|value| value.as_object_mut())
        {
            scripts.shift_remove(name);
        }
        store.write_manifest(&manifest).await?;
        tracing::info!("Removed script {} from {}", name, store::MANIFEST_FILE);
    }

    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);
    if req.remove_from_custom {
        conf.scripts
            .retain(|script| !script::same_name(&script.name, name));
        store.write_conf(&conf).await?;
        tracing::info!("Removed script {} from {}", name, store::CONF_FILE);
    }

    let merged = merged_scripts(store, &conf).await?;
    Ok((store::manifest_scripts(&manifest), merged))
}

/// Upsert a visibility override for a script of either source
pub async fn set_override_hidden(store: &ConfigStore, req: HideRequest) -> Result<(), ScriptError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ScriptError::ValidationError(
            "Script name is required".to_string(),
        ));
    }

    let mut overrides = store.read_overrides().await?.unwrap_or_default();
    match overrides
        .scripts
        .iter_mut()
        .find(|entry| script::same_name(&entry.name, name))
    {
        Some(entry) => entry.hidden = req.hidden,
        None => overrides.scripts.push(OverrideEntry {
            name: name.to_string(),
            hidden: req.hidden,
            ..OverrideEntry::default()
        }),
    }
    store.write_overrides(&overrides).await?;
    store.ensure_gitignore_entry().await?;
    tracing::info!(
        "{} script {} via overrides",
        if req.hidden { "Hid" } else { "Unhid" },
        name
    );

    Ok(())
}

/// Persist the board's drag-and-drop result: script order plus column
/// assignment per script
pub async fn arrange_custom_scripts(
    store: &ConfigStore,
    order: &[String],
    column_id_by_name: &std::collections::HashMap<String, String>,
) -> Result<Vec<ScriptDefinition>, ScriptError> {
    let mut conf = store.read_conf().await?.unwrap_or_else(ConfFile::starter);

    // Listed names move to the front in the given order; stragglers keep
    // their relative order behind them.
    let mut ordered = Vec::with_capacity(conf.scripts.len());
    for name in order {
        if let Some(pos) = conf
            .scripts
            .iter()
            .position(|script| script::same_name(&script.name, name))
        {
            ordered.push(conf.scripts.remove(pos));
        }
    }
    ordered.append(&mut conf.scripts);
    conf.scripts = ordered;

    for script in &mut conf.scripts {
        let target = column_id_by_name
            .iter()
            .find(|(name, _)| script::same_name(name, &script.name))
            .map(|(_, column_id)| column_id.as_str());
        if let Some(column_id) = target {
            let known = column_id == column::DEFAULT_COLUMN_ID
                || conf.columns.iter().any(|column| column.id == column_id);
            script.column_id = if known {
                column_id.to_string()
            } else {
                column::DEFAULT_COLUMN_ID.to_string()
            };
        }
    }

    store.write_conf(&conf).await?;
    tracing::debug!("Arranged {} custom scripts", conf.scripts.len());

    merged_scripts(store, &conf).await
}

/// Effective board for a config + override pair: the columns in force
/// (override columns shadow the base set when non-empty) and the merged
/// scripts remapped onto them.
pub(crate) fn effective_board(
    conf: &ConfFile,
    overrides: &OverridesFile,
) -> (Vec<Column>, Vec<ScriptDefinition>) {
    let mut columns = if overrides.columns.is_empty() {
        conf.columns.clone()
    } else {
        overrides.columns.clone()
    };
    column::ensure_fallback(&mut columns);

    let mut scripts = script::merge_overrides(&conf.scripts, &overrides.scripts);
    script::assign_known_columns(&mut scripts, &columns);

    (columns, scripts)
}

async fn merged_scripts(
    store: &ConfigStore,
    conf: &ConfFile,
) -> Result<Vec<ScriptDefinition>, ScriptError> {
    let overrides = store.read_overrides().await?.unwrap_or_default();
    let (_, scripts) = effective_board(conf, &overrides);
    Ok(scripts)
}

fn validate_payload(payload: &CustomScriptPayload) -> Result<ScriptDefinition, ScriptError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ScriptError::ValidationError(
            "Script name is required".to_string(),
        ));
    }
    let command: Vec<String> = payload
        .command
        .iter()
        .map(|step| step.trim().to_string())
        .filter(|step| !step.is_empty())
        .collect();
    if command.is_empty() {
        return Err(ScriptError::ValidationError(
            "At least one command is required".to_string(),
        ));
    }
    let column_id = payload.column_id.trim();
    let column_id = if column_id.is_empty() {
        column::DEFAULT_COLUMN_ID.to_string()
    } else {
        column_id.to_string()
    };

    Ok(ScriptDefinition {
        name: name.to_string(),
        command,
        description: payload.description.clone(),
        color: payload.color.clone(),
        column_id,
        hidden: false,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join(store::MANIFEST_FILE),
            r#"{"name":"demo","version":"0.1.0","scripts":{"build":"tsc","test":"vitest"}}"#,
        )
        .await
        .unwrap();
        let store = ConfigStore::new(dir.path());
        (dir, store)
    }

    fn payload(name: &str) -> CustomScriptPayload {
        CustomScriptPayload {
            name: name.to_string(),
            command: vec!["echo hi".to_string()],
            description: String::new(),
            color: "slate".to_string(),
            column_id: String::new(),
            original_name: None,
        }
    }

    #[tokio::test]
    async fn test_load_view_before_init_reports_uninitialized() {
        let (_dir, store) = test_store().await;
        let view = load_view(&store).await.unwrap();

        assert!(!view.initialized);
        assert!(!view.overrides_present);
        assert_eq!(view.package_meta.name, "demo");
        assert_eq!(view.package_scripts.len(), 2);
        assert!(view.custom_scripts.is_empty());
        assert_eq!(view.columns, vec![Column::fallback()]);
    }

    #[tokio::test]
    async fn test_create_then_load_round_trips() {
        let (_dir, store) = test_store().await;
        init(&store).await.unwrap();
        create_custom_script(&store, payload("greet")).await.unwrap();

        let view = load_view(&store).await.unwrap();
        assert!(view.initialized);
        assert_eq!(view.custom_scripts.len(), 1);
        assert_eq!(view.custom_scripts[0].name, "greet");
        assert_eq!(view.custom_scripts[0].column_id, "custom");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_names() {
        let (_dir, store) = test_store().await;
        create_custom_script(&store, payload("dup")).await.unwrap();

        let err = create_custom_script(&store, payload("DUP ")).await;
        assert!(matches!(err, Err(ScriptError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name_and_empty_command() {
        let (_dir, store) = test_store().await;

        let blank = create_custom_script(&store, payload("   ")).await;
        assert!(matches!(blank, Err(ScriptError::ValidationError(_))));

        let mut empty = payload("ok");
        empty.command = vec!["  ".to_string()];
        let empty = create_custom_script(&store, empty).await;
        assert!(matches!(empty, Err(ScriptError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_renames_and_keeps_position() {
        let (_dir, store) = test_store().await;
        create_custom_script(&store, payload("first")).await.unwrap();
        create_custom_script(&store, payload("second")).await.unwrap();

        let mut rename = payload("renamed");
        rename.original_name = Some("first".to_string());
        let scripts = update_custom_script(&store, rename).await.unwrap();

        assert_eq!(scripts[0].name, "renamed");
        assert_eq!(scripts[1].name, "second");
    }

    #[tokio::test]
    async fn test_update_unknown_original_is_not_found() {
        let (_dir, store) = test_store().await;
        let mut rename = payload("whatever");
        rename.original_name = Some("ghost".to_string());

        let err = update_custom_script(&store, rename).await;
        assert!(matches!(err, Err(ScriptError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_override_hidden_merges_into_view() {
        let (_dir, store) = test_store().await;
        create_custom_script(&store, payload("a")).await.unwrap();
        create_custom_script(&store, payload("b")).await.unwrap();

        set_override_hidden(
            &store,
            HideRequest {
                name: "a".to_string(),
                hidden: true,
            },
        )
        .await
        .unwrap();

        let view = load_view(&store).await.unwrap();
        assert!(view.overrides_present);
        assert_eq!(view.hidden_scripts, vec!["a"]);
        let a = view.custom_scripts.iter().find(|s| s.name == "a").unwrap();
        let b = view.custom_scripts.iter().find(|s| s.name == "b").unwrap();
        assert!(a.hidden);
        assert!(!b.hidden);
    }

    #[tokio::test]
    async fn test_override_creation_registers_gitignore_entry() {
        let (dir, store) = test_store().await;
        set_override_hidden(
            &store,
            HideRequest {
                name: "build".to_string(),
                hidden: true,
            },
        )
        .await
        .unwrap();

        let gitignore = tokio::fs::read_to_string(dir.path().join(".gitignore"))
            .await
            .unwrap();
        assert!(gitignore.contains(store::OVERRIDES_FILE));
    }

    #[tokio::test]
    async fn test_override_columns_shadow_base_columns() {
        let (_dir, store) = test_store().await;

        let mut conf = ConfFile::starter();
        conf.columns.push(Column {
            id: "deploy".to_string(),
            name: "Deploy".to_string(),
        });
        store.write_conf(&conf).await.unwrap();

        let mut ship = payload("ship");
        ship.column_id = "deploy".to_string();
        create_custom_script(&store, ship).await.unwrap();

        store
            .write_overrides(&OverridesFile {
                scripts: Vec::new(),
                columns: vec![Column {
                    id: "mine".to_string(),
                    name: "Mine".to_string(),
                }],
            })
            .await
            .unwrap();

        let view = load_view(&store).await.unwrap();
        let ids: Vec<&str> = view.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![column::DEFAULT_COLUMN_ID, "mine"]);
        let ship = view
            .custom_scripts
            .iter()
            .find(|s| s.name == "ship")
            .unwrap();
        assert_eq!(ship.column_id, column::DEFAULT_COLUMN_ID);
    }

    #[tokio::test]
    async fn test_package_script_rename_removes_old_key() {
        let (_dir, store) = test_store().await;
        let scripts = upsert_package_script(
            &store,
            PackageScriptPayload {
                name: "build2".to_string(),
                command: vec!["tsc".to_string()],
                original_name: Some("build".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(scripts.get("build").is_none());
        assert_eq!(scripts.get("build2").and_then(|v| v.as_str()), Some("tsc"));
    }

    #[tokio::test]
    async fn test_package_script_create_never_deletes() {
        let (_dir, store) = test_store().await;
        let scripts = upsert_package_script(
            &store,
            PackageScriptPayload {
                name: "lint".to_string(),
                command: vec!["eslint .".to_string(), "prettier --check .".to_string()],
                original_name: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(scripts.len(), 3);
        assert_eq!(
            scripts.get("lint").and_then(|v| v.as_str()),
            Some("eslint . && prettier --check .")
        );
    }

    #[tokio::test]
    async fn test_package_script_rename_of_missing_entry_is_not_found() {
        let (_dir, store) = test_store().await;
        let err = upsert_package_script(
            &store,
            PackageScriptPayload {
                name: "anything".to_string(),
                command: vec!["true".to_string()],
                original_name: Some("ghost".to_string()),
            },
        )
        .await;
        assert!(matches!(err, Err(ScriptError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_script_requires_a_source_flag() {
        let (_dir, store) = test_store().await;
        let err = delete_script(
            &store,
            DeleteScriptRequest {
                name: "build".to_string(),
                remove_from_package: false,
                remove_from_custom: false,
            },
        )
        .await;
        assert!(matches!(err, Err(ScriptError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_script_from_both_sources() {
        let (_dir, store) = test_store().await;
        create_custom_script(&store, payload("build")).await.unwrap();

        let (package, custom) = delete_script(
            &store,
            DeleteScriptRequest {
                name: "build".to_string(),
                remove_from_package: true,
                remove_from_custom: true,
            },
        )
        .await
        .unwrap();

        assert!(package.get("build").is_none());
        assert!(package.get("test").is_some());
        assert!(custom.is_empty());
    }

    #[tokio::test]
    async fn test_arrange_reorders_and_reassigns_columns() {
        let (_dir, store) = test_store().await;

        let mut conf = ConfFile::starter();
        conf.columns.push(Column {
            id: "infra".to_string(),
            name: "Infra".to_string(),
        });
        store.write_conf(&conf).await.unwrap();

        create_custom_script(&store, payload("a")).await.unwrap();
        create_custom_script(&store, payload("b")).await.unwrap();
        create_custom_script(&store, payload("c")).await.unwrap();

        let mut by_name = std::collections::HashMap::new();
        by_name.insert("a".to_string(), "infra".to_string());
        by_name.insert("b".to_string(), "missing-column".to_string());

        let scripts = arrange_custom_scripts(
            &store,
            &["c".to_string(), "a".to_string()],
            &by_name,
        )
        .await
        .unwrap();

        let names: Vec<&str> = scripts.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        let a = scripts.iter().find(|s| s.name == "a").unwrap();
        assert_eq!(a.column_id, "infra");
        let b = scripts.iter().find(|s| s.name == "b").unwrap();
        assert_eq!(b.column_id, "custom");
        let c = scripts.iter().find(|s| s.name == "c").unwrap();
        assert_eq!(c.column_id, "custom");
    }
}
