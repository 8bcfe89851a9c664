//! Script domain types
//!
//! Custom scripts live in the shared config file; override entries live in
//! the per-user override file and are merged on top at load time. Manifest
//! scripts are a plain name-to-command map inside the package manifest and
//! have no metadata of their own.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::column::{Column, DEFAULT_COLUMN_ID};

/// Join token between the steps of a multi-step command.
pub const COMMAND_JOIN: &str = " && ";

/// A custom script definition as persisted in the shared config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDefinition {
    pub name: String,
    #[serde(default, deserialize_with = "command_steps")]
    pub command: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_column_id")]
    pub column_id: String,
    #[serde(default)]
    pub hidden: bool,
}

/// A per-user adjustment layered over one script by name.
///
/// Only defined, non-empty fields participate in the merge; `hidden` always
/// does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideEntry {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "command_steps")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
}

fn default_column_id() -> String {
    DEFAULT_COLUMN_ID.to_string()
}

/// Hand-edited config files sometimes hold a single command string instead
/// of a step list; both shapes deserialize to a step list.
fn command_steps<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::One(step) => vec![step],
        Raw::Many(steps) => steps,
    })
}

/// Compares script names the way the dashboard does: trimmed and
/// case-insensitive.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Joins command steps into one shell line, skipping blank steps.
pub fn join_command(steps: &[String]) -> String {
    steps
        .iter()
        .map(|step| step.trim())
        .filter(|step| !step.is_empty())
        .collect::<Vec<_>>()
        .join(COMMAND_JOIN)
}

/// Applies the override layer to the base custom scripts.
///
/// For each base script with an override of the same name, the override's
/// defined and non-empty fields replace the base fields. `hidden` is the
/// union of the override flag and any legacy flag on the base entry.
pub fn merge_overrides(
    base: &[ScriptDefinition],
    overrides: &[OverrideEntry],
) -> Vec<ScriptDefinition> {
    base.iter()
        .map(|script| {
            let Some(over) = overrides.iter().find(|o| same_name(&o.name, &script.name)) else {
                return script.clone();
            };
            let mut merged = script.clone();
            merged.hidden = script.hidden || over.hidden;
            if !over.command.is_empty() {
                merged.command = over.command.clone();
            }
            replace_if_set(&mut merged.description, over.description.as_deref());
            replace_if_set(&mut merged.color, over.color.as_deref());
            replace_if_set(&mut merged.column_id, over.column_id.as_deref());
            merged
        })
        .collect()
}

fn replace_if_set(target: &mut String, candidate: Option<&str>) {
    if let Some(value) = candidate {
        if !value.is_empty() {
            *target = value.to_string();
        }
    }
}

/// Names hidden in the merged view: every name an override explicitly hides
/// plus every base entry carrying the legacy `hidden` flag. Override names
/// may refer to manifest scripts, which have no base entry.
pub fn hidden_names(base: &[ScriptDefinition], overrides: &[OverrideEntry]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for over in overrides.iter().filter(|o| o.hidden) {
        push_unique(&mut names, &over.name);
    }
    for script in base.iter().filter(|s| s.hidden) {
        push_unique(&mut names, &script.name);
    }
    names
}

fn push_unique(names: &mut Vec<String>, candidate: &str) {
    if !names.iter().any(|existing| same_name(existing, candidate)) {
        names.push(candidate.to_string());
    }
}

/// Remaps every script whose column id does not resolve to a known column
/// onto the fallback column.
pub fn assign_known_columns(scripts: &mut [ScriptDefinition], columns: &[Column]) {
    for script in scripts {
        let known = columns.iter().any(|column| column.id == script.column_id);
        if !known {
            script.column_id = DEFAULT_COLUMN_ID.to_string();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn script(name: &str) -> ScriptDefinition {
        ScriptDefinition {
            name: name.to_string(),
            command: vec!["echo base".to_string()],
            description: "base description".to_string(),
            color: "slate".to_string(),
            column_id: DEFAULT_COLUMN_ID.to_string(),
            hidden: false,
        }
    }

    fn override_entry(name: &str) -> OverrideEntry {
        OverrideEntry {
            name: name.to_string(),
            ..OverrideEntry::default()
        }
    }

    #[test]
    fn test_merge_without_override_passes_base_through() {
        let base = vec![script("build")];
        let merged = merge_overrides(&base, &[]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "build");
        assert_eq!(merged[0].description, "base description");
        assert!(!merged[0].hidden);
    }

    #[test]
    fn test_merge_hidden_is_union_of_base_and_override() {
        let base = vec![script("a")];
        let mut over = override_entry("a");
        over.hidden = true;

        let merged = merge_overrides(&base, &[over]);
        assert!(merged[0].hidden);

        let mut legacy = script("b");
        legacy.hidden = true;
        let merged = merge_overrides(&[legacy], &[override_entry("b")]);
        assert!(merged[0].hidden);
    }

    #[test]
    fn test_merge_replaces_only_non_empty_fields() {
        let base = vec![script("deploy")];
        let over = OverrideEntry {
            name: "deploy".to_string(),
            hidden: false,
            description: Some("personal notes".to_string()),
            command: vec![],
            color: Some(String::new()),
            column_id: Some("infra".to_string()),
        };

        let merged = merge_overrides(&base, &[over]);
        assert_eq!(merged[0].description, "personal notes");
        assert_eq!(merged[0].command, vec!["echo base".to_string()]);
        assert_eq!(merged[0].color, "slate");
        assert_eq!(merged[0].column_id, "infra");
    }

    #[test]
    fn test_merge_matches_names_case_insensitively() {
        let base = vec![script("Build")];
        let mut over = override_entry("build ");
        over.hidden = true;

        let merged = merge_overrides(&base, &[over]);
        assert!(merged[0].hidden);
    }

    #[test]
    fn test_hidden_names_covers_overrides_and_legacy_flags() {
        let mut legacy = script("old");
        legacy.hidden = true;
        let base = vec![script("a"), legacy];

        let mut hide_a = override_entry("a");
        hide_a.hidden = true;
        let mut hide_pkg = override_entry("lint");
        hide_pkg.hidden = true;
        let visible = override_entry("b");

        let hidden = hidden_names(&base, &[hide_a, hide_pkg, visible]);
        assert_eq!(hidden, vec!["a", "lint", "old"]);
    }

    #[test]
    fn test_join_command_skips_blank_steps() {
        let steps = vec![
            "npm run build".to_string(),
            "  ".to_string(),
            "npm test".to_string(),
        ];
        assert_eq!(join_command(&steps), "npm run build && npm test");
    }

    #[test]
    fn test_script_command_accepts_string_or_list() {
        let from_list: ScriptDefinition =
            serde_json::from_str(r#"{"name":"a","command":["x","y"]}"#).unwrap();
        assert_eq!(from_list.command, vec!["x", "y"]);

        let from_string: ScriptDefinition =
            serde_json::from_str(r#"{"name":"a","command":"x && y"}"#).unwrap();
        assert_eq!(from_string.command, vec!["x && y"]);
    }

    #[test]
    fn test_script_defaults_fill_missing_fields() {
        let script: ScriptDefinition = serde_json::from_str(r#"{"name":"bare"}"#).unwrap();
        assert!(script.command.is_empty());
        assert_eq!(script.column_id, DEFAULT_COLUMN_ID);
        assert!(!script.hidden);
    }

    #[test]
    fn test_assign_known_columns_remaps_dangling_ids() {
        let columns = vec![Column::fallback()];
        let mut scripts = vec![script("a")];
        scripts[0].column_id = "gone".to_string();

        assign_known_columns(&mut scripts, &columns);
        assert_eq!(scripts[0].column_id, DEFAULT_COLUMN_ID);
    }
}
