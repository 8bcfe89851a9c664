//! Board column types

use serde::{Deserialize, Serialize};

/// Id of the built-in fallback column. Scripts whose column disappears are
/// reassigned here.
pub const DEFAULT_COLUMN_ID: &str = "custom";

/// A grouping bucket for custom scripts on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
}

impl Column {
    /// The fallback column present in every normalized column set.
    pub fn fallback() -> Self {
        Self {
            id: DEFAULT_COLUMN_ID.to_string(),
            name: "custom scripts".to_string(),
        }
    }
}

/// Lowercases the name and collapses each run of non-alphanumeric
/// characters into a single `-`, with no leading or trailing separator.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Guarantees the fallback column is present, adding it at the front when
/// missing.
pub fn ensure_fallback(columns: &mut Vec<Column>) {
    if !columns.iter().any(|column| column.id == DEFAULT_COLUMN_ID) {
        columns.insert(0, Column::fallback());
    }
}

/// Derives a column id from a display name, disambiguating with a numeric
/// suffix when the slug collides with an existing id.
pub fn unique_column_id(name: &str, existing: &[Column]) -> String {
    let slug = slugify(name);
    let base = if slug.is_empty() {
        "column".to_string()
    } else {
        slug
    };
    if !existing.iter().any(|column| column.id == base) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !existing.iter().any(|column| column.id == candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Build & Deploy"), "build-deploy");
        assert_eq!(slugify("  infra  "), "infra");
        assert_eq!(slugify("v2.0 tools"), "v2-0-tools");
    }

    #[test]
    fn test_unique_column_id_adds_numeric_suffix() {
        let existing = vec![
            Column {
                id: "tools".to_string(),
                name: "Tools".to_string(),
            },
            Column {
                id: "tools-2".to_string(),
                name: "Tools".to_string(),
            },
        ];

        assert_eq!(unique_column_id("Tools", &existing), "tools-3");
        assert_eq!(unique_column_id("Other", &existing), "other");
    }

    #[test]
    fn test_unique_column_id_handles_symbol_only_names() {
        assert_eq!(unique_column_id("!!!", &[]), "column");
    }

    #[test]
    fn test_ensure_fallback_inserts_default_column_once() {
        let mut columns = vec![Column {
            id: "infra".to_string(),
            name: "Infra".to_string(),
        }];
        ensure_fallback(&mut columns);
        assert_eq!(columns[0], Column::fallback());

        ensure_fallback(&mut columns);
        assert_eq!(columns.len(), 2);
    }
}
