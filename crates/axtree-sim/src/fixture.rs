//! Declarative tree fixtures.
//!
//! A fixture document describes the desktop's children as nested
//! [`NodeSpec`]s, so tests can stand up a whole tree from a YAML or JSON
//! literal instead of a pile of `add_node` calls.

use crate::tree::{NodeSpec, SimTree};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported fixture extension: {0}")]
    Extension(String),
}

/// Top-level fixture document: the desktop's children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeFixture {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl SimTree {
    /// Build a tree from a YAML fixture document.
    pub fn from_yaml(source: &str) -> Result<Self, FixtureError> {
        let fixture: TreeFixture = serde_yaml::from_str(source)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Build a tree from a JSON fixture document.
    pub fn from_json(source: &str) -> Result<Self, FixtureError> {
        let fixture: TreeFixture = serde_json::from_str(source)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Build a tree from a fixture file, dispatching on the extension
    /// (`.yaml`/`.yml` or `.json`).
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            other => Err(FixtureError::Extension(other.to_string())),
        }
    }

    /// Build a tree from an already-parsed fixture.
    pub fn from_fixture(fixture: TreeFixture) -> Self {
        let tree = Self::new();
        let root = tree.root();
        for spec in &fixture.nodes {
            // The root is live by construction, so insertion cannot fail.
            let _ = tree.add_node(root, spec.clone());
        }
        debug!(nodes = tree.node_count(), "tree loaded from fixture");
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axtree_core::{PropertyId, PropertyValue, TreeProvider};
    use axtree_core::{SearchQuery, SearchScope};

    const YAML_FIXTURE: &str = r#"
nodes:
  - name: Settings
    control_type: Window
    children:
      - name: Volume
        class_name: Slider
        range:
          value: 30.0
          maximum: 100.0
      - name: Apply
        class_name: Button
        invokable: true
"#;

    #[test]
    fn test_yaml_fixture_builds_tree() {
        let tree = SimTree::from_yaml(YAML_FIXTURE).unwrap();
        // Desktop + window + two controls.
        assert_eq!(tree.node_count(), 4);

        let apply = SearchQuery::new()
            .with_name("Apply")
            .find_first(&tree)
            .unwrap()
            .unwrap();
        assert_eq!(
            tree.property(apply, PropertyId::ClassName).unwrap(),
            Some(PropertyValue::from("Button"))
        );
    }

    #[test]
    fn test_json_fixture_builds_tree() {
        let tree = SimTree::from_json(
            r#"{
                "nodes": [
                    {"name": "Main", "children": [{"name": "Ok", "invokable": true}]}
                ]
            }"#,
        )
        .unwrap();
        let ok = SearchQuery::new()
            .with_name("ok")
            .with_scope(SearchScope::Descendants)
            .find_first(&tree)
            .unwrap();
        assert!(ok.is_some());
    }

    #[test]
    fn test_fixture_defaults_apply() {
        let tree = SimTree::from_yaml("nodes:\n  - name: Bare\n").unwrap();
        let bare = SearchQuery::new()
            .with_name("Bare")
            .find_first(&tree)
            .unwrap()
            .unwrap();
        // Unspecified fields fall back to the NodeSpec defaults: enabled,
        // no range.
        assert_eq!(
            tree.property(bare, PropertyId::IsEnabled).unwrap(),
            Some(PropertyValue::Bool(true))
        );
    }

    #[test]
    fn test_bad_yaml_is_a_parse_error() {
        let err = SimTree::from_yaml("nodes: {not: [a list").unwrap_err();
        assert!(matches!(err, FixtureError::Yaml(_)));
    }
}
