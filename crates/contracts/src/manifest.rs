//! ActionsManifest - Config Loader output
//!
//! Serializable enablement settings. Hooks are code and live in the dispatcher.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Action identifier, unique within one dispatcher
pub type ActionName = String;

/// Allow-list of actions
///
/// `actions: None` (no table at all) disables every action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<BTreeMap<ActionName, ActionSettings>>,
}

impl ActionsManifest {
    /// Manifest enabling the given actions with default settings
    pub fn enable<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ActionName>,
    {
        Self {
            actions: Some(
                names
                    .into_iter()
                    .map(|n| (n.into(), ActionSettings::default()))
                    .collect(),
            ),
        }
    }

    /// Whether `name` is present and not disabled
    pub fn is_enabled(&self, name: &str) -> bool {
        self.actions
            .as_ref()
            .and_then(|a| a.get(name))
            .is_some_and(|s| !s.disabled)
    }
}

/// Per-action settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSettings {
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_table_disables_everything() {
        let manifest = ActionsManifest::default();
        assert!(!manifest.is_enabled("echo"));
    }

    #[test]
    fn test_enabled_and_disabled_entries() {
        let mut manifest = ActionsManifest::enable(["echo"]);
        manifest
            .actions
            .as_mut()
            .unwrap()
            .insert("greet".into(), ActionSettings { disabled: true });

        assert!(manifest.is_enabled("echo"));
        assert!(!manifest.is_enabled("greet"));
        assert!(!manifest.is_enabled("missing"));
    }

    #[test]
    fn test_json_shape() {
        let manifest: ActionsManifest =
            serde_json::from_str(r#"{"actions":{"echo":{},"greet":{"disabled":true}}}"#).unwrap();
        assert!(manifest.is_enabled("echo"));
        assert!(!manifest.is_enabled("greet"));
    }
}
