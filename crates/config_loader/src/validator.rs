//! Manifest validation
//!
//! Rules:
//! - action names are non-empty
//! - action names contain no whitespace or control characters
//!
//! Whether a handler exists for a name is only known at dispatch time.

use contracts::{ActionsManifest, ContractError};

/// Validate an ActionsManifest
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(manifest: &ActionsManifest) -> Result<(), ContractError> {
    let Some(actions) = &manifest.actions else {
        return Ok(());
    };
    for name in actions.keys() {
        validate_action_name(name)?;
    }
    Ok(())
}

fn validate_action_name(name: &str) -> Result<(), ContractError> {
    if name.is_empty() {
        return Err(ContractError::config_validation(
            "actions[\"\"]",
            "action name cannot be empty",
        ));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ContractError::config_validation(
            format!("actions[{name:?}]"),
            "action name cannot contain whitespace or control characters",
        ));
    }
    Ok(())
}
