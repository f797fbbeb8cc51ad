//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::ActionsManifest;

use super::load_manifest;
use crate::cli::InfoArgs;
use crate::demo::{DEMO_ACTIONS, DEMO_HOOKS};

/// Per-action info for JSON output
#[derive(Debug, Serialize)]
struct ActionInfo {
    name: String,
    configured: bool,
    enabled: bool,
    has_handler: bool,
    callable: bool,
    before: bool,
    after: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading actions info");

    let manifest = load_manifest(&args.config)?;
    let actions = build_action_info(&manifest);

    if args.json {
        let json =
            serde_json::to_string_pretty(&actions).context("Failed to serialize action info")?;
        println!("{}", json);
    } else {
        print_action_info(&manifest, &actions);
    }

    Ok(())
}

/// Union of configured names and built-in handlers, sorted
fn build_action_info(manifest: &ActionsManifest) -> Vec<ActionInfo> {
    let mut names: Vec<String> = DEMO_ACTIONS.iter().map(|n| n.to_string()).collect();
    if let Some(actions) = &manifest.actions {
        names.extend(actions.keys().cloned());
    }
    names.sort();
    names.dedup();

    names
        .into_iter()
        .map(|name| {
            let configured = manifest
                .actions
                .as_ref()
                .is_some_and(|a| a.contains_key(&name));
            let enabled = manifest.is_enabled(&name);
            let has_handler = DEMO_ACTIONS.contains(&name.as_str());
            let (before, after) = DEMO_HOOKS
                .iter()
                .find(|(hooked, _, _)| *hooked == name)
                .filter(|_| configured)
                .map(|(_, before, after)| (*before, *after))
                .unwrap_or((false, false));

            ActionInfo {
                callable: enabled && has_handler,
                name,
                configured,
                enabled,
                has_handler,
                before,
                after,
            }
        })
        .collect()
}

fn print_action_info(manifest: &ActionsManifest, actions: &[ActionInfo]) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Action Dispatch Actions                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if manifest.actions.is_none() {
        println!("⚠ No [actions] table - every action is disabled\n");
    }

    println!("⚙️  Actions ({})", actions.len());
    for (i, action) in actions.iter().enumerate() {
        let prefix = if i == actions.len() - 1 { "└─" } else { "├─" };
        let state = match (action.callable, action.has_handler, action.enabled) {
            (true, _, _) => "callable",
            (false, false, _) => "no handler",
            (false, true, true) => "enabled",
            (false, true, false) if action.configured => "disabled",
            (false, true, false) => "not configured",
        };
        let mut hooks = Vec::new();
        if action.before {
            hooks.push("before");
        }
        if action.after {
            hooks.push("after");
        }
        if hooks.is_empty() {
            println!("   {} {} [{}]", prefix, action.name, state);
        } else {
            println!(
                "   {} {} [{}] hooks: {}",
                prefix,
                action.name,
                state,
                hooks.join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ActionSettings;

    #[test]
    fn test_info_merges_configured_and_builtin() {
        let mut manifest = ActionsManifest::enable(["greet", "ghost"]);
        manifest
            .actions
            .as_mut()
            .unwrap()
            .insert("sum".into(), ActionSettings { disabled: true });

        let info = build_action_info(&manifest);
        let find = |name: &str| info.iter().find(|a| a.name == name).unwrap();

        let greet = find("greet");
        assert!(greet.callable);
        assert!(greet.before);

        let ghost = find("ghost");
        assert!(ghost.enabled && !ghost.has_handler && !ghost.callable);

        let sum = find("sum");
        assert!(sum.configured && !sum.enabled && sum.after);

        let echo = find("echo");
        assert!(!echo.configured && !echo.callable);
    }
}
