//! Deployment namespace derivation
//!
//! Pure function over an explicit variable map, so callers decide where the
//! values come from (process environment, tests, a config file).

use std::collections::BTreeMap;

/// Named inputs, equivalent to environment variables
pub type NamespaceVars = BTreeMap<String, String>;

const APP_NAME: &str = "APP_NAME";
const DEPLOY_ENV: &str = "DEPLOY_ENV";
const DEPLOY_BRANCH: &str = "DEPLOY_BRANCH";

const DEFAULT_APP: &str = "app";
const DEFAULT_ENV: &str = "development";
const PRODUCTION: &str = "production";

/// Derive `<app>:<env>[:<branch>]`
///
/// The branch suffix is only added outside production. Empty values count
/// as absent.
pub fn namespace(vars: &NamespaceVars) -> String {
    let lookup = |key: &str| {
        vars.get(key)
            .map(|v| slugify(v))
            .filter(|v| !v.is_empty())
    };

    let app = lookup(APP_NAME).unwrap_or_else(|| DEFAULT_APP.into());
    let env = lookup(DEPLOY_ENV).unwrap_or_else(|| DEFAULT_ENV.into());

    match lookup(DEPLOY_BRANCH) {
        Some(branch) if env != PRODUCTION => format!("{app}:{env}:{branch}"),
        _ => format!("{app}:{env}"),
    }
}

/// Lowercase ASCII alphanumerics, other runs collapsed to one `-`
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
