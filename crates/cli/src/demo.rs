//! Built-in demo action set.
//!
//! Handlers are registered unconditionally; the actions file decides which
//! ones are callable.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use contracts::ActionsManifest;
use dispatcher::{
    hook_fn, ActionContext, Dispatcher, DispatcherBuilder, DispatcherConfig, StoreSource,
};

/// Names of every built-in handler
pub const DEMO_ACTIONS: &[&str] = &["echo", "fail", "greet", "kv.get", "kv.set", "sum"];

/// Actions that carry hooks: (name, has_before, has_after)
pub const DEMO_HOOKS: &[(&str, bool, bool)] = &[("greet", true, false), ("sum", false, true)];

/// In-memory key/value store shared by the `kv.*` actions
#[derive(Debug)]
pub struct DemoStore {
    namespace: String,
    entries: RwLock<BTreeMap<String, Value>>,
}

impl DemoStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(&self.scoped(key)).cloned()
    }

    /// Returns the previous value
    pub async fn set(&self, key: &str, value: Value) -> Option<Value> {
        self.entries.write().await.insert(self.scoped(key), value)
    }
}

/// Build the demo dispatcher
///
/// The store factory runs on the first dispatch that passes validation.
pub fn build_dispatcher(manifest: &ActionsManifest, namespace: String) -> Dispatcher<DemoStore> {
    let mut config = DispatcherConfig::from_manifest(manifest);
    if let Some(greet) = config.get_mut("greet") {
        greet.before = Some(hook_fn(trim_input));
    }
    if let Some(sum) = config.get_mut("sum") {
        sum.after = Some(hook_fn(wrap_total));
    }

    DispatcherBuilder::new()
        .config(config)
        .store(StoreSource::factory(move || {
            let namespace = namespace.clone();
            async move {
                debug!(namespace = %namespace, "Creating demo store");
                observability::record_store_initialized();
                Ok(DemoStore::new(namespace))
            }
        }))
        .handler("echo", |input, _ctx| async move { Ok(input) })
        .handler("greet", greet)
        .handler("sum", sum)
        .handler("kv.get", kv_get)
        .handler("kv.set", kv_set)
        .handler("fail", fail)
        .build()
}

async fn greet(input: Value, _ctx: ActionContext<DemoStore>) -> anyhow::Result<Value> {
    let Some(name) = input.as_str() else {
        bail!("greet expects a string");
    };
    Ok(json!(format!("Hello, {name}!")))
}

async fn sum(input: Value, _ctx: ActionContext<DemoStore>) -> anyhow::Result<Value> {
    let items = input.as_array().context("sum expects an array of numbers")?;

    if let Some(ints) = items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
        let total = ints
            .into_iter()
            .try_fold(0i64, i64::checked_add)
            .context("sum overflowed")?;
        return Ok(json!(total));
    }

    let floats = items
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<_>>>()
        .context("sum expects an array of numbers")?;
    Ok(json!(floats.into_iter().sum::<f64>()))
}

async fn kv_get(input: Value, ctx: ActionContext<DemoStore>) -> anyhow::Result<Value> {
    let key = input.as_str().context("kv.get expects a string key")?;
    let store = ctx.require_store()?;
    Ok(store.get(key).await.unwrap_or(Value::Null))
}

async fn kv_set(input: Value, ctx: ActionContext<DemoStore>) -> anyhow::Result<Value> {
    let key = input
        .get("key")
        .and_then(Value::as_str)
        .context("kv.set expects { \"key\": string, \"value\": any }")?;
    let value = input.get("value").cloned().unwrap_or(Value::Null);
    let store = ctx.require_store()?;
    Ok(store.set(key, value).await.unwrap_or(Value::Null))
}

async fn fail(input: Value, _ctx: ActionContext<DemoStore>) -> anyhow::Result<Value> {
    match input.as_str() {
        Some(message) => bail!("{message}"),
        None => bail!("Requested failure"),
    }
}

async fn trim_input(input: Value, _ctx: ActionContext<DemoStore>) -> anyhow::Result<Value> {
    Ok(match input {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    })
}

async fn wrap_total(result: Value, _ctx: ActionContext<DemoStore>) -> anyhow::Result<Value> {
    Ok(json!({ "total": result }))
}
