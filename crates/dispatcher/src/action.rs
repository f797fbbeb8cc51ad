//! Handlers, hooks and per-action configuration

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use contracts::{ActionName, ActionSettings, ActionsManifest, RequestMeta};

/// Per-call context handed to hooks and handlers
pub struct ActionContext<S> {
    /// Resolved action name
    pub action: ActionName,
    /// Request metadata, unmodified
    pub request: Arc<RequestMeta>,
    /// Shared store, `None` when the dispatcher has no store source
    pub store: Option<Arc<S>>,
}

impl<S> ActionContext<S> {
    /// Store, or an error when none is configured
    pub fn require_store(&self) -> anyhow::Result<&Arc<S>> {
        self.store
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No store configured"))
    }
}

impl<S> Clone for ActionContext<S> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            request: Arc::clone(&self.request),
            store: self.store.clone(),
        }
    }
}

impl<S> fmt::Debug for ActionContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("action", &self.action)
            .field("request", &self.request)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

/// Handler function type
///
/// Takes the effective input and the call context, returns the result or
/// whatever error the handler raises.
pub type ActionHandler<S> =
    Arc<dyn Fn(Value, ActionContext<S>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// Hook function type (`before` / `after`), same shape as a handler
pub type ActionHook<S> = ActionHandler<S>;

/// Adapt an async closure into an `ActionHandler`
pub fn handler_fn<S, F, Fut>(f: F) -> ActionHandler<S>
where
    F: Fn(Value, ActionContext<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Arc::new(move |input, ctx| f(input, ctx).boxed())
}

/// Adapt an async closure into an `ActionHook`
pub fn hook_fn<S, F, Fut>(f: F) -> ActionHook<S>
where
    F: Fn(Value, ActionContext<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    handler_fn(f)
}

/// Per-action settings and transforms
pub struct ActionConfig<S> {
    pub disabled: bool,
    /// Applied to the raw input; identity when absent
    pub before: Option<ActionHook<S>>,
    /// Applied to the handler result; identity when absent
    pub after: Option<ActionHook<S>>,
}

impl<S> ActionConfig<S> {
    pub fn enabled() -> Self {
        Self {
            disabled: false,
            before: None,
            after: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::enabled()
        }
    }

    pub fn with_before(mut self, hook: ActionHook<S>) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn with_after(mut self, hook: ActionHook<S>) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

impl<S> Default for ActionConfig<S> {
    fn default() -> Self {
        Self::enabled()
    }
}

impl<S> Clone for ActionConfig<S> {
    fn clone(&self) -> Self {
        Self {
            disabled: self.disabled,
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

impl<S> From<ActionSettings> for ActionConfig<S> {
    fn from(settings: ActionSettings) -> Self {
        Self {
            disabled: settings.disabled,
            ..Self::enabled()
        }
    }
}

impl<S> fmt::Debug for ActionConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionConfig")
            .field("disabled", &self.disabled)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// Enablement map plus hooks
///
/// `actions: None` disables every action. An action is callable only when it
/// is present here, not disabled, and has a registered handler.
pub struct DispatcherConfig<S> {
    pub actions: Option<HashMap<ActionName, ActionConfig<S>>>,
}

impl<S> DispatcherConfig<S> {
    /// Config with an empty (but present) action map
    pub fn new() -> Self {
        Self {
            actions: Some(HashMap::new()),
        }
    }

    /// Config with no action map at all
    pub fn absent() -> Self {
        Self { actions: None }
    }

    /// Build from a loaded manifest (no hooks)
    pub fn from_manifest(manifest: &ActionsManifest) -> Self {
        Self {
            actions: manifest.actions.as_ref().map(|actions| {
                actions
                    .iter()
                    .map(|(name, settings)| (name.clone(), ActionConfig::from(*settings)))
                    .collect()
            }),
        }
    }

    /// Insert or replace an entry (builder style)
    pub fn action(mut self, name: impl Into<ActionName>, config: ActionConfig<S>) -> Self {
        self.actions
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), config);
        self
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&ActionConfig<S>> {
        self.actions.as_ref().and_then(|a| a.get(name))
    }

    /// Mutable entry, for attaching hooks to manifest-loaded actions
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ActionConfig<S>> {
        self.actions.as_mut().and_then(|a| a.get_mut(name))
    }
}

impl<S> Default for DispatcherConfig<S> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<S> fmt::Debug for DispatcherConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("actions", &self.actions)
            .finish()
    }
}
