//! Dispatcher - resolve, validate and run one action per request

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, instrument, trace};

use contracts::{ActionName, ContractError, DispatchResponse, RequestEnvelope, Responder};

use crate::action::{handler_fn, ActionConfig, ActionContext, ActionHandler, DispatcherConfig};
use crate::error::DispatchError;
use crate::metrics::DispatchMetrics;
use crate::store::{Store, StoreSource};

const FALLBACK_MESSAGE: &str = "Internal error";

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder<S = ()> {
    config: DispatcherConfig<S>,
    store: StoreSource<S>,
    handlers: HashMap<ActionName, ActionHandler<S>>,
}

impl<S: Send + Sync + 'static> DispatcherBuilder<S> {
    /// Empty builder: no handlers, no action map, no store
    pub fn new() -> Self {
        Self {
            config: DispatcherConfig::absent(),
            store: StoreSource::Absent,
            handlers: HashMap::new(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: DispatcherConfig<S>) -> Self {
        self.config = config;
        self
    }

    /// Add or replace one action entry
    pub fn action(mut self, name: impl Into<ActionName>, config: ActionConfig<S>) -> Self {
        self.config = self.config.action(name, config);
        self
    }

    /// Set the store source
    pub fn store(mut self, store: StoreSource<S>) -> Self {
        self.store = store;
        self
    }

    /// Register an async closure as handler
    pub fn handler<F, Fut>(self, name: impl Into<ActionName>, f: F) -> Self
    where
        F: Fn(Value, ActionContext<S>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.handler_arc(name, handler_fn(f))
    }

    /// Register an already-erased handler
    pub fn handler_arc(mut self, name: impl Into<ActionName>, handler: ActionHandler<S>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn build(self) -> Dispatcher<S> {
        Dispatcher::new(self.config, self.store, self.handlers)
    }
}

impl<S: Send + Sync + 'static> Default for DispatcherBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated request, ready to run
struct Resolved<'a, S> {
    action: &'a str,
    handler: &'a ActionHandler<S>,
    config: &'a ActionConfig<S>,
}

/// The action dispatcher
///
/// Handler map and configuration are immutable after construction; the store
/// is the only shared mutable state and is guarded by its init-once rule.
/// Share across tasks with `Arc<Dispatcher<S>>`.
pub struct Dispatcher<S = ()> {
    config: DispatcherConfig<S>,
    store: Store<S>,
    handlers: HashMap<ActionName, ActionHandler<S>>,
    metrics: Arc<DispatchMetrics>,
}

impl<S: Send + Sync + 'static> Dispatcher<S> {
    /// Pure assignment: no I/O, no validation
    pub fn new(
        config: DispatcherConfig<S>,
        store: StoreSource<S>,
        handlers: HashMap<ActionName, ActionHandler<S>>,
    ) -> Self {
        Self {
            config,
            store: Store::new(store),
            handlers,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn builder() -> DispatcherBuilder<S> {
        DispatcherBuilder::new()
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    pub fn store_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    pub fn config(&self) -> &DispatcherConfig<S> {
        &self.config
    }

    /// Registered handler names, sorted
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether `name` would pass validation (handler present and enabled)
    pub fn is_callable(&self, name: &str) -> bool {
        self.handlers.contains_key(name) && self.config.get(name).is_some_and(|c| c.is_enabled())
    }

    /// Dispatch one request and produce its response
    ///
    /// Never fails: every outcome is a `{ data }` or `{ error }` envelope.
    #[instrument(name = "dispatch", skip(self, request))]
    pub async fn dispatch(&self, request: &RequestEnvelope) -> DispatchResponse {
        self.metrics.inc_total();

        let resolved = match self.resolve(request) {
            Ok(resolved) => resolved,
            Err(e) => {
                trace!(error = %e, "Request rejected");
                self.metrics.inc_rejected();
                return e.into_response();
            }
        };

        match self.execute(&resolved, request).await {
            Ok(data) => {
                self.metrics.inc_succeeded();
                debug!(action = resolved.action, "Action succeeded");
                DispatchResponse::ok(data)
            }
            Err(e) => {
                self.metrics.inc_failed();
                error!(action = resolved.action, error = %e, "Action failed");
                e.into_response()
            }
        }
    }

    /// Dispatch, then hand the response to a responder
    ///
    /// # Errors
    /// Returns the responder's delivery error.
    pub async fn handle<R: Responder>(
        &self,
        request: &RequestEnvelope,
        responder: &mut R,
    ) -> Result<DispatchResponse, ContractError> {
        let response = self.dispatch(request).await;
        responder.respond(&response.envelope, response.status).await?;
        Ok(response)
    }

    /// Steps 1-5: side-effect free, fixed order, first failure wins
    fn resolve(&self, request: &RequestEnvelope) -> Result<Resolved<'_, S>, DispatchError> {
        let body = request.body.as_ref().ok_or(DispatchError::NoBody)?;

        let action = match body.get("action") {
            None => return Err(DispatchError::NoAction),
            Some(value) if is_blank_action(value) => return Err(DispatchError::NoAction),
            Some(Value::String(s)) => s.as_str(),
            Some(other) => return Err(DispatchError::unknown_action(other.to_string())),
        };

        let (action, handler) = self
            .handlers
            .get_key_value(action)
            .ok_or_else(|| DispatchError::unknown_action(action))?;

        let actions = self
            .config
            .actions
            .as_ref()
            .ok_or_else(|| DispatchError::not_enabled(action.as_str()))?;

        let config = actions
            .get(action)
            .filter(|c| c.is_enabled())
            .ok_or_else(|| DispatchError::not_enabled(action.as_str()))?;

        Ok(Resolved {
            action,
            handler,
            config,
        })
    }

    /// Steps 6-9 behind one failure boundary
    async fn execute(
        &self,
        resolved: &Resolved<'_, S>,
        request: &RequestEnvelope,
    ) -> Result<Value, DispatchError> {
        let run = async {
            let store = self.store.get_or_init().await.map_err(|e| {
                DispatchError::StoreInit {
                    message: error_message(&e),
                }
            })?;

            let ctx = ActionContext {
                action: resolved.action.to_string(),
                request: Arc::new(request.meta.clone()),
                store,
            };
            let failure = |e: anyhow::Error| {
                DispatchError::handler_failure(resolved.action, error_message(&e))
            };

            let mut value = request.input();
            if let Some(before) = &resolved.config.before {
                value = before(value, ctx.clone()).await.map_err(failure)?;
            }
            value = (resolved.handler)(value, ctx.clone()).await.map_err(failure)?;
            if let Some(after) = &resolved.config.after {
                value = after(value, ctx).await.map_err(failure)?;
            }
            Ok::<_, DispatchError>(value)
        };

        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(DispatchError::handler_failure(
                resolved.action,
                panic_message(payload.as_ref()),
            )),
        }
    }
}

/// Total mapping from a raised error to its display string
fn error_message(err: &anyhow::Error) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

/// `null`, `false`, zero and `""` all mean "no action given"
fn is_blank_action(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Total mapping from a panic payload to its display string
fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}
