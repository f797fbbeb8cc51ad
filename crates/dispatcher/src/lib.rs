//! # Dispatcher
//!
//! Action dispatch engine.
//!
//! Responsible for:
//! - Validating an incoming `RequestEnvelope`
//! - Enforcing the allow-list of enabled actions
//! - Sequencing `before -> handler -> after`
//! - Mapping success/failure into a uniform `DispatchResponse`
//! - Materializing the shared store at most once

pub mod action;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod responders;
pub mod store;

pub use action::{
    handler_fn, hook_fn, ActionConfig, ActionContext, ActionHandler, ActionHook, DispatcherConfig,
};
pub use contracts::{
    ActionName, ActionsManifest, DispatchResponse, RequestEnvelope, RequestMeta, Responder,
    ResponseEnvelope,
};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::DispatchError;
pub use metrics::{DispatchMetrics, DispatchMetricsSnapshot};
pub use responders::{MemoryResponder, WriterResponder};
pub use store::{Store, StoreFactory, StoreSource};
