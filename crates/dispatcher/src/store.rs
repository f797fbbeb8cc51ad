//! Store - lazily materialized shared value
//!
//! Two states: uninitialized and initialized, one-way. Concurrent first
//! dispatches share one in-flight initialization through a
//! `tokio::sync::OnceCell`, so the factory runs at most once on success.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::OnceCell;
use tracing::{info, instrument};

/// Zero-argument async store factory
pub type StoreFactory<S> = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<S>> + Send + Sync>;

/// Where the store comes from
pub enum StoreSource<S> {
    /// No store; handlers see `None`
    Absent,
    /// Precomputed value, published on first dispatch
    Value(Arc<S>),
    /// Factory, invoked on first dispatch
    Factory(StoreFactory<S>),
}

impl<S> StoreSource<S> {
    pub fn value(value: S) -> Self {
        Self::Value(Arc::new(value))
    }

    pub fn factory<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<S>> + Send + 'static,
    {
        Self::Factory(Box::new(move || f().boxed()))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Value(_) => "value",
            Self::Factory(_) => "factory",
        }
    }
}

impl<S> Default for StoreSource<S> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<S> fmt::Debug for StoreSource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Init-once holder for the store
pub struct Store<S> {
    source: StoreSource<S>,
    cell: OnceCell<Arc<S>>,
}

impl<S: Send + Sync + 'static> Store<S> {
    pub fn new(source: StoreSource<S>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Whether a value has been published
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Ensure the store is materialized and return it
    ///
    /// Never re-materializes once set. A failed factory leaves the store
    /// uninitialized so a later call retries.
    ///
    /// # Errors
    /// Returns the factory's error.
    #[instrument(name = "store_get_or_init", skip(self), fields(source = self.source.kind()))]
    pub async fn get_or_init(&self) -> anyhow::Result<Option<Arc<S>>> {
        let value = match &self.source {
            StoreSource::Absent => return Ok(None),
            StoreSource::Value(value) => {
                self.cell
                    .get_or_init(|| async {
                        info!("Store initialized from value");
                        Arc::clone(value)
                    })
                    .await
            }
            StoreSource::Factory(factory) => {
                self.cell
                    .get_or_try_init(|| async {
                        let store = factory().await?;
                        info!("Store initialized from factory");
                        Ok::<_, anyhow::Error>(Arc::new(store))
                    })
                    .await?
            }
        };
        Ok(Some(Arc::clone(value)))
    }
}

impl<S> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("source", &self.source)
            .field("initialized", &self.cell.initialized())
            .finish()
    }
}
