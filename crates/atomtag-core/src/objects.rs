use atomtag_exec::ObjectExecutor;

use crate::config::TaggedConfig;
use crate::error::Result;

/// Tag-guarded access to the objects behind one executor.
///
/// Holds no state besides the executor and configuration: every read or
/// write is a single batch round trip, and calls may run concurrently from
/// many threads when the executor allows it.
#[derive(Debug)]
pub struct TaggedObjects<E> {
    pub(crate) executor: E,
    pub(crate) config: TaggedConfig,
}

impl<E: ObjectExecutor> TaggedObjects<E> {
    /// Wrap an executor with the default configuration.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            config: TaggedConfig::default(),
        }
    }

    /// Wrap an executor with a validated configuration.
    pub fn with_config(executor: E, config: TaggedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { executor, config })
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn config(&self) -> &TaggedConfig {
        &self.config
    }
}
