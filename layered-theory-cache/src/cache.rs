use std::sync::Arc;
use std::time::Duration;

use layered_theory::{DocumentId, DocumentTheory};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CacheError, TheoryLoader};

/// Resource bounds for a [`TheoryCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of theories held in memory.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Evict a theory nobody has read for this many seconds.
    #[serde(default)]
    pub time_to_idle_secs: Option<u64>,
}

fn default_max_capacity() -> u64 {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            time_to_idle_secs: None,
        }
    }
}

/// Anything that hands out document theories by id.
pub trait TheoryStore: Send + Sync {
    fn get(&self, id: &DocumentId) -> Result<Arc<DocumentTheory>, CacheError>;
}

/// Read-through cache in front of a [`TheoryLoader`].
///
/// Concurrent `get`s for the same id share a single load; loads of distinct
/// ids run in parallel. A failed load is reported to every waiting caller and
/// is not cached, so the next `get` tries again. Eviction is approximate LRU
/// bounded by [`CacheConfig::max_capacity`].
pub struct TheoryCache<L> {
    loader: L,
    theories: Cache<DocumentId, Arc<DocumentTheory>>,
}

impl<L: TheoryLoader> TheoryCache<L> {
    pub fn new(loader: L, config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);
        if let Some(secs) = config.time_to_idle_secs {
            builder = builder.time_to_idle(Duration::from_secs(secs));
        }
        Self {
            loader,
            theories: builder.build(),
        }
    }

    pub fn get(&self, id: &DocumentId) -> Result<Arc<DocumentTheory>, CacheError> {
        self.theories
            .try_get_with(id.clone(), || {
                debug!(document = %id, "theory cache miss");
                self.loader.load(id).map(Arc::new)
            })
            .map_err(|err| (*err).clone())
    }

    /// Drop `id` so the next `get` reloads it.
    pub fn invalidate(&self, id: &DocumentId) {
        self.theories.invalidate(id);
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.theories.contains_key(id)
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: TheoryLoader> TheoryStore for TheoryCache<L> {
    fn get(&self, id: &DocumentId) -> Result<Arc<DocumentTheory>, CacheError> {
        TheoryCache::get(self, id)
    }
}
