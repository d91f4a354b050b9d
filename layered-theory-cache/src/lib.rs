//! Read-through cache mapping document ids to document theories.
//!
//! [`TheoryCache`] sits in front of a [`TheoryLoader`] (for example a
//! [`RonDirectoryLoader`]) and guarantees at most one load in flight per id.
//! Theories are immutable, so every caller gets a shared `Arc` to the same
//! value.
//!
//! ```no_run
//! use layered_theory::DocumentId;
//! use layered_theory_cache::{CacheConfig, RonDirectoryLoader, TheoryCache};
//!
//! let cache = TheoryCache::new(RonDirectoryLoader::new("theories"), &CacheConfig::default());
//! let theory = cache.get(&DocumentId::from("doc-1"))?;
//! println!("{}", theory);
//! # Ok::<(), layered_theory_cache::CacheError>(())
//! ```

mod cache;
mod error;
mod loader;

pub use cache::{CacheConfig, TheoryCache, TheoryStore};
pub use error::CacheError;
pub use loader::{RonDirectoryLoader, TheoryLoader};
