//! Hybrid file-search core: plans queries over a text+vector index, executes
//! them through an opaque backend, and keeps per-process result caching and
//! performance counters.

pub mod cache;
pub mod fingerprint;
pub mod metrics;
pub mod plan;
pub mod search;
pub mod tune;

pub use metrics::MetricsSnapshot;
pub use search::CacheStats;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::Duration;

use quarry_backend::SearchBackend;
use quarry_config::Config;

use crate::{cache::ResultCache, metrics::MetricsRecorder};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Index {index} does not exist.")]
	IndexNotFound { index: String },
	#[error("Search backend unavailable: {message}")]
	BackendUnavailable { message: String },
	#[error("Search failed: {message}")]
	SearchFailed { message: String },
}
impl From<quarry_backend::Error> for Error {
	fn from(err: quarry_backend::Error) -> Self {
		match err {
			quarry_backend::Error::IndexNotFound { index } => Self::IndexNotFound { index },
			quarry_backend::Error::Unavailable { message } => Self::BackendUnavailable { message },
			quarry_backend::Error::Backend { message } => Self::SearchFailed { message },
		}
	}
}

/// Process-wide search state. Built once and shared; a warm process keeps
/// its cache and counters across invocations.
pub struct SearchService {
	cfg: Config,
	backend: Arc<dyn SearchBackend>,
	cache: Mutex<ResultCache>,
	metrics: Mutex<MetricsRecorder>,
}
impl SearchService {
	pub fn new(cfg: Config, backend: Arc<dyn SearchBackend>) -> Self {
		let cache = Mutex::new(ResultCache::new(
			cfg.cache.max_entries,
			cfg.cache.max_bytes,
			Duration::seconds(cfg.cache.ttl_secs as i64),
		));
		let metrics = Mutex::new(MetricsRecorder::new(cfg.metrics.window));

		Self { cfg, backend, cache, metrics }
	}
}

// Cache and metrics state stays usable even if a panic poisoned the lock.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
