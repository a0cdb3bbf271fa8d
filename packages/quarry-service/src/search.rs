//! The search operation and its admin surface: validate, consult the cache,
//! tune, plan, execute, shape results, account.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, warn};

use quarry_backend::RawHit;
use quarry_domain::{SearchQuery, SearchResponse, SearchResult};

use crate::{Error, Result, SearchService, fingerprint, lock, metrics::MetricsSnapshot, plan, tune};

const SNIPPET_MAX_CHARS: usize = 200;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub hit_rate: f64,
	pub size: usize,
	pub max_size: usize,
}

impl SearchService {
	pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
		self.validate(query)?;

		let key = fingerprint::fingerprint(query);
		let cache_key = key_prefix(&key).to_string();

		if self.cfg.cache.enabled {
			let cached = lock(&self.cache).get(&key);

			if let Some(response) = cached {
				lock(&self.metrics).record_cache_hit();
				debug!(cache_key, "Cache hit.");

				return Ok(response);
			}

			lock(&self.metrics).record_cache_miss();
			debug!(cache_key, "Cache miss.");
		}

		let started = Instant::now();
		let index = self.cfg.backend.index.as_str();
		let index_size = self.index_size(index).await;
		let ef_search = tune::ef_search(index_size, self.cfg.search.target_latency_ms);
		let plan = plan::build(query, ef_search, &self.cfg.search);
		let raw = match timeout(
			Duration::from_millis(self.cfg.backend.timeout_ms),
			self.backend.execute(index, &plan),
		)
		.await
		{
			Ok(outcome) => outcome?,
			Err(_) => {
				return Err(Error::BackendUnavailable {
					message: format!(
						"Search timed out after {}ms.",
						self.cfg.backend.timeout_ms
					),
				});
			},
		};
		let took_ms = started.elapsed().as_millis() as u64;
		let response = SearchResponse {
			results: raw.hits.into_iter().map(shape_hit).collect(),
			total: raw.total_hits,
			took_ms,
		};

		debug!(index, index_size, ef_search, took_ms, total = response.total, "Search executed.");
		lock(&self.metrics).record(took_ms);

		if self.cfg.cache.enabled {
			self.store(key, cache_key, &response);
		}

		Ok(response)
	}

	pub fn cache_stats(&self) -> CacheStats {
		let (size, max_size) = {
			let cache = lock(&self.cache);

			(cache.len(), cache.max_entries())
		};
		let metrics = lock(&self.metrics);

		CacheStats {
			hits: metrics.cache_hits(),
			misses: metrics.cache_misses(),
			hit_rate: metrics.cache_hit_rate(),
			size,
			max_size,
		}
	}

	pub fn performance_metrics(&self) -> MetricsSnapshot {
		lock(&self.metrics).snapshot()
	}

	/// Drops every cached entry. Hit and miss counters are untouched; those
	/// belong to [`Self::reset_metrics`].
	pub fn clear_cache(&self) {
		lock(&self.cache).clear();
	}

	pub fn reset_metrics(&self) {
		lock(&self.metrics).reset();
	}

	fn validate(&self, query: &SearchQuery) -> Result<()> {
		let window = self.cfg.search.max_result_window as u64;
		let end = query.from as u64 + query.size as u64;

		if end > window {
			return Err(Error::InvalidQuery {
				message: format!(
					"Pagination reaches result {end} but the window ends at {window}."
				),
			});
		}
		if let Some(vector) = query.query_vector()
			&& vector.len() != self.cfg.search.vector_dim as usize
		{
			return Err(Error::InvalidQuery {
				message: format!(
					"Query vector has {} dimensions; the index expects {}.",
					vector.len(),
					self.cfg.search.vector_dim
				),
			});
		}

		Ok(())
	}

	async fn index_size(&self, index: &str) -> u64 {
		let deadline = Duration::from_millis(self.cfg.backend.stats_timeout_ms);

		match timeout(deadline, self.backend.describe_index_size(index)).await {
			Ok(Ok(size)) => size,
			Ok(Err(err)) => {
				warn!(error = %err, "Index size lookup failed; using the default tuning tier.");

				tune::DEFAULT_INDEX_SIZE
			},
			Err(_) => {
				warn!(
					timeout_ms = self.cfg.backend.stats_timeout_ms,
					"Index size lookup timed out; using the default tuning tier."
				);

				tune::DEFAULT_INDEX_SIZE
			},
		}
	}

	// A failed store never fails the search that produced the response.
	fn store(&self, key: String, cache_key: String, response: &SearchResponse) {
		match serde_json::to_vec(response) {
			Ok(body) => {
				let stored = lock(&self.cache).insert(key, response.clone(), body.len());

				if !stored {
					warn!(
						cache_key,
						size_bytes = body.len(),
						"Cache store rejected; the entry exceeds the byte cap."
					);
				}
			},
			Err(err) => warn!(cache_key, error = %err, "Cache store failed."),
		}
	}
}

fn shape_hit(hit: RawHit) -> SearchResult {
	let snippet = hit
		.highlight
		.get("content")
		.and_then(|fragments| fragments.first())
		.cloned()
		.unwrap_or_else(|| leading_chars(hit.source.content.as_deref().unwrap_or_default()));

	SearchResult {
		id: hit.id,
		file_name: hit.source.file_name,
		file_path: hit.source.file_path,
		file_type: hit.source.file_type,
		file_size: hit.source.file_size,
		created_at: hit.source.created_at,
		modified_at: hit.source.modified_at,
		relevance_score: hit.score,
		snippet,
		highlights: hit.highlight,
	}
}

fn leading_chars(content: &str) -> String {
	content.chars().take(SNIPPET_MAX_CHARS).collect()
}

fn key_prefix(key: &str) -> &str {
	&key[..key.len().min(12)]
}
