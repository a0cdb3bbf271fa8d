use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use quarry_backend::{
	BoxFuture, Error as BackendError, ExecuteResponse, HitSource, RawHit, SearchBackend,
};
use quarry_config::{Backend, Cache, Config, Metrics, Search};
use quarry_domain::SearchQuery;
use quarry_service::{Error, SearchService};

#[derive(Clone, Copy)]
enum ExecuteMode {
	Succeed,
	IndexNotFound,
	Unavailable,
}

struct StubBackend {
	mode: ExecuteMode,
	index_size: Option<u64>,
	execute_calls: AtomicUsize,
	stats_calls: AtomicUsize,
}
impl StubBackend {
	fn healthy() -> Self {
		Self {
			mode: ExecuteMode::Succeed,
			index_size: Some(250_000),
			execute_calls: AtomicUsize::new(0),
			stats_calls: AtomicUsize::new(0),
		}
	}

	fn failing(mode: ExecuteMode) -> Self {
		Self { mode, ..Self::healthy() }
	}

	fn without_stats() -> Self {
		Self { index_size: None, ..Self::healthy() }
	}

	fn execute_calls(&self) -> usize {
		self.execute_calls.load(Ordering::SeqCst)
	}
}
impl SearchBackend for StubBackend {
	fn execute<'a>(
		&'a self,
		index: &'a str,
		_plan: &'a quarry_domain::QueryPlan,
	) -> BoxFuture<'a, quarry_backend::Result<ExecuteResponse>> {
		self.execute_calls.fetch_add(1, Ordering::SeqCst);

		let result = match self.mode {
			ExecuteMode::Succeed => Ok(ExecuteResponse {
				hits: vec![RawHit {
					id: "doc-1".to_string(),
					score: 1.5,
					source: HitSource {
						file_name: "budget.pdf".to_string(),
						file_path: "/finance/budget.pdf".to_string(),
						file_type: "pdf".to_string(),
						file_size: 2_048,
						content: Some("Quarterly budget report".to_string()),
						..HitSource::default()
					},
					highlight: HashMap::from([(
						"content".to_string(),
						vec!["Quarterly <em>budget</em> report".to_string()],
					)]),
				}],
				took: 7,
				total_hits: 1,
			}),
			ExecuteMode::IndexNotFound =>
				Err(BackendError::IndexNotFound { index: index.to_string() }),
			ExecuteMode::Unavailable =>
				Err(BackendError::Unavailable { message: "connection refused".to_string() }),
		};

		Box::pin(async move { result })
	}

	fn describe_index_size<'a>(&'a self, _index: &'a str) -> BoxFuture<'a, quarry_backend::Result<u64>> {
		self.stats_calls.fetch_add(1, Ordering::SeqCst);

		let result = self
			.index_size
			.ok_or_else(|| BackendError::Unavailable { message: "stats offline".to_string() });

		Box::pin(async move { result })
	}
}

fn config() -> Config {
	Config {
		backend: Backend {
			endpoint: "http://localhost:9200".to_string(),
			index: "files".to_string(),
			timeout_ms: 1_000,
			stats_timeout_ms: 100,
		},
		search: Search { vector_dim: 2, ..Search::default() },
		cache: Cache::default(),
		metrics: Metrics::default(),
	}
}

fn service(backend: Arc<StubBackend>) -> SearchService {
	SearchService::new(config(), backend)
}

fn text_query(text: &str) -> SearchQuery {
	SearchQuery { text: Some(text.to_string()), ..SearchQuery::default() }
}

#[tokio::test]
async fn repeated_query_is_served_from_the_cache() {
	let backend = Arc::new(StubBackend::healthy());
	let service = service(backend.clone());
	let query = text_query("budget");

	let first = service.search(&query).await.expect("first search");

	assert_eq!(first.total, 1);
	assert_eq!(first.results[0].snippet, "Quarterly <em>budget</em> report");
	assert_eq!(backend.execute_calls(), 1);

	let second = service.search(&query).await.expect("second search");

	assert_eq!(second.total, 1);
	assert_eq!(backend.execute_calls(), 1);

	let stats = service.cache_stats();

	assert_eq!(stats.hits, 1);
	assert_eq!(stats.misses, 1);
	assert_eq!(stats.hit_rate, 0.5);
	assert_eq!(stats.size, 1);
	assert_eq!(service.performance_metrics().query_count, 1);
}

#[tokio::test]
async fn different_pagination_misses_the_cache() {
	let backend = Arc::new(StubBackend::healthy());
	let service = service(backend.clone());

	service.search(&text_query("budget")).await.expect("first search");

	let mut paged = text_query("budget");

	paged.from = 20;
	service.search(&paged).await.expect("paged search");

	assert_eq!(backend.execute_calls(), 2);
}

#[tokio::test]
async fn pagination_past_the_window_is_rejected_before_the_backend() {
	let backend = Arc::new(StubBackend::healthy());
	let service = service(backend.clone());
	let mut query = text_query("budget");

	query.from = 9_990;
	query.size = 20;

	let err = service.search(&query).await.expect_err("should reject");

	assert!(matches!(err, Error::InvalidQuery { .. }));
	assert_eq!(backend.execute_calls(), 0);
}

#[tokio::test]
async fn mismatched_vector_dimension_is_rejected() {
	let backend = Arc::new(StubBackend::healthy());
	let service = service(backend.clone());
	let query = SearchQuery { vector: Some(vec![0.1, 0.2, 0.3]), ..SearchQuery::default() };

	let err = service.search(&query).await.expect_err("should reject");

	assert!(matches!(err, Error::InvalidQuery { .. }));
	assert_eq!(backend.execute_calls(), 0);
}

#[tokio::test]
async fn missing_index_surfaces_as_index_not_found() {
	let service = service(Arc::new(StubBackend::failing(ExecuteMode::IndexNotFound)));

	let err = service.search(&text_query("budget")).await.expect_err("should fail");

	assert!(matches!(err, Error::IndexNotFound { index } if index == "files"));
}

#[tokio::test]
async fn unreachable_backend_surfaces_as_unavailable() {
	let service = service(Arc::new(StubBackend::failing(ExecuteMode::Unavailable)));

	let err = service.search(&text_query("budget")).await.expect_err("should fail");

	assert!(matches!(err, Error::BackendUnavailable { .. }));
}

#[tokio::test]
async fn failed_stats_lookup_falls_back_and_still_searches() {
	let backend = Arc::new(StubBackend::without_stats());
	let service = service(backend.clone());

	let response = service.search(&text_query("budget")).await.expect("search");

	assert_eq!(response.total, 1);
	assert_eq!(backend.execute_calls(), 1);
	assert_eq!(backend.stats_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clearing_the_cache_forces_a_fresh_execution() {
	let backend = Arc::new(StubBackend::healthy());
	let service = service(backend.clone());
	let query = text_query("budget");

	service.search(&query).await.expect("first search");
	service.clear_cache();
	service.search(&query).await.expect("second search");

	assert_eq!(backend.execute_calls(), 2);

	// clear_cache keeps the counters; reset_metrics drops them.
	assert_eq!(service.cache_stats().misses, 2);

	service.reset_metrics();

	let stats = service.cache_stats();

	assert_eq!(stats.misses, 0);
	assert_eq!(stats.hit_rate, 0.0);
	assert_eq!(service.performance_metrics().query_count, 0);
}

#[tokio::test]
async fn disabled_cache_always_executes() {
	let backend = Arc::new(StubBackend::healthy());
	let mut cfg = config();

	cfg.cache.enabled = false;

	let service = SearchService::new(cfg, backend.clone());
	let query = text_query("budget");

	service.search(&query).await.expect("first search");
	service.search(&query).await.expect("second search");

	assert_eq!(backend.execute_calls(), 2);
	assert_eq!(service.cache_stats().size, 0);
}
