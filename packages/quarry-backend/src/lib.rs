pub mod opensearch;
pub mod wire;

pub use opensearch::OpenSearchBackend;

use std::{collections::HashMap, future::Future, pin::Pin};

use time::OffsetDateTime;

use quarry_domain::QueryPlan;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Index {index} does not exist.")]
	IndexNotFound { index: String },
	#[error("Search backend unavailable: {message}")]
	Unavailable { message: String },
	#[error("Search backend error: {message}")]
	Backend { message: String },
}

/// The opaque vector+text search capability the core runs against. Index
/// storage, graph construction, and durability all live behind this seam.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn execute<'a>(
		&'a self,
		index: &'a str,
		plan: &'a QueryPlan,
	) -> BoxFuture<'a, Result<ExecuteResponse>>;

	/// Best-effort document count used for search-time tuning. May fail or
	/// time out; callers fall back to a default.
	fn describe_index_size<'a>(&'a self, index: &'a str) -> BoxFuture<'a, Result<u64>>;
}

#[derive(Debug, Clone)]
pub struct ExecuteResponse {
	pub hits: Vec<RawHit>,
	pub took: u64,
	pub total_hits: u64,
}

#[derive(Debug, Clone)]
pub struct RawHit {
	pub id: String,
	pub score: f32,
	pub source: HitSource,
	pub highlight: HashMap<String, Vec<String>>,
}

/// Stored fields of an indexed document, as returned by the backend.
#[derive(Debug, Clone, Default)]
pub struct HitSource {
	pub file_name: String,
	pub file_path: String,
	pub file_type: String,
	pub file_size: i64,
	pub created_at: Option<OffsetDateTime>,
	pub modified_at: Option<OffsetDateTime>,
	pub content: Option<String>,
}
