use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub backend: Backend,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub metrics: Metrics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	pub endpoint: String,
	pub index: String,
	/// Timeout for the primary search call. Must stay shorter than any
	/// caller-imposed deadline.
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Timeout for the best-effort index-size lookup used by tuning.
	#[serde(default = "default_stats_timeout_ms")]
	pub stats_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub max_result_window: u32,
	pub target_latency_ms: u32,
	pub vector_dim: u32,
	pub vector_weight: f32,
	pub text_weight: f32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			max_result_window: 10_000,
			target_latency_ms: 100,
			vector_dim: 512,
			vector_weight: 0.7,
			text_weight: 0.3,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub enabled: bool,
	pub max_entries: usize,
	pub max_bytes: usize,
	pub ttl_secs: u64,
}
impl Default for Cache {
	fn default() -> Self {
		Self { enabled: true, max_entries: 500, max_bytes: 16 * 1024 * 1024, ttl_secs: 300 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Metrics {
	pub window: usize,
}
impl Default for Metrics {
	fn default() -> Self {
		Self { window: 1_000 }
	}
}

fn default_timeout_ms() -> u64 {
	5_000
}

fn default_stats_timeout_ms() -> u64 {
	500
}
