use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use quarry_config::Config;

const SAMPLE_TOML: &str = r#"
[backend]
endpoint = "http://localhost:9200/"
index = "file-index"
timeout_ms = 5000
stats_timeout_ms = 500

[search]
max_result_window = 10000
target_latency_ms = 100
vector_dim = 512
vector_weight = 0.7
text_weight = 0.3

[cache]
enabled = true
max_entries = 500
max_bytes = 16777216
ttl_secs = 300

[metrics]
window = 1000
"#;

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("quarry_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(payload: &str) -> quarry_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = quarry_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn sample_config_loads_and_trims_endpoint() {
	let cfg = load(SAMPLE_TOML).expect("Expected sample config to load.");

	assert_eq!(cfg.backend.endpoint, "http://localhost:9200");
	assert_eq!(cfg.search.vector_dim, 512);
	assert_eq!(cfg.cache.max_entries, 500);
}

#[test]
fn defaults_cover_cache_and_metrics_sections() {
	let payload = "\
[backend]
endpoint = \"http://localhost:9200\"
index = \"file-index\"
";
	let cfg = load(payload).expect("Expected minimal config to load.");

	assert!(cfg.cache.enabled);
	assert_eq!(cfg.cache.ttl_secs, 300);
	assert_eq!(cfg.metrics.window, 1_000);
	assert_eq!(cfg.search.max_result_window, 10_000);
	assert_eq!(cfg.backend.timeout_ms, 5_000);
}

#[test]
fn empty_index_is_rejected() {
	let payload = SAMPLE_TOML.replace("index = \"file-index\"", "index = \" \"");
	let err = load(&payload).expect_err("Expected index validation error.");

	assert!(err.to_string().contains("backend.index must be non-empty."));
}

#[test]
fn stats_timeout_must_stay_below_primary_timeout() {
	let payload = SAMPLE_TOML.replace("stats_timeout_ms = 500", "stats_timeout_ms = 5000");
	let err = load(&payload).expect_err("Expected timeout validation error.");

	assert!(
		err.to_string()
			.contains("backend.stats_timeout_ms must be less than backend.timeout_ms.")
	);
}

#[test]
fn zero_cache_caps_are_rejected_when_enabled() {
	let payload = SAMPLE_TOML.replace("max_entries = 500", "max_entries = 0");
	let err = load(&payload).expect_err("Expected cache validation error.");

	assert!(err.to_string().contains("cache.max_entries must be greater than zero."));

	let payload = SAMPLE_TOML
		.replace("enabled = true", "enabled = false")
		.replace("max_entries = 500", "max_entries = 0");

	load(&payload).expect("Expected disabled cache to skip cap validation.");
}

#[test]
fn negative_hybrid_weight_is_rejected() {
	let payload = SAMPLE_TOML.replace("vector_weight = 0.7", "vector_weight = -0.1");
	let err = load(&payload).expect_err("Expected weight validation error.");

	assert!(err.to_string().contains("search.vector_weight must be zero or greater."));
}
