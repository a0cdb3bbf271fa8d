//! Search-time tuning for the vector index's candidate-list width.

/// Assumed document count when the index stats lookup fails or times out.
pub const DEFAULT_INDEX_SIZE: u64 = 1_000_000;

/// Picks `ef_search` from the index cardinality and the latency target.
/// Larger indexes need a wider candidate list for the same recall; a tight
/// latency budget trades recall for speed.
pub fn ef_search(index_size: u64, target_latency_ms: u32) -> u32 {
	let base: u32 = match index_size {
		size if size < 100_000 => 128,
		size if size < 1_000_000 => 256,
		size if size < 10_000_000 => 512,
		_ => 1_024,
	};
	let factor = if target_latency_ms < 50 {
		0.7
	} else if target_latency_ms < 100 {
		1.0
	} else {
		1.3
	};

	(base as f32 * factor).round() as u32
}
