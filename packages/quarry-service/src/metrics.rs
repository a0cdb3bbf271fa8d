//! Rolling performance counters. Latency samples live in a fixed ring so the
//! percentiles always describe recent behavior rather than the whole process
//! lifetime.

use serde::Serialize;

#[derive(Debug)]
pub struct MetricsRecorder {
	window: usize,
	samples: Vec<u64>,
	cursor: usize,
	query_count: u64,
	cache_hits: u64,
	cache_misses: u64,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct MetricsSnapshot {
	pub query_count: u64,
	pub avg_latency_ms: f64,
	pub p95_latency_ms: u64,
	pub p99_latency_ms: u64,
	pub cache_hit_rate: f64,
}

impl MetricsRecorder {
	pub fn new(window: usize) -> Self {
		Self {
			window,
			samples: Vec::with_capacity(window),
			cursor: 0,
			query_count: 0,
			cache_hits: 0,
			cache_misses: 0,
		}
	}

	/// Records one executed search. Once the ring is full the oldest sample
	/// is overwritten.
	pub fn record(&mut self, latency_ms: u64) {
		self.query_count += 1;

		if self.samples.len() < self.window {
			self.samples.push(latency_ms);
		} else {
			self.samples[self.cursor] = latency_ms;
			self.cursor = (self.cursor + 1) % self.window;
		}
	}

	pub fn record_cache_hit(&mut self) {
		self.cache_hits += 1;
	}

	pub fn record_cache_miss(&mut self) {
		self.cache_misses += 1;
	}

	pub fn cache_hits(&self) -> u64 {
		self.cache_hits
	}

	pub fn cache_misses(&self) -> u64 {
		self.cache_misses
	}

	pub fn cache_hit_rate(&self) -> f64 {
		let lookups = self.cache_hits + self.cache_misses;

		if lookups == 0 { 0.0 } else { self.cache_hits as f64 / lookups as f64 }
	}

	pub fn snapshot(&self) -> MetricsSnapshot {
		let mut sorted = self.samples.clone();

		sorted.sort_unstable();

		let avg = if sorted.is_empty() {
			0.0
		} else {
			sorted.iter().sum::<u64>() as f64 / sorted.len() as f64
		};

		MetricsSnapshot {
			query_count: self.query_count,
			avg_latency_ms: avg,
			p95_latency_ms: percentile(&sorted, 95.0),
			p99_latency_ms: percentile(&sorted, 99.0),
			cache_hit_rate: self.cache_hit_rate(),
		}
	}

	pub fn reset(&mut self) {
		self.samples.clear();
		self.cursor = 0;
		self.query_count = 0;
		self.cache_hits = 0;
		self.cache_misses = 0;
	}
}

/// Nearest-rank percentile over an ascending slice.
fn percentile(sorted: &[u64], p: f64) -> u64 {
	if sorted.is_empty() {
		return 0;
	}

	let rank = (p / 100.0 * sorted.len() as f64).ceil() as usize;
	let index = rank.saturating_sub(1).min(sorted.len() - 1);

	sorted[index]
}
