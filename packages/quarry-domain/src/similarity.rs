//! Similarity scoring shared by the plan builder and any client-side
//! re-ranking. The search contract is inner product over pre-normalized
//! vectors; cosine exists for callers that cannot guarantee normalization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
	InnerProduct,
	Cosine,
}

pub fn score(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
	match metric {
		Metric::InnerProduct => dot(a, b),
		Metric::Cosine => cosine(a, b),
	}
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(vector: &[f32]) -> f32 {
	dot(vector, vector).sqrt()
}

pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
	let denom = norm(a) * norm(b);

	if denom == 0.0 { 0.0 } else { dot(a, b) / denom }
}

/// Unit-length copy of `vector`; the zero vector is returned unchanged.
pub fn normalize(vector: &[f32]) -> Vec<f32> {
	let length = norm(vector);

	if length == 0.0 {
		return vector.to_vec();
	}

	vector.iter().map(|value| value / length).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn inner_product_equals_cosine_on_normalized_vectors() {
		let a = normalize(&[3.0, 4.0]);
		let b = normalize(&[4.0, 3.0]);

		assert!((dot(&a, &b) - cosine(&a, &b)).abs() < 1e-6);
		assert!((norm(&a) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn normalize_leaves_zero_vector_unchanged() {
		assert_eq!(normalize(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
	}

	#[test]
	fn score_dispatches_on_metric() {
		let a = [1.0, 0.0];
		let b = [0.5, 0.5];

		assert!((score(Metric::InnerProduct, &a, &b) - 0.5).abs() < 1e-6);
		assert!(score(Metric::Cosine, &a, &b) > score(Metric::InnerProduct, &a, &b));
	}
}
