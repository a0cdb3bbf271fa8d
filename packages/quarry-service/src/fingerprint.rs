//! Deterministic cache keys for search requests. Two requests that can only
//! produce the same response must map to the same key, and no user-supplied
//! value may forge another request's key. Each request folds to a canonical
//! JSON payload (sorted and deduplicated sets, absent fields omitted, the
//! query vector reduced to a content digest) and the key is the blake3 hash
//! of that payload.

use serde_json::{Map, Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use quarry_domain::{SearchQuery, SortBy, SortOrder, TextOperator};

const FINGERPRINT_SCHEMA_VERSION: u32 = 1;
const VECTOR_DIGEST_CHARS: usize = 16;

pub fn fingerprint(query: &SearchQuery) -> String {
	let mut payload = Map::new();

	payload.insert("schema_version".to_string(), json!(FINGERPRINT_SCHEMA_VERSION));

	if let Some(text) = query.trimmed_text() {
		payload.insert("text".to_string(), json!(text));
	}
	if let Some(vector) = query.query_vector() {
		payload.insert("vector".to_string(), json!(vector_digest(vector)));
	}
	if let Some(values) = canonical_set(&query.file_types) {
		payload.insert("file_types".to_string(), json!(values));
	}
	if let Some(values) = canonical_set(&query.categories) {
		payload.insert("categories".to_string(), json!(values));
	}
	if let Some(values) = canonical_set(&query.folders) {
		payload.insert("folders".to_string(), json!(values));
	}
	if let Some(from) = query.date_from {
		payload.insert("date_from".to_string(), json!(rfc3339(from)));
	}
	if let Some(to) = query.date_to {
		payload.insert("date_to".to_string(), json!(rfc3339(to)));
	}

	payload.insert("date_field".to_string(), json!(query.date_field.index_field()));
	payload.insert("operator".to_string(), json!(operator_label(query.text_operator)));
	payload.insert("sort_by".to_string(), json!(sort_label(query.sort_by)));
	payload.insert("sort_order".to_string(), json!(order_label(query.sort_order)));
	payload.insert("from".to_string(), json!(query.from));
	payload.insert("size".to_string(), json!(query.size));

	let canonical = Value::Object(payload).to_string();

	blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Trimmed, sorted, deduplicated copy of a set-valued filter; `None` when
/// nothing meaningful remains. Matches the normalization the plan builder
/// applies, so requests that plan identically key identically.
fn canonical_set(values: &[String]) -> Option<Vec<String>> {
	let mut values: Vec<String> = values
		.iter()
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
		.collect();

	values.sort_unstable();
	values.dedup();

	if values.is_empty() { None } else { Some(values) }
}

fn vector_digest(vector: &[f32]) -> String {
	let mut bytes = Vec::with_capacity(vector.len() * 4);

	for value in vector {
		bytes.extend_from_slice(&value.to_le_bytes());
	}

	let hex = blake3::hash(&bytes).to_hex();

	hex[..VECTOR_DIGEST_CHARS].to_string()
}

fn rfc3339(value: OffsetDateTime) -> String {
	value.format(&Rfc3339).unwrap_or_default()
}

fn operator_label(operator: TextOperator) -> &'static str {
	match operator {
		TextOperator::Or => "or",
		TextOperator::And => "and",
	}
}

fn sort_label(sort_by: SortBy) -> &'static str {
	match sort_by {
		SortBy::Relevance => "relevance",
		SortBy::Date => "date",
		SortBy::Name => "name",
		SortBy::Size => "size",
	}
}

fn order_label(order: SortOrder) -> &'static str {
	match order {
		SortOrder::Asc => "asc",
		SortOrder::Desc => "desc",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base_query() -> SearchQuery {
		SearchQuery { text: Some("budget report".to_string()), ..SearchQuery::default() }
	}

	#[test]
	fn keys_are_fixed_width_hex() {
		let key = fingerprint(&base_query());

		assert_eq!(key.len(), 64);
		assert!(key.bytes().all(|byte| byte.is_ascii_hexdigit()));
	}

	#[test]
	fn set_order_duplicates_and_padding_do_not_change_the_key() {
		let mut left = base_query();
		let mut right = base_query();

		left.file_types = vec!["pdf".to_string(), "word".to_string()];
		right.file_types =
			vec![" word ".to_string(), "pdf".to_string(), "pdf".to_string()];

		assert_eq!(fingerprint(&left), fingerprint(&right));
	}

	#[test]
	fn every_result_shaping_field_is_significant() {
		let base = fingerprint(&base_query());

		let mut changed = base_query();
		changed.text = Some("budget forecast".to_string());
		assert_ne!(fingerprint(&changed), base);

		let mut changed = base_query();
		changed.folders = vec!["/finance".to_string()];
		assert_ne!(fingerprint(&changed), base);

		let mut changed = base_query();
		changed.sort_order = SortOrder::Asc;
		assert_ne!(fingerprint(&changed), base);

		let mut changed = base_query();
		changed.from = 20;
		assert_ne!(fingerprint(&changed), base);
	}

	#[test]
	fn any_vector_change_changes_the_key() {
		let mut with_vector = base_query();

		with_vector.vector = Some(vec![0.25; 512]);

		let key = fingerprint(&with_vector);
		let mut other = with_vector.clone();

		if let Some(vector) = other.vector.as_mut() {
			vector[0] = 0.26;
		}

		assert_ne!(fingerprint(&other), key);
	}

	#[test]
	fn blank_text_and_empty_vector_key_like_absent_fields() {
		let mut query = base_query();

		query.text = Some("   ".to_string());
		query.vector = Some(Vec::new());

		let mut bare = base_query();

		bare.text = None;

		assert_eq!(fingerprint(&query), fingerprint(&bare));
	}

	#[test]
	fn text_cannot_impersonate_a_filtered_query() {
		let mut smuggled = base_query();
		let mut filtered = base_query();

		smuggled.text = Some("report|ft=pdf".to_string());
		filtered.text = Some("report".to_string());
		filtered.file_types = vec!["pdf".to_string()];

		assert_ne!(fingerprint(&smuggled), fingerprint(&filtered));
	}

	#[test]
	fn a_comma_inside_a_set_value_is_not_a_delimiter() {
		let mut joined = base_query();
		let mut split = base_query();

		joined.categories = vec!["a,b".to_string()];
		split.categories = vec!["a".to_string(), "b".to_string()];

		assert_ne!(fingerprint(&joined), fingerprint(&split));
	}
}
