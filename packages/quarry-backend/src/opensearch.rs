//! REST client for an OpenSearch-compatible cluster.

use std::{collections::HashMap, time::Duration};

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use quarry_domain::QueryPlan;

use crate::{BoxFuture, Error, ExecuteResponse, HitSource, RawHit, Result, SearchBackend, wire};

pub struct OpenSearchBackend {
	client: Client,
	endpoint: String,
}
impl OpenSearchBackend {
	/// One client per process; the configured timeout applies to every call.
	pub fn new(cfg: &quarry_config::Backend) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()
			.map_err(|err| Error::Backend { message: err.to_string() })?;

		Ok(Self { client, endpoint: cfg.endpoint.trim_end_matches('/').to_string() })
	}

	async fn search(&self, index: &str, plan: &QueryPlan) -> Result<ExecuteResponse> {
		let url = format!("{}/{index}/_search", self.endpoint);
		let body = wire::search_body(plan);
		let response =
			self.client.post(url).json(&body).send().await.map_err(classify_request_error)?;
		let json = decode_response(index, response).await?;

		parse_search_response(&json)
	}

	async fn count(&self, index: &str) -> Result<u64> {
		let url = format!("{}/{index}/_count", self.endpoint);
		let response = self.client.get(url).send().await.map_err(classify_request_error)?;
		let json = decode_response(index, response).await?;

		json.get("count").and_then(Value::as_u64).ok_or_else(|| Error::Backend {
			message: "Count response is missing the count field.".to_string(),
		})
	}
}

impl SearchBackend for OpenSearchBackend {
	fn execute<'a>(
		&'a self,
		index: &'a str,
		plan: &'a QueryPlan,
	) -> BoxFuture<'a, Result<ExecuteResponse>> {
		Box::pin(self.search(index, plan))
	}

	fn describe_index_size<'a>(&'a self, index: &'a str) -> BoxFuture<'a, Result<u64>> {
		Box::pin(self.count(index))
	}
}

fn classify_request_error(err: reqwest::Error) -> Error {
	if err.is_timeout() || err.is_connect() {
		Error::Unavailable { message: err.to_string() }
	} else {
		Error::Backend { message: err.to_string() }
	}
}

async fn decode_response(index: &str, response: Response) -> Result<Value> {
	let status = response.status();

	if status == StatusCode::NOT_FOUND {
		return Err(Error::IndexNotFound { index: index.to_string() });
	}
	if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::TOO_MANY_REQUESTS {
		return Err(Error::Unavailable { message: format!("Backend returned {status}.") });
	}
	if !status.is_success() {
		let detail = response.text().await.unwrap_or_default();

		return Err(Error::Backend { message: format!("Backend returned {status}: {detail}") });
	}

	response.json().await.map_err(|err| Error::Backend { message: err.to_string() })
}

fn parse_search_response(json: &Value) -> Result<ExecuteResponse> {
	let took = json.get("took").and_then(Value::as_u64).unwrap_or(0);
	let hits_body = json.get("hits").ok_or_else(|| Error::Backend {
		message: "Search response is missing the hits object.".to_string(),
	})?;
	let total_hits = hits_body
		.get("total")
		.and_then(|total| total.get("value"))
		.and_then(Value::as_u64)
		.unwrap_or(0);
	let raw_hits = hits_body.get("hits").and_then(Value::as_array);

	let mut hits = Vec::new();

	for raw in raw_hits.into_iter().flatten() {
		let Some(id) = raw.get("_id").and_then(Value::as_str) else {
			continue;
		};
		let score = raw.get("_score").and_then(Value::as_f64).unwrap_or(0.0) as f32;
		let source = raw.get("_source").map(parse_source).unwrap_or_default();
		let highlight = raw.get("highlight").map(parse_highlight).unwrap_or_default();

		hits.push(RawHit { id: id.to_string(), score, source, highlight });
	}

	Ok(ExecuteResponse { hits, took, total_hits })
}

fn parse_source(source: &Value) -> HitSource {
	HitSource {
		file_name: field_string(source, "file_name"),
		file_path: field_string(source, "file_path"),
		file_type: field_string(source, "file_type"),
		file_size: source.get("file_size").and_then(Value::as_i64).unwrap_or(0),
		created_at: field_timestamp(source, "created_at"),
		modified_at: field_timestamp(source, "modified_at"),
		content: source.get("content").and_then(Value::as_str).map(str::to_string),
	}
}

fn parse_highlight(highlight: &Value) -> HashMap<String, Vec<String>> {
	let Some(fields) = highlight.as_object() else {
		return HashMap::new();
	};

	fields
		.iter()
		.map(|(field, fragments)| {
			let fragments = fragments
				.as_array()
				.map(|values| {
					values
						.iter()
						.filter_map(Value::as_str)
						.map(str::to_string)
						.collect::<Vec<_>>()
				})
				.unwrap_or_default();

			(field.clone(), fragments)
		})
		.collect()
}

fn field_string(source: &Value, field: &str) -> String {
	source.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn field_timestamp(source: &Value, field: &str) -> Option<OffsetDateTime> {
	let raw = source.get(field).and_then(Value::as_str)?;

	OffsetDateTime::parse(raw, &Rfc3339).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hits_totals_and_highlights() {
		let json = serde_json::json!({
			"took": 12,
			"hits": {
				"total": { "value": 2, "relation": "eq" },
				"hits": [
					{
						"_id": "doc-1",
						"_score": 1.5,
						"_source": {
							"file_name": "budget.pdf",
							"file_path": "/finance/budget.pdf",
							"file_type": "pdf",
							"file_size": 2048,
							"created_at": "2024-06-01T09:30:00Z",
							"content": "Quarterly budget report"
						},
						"highlight": { "content": ["Quarterly <em>budget</em> report"] }
					},
					{ "_id": "doc-2", "_score": null }
				]
			}
		});
		let parsed = parse_search_response(&json).expect("parse failed");

		assert_eq!(parsed.took, 12);
		assert_eq!(parsed.total_hits, 2);
		assert_eq!(parsed.hits.len(), 2);

		let first = &parsed.hits[0];

		assert_eq!(first.id, "doc-1");
		assert_eq!(first.source.file_size, 2048);
		assert_eq!(first.source.created_at.map(|ts| ts.unix_timestamp()), Some(1_717_234_200));
		assert_eq!(
			first.highlight.get("content").map(Vec::as_slice),
			Some(["Quarterly <em>budget</em> report".to_string()].as_slice())
		);
		assert_eq!(parsed.hits[1].score, 0.0);
	}

	#[test]
	fn hits_without_an_id_are_skipped() {
		let json = serde_json::json!({
			"took": 1,
			"hits": { "total": { "value": 1 }, "hits": [{ "_score": 0.4 }] }
		});
		let parsed = parse_search_response(&json).expect("parse failed");

		assert!(parsed.hits.is_empty());
		assert_eq!(parsed.total_hits, 1);
	}

	#[test]
	fn missing_hits_object_is_a_backend_error() {
		let json = serde_json::json!({ "took": 3 });

		assert!(matches!(parse_search_response(&json), Err(Error::Backend { .. })));
	}
}
