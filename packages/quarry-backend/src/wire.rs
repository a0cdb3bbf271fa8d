//! Query-plan serialization to the OpenSearch request DSL. This is the only
//! module that knows the wire shape; everything upstream works on
//! [`QueryPlan`] clauses.

use serde_json::{Map, Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use quarry_domain::{
	Clause, CompositeClause, Fuzziness, QueryPlan, RangeClause, Sort, SortOrder, TextClause,
	TextOperator, VectorClause,
};

pub fn search_body(plan: &QueryPlan) -> Value {
	let mut bool_body = Map::new();

	if !plan.must.is_empty() {
		let must: Vec<Value> = plan.must.iter().map(|clause| clause_value(clause, None)).collect();

		bool_body.insert("must".to_string(), Value::Array(must));
	}
	if !plan.should.is_empty() {
		let should: Vec<Value> = plan
			.should
			.iter()
			.map(|weighted| clause_value(&weighted.clause, Some(weighted.weight)))
			.collect();

		bool_body.insert("should".to_string(), Value::Array(should));
	}
	if !plan.filter.is_empty() {
		let filter: Vec<Value> =
			plan.filter.iter().map(|clause| clause_value(clause, None)).collect();

		bool_body.insert("filter".to_string(), Value::Array(filter));
	}
	if let Some(min) = plan.minimum_should_match {
		bool_body.insert("minimum_should_match".to_string(), json!(min));
	}

	let mut body = Map::new();

	body.insert("query".to_string(), json!({ "bool": bool_body }));
	body.insert("sort".to_string(), sort_value(&plan.sort));
	body.insert("size".to_string(), json!(plan.size));
	body.insert("from".to_string(), json!(plan.from));
	body.insert("track_total_hits".to_string(), json!(true));
	body.insert(
		"highlight".to_string(),
		json!({ "fields": { "content": {}, "file_name": {} } }),
	);

	Value::Object(body)
}

fn clause_value(clause: &Clause, boost: Option<f32>) -> Value {
	match clause {
		Clause::Text(text) => text_value(text, boost),
		Clause::Vector(vector) => vector_value(vector, boost),
		Clause::Term { field, value } => {
			json!({ "term": { field: { "value": value } } })
		},
		Clause::Terms { field, values } => {
			json!({ "terms": { field: values } })
		},
		Clause::Range(range) => range_value(range),
		Clause::Composite(composite) => composite_value(composite),
		Clause::MatchAll => json!({ "match_all": {} }),
	}
}

fn text_value(text: &TextClause, boost: Option<f32>) -> Value {
	let fields: Vec<String> = text
		.fields
		.iter()
		.map(|field| format!("{}^{}", field.field, field.boost))
		.collect();
	let mut inner = Map::new();

	inner.insert("query".to_string(), json!(text.query));
	inner.insert("fields".to_string(), json!(fields));
	inner.insert("operator".to_string(), json!(operator_label(text.operator)));

	if let Some(Fuzziness::Auto) = text.fuzziness {
		inner.insert("fuzziness".to_string(), json!("AUTO"));
	}
	if let Some(boost) = boost {
		inner.insert("boost".to_string(), json!(boost));
	}

	json!({ "multi_match": inner })
}

fn vector_value(vector: &VectorClause, boost: Option<f32>) -> Value {
	let mut inner = Map::new();

	inner.insert("vector".to_string(), json!(vector.vector));
	inner.insert("k".to_string(), json!(vector.k));
	inner.insert(
		"method_parameters".to_string(),
		json!({ "ef_search": vector.ef_search }),
	);

	if let Some(boost) = boost {
		inner.insert("boost".to_string(), json!(boost));
	}

	let field = vector.field.as_str();

	json!({ "knn": { field: inner } })
}

fn range_value(range: &RangeClause) -> Value {
	let mut bounds = Map::new();

	if let Some(from) = range.from {
		bounds.insert("gte".to_string(), json!(rfc3339(from)));
	}
	if let Some(to) = range.to {
		bounds.insert("lte".to_string(), json!(rfc3339(to)));
	}

	let field = range.field.as_str();

	json!({ "range": { field: bounds } })
}

fn composite_value(composite: &CompositeClause) -> Value {
	let mut inner = Map::new();

	if !composite.must.is_empty() {
		let must: Vec<Value> =
			composite.must.iter().map(|clause| clause_value(clause, None)).collect();

		inner.insert("must".to_string(), Value::Array(must));
	}
	if !composite.should.is_empty() {
		let should: Vec<Value> =
			composite.should.iter().map(|clause| clause_value(clause, None)).collect();

		inner.insert("should".to_string(), Value::Array(should));
		inner.insert("minimum_should_match".to_string(), json!(1));
	}
	if !composite.must_not.is_empty() {
		let must_not: Vec<Value> =
			composite.must_not.iter().map(|clause| clause_value(clause, None)).collect();

		inner.insert("must_not".to_string(), Value::Array(must_not));
	}

	json!({ "bool": inner })
}

fn sort_value(sort: &Sort) -> Value {
	match sort {
		Sort::Score => json!([{ "_score": { "order": "desc" } }]),
		Sort::Field { field, order } => {
			json!([{ field: { "order": order_label(*order) } }])
		},
	}
}

fn operator_label(operator: TextOperator) -> &'static str {
	match operator {
		TextOperator::Or => "or",
		TextOperator::And => "and",
	}
}

fn order_label(order: SortOrder) -> &'static str {
	match order {
		SortOrder::Asc => "asc",
		SortOrder::Desc => "desc",
	}
}

fn rfc3339(value: OffsetDateTime) -> String {
	value.format(&Rfc3339).unwrap_or_default()
}
