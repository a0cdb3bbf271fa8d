use time::OffsetDateTime;

use crate::{
	query::{SortOrder, TextOperator},
	similarity::Metric,
};

/// Backend-agnostic query plan: required clauses (AND), optional weighted
/// clauses (OR, hybrid scoring), and hard filters with no scoring
/// contribution. Built once per cache miss and never mutated after; only the
/// backend's wire layer knows how clauses serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
	pub must: Vec<Clause>,
	pub should: Vec<Weighted>,
	pub filter: Vec<Clause>,
	pub minimum_should_match: Option<u32>,
	pub sort: Sort,
	pub size: u32,
	pub from: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weighted {
	pub clause: Clause,
	pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
	Text(TextClause),
	Vector(VectorClause),
	Term { field: String, value: String },
	Terms { field: String, values: Vec<String> },
	Range(RangeClause),
	Composite(CompositeClause),
	MatchAll,
}

/// Multi-field weighted text match.
#[derive(Debug, Clone, PartialEq)]
pub struct TextClause {
	pub query: String,
	pub fields: Vec<FieldWeight>,
	pub operator: TextOperator,
	pub fuzziness: Option<Fuzziness>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldWeight {
	pub field: String,
	pub boost: f32,
}

/// Edit-distance based on term length, resolved by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
	Auto,
}

/// Similarity-scored clause over a proximity-graph vector index. `ef_search`
/// bounds the candidate list explored at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorClause {
	pub field: String,
	pub vector: Vec<f32>,
	pub k: u32,
	pub ef_search: u32,
	pub metric: Metric,
}

/// Half- or fully-bounded range, inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause {
	pub field: String,
	pub from: Option<OffsetDateTime>,
	pub to: Option<OffsetDateTime>,
}

/// Nested boolean combination. A non-empty `should` implies "at least one
/// must match".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeClause {
	pub must: Vec<Clause>,
	pub should: Vec<Clause>,
	pub must_not: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sort {
	Score,
	Field { field: String, order: SortOrder },
}
