pub mod filetype;
pub mod plan;
pub mod query;
pub mod similarity;
pub mod time_serde;

pub use plan::{
	Clause, CompositeClause, FieldWeight, Fuzziness, QueryPlan, RangeClause, Sort, TextClause,
	VectorClause, Weighted,
};
pub use query::{
	DateField, SearchQuery, SearchResponse, SearchResult, SortBy, SortOrder, TextOperator,
};
pub use similarity::Metric;
