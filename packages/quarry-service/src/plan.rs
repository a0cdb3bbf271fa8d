//! Translates a [`SearchQuery`] into the backend-agnostic [`QueryPlan`].
//! Hybrid requests score the vector and text legs as weighted alternatives
//! with at least one required; single-mode requests carry one required
//! clause, and filters never contribute to scoring.

use quarry_domain::{
	Clause, CompositeClause, FieldWeight, Fuzziness, Metric, QueryPlan, RangeClause, SearchQuery,
	Sort, SortBy, TextClause, TextOperator, VectorClause, Weighted, filetype, similarity,
};

pub const VECTOR_FIELD: &str = "embedding";

const TEXT_FIELDS: &[(&str, f32)] = &[("file_name", 3.0), ("file_path", 2.0), ("content", 1.0)];

pub fn build(query: &SearchQuery, ef_search: u32, cfg: &quarry_config::Search) -> QueryPlan {
	let text = text_clause(query);
	let vector = vector_clause(query, ef_search);
	let (must, should, minimum_should_match) = match (text, vector) {
		(Some(text), Some(vector)) => (
			Vec::new(),
			vec![
				Weighted { clause: vector, weight: cfg.vector_weight },
				Weighted { clause: text, weight: cfg.text_weight },
			],
			Some(1),
		),
		(Some(text), None) => (vec![text], Vec::new(), None),
		(None, Some(vector)) => (vec![vector], Vec::new(), None),
		(None, None) => (vec![Clause::MatchAll], Vec::new(), None),
	};

	QueryPlan {
		must,
		should,
		filter: filters(query),
		minimum_should_match,
		sort: sort(query),
		size: query.size,
		from: query.from,
	}
}

fn text_clause(query: &SearchQuery) -> Option<Clause> {
	let text = query.trimmed_text()?;
	// Fuzzy matching widens AND-mode queries past the user's intent, so it
	// only applies in OR mode.
	let fuzziness = match query.text_operator {
		TextOperator::Or => Some(Fuzziness::Auto),
		TextOperator::And => None,
	};
	let fields = TEXT_FIELDS
		.iter()
		.map(|(field, boost)| FieldWeight { field: field.to_string(), boost: *boost })
		.collect();

	Some(Clause::Text(TextClause {
		query: text.to_string(),
		fields,
		operator: query.text_operator,
		fuzziness,
	}))
}

fn vector_clause(query: &SearchQuery, ef_search: u32) -> Option<Clause> {
	let vector = query.query_vector()?;
	// Deep pages need the candidate pool to cover every skipped result.
	let k = (query.from + query.size).max(1);

	Some(Clause::Vector(VectorClause {
		field: VECTOR_FIELD.to_string(),
		vector: similarity::normalize(vector),
		k,
		ef_search,
		metric: Metric::InnerProduct,
	}))
}

fn filters(query: &SearchQuery) -> Vec<Clause> {
	let mut filters = Vec::new();

	if let Some(clause) = filetype_filter(&query.file_types) {
		filters.push(clause);
	}
	if let Some(clause) = set_filter("category", &query.categories) {
		filters.push(clause);
	}
	if let Some(clause) = set_filter("folder", &query.folders) {
		filters.push(clause);
	}
	if query.date_from.is_some() || query.date_to.is_some() {
		filters.push(Clause::Range(RangeClause {
			field: query.date_field.index_field().to_string(),
			from: query.date_from,
			to: query.date_to,
		}));
	}

	filters
}

/// Selected categories expand to their extensions in both index forms.
/// [`filetype::OTHER`] (and any unknown category) means "no known
/// extension", expressed as a negation over every known form; mixing both
/// kinds produces an either-or composite.
fn filetype_filter(selected: &[String]) -> Option<Clause> {
	if selected.is_empty() {
		return None;
	}

	let mut extensions: Vec<&str> = Vec::new();
	let mut include_other = false;

	for category in selected {
		match filetype::extensions(category) {
			Some(known) => extensions.extend_from_slice(known),
			None => include_other = true,
		}
	}

	extensions.sort_unstable();
	extensions.dedup();

	let known = (!extensions.is_empty()).then(|| Clause::Terms {
		field: "file_type".to_string(),
		values: filetype::match_terms(extensions.iter().copied()),
	});
	let other = include_other.then(|| {
		Clause::Composite(CompositeClause {
			must_not: vec![Clause::Terms {
				field: "file_type".to_string(),
				values: filetype::match_terms(filetype::all_known_extensions()),
			}],
			..CompositeClause::default()
		})
	});

	match (known, other) {
		(Some(known), Some(other)) => Some(Clause::Composite(CompositeClause {
			should: vec![known, other],
			..CompositeClause::default()
		})),
		(Some(known), None) => Some(known),
		(None, Some(other)) => Some(other),
		(None, None) => None,
	}
}

fn set_filter(field: &str, values: &[String]) -> Option<Clause> {
	let values: Vec<String> =
		values.iter().map(|value| value.trim().to_string()).filter(|value| !value.is_empty()).collect();

	match values.as_slice() {
		[] => None,
		[value] => Some(Clause::Term { field: field.to_string(), value: value.clone() }),
		_ => Some(Clause::Terms { field: field.to_string(), values }),
	}
}

fn sort(query: &SearchQuery) -> Sort {
	let field = match query.sort_by {
		SortBy::Relevance => return Sort::Score,
		SortBy::Date => query.date_field.index_field().to_string(),
		SortBy::Name => "file_name".to_string(),
		SortBy::Size => "file_size".to_string(),
	};

	Sort::Field { field, order: query.sort_order }
}
