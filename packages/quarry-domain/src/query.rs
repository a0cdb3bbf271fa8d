use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Which timestamp a date filter, and a date sort, applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
	#[default]
	Creation,
	Modification,
}
impl DateField {
	pub fn index_field(self) -> &'static str {
		match self {
			Self::Creation => "created_at",
			Self::Modification => "modified_at",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOperator {
	#[default]
	Or,
	And,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
	#[default]
	Relevance,
	Date,
	Name,
	Size,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
	Asc,
	#[default]
	Desc,
}

/// A user search request: free text and/or an image-similarity vector plus
/// structural filters. Set-valued filters are carried as vectors; duplicates
/// and ordering are irrelevant to the query's meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
	pub text: Option<String>,
	pub vector: Option<Vec<f32>>,
	pub file_types: Vec<String>,
	pub categories: Vec<String>,
	pub folders: Vec<String>,
	#[serde(with = "crate::time_serde::option")]
	pub date_from: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub date_to: Option<OffsetDateTime>,
	pub date_field: DateField,
	pub text_operator: TextOperator,
	pub sort_by: SortBy,
	pub sort_order: SortOrder,
	pub size: u32,
	pub from: u32,
}
impl SearchQuery {
	/// Trimmed query text; whitespace-only text is treated as absent.
	pub fn trimmed_text(&self) -> Option<&str> {
		self.text.as_deref().map(str::trim).filter(|text| !text.is_empty())
	}

	/// The similarity vector; an empty vector is treated as absent.
	pub fn query_vector(&self) -> Option<&[f32]> {
		self.vector.as_deref().filter(|vector| !vector.is_empty())
	}
}

impl Default for SearchQuery {
	fn default() -> Self {
		Self {
			text: None,
			vector: None,
			file_types: Vec::new(),
			categories: Vec::new(),
			folders: Vec::new(),
			date_from: None,
			date_to: None,
			date_field: DateField::default(),
			text_operator: TextOperator::default(),
			sort_by: SortBy::default(),
			sort_order: SortOrder::default(),
			size: 20,
			from: 0,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
	pub id: String,
	pub file_name: String,
	pub file_path: String,
	pub file_type: String,
	pub file_size: i64,
	#[serde(with = "crate::time_serde::option")]
	pub created_at: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub modified_at: Option<OffsetDateTime>,
	pub relevance_score: f32,
	pub snippet: String,
	pub highlights: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
	pub results: Vec<SearchResult>,
	pub total: u64,
	pub took_ms: u64,
}
