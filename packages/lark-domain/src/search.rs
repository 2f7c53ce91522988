use crate::urn::Urn;

/// One hit from the search engine. `fields` is the engine's raw document
/// payload and is carried through untouched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchEntity {
	pub entity: Urn,
	pub score: f64,
	pub fields: serde_json::Value,
}

/// One facet value with its count and, where the value itself names an
/// entity, a link to it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterValue {
	pub value: String,
	pub facet_count: u64,
	pub entity: Option<Urn>,
}

/// A named facet group over one result dimension.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AggregationMetadata {
	pub name: String,
	pub display_name: String,
	pub values: Vec<FilterValue>,
}

/// One offset-paginated result page from the search engine.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
	pub entities: Vec<SearchEntity>,
	pub num_entities: u64,
	pub from: u32,
	pub page_size: u32,
	pub aggregations: Vec<AggregationMetadata>,
}

/// One cursor-paginated result page from the search engine.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollResult {
	pub entities: Vec<SearchEntity>,
	pub num_entities: u64,
	pub page_size: u32,
	pub aggregations: Vec<AggregationMetadata>,
	pub scroll_id: Option<String>,
}
