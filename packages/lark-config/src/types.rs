use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub cache: Cache,
	pub lineage: Lineage,
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
	pub enabled: bool,
	/// Staleness horizon for cached traversals. The store itself never
	/// evicts; callers compare fetch timestamps against this.
	pub ttl_secs: i64,
	/// Above this many filtered relationships, wildcard queries skip the
	/// search engine and aggregate in memory.
	pub lightning_threshold: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lineage {
	/// Hop bound used when a request leaves max hops unset.
	pub default_max_hops: u32,
	/// Hard cap on relationships fetched per traversal.
	pub max_relationships: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// The engine's term-filter limit; candidate sets above it are split
	/// into consecutive batches.
	pub max_terms_per_batch: usize,
	pub max_agg_values: u32,
}
