use lark_domain::{
	AggregationMetadata, Filter, LineageDirection, SearchFlags, SortCriterion, Urn,
};

use crate::{
	LineageSearchService, ServiceResult, WILDCARD_QUERY, batch, cache::LineageCacheKey, filter,
	normalize, search::LineageSearchEntity,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LineageScrollRequest {
	pub source: Urn,
	pub direction: LineageDirection,
	pub entity_types: Vec<String>,
	pub query: Option<String>,
	pub max_hops: Option<u32>,
	pub filter: Option<Filter>,
	pub sort: Option<SortCriterion>,
	/// Opaque continuation token from the previous page, if any.
	pub scroll_id: Option<String>,
	pub keep_alive: String,
	pub size: u32,
	pub start_time_millis: Option<i64>,
	pub end_time_millis: Option<i64>,
	pub flags: Option<SearchFlags>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineageScrollResult {
	pub entities: Vec<LineageSearchEntity>,
	pub num_entities: u64,
	pub page_size: u32,
	pub aggregations: Vec<AggregationMetadata>,
	pub scroll_id: Option<String>,
}

impl LineageSearchService {
	/// Cursor-based counterpart of `search_across_lineage`. Every scroll
	/// request goes through the batched search path; there is no
	/// lightning shortcut, and a stale cache hit only logs a warning.
	pub async fn scroll_across_lineage(
		&self,
		request: LineageScrollRequest,
	) -> ServiceResult<LineageScrollResult> {
		let flags = request.flags.clone().unwrap_or_else(|| self.default_flags());
		let key = LineageCacheKey {
			source: request.source.clone(),
			direction: request.direction,
			start_time_millis: request.start_time_millis,
			end_time_millis: request.end_time_millis,
			max_hops: request.max_hops,
		};
		let max_hops = request.max_hops.unwrap_or(self.cfg.lineage.default_max_hops);
		let lineage = self.lineage_for_key(&key, max_hops, flags.skip_cache, false).await?;
		let relationships = normalize::normalize_relationships(lineage);
		let relationships = filter::filter_relationships(
			relationships,
			&request.entity_types,
			request.filter.as_ref(),
		)?;
		let query = match request.query.as_deref() {
			None | Some("") => WILDCARD_QUERY,
			Some(query) => query,
		};

		batch::scroll_in_batches(
			self.search.as_ref(),
			&relationships,
			query,
			request.filter.as_ref(),
			request.sort.as_ref(),
			request.scroll_id.as_deref(),
			&request.keep_alive,
			request.size,
			&flags,
			self.cfg.search.max_terms_per_batch,
		)
		.await
	}
}
