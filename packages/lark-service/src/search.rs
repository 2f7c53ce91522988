use std::{sync::Arc, time::Instant};

use time::{Duration, OffsetDateTime};

use lark_domain::{
	AggregationMetadata, EntityLineageResult, Filter, LineageDirection, SearchFlags, SortCriterion,
	Urn,
};

use crate::{
	LineageSearchService, ServiceError, ServiceResult, WILDCARD_QUERY, batch,
	cache::{CachedLineageResult, LineageCacheKey},
	filter, lightning, normalize,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LineageSearchRequest {
	pub source: Urn,
	pub direction: LineageDirection,
	/// Entity types to search; empty searches across all types.
	pub entity_types: Vec<String>,
	pub query: Option<String>,
	pub max_hops: Option<u32>,
	pub filter: Option<Filter>,
	pub sort: Option<SortCriterion>,
	pub from: u32,
	pub size: u32,
	pub start_time_millis: Option<i64>,
	pub end_time_millis: Option<i64>,
	pub flags: Option<SearchFlags>,
}

/// A search hit annotated with its hop distance and lineage paths.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineageSearchEntity {
	pub entity: Urn,
	pub score: Option<f64>,
	pub fields: serde_json::Value,
	pub degree: Option<u32>,
	pub paths: Vec<Vec<Urn>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineageSearchResult {
	pub entities: Vec<LineageSearchEntity>,
	pub num_entities: u64,
	pub from: u32,
	pub page_size: u32,
	pub aggregations: Vec<AggregationMetadata>,
}

impl LineageSearchService {
	/// Searches entities reachable from `source` in the requested
	/// direction, restricted by the request's types, filter, and query.
	pub async fn search_across_lineage(
		&self,
		request: LineageSearchRequest,
	) -> ServiceResult<LineageSearchResult> {
		let flags = request.flags.clone().unwrap_or_else(|| self.default_flags());
		let key = LineageCacheKey {
			source: request.source.clone(),
			direction: request.direction,
			start_time_millis: request.start_time_millis,
			end_time_millis: request.end_time_millis,
			max_hops: request.max_hops,
		};
		let max_hops = request.max_hops.unwrap_or(self.cfg.lineage.default_max_hops);
		let graph_started = Instant::now();
		let lineage = self.lineage_for_key(&key, max_hops, flags.skip_cache, true).await?;
		let relationships = normalize::normalize_relationships(lineage);
		let relationships = filter::filter_relationships(
			relationships,
			&request.entity_types,
			request.filter.as_ref(),
		)?;

		tracing::debug!(
			elapsed_ms = graph_started.elapsed().as_millis() as u64,
			size = relationships.len(),
			"Lineage graph resolved."
		);

		let search_started = Instant::now();
		let unconstrained = matches!(
			request.query.as_deref(),
			None | Some("") | Some(WILDCARD_QUERY)
		);

		if relationships.len() > self.cfg.cache.lightning_threshold && unconstrained {
			let result =
				lightning::lightning_search_result(&relationships, request.from, request.size);

			tracing::info!(
				code_path = "lightning",
				elapsed_ms = search_started.elapsed().as_millis() as u64,
				size = result.num_entities,
				"Lineage search complete."
			);

			return Ok(result);
		}

		let query = match request.query.as_deref() {
			None | Some("") => WILDCARD_QUERY,
			Some(query) => query,
		};
		let result = batch::search_in_batches(
			self.search.as_ref(),
			&relationships,
			query,
			request.filter.as_ref(),
			request.sort.as_ref(),
			request.from,
			request.size,
			&flags,
			self.cfg.search.max_terms_per_batch,
		)
		.await?;

		tracing::info!(
			code_path = "tortoise",
			elapsed_ms = search_started.elapsed().as_millis() as u64,
			size = result.num_entities,
			"Lineage search complete."
		);

		Ok(result)
	}

	/// Resolves the traversal for `key`, serving from cache when possible.
	/// A stale hit is served as-is; `allow_refresh` controls whether it
	/// also schedules a background refill.
	pub(crate) async fn lineage_for_key(
		&self,
		key: &LineageCacheKey,
		max_hops: u32,
		skip_cache: bool,
		allow_refresh: bool,
	) -> ServiceResult<EntityLineageResult> {
		let cache_enabled = self.cfg.cache.enabled;
		let cached = if cache_enabled {
			match self.cache.get(key).await {
				Ok(entry) => entry,
				Err(err) => {
					tracing::warn!(
						error = %err,
						source = %key.source,
						"Failed to load cached lineage entry; treating as a miss."
					);

					None
				},
			}
		} else {
			None
		};

		if let Some(entry) = cached.filter(|_| !skip_cache) {
			tracing::debug!(
				source = %key.source,
				fetched_at = %entry.fetched_at,
				"Serving lineage from cache."
			);

			if entry.is_stale(Duration::seconds(self.cfg.cache.ttl_secs)) {
				if allow_refresh {
					tracing::info!(
						source = %key.source,
						"Cached lineage entry is stale; scheduling a refill."
					);
					self.schedule_refresh(key.clone(), max_hops);
				} else {
					tracing::warn!(source = %key.source, "Cached lineage entry is stale.");
				}
			}

			return Ok(entry.lineage);
		}

		let lineage = self
			.graph
			.get_lineage(
				&key.source,
				key.direction,
				0,
				self.cfg.lineage.max_relationships,
				max_hops,
				key.start_time_millis,
				key.end_time_millis,
			)
			.await
			.map_err(|err| ServiceError::Graph { message: err.to_string() })?;

		if cache_enabled {
			let entry = CachedLineageResult {
				lineage: lineage.clone(),
				fetched_at: OffsetDateTime::now_utc(),
			};

			if let Err(err) = self.cache.put(key, entry).await {
				tracing::warn!(
					error = %err,
					source = %key.source,
					"Failed to store cached lineage entry."
				);
			}
		}

		Ok(lineage)
	}

	/// Best-effort refill of a stale entry. Completion is never awaited or
	/// reported back; failures are logged and swallowed.
	fn schedule_refresh(&self, key: LineageCacheKey, max_hops: u32) {
		let cache = Arc::clone(&self.cache);
		let graph = Arc::clone(&self.graph);
		let ttl = Duration::seconds(self.cfg.cache.ttl_secs);
		let max_relationships = self.cfg.lineage.max_relationships;

		self.refresh.submit(Box::pin(async move {
			tracing::debug!(source = %key.source, "Cache refill started.");

			// A concurrent request may have refilled this key since the
			// stale read; re-check before overwriting.
			let current = match cache.get(&key).await {
				Ok(entry) => entry,
				Err(err) => {
					tracing::warn!(
						error = %err,
						source = %key.source,
						"Cache re-check failed; refilling anyway."
					);

					None
				},
			};

			if let Some(entry) = current
				&& !entry.is_stale(ttl)
			{
				tracing::debug!(source = %key.source, "Cache refill not needed.");

				return;
			}

			match graph
				.get_lineage(
					&key.source,
					key.direction,
					0,
					max_relationships,
					max_hops,
					key.start_time_millis,
					key.end_time_millis,
				)
				.await
			{
				Ok(lineage) => {
					let entry =
						CachedLineageResult { lineage, fetched_at: OffsetDateTime::now_utc() };

					match cache.put(&key, entry).await {
						Ok(()) => {
							tracing::debug!(source = %key.source, "Refilled cached lineage entry.");
						},
						Err(err) => tracing::warn!(
							error = %err,
							source = %key.source,
							"Cache refill write failed."
						),
					}
				},
				Err(err) => tracing::warn!(
					error = %err,
					source = %key.source,
					"Cache refill fetch failed."
				),
			}
		}));
	}
}
