use std::collections::BTreeMap;

use lark_domain::{
	AggregationMetadata, FilterValue, LineageRelationship, Urn,
	urn::{DATA_PLATFORM_PREFIX, DATASET_ENTITY},
};

use crate::{
	merge::{ENTITY_GROUP, ORIGIN_GROUP, PLATFORM_GROUP, degree_filter_group},
	search::{LineageSearchEntity, LineageSearchResult},
};

/// Position of the environment component in a dataset key.
const DATASET_ORIGIN_KEY_INDEX: usize = 2;

/// In-memory pagination and facet tallies for huge wildcard candidate
/// sets. One ordered pass: the `[from, from + size)` slice becomes the
/// page while entity-type, platform, and environment facets accumulate
/// over the entire list.
pub fn lightning_search_result(
	relationships: &[LineageRelationship],
	from: u32,
	size: u32,
) -> LineageSearchResult {
	let mut entities = Vec::new();
	let mut entity_type_counts: BTreeMap<String, u64> = BTreeMap::new();
	let mut platform_counts: BTreeMap<String, u64> = BTreeMap::new();
	let mut origin_counts: BTreeMap<String, u64> = BTreeMap::new();

	for (position, relationship) in relationships.iter().enumerate() {
		if position >= from as usize && entities.len() < size as usize {
			entities.push(LineageSearchEntity {
				entity: relationship.entity.clone(),
				score: None,
				fields: serde_json::Value::Null,
				degree: Some(relationship.degree),
				paths: relationship.paths.clone(),
			});
		}

		let entity_type = relationship.entity.entity_type();

		*entity_type_counts.entry(entity_type.to_string()).or_insert(0) += 1;

		if relationship.entity.carries_platform() {
			match relationship.entity.first_key_part() {
				Some(platform) => {
					let platform = if platform.starts_with(DATA_PLATFORM_PREFIX) {
						platform.to_string()
					} else {
						format!("{DATA_PLATFORM_PREFIX}{platform}")
					};

					*platform_counts.entry(platform).or_insert(0) += 1;
				},
				None => tracing::warn!(
					entity = %relationship.entity,
					"Malformed identifier; skipping platform facet."
				),
			}
		}
		if entity_type.eq_ignore_ascii_case(DATASET_ENTITY) {
			match relationship.entity.key_parts().get(DATASET_ORIGIN_KEY_INDEX) {
				Some(origin) => *origin_counts.entry(origin.to_string()).or_insert(0) += 1,
				None => tracing::warn!(
					entity = %relationship.entity,
					"Malformed dataset identifier; skipping environment facet."
				),
			}
		}
	}

	let mut aggregations = vec![degree_filter_group()];

	if !platform_counts.is_empty() {
		let values: Vec<FilterValue> = platform_counts
			.into_iter()
			.filter_map(|(platform, count)| match Urn::parse(&platform) {
				Ok(urn) => Some(FilterValue {
					value: platform,
					facet_count: count,
					entity: Some(urn),
				}),
				Err(err) => {
					tracing::warn!(error = %err, "Skipping unparseable platform facet value.");

					None
				},
			})
			.collect();

		if !values.is_empty() {
			aggregations.push(AggregationMetadata {
				name: PLATFORM_GROUP.to_string(),
				display_name: "Platform".to_string(),
				values,
			});
		}
	}
	if !entity_type_counts.is_empty() {
		aggregations.push(AggregationMetadata {
			name: ENTITY_GROUP.to_string(),
			display_name: "Type".to_string(),
			values: counts_to_values(entity_type_counts),
		});
	}
	if !origin_counts.is_empty() {
		aggregations.push(AggregationMetadata {
			name: ORIGIN_GROUP.to_string(),
			display_name: "Environment".to_string(),
			values: counts_to_values(origin_counts),
		});
	}

	LineageSearchResult {
		entities,
		num_entities: relationships.len() as u64,
		from,
		page_size: size,
		aggregations,
	}
}

fn counts_to_values(counts: BTreeMap<String, u64>) -> Vec<FilterValue> {
	counts
		.into_iter()
		.map(|(value, count)| FilterValue { value, facet_count: count, entity: None })
		.collect()
}
