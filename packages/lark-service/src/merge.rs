use lark_domain::{AggregationMetadata, DegreeBucket, FilterValue};

use crate::{scroll::LineageScrollResult, search::LineageSearchResult};

pub(crate) const DEGREE_GROUP: &str = "degree";
pub(crate) const PLATFORM_GROUP: &str = "platform";
pub(crate) const ENTITY_GROUP: &str = "entity";
pub(crate) const ORIGIN_GROUP: &str = "origin";

/// Fixed facet-group ranking: well-known groups in this order, then any
/// remaining names alphabetically.
const RANKED_GROUPS: [&str; 4] = [DEGREE_GROUP, PLATFORM_GROUP, ENTITY_GROUP, ORIGIN_GROUP];

/// Static degree facet descriptor prepended to every batched result. The
/// counts stay zero; the labels double as filter options.
pub(crate) fn degree_filter_group() -> AggregationMetadata {
	AggregationMetadata {
		name: DEGREE_GROUP.to_string(),
		display_name: "Degree of Dependencies".to_string(),
		values: DegreeBucket::ALL
			.iter()
			.map(|bucket| FilterValue {
				value: bucket.label().to_string(),
				facet_count: 0,
				entity: None,
			})
			.collect(),
	}
}

/// Combines two pages as one continuous result: entities concatenated in
/// order, totals summed, facet groups merged by name.
pub fn merge_search_results(
	one: LineageSearchResult,
	two: LineageSearchResult,
) -> LineageSearchResult {
	let mut entities = one.entities;

	entities.extend(two.entities);

	LineageSearchResult {
		entities,
		num_entities: one.num_entities + two.num_entities,
		from: one.from,
		page_size: one.page_size,
		aggregations: merge_aggregations(one.aggregations, two.aggregations),
	}
}

/// Scroll counterpart of `merge_search_results`; the later page's cursor
/// wins.
pub fn merge_scroll_results(
	one: LineageScrollResult,
	two: LineageScrollResult,
) -> LineageScrollResult {
	let mut entities = one.entities;

	entities.extend(two.entities);

	LineageScrollResult {
		entities,
		num_entities: one.num_entities + two.num_entities,
		page_size: one.page_size,
		aggregations: merge_aggregations(one.aggregations, two.aggregations),
		scroll_id: two.scroll_id.or(one.scroll_id),
	}
}

/// Merges facet-group lists by name; counts are additive keyed by value,
/// everything non-additive takes the first non-empty side.
pub fn merge_aggregations(
	one: Vec<AggregationMetadata>,
	two: Vec<AggregationMetadata>,
) -> Vec<AggregationMetadata> {
	let mut merged = one;

	for group in two {
		match merged.iter_mut().find(|existing| existing.name == group.name) {
			Some(existing) => *existing = merge_group(existing.clone(), group),
			None => merged.push(group),
		}
	}

	rank_filter_groups(merged)
}

fn merge_group(one: AggregationMetadata, two: AggregationMetadata) -> AggregationMetadata {
	let mut values = one.values;

	for value in two.values {
		match values.iter_mut().find(|existing| existing.value == value.value) {
			Some(existing) => {
				existing.facet_count += value.facet_count;

				if existing.entity.is_none() {
					existing.entity = value.entity;
				}
			},
			None => values.push(value),
		}
	}

	let display_name =
		if one.display_name.is_empty() { two.display_name } else { one.display_name };

	AggregationMetadata { name: one.name, display_name, values }
}

fn rank_filter_groups(mut groups: Vec<AggregationMetadata>) -> Vec<AggregationMetadata> {
	let rank = |name: &str| {
		RANKED_GROUPS.iter().position(|known| *known == name).unwrap_or(RANKED_GROUPS.len())
	};

	groups.sort_by(|a, b| rank(&a.name).cmp(&rank(&b.name)).then_with(|| a.name.cmp(&b.name)));

	groups
}
