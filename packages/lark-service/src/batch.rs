use std::collections::{HashMap, HashSet};

use lark_domain::{
	Criterion, Filter, LineageRelationship, SearchFlags, SearchResult, SortCriterion, Urn,
};

use crate::{
	DEGREE_FIELD, SearchProvider, ServiceError, ServiceResult, URN_FIELD,
	merge::{self, degree_filter_group},
	scroll::LineageScrollResult,
	search::{LineageSearchEntity, LineageSearchResult},
};

/// Runs the query against the engine in identifier batches of at most
/// `max_terms` and merges the pages into one result. The type scope and
/// annotation lookup are derived per batch, from that batch's
/// relationships only. Offsets are kept over the whole sequence: each
/// batch is asked for the part of `[from, from + size)` that earlier
/// batches did not cover.
pub async fn search_in_batches(
	search: &dyn SearchProvider,
	relationships: &[LineageRelationship],
	query: &str,
	input_filter: Option<&Filter>,
	sort: Option<&SortCriterion>,
	from: u32,
	size: u32,
	flags: &SearchFlags,
	max_terms: usize,
) -> ServiceResult<LineageSearchResult> {
	let candidates = dedupe_by_urn(relationships);
	let mut merged: Option<LineageSearchResult> = None;
	let mut total_matched: u64 = 0;
	let mut returned: u32 = 0;

	for chunk in candidates.chunks(max_terms.max(1)) {
		let entity_types = distinct_entity_types(chunk);
		let lookup = relationship_lookup(chunk);
		let batch_filter = build_batch_filter(input_filter, chunk);
		let matched = u32::try_from(total_matched).unwrap_or(u32::MAX);
		let query_from = from.saturating_sub(matched);
		let query_size = size.saturating_sub(returned);
		let page = search
			.search_across_entities(
				&entity_types,
				query,
				&batch_filter,
				sort,
				query_from,
				query_size,
				flags,
			)
			.await
			.map_err(|err| ServiceError::Search { message: err.to_string() })?;

		total_matched += page.num_entities;

		let annotated = annotate_page(page, &lookup);

		returned += annotated.entities.len() as u32;
		merged = Some(match merged {
			Some(acc) => merge::merge_search_results(acc, annotated),
			None => annotated,
		});
	}

	let mut result = merged.unwrap_or_else(|| LineageSearchResult {
		entities: Vec::new(),
		num_entities: 0,
		from,
		page_size: size,
		aggregations: Vec::new(),
	});

	result.from = from;
	result.page_size = size;
	result.aggregations.insert(0, degree_filter_group());

	Ok(result)
}

/// Cursor-paginated counterpart of `search_in_batches`. The caller's
/// cursor and keep-alive are handed to every batch; the merged result
/// carries the last cursor the engine returned.
pub async fn scroll_in_batches(
	search: &dyn SearchProvider,
	relationships: &[LineageRelationship],
	query: &str,
	input_filter: Option<&Filter>,
	sort: Option<&SortCriterion>,
	scroll_id: Option<&str>,
	keep_alive: &str,
	size: u32,
	flags: &SearchFlags,
	max_terms: usize,
) -> ServiceResult<LineageScrollResult> {
	let candidates = dedupe_by_urn(relationships);
	let mut merged: Option<LineageScrollResult> = None;
	let mut returned: u32 = 0;

	for chunk in candidates.chunks(max_terms.max(1)) {
		let entity_types = distinct_entity_types(chunk);
		let lookup = relationship_lookup(chunk);
		let batch_filter = build_batch_filter(input_filter, chunk);
		let query_size = size.saturating_sub(returned);
		let page = search
			.scroll_across_entities(
				&entity_types,
				query,
				&batch_filter,
				sort,
				scroll_id,
				keep_alive,
				query_size,
				flags,
			)
			.await
			.map_err(|err| ServiceError::Search { message: err.to_string() })?;
		let annotated = LineageScrollResult {
			entities: annotate_entities(page.entities, &lookup),
			num_entities: page.num_entities,
			page_size: page.page_size,
			aggregations: page.aggregations,
			scroll_id: page.scroll_id,
		};

		returned += annotated.entities.len() as u32;
		merged = Some(match merged {
			Some(acc) => merge::merge_scroll_results(acc, annotated),
			None => annotated,
		});
	}

	let mut result = merged.unwrap_or_else(|| LineageScrollResult {
		entities: Vec::new(),
		num_entities: 0,
		page_size: size,
		aggregations: Vec::new(),
		scroll_id: None,
	});

	result.page_size = size;
	result.aggregations.insert(0, degree_filter_group());

	Ok(result)
}

/// One membership criterion over the batch, ANDed onto every disjunct of
/// the caller's filter. Degree criteria are stripped first; they were
/// already applied in memory and the engine has no such field.
fn build_batch_filter(
	input_filter: Option<&Filter>,
	chunk: &[&LineageRelationship],
) -> Filter {
	let membership = Criterion::new(
		URN_FIELD,
		chunk.iter().map(|relationship| relationship.entity.as_str().to_string()).collect(),
	);

	match input_filter {
		Some(filter) => filter.without_field(DEGREE_FIELD).conjoin(membership),
		None => Filter::from_criterion(membership),
	}
}

fn dedupe_by_urn(relationships: &[LineageRelationship]) -> Vec<&LineageRelationship> {
	let mut seen = HashSet::new();

	relationships.iter().filter(|relationship| seen.insert(&relationship.entity)).collect()
}

fn distinct_entity_types(chunk: &[&LineageRelationship]) -> Vec<String> {
	let mut seen = HashSet::new();

	chunk
		.iter()
		.map(|relationship| relationship.entity.entity_type())
		.filter(|entity_type| seen.insert(*entity_type))
		.map(str::to_string)
		.collect()
}

fn relationship_lookup<'a>(
	chunk: &[&'a LineageRelationship],
) -> HashMap<&'a Urn, &'a LineageRelationship> {
	let mut lookup = HashMap::new();

	for &relationship in chunk {
		lookup.entry(&relationship.entity).or_insert(relationship);
	}

	lookup
}

fn annotate_page(
	page: SearchResult,
	lookup: &HashMap<&Urn, &LineageRelationship>,
) -> LineageSearchResult {
	LineageSearchResult {
		entities: annotate_entities(page.entities, lookup),
		num_entities: page.num_entities,
		from: page.from,
		page_size: page.page_size,
		aggregations: page.aggregations,
	}
}

fn annotate_entities(
	entities: Vec<lark_domain::SearchEntity>,
	lookup: &HashMap<&Urn, &LineageRelationship>,
) -> Vec<LineageSearchEntity> {
	entities
		.into_iter()
		.map(|entity| {
			let relationship = lookup.get(&entity.entity);

			LineageSearchEntity {
				degree: relationship.map(|relationship| relationship.degree),
				paths: relationship
					.map(|relationship| relationship.paths.clone())
					.unwrap_or_default(),
				entity: entity.entity,
				score: Some(entity.score),
				fields: entity.fields,
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use lark_domain::ConjunctiveCriterion;

	use super::*;

	fn relationships(specs: &[(&str, &str)]) -> Vec<LineageRelationship> {
		specs
			.iter()
			.map(|(entity_type, key)| LineageRelationship {
				entity: Urn::new(entity_type, key),
				degree: 1,
				paths: Vec::new(),
			})
			.collect()
	}

	#[test]
	fn membership_criterion_is_conjoined_onto_every_disjunct() {
		let input = Filter {
			or: vec![
				ConjunctiveCriterion {
					and: vec![Criterion::new("origin", vec!["PROD".to_string()])],
				},
				ConjunctiveCriterion {
					and: vec![Criterion::new("platform", vec!["hive".to_string()])],
				},
			],
		};
		let batch = relationships(&[("dataset", "one"), ("dataset", "two")]);
		let batch: Vec<&LineageRelationship> = batch.iter().collect();
		let built = build_batch_filter(Some(&input), &batch);

		assert_eq!(built.or.len(), 2);

		for disjunct in &built.or {
			let membership = disjunct.and.last().unwrap();

			assert_eq!(membership.field, URN_FIELD);
			assert_eq!(
				membership.values,
				vec!["urn:meta:dataset:one".to_string(), "urn:meta:dataset:two".to_string()]
			);
		}
	}

	#[test]
	fn degree_only_filter_reduces_to_bare_membership() {
		let input = Filter::from_criterion(Criterion::new(DEGREE_FIELD, vec!["1".to_string()]));
		let batch = relationships(&[("dataset", "one")]);
		let batch: Vec<&LineageRelationship> = batch.iter().collect();
		let built = build_batch_filter(Some(&input), &batch);

		assert_eq!(built.or.len(), 1);
		assert_eq!(built.or[0].and.len(), 1);
		assert_eq!(built.or[0].and[0].field, URN_FIELD);
	}

	#[test]
	fn no_input_filter_yields_bare_membership() {
		let batch = relationships(&[("dataset", "one")]);
		let batch: Vec<&LineageRelationship> = batch.iter().collect();
		let built = build_batch_filter(None, &batch);

		assert_eq!(built, Filter::from_criterion(Criterion::new(
			URN_FIELD,
			vec!["urn:meta:dataset:one".to_string()],
		)));
	}

	#[test]
	fn entity_types_keep_encounter_order_without_duplicates() {
		let batch = relationships(&[("chart", "a"), ("dataset", "b"), ("chart", "c")]);
		let batch: Vec<&LineageRelationship> = batch.iter().collect();

		assert_eq!(
			distinct_entity_types(&batch),
			vec!["chart".to_string(), "dataset".to_string()]
		);
	}
}
