use std::collections::HashSet;

use lark_domain::{DegreeBucket, Filter, LineageRelationship};

use crate::{DEGREE_FIELD, ServiceError, ServiceResult};

/// Narrows the normalized relationship list to the requested entity types
/// and, when the structured filter carries degree criteria, to matching
/// hop-distance buckets. An empty allow-list keeps every type.
pub fn filter_relationships(
	relationships: Vec<LineageRelationship>,
	entity_types: &[String],
	filter: Option<&Filter>,
) -> ServiceResult<Vec<LineageRelationship>> {
	let allowed: HashSet<&str> = entity_types.iter().map(String::as_str).collect();
	let buckets = degree_buckets(filter)?;
	let kept = relationships
		.into_iter()
		.filter(|relationship| {
			allowed.is_empty() || allowed.contains(relationship.entity.entity_type())
		})
		.filter(|relationship| match &buckets {
			Some(buckets) => buckets.iter().any(|bucket| bucket.matches(relationship.degree)),
			None => true,
		})
		.collect();

	Ok(kept)
}

/// Degree criteria are read from the first disjunct only. An unrecognized
/// label is a caller error, not something to silently drop.
fn degree_buckets(filter: Option<&Filter>) -> ServiceResult<Option<Vec<DegreeBucket>>> {
	let Some(disjunct) = filter.and_then(|filter| filter.or.first()) else {
		return Ok(None);
	};
	let mut buckets = Vec::new();

	for criterion in disjunct.and.iter().filter(|criterion| criterion.field == DEGREE_FIELD) {
		for value in &criterion.values {
			let bucket = DegreeBucket::parse(value)
				.ok_or_else(|| ServiceError::InvalidDegreeFilter { value: value.clone() })?;

			buckets.push(bucket);
		}
	}

	if buckets.is_empty() { Ok(None) } else { Ok(Some(buckets)) }
}

#[cfg(test)]
mod tests {
	use lark_domain::{ConjunctiveCriterion, Criterion, Urn};

	use super::*;

	fn relationships() -> Vec<LineageRelationship> {
		[("dataset", "one", 1), ("dataset", "two", 2), ("chart", "three", 3), ("dashboard", "four", 4)]
			.into_iter()
			.map(|(entity_type, key, degree)| LineageRelationship {
				entity: Urn::new(entity_type, key),
				degree,
				paths: Vec::new(),
			})
			.collect()
	}

	fn degree_filter(values: &[&str]) -> Filter {
		Filter::from_criterion(Criterion::new(
			DEGREE_FIELD,
			values.iter().map(|value| value.to_string()).collect(),
		))
	}

	#[test]
	fn empty_allow_list_keeps_every_type() {
		let kept = filter_relationships(relationships(), &[], None).unwrap();

		assert_eq!(kept.len(), 4);
	}

	#[test]
	fn allow_list_keeps_matching_types_only() {
		let kept =
			filter_relationships(relationships(), &["dataset".to_string()], None).unwrap();

		assert_eq!(kept.len(), 2);
		assert!(kept.iter().all(|relationship| relationship.entity.entity_type() == "dataset"));
	}

	#[test]
	fn degree_buckets_are_ored() {
		let filter = degree_filter(&["1", "3+"]);
		let kept = filter_relationships(relationships(), &[], Some(&filter)).unwrap();
		let degrees: Vec<u32> = kept.iter().map(|relationship| relationship.degree).collect();

		assert_eq!(degrees, vec![1, 3, 4]);
	}

	#[test]
	fn all_three_buckets_equal_no_degree_filtering() {
		let filter = degree_filter(&["1", "2", "3+"]);
		let kept = filter_relationships(relationships(), &[], Some(&filter)).unwrap();

		assert_eq!(kept.len(), relationships().len());
	}

	#[test]
	fn buckets_partition_every_degree() {
		for degree in 1..=10 {
			let matching =
				DegreeBucket::ALL.iter().filter(|bucket| bucket.matches(degree)).count();

			assert_eq!(matching, 1, "degree {degree} must land in exactly one bucket");
		}
	}

	#[test]
	fn unknown_degree_label_fails_the_request() {
		let filter = degree_filter(&["4"]);
		let result = filter_relationships(relationships(), &[], Some(&filter));

		assert!(matches!(
			result,
			Err(ServiceError::InvalidDegreeFilter { value }) if value == "4"
		));
	}

	#[test]
	fn degree_criteria_outside_the_first_disjunct_are_ignored() {
		let filter = Filter {
			or: vec![
				ConjunctiveCriterion {
					and: vec![Criterion::new("origin", vec!["PROD".to_string()])],
				},
				ConjunctiveCriterion {
					and: vec![Criterion::new(DEGREE_FIELD, vec!["1".to_string()])],
				},
			],
		};
		let kept = filter_relationships(relationships(), &[], Some(&filter)).unwrap();

		assert_eq!(kept.len(), 4);
	}
}
