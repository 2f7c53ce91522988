use std::collections::HashMap;

use lark_domain::{EntityLineageResult, LineageRelationship, Urn, urn::SCHEMA_FIELD_ENTITY};

/// Field-level entities are not independently searchable, so their
/// relationships are redirected to the owning entity while keeping the
/// field-level paths as context. Relationships that then share a target
/// are merged: paths unioned, first-seen record (and its degree) kept.
pub fn normalize_relationships(lineage: EntityLineageResult) -> Vec<LineageRelationship> {
	let mut by_target: HashMap<Urn, usize> = HashMap::new();
	let mut merged: Vec<LineageRelationship> = Vec::new();

	for relationship in lineage.relationships.into_iter().map(rewrite_field_level_target) {
		match by_target.get(&relationship.entity) {
			Some(&index) => merged[index].paths.extend(relationship.paths),
			None => {
				by_target.insert(relationship.entity.clone(), merged.len());
				merged.push(relationship);
			},
		}
	}

	merged
}

fn rewrite_field_level_target(mut relationship: LineageRelationship) -> LineageRelationship {
	if relationship.entity.entity_type() != SCHEMA_FIELD_ENTITY {
		return relationship;
	}

	// The owning entity's urn is the first component of the field-level
	// key. A malformed reference never fails the request.
	match relationship.entity.first_key_part().map(Urn::parse) {
		Some(Ok(owner)) => relationship.entity = owner,
		Some(Err(err)) => tracing::error!(
			error = %err,
			entity = %relationship.entity,
			"Invalid field-level owner reference; leaving target unchanged."
		),
		None => {},
	}

	relationship
}
