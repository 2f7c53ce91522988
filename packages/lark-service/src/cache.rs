use time::{Duration, OffsetDateTime};

use lark_domain::{EntityLineageResult, LineageDirection, Urn};

const CACHE_KEY_SCHEMA_VERSION: i32 = 1;

/// Identity of one traversal: two keys are equal iff every field is equal,
/// with absent time bounds compared as "no bound".
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LineageCacheKey {
	pub source: Urn,
	pub direction: LineageDirection,
	pub start_time_millis: Option<i64>,
	pub end_time_millis: Option<i64>,
	pub max_hops: Option<u32>,
}
impl LineageCacheKey {
	/// Stable fingerprint for keying cache backends.
	pub fn fingerprint(&self) -> color_eyre::Result<String> {
		let payload = serde_json::json!({
			"kind": "lineage",
			"schema_version": CACHE_KEY_SCHEMA_VERSION,
			"source": self.source.as_str(),
			"direction": self.direction,
			"start_time_millis": self.start_time_millis,
			"end_time_millis": self.end_time_millis,
			"max_hops": self.max_hops,
		});
		let raw = serde_json::to_vec(&payload)?;

		Ok(blake3::hash(&raw).to_hex().to_string())
	}
}

/// A cached traversal, replaced whole on refresh and never mutated in
/// place. Staleness is the caller's policy; the store never evicts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CachedLineageResult {
	pub lineage: EntityLineageResult,
	pub fetched_at: OffsetDateTime,
}
impl CachedLineageResult {
	pub fn is_stale(&self, ttl: Duration) -> bool {
		OffsetDateTime::now_utc() - self.fetched_at > ttl
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(direction: LineageDirection, max_hops: Option<u32>) -> LineageCacheKey {
		LineageCacheKey {
			source: Urn::new("dataset", "(urn:meta:dataPlatform:hive,db.orders,PROD)"),
			direction,
			start_time_millis: None,
			end_time_millis: None,
			max_hops,
		}
	}

	#[test]
	fn equal_keys_share_a_fingerprint() {
		let one = key(LineageDirection::Downstream, Some(3)).fingerprint().unwrap();
		let two = key(LineageDirection::Downstream, Some(3)).fingerprint().unwrap();

		assert_eq!(one, two);
	}

	#[test]
	fn fingerprint_covers_every_field() {
		let base = key(LineageDirection::Downstream, Some(3)).fingerprint().unwrap();

		assert_ne!(base, key(LineageDirection::Upstream, Some(3)).fingerprint().unwrap());
		assert_ne!(base, key(LineageDirection::Downstream, None).fingerprint().unwrap());

		let mut windowed = key(LineageDirection::Downstream, Some(3));

		windowed.start_time_millis = Some(1_000);

		assert_ne!(base, windowed.fingerprint().unwrap());
	}

	#[test]
	fn staleness_follows_the_ttl() {
		let fresh = CachedLineageResult {
			lineage: EntityLineageResult::default(),
			fetched_at: OffsetDateTime::now_utc(),
		};
		let stale = CachedLineageResult {
			lineage: EntityLineageResult::default(),
			fetched_at: OffsetDateTime::now_utc() - Duration::seconds(120),
		};

		assert!(!fresh.is_stale(Duration::seconds(60)));
		assert!(stale.is_stale(Duration::seconds(60)));
	}
}
