use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

pub const URN_PREFIX: &str = "urn:meta:";
pub const SCHEMA_FIELD_ENTITY: &str = "schemaField";
pub const DATASET_ENTITY: &str = "dataset";
pub const DATA_PLATFORM_PREFIX: &str = "urn:meta:dataPlatform:";

/// Entity types whose first key part names the backing platform.
const PLATFORM_SCOPED_ENTITY_TYPES: [&str; 5] =
	["dataset", "dashboard", "chart", "dataFlow", "dataJob"];

/// Identifier of a metadata entity: `urn:meta:<entityType>:<key>`.
///
/// The key is either a single segment or a parenthesised tuple `(a,b,c)`
/// whose components may themselves be urns, e.g.
/// `urn:meta:dataset:(urn:meta:dataPlatform:hive,db.orders,PROD)`. A
/// field-level entity uses the `schemaField` type and carries its owning
/// entity's urn as the first tuple component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn {
	raw: String,
	entity_type: String,
	key: String,
}

#[derive(Debug, Clone)]
pub struct UrnParseError {
	raw: String,
	message: String,
}
impl Display for UrnParseError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Invalid urn {:?}: {}", self.raw, self.message)
	}
}
impl std::error::Error for UrnParseError {}

impl Urn {
	pub fn parse(raw: &str) -> Result<Self, UrnParseError> {
		let err = |message: &str| UrnParseError { raw: raw.to_string(), message: message.to_string() };
		let rest = raw.strip_prefix(URN_PREFIX).ok_or_else(|| err("missing urn:meta: prefix"))?;
		let (entity_type, key) =
			rest.split_once(':').ok_or_else(|| err("missing entity type separator"))?;

		if entity_type.is_empty() {
			return Err(err("empty entity type"));
		}
		if key.is_empty() {
			return Err(err("empty entity key"));
		}

		Ok(Self {
			raw: raw.to_string(),
			entity_type: entity_type.to_string(),
			key: key.to_string(),
		})
	}

	pub fn new(entity_type: &str, key: &str) -> Self {
		Self {
			raw: format!("{URN_PREFIX}{entity_type}:{key}"),
			entity_type: entity_type.to_string(),
			key: key.to_string(),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	pub fn entity_type(&self) -> &str {
		&self.entity_type
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Tuple components of the key, splitting only at top-level commas so
	/// nested urns stay intact. A non-tuple key is a single component.
	pub fn key_parts(&self) -> Vec<&str> {
		let Some(inner) =
			self.key.strip_prefix('(').and_then(|rest| rest.strip_suffix(')'))
		else {
			return vec![self.key.as_str()];
		};
		let mut parts = Vec::new();
		let mut depth = 0_u32;
		let mut start = 0;

		for (index, ch) in inner.char_indices() {
			match ch {
				'(' => depth += 1,
				')' => depth = depth.saturating_sub(1),
				',' if depth == 0 => {
					parts.push(&inner[start..index]);
					start = index + 1;
				},
				_ => {},
			}
		}

		parts.push(&inner[start..]);
		parts
	}

	pub fn first_key_part(&self) -> Option<&str> {
		self.key_parts().into_iter().next()
	}

	/// Whether this entity type's first key part names a platform.
	pub fn carries_platform(&self) -> bool {
		PLATFORM_SCOPED_ENTITY_TYPES
			.iter()
			.any(|entity_type| entity_type.eq_ignore_ascii_case(&self.entity_type))
	}
}
impl Display for Urn {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}
impl FromStr for Urn {
	type Err = UrnParseError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		Self::parse(raw)
	}
}
impl TryFrom<String> for Urn {
	type Error = UrnParseError;

	fn try_from(raw: String) -> Result<Self, Self::Error> {
		Self::parse(&raw)
	}
}
impl From<Urn> for String {
	fn from(urn: Urn) -> Self {
		urn.raw
	}
}
