use crate::urn::Urn;

/// Traversal direction through the lineage graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineageDirection {
	Upstream,
	Downstream,
}

/// One reachable entity, with its hop distance from the source and every
/// path the traversal found to it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineageRelationship {
	pub entity: Urn,
	pub degree: u32,
	pub paths: Vec<Vec<Urn>>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntityLineageResult {
	pub relationships: Vec<LineageRelationship>,
}

/// The three hop-distance buckets a degree filter may request. They
/// partition `degree >= 1`: exactly one bucket matches any degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegreeBucket {
	One,
	Two,
	ThreePlus,
}
impl DegreeBucket {
	pub const ALL: [Self; 3] = [Self::One, Self::Two, Self::ThreePlus];

	/// Any label other than `1`, `2`, or `3+` is a caller error.
	pub fn parse(label: &str) -> Option<Self> {
		match label {
			"1" => Some(Self::One),
			"2" => Some(Self::Two),
			"3+" => Some(Self::ThreePlus),
			_ => None,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::One => "1",
			Self::Two => "2",
			Self::ThreePlus => "3+",
		}
	}

	pub fn matches(self, degree: u32) -> bool {
		match self {
			Self::One => degree == 1,
			Self::Two => degree == 2,
			Self::ThreePlus => degree > 2,
		}
	}
}
