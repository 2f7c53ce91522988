/// A single field criterion: the field matches any of the listed values.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Criterion {
	pub field: String,
	pub values: Vec<String>,
}
impl Criterion {
	pub fn new(field: &str, values: Vec<String>) -> Self {
		Self { field: field.to_string(), values }
	}
}

/// Criteria ANDed together within one disjunct.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConjunctiveCriterion {
	pub and: Vec<Criterion>,
}

/// OR-of-AND structured filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Filter {
	pub or: Vec<ConjunctiveCriterion>,
}
impl Filter {
	pub fn from_criterion(criterion: Criterion) -> Self {
		Self { or: vec![ConjunctiveCriterion { and: vec![criterion] }] }
	}

	/// Strips every criterion on `field` from every disjunct, dropping
	/// disjuncts that end up empty.
	pub fn without_field(&self, field: &str) -> Self {
		let or = self
			.or
			.iter()
			.map(|disjunct| ConjunctiveCriterion {
				and: disjunct
					.and
					.iter()
					.filter(|criterion| criterion.field != field)
					.cloned()
					.collect(),
			})
			.filter(|disjunct| !disjunct.and.is_empty())
			.collect();

		Self { or }
	}

	/// ANDs `criterion` onto every disjunct; an empty filter becomes a
	/// single-disjunct filter of just the criterion.
	pub fn conjoin(&self, criterion: Criterion) -> Self {
		if self.or.is_empty() {
			return Self::from_criterion(criterion);
		}

		let or = self
			.or
			.iter()
			.map(|disjunct| {
				let mut and = disjunct.and.clone();

				and.push(criterion.clone());

				ConjunctiveCriterion { and }
			})
			.collect();

		Self { or }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
	Ascending,
	Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SortCriterion {
	pub field: String,
	pub order: SortOrder,
}

/// Feature toggles forwarded to the search engine.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchFlags {
	pub fulltext: bool,
	pub max_agg_values: u32,
	pub skip_cache: bool,
	pub skip_aggregates: bool,
	pub skip_highlighting: bool,
}
impl Default for SearchFlags {
	fn default() -> Self {
		Self {
			fulltext: false,
			max_agg_values: 20,
			skip_cache: false,
			skip_aggregates: false,
			skip_highlighting: true,
		}
	}
}
