pub mod lineage;
pub mod query;
pub mod search;
pub mod urn;

pub use lineage::{DegreeBucket, EntityLineageResult, LineageDirection, LineageRelationship};
pub use query::{Criterion, ConjunctiveCriterion, Filter, SearchFlags, SortCriterion, SortOrder};
pub use search::{AggregationMetadata, FilterValue, ScrollResult, SearchEntity, SearchResult};
pub use urn::{Urn, UrnParseError};
