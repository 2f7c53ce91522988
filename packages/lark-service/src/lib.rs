pub mod batch;
pub mod cache;
pub mod filter;
pub mod lightning;
pub mod merge;
pub mod normalize;
pub mod scroll;
pub mod search;

use std::{future::Future, pin::Pin, sync::Arc};

use tokio::sync::mpsc;

use lark_config::Config;
use lark_domain::{
	EntityLineageResult, Filter, LineageDirection, ScrollResult, SearchFlags, SearchResult,
	SortCriterion, Urn,
};

pub use cache::{CachedLineageResult, LineageCacheKey};
pub use scroll::{LineageScrollRequest, LineageScrollResult};
pub use search::{LineageSearchEntity, LineageSearchRequest, LineageSearchResult};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Field carrying hop-distance criteria in structured filters. Degree is
/// filtered in memory; the search engine never sees this field.
pub const DEGREE_FIELD: &str = "degree";
/// Field used for the per-batch identifier-membership criterion.
pub const URN_FIELD: &str = "urn";

pub(crate) const WILDCARD_QUERY: &str = "*";

/// Multi-hop traversal over the metadata graph.
pub trait GraphProvider
where
	Self: Send + Sync,
{
	fn get_lineage<'a>(
		&'a self,
		source: &'a Urn,
		direction: LineageDirection,
		offset: u32,
		max_relationships: u32,
		max_hops: u32,
		start_time_millis: Option<i64>,
		end_time_millis: Option<i64>,
	) -> BoxFuture<'a, color_eyre::Result<EntityLineageResult>>;
}

/// The external full-text search engine.
pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search_across_entities<'a>(
		&'a self,
		entity_types: &'a [String],
		query: &'a str,
		filter: &'a Filter,
		sort: Option<&'a SortCriterion>,
		from: u32,
		size: u32,
		flags: &'a SearchFlags,
	) -> BoxFuture<'a, color_eyre::Result<SearchResult>>;

	fn scroll_across_entities<'a>(
		&'a self,
		entity_types: &'a [String],
		query: &'a str,
		filter: &'a Filter,
		sort: Option<&'a SortCriterion>,
		scroll_id: Option<&'a str>,
		keep_alive: &'a str,
		size: u32,
		flags: &'a SearchFlags,
	) -> BoxFuture<'a, color_eyre::Result<ScrollResult>>;
}

/// Key/value backend for cached traversals. Errors from either operation
/// are recoverable: a failed read is a miss, a failed write is dropped.
pub trait LineageCacheStore
where
	Self: Send + Sync,
{
	fn get<'a>(
		&'a self,
		key: &'a LineageCacheKey,
	) -> BoxFuture<'a, color_eyre::Result<Option<CachedLineageResult>>>;

	fn put<'a>(
		&'a self,
		key: &'a LineageCacheKey,
		entry: CachedLineageResult,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

/// Fire-and-forget background task submission. Injected so tests can run
/// refreshes deterministically instead of racing a shared worker.
pub trait RefreshQueue
where
	Self: Send + Sync,
{
	fn submit(&self, task: BoxFuture<'static, ()>);
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidDegreeFilter { value: String },
	Graph { message: String },
	Search { message: String },
}
impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidDegreeFilter { value } => {
				write!(f, "{value} is not a valid degree filter value.")
			},
			Self::Graph { message } => write!(f, "Graph traversal error: {message}"),
			Self::Search { message } => write!(f, "Search error: {message}"),
		}
	}
}
impl std::error::Error for ServiceError {}

/// One worker task draining an unbounded channel: refreshes run one at a
/// time, in submission order.
pub struct SingleWorkerQueue {
	tx: mpsc::UnboundedSender<BoxFuture<'static, ()>>,
}
impl SingleWorkerQueue {
	/// Spawns the worker onto the current tokio runtime.
	pub fn spawn() -> Self {
		let (tx, mut rx) = mpsc::unbounded_channel::<BoxFuture<'static, ()>>();

		tokio::spawn(async move {
			while let Some(task) = rx.recv().await {
				task.await;
			}
		});

		Self { tx }
	}
}
impl RefreshQueue for SingleWorkerQueue {
	fn submit(&self, task: BoxFuture<'static, ()>) {
		if self.tx.send(task).is_err() {
			tracing::warn!("Refresh worker has shut down; dropping refresh task.");
		}
	}
}

pub struct LineageSearchService {
	pub cfg: Config,
	pub graph: Arc<dyn GraphProvider>,
	pub search: Arc<dyn SearchProvider>,
	pub cache: Arc<dyn LineageCacheStore>,
	pub refresh: Arc<dyn RefreshQueue>,
}
impl LineageSearchService {
	/// Must be called from within a tokio runtime; spawns the default
	/// refresh worker.
	pub fn new(
		cfg: Config,
		graph: Arc<dyn GraphProvider>,
		search: Arc<dyn SearchProvider>,
		cache: Arc<dyn LineageCacheStore>,
	) -> Self {
		Self::with_refresh_queue(cfg, graph, search, cache, Arc::new(SingleWorkerQueue::spawn()))
	}

	pub fn with_refresh_queue(
		cfg: Config,
		graph: Arc<dyn GraphProvider>,
		search: Arc<dyn SearchProvider>,
		cache: Arc<dyn LineageCacheStore>,
		refresh: Arc<dyn RefreshQueue>,
	) -> Self {
		Self { cfg, graph, search, cache, refresh }
	}

	pub(crate) fn default_flags(&self) -> SearchFlags {
		SearchFlags { max_agg_values: self.cfg.search.max_agg_values, ..SearchFlags::default() }
	}
}
