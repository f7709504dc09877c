// ABOUTME: Aggregator that runs every source adapter for one search term and concatenates results.
// ABOUTME: Sources run concurrently under a per-source timeout; output keeps the configured source order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::adapter::SourceAdapter;
use crate::error::{ErrorCode, ScrapeError};
use crate::model::CanonicalProduct;
use crate::options::{AggregatorBuilder, DEFAULT_MAX_RESULTS, DEFAULT_SOURCE_TIMEOUT};
use crate::resource::Fetcher;

/// What happened to one source during a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Ok { count: usize },
    Failed { code: ErrorCode, message: String },
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub platform: String,
    pub outcome: SourceOutcome,
}

/// Products of one search plus how each source fared.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub term: String,
    pub products: Vec<CanonicalProduct>,
    pub sources: Vec<SourceReport>,
}

impl SearchReport {
    /// Number of sources that failed or timed out.
    pub fn failed_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| !matches!(s.outcome, SourceOutcome::Ok { .. }))
            .count()
    }
}

/// Runs a fixed, ordered set of source adapters against one fetcher.
pub struct Aggregator {
    adapters: Vec<SourceAdapter>,
    fetcher: Arc<dyn Fetcher>,
    max_results: usize,
    source_timeout: Duration,
}

impl Aggregator {
    /// Create a new AggregatorBuilder using the builtin rule sets.
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::new()
    }

    pub fn new(adapters: Vec<SourceAdapter>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            adapters,
            fetcher,
            max_results: DEFAULT_MAX_RESULTS,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// Caps the number of products taken from each source.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Bounds how long any single source may take.
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn adapters(&self) -> &[SourceAdapter] {
        &self.adapters
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Searches every source and concatenates the products in source order.
    ///
    /// Never fails; a search with no hits returns an empty vector.
    pub async fn aggregate(&self, term: &str) -> Vec<CanonicalProduct> {
        self.aggregate_with_report(term).await.products
    }

    /// Like [`Aggregator::aggregate`], also reporting each source's outcome.
    ///
    /// Dropping the returned future cancels every in-flight fetch.
    pub async fn aggregate_with_report(&self, term: &str) -> SearchReport {
        tracing::debug!(term, sources = self.adapters.len(), "starting search");

        let runs = self
            .adapters
            .iter()
            .map(|adapter| self.run_source(adapter, term));
        let results = join_all(runs).await;

        let mut products = Vec::new();
        let mut sources = Vec::with_capacity(results.len());
        for (report, mut found) in results {
            products.append(&mut found);
            sources.push(report);
        }

        tracing::info!(term, products = products.len(), "search finished");
        SearchReport {
            term: term.to_string(),
            products,
            sources,
        }
    }

    async fn run_source(
        &self,
        adapter: &SourceAdapter,
        term: &str,
    ) -> (SourceReport, Vec<CanonicalProduct>) {
        let platform = adapter.platform().to_string();
        let run = adapter.try_extract(term, self.fetcher.as_ref(), self.max_results);

        let (outcome, products) = match tokio::time::timeout(self.source_timeout, run).await {
            Ok(Ok(products)) => (
                SourceOutcome::Ok {
                    count: products.len(),
                },
                products,
            ),
            Ok(Err(e)) => {
                tracing::warn!(platform = %platform, error = %e, "source failed");
                (
                    SourceOutcome::Failed {
                        code: e.code,
                        message: e.to_string(),
                    },
                    Vec::new(),
                )
            }
            Err(_) => {
                tracing::warn!(
                    platform = %platform,
                    timeout = ?self.source_timeout,
                    "source timed out"
                );
                (SourceOutcome::TimedOut, Vec::new())
            }
        };

        (SourceReport { platform, outcome }, products)
    }
}

/// Turns an empty search result into a `NoResults` error.
pub fn require_results(
    term: &str,
    products: Vec<CanonicalProduct>,
) -> Result<Vec<CanonicalProduct>, ScrapeError> {
    if products.is_empty() {
        Err(ScrapeError::no_results(term))
    } else {
        Ok(products)
    }
}
