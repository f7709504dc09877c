// ABOUTME: Main library entry point for the pricelens marketplace listing extractor.
// ABOUTME: Re-exports the public API: Aggregator, SourceAdapter, rule sets, canonical model, fetch and sink traits.

//! pricelens - product listing extraction across e-commerce marketplaces.
//!
//! Each marketplace is described by a [`RuleSet`]: where result items sit
//! on its search page and where each field lives inside an item. A
//! [`SourceAdapter`] turns one rule set into a fetch, extract and normalize
//! pipeline; the [`Aggregator`] runs every adapter for a search term and
//! returns one list of [`CanonicalProduct`]s.
//!
//! # Example
//!
//! ```no_run
//! use pricelens_scrape::{Aggregator, ScrapeError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let aggregator = Aggregator::builder().max_results(2).build()?;
//!     for product in aggregator.aggregate("slim fit shirt").await {
//!         println!("{} {:?}", product.platform, product.product_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod aggregate;
pub mod error;
pub mod extractors;
pub mod model;
pub mod normalize;
pub mod options;
pub mod resource;
pub mod sink;

pub use crate::adapter::SourceAdapter;
pub use crate::aggregate::{require_results, Aggregator, SearchReport, SourceOutcome, SourceReport};
pub use crate::error::{ErrorCode, ScrapeError};
pub use crate::extractors::loader::{load_builtin_registry, load_registry_from_path, parse_registry};
pub use crate::extractors::rules::{BrandPolicy, FieldRule, Locator, RuleRegistry, RuleSet};
pub use crate::model::{CanonicalProduct, FeatureKey, Features, Price, RawRecord};
pub use crate::normalize::normalize;
pub use crate::options::{AggregatorBuilder, Options};
pub use crate::resource::{parse_document, Fetcher, HttpFetcher, RawDocument};
pub use crate::sink::{JsonLinesSink, JsonSink, Sink, SinkError};
