// ABOUTME: Source adapter: one marketplace's search pipeline built from a RuleSet value.
// ABOUTME: Builds the search URL, fetches, parses, extracts and normalizes; failures become empty results.

use std::collections::HashMap;

use url::Url;

use crate::error::ScrapeError;
use crate::extractors::rules::{RuleSet, QUERY_PLACEHOLDER};
use crate::extractors::select;
use crate::model::CanonicalProduct;
use crate::normalize::normalize;
use crate::resource::{parse_document, Fetcher, RawDocument, DEFAULT_USER_AGENT};

/// Headers sent with every search request unless overridden.
pub fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
    headers
}

/// Form-encodes a search term for use in a query string.
///
/// Spaces become `+`; reserved characters (`&`, `?`, `=`, `#`, ...) and
/// non-ASCII bytes are percent-escaped.
pub fn encode_search_term(term: &str) -> String {
    url::form_urlencoded::byte_serialize(term.as_bytes()).collect()
}

/// Extraction pipeline for one marketplace.
///
/// Every marketplace uses this same type; only the [`RuleSet`] differs.
#[derive(Debug, Clone)]
pub struct SourceAdapter {
    rules: RuleSet,
    headers: HashMap<String, String>,
}

impl SourceAdapter {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            headers: default_headers(),
        }
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn platform(&self) -> &str {
        &self.rules.platform
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Builds this marketplace's search URL for `term`.
    pub fn search_url(&self, term: &str) -> Result<Url, ScrapeError> {
        let raw = self
            .rules
            .search_url
            .replace(QUERY_PLACEHOLDER, &encode_search_term(term));
        Url::parse(&raw).map_err(|e| {
            ScrapeError::invalid_url(raw.clone(), "SearchUrl", Some(anyhow::anyhow!("{}", e)))
        })
    }

    /// Extracts and normalizes up to `max_results` products from a fetched page.
    pub fn extract_page(
        &self,
        page: &RawDocument,
        max_results: usize,
    ) -> Result<Vec<CanonicalProduct>, ScrapeError> {
        let doc = parse_document(page)?;
        let base = Url::parse(&page.final_url).ok();
        let products = select::extract(&doc, &self.rules, max_results)
            .into_iter()
            .map(|raw| normalize(&self.rules, base.as_ref(), raw))
            .collect();
        Ok(products)
    }

    /// Runs the full pipeline, surfacing fetch and parse failures.
    pub async fn try_extract(
        &self,
        term: &str,
        fetcher: &dyn Fetcher,
        max_results: usize,
    ) -> Result<Vec<CanonicalProduct>, ScrapeError> {
        let url = self.search_url(term)?;
        tracing::debug!(platform = %self.platform(), url = %url, "fetching search page");

        let page = fetcher.fetch(url.as_str(), &self.headers).await?;
        let products = self.extract_page(&page, max_results)?;

        tracing::debug!(
            platform = %self.platform(),
            count = products.len(),
            "extracted products"
        );
        Ok(products)
    }

    /// Runs the full pipeline. Any failure yields an empty result for this
    /// marketplace only.
    pub async fn extract(
        &self,
        term: &str,
        fetcher: &dyn Fetcher,
        max_results: usize,
    ) -> Vec<CanonicalProduct> {
        match self.try_extract(term, fetcher, max_results).await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(platform = %self.platform(), error = %e, "source failed");
                Vec::new()
            }
        }
    }
}
