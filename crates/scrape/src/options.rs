// ABOUTME: Configuration options for a search run and the fluent AggregatorBuilder.
// ABOUTME: Covers timeouts, result cap, request headers, rule sets and fetcher injection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::adapter::SourceAdapter;
use crate::aggregate::Aggregator;
use crate::error::ScrapeError;
use crate::extractors::loader::load_builtin_registry;
use crate::extractors::rules::RuleRegistry;
use crate::resource::{Fetcher, HttpFetcher, DEFAULT_USER_AGENT};

/// Products taken from each marketplace unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 2;

/// Upper bound on one marketplace's fetch, parse and extraction.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(45);

/// Configuration options for a search run.
#[derive(Clone)]
pub struct Options {
    /// HTTP request timeout for the default fetcher
    pub timeout: Duration,
    /// Per-marketplace timeout enforced by the aggregator
    pub source_timeout: Duration,
    pub user_agent: String,
    pub max_results: usize,
    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
    pub fetcher: Option<Arc<dyn Fetcher>>,
    pub registry: Option<RuleRegistry>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            headers: HashMap::new(),
            http_client: None,
            fetcher: None,
            registry: None,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("timeout", &self.timeout)
            .field("source_timeout", &self.source_timeout)
            .field("user_agent", &self.user_agent)
            .field("max_results", &self.max_results)
            .field("headers", &self.headers)
            .field("http_client", &self.http_client.is_some())
            .field("fetcher", &self.fetcher.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

impl Options {
    /// Headers every adapter sends: the User-Agent plus configured extras.
    pub fn request_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), self.user_agent.clone());
        for (key, value) in &self.headers {
            headers.insert(key.clone(), value.clone());
        }
        headers
    }
}

/// Builder for constructing Aggregator instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct AggregatorBuilder {
    opts: Options,
}

impl AggregatorBuilder {
    /// Create a new AggregatorBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the per-marketplace timeout.
    pub fn source_timeout(mut self, timeout: Duration) -> Self {
        self.opts.source_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the number of products taken from each marketplace.
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.opts.max_results = max_results;
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client for the default fetcher.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Use a custom fetch capability instead of HTTP.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.opts.fetcher = Some(fetcher);
        self
    }

    /// Set the marketplace rule sets, in aggregation order.
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.opts.registry = Some(registry);
        self
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Build the Aggregator with the configured options.
    pub fn build(self) -> Result<Aggregator, ScrapeError> {
        let opts = self.opts;
        let headers = opts.request_headers();

        let fetcher: Arc<dyn Fetcher> = match opts.fetcher {
            Some(fetcher) => fetcher,
            None => {
                let client = match opts.http_client {
                    Some(client) => client,
                    None => reqwest::Client::builder()
                        .timeout(opts.timeout)
                        .cookie_store(true)
                        .gzip(true)
                        .brotli(true)
                        .deflate(true)
                        .build()
                        .map_err(|e| {
                            ScrapeError::config(
                                "http client",
                                "Build",
                                Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                            )
                        })?,
                };
                Arc::new(HttpFetcher::new(client))
            }
        };

        let registry = opts.registry.unwrap_or_else(load_builtin_registry);
        let adapters = registry
            .into_vec()
            .into_iter()
            .map(|rules| SourceAdapter::new(rules).with_headers(headers.clone()))
            .collect();

        Ok(Aggregator::new(adapters, fetcher)
            .with_max_results(opts.max_results)
            .with_source_timeout(opts.source_timeout))
    }
}
