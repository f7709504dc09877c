// ABOUTME: Fetch and parse capabilities: the Fetcher trait, its reqwest implementation and HTML parsing.
// ABOUTME: Handles content-length limits, status checks, charset decoding and parse-failure detection.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use scraper::Html;

use crate::error::ScrapeError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Browser-like identifying User-Agent sent with every search request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A fetched page, decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// URL after redirects
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawDocument {
    /// An HTML document served from `url` without redirects.
    pub fn html(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            final_url: url.into(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }
}

/// Network fetch capability used by source adapters.
///
/// Implementations return `Fetch` or `Timeout` errors; they do not retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<RawDocument, ScrapeError>;
}

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL after redirects
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using the content-type charset when present.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    pub fn into_document(self) -> RawDocument {
        let body = self.text_utf8();
        RawDocument {
            final_url: self.final_url,
            content_type: self.content_type,
            body,
        }
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

fn request_error(url: &str, e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::timeout(url, "Fetch", Some(anyhow::anyhow!("request timed out: {}", e)))
    } else {
        ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
    }
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ScrapeError> {
    let parsed_url = url::Url::parse(url).map_err(|e| {
        ScrapeError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ScrapeError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request.send().await.map_err(|e| request_error(url, e))?;

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ScrapeError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| request_error(url, e))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ScrapeError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    if status != 200 {
        return Err(ScrapeError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    Ok(FetchResult {
        final_url,
        content_type,
        body,
    })
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<RawDocument, ScrapeError> {
        let opts = FetchOptions {
            headers: headers.clone(),
        };
        let result = fetch(&self.client, url, &opts).await?;
        Ok(result.into_document())
    }
}

/// Parses a fetched document into a navigable tree.
///
/// An empty body or a non-HTML content type is a parse failure, which is
/// distinct from a page that parses but contains no results.
pub fn parse_document(doc: &RawDocument) -> Result<Html, ScrapeError> {
    if let Some(ct) = doc.content_type.as_deref() {
        let mime = ct.split(';').next().unwrap_or("").trim();
        if !mime.is_empty() && !mime.contains("html") && !mime.contains("xml") {
            return Err(ScrapeError::parse(
                &doc.final_url,
                "Parse",
                Some(anyhow::anyhow!("unexpected content type {}", mime)),
            ));
        }
    }
    if doc.body.trim().is_empty() {
        return Err(ScrapeError::parse(
            &doc.final_url,
            "Parse",
            Some(anyhow::anyhow!("empty document")),
        ));
    }
    Ok(Html::parse_document(&doc.body))
}
