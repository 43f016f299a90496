//! Client for the package index metadata and search endpoints

use crate::error::{PypicError, Result, TransportError};
use crate::parser::SearchPageParser;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{BatchInput, PackageCheck, SearchResult};
use crate::utils::{normalize, search_terms};
use crate::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Client for package existence checks and searches
#[derive(Debug, Clone)]
pub struct PypiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl PypiClient {
    /// Create a new client with default settings
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("Failed to create default client")
    }

    /// Create a new client builder
    pub fn builder() -> PypiClientBuilder {
        PypiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Metadata URL for a package, or for one release of it
    pub fn package_url(&self, name: &str, version: Option<&str>) -> String {
        match version {
            Some(version) => format!("{}/{}/{}/json", self.base_url, name, version),
            None => format!("{}/{}/json", self.base_url, name),
        }
    }

    /// Search page URL; search parameters are sent as query pairs
    pub fn search_url(&self) -> String {
        format!("{}?:", self.base_url)
    }

    /// Check whether a package exists on the index.
    ///
    /// With a version, checks that this release exists. Any status other than
    /// 200 counts as missing; transport failures are returned as errors.
    pub async fn exists(&self, name: &str, version: Option<&str>) -> Result<bool> {
        debug!("Calling exists with name = {}, version = {:?}", name, version);

        let name = normalize(name);
        let version = version.filter(|v| !v.is_empty());
        let url = self.package_url(&name, version);
        debug!("url='{}'", url);

        let response = self.transport.get(&url, &[]).await?;
        let exists = response.is_success();

        if exists {
            info!("Package '{}' exists", name);
        } else {
            info!(
                "Package '{}' not found (status {})",
                name, response.status_code
            );
        }
        Ok(exists)
    }

    /// Search the index for packages matching all keywords
    pub async fn search<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<SearchResult>> {
        let terms = search_terms(keywords);
        info!("Searching the index for '{}'", terms);

        let url = self.search_url();
        let params = [
            ("action", "search"),
            ("terms", terms.as_str()),
            ("submit", "search"),
        ];

        let mut response = self
            .transport
            .get(&url, &params)
            .await
            .map_err(|e| self.search_error(e))?;
        debug!(
            "request for url='{}' returned {} status code",
            response.url, response.status_code
        );
        if !response.is_success() {
            warn!(
                "Search returned status {}, parsing the body anyway",
                response.status_code
            );
        }

        let mut parser = SearchPageParser::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.search_error(e))? {
            parser.feed(&chunk)?;
        }
        parser.close()?;

        let results = parser.into_results();
        info!("Search found {} results for '{}'", results.len(), terms);
        Ok(results)
    }

    /// Check every package of a batch, one request at a time.
    ///
    /// A failed check is recorded on its entry and does not stop the batch.
    pub async fn check_batch(&self, input: &BatchInput) -> Vec<PackageCheck> {
        info!("Checking batch of {} packages", input.entries.len());
        let start_time = Instant::now();

        let mut results = Vec::with_capacity(input.entries.len());
        for entry in &input.entries {
            let outcome = self.exists(&entry.name, entry.version.as_deref()).await;
            let (exists, error) = match outcome {
                Ok(exists) => (exists, None),
                Err(e) => {
                    error!("Failed to check package '{}': {}", entry.name, e);
                    (false, Some(e.to_string()))
                }
            };

            results.push(PackageCheck {
                name: entry.name.clone(),
                normalized_name: entry.normalized_name.clone(),
                version: entry.version.clone(),
                exists,
                error,
            });
        }

        info!("Batch check completed in {:?}", start_time.elapsed());
        results
    }

    fn search_error(&self, err: TransportError) -> PypicError {
        if err.is_connection() {
            error!("There was an error when connecting to the index: {}", err);
            PypicError::SearchUnavailable(format!(
                "Data could not be retrieved from {} ({})",
                self.base_url, err
            ))
        } else {
            PypicError::Transport(err)
        }
    }
}

impl Default for PypiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating a PypiClient with custom configuration
#[derive(Debug, Default)]
pub struct PypiClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl PypiClientBuilder {
    /// Set the base URL of the index
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the user agent string
    pub fn user_agent<S: Into<String>>(mut self, agent: S) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a custom transport; user agent and timeout are then ignored
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the PypiClient
    pub fn build(self) -> Result<PypiClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let timeout = self
                    .timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
                let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
                Arc::new(ReqwestTransport::with_settings(user_agent, timeout)?)
            }
        };

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if base_url.is_empty() {
            return Err(PypicError::validation("Base URL cannot be empty"));
        }

        Ok(PypiClient {
            transport,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct NotFound;

    #[async_trait]
    impl HttpTransport for NotFound {
        async fn get(
            &self,
            url: &str,
            _params: &[(&str, &str)],
        ) -> std::result::Result<HttpResponse, TransportError> {
            Ok(HttpResponse::from_text(404, url, ""))
        }
    }

    fn client(base_url: &str) -> PypiClient {
        PypiClient::builder()
            .base_url(base_url)
            .transport(Arc::new(NotFound))
            .build()
            .unwrap()
    }

    #[test]
    fn test_package_urls() {
        let client = client("http://index.test/");
        assert_eq!(client.base_url(), "http://index.test");
        assert_eq!(
            client.package_url("pypic", None),
            "http://index.test/pypic/json"
        );
        assert_eq!(
            client.package_url("pypic", Some("0.1")),
            "http://index.test/pypic/0.1/json"
        );
        assert_eq!(client.search_url(), "http://index.test?:");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = PypiClient::builder()
            .base_url("/")
            .transport(Arc::new(NotFound))
            .build();
        assert!(matches!(result, Err(PypicError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_exists_false_on_404() {
        let client = client("http://index.test");
        assert!(!client.exists("pypic", None).await.unwrap());
        assert!(!client.exists("pypic", Some("0.1")).await.unwrap());
    }
}
