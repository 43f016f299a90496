use async_trait::async_trait;
use pypic::client::PypiClient;
use pypic::error::{PypicError, TransportError};
use pypic::transport::{HttpResponse, HttpTransport};
use pypic::types::{BatchEntry, BatchInput, SearchResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PAGE: &str = r#"<html>
<head><title>Index of Packages Matching 'requests'</title></head>
<body>
<table class="list">
<tr class="odd">
<td><a href="/pypi/curl_to_requests/0.0.1">curl_to_requests&nbsp;0.0.1</a></td>
<td>9</td>
<td>Convert curl commands to python requests</td></tr>
<tr class="even">
<td><a href="/pypi/drequests/0.1">drequests&nbsp;0.1</a></td>
<td>9</td>
<td>Simple HTTP requests   for Django</td></tr>
</table>
</body>
</html>"#;

/// Records every request and answers with a fixed status and body chunks
#[derive(Debug)]
struct CannedTransport {
    status: u16,
    chunks: Vec<String>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl CannedTransport {
    fn new(status: u16, chunks: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            status,
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push((
            url.to_string(),
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        Ok(HttpResponse::from_chunks(
            self.status,
            url,
            self.chunks.iter().map(|c| c.as_bytes().to_vec()),
        ))
    }
}

/// Fails every request with a connection error
#[derive(Debug)]
struct Unreachable;

#[async_trait]
impl HttpTransport for Unreachable {
    async fn get(
        &self,
        url: &str,
        _params: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connection(format!("{}: connection refused", url)))
    }
}

fn client_with(transport: Arc<dyn HttpTransport>) -> PypiClient {
    PypiClient::builder()
        .base_url("http://index.test")
        .transport(transport)
        .build()
        .expect("Failed to build client")
}

fn expected_results() -> Vec<SearchResult> {
    vec![
        SearchResult {
            name: Some("curl_to_requests".to_string()),
            version: Some("0.0.1".to_string()),
            weight: Some(9),
            desc: Some("Convert curl commands to python requests".to_string()),
        },
        SearchResult {
            name: Some("drequests".to_string()),
            version: Some("0.1".to_string()),
            weight: Some(9),
            desc: Some("Simple HTTP requests for Django".to_string()),
        },
    ]
}

/// Test creating a client with builder
#[test]
fn test_create_client_with_builder() {
    let client = PypiClient::builder()
        .base_url("https://testpypi.python.org/pypi/")
        .user_agent("test-agent/1.0.0")
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build client");

    assert_eq!(client.base_url(), "https://testpypi.python.org/pypi");
}

/// Test that the existence check hits the metadata URL of the normalized name
#[tokio::test]
async fn test_exists_true_on_200() {
    let transport = CannedTransport::new(200, &["{}"]);
    let client = client_with(transport.clone());

    assert!(client.exists("Zope.Interface", None).await.unwrap());

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "http://index.test/zope-interface/json");
    assert!(requests[0].1.is_empty());
}

/// Test that a versioned check includes the version in the URL
#[tokio::test]
async fn test_exists_with_version() {
    let transport = CannedTransport::new(200, &["{}"]);
    let client = client_with(transport.clone());

    assert!(client.exists("pypic", Some("0.1.0")).await.unwrap());
    assert_eq!(
        transport.requests()[0].0,
        "http://index.test/pypic/0.1.0/json"
    );
}

/// Test that an empty version is treated as no version
#[tokio::test]
async fn test_exists_with_empty_version() {
    let transport = CannedTransport::new(200, &["{}"]);
    let client = client_with(transport.clone());

    assert!(client.exists("pypic", Some("")).await.unwrap());
    assert_eq!(transport.requests()[0].0, "http://index.test/pypic/json");
}

/// Test that any non-200 status means missing
#[tokio::test]
async fn test_exists_false_on_other_statuses() {
    for status in [301, 404, 500] {
        let client = client_with(CannedTransport::new(status, &[""]));
        assert!(!client.exists("pypic", None).await.unwrap());
    }
}

/// Test that transport failures propagate from the existence check
#[tokio::test]
async fn test_exists_propagates_transport_errors() {
    let client = client_with(Arc::new(Unreachable));

    let err = client.exists("pypic", None).await.unwrap_err();
    assert!(matches!(err, PypicError::Transport(TransportError::Connection(_))));
}

/// Test that search sends the expected query and parses the page
#[tokio::test]
async fn test_search_parses_results() {
    let transport = CannedTransport::new(200, &[SEARCH_PAGE]);
    let client = client_with(transport.clone());

    let results = client.search(&["requests"]).await.unwrap();
    assert_eq!(results, expected_results());

    let requests = transport.requests();
    assert_eq!(requests[0].0, "http://index.test?:");
    assert_eq!(
        requests[0].1,
        vec![
            ("action".to_string(), "search".to_string()),
            ("terms".to_string(), "requests".to_string()),
            ("submit".to_string(), "search".to_string()),
        ]
    );
}

/// Test that several keywords are joined with '+'
#[tokio::test]
async fn test_search_joins_keywords() {
    let transport = CannedTransport::new(200, &["<html></html>"]);
    let client = client_with(transport.clone());

    client.search(&["http", "client"]).await.unwrap();
    assert_eq!(transport.requests()[0].1[1].1, "http+client");
}

/// Test that results do not depend on how the body is chunked
#[tokio::test]
async fn test_search_with_small_chunks() {
    let chunks: Vec<String> = SEARCH_PAGE
        .as_bytes()
        .chunks(7)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    let chunk_refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
    let client = client_with(CannedTransport::new(200, &chunk_refs));

    let results = client.search(&["requests"]).await.unwrap();
    assert_eq!(results, expected_results());
}

/// Test that a page without a results table gives no results
#[tokio::test]
async fn test_search_without_table_is_empty() {
    let client = client_with(CannedTransport::new(
        200,
        &["<html><body><p>There were no matches.</p></body></html>"],
    ));

    assert!(client.search(&["nothing"]).await.unwrap().is_empty());
}

/// Test that a non-200 search page is still parsed
#[tokio::test]
async fn test_search_parses_non_200_body() {
    let client = client_with(CannedTransport::new(500, &[SEARCH_PAGE]));

    assert_eq!(client.search(&["requests"]).await.unwrap().len(), 2);
}

/// Test that a broken link label surfaces as a markup error
#[tokio::test]
async fn test_search_malformed_name_field() {
    let page = "<table><tr><td><a href='/x'>no-separator</a></td></tr></table>";
    let client = client_with(CannedTransport::new(200, &[page]));

    let err = client.search(&["x"]).await.unwrap_err();
    assert!(matches!(err, PypicError::Markup(_)));
}

/// Test that a connection failure becomes SearchUnavailable
#[tokio::test]
async fn test_search_connection_failure() {
    let client = client_with(Arc::new(Unreachable));

    let err = client.search(&["requests"]).await.unwrap_err();
    assert!(matches!(err, PypicError::SearchUnavailable(_)));
    assert!(err.to_string().contains("http://index.test"));
}

/// Test batch checks record per-package outcomes
#[tokio::test]
async fn test_check_batch() {
    let client = client_with(CannedTransport::new(200, &["{}"]));
    let input = BatchInput {
        entries: vec![
            BatchEntry {
                name: "Flask".to_string(),
                normalized_name: "flask".to_string(),
                version: None,
            },
            BatchEntry {
                name: "pypic".to_string(),
                normalized_name: "pypic".to_string(),
                version: Some("0.1.0".to_string()),
            },
        ],
    };

    let results = client.check_batch(&input).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.exists && r.error.is_none()));
    assert_eq!(results[1].version.as_deref(), Some("0.1.0"));
}

/// Test batch checks keep going after failures
#[tokio::test]
async fn test_check_batch_records_errors() {
    let client = client_with(Arc::new(Unreachable));
    let input = pypic::utils::parse_batch_input(r#"["requests", "flask"]"#).unwrap();

    let results = client.check_batch(&input).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| !r.exists && r.error.is_some()));
}

/// Test the real transport against a local server: existence checks
#[tokio::test]
async fn test_exists_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pypic/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pypic/0.1.0/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = PypiClient::builder()
        .base_url(server.uri())
        .build()
        .expect("Failed to build client");

    assert!(client.exists("PyPIC", None).await.unwrap());
    assert!(client.exists("pypic", Some("0.1.0")).await.unwrap());
    assert!(!client.exists("pypic", Some("9.9.9")).await.unwrap());
    assert!(!client.exists("missing-package", None).await.unwrap());
}

/// Test the real transport against a local server: search
#[tokio::test]
async fn test_search_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "search"))
        .and(query_param("terms", "requests+django"))
        .and(query_param("submit", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .mount(&server)
        .await;

    let client = PypiClient::builder()
        .base_url(server.uri())
        .build()
        .expect("Failed to build client");

    let results = client.search(&["requests", "django"]).await.unwrap();
    assert_eq!(results, expected_results());
}

/// Test that an unreachable index makes search unavailable
#[tokio::test]
async fn test_search_unreachable_index() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = PypiClient::builder()
        .base_url(format!("http://127.0.0.1:{}", port))
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build client");

    let err = client.search(&["requests"]).await.unwrap_err();
    assert!(matches!(err, PypicError::SearchUnavailable(_)));
}
