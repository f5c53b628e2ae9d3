//! Remote inventory endpoint source.
//!
//! Each store that exposes its stock over HTTP answers
//! `GET {base_url}/stock?code=<code>&match=<contains|exact>` with the JSON
//! record array described in [`crate::source::record`]. The code always
//! travels as a URL-encoded query parameter.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::model::SourceRow;
use crate::query::StockFilter;
use crate::source::record::rows_from_json;
use crate::source::{SourceAdapter, SourceConnection, SourceError, SourceLocation};

/// Default request timeout for the reqwest client.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Path appended to a source's base URL.
const STOCK_PATH: &str = "/stock";

/// Trait for HTTP GET operations.
///
/// This abstraction allows mock clients in tests.
pub trait HttpClient: Send + Sync {
    /// Perform a GET with URL-encoded query parameters.
    ///
    /// # Returns
    ///
    /// The response body on a 2xx status, an error otherwise.
    fn get<'a>(
        &'a self,
        url: &'a str,
        params: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, Result<Vec<u8>, SourceError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Creates a new ReqwestClient with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SourceError::Connection(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
        params: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, Result<Vec<u8>, SourceError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .query(params)
                .send()
                .await
                .map_err(|e| {
                    if e.is_connect() {
                        SourceError::Connection(format!("Request failed: {}", e))
                    } else {
                        SourceError::Query(format!("Request failed: {}", e))
                    }
                })?;

            if !response.status().is_success() {
                return Err(SourceError::Query(format!(
                    "HTTP {} from {}",
                    response.status(),
                    url
                )));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| SourceError::Query(format!("Failed to read response: {}", e)))
        })
    }
}

/// Adapter for `http:`/`https:` locations.
pub struct HttpAdapter<C: HttpClient> {
    client: Arc<C>,
}

impl<C: HttpClient> HttpAdapter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    fn endpoint(base_url: &str) -> Result<String, SourceError> {
        let url = reqwest::Url::parse(base_url)
            .map_err(|e| SourceError::Connection(format!("invalid base URL {}: {}", base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(SourceError::Connection(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }
        Ok(format!("{}{}", base_url.trim_end_matches('/'), STOCK_PATH))
    }
}

impl<C: HttpClient + 'static> SourceAdapter for HttpAdapter<C> {
    fn name(&self) -> &str {
        "http"
    }

    fn connect<'a>(
        &'a self,
        location: &'a SourceLocation,
    ) -> BoxFuture<'a, Result<Box<dyn SourceConnection>, SourceError>> {
        Box::pin(async move {
            match location {
                SourceLocation::Http { base_url } => {
                    let endpoint = Self::endpoint(base_url)?;
                    Ok(Box::new(HttpConnection {
                        client: Arc::clone(&self.client),
                        endpoint,
                    }) as Box<dyn SourceConnection>)
                }
                other => Err(SourceError::Connection(format!(
                    "http adapter cannot open {} location",
                    other.kind()
                ))),
            }
        })
    }
}

/// A resolved stock endpoint.
pub struct HttpConnection<C: HttpClient> {
    client: Arc<C>,
    endpoint: String,
}

impl<C: HttpClient + 'static> SourceConnection for HttpConnection<C> {
    fn query<'a>(
        &'a mut self,
        filter: &'a StockFilter,
    ) -> BoxFuture<'a, Result<Vec<SourceRow>, SourceError>> {
        Box::pin(async move {
            let params = [("code", filter.code.as_str()), ("match", filter.mode.as_str())];
            let body = self.client.get(&self.endpoint, &params).await?;
            // The remote may ignore `match`, so the filter is applied again here.
            rows_from_json(&body, filter)
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            drop(self);
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::query::MatchMode;
    use std::sync::Mutex;

    /// Mock HTTP client for testing.
    pub struct MockHttpClient {
        pub response: Result<Vec<u8>, SourceError>,
        pub requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl MockHttpClient {
        pub fn new(response: Result<Vec<u8>, SourceError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for MockHttpClient {
        fn get<'a>(
            &'a self,
            url: &'a str,
            params: &'a [(&'a str, &'a str)],
        ) -> BoxFuture<'a, Result<Vec<u8>, SourceError>> {
            let owned = params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.requests.lock().unwrap().push((url.to_string(), owned));
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn http_location() -> SourceLocation {
        SourceLocation::Http {
            base_url: "https://fray.example.com/api".to_string(),
        }
    }

    fn filter(code: &str) -> StockFilter {
        StockFilter {
            code: code.to_string(),
            mode: MatchMode::Contains,
        }
    }

    #[test]
    fn test_endpoint_construction() {
        let endpoint = HttpAdapter::<MockHttpClient>::endpoint("https://fray.example.com/api/");
        assert_eq!(endpoint.unwrap(), "https://fray.example.com/api/stock");
    }

    #[test]
    fn test_endpoint_rejects_invalid_url() {
        let endpoint = HttpAdapter::<MockHttpClient>::endpoint("https://");
        assert!(matches!(endpoint, Err(SourceError::Connection(_))));
    }

    #[tokio::test]
    async fn test_http_query_success() {
        let body = br#"[{"code":"LV227","units":12,"unitsPerCase":5}]"#.to_vec();
        let adapter = HttpAdapter::new(MockHttpClient::new(Ok(body)));

        let mut conn = adapter.connect(&http_location()).await.unwrap();
        let rows = conn.query(&filter("LV227")).await.unwrap();
        conn.close().await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_code, "LV227");
        assert_eq!(rows[0].quantity_cases, 2);
    }

    #[tokio::test]
    async fn test_http_query_sends_code_as_parameter() {
        let adapter = HttpAdapter::new(MockHttpClient::new(Ok(b"[]".to_vec())));
        let code = "X1' OR '1'='1";

        let mut conn = adapter.connect(&http_location()).await.unwrap();
        let rows = conn.query(&filter(code)).await.unwrap();
        assert!(rows.is_empty());

        let requests = adapter.client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://fray.example.com/api/stock");
        assert_eq!(
            requests[0].1,
            vec![
                ("code".to_string(), code.to_string()),
                ("match".to_string(), "contains".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_http_query_reapplies_filter() {
        let body = br#"[{"code":"LV227","units":1},{"code":"ZZ9","units":2}]"#.to_vec();
        let adapter = HttpAdapter::new(MockHttpClient::new(Ok(body)));

        let mut conn = adapter.connect(&http_location()).await.unwrap();
        let rows = conn.query(&filter("LV")).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_code, "LV227");
    }

    #[tokio::test]
    async fn test_http_query_network_error() {
        let adapter = HttpAdapter::new(MockHttpClient::new(Err(SourceError::Connection(
            "Connection refused".to_string(),
        ))));

        let mut conn = adapter.connect(&http_location()).await.unwrap();
        match conn.query(&filter("X1")).await {
            Err(SourceError::Connection(msg)) => assert!(msg.contains("Connection refused")),
            other => panic!("Expected Connection error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_rejects_snapshot_location() {
        let adapter = HttpAdapter::new(MockHttpClient::new(Ok(Vec::new())));
        let loc = SourceLocation::Snapshot {
            path: "/tmp/x.json".into(),
        };
        assert!(adapter.connect(&loc).await.is_err());
    }
}
