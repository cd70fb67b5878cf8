use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};

use crate::application::dtos::search_dto::{RemoteSearchEnvelope, SearchRequest, SearchResultsDto};
use crate::application::ports::outbound::RemoteSearchPort;
use crate::common::config::BackendConfig;
use crate::common::errors::DomainError;

/// Error específico del cliente HTTP de búsqueda
#[derive(Debug, thiserror::Error)]
pub enum HttpSearchError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl From<HttpSearchError> for DomainError {
    fn from(err: HttpSearchError) -> Self {
        match err {
            HttpSearchError::Timeout(msg) => DomainError::timeout("Search", msg),
            HttpSearchError::Status { status, body } => DomainError::remote_error(
                "Search",
                format!("Search backend returned HTTP {}: {}", status, body),
            ),
            HttpSearchError::Transport(e) => {
                DomainError::remote_error("Search", format!("Search backend unreachable: {}", e)).with_source(e)
            }
            HttpSearchError::Decode(msg) => {
                DomainError::remote_error("Search", format!("Invalid search response: {}", msg))
            }
        }
    }
}

/**
 * Cliente del backend de búsqueda.
 *
 * Envía `POST {base_url}/search/{basic|advanced|unified}?page=&size=` con el
 * cuerpo JSON generado por el adaptador y normaliza el sobre de respuesta.
 */
pub struct HttpSearchClient {
    client: Client,
    base_url: String,
}

impl HttpSearchClient {
    pub fn new(config: &BackendConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                DomainError::internal_error("Search", format!("Failed to build HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, request: &SearchRequest) -> String {
        format!("{}/search/{}", self.base_url, request.endpoint())
    }

    async fn send(&self, request: &SearchRequest, page: u32, size: u32) -> Result<SearchResultsDto, HttpSearchError> {
        let url = self.endpoint_url(request);
        debug!("POST {} (page {}, size {})", url, page, size);

        let response = self
            .client
            .post(&url)
            .query(&[("page", page), ("size", size)])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpSearchError::Timeout(url.clone())
                } else {
                    HttpSearchError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpSearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: RemoteSearchEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| HttpSearchError::Decode(e.to_string()))?;

        Ok(envelope.into_results(page, size))
    }
}

#[async_trait]
impl RemoteSearchPort for HttpSearchClient {
    #[instrument(skip(self, request), fields(endpoint = request.endpoint()))]
    async fn search(&self, request: &SearchRequest, page: u32, size: u32) -> Result<SearchResultsDto, DomainError> {
        match self.send(request, page, size).await {
            Ok(results) => {
                debug!("Search backend returned {} items", results.items.len());
                Ok(results)
            }
            Err(e) => {
                error!("Remote search failed: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::request_adapter::adapt;
    use crate::common::errors::ErrorKind;
    use crate::domain::entities::search_configuration::SearchConfiguration;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpSearchClient {
        HttpSearchClient::new(&BackendConfig {
            base_url: format!("{}/api/", server.uri()),
            request_timeout_ms: 2000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_posts_basic_request_to_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search/basic"))
            .and(query_param("page", "1"))
            .and(query_param("size", "10"))
            .and(body_partial_json(json!({ "query": "budget", "lookUpFolderName": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "id": "d1", "name": "Budget 2024", "type": "document" }],
                "page": { "totalElements": 11, "totalPages": 2, "first": false, "last": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = adapt(&SearchConfiguration::new("budget", Default::default()));
        let results = client_for(&server).search(&request, 1, 10).await.unwrap();

        assert_eq!(results.items.len(), 1);
        assert_eq!(results.items[0].name, "Budget 2024");
        assert_eq!(results.page.total_elements, 11);
        assert!(results.page.last);
    }

    #[tokio::test]
    async fn test_backend_error_maps_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search/basic"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let request = adapt(&SearchConfiguration::default());
        let err = client_for(&server).search(&request, 0, 20).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::RemoteError);
        assert!(err.message.contains("500"));
    }

    #[tokio::test]
    async fn test_invalid_body_maps_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let request = adapt(&SearchConfiguration::default());
        let err = client_for(&server).search(&request, 0, 20).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::RemoteError);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "content": [] }))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpSearchClient::new(&BackendConfig {
            base_url: format!("{}/api", server.uri()),
            request_timeout_ms: 50,
        })
        .unwrap();

        let request = adapt(&SearchConfiguration::default());
        let err = client.search(&request, 0, 20).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }
}
