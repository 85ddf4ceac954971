//! Reference tables served over HTTP, e.g. from a static `/data/` directory.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use tagdrill_core::source::TableSource;
use tagdrill_core::table::TableKind;

use crate::error::SourceError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches `<base_url>/<table>.csv`.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TableSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self, kind: TableKind) -> anyhow::Result<Option<String>> {
        let url = format!("{}/{}", self.base_url, kind.file_name());
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else if e.is_connect() {
                SourceError::Network(format!("{} not reachable", self.base_url))
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        if status >= 400 {
            return Err(SourceError::Http { status, url }.into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("failed to read body of {url}: {e}")))?;
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_table_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/equipment.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("tag,name\nP101,Pump A\n"))
            .mount(&server)
            .await;

        let source = HttpSource::new(&format!("{}/data/", server.uri()));
        let text = source.fetch(TableKind::Equipment).await.unwrap();
        assert_eq!(text.as_deref(), Some("tag,name\nP101,Pump A\n"));
    }

    #[tokio::test]
    async fn not_found_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/standard.csv"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpSource::new(&server.uri());
        assert!(source.fetch(TableKind::Standard).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/valves.csv"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let source = HttpSource::new(&server.uri());
        let err = source.fetch(TableKind::Valves).await.unwrap_err();
        let source_err = err.downcast_ref::<SourceError>().unwrap();
        assert!(matches!(source_err, SourceError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn loads_reference_data_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/valves.csv"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("tag,name,floor\nXV101,进料阀,3F\n"),
            )
            .mount(&server)
            .await;

        // Unmatched requests get a 404 from the mock server.
        let loaded = tagdrill_core::load_reference_data(&HttpSource::new(&server.uri()))
            .await
            .unwrap();
        assert_eq!(loaded.data.valves.len(), 1);
        assert_eq!(loaded.missing.len(), 3);
    }
}
