//! HTTP-backed metrics source.
//!
//! Fetches `GET {endpoint}/metrics/{subject_id}` and decodes the JSON body as
//! a [`MetricsBundle`]. A 404 means the remote service has no data for the
//! subject and yields an empty bundle.

use std::time::Duration;

use async_trait::async_trait;
use nanda_core::error::SourceError;
use nanda_core::traits::MetricsSource;
use nanda_core::types::MetricsBundle;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpMetricsSource {
    client: Client,
    endpoint: Url,
}

impl HttpMetricsSource {
    pub fn new(endpoint: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Self::with_client(client, endpoint)
    }

    /// The endpoint must be an absolute `http` or `https` URL; trailing
    /// slashes are dropped.
    pub fn with_client(client: Client, endpoint: &str) -> Result<Self, SourceError> {
        let trimmed = endpoint.trim_end_matches('/');
        let endpoint = Url::parse(trimmed)
            .map_err(|e| SourceError::InvalidEndpoint(format!("{trimmed}: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.cannot_be_a_base() {
            return Err(SourceError::InvalidEndpoint(trimmed.to_owned()));
        }
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `{endpoint}/metrics/{subject_id}`, with the subject id encoded as a
    /// single path segment.
    fn metrics_url(&self, subject_id: &str) -> Result<Url, SourceError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .push("metrics")
            .push(subject_id);
        Ok(url)
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch(&self, subject_id: &str) -> Result<MetricsBundle, SourceError> {
        let url = self.metrics_url(subject_id)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                debug!(subject = %subject_id, "http_source: no metrics, using empty bundle");
                Ok(MetricsBundle::empty())
            }
            status if status.is_success() => resp
                .json::<MetricsBundle>()
                .await
                .map_err(|e| SourceError::Decode(e.to_string())),
            status => Err(SourceError::Status {
                subject_id: subject_id.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use nanda_core::types::{FeedbackMetrics, VerificationLevel, VerificationMetrics};

    /// Serve a tiny metrics API on an ephemeral port and return its base URL.
    async fn spawn_metrics_api() -> String {
        async fn metrics(Path(id): Path<String>) -> axum::response::Response {
            match id.as_str() {
                "known" => Json(MetricsBundle {
                    verification: Some(VerificationMetrics {
                        level: VerificationLevel::Silver,
                        ..Default::default()
                    }),
                    feedback: Some(FeedbackMetrics {
                        average_rating: Some(4.0),
                        rating_count: Some(12),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .into_response(),
                "broken" => AxumStatus::INTERNAL_SERVER_ERROR.into_response(),
                "garbled" => "not json".into_response(),
                _ => AxumStatus::NOT_FOUND.into_response(),
            }
        }

        let app = Router::new().route("/metrics/:id", get(metrics));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn source(endpoint: &str) -> HttpMetricsSource {
        HttpMetricsSource::with_client(Client::new(), endpoint).unwrap()
    }

    #[test]
    fn subject_id_is_one_path_segment() {
        let src = source("http://example.test");
        assert_eq!(
            src.metrics_url("agent-1.v2_x~").unwrap().as_str(),
            "http://example.test/metrics/agent-1.v2_x~"
        );
        assert_eq!(
            src.metrics_url("a b/c?d#e").unwrap().as_str(),
            "http://example.test/metrics/a%20b%2Fc%3Fd%23e"
        );
    }

    #[test]
    fn endpoint_trailing_slash_trimmed() {
        let src = source("http://example.test//");
        assert_eq!(src.endpoint().as_str(), "http://example.test/");
        assert_eq!(
            src.metrics_url("x").unwrap().as_str(),
            "http://example.test/metrics/x"
        );

        let nested = source("http://example.test/api/v1/");
        assert_eq!(
            nested.metrics_url("x").unwrap().as_str(),
            "http://example.test/api/v1/metrics/x"
        );
    }

    #[test]
    fn invalid_endpoints_rejected() {
        for endpoint in ["not a url", "metrics.local", "mailto:ops@example.test", "ftp://x.test"] {
            assert!(
                matches!(
                    HttpMetricsSource::with_client(Client::new(), endpoint),
                    Err(SourceError::InvalidEndpoint(_))
                ),
                "{endpoint}"
            );
        }
    }

    #[tokio::test]
    async fn fetch_decodes_bundle() {
        let src = HttpMetricsSource::new(&spawn_metrics_api().await).unwrap();
        let bundle = src.fetch("known").await.unwrap();
        assert_eq!(bundle.verification_level(), VerificationLevel::Silver);
        assert_eq!(bundle.rating_count(), 12);
    }

    #[tokio::test]
    async fn not_found_is_empty_bundle() {
        let src = HttpMetricsSource::new(&spawn_metrics_api().await).unwrap();
        assert!(src.fetch("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let src = HttpMetricsSource::new(&spawn_metrics_api().await).unwrap();
        assert_eq!(
            src.fetch("broken").await.unwrap_err(),
            SourceError::Status {
                subject_id: "broken".into(),
                status: 500
            }
        );
    }

    #[tokio::test]
    async fn bad_body_is_decode_error() {
        let src = HttpMetricsSource::new(&spawn_metrics_api().await).unwrap();
        assert!(matches!(
            src.fetch("garbled").await.unwrap_err(),
            SourceError::Decode(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let src = HttpMetricsSource::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(
            src.fetch("x").await.unwrap_err(),
            SourceError::Transport(_)
        ));
    }
}
