use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::domain::{
    repositories::reviews_api::ReviewsApi,
    value_objects::reviews::{PlaceReview, PlaceReviewSummary},
};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const DETAILS_PATH: &str = "/maps/api/place/details/json";

#[derive(Debug, Error)]
pub enum GooglePlacesError {
    #[error("places request failed: {0}")]
    Http(reqwest::Error),
    #[error("places api returned http {status}: {body}")]
    Api { status: u16, body: String },
    #[error("places api status {status}: {message}")]
    Status { status: String, message: String },
    #[error("places api response has no result")]
    MissingResult,
}

impl GooglePlacesError {
    // The request URL carries the api key.
    fn http(err: reqwest::Error) -> Self {
        GooglePlacesError::Http(err.without_url())
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    user_ratings_total: Option<i32>,
    #[serde(default)]
    reviews: Vec<ReviewPayload>,
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    rating: Option<i32>,
    /// Unix seconds.
    #[serde(default)]
    time: Option<i64>,
}

impl From<ReviewPayload> for PlaceReview {
    fn from(value: ReviewPayload) -> Self {
        Self {
            author_name: value.author_name.filter(|v| !v.trim().is_empty()),
            text: value.text.filter(|v| !v.trim().is_empty()),
            rating: value.rating,
            published_at: value
                .time
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        }
    }
}

pub struct GooglePlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn fetch(&self, place_id: &str) -> Result<PlaceReviewSummary, GooglePlacesError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, DETAILS_PATH))
            .query(&[
                ("place_id", place_id),
                ("fields", "user_ratings_total,reviews"),
                ("reviews_sort", "newest"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(GooglePlacesError::http)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GooglePlacesError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let details = resp
            .json::<DetailsResponse>()
            .await
            .map_err(GooglePlacesError::http)?;
        if details.status != "OK" {
            return Err(GooglePlacesError::Status {
                status: details.status,
                message: details.error_message.unwrap_or_default(),
            });
        }

        let result = details.result.ok_or(GooglePlacesError::MissingResult)?;
        let newest_review = result.reviews.into_iter().next().map(PlaceReview::from);

        Ok(PlaceReviewSummary {
            total_reviews: result.user_ratings_total.unwrap_or(0),
            newest_review,
        })
    }
}

#[async_trait]
impl ReviewsApi for GooglePlacesClient {
    async fn fetch_place_reviews(&self, place_id: &str) -> Result<PlaceReviewSummary> {
        self.fetch(place_id).await.map_err(|err| {
            warn!(place_id, error = %err, "google_places: details lookup failed");
            err.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn client(server: &MockServer) -> GooglePlacesClient {
        GooglePlacesClient::new(&server.base_url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn parses_count_and_newest_review() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(DETAILS_PATH)
                    .query_param("place_id", "ChIJ123")
                    .query_param("reviews_sort", "newest")
                    .query_param("key", "test-key");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "result": {
                        "user_ratings_total": 43,
                        "reviews": [
                            { "author_name": "Dana", "text": "Great pho", "rating": 5, "time": 1_700_000_000 },
                            { "author_name": "Eli", "text": "ok", "rating": 3, "time": 1_600_000_000 }
                        ]
                    }
                }));
            })
            .await;

        let summary = client(&server).fetch_place_reviews("ChIJ123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(summary.total_reviews, 43);
        let newest = summary.newest_review.unwrap();
        assert_eq!(newest.author_name.as_deref(), Some("Dana"));
        assert_eq!(newest.rating, Some(5));
        assert_eq!(
            newest.published_at,
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
        );
    }

    #[tokio::test]
    async fn place_without_reviews_reports_zero() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(DETAILS_PATH);
                then.status(200)
                    .json_body(json!({ "status": "OK", "result": {} }));
            })
            .await;

        let summary = client(&server).fetch_place_reviews("ChIJ123").await.unwrap();

        assert_eq!(summary.total_reviews, 0);
        assert!(summary.newest_review.is_none());
    }

    #[tokio::test]
    async fn non_ok_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(DETAILS_PATH);
                then.status(200).json_body(json!({
                    "status": "REQUEST_DENIED",
                    "error_message": "The provided API key is invalid."
                }));
            })
            .await;

        let err = client(&server)
            .fetch_place_reviews("ChIJ123")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_the_api_key() {
        let client = GooglePlacesClient::new(
            "http://127.0.0.1:1",
            "SECRET-KEY-123",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.fetch_place_reviews("ChIJ1").await.unwrap_err();

        let rendered = format!("{err:#} {err:?}");
        assert!(!rendered.contains("SECRET-KEY-123"), "{rendered}");
        assert!(!rendered.contains("place_id=ChIJ1"), "{rendered}");
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(DETAILS_PATH);
                then.status(503).body("unavailable");
            })
            .await;

        let result = client(&server).fetch_place_reviews("ChIJ123").await;

        assert!(result.is_err());
    }
}
