use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::reviews::PlaceReviewSummary;

#[automock]
#[async_trait]
pub trait ReviewsApi {
    async fn fetch_place_reviews(&self, place_id: &str) -> Result<PlaceReviewSummary>;
}
