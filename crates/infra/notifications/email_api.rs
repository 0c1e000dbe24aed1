use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::domain::{
    entities::{
        restaurants::RestaurantEntity, review_notifications::ReviewNotificationEntity,
        scans::ScanEntity,
    },
    repositories::notifications::NotificationDispatcher,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

pub struct EmailApiDispatcher {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
}

impl EmailApiDispatcher {
    pub fn new(endpoint: Url, api_key: &str, from: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "email api returned non-success status: {}",
            response.status()
        ))
    }

    fn recipient(restaurant: &RestaurantEntity) -> Option<String> {
        restaurant
            .notification_email
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

pub fn review_detected_message(
    from: &str,
    to: &str,
    restaurant: &RestaurantEntity,
    notification: &ReviewNotificationEntity,
) -> EmailMessage {
    let mut lines = vec![format!(
        "A new Google review was detected for {} shortly after a table scan.",
        restaurant.name
    )];

    if let Some(author) = notification.author_name.as_deref() {
        lines.push(format!("Author: {author}"));
    }
    if let Some(rating) = notification.rating {
        lines.push(format!("Rating: {rating}/5"));
    }
    if let Some(review_time) = notification.review_time {
        lines.push(format!(
            "Posted: {}",
            review_time.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    if let Some(text) = notification.review_text.as_deref() {
        lines.push(String::new());
        lines.push(text.to_string());
    }
    lines.push(String::new());
    lines.push("Attribution to a specific table is best effort.".to_string());

    EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: format!("New review for {}", restaurant.name),
        text: lines.join("\n"),
    }
}

pub fn no_review_message(
    from: &str,
    to: &str,
    restaurant: &RestaurantEntity,
    scan: &ScanEntity,
) -> EmailMessage {
    EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: format!("No review after scan at {}", restaurant.name),
        text: format!(
            "A guest scanned a table QR code at {} on {} but no new review appeared during the check window.",
            restaurant.name,
            scan.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    }
}

#[async_trait]
impl NotificationDispatcher for EmailApiDispatcher {
    async fn send_review_detected(
        &self,
        restaurant: &RestaurantEntity,
        notification: &ReviewNotificationEntity,
    ) -> Result<()> {
        let Some(to) = Self::recipient(restaurant) else {
            warn!(
                restaurant_id = %restaurant.id,
                notification_id = %notification.id,
                "email_api: restaurant has no notification e-mail; skipping"
            );
            return Err(anyhow!("restaurant has no notification e-mail"));
        };

        let message = review_detected_message(&self.from, &to, restaurant, notification);
        self.deliver(&message).await?;

        info!(
            restaurant_id = %restaurant.id,
            notification_id = %notification.id,
            "email_api: review notification sent"
        );
        Ok(())
    }

    async fn send_no_review_detected(
        &self,
        restaurant: &RestaurantEntity,
        scan: &ScanEntity,
    ) -> Result<()> {
        let Some(to) = Self::recipient(restaurant) else {
            return Ok(());
        };

        let message = no_review_message(&self.from, &to, restaurant, scan);
        self.deliver(&message).await?;

        info!(
            restaurant_id = %restaurant.id,
            scan_id = %scan.id,
            "email_api: no-review notification sent"
        );
        Ok(())
    }
}

fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("email api request timed out");
    }
    if error.is_connect() {
        return anyhow!("email api connection failed");
    }
    anyhow!("email api request failed")
}
