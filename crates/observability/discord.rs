use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::notifier::{AlertEvent, AlertSink};

const CONTENT_LIMIT: usize = 2000;
const TRUNCATED_SUFFIX: &str = "\n(truncated)";

pub(crate) struct DiscordSink {
    webhook_url: Url,
    client: Client,
}

impl DiscordSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(3)).build()?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

pub(crate) fn render(event: &AlertEvent) -> String {
    let mut out = format!(
        "**{}** `{}` `{}` `{}`\n`{}` `{}`",
        event.service_name,
        event.stage,
        event.component,
        event.level.as_str(),
        event.at.to_rfc3339_opts(SecondsFormat::Secs, true),
        event.target,
    );

    if let Some(location) = &event.location {
        out.push_str(&format!(" `{location}`"));
    }
    if let Some(message) = event.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        out.push_str(&format!("\n> {message}"));
    }
    for (key, value) in &event.fields {
        out.push_str(&format!("\n- `{key}` = `{value}`"));
    }
    for span in &event.spans {
        out.push_str(&format!("\nin `{}`", span.name));
        for (key, value) in &span.fields {
            out.push_str(&format!("\n  - `{key}` = `{value}`"));
        }
    }

    truncate(out)
}

fn truncate(content: String) -> String {
    if content.chars().count() <= CONTENT_LIMIT {
        return content;
    }
    let keep = CONTENT_LIMIT - TRUNCATED_SUFFIX.chars().count();
    let mut cut: String = content.chars().take(keep).collect();
    cut.push_str(TRUNCATED_SUFFIX);
    cut
}

#[async_trait]
impl AlertSink for DiscordSink {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "content": render(event) }))
            .send()
            .await
            .map_err(|err| {
                // reqwest errors echo the URL, which carries the webhook token.
                if err.is_timeout() {
                    anyhow!("discord webhook timed out")
                } else {
                    anyhow!("discord webhook request failed")
                }
            })?;

        if !response.status().is_success() {
            return Err(anyhow!("discord webhook answered {}", response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use httpmock::{Method::POST, MockServer};
    use std::collections::BTreeMap;
    use tracing::Level;

    fn event(message: &str) -> AlertEvent {
        let mut fields = BTreeMap::new();
        fields.insert("scan_id".to_string(), "42".to_string());
        AlertEvent {
            level: Level::ERROR,
            at: Utc::now(),
            service_name: "tablereview".to_string(),
            stage: "prod".to_string(),
            component: "worker".to_string(),
            target: "worker::review_checking".to_string(),
            location: Some("worker.rs:10".to_string()),
            message: Some(message.to_string()),
            fields,
            spans: Vec::new(),
        }
    }

    #[test]
    fn render_includes_context_and_fields() {
        let content = render(&event("review_attribution: places lookup failed"));

        assert!(content.starts_with("**tablereview** `prod` `worker` `ERROR`"));
        assert!(content.contains("> review_attribution: places lookup failed"));
        assert!(content.contains("- `scan_id` = `42`"));
    }

    #[test]
    fn render_truncates_long_content() {
        let content = render(&event(&"x".repeat(5000)));

        assert_eq!(content.chars().count(), CONTENT_LIMIT);
        assert!(content.ends_with(TRUNCATED_SUFFIX));
    }

    #[tokio::test]
    async fn deliver_posts_content_to_webhook() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/webhooks/1/abc");
                then.status(204);
            })
            .await;

        let sink = DiscordSink::new(Url::parse(&server.url("/api/webhooks/1/abc")).unwrap()).unwrap();
        sink.deliver(&event("boom")).await.unwrap();

        mock.assert_async().await;
    }
}
