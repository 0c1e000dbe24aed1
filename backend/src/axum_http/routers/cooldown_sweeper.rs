use chrono::{Duration, Utc};
use crates::{
    domain::repositories::scan_cooldowns::ScanCooldownStore,
    infra::cooldown::memory::InMemoryScanCooldownStore,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub fn spawn(store: Arc<InMemoryScanCooldownStore>, window: Duration) {
    let period = window
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(30))
        .max(std::time::Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match store.sweep(Utc::now() - window).await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "scan: cooldown entries swept"),
                Err(err) => warn!(error = ?err, "scan: cooldown sweep failed"),
            }
        }
    });
}
