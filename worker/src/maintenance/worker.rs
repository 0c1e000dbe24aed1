use anyhow::Result;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use crate::usecases::maintenance::MaintenanceUseCase;

pub async fn run(usecase: Arc<MaintenanceUseCase>, interval: Duration) -> Result<()> {
    info!(interval_seconds = interval.as_secs(), "maintenance: starting loop");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(e) = usecase.run_once(Utc::now()).await {
            error!(error = %e, "maintenance: pass failed");
        }
    }
}
