use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::scans::InsertScanEntity,
    repositories::{
        review_checks::ReviewCheckRepository, scan_cooldowns::ScanCooldownStore,
        scans::ScanRepository,
    },
    value_objects::{review_checks::ReviewCheckSchedule, scans::ScanMetadata},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::scan_resolver::ResolvedScan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded {
        scan_id: Uuid,
        review_check_id: Option<Uuid>,
    },
    Throttled,
}

pub struct ScanRecorder {
    scan_repo: Arc<dyn ScanRepository + Send + Sync>,
    cooldown_store: Arc<dyn ScanCooldownStore + Send + Sync>,
    review_check_repo: Arc<dyn ReviewCheckRepository + Send + Sync>,
    cooldown_window: Duration,
    schedule: ReviewCheckSchedule,
}

impl ScanRecorder {
    pub fn new(
        scan_repo: Arc<dyn ScanRepository + Send + Sync>,
        cooldown_store: Arc<dyn ScanCooldownStore + Send + Sync>,
        review_check_repo: Arc<dyn ReviewCheckRepository + Send + Sync>,
        cooldown_window: Duration,
        schedule: ReviewCheckSchedule,
    ) -> Self {
        Self {
            scan_repo,
            cooldown_store,
            review_check_repo,
            cooldown_window,
            schedule,
        }
    }

    pub async fn record(
        &self,
        resolved: &ResolvedScan,
        metadata: &ScanMetadata,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        let code = resolved.qr_code.code.as_str();
        let cooldown_key = metadata.cooldown_key(code);

        match self
            .cooldown_store
            .claim(&cooldown_key, now, self.cooldown_window)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                info!(%code, "scan: throttled by cooldown");
                return Ok(RecordOutcome::Throttled);
            }
            // A broken cooldown store must not lose scans.
            Err(err) => warn!(%code, error = ?err, "scan: cooldown claim failed, recording anyway"),
        }

        let scan = self
            .scan_repo
            .record_scan(InsertScanEntity {
                qr_code_id: resolved.qr_code.id,
                table_id: resolved.table.id,
                restaurant_id: resolved.restaurant.id,
                ip_address: metadata.ip_address.clone(),
                user_agent: metadata.user_agent.clone(),
                redirected_to: resolved.redirect.url.clone(),
                processed: false,
                resulted_in_review: false,
                created_at: now,
            })
            .await
            .map_err(|err| {
                error!(%code, db_error = ?err, "scan: failed to persist scan");
                err
            })?;

        info!(
            %code,
            scan_id = %scan.id,
            restaurant_id = %scan.restaurant_id,
            "scan: recorded"
        );

        if resolved.restaurant.place_id().is_none() {
            return Ok(RecordOutcome::Recorded {
                scan_id: scan.id,
                review_check_id: None,
            });
        }

        let review_check_id = self
            .review_check_repo
            .enqueue(
                scan.id,
                scan.restaurant_id,
                self.schedule.first_check_at(scan.created_at),
                self.schedule.max_attempts,
            )
            .await
            .map_err(|err| {
                error!(scan_id = %scan.id, db_error = ?err, "scan: failed to register review check");
                err
            })?;

        info!(scan_id = %scan.id, %review_check_id, "scan: review check registered");

        Ok(RecordOutcome::Recorded {
            scan_id: scan.id,
            review_check_id: Some(review_check_id),
        })
    }
}
