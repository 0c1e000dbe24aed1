use anyhow::Result;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use crate::usecases::review_attribution::ReviewAttributionUseCase;

pub async fn run(
    usecase: Arc<ReviewAttributionUseCase>,
    worker_id: String,
    poll_interval: Duration,
) -> Result<()> {
    info!(worker_id = %worker_id, "review_check: starting worker loop");
    loop {
        match usecase.lock_next(&worker_id).await {
            Ok(Some(check)) => {
                info!(
                    check_id = %check.id,
                    scan_id = %check.scan_id,
                    attempts = check.attempts,
                    "review_check: processing check"
                );
                match usecase.process(&check, Utc::now()).await {
                    Ok(outcome) => {
                        info!(check_id = %check.id, ?outcome, "review_check: check processed");
                    }
                    Err(e) => {
                        error!(
                            check_id = %check.id,
                            error = %e,
                            "review_check: failed to process check"
                        );
                        match usecase.defer_after_failure(&check, &e, Utc::now()).await {
                            Ok(outcome) => {
                                info!(check_id = %check.id, ?outcome, "review_check: check deferred");
                            }
                            Err(defer_err) => error!(
                                check_id = %check.id,
                                error = %defer_err,
                                "review_check: failed to put check back to pending"
                            ),
                        }
                    }
                }
            }
            Ok(None) => {
                tokio::time::sleep(poll_interval).await;
            }
            Err(e) => {
                error!(error = %e, "review_check: error locking next check");
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}
