//! Background persistence of click events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_retry::{
    RetryIf,
    strategy::{ExponentialBackoff, jitter},
};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

const MAX_RETRIES: usize = 3;

fn is_transient(e: &AppError) -> bool {
    matches!(e, AppError::StorageUnavailable { .. })
}

/// Drains the click channel until every sender is dropped.
///
/// Transient storage failures are retried with jittered exponential backoff; anything else,
/// or exhausting the retries, drops the click and bumps `clicks_failed_total`. Visit counters
/// are maintained on the redirect path, so a lost click only affects the detailed log.
pub async fn run_click_worker<R>(mut rx: mpsc::Receiver<ClickEvent>, clicks: Arc<R>)
where
    R: ClickRepository + ?Sized,
{
    while let Some(event) = rx.recv().await {
        let link_id = event.link_id;

        let strategy = ExponentialBackoff::from_millis(50)
            .max_delay(Duration::from_millis(500))
            .map(jitter)
            .take(MAX_RETRIES);

        let result = RetryIf::spawn(
            strategy,
            || {
                let clicks = Arc::clone(&clicks);
                let event = event.clone();
                async move { clicks.record_click(event.into()).await }
            },
            is_transient,
        )
        .await;

        match result {
            Ok(_) => metrics::counter!("clicks_recorded_total").increment(1),
            Err(e) => {
                metrics::counter!("clicks_failed_total").increment(1);
                tracing::warn!(link_id, error = %e, "Failed to persist click");
            }
        }
    }

    tracing::info!("Click worker stopped");
}
