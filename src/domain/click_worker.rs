//! Background worker applying best-effort click metrics.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::UrlRecordPatch;
use crate::domain::repositories::UrlStore;
use crate::error::AppError;

/// Consumes click events until every sender is dropped.
///
/// Each event is a read-increment-write against the store. Concurrent
/// lookups of one key may lose increments; failures are logged and counted,
/// never retried.
pub async fn run_click_worker(mut rx: mpsc::Receiver<ClickEvent>, store: Arc<dyn UrlStore>) {
    while let Some(event) = rx.recv().await {
        if let Err(e) = record_click(store.as_ref(), &event).await {
            metrics::counter!("shortkey_click_updates_failed_total").increment(1);
            warn!(key = %event.key, error = %e, "Could not update click count");
        }
    }

    info!("Click worker stopped");
}

/// Applies a single click to the stored record.
///
/// A record deleted between lookup and processing is skipped silently.
pub async fn record_click(store: &dyn UrlStore, event: &ClickEvent) -> Result<(), AppError> {
    let Some(record) = store.get(&event.key).await? else {
        debug!(key = %event.key, "Click for missing record skipped");
        return Ok(());
    };

    store
        .update(&event.key, UrlRecordPatch::click(&record, event.accessed_at))
        .await
}
