use std::sync::Arc;
use tokio::sync::watch;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::core::orchestrator::{Orchestrator, RefreshReport};

/// Latest refresh report; `None` until the first refresh finishes.
pub type ReportReceiver = watch::Receiver<Option<Arc<RefreshReport>>>;
type ReportSender = Arc<watch::Sender<Option<Arc<RefreshReport>>>>;

/// Starts the periodic refresh on `cron` and kicks off one run right away.
///
/// Reports are published on the returned channel, newest wins.
pub async fn init(orchestrator: Arc<Orchestrator>, cron: &str) -> Result<(JobScheduler, ReportReceiver), anyhow::Error> {
    let sched = JobScheduler::new().await?;
    let (tx, rx) = watch::channel(None);
    let tx: ReportSender = Arc::new(tx);

    let orchestrator_job = orchestrator.clone();
    let tx_job = tx.clone();
    sched.add(
        Job::new_async(cron, move |_uuid, _l| {
            let orchestrator = orchestrator_job.clone();
            let tx = tx_job.clone();
            Box::pin(async move {
                info!("Running scheduled refresh...");
                run_refresh(&orchestrator, &tx).await;
            })
        })?
    ).await?;

    // Also run startup refresh immediately (spawned)
    tokio::spawn(async move {
        info!("Running startup refresh...");
        run_refresh(&orchestrator, &tx).await;
    });

    sched.start().await?;
    info!(cron, "Scheduler started");
    Ok((sched, rx))
}

async fn run_refresh(orchestrator: &Orchestrator, tx: &watch::Sender<Option<Arc<RefreshReport>>>) {
    let report = orchestrator.refresh().await;
    match (&report.crash_index, &report.unavailable) {
        (Some(result), _) => info!(score = result.score, risk = %result.risk, "Refresh complete"),
        (None, Some(reason)) => error!(error = %reason, "Refresh complete without a score"),
        (None, None) => error!("Refresh complete without a score"),
    }
    publish(tx, report);
}

/// Replaces the current report; works with or without live receivers.
pub fn publish(tx: &watch::Sender<Option<Arc<RefreshReport>>>, report: RefreshReport) {
    tx.send_replace(Some(Arc::new(report)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::snapshot::{MacroIndicators, MarketData};
    use chrono::Utc;

    fn empty_report() -> RefreshReport {
        RefreshReport {
            macro_indicators: MacroIndicators::new(),
            market: MarketData::default(),
            crash_index: None,
            unavailable: None,
            readings: Vec::new(),
            failures: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_replaces_latest() {
        let (tx, mut rx) = watch::channel(None);
        assert!(rx.borrow().is_none());

        publish(&tx, empty_report());
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());
    }

    #[test]
    fn test_publish_without_receivers() {
        let (tx, rx) = watch::channel(None);
        drop(rx);
        publish(&tx, empty_report());
        assert!(tx.borrow().is_some());
    }
}
