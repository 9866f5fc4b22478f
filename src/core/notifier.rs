//! Presentation side of the cycle: consumers of per-cycle reports

use crate::models::report::CycleReport;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Receives every finished cycle report. Must return promptly.
pub trait Notifier: Send + Sync {
    fn notify(&self, report: &CycleReport);
}

/// Keeps the most recent report for the status API
pub struct LatestReportStore {
    tx: watch::Sender<Option<Arc<CycleReport>>>,
}

impl LatestReportStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn latest(&self) -> Option<Arc<CycleReport>> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<CycleReport>>> {
        self.tx.subscribe()
    }
}

impl Default for LatestReportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for LatestReportStore {
    fn notify(&self, report: &CycleReport) {
        self.tx.send_replace(Some(Arc::new(report.clone())));
    }
}

/// One summary line per cycle
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, report: &CycleReport) {
        info!(
            target: "engine",
            inst_id = %report.snapshot.inst_id,
            last = report.snapshot.price.last,
            change_24h_pct = report.snapshot.price.change_24h_pct,
            signal = %report.signal.direction,
            strength = report.signal.strength,
            outcome = ?report.outcome,
            "cycle finished: {}",
            report.signal.reason
        );
    }
}

/// Fans a report out to several notifiers in order
pub struct FanoutNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, report: &CycleReport) {
        for notifier in &self.notifiers {
            notifier.notify(report);
        }
    }
}
