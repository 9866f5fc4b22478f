//! Cron-driven cycle scheduler with a single-flight guard

use crate::error::{ConfigError, EngineError};
use crate::metrics::Metrics;
use async_trait::async_trait;
use cron::Schedule;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

/// Work executed once per tick
#[async_trait]
pub trait CycleRunner: Send + Sync + 'static {
    async fn run_cycle(&self) -> Result<(), EngineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    /// A previous cycle is still running
    Skipped,
}

/// Clears the in-flight flag when dropped: on completion, panic or abort
struct InFlightGuard {
    flag: Arc<AtomicBool>,
    metrics: Arc<Metrics>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>, metrics: &Arc<Metrics>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        metrics.cycle_in_flight.set(1);
        Some(Self {
            flag: flag.clone(),
            metrics: metrics.clone(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics.cycle_in_flight.set(0);
        self.flag.store(false, Ordering::Release);
    }
}

struct CycleTask {
    supervisor: JoinHandle<()>,
    cycle: AbortHandle,
}

/// Six-field cron expression (seconds first) firing exactly every `interval_seconds`.
///
/// `None` when cron cannot keep the spacing even: the interval must divide a
/// minute, an hour or a day in whole seconds, minutes or hours.
pub fn interval_to_cron(interval_seconds: u64) -> Option<String> {
    match interval_seconds {
        0 => None,
        s if s < 60 => (60 % s == 0).then(|| format!("*/{s} * * * * *")),
        s if s < 3_600 => {
            let minutes = s / 60;
            (s % 60 == 0 && 60 % minutes == 0).then(|| format!("0 */{minutes} * * * *"))
        }
        s if s < 86_400 => {
            let hours = s / 3_600;
            (s % 3_600 == 0 && 24 % hours == 0).then(|| format!("0 0 */{hours} * * *"))
        }
        86_400 => Some("0 0 0 * * *".to_string()),
        _ => None,
    }
}

/// Fires the runner on a fixed interval without ever overlapping cycles.
///
/// Each tick spawns the cycle on its own task, so a slow cycle never delays
/// the timer; ticks that land while a cycle is running are dropped.
#[derive(Clone)]
pub struct CycleScheduler {
    runner: Arc<dyn CycleRunner>,
    metrics: Arc<Metrics>,
    schedule: Schedule,
    in_flight: Arc<AtomicBool>,
    current: Arc<Mutex<Option<CycleTask>>>,
    handle: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl CycleScheduler {
    pub fn new(
        runner: Arc<dyn CycleRunner>,
        metrics: Arc<Metrics>,
        interval_seconds: u64,
    ) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::Invalid {
            key: "EVAL_INTERVAL_SECONDS".to_string(),
            value: interval_seconds.to_string(),
        };
        let cron_expr = interval_to_cron(interval_seconds).ok_or_else(invalid)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|_| invalid())?;

        info!(
            target: "scheduler",
            interval = interval_seconds,
            cron = %cron_expr,
            "cycle scheduler created"
        );

        Ok(Self {
            runner,
            metrics,
            schedule,
            in_flight: Arc::new(AtomicBool::new(false)),
            current: Arc::new(Mutex::new(None)),
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn is_cycle_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start a cycle unless one is already running
    pub fn trigger(&self) -> TriggerOutcome {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight, &self.metrics) else {
            self.metrics.cycles_skipped_total.inc();
            debug!(target: "scheduler", "previous cycle still running, tick skipped");
            return TriggerOutcome::Skipped;
        };
        self.metrics.cycles_started_total.inc();

        let runner = self.runner.clone();
        let cycle = tokio::spawn(async move {
            let _guard = guard;
            runner.run_cycle().await
        });
        let cycle_abort = cycle.abort_handle();

        let metrics = self.metrics.clone();
        let supervisor = tokio::spawn(async move {
            let timer = metrics.cycle_duration_seconds.start_timer();
            match cycle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    metrics.cycles_failed_total.inc();
                    error!(target: "scheduler", error = %e, "cycle failed");
                }
                Err(join_error) if join_error.is_cancelled() => {
                    warn!(target: "scheduler", "cycle abandoned");
                }
                Err(join_error) => {
                    metrics.cycles_failed_total.inc();
                    error!(target: "scheduler", error = %join_error, "cycle panicked");
                }
            }
            timer.observe_duration();
        });

        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(CycleTask {
                supervisor,
                cycle: cycle_abort,
            });
        }
        TriggerOutcome::Started
    }

    pub async fn start(&self) {
        let mut handle = self.handle.write().await;
        if handle.is_some() {
            return;
        }

        let this = self.clone();
        *handle = Some(tokio::spawn(async move {
            info!(target: "scheduler", "scheduler started");
            loop {
                let next_tick = this.schedule.upcoming(chrono::Utc).next();
                let Some(next_tick) = next_tick else {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    continue;
                };
                let now = chrono::Utc::now();
                if next_tick > now {
                    let wait = (next_tick - now).to_std().unwrap_or_default();
                    tokio::time::sleep(wait).await;
                }
                this.trigger();
            }
        }));
    }

    /// Stop ticking, then give the in-flight cycle `grace` to finish before abandoning it
    pub async fn stop(&self, grace: Duration) {
        if let Some(timer) = self.handle.write().await.take() {
            timer.abort();
        }

        let task = self.current.lock().ok().and_then(|mut slot| slot.take());
        if let Some(CycleTask {
            mut supervisor,
            cycle,
        }) = task
        {
            if tokio::time::timeout(grace, &mut supervisor).await.is_err() {
                warn!(target: "scheduler", "cycle did not finish in time, abandoning it");
                cycle.abort();
                let _ = supervisor.await;
            }
        }
        info!(target: "scheduler", "scheduler stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
