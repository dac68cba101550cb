//! Probe scheduling.
//!
//! A single long-lived task drives collection cycles: snapshot the host
//! registry, collect one sample per host, persist it, then sleep the cycle
//! interval. The interval is measured from the end of one cycle to the
//! start of the next, so cycle duration grows with host count without
//! cycles piling up.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::collector::SampleCollector;
use crate::storage::{HostStore, ResultStore};

/// Default pause between cycles (5 minutes).
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(300);

/// Cycle driver over the registered host set.
pub struct Scheduler {
    hosts: HostStore,
    results: ResultStore,
    collector: SampleCollector,
    cycle_interval: Duration,
}

impl Scheduler {
    /// Create a new scheduler.
    pub fn new(
        hosts: HostStore,
        results: ResultStore,
        collector: SampleCollector,
        cycle_interval: Duration,
    ) -> Self {
        Self {
            hosts,
            results,
            collector,
            cycle_interval,
        }
    }

    /// Spawn the scheduler as a background task.
    ///
    /// The task runs until [`SchedulerHandle::shutdown`] is called. Shutdown
    /// is observed between hosts and during the inter-cycle sleep; a probe
    /// batch already in flight for one host runs to completion.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));

        SchedulerHandle { shutdown_tx, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval = ?self.cycle_interval, "Scheduler started");

        loop {
            self.run_cycle(&shutdown).await;

            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = sleep(self.cycle_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!("Scheduler stopped");
    }

    /// Run one full pass over the host set as it stood at cycle start.
    ///
    /// Hosts added or removed mid-cycle do not affect the in-flight cycle.
    /// Every host's outcome is independent: a storage write failure is
    /// logged and that cycle's record for the host is simply absent.
    async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) {
        let snapshot = match self.hosts.list().await {
            Ok(hosts) => hosts,
            Err(e) => {
                tracing::error!(error = %e, "Host snapshot failed, skipping cycle");
                return;
            }
        };

        tracing::debug!(hosts = snapshot.len(), "Cycle starting");

        for host in &snapshot {
            if *shutdown.borrow() {
                return;
            }

            let sample = self.collector.collect(&host.address).await;
            if let Err(e) = self.results.append(host.id, &sample).await {
                tracing::warn!(host = %host.address, error = %e, "Result write failed");
            }
        }

        tracing::debug!(hosts = snapshot.len(), "Cycle complete");
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("cycle_interval", &self.cycle_interval)
            .finish_non_exhaustive()
    }
}

/// Handle to a spawned scheduler task.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Scheduler task join failed");
        }
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle").finish_non_exhaustive()
    }
}
