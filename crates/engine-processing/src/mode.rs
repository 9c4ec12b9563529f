//! Best-effort fan-out of ingest mode switches to every live store.

use engine_core::{connectors::directory::StoreDirectory, metrics::Metrics};
use futures::future::join_all;
use model::store::{LivenessThresholds, SwitchMode};
use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Asserts a cluster-wide ingest mode on every store that is live enough.
///
/// Failures never reach the caller: a store that misses one switch is
/// picked up again by the next assertion.
#[derive(Clone)]
pub struct ModeSwitcher {
    directory: Arc<dyn StoreDirectory>,
    thresholds: LivenessThresholds,
    metrics: Metrics,
}

impl ModeSwitcher {
    pub fn new(
        directory: Arc<dyn StoreDirectory>,
        thresholds: LivenessThresholds,
        metrics: Metrics,
    ) -> Self {
        Self {
            directory,
            thresholds,
            metrics,
        }
    }

    /// Switches every store at or above the mode's liveness threshold.
    ///
    /// Membership is fetched fresh on every call. Per-store switches run
    /// concurrently and their failures are only logged.
    pub async fn assert_mode(&self, mode: SwitchMode) {
        let min_state = self.thresholds.for_mode(mode);

        let stores = match self.directory.list_stores(min_state).await {
            Ok(stores) => stores,
            Err(e) => {
                warn!(mode = %mode, min_state = %min_state, error = %e, "Failed to list stores, skipping mode switch");
                return;
            }
        };

        if stores.is_empty() {
            debug!(mode = %mode, min_state = %min_state, "No store qualifies for mode switch");
            return;
        }

        let directory = &self.directory;
        let results = join_all(stores.iter().map(|store| async move {
            let result = directory.switch_mode(&store.address, mode).await;
            (store, result)
        }))
        .await;

        let mut failed = 0u64;
        for (store, result) in results {
            if let Err(e) = result {
                failed += 1;
                warn!(store = %store.address, mode = %mode, error = %e, "Failed to switch store mode");
            }
        }

        self.metrics.increment_switch_requests(stores.len() as u64);
        self.metrics.increment_switch_failures(failed);
        info!(mode = %mode, stores = stores.len(), failed, "Mode switch asserted");
    }

    /// Re-asserts `mode` every `interval` until `cancel` fires.
    ///
    /// The first assertion happens one interval after the call. A tick that
    /// is already running completes; no tick starts once cancellation has
    /// been observed.
    pub async fn run_ticker(&self, interval: Duration, mode: SwitchMode, cancel: CancellationToken) {
        let interval = interval.max(MIN_TICK_INTERVAL);
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(mode = %mode, interval_ms = interval.as_millis() as u64, "Mode ticker started");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.metrics.increment_ticks(1);
                    self.assert_mode(mode).await;
                }
            }
        }
        debug!(mode = %mode, "Mode ticker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::connectors::local::{StaticStoreDirectory, StoreEntry};
    use model::store::StoreState;

    fn three_stores(reject_all: bool) -> Arc<StaticStoreDirectory> {
        let entries = [
            ("s1", StoreState::Normal),
            ("s2", StoreState::Offline),
            ("s3", StoreState::Disconnected),
        ]
        .into_iter()
        .map(|(addr, state)| {
            let entry = StoreEntry::new(addr, state);
            if reject_all { entry.rejecting() } else { entry }
        })
        .collect();
        Arc::new(StaticStoreDirectory::new(entries))
    }

    fn switcher(directory: Arc<StaticStoreDirectory>, metrics: Metrics) -> ModeSwitcher {
        ModeSwitcher::new(directory, LivenessThresholds::default(), metrics)
    }

    #[tokio::test]
    async fn import_mode_skips_disconnected_stores() {
        let directory = three_stores(false);
        let metrics = Metrics::new();
        switcher(directory.clone(), metrics.clone())
            .assert_mode(SwitchMode::Import)
            .await;

        assert_eq!(directory.mode_of("s1").await, Some(SwitchMode::Import));
        assert_eq!(directory.mode_of("s2").await, Some(SwitchMode::Import));
        assert_eq!(directory.mode_of("s3").await, None);
        assert_eq!(metrics.snapshot().mode_switch_requests, 2);
    }

    #[tokio::test]
    async fn normal_mode_reaches_every_connected_store() {
        let directory = three_stores(false);
        let metrics = Metrics::new();
        switcher(directory.clone(), metrics.clone())
            .assert_mode(SwitchMode::Normal)
            .await;

        for addr in ["s1", "s2", "s3"] {
            assert_eq!(directory.mode_of(addr).await, Some(SwitchMode::Normal));
        }
        assert_eq!(metrics.snapshot().mode_switch_requests, 3);
    }

    #[tokio::test]
    async fn failing_switches_are_absorbed() {
        let metrics = Metrics::new();
        switcher(three_stores(true), metrics.clone())
            .assert_mode(SwitchMode::Normal)
            .await;

        let snap = metrics.snapshot();
        assert_eq!(snap.mode_switch_requests, 3);
        assert_eq!(snap.mode_switch_failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_scheduling_after_cancel() {
        let metrics = Metrics::new();
        let switcher = switcher(three_stores(false), metrics.clone());
        let cancel = CancellationToken::new();

        let task = tokio::spawn({
            let switcher = switcher.clone();
            let cancel = cancel.clone();
            async move {
                switcher
                    .run_ticker(Duration::from_secs(10), SwitchMode::Import, cancel)
                    .await
            }
        });

        // nothing fires before the first interval elapses
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(metrics.snapshot().ticks, 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(metrics.snapshot().ticks, 3);

        cancel.cancel();
        task.await.unwrap();

        tokio::time::sleep(Duration::from_secs(100)).await;
        let snap = metrics.snapshot();
        assert_eq!(snap.ticks, 3);
        assert_eq!(snap.mode_switch_requests, 6);
    }
}
