//! SyncLoop - タイマー駆動の同期ループ
//!
//! # フロー
//! 1. `initial_delay` 待つ
//! 2. 直ちに 1 サイクル実行し、以降 `interval` ごとに実行
//! 3. shutdown が来たら、実行中のサイクルを終えてから抜ける
//!
//! # 並行性
//! - サイクルは 1 つのタスク内で直列に実行される（アップロード中に次の tick が来ても重ならない）
//! - アップロード中に過ぎた tick は `MissedTickBehavior::Skip` で捨てる（溜めない）
//! - 最終 snapshot はタスクが所有するシンクロナイザーのフィールドなのでロック不要

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, info};

use super::status::SyncStats;
use super::synchronizer::SnapshotSynchronizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Schedule {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
        }
    }
}

/// Handle to a running loop.
/// - `stop()` でタイマーを止め、実行中のサイクルを待ってからシンクロナイザーを返す
/// - ハンドルを drop してもループは止まる
pub struct SyncLoop {
    shutdown_tx: watch::Sender<bool>,
    stats_rx: watch::Receiver<SyncStats>,
    join: JoinHandle<SnapshotSynchronizer>,
}

impl SyncLoop {
    /// Spawn the loop on the current tokio runtime.
    pub fn start(synchronizer: SnapshotSynchronizer, schedule: Schedule) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (stats_tx, stats_rx) = watch::channel(synchronizer.stats().clone());

        info!(
            initial_delay_ms = schedule.initial_delay.as_millis() as u64,
            interval_ms = schedule.interval.as_millis() as u64,
            "starting sync loop"
        );
        let join = tokio::spawn(run(synchronizer, schedule, shutdown_rx, stats_tx));

        Self {
            shutdown_tx,
            stats_rx,
            join,
        }
    }

    /// Stats as of the last finished cycle.
    pub fn stats(&self) -> SyncStats {
        self.stats_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStats> {
        self.stats_rx.clone()
    }

    pub fn request_stop(&self) {
        // receiver is gone only if the task already finished
        let _ = self.shutdown_tx.send(true);
    }

    /// Stop the timer, wait for an in-flight cycle, and hand the
    /// synchronizer back.
    pub async fn stop(self) -> Result<SnapshotSynchronizer, JoinError> {
        self.request_stop();
        let synchronizer = self.join.await?;
        info!(cycles = synchronizer.stats().cycles, "sync loop stopped");
        Ok(synchronizer)
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        // sender dropped: treat as shutdown
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn run(
    mut synchronizer: SnapshotSynchronizer,
    schedule: Schedule,
    mut shutdown_rx: watch::Receiver<bool>,
    stats_tx: watch::Sender<SyncStats>,
) -> SnapshotSynchronizer {
    tokio::select! {
        _ = wait_for_shutdown(&mut shutdown_rx) => {
            debug!("stopped before first cycle");
            return synchronizer;
        }
        _ = sleep(schedule.initial_delay) => {}
    }

    // first tick completes immediately
    let mut ticker = interval(schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown_rx) => break,
            _ = ticker.tick() => {}
        }

        // not raced against shutdown: stop() waits for this cycle
        synchronizer.run_cycle().await;
        stats_tx.send_replace(synchronizer.stats().clone());
    }

    synchronizer
}
