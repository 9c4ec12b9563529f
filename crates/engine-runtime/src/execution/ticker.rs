use engine_processing::mode::ModeSwitcher;
use model::store::SwitchMode;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// Background mode ticker scoped to this handle.
///
/// Dropping the handle, on any path, cancels the ticker. Cancellation only
/// stops further ticks; an assertion already in flight is left to finish on
/// its own.
pub struct ModeTicker {
    cancel: CancellationToken,
    guard: DropGuard,
    task: JoinHandle<()>,
}

impl ModeTicker {
    /// Spawns the ticker under a child of `parent`, so cancelling the parent
    /// scope stops it as well.
    pub fn spawn(
        switcher: ModeSwitcher,
        interval: Duration,
        mode: SwitchMode,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let token = cancel.clone();
        let task = tokio::spawn(async move { switcher.run_ticker(interval, mode, token).await });

        Self {
            guard: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Signals the ticker to stop without waiting for it.
    pub fn stop(self) {
        let ModeTicker { guard, task, .. } = self;
        drop(guard);
        debug!(finished = task.is_finished(), "Mode ticker cancelled");
    }
}
