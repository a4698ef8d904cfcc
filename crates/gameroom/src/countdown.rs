use qf_core::*;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// The room's one timing primitive: a spawned task that delivers a fixed
/// number of tick messages into an intake queue, the first after a
/// distinct initial delay and the rest at the regular interval.
///
/// Cancelling (or dropping) the ticker stops the whole chain; nothing
/// else in the core suspends or blocks.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawns the tick chain. Sends stop early if the receiver is gone.
    pub fn spawn<T, F>(count: u32, sender: UnboundedSender<T>, tick: F) -> Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(COUNTDOWN_FIRST_DELAY).await;
            for i in 0..count {
                if i > 0 {
                    tokio::time::sleep(COUNTDOWN_INTERVAL).await;
                }
                if sender.send(tick()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }
    /// Aborts any ticks not yet delivered.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
