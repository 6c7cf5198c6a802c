use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Interval between fallback snapshot polls once a session is degraded.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Marker sent to the controller each time a fallback poll is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTick;

/// Fixed-interval tick source driving degraded-mode snapshot polling.
///
/// Ticks arrive on the receiver handed out by [`FallbackPoller::new`]; the
/// first tick of every schedule fires immediately. Starting a poller that is
/// already running replaces its schedule rather than stacking a second
/// timer, and stopping an idle poller is a no-op.
#[derive(Debug)]
pub struct FallbackPoller {
    interval: Duration,
    ticks: mpsc::Sender<PollTick>,
    task: Option<JoinHandle<()>>,
}

impl FallbackPoller {
    /// Create an idle poller plus the receiver its ticks are delivered on.
    pub fn new(interval: Duration) -> (Self, mpsc::Receiver<PollTick>) {
        let (ticks, tick_rx) = mpsc::channel(1);
        let poller = FallbackPoller {
            interval,
            ticks,
            task: None,
        };
        (poller, tick_rx)
    }

    /// Begin or restart the schedule. The first tick fires immediately.
    pub fn start(&mut self) {
        self.stop();
        let ticks = self.ticks.clone();
        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                if ticks.send(PollTick).await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Whether a schedule is currently active.
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Cancel the schedule. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for FallbackPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
