//! Cosmetic "next check in N s" countdown.
//!
//! [`Countdown`] is plain state; [`Ticker`] is the recurring one-second
//! timer that drives it. The ticker only posts a message on a channel, so
//! the countdown stays owned by whichever loop owns the rest of the view
//! state.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const COUNTDOWN_START: u32 = 60;
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownState {
    pub value: u32,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    value: u32,
    running: bool,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            value: COUNTDOWN_START,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Back to the full interval. Called on every status update.
    pub fn reset(&mut self) {
        self.value = COUNTDOWN_START;
    }

    /// One second elapsed. Wraps to the full interval instead of reaching 0.
    pub fn tick(&mut self) -> u32 {
        if self.running {
            self.value = match self.value {
                0 | 1 => COUNTDOWN_START,
                v => v - 1,
            };
        }
        self.value
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn state(&self) -> CountdownState {
        CountdownState {
            value: self.value,
            running: self.running,
        }
    }
}

// ── Ticker ───────────────────────────────────────────────────────────

/// Restartable recurring timer.
///
/// Starting a running ticker cancels the previous timer first, so there is
/// never more than one tick source. Dropping the ticker stops it.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    cancel: Option<CancellationToken>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            cancel: None,
        }
    }

    /// Post a clone of `tick` to `tx` every period until stopped.
    ///
    /// The first tick fires one full period after starting. Must be called
    /// from within a tokio runtime.
    pub fn start<T>(&mut self, tx: mpsc::UnboundedSender<T>, tick: T)
    where
        T: Clone + Send + 'static,
    {
        self.stop();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(tick.clone()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.cancel = Some(cancel);
    }

    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| !c.is_cancelled())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
