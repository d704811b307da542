use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::{
    config::SystemConfig,
    foundation::error::{ThemeloopError, ThemeloopResult},
    show::bank::{ThemeBank, UpdateOutcome},
    show::pair::PairReceiver,
};

/// Options for [`MaintenanceDriver`].
#[derive(Clone, Copy, Debug)]
pub struct DriverOpts {
    /// Time between maintenance ticks.
    pub interval: Duration,
}

impl Default for DriverOpts {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(16),
        }
    }
}

impl DriverOpts {
    /// Take the tick cadence from system settings.
    pub fn from_system(system: &SystemConfig) -> Self {
        Self {
            interval: Duration::from_millis(system.update_interval_ms.max(1)),
        }
    }
}

// Keeps tick deadlines representable as `Instant`s.
const MAX_INTERVAL: Duration = Duration::from_secs(3600);

enum Command {
    ChangeThemes,
    Shutdown,
}

/// Runs a [`ThemeBank`] on its own controller thread.
///
/// The bank is moved onto the thread, which becomes the only context touching slot state. The
/// render side requests switches through [`MaintenanceDriver::request_change`] and observes them
/// through the [`PairReceiver`] returned by [`MaintenanceDriver::spawn`].
pub struct MaintenanceDriver {
    tx: mpsc::Sender<Command>,
    join: Option<JoinHandle<ThemeBank>>,
}

impl MaintenanceDriver {
    /// Start the controller thread.
    ///
    /// The tick interval is clamped to `[1 ms, 1 h]`.
    pub fn spawn(mut bank: ThemeBank, opts: DriverOpts) -> ThemeloopResult<(Self, PairReceiver)> {
        let opts = DriverOpts {
            interval: opts.interval.clamp(Duration::from_millis(1), MAX_INTERVAL),
        };
        let pairs = bank.subscribe();
        let (tx, rx) = mpsc::channel();
        let join = std::thread::Builder::new()
            .name("themeloop-maintenance".to_string())
            .spawn(move || run(bank, rx, opts))
            .map_err(|e| ThemeloopError::driver(format!("spawn maintenance thread: {e}")))?;
        tracing::info!(interval = ?opts.interval, "maintenance driver started");
        Ok((
            Self {
                tx,
                join: Some(join),
            },
            pairs,
        ))
    }

    /// Ask for a theme switch. Retried on every tick until the bank accepts it; requests made
    /// while one is still pending coalesce into it.
    pub fn request_change(&self) -> ThemeloopResult<()> {
        self.tx
            .send(Command::ChangeThemes)
            .map_err(|_| ThemeloopError::driver("maintenance thread has stopped"))
    }

    /// Stop the controller thread and take the bank back.
    pub fn shutdown(mut self) -> ThemeloopResult<ThemeBank> {
        self.stop()
    }

    fn stop(&mut self) -> ThemeloopResult<ThemeBank> {
        let _ = self.tx.send(Command::Shutdown);
        let join = self
            .join
            .take()
            .ok_or_else(|| ThemeloopError::driver("maintenance driver already stopped"))?;
        join.join()
            .map_err(|_| ThemeloopError::driver("maintenance thread panicked"))
    }
}

impl Drop for MaintenanceDriver {
    fn drop(&mut self) {
        if self.join.is_some() {
            let _ = self.stop();
        }
    }
}

fn run(mut bank: ThemeBank, rx: mpsc::Receiver<Command>, opts: DriverOpts) -> ThemeBank {
    let mut pending_change = false;
    let mut deadline = Instant::now() + opts.interval;
    loop {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Ok(Command::ChangeThemes) => pending_change = true,
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let now = Instant::now();
                deadline += opts.interval;
                if deadline < now {
                    deadline = now + opts.interval;
                }
                if bank.async_update() == UpdateOutcome::Maintained {
                    bank.maybe_upload_next();
                }
            }
        }
        if pending_change && bank.change_themes() {
            pending_change = false;
        }
    }
    tracing::info!("maintenance driver stopped");
    bank
}

#[cfg(test)]
#[path = "../tests/unit/driver.rs"]
mod tests;
