//! Scoped timing for the swap stages (load, detect, swap, enhance, save).
//!
//! A [`TimingGuard`] logs its elapsed time on drop, on the `faceswap::telemetry` target, but
//! only when telemetry has been switched on through [`configure`] and the logger accepts the
//! requested level.

use std::{
    borrow::Cow,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use log::{Level, LevelFilter, log, log_enabled};

/// Log target used for every timing record.
pub const TELEMETRY_TARGET: &str = "faceswap::telemetry";

static TELEMETRY_ENABLED: AtomicBool = AtomicBool::new(false);
static TELEMETRY_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Off as usize);

/// RAII helper that logs how long an operation took when dropped.
pub struct TimingGuard {
    label: Cow<'static, str>,
    level: Level,
    start: Instant,
    active: bool,
}

impl TimingGuard {
    /// Returns `true` when the guard will emit a log entry on drop.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Consume the guard and return the elapsed duration without logging.
    pub fn finish(mut self) -> Duration {
        self.active = false;
        self.start.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if self.active {
            log!(
                target: TELEMETRY_TARGET,
                self.level,
                "{} completed in {:.2?}",
                self.label,
                self.start.elapsed()
            );
        }
    }
}

/// Start timing `label`. The guard is active only when telemetry allows `level`.
pub fn timing_guard(label: impl Into<Cow<'static, str>>, level: Level) -> TimingGuard {
    TimingGuard {
        label: label.into(),
        level,
        start: Instant::now(),
        active: telemetry_allows(level) && log_enabled!(target: TELEMETRY_TARGET, level),
    }
}

/// Switch telemetry on or off and set the most verbose level it records.
pub fn configure(enabled: bool, level: LevelFilter) {
    TELEMETRY_ENABLED.store(enabled, Ordering::Relaxed);
    TELEMETRY_LEVEL.store(level as usize, Ordering::Relaxed);
}

pub fn telemetry_enabled() -> bool {
    TELEMETRY_ENABLED.load(Ordering::Relaxed)
}

/// Returns `true` when telemetry is enabled and `level` is within the configured threshold.
pub fn telemetry_allows(level: Level) -> bool {
    telemetry_enabled() && level as usize <= TELEMETRY_LEVEL.load(Ordering::Relaxed)
}
