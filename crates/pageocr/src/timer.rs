//! Scoped wall-clock timing.
//!
//! ```rust
//! use pageocr::timer::catch_time;
//!
//! let (pages, elapsed) = catch_time(|| vec![1, 2, 3]);
//! println!("{} [~{:.3}s per page]", elapsed.readout(), elapsed.per_item(pages.len()).unwrap_or_default());
//! ```

use std::fmt;
use std::time::{Duration, Instant};

/// Running stopwatch. Created by [`Stopwatch::start`], consumed by [`Stopwatch::stop`].
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn stop(self) -> Elapsed {
        Elapsed {
            duration: self.started.elapsed(),
        }
    }
}

/// Measured interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed {
    duration: Duration,
}

impl Elapsed {
    pub fn from_duration(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Human-readable summary, e.g. `⏳️ Done in: 1.234 seconds`.
    pub fn readout(&self) -> String {
        format!("⏳️ Done in: {:.3} seconds", self.secs())
    }

    /// Average seconds per item, `None` when `count` is zero.
    pub fn per_item(&self, count: usize) -> Option<f64> {
        (count > 0).then(|| self.secs() / count as f64)
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.readout())
    }
}

/// Time a block of work.
///
/// The closure's output is returned as-is, so a `Result` that carries an error is still timed.
pub fn catch_time<T, F>(work: F) -> (T, Elapsed)
where
    F: FnOnce() -> T,
{
    let stopwatch = Stopwatch::start();
    let output = work();
    (output, stopwatch.stop())
}
