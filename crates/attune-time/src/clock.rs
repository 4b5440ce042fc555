//! Frame clock - advances once per rendered frame

use std::time::{Duration, Instant};

use attune_core::SessionTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Frame clock configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Largest delta a single frame may advance the clock by
    pub max_step: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            max_step: Duration::from_millis(100),
        }
    }
}

/// Frame clock - monotonic session time
/// INVARIANT: session time never decreases except through `reset`
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Current session time
    now: SessionTime,
    /// Frames advanced since the last reset
    frames: u64,
    /// Clamp for a single step
    max_step: Duration,
    /// Last wall-clock instant seen by `tick_real`
    last_instant: Option<Instant>,
}

impl FrameClock {
    /// Create a new clock at session time zero
    pub fn new(config: &ClockConfig) -> Self {
        FrameClock {
            now: SessionTime::ZERO,
            frames: 0,
            max_step: config.max_step,
            last_instant: None,
        }
    }

    /// Advance by a caller-supplied frame delta.
    /// Returns the delta actually applied.
    pub fn advance(&mut self, dt: Duration) -> Duration {
        // Clamp to prevent large jumps (e.g., a tab returning from background)
        let applied = dt.min(self.max_step);
        if applied < dt {
            trace!(requested = ?dt, applied = ?applied, "frame delta clamped");
        }
        self.now = self.now.saturating_add(applied);
        self.frames += 1;
        applied
    }

    /// Advance by the wall-clock time since the previous call.
    /// The first call after construction or reset advances by zero.
    pub fn tick_real(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = self
            .last_instant
            .map(|last| now.duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_instant = Some(now);
        self.advance(elapsed)
    }

    /// Current session time without advancing
    pub fn now(&self) -> SessionTime {
        self.now
    }

    /// Frames since the last reset
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Back to session time zero (retry)
    pub fn reset(&mut self) {
        self.now = SessionTime::ZERO;
        self.frames = 0;
        self.last_instant = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_advance() {
        let mut clock = FrameClock::default();

        let t1 = clock.now();
        clock.advance(Duration::from_millis(16));
        let t2 = clock.now();

        assert!(t2 > t1);
        assert_eq!(t2.as_millis(), 16);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn test_frame_clock_clamps_large_steps() {
        let mut clock = FrameClock::default();

        let applied = clock.advance(Duration::from_secs(5));

        assert_eq!(applied, Duration::from_millis(100));
        assert_eq!(clock.now().as_millis(), 100);
    }

    #[test]
    fn test_frame_clock_real_tick_monotonic() {
        let mut clock = FrameClock::default();

        assert_eq!(clock.tick_real(), Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        clock.tick_real();

        assert!(clock.now() > SessionTime::ZERO);
    }

    #[test]
    fn test_frame_clock_reset() {
        let mut clock = FrameClock::default();
        clock.advance(Duration::from_millis(50));
        clock.reset();

        assert_eq!(clock.now(), SessionTime::ZERO);
        assert_eq!(clock.frames(), 0);
    }
}
