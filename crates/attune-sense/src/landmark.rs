//! Landmark latch - the most recent delivery from the face tracker
//!
//! The tracker runs at its own cadence, often slower than the frame rate.
//! A delivery stays valid until superseded; only an explicit `Lost` makes
//! the subject absent. A frame with no new delivery changes nothing.

use std::time::Duration;

use attune_core::{EngagementSample, LandmarkFrame, LandmarkUpdate, SessionTime};
use tracing::debug;

/// Holder for the latest landmark delivery
#[derive(Debug, Clone, Default)]
pub struct LandmarkLatch {
    /// Has the tracker finished loading?
    ready: bool,
    /// Latest detected face, None after an explicit loss
    latest: Option<LandmarkFrame>,
    /// Session time a face was last reported (or the session started)
    last_face_at: SessionTime,
    /// Deliveries received
    deliveries: u64,
}

impl LandmarkLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a delivery at session time `now`
    pub fn deliver(&mut self, update: LandmarkUpdate, now: SessionTime) {
        self.deliveries += 1;
        match update {
            LandmarkUpdate::Ready => {
                if !self.ready {
                    debug!("landmark source ready");
                }
                self.ready = true;
            }
            LandmarkUpdate::Detected(frame) => {
                // A detection implies the model is running
                self.ready = true;
                self.latest = Some(frame);
                self.last_face_at = now;
            }
            LandmarkUpdate::Lost => {
                self.latest = None;
            }
        }
    }

    /// Engagement sample for this frame, in capture coordinates
    pub fn sample(&self) -> EngagementSample {
        match (&self.latest, self.ready) {
            (Some(frame), true) => EngagementSample::present(frame.nose),
            _ => EngagementSample::absent(),
        }
    }

    /// Mouth openness from the latest face, zero when absent
    pub fn mouth_openness(&self) -> f32 {
        self.latest.map(|f| f.mouth_openness()).unwrap_or(0.0)
    }

    /// How long no face has been reported
    pub fn face_missing_for(&self, now: SessionTime) -> Duration {
        if self.latest.is_some() {
            return Duration::ZERO;
        }
        now.since(self.last_face_at)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn deliveries(&self) -> u64 {
        self.deliveries
    }

    /// Restart the absence timer at `now` (retry).
    /// Readiness and the latest face survive: the tracker keeps running.
    pub fn restart(&mut self, now: SessionTime) {
        self.last_face_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::Point2D;

    #[test]
    fn test_latest_sample_persists_until_superseded() {
        let mut latch = LandmarkLatch::new();
        latch.deliver(LandmarkUpdate::Ready, SessionTime::ZERO);
        latch.deliver(
            LandmarkUpdate::Detected(LandmarkFrame::nose(Point2D::new(10.0, 20.0))),
            SessionTime::from_millis(10),
        );

        // No new delivery for many frames: still present
        let sample = latch.sample();
        assert!(sample.present);
        assert_eq!(sample.position, Point2D::new(10.0, 20.0));

        latch.deliver(
            LandmarkUpdate::Detected(LandmarkFrame::nose(Point2D::new(30.0, 40.0))),
            SessionTime::from_millis(50),
        );
        assert_eq!(latch.sample().position, Point2D::new(30.0, 40.0));
    }

    #[test]
    fn test_explicit_loss_makes_absent() {
        let mut latch = LandmarkLatch::new();
        latch.deliver(
            LandmarkUpdate::Detected(LandmarkFrame::nose(Point2D::new(1.0, 1.0))),
            SessionTime::from_millis(100),
        );
        latch.deliver(LandmarkUpdate::Lost, SessionTime::from_millis(200));

        assert!(!latch.sample().present);
        assert_eq!(
            latch.face_missing_for(SessionTime::from_millis(1100)),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_not_ready_is_absent() {
        let latch = LandmarkLatch::new();
        assert!(!latch.is_ready());
        assert!(!latch.sample().present);
    }

    #[test]
    fn test_missing_counts_from_session_start() {
        let latch = LandmarkLatch::new();
        assert_eq!(
            latch.face_missing_for(SessionTime::from_millis(30_000)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_restart_resets_absence_timer() {
        let mut latch = LandmarkLatch::new();
        latch.deliver(LandmarkUpdate::Ready, SessionTime::ZERO);
        latch.restart(SessionTime::from_millis(40_000));
        assert_eq!(
            latch.face_missing_for(SessionTime::from_millis(41_000)),
            Duration::from_secs(1)
        );
        assert!(latch.is_ready());
    }
}
