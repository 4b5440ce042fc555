//! Simulated landmark source
//!
//! The keyboard moves a virtual face; a background task samples it at the
//! tracker's cadence and pushes deliveries into a channel, the way a real
//! face-mesh callback would.

use std::time::Duration;

use attune_core::{LandmarkFrame, LandmarkUpdate, Point2D, Size2D};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// ~30 Hz
pub const FEED_INTERVAL: Duration = Duration::from_millis(33);
/// Time the simulated model takes to load
pub const MODEL_LOAD: Duration = Duration::from_millis(800);
/// Arrow-key step in display pixels
pub const NUDGE_PX: f32 = 24.0;

/// The face the keyboard controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedFace {
    pub nose: Point2D,
    pub present: bool,
    /// Mouth opening in [0, 1]
    pub mouth: f32,
}

impl SimulatedFace {
    pub fn centered(viewport: Size2D) -> Self {
        Self {
            nose: viewport.center(),
            present: true,
            mouth: 0.0,
        }
    }

    /// Move the nose, staying on screen
    pub fn nudge(&mut self, dx: f32, dy: f32, viewport: Size2D) {
        self.nose = Point2D::new(
            (self.nose.x + dx).clamp(0.0, viewport.width),
            (self.nose.y + dy).clamp(0.0, viewport.height),
        );
    }

    pub fn landmark(&self) -> LandmarkUpdate {
        if !self.present {
            return LandmarkUpdate::Lost;
        }
        // Inner lips straddle a point below the nose
        let gap = 5.0 + 20.0 * self.mouth.clamp(0.0, 1.0);
        let lips = self.nose.offset(0.0, 40.0);
        LandmarkUpdate::Detected(
            LandmarkFrame::nose(self.nose).with_lips(lips.offset(0.0, -gap / 2.0), lips.offset(0.0, gap / 2.0)),
        )
    }
}

/// Feed task: `Ready` after the load delay, then the face every interval.
/// Ends when the session side drops the receiver.
pub async fn run(face: watch::Receiver<SimulatedFace>, tx: mpsc::Sender<LandmarkUpdate>) {
    tokio::time::sleep(MODEL_LOAD).await;
    if tx.send(LandmarkUpdate::Ready).await.is_err() {
        return;
    }
    debug!("simulated face mesh loaded");

    let mut interval = tokio::time::interval(FEED_INTERVAL);
    loop {
        interval.tick().await;
        let update = face.borrow().landmark();
        if tx.send(update).await.is_err() {
            break;
        }
    }
}
