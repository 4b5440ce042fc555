//! Scripted gaze - what a simulated subject does over time
//!
//! A `GazeScript` is a sequence of timed segments. A `FeedModel` turns the
//! current segment into landmark deliveries at the tracker's cadence, with
//! optional positional noise.

use std::time::Duration;

use attune_core::{LandmarkFrame, LandmarkUpdate, Point2D, Size2D};
use rand::Rng;

/// Subject behavior during one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gaze {
    /// Nose at the middle of the display
    Centered,
    /// Face visible, nose near a corner
    Away,
    /// No face detected
    NoFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazeSegment {
    pub gaze: Gaze,
    pub duration: Duration,
}

/// Timed gaze sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GazeScript {
    segments: Vec<GazeSegment>,
}

impl GazeScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, gaze: Gaze, duration: Duration) -> Self {
        if !duration.is_zero() {
            self.segments.push(GazeSegment { gaze, duration });
        }
        self
    }

    pub fn centered(self, duration: Duration) -> Self {
        self.then(Gaze::Centered, duration)
    }

    pub fn away(self, duration: Duration) -> Self {
        self.then(Gaze::Away, duration)
    }

    pub fn no_face(self, duration: Duration) -> Self {
        self.then(Gaze::NoFace, duration)
    }

    /// The whole script `times` times over
    pub fn repeat(mut self, times: usize) -> Self {
        let once = self.segments.clone();
        for _ in 1..times {
            self.segments.extend_from_slice(&once);
        }
        if times == 0 {
            self.segments.clear();
        }
        self
    }

    /// Random segments up to `total`, each at most `max_segment` long
    pub fn random<R: Rng + ?Sized>(rng: &mut R, total: Duration, max_segment: Duration) -> Self {
        let max_ms = max_segment.as_millis().max(1) as u64;
        let mut script = Self::new();
        let mut covered = Duration::ZERO;
        while covered < total {
            let gaze = match rng.gen_range(0..3) {
                0 => Gaze::Centered,
                1 => Gaze::Away,
                _ => Gaze::NoFace,
            };
            let duration = Duration::from_millis(rng.gen_range(1..=max_ms)).min(total - covered);
            covered += duration;
            script = script.then(gaze, duration);
        }
        script
    }

    pub fn total(&self) -> Duration {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Gaze at script time `t`, None past the end
    pub fn at(&self, t: Duration) -> Option<Gaze> {
        let mut start = Duration::ZERO;
        for segment in &self.segments {
            let end = start + segment.duration;
            if t < end {
                return Some(segment.gaze);
            }
            start = end;
        }
        None
    }

    pub fn segments(&self) -> &[GazeSegment] {
        &self.segments
    }
}

/// Landmark source model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedModel {
    /// Time between deliveries
    pub interval: Duration,
    /// Maximum nose displacement per delivery (pixels)
    pub jitter_px: f32,
}

impl FeedModel {
    pub fn new(interval: Duration, jitter_px: f32) -> Self {
        Self { interval, jitter_px }
    }

    /// 30 Hz, exact positions
    pub fn perfect() -> Self {
        Self::new(Duration::from_micros(33_333), 0.0)
    }

    /// 30 Hz with a few pixels of noise
    pub fn noisy() -> Self {
        Self::new(Duration::from_micros(33_333), 6.0)
    }

    /// A delivery every frame
    pub fn every_frame() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    /// Delivery for `gaze` on a display of `viewport`
    pub fn landmark<R: Rng + ?Sized>(&self, gaze: Gaze, viewport: Size2D, rng: &mut R) -> LandmarkUpdate {
        let nose = match gaze {
            Gaze::Centered => viewport.center(),
            Gaze::Away => Point2D::new(viewport.width * 0.05, viewport.height * 0.05),
            Gaze::NoFace => return LandmarkUpdate::Lost,
        };
        let nose = if self.jitter_px > 0.0 {
            let j = self.jitter_px;
            nose.offset(rng.gen_range(-j..=j), rng.gen_range(-j..=j))
        } else {
            nose
        };
        LandmarkUpdate::Detected(LandmarkFrame::nose(nose))
    }
}

impl Default for FeedModel {
    fn default() -> Self {
        Self::perfect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_script_lookup() {
        let script = GazeScript::new()
            .centered(Duration::from_secs(2))
            .away(Duration::from_secs(1))
            .no_face(Duration::from_secs(1));

        assert_eq!(script.total(), Duration::from_secs(4));
        assert_eq!(script.at(Duration::ZERO), Some(Gaze::Centered));
        assert_eq!(script.at(Duration::from_millis(1999)), Some(Gaze::Centered));
        assert_eq!(script.at(Duration::from_secs(2)), Some(Gaze::Away));
        assert_eq!(script.at(Duration::from_millis(3500)), Some(Gaze::NoFace));
        assert_eq!(script.at(Duration::from_secs(4)), None);
    }

    #[test]
    fn test_repeat() {
        let script = GazeScript::new()
            .centered(Duration::from_secs(1))
            .away(Duration::from_secs(1))
            .repeat(3);
        assert_eq!(script.segments().len(), 6);
        assert_eq!(script.total(), Duration::from_secs(6));
        assert!(GazeScript::new().centered(Duration::from_secs(1)).repeat(0).segments().is_empty());
    }

    #[test]
    fn test_random_covers_total() {
        let mut rng = StdRng::seed_from_u64(9);
        let total = Duration::from_secs(10);
        let script = GazeScript::random(&mut rng, total, Duration::from_millis(1500));
        assert_eq!(script.total(), total);
        assert!(script
            .segments()
            .iter()
            .all(|s| s.duration <= Duration::from_millis(1500)));
    }

    #[test]
    fn test_feed_positions() {
        let mut rng = StdRng::seed_from_u64(1);
        let viewport = Size2D::new(800.0, 600.0);
        let feed = FeedModel::noisy();

        match feed.landmark(Gaze::Centered, viewport, &mut rng) {
            LandmarkUpdate::Detected(frame) => {
                assert!(frame.nose.distance(&viewport.center()) <= 6.0 * 2f32.sqrt() + 1e-3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(feed.landmark(Gaze::NoFace, viewport, &mut rng), LandmarkUpdate::Lost);
    }
}
