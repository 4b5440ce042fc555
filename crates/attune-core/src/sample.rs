//! Landmark samples - what the face tracker tells us each delivery
//!
//! A delivery carries the nose tip and the two inner-lip points, in capture
//! coordinates. Mouth openness is derived from the lip gap.

use serde::{Deserialize, Serialize};

use crate::Point2D;

/// Mouth openness is mapped from inner-lip distance over this pixel range
pub const MOUTH_GAP_CLOSED_PX: f32 = 5.0;
pub const MOUTH_GAP_OPEN_PX: f32 = 25.0;

/// One landmark delivery, in capture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Nose tip
    pub nose: Point2D,
    /// Upper inner lip, when the tracker reports it
    pub upper_lip: Option<Point2D>,
    /// Lower inner lip, when the tracker reports it
    pub lower_lip: Option<Point2D>,
}

impl LandmarkFrame {
    /// Frame with only a nose landmark
    pub fn nose(nose: Point2D) -> Self {
        Self {
            nose,
            upper_lip: None,
            lower_lip: None,
        }
    }

    pub fn with_lips(mut self, upper: Point2D, lower: Point2D) -> Self {
        self.upper_lip = Some(upper);
        self.lower_lip = Some(lower);
        self
    }

    /// Mouth openness (0.0 = closed, 1.0 = fully open)
    pub fn mouth_openness(&self) -> f32 {
        match (self.upper_lip, self.lower_lip) {
            (Some(top), Some(bottom)) => {
                let gap = top.distance(&bottom);
                crate::map_range(gap, MOUTH_GAP_CLOSED_PX, MOUTH_GAP_OPEN_PX, 0.0, 1.0)
                    .clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// What the landmark source pushes at its own cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LandmarkUpdate {
    /// The inference model finished loading
    Ready,
    /// A face was detected
    Detected(LandmarkFrame),
    /// Explicit no-detection signal
    Lost,
}

/// Engagement sample for one frame, in capture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngagementSample {
    pub position: Point2D,
    pub present: bool,
}

impl EngagementSample {
    pub fn present(position: Point2D) -> Self {
        Self {
            position,
            present: true,
        }
    }

    /// No face present
    pub fn absent() -> Self {
        Self {
            position: Point2D::ORIGIN,
            present: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouth_openness_mapping() {
        let base = LandmarkFrame::nose(Point2D::new(0.0, 0.0));
        let closed = base.with_lips(Point2D::new(0.0, 0.0), Point2D::new(0.0, 3.0));
        let half = base.with_lips(Point2D::new(0.0, 0.0), Point2D::new(0.0, 15.0));
        let wide = base.with_lips(Point2D::new(0.0, 0.0), Point2D::new(0.0, 60.0));

        assert_eq!(closed.mouth_openness(), 0.0);
        assert!((half.mouth_openness() - 0.5).abs() < 1e-5);
        assert_eq!(wide.mouth_openness(), 1.0);
        assert_eq!(base.mouth_openness(), 0.0);
    }

    #[test]
    fn test_absent_sample() {
        let s = EngagementSample::absent();
        assert!(!s.present);
    }
}
