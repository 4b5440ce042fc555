//! Engagement Detector
//!
//! Pure and stateless. Regions and mappings are rebuilt from the current
//! viewport every frame, so a resize needs no special handling.

use attune_core::{AttuneError, AttuneResult, EngagementSample, Point2D, Rect, Size2D};
use serde::{Deserialize, Serialize};

/// Linear scale from capture coordinates to display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMap {
    pub capture: Size2D,
    pub display: Size2D,
}

impl CoordinateMap {
    pub fn new(capture: Size2D, display: Size2D) -> Self {
        Self { capture, display }
    }

    /// Identity mapping (capture sized to the display)
    pub fn identity(display: Size2D) -> Self {
        Self::new(display, display)
    }

    /// Map a capture-space point to display space.
    /// None when the capture size is degenerate.
    pub fn map(&self, p: Point2D) -> Option<Point2D> {
        if !self.capture.is_valid() {
            return None;
        }
        Some(Point2D::new(
            p.x / self.capture.width * self.display.width,
            p.y / self.capture.height * self.display.height,
        ))
    }
}

/// How a character lays out its detection region on the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RegionLayout {
    /// Inset every side by `margin` of the viewport extent
    Margin { margin: f32 },
    /// Centered box extending `half_width`/`half_height` of the viewport each way
    Centered { half_width: f32, half_height: f32 },
}

impl RegionLayout {
    pub fn validate(&self) -> AttuneResult<()> {
        match *self {
            RegionLayout::Margin { margin } if !(0.0..0.5).contains(&margin) => {
                Err(AttuneError::InvalidThreshold {
                    name: "region.margin".to_string(),
                    value: margin,
                })
            }
            RegionLayout::Centered { half_width, half_height }
                if !(half_width > 0.0 && half_width <= 0.5) || !(half_height > 0.0 && half_height <= 0.5) =>
            {
                Err(AttuneError::InvalidThreshold {
                    name: "region.half_extent".to_string(),
                    value: half_width.min(half_height),
                })
            }
            _ => Ok(()),
        }
    }

    /// Resolve against the current viewport
    pub fn resolve(&self, viewport: Size2D) -> DetectionRegion {
        match *self {
            RegionLayout::Margin { margin } => DetectionRegion::with_margin(viewport, margin),
            RegionLayout::Centered { half_width, half_height } => {
                DetectionRegion::centered(viewport, half_width, half_height)
            }
        }
    }
}

/// Axis-aligned detection region in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRegion {
    pub rect: Rect,
}

impl DetectionRegion {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Inset each side by `margin` of the viewport extent
    pub fn with_margin(viewport: Size2D, margin: f32) -> Self {
        let x = viewport.width * margin;
        let y = viewport.height * margin;
        Self::new(Rect::new(
            x,
            y,
            viewport.width * (1.0 - 2.0 * margin),
            viewport.height * (1.0 - 2.0 * margin),
        ))
    }

    /// Box centered on the viewport, `half_width`/`half_height` of each extent either side
    pub fn centered(viewport: Size2D, half_width: f32, half_height: f32) -> Self {
        Self::new(Rect::centered(
            viewport.center(),
            viewport.width * half_width * 2.0,
            viewport.height * half_height * 2.0,
        ))
    }

    /// Strict containment
    pub fn contains(&self, p: Point2D) -> bool {
        self.rect.contains_strict(p)
    }
}

/// Is the subject engaged this frame?
pub fn detect(sample: &EngagementSample, mapping: &CoordinateMap, region: &DetectionRegion) -> bool {
    evaluate(sample, mapping, region).centered
}

/// Detection result with the mapped display position (for the nose marker)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Engagement {
    pub centered: bool,
    pub display_position: Option<Point2D>,
}

/// Same as `detect`, also returning the display-space position
pub fn evaluate(sample: &EngagementSample, mapping: &CoordinateMap, region: &DetectionRegion) -> Engagement {
    if !sample.present {
        return Engagement::default();
    }
    match mapping.map(sample.position) {
        Some(p) => Engagement {
            centered: region.contains(p),
            display_position: Some(p),
        },
        None => Engagement::default(),
    }
}
