//! Scene - what a drawing surface is asked to draw for one frame
//!
//! This is NOT a renderer. A scene is a flat, ordered list of primitives in
//! display coordinates (painter's order). Any rasterizer can present it.

use attune_core::{Point2D, Rect, Size2D};

use crate::Color;

/// Outline style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A single drawable element
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        corner_radius: f32,
    },
    /// Rectangle filled with a linear gradient from `from` to `to`
    Gradient {
        rect: Rect,
        from: Point2D,
        to: Point2D,
        start: Color,
        end: Color,
        corner_radius: f32,
    },
    Ellipse {
        center: Point2D,
        width: f32,
        height: f32,
        /// Radians, clockwise
        rotation: f32,
        fill: Color,
    },
    /// Line segment with per-segment width and color (branches, eyes)
    Segment {
        from: Point2D,
        to: Point2D,
        width: f32,
        color: Color,
    },
    /// Closed filled silhouette
    Polygon {
        points: Vec<Point2D>,
        fill: Color,
        stroke: Option<Stroke>,
    },
    /// Elliptical arc outline, angles in radians clockwise from +x
    Arc {
        center: Point2D,
        width: f32,
        height: f32,
        start: f32,
        end: f32,
        stroke: Stroke,
    },
    Text {
        position: Point2D,
        content: String,
        size: f32,
        color: Color,
        align: TextAlign,
    },
}

/// One frame's scene description
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Viewport the scene was built for
    pub size: Size2D,
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(size: Size2D) -> Self {
        Self {
            size,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(Primitive::Rect {
            rect,
            fill: Some(color),
            stroke: None,
            corner_radius: 0.0,
        });
    }

    pub fn outline_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.push(Primitive::Rect {
            rect,
            fill: None,
            stroke: Some(stroke),
            corner_radius: 0.0,
        });
    }

    pub fn ellipse(&mut self, center: Point2D, width: f32, height: f32, fill: Color) {
        self.push(Primitive::Ellipse {
            center,
            width,
            height,
            rotation: 0.0,
            fill,
        });
    }

    /// Circle of diameter `d`
    pub fn dot(&mut self, center: Point2D, d: f32, fill: Color) {
        self.ellipse(center, d, d, fill);
    }

    pub fn segment(&mut self, from: Point2D, to: Point2D, width: f32, color: Color) {
        self.push(Primitive::Segment {
            from,
            to,
            width,
            color,
        });
    }

    pub fn text(&mut self, position: Point2D, content: impl Into<String>, size: f32, color: Color) {
        self.push(Primitive::Text {
            position,
            content: content.into(),
            size,
            color,
            align: TextAlign::Center,
        });
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Text content in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Does any text primitive equal `content`?
    pub fn has_text(&self, content: &str) -> bool {
        self.texts().any(|t| t == content)
    }

    pub fn count(&self, predicate: impl Fn(&Primitive) -> bool) -> usize {
        self.primitives.iter().filter(|p| predicate(p)).count()
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }
}

/// Anything that can present a scene (canvas, terminal, test recorder)
pub trait Surface {
    fn present(&mut self, scene: &Scene);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(usize);

    impl Surface for Counter {
        fn present(&mut self, scene: &Scene) {
            self.0 += scene.len();
        }
    }

    #[test]
    fn test_scene_helpers() {
        let mut scene = Scene::new(Size2D::new(100.0, 100.0));
        scene.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::black());
        scene.text(Point2D::new(5.0, 5.0), "hello", 12.0, Color::white());
        scene.dot(Point2D::new(1.0, 1.0), 4.0, Color::white());

        assert_eq!(scene.len(), 3);
        assert!(scene.has_text("hello"));
        assert_eq!(scene.count(|p| matches!(p, Primitive::Ellipse { .. })), 1);

        let mut surface = Counter(0);
        surface.present(&scene);
        assert_eq!(surface.0, 3);
    }
}
