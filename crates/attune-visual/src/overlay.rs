//! Full-screen overlays: the end-of-session panel and the loading screen

use attune_core::{Point2D, Rect, Size2D};

use crate::{Color, Primitive, Scene, Stroke};

pub const BUTTON_WIDTH: f32 = 240.0;
pub const BUTTON_HEIGHT: f32 = 60.0;
const BUTTON_GAP: f32 = 20.0;
const CORNER: f32 = 12.0;

pub const END_TITLE: &str = "Session Complete!";
pub const LOADING_TEXT: &str = "Loading FaceMesh…";

/// Buttons on the end overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayButton {
    Retry,
    MainMenu,
}

impl OverlayButton {
    pub fn label(&self) -> &'static str {
        match self {
            OverlayButton::Retry => "RETRY",
            OverlayButton::MainMenu => "MAIN MENU",
        }
    }
}

/// End overlay geometry for a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndOverlay {
    pub panel: Rect,
    pub retry: Rect,
    pub menu: Rect,
}

impl EndOverlay {
    /// Layout is recomputed from the current viewport
    pub fn layout(viewport: Size2D) -> Self {
        let cx = viewport.width / 2.0;
        let cy = viewport.height / 2.0;
        let retry = Rect::new(cx - BUTTON_WIDTH / 2.0, cy + 20.0, BUTTON_WIDTH, BUTTON_HEIGHT);
        let menu = Rect::new(
            retry.x,
            retry.y + BUTTON_HEIGHT + BUTTON_GAP,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        );
        Self {
            panel: Rect::new(cx - 160.0, cy - 120.0, 320.0, 260.0),
            retry,
            menu,
        }
    }

    /// Which button, if any, is under `p` (edges count)
    pub fn hit_test(&self, p: Point2D) -> Option<OverlayButton> {
        if self.retry.contains(p) {
            Some(OverlayButton::Retry)
        } else if self.menu.contains(p) {
            Some(OverlayButton::MainMenu)
        } else {
            None
        }
    }

    pub fn render(&self, scene: &mut Scene) {
        scene.fill_rect(scene.size.bounds(), Color::black().with_alpha(180.0 / 255.0));
        scene.push(Primitive::Rect {
            rect: self.panel,
            fill: Some(Color::gray(40.0 / 255.0)),
            stroke: Some(Stroke::new(Color::white(), 1.0)),
            corner_radius: CORNER,
        });
        scene.text(
            Point2D::new(self.panel.center().x, self.retry.y - 60.0),
            END_TITLE,
            32.0,
            Color::white(),
        );

        for (button, rect, hue) in [
            (OverlayButton::Retry, self.retry, 120.0),
            (OverlayButton::MainMenu, self.menu, 0.0),
        ] {
            scene.push(Primitive::Gradient {
                rect,
                from: Point2D::new(rect.x, rect.y),
                to: Point2D::new(rect.x, rect.bottom()),
                start: Color::from_hsb(hue, 1.0, 1.0),
                end: Color::from_hsb(hue, 0.8, 1.0),
                corner_radius: CORNER,
            });
            scene.text(rect.center(), button.label(), 22.0, Color::white());
        }
    }
}

/// Shown until the landmark model reports ready
pub fn render_loading(scene: &mut Scene) {
    let center = scene.size.center();
    scene.text(center, LOADING_TEXT, 24.0, Color::white());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_viewport() {
        let overlay = EndOverlay::layout(Size2D::new(1000.0, 800.0));
        assert_eq!(overlay.retry, Rect::new(380.0, 420.0, 240.0, 60.0));
        assert_eq!(overlay.menu, Rect::new(380.0, 500.0, 240.0, 60.0));
    }

    #[test]
    fn test_hit_test() {
        let overlay = EndOverlay::layout(Size2D::new(1000.0, 800.0));
        assert_eq!(overlay.hit_test(Point2D::new(500.0, 450.0)), Some(OverlayButton::Retry));
        assert_eq!(overlay.hit_test(Point2D::new(380.0, 420.0)), Some(OverlayButton::Retry));
        assert_eq!(overlay.hit_test(Point2D::new(500.0, 530.0)), Some(OverlayButton::MainMenu));
        // Gap between the buttons
        assert_eq!(overlay.hit_test(Point2D::new(500.0, 490.0)), None);
        assert_eq!(overlay.hit_test(Point2D::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_render_labels() {
        let mut scene = Scene::new(Size2D::new(1000.0, 800.0));
        EndOverlay::layout(scene.size).render(&mut scene);
        assert!(scene.has_text(END_TITLE));
        assert!(scene.has_text("RETRY"));
        assert!(scene.has_text("MAIN MENU"));
    }
}
