//! Chat bubble - the character's speech, shown for a fixed time

use std::time::Duration;

use attune_core::{Point2D, Rect, SessionTime};

use crate::{Color, Primitive, Scene, TextAlign};

/// Full-opacity display time
pub const SHOW_FOR: Duration = Duration::from_millis(4000);
/// Scale/fade transition at either end
pub const FADE: Duration = Duration::from_millis(300);

/// Latest chat message and when it was shown
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatBubble {
    message: Option<String>,
    shown_at: SessionTime,
}

impl ChatBubble {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current message
    pub fn show(&mut self, message: impl Into<String>, now: SessionTime) {
        self.message = Some(message.into());
        self.shown_at = now;
    }

    /// Message and opacity at `now`, None once it has faded out
    pub fn visible(&self, now: SessionTime) -> Option<(&str, f32)> {
        let message = self.message.as_deref()?;
        let age = now.since(self.shown_at);
        let fade = FADE.as_secs_f32();
        let opacity = if age < FADE {
            age.as_secs_f32() / fade
        } else if age <= SHOW_FOR {
            1.0
        } else if age < SHOW_FOR + FADE {
            1.0 - (age - SHOW_FOR).as_secs_f32() / fade
        } else {
            return None;
        };
        Some((message, opacity.clamp(0.0, 1.0)))
    }

    /// Last message shown, visible or not
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Rounded panel near the top center, scaled in and out with opacity
    pub fn render(&self, scene: &mut Scene, now: SessionTime) {
        let Some((message, opacity)) = self.visible(now) else {
            return;
        };
        let size = scene.size;
        let text_size = 32.0 * opacity.max(0.01);
        let width = (message.chars().count() as f32 * text_size * 0.55 + 48.0).min(size.width);
        let height = text_size * 2.0;
        let center = Point2D::new(size.width / 2.0, size.height * 0.12);

        scene.push(Primitive::Rect {
            rect: Rect::centered(center, width, height),
            fill: Some(Color::white().with_alpha(0.9 * opacity)),
            stroke: None,
            corner_radius: 16.0,
        });
        scene.push(Primitive::Text {
            position: center,
            content: message.to_string(),
            size: text_size,
            color: Color::gray(0.15).with_alpha(opacity),
            align: TextAlign::Center,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::Size2D;

    #[test]
    fn test_bubble_lifecycle() {
        let mut bubble = ChatBubble::new();
        assert!(bubble.visible(SessionTime::ZERO).is_none());

        bubble.show("hi", SessionTime::from_millis(1000));
        let (_, fading_in) = bubble.visible(SessionTime::from_millis(1150)).unwrap();
        assert!((fading_in - 0.5).abs() < 1e-3);
        assert_eq!(bubble.visible(SessionTime::from_millis(3000)), Some(("hi", 1.0)));
        let (_, fading_out) = bubble.visible(SessionTime::from_millis(5150)).unwrap();
        assert!((fading_out - 0.5).abs() < 1e-3);
        assert!(bubble.visible(SessionTime::from_millis(5300)).is_none());
    }

    #[test]
    fn test_newer_message_replaces() {
        let mut bubble = ChatBubble::new();
        bubble.show("first", SessionTime::ZERO);
        bubble.show("second", SessionTime::from_millis(100));
        assert_eq!(bubble.message(), Some("second"));
    }

    #[test]
    fn test_render_only_while_visible() {
        let mut bubble = ChatBubble::new();
        bubble.show("hello", SessionTime::ZERO);

        let mut scene = Scene::new(Size2D::new(800.0, 600.0));
        bubble.render(&mut scene, SessionTime::from_millis(2000));
        assert!(scene.has_text("hello"));

        let mut scene = Scene::new(Size2D::new(800.0, 600.0));
        bubble.render(&mut scene, SessionTime::from_millis(6000));
        assert!(scene.is_empty());
    }
}
