//! Blob driver - a single deformable silhouette
//!
//! Appearance targets come from a table keyed on mood (and, while calm, on
//! the gaze streak). The driven values chase their targets by exponential
//! smoothing so a mood change never pops.

use std::f32::consts::PI;
use std::time::Duration;

use attune_core::{lerp, Point2D, Size2D};
use attune_state::Mood;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{palette, Color, Primitive, Scene, Stroke};

/// Smoothing factor per reference frame for hue, size and alpha
pub const APPEARANCE_SMOOTHING: f32 = 0.05;
/// Smoothing factor per reference frame for the mouth
pub const MOUTH_SMOOTHING: f32 = 0.6;
const REFERENCE_FPS: f32 = 60.0;
/// Gaze streak after which a calm blob dances
pub const DANCE_AFTER: Duration = Duration::from_secs(30);
const RESPAWN_SHAKE: f32 = 12.0;

/// Appearance the blob is heading toward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobTargets {
    /// Degrees
    pub hue: f32,
    /// Radius as a fraction of the viewport's shorter side
    pub size: f32,
    pub alpha: f32,
}

impl BlobTargets {
    /// Target appearance for a mood.
    /// `streak` is the continuous gaze; `in_state` the time since the mood began.
    pub fn for_mood(mood: Mood, streak: Duration, in_state: Duration, respawn: Duration) -> Self {
        match mood {
            Mood::Calm => {
                let secs = streak.as_secs_f32();
                let hue = if secs > 20.0 {
                    300.0
                } else if secs > 15.0 {
                    240.0
                } else if secs > 10.0 {
                    60.0
                } else {
                    120.0
                };
                Self {
                    hue,
                    size: 0.3,
                    alpha: 1.0,
                }
            }
            Mood::Looming => Self {
                hue: 0.0,
                size: 0.5,
                alpha: 1.0,
            },
            Mood::FadeOut => Self {
                hue: 0.0,
                size: 0.5,
                alpha: 0.0,
            },
            Mood::Respawning => Self {
                hue: 0.0,
                size: lerp(0.05, 1.2, attune_core::fraction(in_state, respawn)),
                alpha: 1.0,
            },
        }
    }
}

/// Everything the blob shows this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobView {
    pub mood: Mood,
    pub centered: bool,
    pub streak: Duration,
    pub in_state: Duration,
    pub respawn: Duration,
    /// Bounce celebration is running
    pub bouncing: bool,
    /// Seconds since the session started, for periodic motion
    pub elapsed: f32,
    pub mouth_openness: f32,
    pub nose: Option<Point2D>,
}

/// Smoothed blob appearance
#[derive(Debug, Clone)]
pub struct BlobDriver {
    pub hue: f32,
    pub size: f32,
    pub alpha: f32,
    pub mouth: f32,
    /// Respawn shake noise
    rng: StdRng,
}

impl BlobDriver {
    pub fn new(seed: u64) -> Self {
        let calm = BlobTargets::for_mood(Mood::Calm, Duration::ZERO, Duration::ZERO, Duration::ZERO);
        Self {
            hue: calm.hue,
            size: calm.size,
            alpha: calm.alpha,
            mouth: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Back to the calm rest appearance with fresh noise
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Move every value toward its target
    pub fn update(&mut self, targets: &BlobTargets, mouth_openness: f32, dt: Duration) {
        let a = smoothing(APPEARANCE_SMOOTHING, dt);
        self.hue = lerp(self.hue, targets.hue, a);
        self.size = lerp(self.size, targets.size, a);
        self.alpha = lerp(self.alpha, targets.alpha, a).clamp(0.0, 1.0);
        self.mouth = lerp(self.mouth, mouth_openness.clamp(0.0, 1.0), smoothing(MOUTH_SMOOTHING, dt));
    }

    /// Body center this frame: dance, bounce and respawn shake
    pub fn body_center(&mut self, view: &BlobView, viewport: Size2D) -> Point2D {
        let mut center = viewport.center();
        if view.centered && view.mood == Mood::Calm && view.streak > DANCE_AFTER {
            center.x += (view.elapsed * 6.0).sin() * 20.0;
        }
        if view.bouncing && view.centered {
            center.y -= (view.elapsed * 18.0).sin().abs() * 30.0;
        }
        if view.mood == Mood::Respawning {
            center.x += self.rng.gen_range(-RESPAWN_SHAKE..=RESPAWN_SHAKE);
            center.y += self.rng.gen_range(-RESPAWN_SHAKE..=RESPAWN_SHAKE);
        }
        center
    }

    pub fn radius(&self, viewport: Size2D) -> f32 {
        self.size * viewport.min_side()
    }

    pub fn render(&mut self, view: &BlobView, scene: &mut Scene) {
        let viewport = scene.size;
        if let Some(nose) = view.nose {
            scene.dot(nose, 12.0, palette::nose_marker());
        }

        let c = self.body_center(view, viewport);
        let r = self.radius(viewport);
        let at = |x: f32, y: f32| c.offset(x, y);
        let ink = Color::black().with_alpha(self.alpha);

        scene.push(Primitive::Polygon {
            points: silhouette(c, r),
            fill: Color::from_hsb(self.hue, 1.0, 1.0).with_alpha(self.alpha),
            stroke: Some(Stroke::new(
                Color::from_hsb(self.hue - 20.0, 1.0, 1.0).with_alpha(self.alpha),
                viewport.min_side() * 0.05 * self.size,
            )),
        });

        // Eyes: round when calm, angry slants otherwise
        if view.mood == Mood::Calm {
            scene.dot(at(-r * 0.4, -r * 0.2), r * 0.15, ink);
            scene.dot(at(r * 0.4, -r * 0.2), r * 0.15, ink);
        } else {
            scene.segment(at(-r * 0.45, -r * 0.25), at(-r * 0.35, -r * 0.15), r * 0.04, ink);
            scene.segment(at(r * 0.45, -r * 0.25), at(r * 0.35, -r * 0.15), r * 0.04, ink);
        }

        scene.push(Primitive::Polygon {
            points: vec![at(0.0, 0.0), at(-r * 0.05, r * 0.1), at(r * 0.05, r * 0.1)],
            fill: Color::from_hsb(255.0, 1.0, 1.0).with_alpha(self.alpha),
            stroke: None,
        });

        // Mouth: smile when calm, gaping otherwise; opens with the user's mouth
        let (width, height, start, end) = if view.mood == Mood::Calm {
            (r * 0.4, r * 0.2 + self.mouth * r * 0.3, PI * 0.1, PI * 0.9)
        } else {
            (r * 0.6, r * 0.4 + self.mouth * r * 0.5, PI * 0.9, PI * 1.1)
        };
        scene.push(Primitive::Arc {
            center: at(0.0, r * 0.3),
            width,
            height,
            start,
            end,
            stroke: Stroke::new(ink, r * 0.04),
        });
    }
}

/// Per-frame factor adjusted to the real frame delta
fn smoothing(per_frame: f32, dt: Duration) -> f32 {
    1.0 - (1.0 - per_frame).powf(dt.as_secs_f32() * REFERENCE_FPS)
}

/// Dome top over a gently curved base
fn silhouette(c: Point2D, r: f32) -> Vec<Point2D> {
    let mut points = Vec::with_capacity(32);

    // Quadratic base from (-r, 0.8r) through control (0, r) to (r, 0.8r)
    let (p0, p1, p2) = ((-r, r * 0.8), (0.0, r), (r, r * 0.8));
    for i in 0..=8 {
        let t = i as f32 / 8.0;
        let u = 1.0 - t;
        let x = u * u * p0.0 + 2.0 * u * t * p1.0 + t * t * p2.0;
        let y = u * u * p0.1 + 2.0 * u * t * p1.1 + t * t * p2.1;
        points.push(c.offset(x, y));
    }

    for i in 0..=20 {
        let a = i as f32 * PI / 20.0;
        points.push(c.offset(r * a.cos(), -r * a.sin()));
    }
    points
}
