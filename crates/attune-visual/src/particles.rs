//! Celebration particles
//!
//! Particles live independently of the automaton once spawned. Motion is
//! specified per reference frame (1/60 s) and scaled by the real frame
//! delta, so behavior does not depend on the frame rate.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use attune_core::{map_range, Point2D, Size2D};
use rand::Rng;
use tracing::trace;

use crate::{Color, Primitive, Scene};

/// Reference frame rate particle speeds are expressed in
const REFERENCE_FPS: f32 = 60.0;

/// Confetti pieces per burst
pub const CONFETTI_BURST: usize = 200;

/// Reference frames covered by `dt`
fn frames(dt: Duration) -> f32 {
    dt.as_secs_f32() * REFERENCE_FPS
}

/// A transient decorative entity
pub trait Particle {
    fn update(&mut self, dt: Duration, bounds: Size2D);
    fn is_expired(&self, bounds: Size2D) -> bool;
    fn render(&self, scene: &mut Scene);
}

/// Owner of the active particle collection
#[derive(Debug, Clone)]
pub struct ParticleSystem<P> {
    particles: Vec<P>,
    capacity: usize,
    /// Spawns refused because the collection was full
    dropped: u64,
}

impl<P: Particle> ParticleSystem<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(1024)),
            capacity,
            dropped: 0,
        }
    }

    /// Add one particle. Returns false when the collection is full.
    pub fn spawn(&mut self, particle: P) -> bool {
        if self.particles.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Add a finite burst, up to the cap. Returns how many were added.
    pub fn burst(&mut self, particles: impl IntoIterator<Item = P>) -> usize {
        let mut added = 0;
        for p in particles {
            if !self.spawn(p) {
                break;
            }
            added += 1;
        }
        if self.dropped > 0 {
            trace!(added, dropped = self.dropped, "particle burst capped");
        }
        added
    }

    /// Advance every particle, then retire the expired ones
    pub fn update(&mut self, dt: Duration, bounds: Size2D) {
        for i in (0..self.particles.len()).rev() {
            self.particles[i].update(dt, bounds);
            if self.particles[i].is_expired(bounds) {
                self.particles.swap_remove(i);
            }
        }
    }

    pub fn render(&self, scene: &mut Scene) {
        for p in &self.particles {
            p.render(scene);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.dropped = 0;
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.particles.iter()
    }
}

/// Rising spark behind the growing tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub position: Point2D,
    /// Pixels per reference frame
    pub velocity: Point2D,
    /// 255 at birth, 4 less per reference frame
    pub life: f32,
}

impl Spark {
    const LIFE: f32 = 255.0;
    const DECAY: f32 = 4.0;

    /// New spark at the bottom center heading upward (-60° to -120°)
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: Size2D) -> Self {
        let angle = rng.gen_range(-2.0 * PI / 3.0..=-PI / 3.0);
        let speed = rng.gen_range(0.5f32..=1.5);
        Self {
            position: Point2D::new(bounds.width / 2.0, bounds.height),
            velocity: Point2D::new(angle.cos() * speed, angle.sin() * speed),
            life: Self::LIFE,
        }
    }
}

impl Particle for Spark {
    fn update(&mut self, dt: Duration, _bounds: Size2D) {
        let f = frames(dt);
        self.position = self.position.offset(self.velocity.x * f, self.velocity.y * f);
        self.life -= Self::DECAY * f;
    }

    fn is_expired(&self, _bounds: Size2D) -> bool {
        self.life <= 0.0
    }

    fn render(&self, scene: &mut Scene) {
        let life = self.life.clamp(0.0, Self::LIFE);
        let d = map_range(life, 0.0, Self::LIFE, 4.0, 8.0);
        scene.dot(self.position, d, Color::gray(0.5).with_alpha(life / Self::LIFE));
    }
}

/// Falling confetti piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confetto {
    pub position: Point2D,
    pub size: f32,
    pub color: Color,
    /// Pixels per reference frame
    pub speed: f32,
    pub rotation: f32,
    /// Radians per reference frame
    pub spin: f32,
}

impl Confetto {
    /// New piece just above the top edge at a random x
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: Size2D) -> Self {
        Self {
            position: Point2D::new(rng.gen_range(0.0..=bounds.width.max(0.0)), -10.0),
            size: rng.gen_range(5.0f32..=15.0),
            color: Color::from_hsb(rng.gen_range(0.0f32..360.0), 0.8, 1.0),
            speed: rng.gen_range(2.0f32..=5.0),
            rotation: rng.gen_range(0.0f32..TAU),
            spin: rng.gen_range(-0.1f32..=0.1),
        }
    }

    /// A full burst
    pub fn burst<R: Rng + ?Sized>(rng: &mut R, bounds: Size2D) -> Vec<Self> {
        (0..CONFETTI_BURST).map(|_| Self::spawn(rng, bounds)).collect()
    }
}

impl Particle for Confetto {
    fn update(&mut self, dt: Duration, _bounds: Size2D) {
        let f = frames(dt);
        self.position.y += self.speed * f;
        self.rotation += self.spin * f;
    }

    fn is_expired(&self, bounds: Size2D) -> bool {
        self.position.y > bounds.height + 20.0
    }

    fn render(&self, scene: &mut Scene) {
        // size × 0.4 strip anchored at its corner, rotated about it
        let (s, c) = self.rotation.sin_cos();
        let w = self.size;
        let h = self.size * 0.4;
        let corner = |x: f32, y: f32| self.position.offset(x * c - y * s, x * s + y * c);
        scene.push(Primitive::Polygon {
            points: vec![corner(0.0, 0.0), corner(w, 0.0), corner(w, h), corner(0.0, h)],
            fill: self.color,
            stroke: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn bounds() -> Size2D {
        Size2D::new(800.0, 600.0)
    }

    #[test]
    fn test_spark_rises_and_expires() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut system = ParticleSystem::new(100);
        system.spawn(Spark::spawn(&mut rng, bounds()));

        system.update(FRAME, bounds());
        let spark = system.iter().next().unwrap();
        assert!(spark.position.y < bounds().height);
        assert!(spark.life < 255.0);

        // 255 / 4 ≈ 64 reference frames
        for _ in 0..70 {
            system.update(FRAME, bounds());
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_spark_heading_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let s = Spark::spawn(&mut rng, bounds());
            let speed = (s.velocity.x.powi(2) + s.velocity.y.powi(2)).sqrt();
            assert!(s.velocity.y < 0.0);
            assert!((0.5 - 1e-4..=1.5 + 1e-4).contains(&speed));
        }
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut system = ParticleSystem::new(150);
        let added = system.burst(Confetto::burst(&mut rng, bounds()));
        assert_eq!(added, 150);
        assert_eq!(system.len(), 150);
        assert!(system.dropped() > 0);
    }

    #[test]
    fn test_confetti_falls_out_of_view() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut system = ParticleSystem::new(400);
        assert_eq!(system.burst(Confetto::burst(&mut rng, bounds())), CONFETTI_BURST);

        // Slowest piece needs (600 + 30) / 2 = 315 reference frames
        for _ in 0..320 {
            system.update(FRAME, bounds());
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_motion_scales_with_dt() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut a = Confetto::spawn(&mut rng, bounds());
        let mut b = a;
        a.update(Duration::from_millis(1000), bounds());
        for _ in 0..60 {
            b.update(Duration::from_micros(16_667), bounds());
        }
        assert!((a.position.y - b.position.y).abs() < 0.1);
    }

    #[test]
    fn test_clear() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut system = ParticleSystem::new(10);
        system.spawn(Spark::spawn(&mut rng, bounds()));
        system.clear();
        assert!(system.is_empty());
    }
}
