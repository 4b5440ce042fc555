//! Character - what a session drives
//!
//! A character bundles an automaton preset, its animation driver and its
//! particles. The session owns time, input and lifecycle; the character
//! only ever sees one frame at a time.

use std::fmt::Debug;
use std::time::Duration;

use attune_core::{Point2D, Rect, SessionTime, Size2D};
use attune_sense::{Engagement, RegionLayout};
use attune_state::{Automaton, AutomatonSnapshot, Cue, FiredMilestone};
use attune_visual::{render_loading, Scene};

/// Inputs for one simulation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub now: SessionTime,
    pub dt: Duration,
    pub viewport: Size2D,
    pub engagement: Engagement,
    pub mouth_openness: f32,
}

/// Inputs for one scene projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub now: SessionTime,
    pub viewport: Size2D,
    pub region: Rect,
    pub engagement: Engagement,
}

/// What a character did this frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterStep {
    pub fired: Vec<FiredMilestone>,
    pub transitioned: bool,
    /// The cycle reached its natural end
    pub completed: bool,
}

/// Observable character state, for comparison against a fresh character
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSnapshot<S> {
    pub automaton: AutomatonSnapshot<S>,
    pub particles: usize,
    /// A celebration animation is running
    pub celebrating: bool,
}

/// A character the session can drive
pub trait Character {
    type State: Copy + PartialEq + Debug;

    fn name(&self) -> &'static str;

    /// Configured seed; a retry reseeds from it and the new generation
    fn seed(&self) -> u64;

    /// Where the subject must look, resolved against the viewport every frame
    fn region(&self) -> RegionLayout;

    fn step(&mut self, ctx: &FrameContext) -> CharacterStep;

    /// A click while the session is active. May answer with a cue.
    fn click(&mut self, at: Point2D, now: SessionTime) -> Option<Cue>;

    /// React to a delivered cue (celebrations)
    fn apply_cue(&mut self, cue: &Cue, viewport: Size2D);

    fn render(&mut self, ctx: &RenderContext, scene: &mut Scene);

    /// Shown while the landmark source is still loading
    fn render_loading(&mut self, _ctx: &RenderContext, scene: &mut Scene) {
        render_loading(scene);
    }

    /// Back to a freshly constructed character, regenerating randomness from `seed`
    fn reset(&mut self, seed: u64);

    fn automaton(&self) -> &Automaton<Self::State>;

    fn snapshot(&self) -> CharacterSnapshot<Self::State>;
}
