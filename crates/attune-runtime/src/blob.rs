//! Blob character: sulks when ignored, celebrates long gazes

use attune_core::{AttuneResult, Point2D, SessionTime, Size2D};
use attune_sense::RegionLayout;
use attune_state::{mood_cycle, Automaton, Celebration, Cue, Mood, MoodCycleConfig};
use attune_visual::{BlobDriver, BlobTargets, BlobView, Color, Confetto, ParticleSystem, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Character, CharacterSnapshot, CharacterStep, FrameContext, RenderContext};

/// Blob character configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobConfig {
    pub cycle: MoodCycleConfig,
    pub region: RegionLayout,
    pub seed: u64,
    pub confetti_cap: usize,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            cycle: MoodCycleConfig::default(),
            region: RegionLayout::Centered {
                half_width: 0.2,
                half_height: 0.2,
            },
            seed: 0xB10B,
            confetti_cap: 400,
        }
    }
}

impl BlobConfig {
    pub fn validate(&self) -> AttuneResult<()> {
        self.region.validate()?;
        mood_cycle(&self.cycle).validate()
    }
}

pub struct BlobCharacter {
    config: BlobConfig,
    automaton: Automaton<Mood>,
    driver: BlobDriver,
    confetti: ParticleSystem<Confetto>,
    rng: StdRng,
    bouncing: bool,
}

impl BlobCharacter {
    pub fn new(config: BlobConfig) -> AttuneResult<Self> {
        config.region.validate()?;
        let automaton = Automaton::new(mood_cycle(&config.cycle))?;
        Ok(Self {
            driver: BlobDriver::new(config.seed),
            confetti: ParticleSystem::new(config.confetti_cap),
            rng: StdRng::seed_from_u64(config.seed),
            bouncing: false,
            automaton,
            config,
        })
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    pub fn driver(&self) -> &BlobDriver {
        &self.driver
    }

    pub fn confetti(&self) -> &ParticleSystem<Confetto> {
        &self.confetti
    }

    pub fn is_bouncing(&self) -> bool {
        self.bouncing
    }
}

impl Character for BlobCharacter {
    type State = Mood;

    fn name(&self) -> &'static str {
        "blob"
    }

    fn seed(&self) -> u64 {
        self.config.seed
    }

    fn region(&self) -> RegionLayout {
        self.config.region
    }

    fn step(&mut self, ctx: &FrameContext) -> CharacterStep {
        let centered = ctx.engagement.centered;
        let step = self.automaton.step(centered, ctx.dt);

        // Bounce lasts only while the gaze does
        if !centered || step.transition.is_some() {
            self.bouncing = false;
        }

        let targets = BlobTargets::for_mood(
            self.automaton.state(),
            self.automaton.engaged_streak(),
            self.automaton.state_elapsed(),
            self.config.cycle.respawn,
        );
        self.driver.update(&targets, ctx.mouth_openness, ctx.dt);
        self.confetti.update(ctx.dt, ctx.viewport);

        CharacterStep {
            fired: step.fired,
            transitioned: step.transition.is_some(),
            completed: step.completed,
        }
    }

    fn click(&mut self, _at: Point2D, _now: SessionTime) -> Option<Cue> {
        None
    }

    fn apply_cue(&mut self, cue: &Cue, viewport: Size2D) {
        match cue {
            Cue::Celebrate(Celebration::Confetti) => {
                let added = self.confetti.burst(Confetto::burst(&mut self.rng, viewport));
                debug!(added, "confetti");
            }
            Cue::Celebrate(Celebration::Bounce) => self.bouncing = true,
            Cue::Chat(_) | Cue::Sound(_) => {}
        }
    }

    fn render(&mut self, ctx: &RenderContext, scene: &mut Scene) {
        scene.fill_rect(ctx.viewport.bounds(), Color::gray(220.0 / 255.0));
        let view = BlobView {
            mood: self.automaton.state(),
            centered: ctx.engagement.centered,
            streak: self.automaton.engaged_streak(),
            in_state: self.automaton.state_elapsed(),
            respawn: self.config.cycle.respawn,
            bouncing: self.bouncing,
            elapsed: ctx.now.as_secs_f32(),
            mouth_openness: self.driver.mouth,
            nose: ctx.engagement.display_position,
        };
        self.driver.render(&view, scene);
        self.confetti.render(scene);
    }

    fn reset(&mut self, seed: u64) {
        self.automaton.reset();
        self.driver.reset(seed);
        self.confetti.clear();
        self.rng = StdRng::seed_from_u64(seed);
        self.bouncing = false;
    }

    fn automaton(&self) -> &Automaton<Mood> {
        &self.automaton
    }

    fn snapshot(&self) -> CharacterSnapshot<Mood> {
        CharacterSnapshot {
            automaton: self.automaton.snapshot(),
            particles: self.confetti.len(),
            celebrating: self.bouncing,
        }
    }
}
