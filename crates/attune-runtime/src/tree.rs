//! Tree character: grows while watched, flowers, then turns shy

use attune_core::{AttuneResult, Point2D, SessionTime, Size2D};
use attune_sense::RegionLayout;
use attune_state::{growth_cycle, Automaton, Cue, GrowthCycleConfig, GrowthStage, Signal};
use attune_visual::{render_loading, render_sky, ParticleSystem, Scene, Spark, TreeDriver, TreeView};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Character, CharacterSnapshot, CharacterStep, FrameContext, RenderContext};

/// Growth below which a bloom request is refused while growing
pub const BLOOM_READY_AT: f32 = 0.6;
pub const BLOOM_TOO_EARLY: &str = "You might need to wait for me grow even more.";

/// Tree character configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub cycle: GrowthCycleConfig,
    pub region: RegionLayout,
    pub seed: u64,
    pub spark_cap: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            cycle: GrowthCycleConfig::default(),
            region: RegionLayout::Margin { margin: 0.43 },
            seed: 0x7EE,
            spark_cap: 512,
        }
    }
}

impl TreeConfig {
    /// Short stages for demos and tests
    pub fn quick() -> Self {
        Self {
            cycle: GrowthCycleConfig::quick(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> AttuneResult<()> {
        self.region.validate()?;
        growth_cycle(&self.cycle).validate()
    }
}

pub struct TreeCharacter {
    config: TreeConfig,
    automaton: Automaton<GrowthStage>,
    driver: TreeDriver,
    sparks: ParticleSystem<Spark>,
    rng: StdRng,
}

impl TreeCharacter {
    pub fn new(config: TreeConfig) -> AttuneResult<Self> {
        config.region.validate()?;
        let automaton = Automaton::new(growth_cycle(&config.cycle))?;
        Ok(Self {
            driver: TreeDriver::new(config.seed),
            sparks: ParticleSystem::new(config.spark_cap),
            rng: StdRng::seed_from_u64(config.seed),
            automaton,
            config,
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn driver(&self) -> &TreeDriver {
        &self.driver
    }

    pub fn sparks(&self) -> &ParticleSystem<Spark> {
        &self.sparks
    }

    fn view(&self, ctx: &RenderContext) -> TreeView {
        TreeView {
            stage: self.automaton.state(),
            growth: self.automaton.growth(),
            progress: self.automaton.progress(),
            elapsed: ctx.now.as_secs_f32(),
            bloom: self.automaton.signals().contains(Signal::Bloom),
            region: ctx.region,
            nose: ctx.engagement.display_position,
            centered: ctx.engagement.centered,
        }
    }
}

impl Character for TreeCharacter {
    type State = GrowthStage;

    fn name(&self) -> &'static str {
        "tree"
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

        self.sparks.update(ctx.dt, ctx.viewport);
        if centered && self.automaton.state() == GrowthStage::Growing {
            self.sparks.spawn(Spark::spawn(&mut self.rng, ctx.viewport));
        }

        CharacterStep {
            fired: step.fired,
            transitioned: step.transition.is_some(),
            completed: step.completed,
        }
    }

    fn click(&mut self, _at: Point2D, _now: SessionTime) -> Option<Cue> {
        if self.automaton.state() == GrowthStage::Growing && self.automaton.growth() < BLOOM_READY_AT {
            return Some(Cue::chat(BLOOM_TOO_EARLY));
        }
        if self.automaton.raise(Signal::Bloom) {
            debug!(growth = self.automaton.growth(), "bloom requested");
        }
        None
    }

    fn apply_cue(&mut self, _cue: &Cue, _viewport: Size2D) {}

    fn render(&mut self, ctx: &RenderContext, scene: &mut Scene) {
        let view = self.view(ctx);
        TreeDriver::render_backdrop(&view, scene);
        self.sparks.render(scene);
        self.driver.render_tree(&view, scene);
        TreeDriver::render_hud(&view, scene);
    }

    fn render_loading(&mut self, _ctx: &RenderContext, scene: &mut Scene) {
        render_sky(scene);
        render_loading(scene);
    }

    fn reset(&mut self, seed: u64) {
        self.automaton.reset();
        self.driver.regenerate(seed);
        self.sparks.clear();
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn automaton(&self) -> &Automaton<GrowthStage> {
        &self.automaton
    }

    fn snapshot(&self) -> CharacterSnapshot<GrowthStage> {
        CharacterSnapshot {
            automaton: self.automaton.snapshot(),
            particles: self.sparks.len(),
            celebrating: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::Rect;
    use attune_sense::Engagement;
    use attune_visual::{LOADING_TEXT, NOSE_PROMPT};
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(20);

    fn viewport() -> Size2D {
        Size2D::new(800.0, 600.0)
    }

    fn frame(centered: bool) -> FrameContext {
        FrameContext {
            now: SessionTime::ZERO,
            dt: FRAME,
            viewport: viewport(),
            engagement: Engagement {
                centered,
                display_position: Some(viewport().center()),
            },
            mouth_openness: 0.0,
        }
    }

    fn run(tree: &mut TreeCharacter, centered: bool, secs: f32) -> Vec<String> {
        let mut names = Vec::new();
        for _ in 0..(secs / FRAME.as_secs_f32()).round() as usize {
            let step = tree.step(&frame(centered));
            names.extend(step.fired.into_iter().map(|f| f.name.to_string()));
        }
        names
    }

    #[test]
    fn test_early_click_is_refused() {
        let mut tree = TreeCharacter::new(TreeConfig::quick()).unwrap();
        run(&mut tree, true, 2.0);
        assert_eq!(tree.click(Point2D::ORIGIN, SessionTime::ZERO), Some(Cue::chat(BLOOM_TOO_EARLY)));
        assert!(!tree.automaton().signals().contains(Signal::Bloom));
    }

    #[test]
    fn test_click_blooms_when_grown() {
        let mut tree = TreeCharacter::new(TreeConfig::quick()).unwrap();
        // 5 of 8 seconds
        run(&mut tree, true, 5.0);
        assert!(tree.automaton().growth() >= BLOOM_READY_AT);

        assert_eq!(tree.click(Point2D::ORIGIN, SessionTime::ZERO), None);
        let fired = run(&mut tree, true, 0.02);
        assert_eq!(fired, vec!["bloomed".to_string()]);

        // A second click changes nothing
        assert_eq!(tree.click(Point2D::ORIGIN, SessionTime::ZERO), None);
        assert!(run(&mut tree, true, 0.02).is_empty());
    }

    #[test]
    fn test_sparks_only_while_engaged_and_growing() {
        let mut tree = TreeCharacter::new(TreeConfig::quick()).unwrap();
        run(&mut tree, false, 0.5);
        assert!(tree.sparks().is_empty());

        run(&mut tree, true, 0.5);
        assert!(!tree.sparks().is_empty());

        // Into Flowering, then the sparks die out
        run(&mut tree, true, 8.0);
        assert_eq!(tree.automaton().state(), GrowthStage::Flowering);
        run(&mut tree, true, 2.0);
        assert!(tree.sparks().is_empty());
    }

    #[test]
    fn test_reset_matches_fresh() {
        let fresh = TreeCharacter::new(TreeConfig::quick()).unwrap();
        let mut tree = TreeCharacter::new(TreeConfig::quick()).unwrap();
        run(&mut tree, true, 10.0);
        tree.click(Point2D::ORIGIN, SessionTime::ZERO);
        assert_ne!(tree.snapshot(), fresh.snapshot());

        tree.reset(99);
        assert_eq!(tree.snapshot(), fresh.snapshot());
    }

    #[test]
    fn test_render_layers() {
        let mut tree = TreeCharacter::new(TreeConfig::quick()).unwrap();
        let ctx = RenderContext {
            now: SessionTime::from_millis(5000),
            viewport: viewport(),
            region: Rect::new(344.0, 258.0, 112.0, 84.0),
            engagement: Engagement {
                centered: false,
                display_position: None,
            },
        };
        let mut scene = Scene::new(viewport());
        tree.render(&ctx, &mut scene);
        assert!(scene.has_text(NOSE_PROMPT));

        let mut loading = Scene::new(viewport());
        tree.render_loading(&ctx, &mut loading);
        assert!(loading.has_text(LOADING_TEXT));
    }

    #[test]
    fn test_invalid_region_rejected() {
        let config = TreeConfig {
            region: RegionLayout::Margin { margin: 0.6 },
            ..TreeConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(TreeCharacter::new(config).is_err());
    }
}
