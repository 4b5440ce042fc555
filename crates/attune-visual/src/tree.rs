//! Tree driver - recursive growth structure
//!
//! The tree is rebuilt from scratch every frame as a pure function of
//! growth, elapsed time and the session's branch table. Each recursive call
//! receives an explicit `Frame2D` (origin + heading); there is no shared
//! transform stack, so a tree can be built and inspected without a surface.
//!
//! Staging: a node at depth d is revealed over `REVEAL_SECS` starting at
//! `d * REVEAL_SECS`, and only a fully revealed node has children.

use std::f32::consts::{FRAC_PI_4, PI};

use attune_core::{map_range, Frame2D, Point2D, Rect, Size2D};
use attune_state::GrowthStage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{palette, Color, Primitive, Scene, Stroke};

/// Trunk length in pixels
pub const INITIAL_LENGTH: f32 = 280.0;
/// Depth bound at full growth
pub const MAX_DEPTH: u8 = 7;
/// Reveal duration per level
pub const REVEAL_SECS: f32 = 0.6;
/// Child length relative to parent
pub const CHILD_SCALE: f32 = 0.7;
/// Leaves only from this depth on
pub const LEAF_MIN_DEPTH: u8 = 4;
pub const LEAF_MAX_SIZE: f32 = 40.0;
const LEAF_SIZE_FACTOR: f32 = 0.3;
const LEAF_OFFSETS: [f32; 3] = [0.25, 0.50, 0.75];
/// Flowers only on nodes deeper than this
const FLOWER_AFTER_DEPTH: u8 = 2;
const TRUNK_WIDTH_PER_GROWTH: f32 = 40.0;
const TWIG_WIDTH: f32 = 4.0;

/// Branch and leaf geometry for one depth level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelGeometry {
    /// Rotation of the first child (radians, clockwise)
    pub left: f32,
    /// Rotation of the second child (radians, counter-clockwise)
    pub right: f32,
    /// Leaf positions as fractions of the branch length
    pub leaf_offsets: [f32; 3],
    /// Leaf rotations relative to the branch
    pub leaf_angles: [f32; 3],
}

/// Per-depth geometry, generated once per session so the shape is stable
/// while it animates
#[derive(Debug, Clone, PartialEq)]
pub struct BranchTable {
    levels: Vec<LevelGeometry>,
}

impl BranchTable {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let levels = (0..=MAX_DEPTH)
            .map(|_| LevelGeometry {
                left: rng.gen_range(15.0f32..45.0).to_radians(),
                right: rng.gen_range(15.0f32..45.0).to_radians(),
                leaf_offsets: LEAF_OFFSETS,
                leaf_angles: [
                    rng.gen_range(-FRAC_PI_4..FRAC_PI_4),
                    rng.gen_range(-FRAC_PI_4..FRAC_PI_4),
                    rng.gen_range(-FRAC_PI_4..FRAC_PI_4),
                ],
            })
            .collect();
        Self { levels }
    }

    pub fn level(&self, depth: u8) -> Option<&LevelGeometry> {
        self.levels.get(depth as usize)
    }

    pub fn levels(&self) -> &[LevelGeometry] {
        &self.levels
    }
}

/// Inputs to one tree build
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Trunk base and heading
    pub root: Frame2D,
    pub growth: f32,
    /// Seconds since the session (or retry) started
    pub elapsed: f32,
    pub bloom: bool,
}

impl TreeParams {
    /// `floor(growth × MAX_DEPTH)`
    pub fn max_depth(&self) -> u8 {
        (self.growth.clamp(0.0, 1.0) * MAX_DEPTH as f32).floor() as u8
    }

    pub fn leaf_size(&self) -> f32 {
        (INITIAL_LENGTH * self.growth * LEAF_SIZE_FACTOR).min(LEAF_MAX_SIZE)
    }
}

/// A leaf pair attached to a branch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaf {
    /// Attach point and orientation; the pair spreads along local x
    pub frame: Frame2D,
    pub size: f32,
}

/// One branch of the built tree
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthNode {
    pub depth: u8,
    pub length: f32,
    /// Reveal progress in [0, 1]
    pub reveal: f32,
    pub base: Point2D,
    /// Drawn tip: `length × reveal` along the heading
    pub tip: Point2D,
    pub heading: f32,
    pub width: f32,
    pub color: Color,
    pub leaves: Vec<Leaf>,
    pub bloom: bool,
    pub children: Option<Box<[GrowthNode; 2]>>,
}

impl GrowthNode {
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map(|c| c[0].node_count() + c[1].node_count())
            .unwrap_or(0)
    }

    /// Deepest depth present
    pub fn depth_reached(&self) -> u8 {
        self.children
            .as_ref()
            .map(|c| c[0].depth_reached().max(c[1].depth_reached()))
            .unwrap_or(self.depth)
    }

    /// Visit every node, parents first
    pub fn visit<F: FnMut(&GrowthNode)>(&self, f: &mut F) {
        f(self);
        if let Some(children) = &self.children {
            children[0].visit(f);
            children[1].visit(f);
        }
    }

    pub fn render(&self, scene: &mut Scene, leaf_color: Color) {
        scene.segment(self.base, self.tip, self.width, self.color);

        for leaf in &self.leaves {
            let height = leaf.size * 0.6;
            for dx in [-leaf.size * 0.5, leaf.size * 0.5] {
                scene.push(Primitive::Ellipse {
                    center: leaf.frame.to_world(Point2D::new(dx, 0.0)),
                    width: leaf.size,
                    height,
                    rotation: leaf.frame.heading,
                    fill: leaf_color,
                });
            }
        }

        if self.bloom {
            render_flower(scene, Frame2D::new(self.tip, self.heading));
        }

        if let Some(children) = &self.children {
            children[0].render(scene, leaf_color);
            children[1].render(scene, leaf_color);
        }
    }
}

/// Eight petals around a center
fn render_flower(scene: &mut Scene, at: Frame2D) {
    let petal = Color::from_hsb(330.0, 0.8, 1.0);
    for i in 0..8 {
        let frame = at.rotated(i as f32 * PI / 4.0);
        scene.push(Primitive::Ellipse {
            center: frame.to_world(Point2D::new(0.0, -10.0)),
            width: 12.0,
            height: 24.0,
            rotation: frame.heading,
            fill: petal,
        });
    }
    scene.dot(at.origin, 16.0, Color::from_hsb(60.0, 1.0, 1.0));
}

/// Build the tree for this frame
pub fn build_tree(params: &TreeParams, table: &BranchTable) -> GrowthNode {
    grow(params, table, params.root, INITIAL_LENGTH, 0, params.max_depth())
}

fn grow(
    params: &TreeParams,
    table: &BranchTable,
    frame: Frame2D,
    length: f32,
    depth: u8,
    max_depth: u8,
) -> GrowthNode {
    let reveal = ((params.elapsed - depth as f32 * REVEAL_SECS) / REVEAL_SECS).clamp(0.0, 1.0);
    let shade = if max_depth == 0 {
        0.0
    } else {
        depth as f32 / max_depth as f32
    };

    let mut node = GrowthNode {
        depth,
        length,
        reveal,
        base: frame.origin,
        tip: frame.forward(length * reveal),
        heading: frame.heading,
        width: map_range(
            depth as f32,
            0.0,
            max_depth as f32,
            TRUNK_WIDTH_PER_GROWTH * params.growth,
            TWIG_WIDTH,
        ),
        color: palette::wood_base().lerp(&palette::wood_tip(), shade),
        leaves: Vec::new(),
        bloom: false,
        children: None,
    };

    if reveal < 1.0 {
        return node;
    }

    let level = table.level(depth);

    if depth >= LEAF_MIN_DEPTH {
        if let Some(level) = level {
            let size = params.leaf_size();
            node.leaves = level
                .leaf_offsets
                .iter()
                .zip(level.leaf_angles.iter())
                .map(|(offset, angle)| Leaf {
                    frame: frame.advanced(length * offset).rotated(*angle),
                    size,
                })
                .collect();
        }
    }

    node.bloom = params.bloom && depth > FLOWER_AFTER_DEPTH;

    if depth < max_depth {
        if let Some(level) = level {
            let tip = frame.advanced(length);
            let child_length = length * CHILD_SCALE;
            node.children = Some(Box::new([
                grow(params, table, tip.rotated(level.left), child_length, depth + 1, max_depth),
                grow(params, table, tip.rotated(-level.right), child_length, depth + 1, max_depth),
            ]));
        }
    }

    node
}

/// What the tree character shows this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeView {
    pub stage: GrowthStage,
    pub growth: f32,
    /// Dwell fraction of the current stage
    pub progress: f32,
    pub elapsed: f32,
    pub bloom: bool,
    pub region: Rect,
    pub nose: Option<Point2D>,
    pub centered: bool,
}

/// Procedural driver for the tree character
#[derive(Debug, Clone)]
pub struct TreeDriver {
    table: BranchTable,
    /// Shake noise
    rng: StdRng,
}

impl TreeDriver {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let table = BranchTable::generate(&mut rng);
        Self { table, rng }
    }

    /// New branch table (retry)
    pub fn regenerate(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    pub fn table(&self) -> &BranchTable {
        &self.table
    }

    /// Leaf color by stage: calm while growing, wilting across flowering
    pub fn leaf_color(stage: GrowthStage, progress: f32) -> Color {
        match stage {
            GrowthStage::Growing => palette::calm(),
            GrowthStage::Flowering => palette::calm().lerp(&palette::dead(), progress),
            GrowthStage::Shy => palette::dead(),
        }
    }

    pub fn bar_color(stage: GrowthStage) -> Color {
        match stage {
            GrowthStage::Growing => palette::calm(),
            GrowthStage::Flowering | GrowthStage::Shy => palette::alarm(),
        }
    }

    /// Shy trembles harder the longer it is watched
    pub fn shake_amplitude(stage: GrowthStage, progress: f32) -> f32 {
        match stage {
            GrowthStage::Shy => 5.0 * progress.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Build this frame's tree, rooted at the bottom center
    pub fn build(&mut self, view: &TreeView, viewport: Size2D) -> GrowthNode {
        let amplitude = Self::shake_amplitude(view.stage, view.progress);
        let mut root = Point2D::new(viewport.width / 2.0, viewport.height);
        if amplitude > 0.0 {
            root = root.offset(
                self.rng.gen_range(-amplitude..=amplitude),
                self.rng.gen_range(-amplitude..=amplitude),
            );
        }

        let params = TreeParams {
            root: Frame2D::new(root, 0.0),
            growth: view.growth,
            elapsed: view.elapsed,
            bloom: view.bloom,
        };
        build_tree(&params, &self.table)
    }

    /// Sky, clouds, detection region and nose marker
    pub fn render_backdrop(view: &TreeView, scene: &mut Scene) {
        render_sky(scene);

        scene.outline_rect(view.region, Stroke::new(Color::white().with_alpha(50.0 / 255.0), 1.0));
        if let Some(nose) = view.nose {
            scene.dot(nose, 12.0, palette::nose_marker());
        }
    }

    pub fn render_tree(&mut self, view: &TreeView, scene: &mut Scene) -> GrowthNode {
        let tree = self.build(view, scene.size);
        tree.render(scene, Self::leaf_color(view.stage, view.progress));
        tree
    }

    /// Prompt and per-stage progress bar
    pub fn render_hud(view: &TreeView, scene: &mut Scene) {
        let size = scene.size;
        if !view.centered {
            scene.text(view.region.center(), NOSE_PROMPT, 18.0, Color::white());
        }
        let width = map_range(view.progress, 0.0, 1.0, 0.0, size.width - 40.0).max(0.0);
        scene.fill_rect(
            Rect::new(20.0, size.height - 30.0, width, 16.0),
            Self::bar_color(view.stage),
        );
    }
}

/// Shown over the region while the nose is outside it
pub const NOSE_PROMPT: &str = "Center your nose here";

/// Sky gradient and four clouds
pub fn render_sky(scene: &mut Scene) {
    let size = scene.size;
    scene.push(Primitive::Gradient {
        rect: size.bounds(),
        from: Point2D::ORIGIN,
        to: Point2D::new(size.width, size.height),
        start: palette::sky_top(),
        end: palette::sky_bottom(),
        corner_radius: 0.0,
    });

    let cloud = Color::white().with_alpha(200.0 / 255.0);
    for (fx, fy) in [(0.08, 0.10), (0.20, 0.08), (0.35, 0.11), (0.60, 0.09)] {
        scene.ellipse(Point2D::new(size.width * fx, size.height * fy), 80.0, 50.0, cloud);
        scene.ellipse(
            Point2D::new(size.width * (fx + 0.03), size.height * (fy - 0.01)),
            100.0,
            60.0,
            cloud,
        );
        scene.ellipse(Point2D::new(size.width * (fx + 0.06), size.height * fy), 80.0, 50.0, cloud);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BranchTable {
        BranchTable::generate(&mut StdRng::seed_from_u64(7))
    }

    fn params(growth: f32, elapsed: f32) -> TreeParams {
        TreeParams {
            root: Frame2D::new(Point2D::new(500.0, 800.0), 0.0),
            growth,
            elapsed,
            bloom: false,
        }
    }

    #[test]
    fn test_table_ranges() {
        let t = table();
        assert_eq!(t.levels().len(), MAX_DEPTH as usize + 1);
        for level in t.levels() {
            assert!((15f32.to_radians()..=45f32.to_radians()).contains(&level.left));
            assert!((15f32.to_radians()..=45f32.to_radians()).contains(&level.right));
            assert!(level.leaf_angles.iter().all(|a| a.abs() <= FRAC_PI_4));
        }
    }

    #[test]
    fn test_full_growth_full_reveal_node_count() {
        let tree = build_tree(&params(1.0, 100.0), &table());
        assert_eq!(tree.depth_reached(), MAX_DEPTH);
        assert_eq!(tree.node_count(), 255);
    }

    #[test]
    fn test_depth_bound_follows_growth() {
        let tree = build_tree(&params(0.5, 100.0), &table());
        // floor(0.5 * 7) = 3
        assert_eq!(tree.depth_reached(), 3);
        assert_eq!(tree.node_count(), 15);
    }

    #[test]
    fn test_reveal_is_staged_by_depth() {
        // 0.9 s in: trunk revealed, first children half way
        let tree = build_tree(&params(1.0, 0.9), &table());
        assert_eq!(tree.reveal, 1.0);
        let children = tree.children.as_ref().unwrap();
        assert!((children[0].reveal - 0.5).abs() < 1e-4);
        assert!(children[0].children.is_none());
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_unrevealed_trunk_has_no_children() {
        let tree = build_tree(&params(1.0, 0.3), &table());
        assert!((tree.reveal - 0.5).abs() < 1e-4);
        assert!(tree.children.is_none());
        // Drawn tip is half the trunk
        assert!((tree.base.distance(&tree.tip) - INITIAL_LENGTH * 0.5).abs() < 1e-2);
    }

    #[test]
    fn test_zero_growth_is_a_bare_stem() {
        let tree = build_tree(&params(0.0, 10.0), &table());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.width, 0.0);
        assert!(tree.width.is_finite());
    }

    #[test]
    fn test_leaves_and_flowers_depth_thresholds() {
        let mut p = params(1.0, 100.0);
        p.bloom = true;
        let tree = build_tree(&p, &table());
        tree.visit(&mut |node| {
            assert_eq!(node.leaves.is_empty(), node.depth < LEAF_MIN_DEPTH);
            assert_eq!(node.bloom, node.depth > 2);
            if let Some(leaf) = node.leaves.first() {
                assert_eq!(leaf.size, LEAF_MAX_SIZE);
            }
        });
    }

    #[test]
    fn test_width_tapers_to_twig() {
        let tree = build_tree(&params(1.0, 100.0), &table());
        assert!((tree.width - 40.0).abs() < 1e-4);
        tree.visit(&mut |node| {
            if node.depth == MAX_DEPTH {
                assert!((node.width - 4.0).abs() < 1e-4);
            }
        });
    }

    #[test]
    fn test_build_is_pure() {
        let t = table();
        let p = params(0.8, 3.3);
        assert_eq!(build_tree(&p, &t), build_tree(&p, &t));
    }

    #[test]
    fn test_shake_only_when_shy() {
        assert_eq!(TreeDriver::shake_amplitude(GrowthStage::Growing, 1.0), 0.0);
        assert_eq!(TreeDriver::shake_amplitude(GrowthStage::Shy, 0.5), 2.5);
    }

    #[test]
    fn test_regenerate_changes_table() {
        let mut driver = TreeDriver::new(1);
        let before = driver.table().clone();
        driver.regenerate(2);
        assert_ne!(driver.table(), &before);
        driver.regenerate(1);
        assert_eq!(driver.table(), &before);
    }

    proptest::proptest! {
        #[test]
        fn prop_node_count_bounded(growth in 0.0f32..=1.0, elapsed in 0.0f32..10.0) {
            let tree = build_tree(&params(growth, elapsed), &table());
            proptest::prop_assert!(tree.node_count() <= 255);
            proptest::prop_assert!(tree.depth_reached() <= MAX_DEPTH);
        }
    }
}
