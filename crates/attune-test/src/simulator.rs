//! Frame Simulator - deterministic session runs against a gaze script
//!
//! Drives a real `Session` with a fixed frame delta, feeding landmarks at
//! the feed model's cadence, and records what the automaton did on every
//! frame so runs can be checked against the engine's invariants.

use std::fmt::Debug;
use std::time::Duration;

use attune_core::{AttuneResult, LandmarkUpdate, SessionTime};
use attune_runtime::{Character, EndReason, FrameReport, RecordingSink, Session};
use attune_state::{Automaton, Cue};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{FeedModel, GazeScript};

/// 60 Hz frame delta
pub const SIXTY_HZ: Duration = Duration::from_micros(16_667);

/// Session driver with a scripted subject
pub struct FrameSimulator<C: Character> {
    session: Session<C>,
    sink: RecordingSink,
    frame: Duration,
    feed: FeedModel,
    /// Feed noise
    rng: StdRng,
}

impl<C: Character> FrameSimulator<C> {
    /// The simulated tracker is loaded from the start
    pub fn new(mut session: Session<C>, frame: Duration, feed: FeedModel, seed: u64) -> Self {
        session.deliver(LandmarkUpdate::Ready);
        Self {
            session,
            sink: RecordingSink::new(),
            frame: frame.max(Duration::from_millis(1)),
            feed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Run until the script ends or the session does
    pub fn run(&mut self, script: &GazeScript) -> SimulationResult<C::State> {
        let mut result = SimulationResult::new();
        let mut t = Duration::ZERO;
        let mut last_delivery: Option<Duration> = None;

        while let Some(gaze) = script.at(t) {
            if !self.session.is_active() {
                break;
            }

            // Deliver at the tracker's cadence; the latch holds the rest
            let due = last_delivery.map_or(true, |last| t - last >= self.feed.interval);
            if due {
                let update = self.feed.landmark(gaze, self.session.viewport(), &mut self.rng);
                self.session.deliver(update);
                last_delivery = Some(t);
            }

            let before = self.session.character().automaton().transitions();
            let report = self.session.tick(self.frame, &mut self.sink);
            result.record(&report, self.session.character().automaton(), before);

            t += self.frame;
        }

        result
    }

    /// Retry the underlying session
    pub fn retry(&mut self) -> AttuneResult<()> {
        self.session.retry()
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<C> {
        &mut self.session
    }

    /// Every cue delivered so far, across runs
    pub fn sink(&self) -> &RecordingSink {
        &self.sink
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }
}

/// What one run observed
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult<S> {
    pub total_frames: u64,
    /// Frames the character was actually stepped
    pub stepped_frames: u64,
    pub engaged_frames: u64,
    /// Automaton state after each stepped frame
    pub timeline: Vec<S>,
    pub transitions: u64,
    pub max_transitions_per_frame: u64,
    pub growth_min: f32,
    pub growth_max: f32,
    /// Frames where the dwell accumulator exceeded its state duration
    pub dwell_overruns: u64,
    pub cues: Vec<(SessionTime, Cue)>,
    pub ended: Option<EndReason>,
    pub ended_at: Option<SessionTime>,
}

impl<S: Copy + PartialEq + Debug> SimulationResult<S> {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            stepped_frames: 0,
            engaged_frames: 0,
            timeline: Vec::new(),
            transitions: 0,
            max_transitions_per_frame: 0,
            growth_min: 1.0,
            growth_max: 0.0,
            dwell_overruns: 0,
            cues: Vec::new(),
            ended: None,
            ended_at: None,
        }
    }

    fn record(&mut self, report: &FrameReport, automaton: &Automaton<S>, transitions_before: u64) {
        self.total_frames += 1;
        self.cues
            .extend(report.cues.iter().map(|cue| (report.now, cue.clone())));
        if let Some(reason) = report.ended {
            self.ended = Some(reason);
            self.ended_at = Some(report.now);
        }
        if !report.stepped {
            return;
        }

        self.stepped_frames += 1;
        if report.centered {
            self.engaged_frames += 1;
        }
        let transitions = automaton.transitions() - transitions_before;
        self.transitions += transitions;
        self.max_transitions_per_frame = self.max_transitions_per_frame.max(transitions);

        let growth = automaton.growth();
        self.growth_min = self.growth_min.min(growth);
        self.growth_max = self.growth_max.max(growth);
        if automaton.dwell() > automaton.duration() {
            self.dwell_overruns += 1;
        }
        self.timeline.push(automaton.state());
    }

    /// Chat messages in delivery order
    pub fn chats(&self) -> Vec<&str> {
        self.cues
            .iter()
            .filter_map(|(_, cue)| match cue {
                Cue::Chat(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count_cue(&self, cue: &Cue) -> usize {
        self.cues.iter().filter(|(_, c)| c == cue).count()
    }

    pub fn visited(&self, state: S) -> bool {
        self.timeline.contains(&state)
    }

    pub fn final_state(&self) -> Option<S> {
        self.timeline.last().copied()
    }

    /// Broken engine invariants, empty when the run was sound
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.stepped_frames > 0 && (self.growth_min < 0.0 || self.growth_max > 1.0) {
            violations.push(format!(
                "growth left [0, 1]: min {} max {}",
                self.growth_min, self.growth_max
            ));
        }
        if self.dwell_overruns > 0 {
            violations.push(format!("dwell exceeded its duration on {} frames", self.dwell_overruns));
        }
        if self.max_transitions_per_frame > 1 {
            violations.push(format!(
                "{} transitions in a single frame",
                self.max_transitions_per_frame
            ));
        }
        violations
    }
}

impl<S: Copy + PartialEq + Debug> Default for SimulationResult<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Predefined characters and scripts
pub mod scenarios {
    use super::*;
    use attune_core::Size2D;
    use attune_runtime::{BlobCharacter, BlobConfig, SessionConfig, TreeCharacter, TreeConfig};

    pub fn viewport() -> Size2D {
        Size2D::new(800.0, 600.0)
    }

    /// Tree session at 60 Hz with a perfect 30 Hz feed
    pub fn tree(config: TreeConfig) -> AttuneResult<FrameSimulator<TreeCharacter>> {
        let tree = TreeCharacter::new(config)?;
        let session = Session::new(tree, SessionConfig::tree(), viewport())?;
        Ok(FrameSimulator::new(session, SIXTY_HZ, FeedModel::perfect(), 1))
    }

    /// Blob session at 60 Hz with a perfect 30 Hz feed
    pub fn blob(config: BlobConfig) -> AttuneResult<FrameSimulator<BlobCharacter>> {
        let blob = BlobCharacter::new(config)?;
        let session = Session::new(blob, SessionConfig::blob(), viewport())?;
        Ok(FrameSimulator::new(session, SIXTY_HZ, FeedModel::perfect(), 2))
    }

    /// Unbroken attention
    pub fn full_attention(duration: Duration) -> GazeScript {
        GazeScript::new().centered(duration)
    }

    /// Attention toggling on and off at a fixed rhythm
    pub fn distracted(on: Duration, off: Duration, total: Duration) -> GazeScript {
        let period = on + off;
        let cycles = (total.as_micros() / period.as_micros().max(1)) as usize;
        GazeScript::new().centered(on).away(off).repeat(cycles.max(1))
    }

    /// Face visible, looking elsewhere
    pub fn ignored(duration: Duration) -> GazeScript {
        GazeScript::new().away(duration)
    }

    /// Subject walked away from the camera
    pub fn vanished(duration: Duration) -> GazeScript {
        GazeScript::new().no_face(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::scenarios::*;
    use super::*;
    use attune_runtime::{BlobConfig, TreeConfig};
    use attune_state::{Celebration, GrowthStage, Mood, Sound};
    use proptest::prelude::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_tree_full_attention_completes() {
        let mut sim = tree(TreeConfig::quick()).unwrap();
        let result = sim.run(&full_attention(secs(20)));

        assert_eq!(result.ended, Some(EndReason::Completed));
        assert!(result.visited(GrowthStage::Flowering));
        assert!(result.visited(GrowthStage::Shy));
        assert_eq!(result.transitions, 2);
        let chats = result.chats();
        assert!(chats.contains(&"You're so sweet! You are so caring!"));
        assert!(chats.contains(&"I want to hide!!!"));
        assert!(result.violations().is_empty(), "{:?}", result.violations());

        // Completion freezes the session: the rest of the script is skipped
        let ended_at = result.ended_at.unwrap();
        assert!(ended_at < SessionTime::from_millis(17_000));
    }

    #[test]
    fn test_tree_distracted_never_completes() {
        let mut sim = tree(TreeConfig::quick()).unwrap();
        let result = sim.run(&distracted(secs(1), secs(1), secs(60)));

        // Equal on and off periods: Growing's dwell erodes as fast as it builds
        assert_eq!(result.ended, None);
        assert!(!result.visited(GrowthStage::Flowering));
        assert_eq!(result.transitions, 0);
        assert!(result.violations().is_empty(), "{:?}", result.violations());
    }

    #[test]
    fn test_tree_survives_noisy_feed() {
        let tree = attune_runtime::TreeCharacter::new(TreeConfig::quick()).unwrap();
        let session =
            Session::new(tree, attune_runtime::SessionConfig::tree(), viewport()).unwrap();
        let mut sim = FrameSimulator::new(session, SIXTY_HZ, FeedModel::noisy(), 11);

        let result = sim.run(&full_attention(secs(20)));
        assert_eq!(result.ended, Some(EndReason::Completed));
        assert_eq!(result.engaged_frames, result.stepped_frames);
    }

    #[test]
    fn test_blob_ignored_runs_the_mood_cycle() {
        let mut sim = blob(BlobConfig::default()).unwrap();
        let result = sim.run(&ignored(secs(20)));

        assert_eq!(result.ended, None);
        for mood in [Mood::Looming, Mood::FadeOut, Mood::Respawning] {
            assert!(result.visited(mood), "{mood:?} never reached");
        }
        assert_eq!(result.count_cue(&Cue::Sound(Sound::Scream)), 1);
        assert!(result.violations().is_empty(), "{:?}", result.violations());
    }

    #[test]
    fn test_blob_devotion() {
        let mut sim = blob(BlobConfig::default()).unwrap();
        let result = sim.run(&full_attention(secs(40)));

        assert!(result.timeline.iter().all(|m| *m == Mood::Calm));
        assert_eq!(
            result.chats(),
            vec![
                "😊 I'm feeling bright!",
                "💙 So cool and calm...",
                "🌟 You're my favorite human!"
            ]
        );
        assert_eq!(result.count_cue(&Cue::Celebrate(Celebration::Confetti)), 1);
        assert_eq!(result.count_cue(&Cue::Celebrate(Celebration::Bounce)), 1);
    }

    #[test]
    fn test_blob_vanished_signal_lost() {
        let mut sim = blob(BlobConfig::default()).unwrap();
        let result = sim.run(&vanished(secs(35)));

        assert_eq!(result.ended, Some(EndReason::SignalLost));
        let at = result.ended_at.unwrap();
        assert!(at > SessionTime::from_millis(30_000));
        assert!(at < SessionTime::from_millis(30_100));
    }

    #[test]
    fn test_retry_replays_identically() {
        let mut sim = tree(TreeConfig::quick()).unwrap();
        let first = sim.run(&full_attention(secs(20)));
        sim.retry().unwrap();
        let second = sim.run(&full_attention(secs(20)));

        assert_eq!(first.chats(), second.chats());
        assert_eq!(first.timeline, second.timeline);
        assert_eq!(first.ended_at, second.ended_at);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_tree_invariants_hold(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let script = GazeScript::random(&mut rng, secs(20), Duration::from_millis(3000));
            let mut sim = tree(TreeConfig::quick()).unwrap();
            let result = sim.run(&script);
            prop_assert!(result.violations().is_empty(), "{:?}", result.violations());
        }

        #[test]
        fn prop_blob_invariants_hold(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let script = GazeScript::random(&mut rng, secs(20), Duration::from_millis(3000));
            let mut sim = blob(BlobConfig::default()).unwrap();
            let result = sim.run(&script);
            prop_assert!(result.violations().is_empty(), "{:?}", result.violations());
            prop_assert!(result.ended.is_none());
        }
    }
}
