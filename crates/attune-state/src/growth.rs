//! Growth cycle - the tree's three stages
//!
//! Growing → Flowering → Shy, forward only while engaged, eroding back on
//! disengagement. Completing Shy ends the session.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Completion, Cue, CycleConfig, ExitRule, GrowthProfile, MilestoneRule, ProgressRule, Signal,
    StateSpec, Trigger,
};

/// Tree stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthStage {
    Growing,
    Flowering,
    Shy,
}

/// Growth cycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthCycleConfig {
    pub growing: Duration,
    pub flowering: Duration,
    pub shy: Duration,
    /// Growing only completes once the user has asked for a bloom
    pub bloom_gates_advance: bool,
    /// Look-away time before growth starts decaying (default: `growing`)
    pub growth_grace: Option<Duration>,
    /// Delay between a stage's first message and its follow-up
    pub followup_delay: Duration,
}

impl Default for GrowthCycleConfig {
    fn default() -> Self {
        Self {
            growing: Duration::from_secs(40),
            flowering: Duration::from_secs(20),
            shy: Duration::from_secs(20),
            bloom_gates_advance: false,
            growth_grace: None,
            followup_delay: Duration::from_secs(6),
        }
    }
}

impl GrowthCycleConfig {
    /// Short stages for demos and tests
    pub fn quick() -> Self {
        Self {
            growing: Duration::from_secs(8),
            flowering: Duration::from_secs(4),
            shy: Duration::from_secs(4),
            followup_delay: Duration::from_secs(2),
            ..Self::default()
        }
    }
}

/// Build the growth cycle behavior table
pub fn growth_cycle(config: &GrowthCycleConfig) -> CycleConfig<GrowthStage> {
    let mut growing = StateSpec::new(GrowthStage::Growing, config.growing, ProgressRule::WhileEngaged)
        .growth(GrowthProfile::Accumulate {
            grace: config.growth_grace,
        });
    if config.bloom_gates_advance {
        growing = growing.gated_by(Signal::Bloom);
    }

    let states = vec![
        growing,
        StateSpec::new(GrowthStage::Flowering, config.flowering, ProgressRule::WhileEngaged)
            .exit(ExitRule::Erode)
            .growth(GrowthProfile::Hold(1.0)),
        StateSpec::new(GrowthStage::Shy, config.shy, ProgressRule::WhileEngaged)
            .exit(ExitRule::Erode)
            .growth(GrowthProfile::DrainWithDwell),
    ];

    CycleConfig::new(states, Completion::EndSession)
        .with_milestone(
            MilestoneRule::new(
                "growing",
                Trigger::GrowthAtLeast {
                    threshold: 0.3,
                    engaged: true,
                },
                Cue::chat("Yaaayyy!!! I am growing, thank you so much for giving me attention!!!"),
            )
            .in_state(GrowthStage::Growing),
        )
        .with_milestone(
            MilestoneRule::new(
                "bloom-hint",
                Trigger::GrowthAtLeast {
                    threshold: 0.6,
                    engaged: true,
                },
                Cue::chat("Click anywhere on the screen to make me bloom!!"),
            )
            .in_state(GrowthStage::Growing),
        )
        .with_milestone(
            MilestoneRule::new(
                "bloomed",
                Trigger::Signal(Signal::Bloom),
                Cue::chat("I am so happy, I bloomed!!"),
            )
            .in_state(GrowthStage::Growing),
        )
        .with_milestone(
            MilestoneRule::new("pretty", Trigger::InState, Cue::chat("I look so pretty!"))
                .in_state(GrowthStage::Flowering)
                .then_after(
                    config.followup_delay,
                    Cue::chat("You're so sweet! You are so caring!"),
                ),
        )
        .with_milestone(
            MilestoneRule::new(
                "shy",
                Trigger::InState,
                Cue::chat("Don't look at me for so long, I'm very shy!"),
            )
            .in_state(GrowthStage::Shy)
            .then_after(config.followup_delay, Cue::chat("I want to hide!!!")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Automaton, TransitionKind};

    const FRAME: Duration = Duration::from_millis(20);

    fn automaton() -> Automaton<GrowthStage> {
        Automaton::new(growth_cycle(&GrowthCycleConfig::default())).unwrap()
    }

    #[test]
    fn test_forty_seconds_engaged_leaves_growing_once() {
        let mut a = automaton();
        let mut transitions = Vec::new();

        for frame in 1..=2000 {
            let step = a.step(true, FRAME);
            if frame < 2000 {
                assert_eq!(a.state(), GrowthStage::Growing);
            }
            transitions.extend(step.transition);
            if frame == 1999 {
                assert!(a.growth() > 0.99);
            }
        }

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, GrowthStage::Growing);
        assert_eq!(transitions[0].to, GrowthStage::Flowering);
        assert_eq!(a.growth(), 1.0);
    }

    #[test]
    fn test_growth_messages_fire_once() {
        let mut a = automaton();
        let names: Vec<_> = (0..1500)
            .flat_map(|_| a.step(true, FRAME).fired)
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["growing", "bloom-hint"]);
    }

    #[test]
    fn test_flowering_schedules_followup() {
        let mut a = automaton();
        let fired: Vec<_> = (0..2001).flat_map(|_| a.step(true, FRAME).fired).collect();
        let pretty = fired.iter().find(|f| f.name == "pretty").unwrap();
        assert_eq!(
            pretty.followup.as_ref().map(|f| f.delay),
            Some(Duration::from_secs(6))
        );
    }

    #[test]
    fn test_shy_drains_growth_and_regresses() {
        let mut a = automaton();
        // 40 s + 20 s engaged: into Shy
        for _ in 0..3000 {
            a.step(true, FRAME);
        }
        assert_eq!(a.state(), GrowthStage::Shy);
        for _ in 0..500 {
            a.step(true, FRAME);
        }
        assert!((a.growth() - 0.5).abs() < 1e-3);

        // Erode Shy back to Flowering at full dwell
        let regress = (0..500)
            .filter_map(|_| a.step(false, FRAME).transition)
            .next()
            .unwrap();
        assert_eq!(regress.kind, TransitionKind::Regress);
        assert_eq!(a.state(), GrowthStage::Flowering);
        assert_eq!(a.dwell(), Duration::from_secs(20));
    }

    #[test]
    fn test_full_cycle_ends_session() {
        let mut a = automaton();
        let completed = (0..4000).any(|_| a.step(true, FRAME).completed);
        assert!(completed);
        assert_eq!(a.state(), GrowthStage::Shy);
    }

    #[test]
    fn test_bloom_gate_blocks_advance() {
        let config = GrowthCycleConfig {
            bloom_gates_advance: true,
            ..GrowthCycleConfig::default()
        };
        let mut a = Automaton::new(growth_cycle(&config)).unwrap();
        for _ in 0..2500 {
            a.step(true, FRAME);
        }
        assert_eq!(a.state(), GrowthStage::Growing);

        a.raise(Signal::Bloom);
        let fired: Vec<_> = a.step(true, FRAME).fired.into_iter().map(|f| f.name).collect();
        assert_eq!(a.state(), GrowthStage::Flowering);
        assert!(fired.contains(&"pretty"));
    }

    #[test]
    fn test_bloom_message_is_idempotent() {
        let mut a = automaton();
        assert!(a.raise(Signal::Bloom));
        assert!(!a.raise(Signal::Bloom));
        let blooms = (0..100)
            .flat_map(|_| a.step(false, FRAME).fired)
            .filter(|f| f.name == "bloomed")
            .count();
        assert_eq!(blooms, 1);
    }
}
