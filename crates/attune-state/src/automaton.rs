//! Engagement Automaton - the per-frame state machine
//!
//! One automaton runs any `CycleConfig`. Per frame it consumes a single
//! engaged/not-engaged observation and a frame delta, and performs at most
//! one transition.
//!
//! Invariants, every frame:
//! - dwell ∈ [0, duration of the current state]
//! - growth ∈ [0, 1]
//! - once completed (EndSession), nothing changes until `reset`

use std::fmt::Debug;
use std::time::Duration;

use attune_core::AttuneResult;
use tracing::debug;

use crate::{
    Completion, CycleConfig, ExitRule, FiredMilestone, FlagScope, GrowthProfile, MilestoneContext,
    MilestoneFlags, ProgressRule, Signal, SignalSet, StateSpec,
};

/// Why a transition happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Completed a state, moved to the next
    Advance,
    /// Accumulator eroded to zero, moved to the previous
    Regress,
    /// Engagement returned, jumped back to the entry state
    ReturnToEntry,
    /// Completed the terminal state of a wrapping cycle
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: S,
    pub to: S,
    pub kind: TransitionKind,
}

/// Outcome of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S> {
    pub transition: Option<Transition<S>>,
    pub fired: Vec<FiredMilestone>,
    /// The terminal state completed with `Completion::EndSession`
    pub completed: bool,
}

impl<S> Step<S> {
    fn idle(completed: bool) -> Self {
        Self {
            transition: None,
            fired: Vec::new(),
            completed,
        }
    }
}

/// Full observable state, for equality checks against a fresh automaton
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonSnapshot<S> {
    pub state: S,
    pub dwell: Duration,
    pub growth: f32,
    pub absence: Option<Duration>,
    pub engaged_streak: Duration,
    pub state_elapsed: Duration,
    pub flags: Vec<bool>,
    pub signals: SignalSet,
    pub completed: bool,
    pub transitions: u64,
}

/// Configurable multi-state engagement machine
#[derive(Debug, Clone)]
pub struct Automaton<S> {
    config: CycleConfig<S>,
    /// Index of the current state
    current: usize,
    /// Dwell accumulator of the current state
    dwell: Duration,
    /// Growth scalar
    growth: f32,
    /// How long engagement has been absent while in the entry state
    absence: Option<Duration>,
    /// Continuous engaged time, zeroed by any disengaged frame
    engaged_streak: Duration,
    /// Time since the current state was entered
    state_elapsed: Duration,
    flags: MilestoneFlags,
    signals: SignalSet,
    /// A transition happened this frame
    just_entered: bool,
    completed: bool,
    transitions: u64,
}

impl<S: Copy + PartialEq + Debug> Automaton<S> {
    /// Create an automaton at the entry state
    pub fn new(config: CycleConfig<S>) -> AttuneResult<Self> {
        config.validate()?;
        let flags = MilestoneFlags::new(config.milestones.len());
        Ok(Self {
            config,
            current: 0,
            dwell: Duration::ZERO,
            growth: 0.0,
            absence: None,
            engaged_streak: Duration::ZERO,
            state_elapsed: Duration::ZERO,
            flags,
            signals: SignalSet::EMPTY,
            just_entered: false,
            completed: false,
            transitions: 0,
        })
    }

    /// Advance one frame
    pub fn step(&mut self, centered: bool, dt: Duration) -> Step<S> {
        if self.completed {
            return Step::idle(true);
        }

        self.just_entered = false;
        if centered {
            self.engaged_streak += dt;
        } else {
            self.engaged_streak = Duration::ZERO;
        }

        let spec = self.config.states[self.current];
        let is_entry = self.current == 0;
        let transition = if !is_entry && centered && spec.exit == ExitRule::ReturnToEntryWhenEngaged {
            self.absence = None;
            Some(self.enter(0, Duration::ZERO, TransitionKind::ReturnToEntry))
        } else {
            match spec.progress {
                ProgressRule::WhileEngaged => self.progress_while_engaged(&spec, centered, dt),
                ProgressRule::WhileDisengaged if centered => {
                    self.dwell = Duration::ZERO;
                    None
                }
                ProgressRule::WhileDisengaged | ProgressRule::Elapsed => self.accumulate(&spec, dt),
            }
        };

        if transition.is_none() {
            self.state_elapsed += dt;
        }

        // Growth profile of whichever state is current now
        let now = self.config.states[self.current];
        match now.growth {
            GrowthProfile::Hold(v) => self.growth = v,
            GrowthProfile::DrainWithDwell => {
                self.growth = 1.0 - rate(self.dwell, now.duration);
            }
            GrowthProfile::Untracked | GrowthProfile::Accumulate { .. } => {}
        }
        self.growth = self.growth.clamp(0.0, 1.0);

        let fired = self.evaluate_milestones(centered);

        Step {
            transition,
            fired,
            completed: self.completed,
        }
    }

    fn progress_while_engaged(
        &mut self,
        spec: &StateSpec<S>,
        centered: bool,
        dt: Duration,
    ) -> Option<Transition<S>> {
        if centered {
            self.absence = None;
            self.dwell = (self.dwell + dt).min(spec.duration);
            if let GrowthProfile::Accumulate { .. } = spec.growth {
                self.growth = (self.growth + rate(dt, spec.duration)).min(1.0);
            }
            if self.dwell >= spec.duration && self.gate_open(spec) {
                return self.complete_state();
            }
            return None;
        }

        self.dwell = self.dwell.saturating_sub(dt);

        if self.current == 0 {
            if let GrowthProfile::Accumulate { grace } = spec.growth {
                let absent = self.absence.unwrap_or(Duration::ZERO) + dt;
                self.absence = Some(absent);
                if absent > grace.unwrap_or(spec.duration) {
                    self.growth = (self.growth - rate(dt, spec.duration)).max(0.0);
                }
            }
            return None;
        }

        if spec.exit == ExitRule::Erode && self.dwell.is_zero() {
            let previous = self.current - 1;
            let full = self.config.states[previous].duration;
            let transition = self.enter(previous, full, TransitionKind::Regress);
            if previous == 0 {
                self.growth = 1.0;
                self.absence = None;
            }
            return Some(transition);
        }

        None
    }

    /// Dwell grows unconditionally; completes at the state's duration
    fn accumulate(&mut self, spec: &StateSpec<S>, dt: Duration) -> Option<Transition<S>> {
        self.dwell = (self.dwell + dt).min(spec.duration);
        if self.dwell >= spec.duration && self.gate_open(spec) {
            self.complete_state()
        } else {
            None
        }
    }

    fn gate_open(&self, spec: &StateSpec<S>) -> bool {
        spec.gate.map_or(true, |s| self.signals.contains(s))
    }

    fn complete_state(&mut self) -> Option<Transition<S>> {
        let next = self.current + 1;
        if next < self.config.states.len() {
            return Some(self.enter(next, Duration::ZERO, TransitionKind::Advance));
        }

        match self.config.completion {
            Completion::EndSession => {
                debug!(state = ?self.state(), "cycle completed");
                self.completed = true;
                None
            }
            Completion::Wrap => {
                self.growth = 0.0;
                self.absence = None;
                self.signals.clear();
                Some(self.enter(0, Duration::ZERO, TransitionKind::Wrap))
            }
        }
    }

    fn enter(&mut self, index: usize, dwell: Duration, kind: TransitionKind) -> Transition<S> {
        let from = self.state();
        self.current = index;
        self.dwell = dwell;
        self.state_elapsed = Duration::ZERO;
        self.just_entered = true;
        self.transitions += 1;
        self.flags.clear_scope(&self.config.milestones, FlagScope::State);

        let to = self.state();
        debug!(?from, ?to, ?kind, "state transition");
        Transition { from, to, kind }
    }

    fn evaluate_milestones(&mut self, centered: bool) -> Vec<FiredMilestone> {
        let state = self.state();
        let ctx = MilestoneContext {
            just_entered: self.just_entered,
            centered,
            growth: self.growth,
            dwell: self.dwell,
            engaged_streak: self.engaged_streak,
            signals: self.signals,
        };

        let mut fired = Vec::new();
        for (index, rule) in self.config.milestones.iter().enumerate() {
            if self.flags.is_set(index) {
                continue;
            }
            if rule.state.is_some_and(|s| s != state) {
                continue;
            }
            if rule.trigger.holds(&ctx) {
                self.flags.set(index);
                debug!(milestone = rule.name, ?state, "milestone fired");
                fired.push(FiredMilestone {
                    name: rule.name,
                    cue: rule.cue.clone(),
                    followup: rule.followup.clone(),
                });
            }
        }
        fired
    }

    /// Raise an external signal. Returns true if it was newly raised.
    pub fn raise(&mut self, signal: Signal) -> bool {
        let raised = self.signals.raise(signal);
        if raised {
            debug!(?signal, "signal raised");
        }
        raised
    }

    /// Back to a freshly constructed automaton
    pub fn reset(&mut self) {
        self.current = 0;
        self.dwell = Duration::ZERO;
        self.growth = 0.0;
        self.absence = None;
        self.engaged_streak = Duration::ZERO;
        self.state_elapsed = Duration::ZERO;
        self.flags.clear_all();
        self.signals.clear();
        self.just_entered = false;
        self.completed = false;
        self.transitions = 0;
    }

    pub fn state(&self) -> S {
        self.config.states[self.current].state
    }

    pub fn state_index(&self) -> usize {
        self.current
    }

    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// Duration of the current state
    pub fn duration(&self) -> Duration {
        self.config.states[self.current].duration
    }

    /// Dwell as a fraction of the current state's duration
    pub fn progress(&self) -> f32 {
        rate(self.dwell, self.duration())
    }

    pub fn growth(&self) -> f32 {
        self.growth
    }

    pub fn engaged_streak(&self) -> Duration {
        self.engaged_streak
    }

    pub fn state_elapsed(&self) -> Duration {
        self.state_elapsed
    }

    pub fn just_entered(&self) -> bool {
        self.just_entered
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn signals(&self) -> SignalSet {
        self.signals
    }

    pub fn flags(&self) -> &MilestoneFlags {
        &self.flags
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn config(&self) -> &CycleConfig<S> {
        &self.config
    }

    pub fn snapshot(&self) -> AutomatonSnapshot<S> {
        AutomatonSnapshot {
            state: self.state(),
            dwell: self.dwell,
            growth: self.growth,
            absence: self.absence,
            engaged_streak: self.engaged_streak,
            state_elapsed: self.state_elapsed,
            flags: self.flags.as_slice().to_vec(),
            signals: self.signals,
            completed: self.completed,
            transitions: self.transitions,
        }
    }
}

/// `part / whole` clamped to [0, 1]
fn rate(part: Duration, whole: Duration) -> f32 {
    attune_core::fraction(part, whole)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cue, MilestoneRule, Trigger};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Stage {
        One,
        Two,
        Three,
    }

    const FRAME: Duration = Duration::from_millis(20);

    fn ladder() -> CycleConfig<Stage> {
        CycleConfig::new(
            vec![
                StateSpec::new(Stage::One, Duration::from_secs(4), ProgressRule::WhileEngaged)
                    .growth(GrowthProfile::Accumulate { grace: None }),
                StateSpec::new(Stage::Two, Duration::from_secs(2), ProgressRule::WhileEngaged)
                    .exit(ExitRule::Erode)
                    .growth(GrowthProfile::Hold(1.0)),
                StateSpec::new(Stage::Three, Duration::from_secs(2), ProgressRule::WhileEngaged)
                    .exit(ExitRule::Erode)
                    .growth(GrowthProfile::DrainWithDwell),
            ],
            Completion::EndSession,
        )
    }

    fn run(a: &mut Automaton<Stage>, centered: bool, frames: usize) -> Vec<Transition<Stage>> {
        (0..frames)
            .filter_map(|_| a.step(centered, FRAME).transition)
            .collect()
    }

    #[test]
    fn test_advances_once_at_duration() {
        let mut a = Automaton::new(ladder()).unwrap();
        assert!(run(&mut a, true, 199).is_empty());
        assert_eq!(a.state(), Stage::One);

        let t = run(&mut a, true, 1);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].kind, TransitionKind::Advance);
        assert_eq!(a.state(), Stage::Two);
        assert_eq!(a.dwell(), Duration::ZERO);
        assert_eq!(a.growth(), 1.0);
    }

    #[test]
    fn test_regression_restores_full_dwell() {
        let mut a = Automaton::new(ladder()).unwrap();
        run(&mut a, true, 200 + 100);
        assert_eq!(a.state(), Stage::Three);

        // Three has no dwell yet: first disengaged frame regresses
        let t = run(&mut a, false, 1);
        assert_eq!(t[0].kind, TransitionKind::Regress);
        assert_eq!(a.state(), Stage::Two);
        assert_eq!(a.dwell(), Duration::from_secs(2));

        // Erode Two fully, landing in the entry state with growth restored
        let t = run(&mut a, false, 100);
        assert_eq!(t.len(), 1);
        assert_eq!(a.state(), Stage::One);
        assert_eq!(a.dwell(), Duration::from_secs(4));
        assert_eq!(a.growth(), 1.0);
    }

    #[test]
    fn test_entry_growth_decays_only_after_grace() {
        let mut a = Automaton::new(ladder()).unwrap();
        run(&mut a, true, 100);
        let grown = a.growth();
        assert!((grown - 0.5).abs() < 1e-3);

        // Within the 4 s grace nothing decays
        run(&mut a, false, 200);
        assert_eq!(a.growth(), grown);

        run(&mut a, false, 50);
        assert!(a.growth() < grown);
    }

    #[test]
    fn test_end_session_freezes() {
        let mut a = Automaton::new(ladder()).unwrap();
        run(&mut a, true, 200 + 100 + 99);
        assert!(!a.is_completed());

        let step = a.step(true, FRAME);
        assert!(step.completed);
        assert!(step.transition.is_none());

        let frozen = a.snapshot();
        run(&mut a, false, 50);
        assert_eq!(a.snapshot(), frozen);
    }

    #[test]
    fn test_gate_holds_at_full_dwell() {
        let mut config = ladder();
        config.states[0] = config.states[0].gated_by(Signal::Bloom);
        let mut a = Automaton::new(config).unwrap();

        run(&mut a, true, 400);
        assert_eq!(a.state(), Stage::One);
        assert_eq!(a.dwell(), Duration::from_secs(4));

        assert!(a.raise(Signal::Bloom));
        let t = run(&mut a, true, 1);
        assert_eq!(t.len(), 1);
        assert_eq!(a.state(), Stage::Two);
    }

    #[test]
    fn test_wrap_returns_to_entry_and_clears() {
        let mut config = ladder();
        config.completion = Completion::Wrap;
        let mut a = Automaton::new(config).unwrap();
        a.raise(Signal::Bloom);

        let t = run(&mut a, true, 200 + 100 + 100);
        assert_eq!(t.last().map(|t| t.kind), Some(TransitionKind::Wrap));
        assert_eq!(a.state(), Stage::One);
        assert_eq!(a.growth(), 0.0);
        assert!(a.signals().is_empty());
    }

    #[test]
    fn test_milestone_fires_once_per_entry() {
        let config = ladder().with_milestone(
            MilestoneRule::new("hello", Trigger::InState, Cue::chat("hi")).in_state(Stage::One),
        );
        let mut a = Automaton::new(config).unwrap();

        let fired: usize = (0..150).map(|_| a.step(false, FRAME).fired.len()).sum();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_entered_only_on_transition() {
        let config = ladder().with_milestone(
            MilestoneRule::new("entered", Trigger::Entered, Cue::chat("in")),
        );
        let mut a = Automaton::new(config).unwrap();

        // Session start is not an entry
        assert!(a.step(true, FRAME).fired.is_empty());
        let fired: Vec<_> = (0..199).flat_map(|_| a.step(true, FRAME).fired).collect();
        assert_eq!(fired.len(), 1);
        assert!(a.just_entered());
    }

    #[test]
    fn test_reset_matches_fresh() {
        let mut a = Automaton::new(ladder()).unwrap();
        a.raise(Signal::Bloom);
        run(&mut a, true, 250);
        a.reset();

        let fresh = Automaton::new(ladder()).unwrap();
        assert_eq!(a.snapshot(), fresh.snapshot());
    }

    fn frames() -> impl proptest::strategy::Strategy<Value = Vec<(bool, u64)>> {
        proptest::collection::vec((proptest::bool::ANY, 0u64..120), 0..600)
    }

    proptest::proptest! {
        #[test]
        fn prop_dwell_and_growth_stay_bounded(seq in frames()) {
            let mut a = Automaton::new(ladder()).unwrap();
            for (centered, ms) in seq {
                let before = a.transitions();
                a.step(centered, Duration::from_millis(ms));
                proptest::prop_assert!(a.dwell() <= a.duration());
                proptest::prop_assert!((0.0..=1.0).contains(&a.growth()));
                proptest::prop_assert!(a.transitions() - before <= 1);
            }
        }
    }
}
