//! Cycle configuration - the behavior table an automaton runs
//!
//! A cycle is an ordered list of states. Index 0 is the entry state.
//! Each state says what makes its dwell accumulator progress, what
//! happens when engagement goes wrong, and how the growth scalar behaves
//! while it is active.

use std::fmt::Debug;
use std::time::Duration;

use attune_core::{AttuneError, AttuneResult};
use serde::{Deserialize, Serialize};

use crate::{MilestoneRule, Trigger};

/// What drives the dwell accumulator forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressRule {
    /// Grows while engaged, erodes while not
    WhileEngaged,
    /// Grows while not engaged, resets on engagement
    WhileDisengaged,
    /// Grows every frame regardless of engagement
    Elapsed,
}

/// What a non-entry state does when engagement goes wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitRule {
    /// Nothing: the state only ever completes
    Stay,
    /// Regress to the previous state once the accumulator erodes to zero
    Erode,
    /// Jump straight back to the entry state on any engaged frame
    ReturnToEntryWhenEngaged,
}

/// How the growth scalar behaves while a state is active
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GrowthProfile {
    /// Growth is not touched
    Untracked,
    /// Grows by dt/duration while engaged. In the entry state, decays by
    /// dt/duration once engagement has been absent longer than `grace`
    /// (default: the state's own duration).
    Accumulate { grace: Option<Duration> },
    /// Pinned to a fixed value
    Hold(f32),
    /// `1 - dwell/duration`
    DrainWithDwell,
}

/// What happens when the terminal state completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Freeze the automaton and report completion to the session
    EndSession,
    /// Start over at the entry state
    Wrap,
}

/// Externally raised signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// User asked the tree to bloom
    Bloom,
}

impl Signal {
    fn bit(self) -> u8 {
        match self {
            Signal::Bloom => 1 << 0,
        }
    }
}

/// Set of raised signals
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SignalSet(u8);

impl SignalSet {
    pub const EMPTY: SignalSet = SignalSet(0);

    /// Raise a signal. Raising an already raised signal is a no-op.
    /// Returns true if the signal was newly raised.
    pub fn raise(&mut self, signal: Signal) -> bool {
        let was = self.contains(signal);
        self.0 |= signal.bit();
        !was
    }

    pub fn lower(&mut self, signal: Signal) {
        self.0 &= !signal.bit();
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.0 & signal.bit() != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Debug for SignalSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut set = f.debug_set();
        if self.contains(Signal::Bloom) {
            set.entry(&Signal::Bloom);
        }
        set.finish()
    }
}

/// One row of the behavior table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSpec<S> {
    pub state: S,
    /// Full dwell duration; the accumulator lives in [0, duration]
    pub duration: Duration,
    pub progress: ProgressRule,
    pub exit: ExitRule,
    pub growth: GrowthProfile,
    /// Completing this state additionally requires the signal to be raised
    pub gate: Option<Signal>,
}

impl<S> StateSpec<S> {
    pub fn new(state: S, duration: Duration, progress: ProgressRule) -> Self {
        Self {
            state,
            duration,
            progress,
            exit: ExitRule::Stay,
            growth: GrowthProfile::Untracked,
            gate: None,
        }
    }

    pub fn exit(mut self, exit: ExitRule) -> Self {
        self.exit = exit;
        self
    }

    pub fn growth(mut self, growth: GrowthProfile) -> Self {
        self.growth = growth;
        self
    }

    pub fn gated_by(mut self, signal: Signal) -> Self {
        self.gate = Some(signal);
        self
    }
}

/// A complete cycle: states, completion rule, milestones
#[derive(Debug, Clone)]
pub struct CycleConfig<S> {
    pub states: Vec<StateSpec<S>>,
    pub completion: Completion,
    pub milestones: Vec<MilestoneRule<S>>,
}

impl<S: Copy + PartialEq + Debug> CycleConfig<S> {
    pub fn new(states: Vec<StateSpec<S>>, completion: Completion) -> Self {
        Self {
            states,
            completion,
            milestones: Vec::new(),
        }
    }

    pub fn with_milestone(mut self, rule: MilestoneRule<S>) -> Self {
        self.milestones.push(rule);
        self
    }

    /// Reject configurations the automaton cannot honor
    pub fn validate(&self) -> AttuneResult<()> {
        if self.states.is_empty() {
            return Err(AttuneError::EmptyCycle);
        }

        for spec in &self.states {
            if spec.duration.is_zero() {
                return Err(AttuneError::InvalidDuration {
                    state: format!("{:?}", spec.state),
                });
            }
            if let GrowthProfile::Hold(v) = spec.growth {
                if !(0.0..=1.0).contains(&v) {
                    return Err(AttuneError::InvalidThreshold {
                        name: format!("{:?}.hold", spec.state),
                        value: v,
                    });
                }
            }
        }

        for rule in &self.milestones {
            if let Trigger::GrowthAtLeast { threshold, .. } = rule.trigger {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(AttuneError::InvalidThreshold {
                        name: rule.name.to_string(),
                        value: threshold,
                    });
                }
            }
            if let Some(state) = rule.state {
                if self.index_of(state).is_none() {
                    return Err(AttuneError::InvalidThreshold {
                        name: format!("{}: unknown state {:?}", rule.name, state),
                        value: 0.0,
                    });
                }
            }
        }

        Ok(())
    }

    /// Position of `state` in the cycle
    pub fn index_of(&self, state: S) -> Option<usize> {
        self.states.iter().position(|s| s.state == state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Duration of `state`, zero for states outside the cycle
    pub fn duration_of(&self, state: S) -> Duration {
        self.index_of(state)
            .map(|i| self.states[i].duration)
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Two {
        A,
        B,
    }

    #[test]
    fn test_signal_raise_is_idempotent() {
        let mut set = SignalSet::default();
        assert!(set.raise(Signal::Bloom));
        assert!(!set.raise(Signal::Bloom));
        assert!(set.contains(Signal::Bloom));

        set.lower(Signal::Bloom);
        assert!(set.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_cycle() {
        let config: CycleConfig<Two> = CycleConfig::new(Vec::new(), Completion::Wrap);
        assert_eq!(config.validate(), Err(AttuneError::EmptyCycle));
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let config = CycleConfig::new(
            vec![
                StateSpec::new(Two::A, Duration::from_secs(1), ProgressRule::Elapsed),
                StateSpec::new(Two::B, Duration::ZERO, ProgressRule::Elapsed),
            ],
            Completion::Wrap,
        );
        assert_eq!(
            config.validate(),
            Err(AttuneError::InvalidDuration {
                state: "B".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_hold() {
        let config = CycleConfig::new(
            vec![StateSpec::new(Two::A, Duration::from_secs(1), ProgressRule::Elapsed)
                .growth(GrowthProfile::Hold(1.5))],
            Completion::Wrap,
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_index_and_duration_lookup() {
        let config = CycleConfig::new(
            vec![
                StateSpec::new(Two::A, Duration::from_secs(1), ProgressRule::Elapsed),
                StateSpec::new(Two::B, Duration::from_secs(2), ProgressRule::Elapsed),
            ],
            Completion::Wrap,
        );
        assert_eq!(config.index_of(Two::B), Some(1));
        assert_eq!(config.duration_of(Two::B), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }
}
