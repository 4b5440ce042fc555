//! Milestones - one-shot events gated on state, growth, streak or signal
//!
//! Every rule owns one flag. A rule fires when its state filter matches,
//! its flag is unset and its trigger holds; firing sets the flag. Flags are
//! cleared by scope: `State` flags on every state change and cycle wrap,
//! `Session` flags only by a full reset.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Signal;

/// Sound effects a character can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    Scream,
}

/// Celebrations a character can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Celebration {
    /// One capped confetti burst
    Confetti,
    /// Bounce while engagement lasts
    Bounce,
}

/// Notification produced by a milestone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cue {
    /// Chat bubble message
    Chat(String),
    Sound(Sound),
    Celebrate(Celebration),
}

impl Cue {
    pub fn chat(message: impl Into<String>) -> Self {
        Cue::Chat(message.into())
    }
}

/// When a milestone flag is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagScope {
    /// On every state change and cycle wrap
    State,
    /// Only on a full reset
    Session,
}

/// Milestone predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Any frame in the filtered state
    InState,
    /// Only the frame the state was entered through a transition
    Entered,
    /// Growth at or above `threshold`, optionally only while engaged
    GrowthAtLeast { threshold: f32, engaged: bool },
    /// Continuous engaged streak strictly longer than the duration
    EngagedFor(Duration),
    /// Signal raised
    Signal(Signal),
    /// Dwell accumulator at or above the duration
    DwellAtLeast(Duration),
}

/// Observations a trigger is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct MilestoneContext {
    pub just_entered: bool,
    pub centered: bool,
    pub growth: f32,
    pub dwell: Duration,
    pub engaged_streak: Duration,
    pub signals: crate::SignalSet,
}

impl Trigger {
    pub fn holds(&self, ctx: &MilestoneContext) -> bool {
        match *self {
            Trigger::InState => true,
            Trigger::Entered => ctx.just_entered,
            Trigger::GrowthAtLeast { threshold, engaged } => {
                ctx.growth >= threshold && (!engaged || ctx.centered)
            }
            Trigger::EngagedFor(t) => ctx.engaged_streak > t,
            Trigger::Signal(s) => ctx.signals.contains(s),
            Trigger::DwellAtLeast(t) => ctx.dwell >= t,
        }
    }
}

/// Second cue delivered a fixed delay after the first
#[derive(Debug, Clone, PartialEq)]
pub struct Followup {
    pub delay: Duration,
    pub cue: Cue,
}

/// One row of the milestone table
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneRule<S> {
    pub name: &'static str,
    /// Only evaluated while the automaton is in this state
    pub state: Option<S>,
    pub scope: FlagScope,
    pub trigger: Trigger,
    pub cue: Cue,
    pub followup: Option<Followup>,
}

impl<S> MilestoneRule<S> {
    pub fn new(name: &'static str, trigger: Trigger, cue: Cue) -> Self {
        Self {
            name,
            state: None,
            scope: FlagScope::State,
            trigger,
            cue,
            followup: None,
        }
    }

    pub fn in_state(mut self, state: S) -> Self {
        self.state = Some(state);
        self
    }

    pub fn once_per_session(mut self) -> Self {
        self.scope = FlagScope::Session;
        self
    }

    pub fn then_after(mut self, delay: Duration, cue: Cue) -> Self {
        self.followup = Some(Followup { delay, cue });
        self
    }
}

/// A rule that fired this frame
#[derive(Debug, Clone, PartialEq)]
pub struct FiredMilestone {
    pub name: &'static str,
    pub cue: Cue,
    pub followup: Option<Followup>,
}

/// One flag per milestone rule, indexed like the rule table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MilestoneFlags {
    fired: Vec<bool>,
}

impl MilestoneFlags {
    pub fn new(len: usize) -> Self {
        Self {
            fired: vec![false; len],
        }
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.fired.get(index).copied().unwrap_or(false)
    }

    pub fn set(&mut self, index: usize) {
        if let Some(flag) = self.fired.get_mut(index) {
            *flag = true;
        }
    }

    /// Clear every flag whose rule has `scope`
    pub fn clear_scope<S>(&mut self, rules: &[MilestoneRule<S>], scope: FlagScope) {
        for (flag, rule) in self.fired.iter_mut().zip(rules) {
            if rule.scope == scope {
                *flag = false;
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.fired.iter_mut().for_each(|f| *f = false);
    }

    pub fn count_set(&self) -> usize {
        self.fired.iter().filter(|f| **f).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.fired
    }
}
