//! Mood cycle - the blob's four moods
//!
//! Calm → Looming → FadeOut → Respawning → Calm. Sustained disengagement
//! escalates out of Calm; after that the sequence is timed, and any engaged
//! frame snaps straight back to Calm.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Celebration, Completion, Cue, CycleConfig, ExitRule, MilestoneRule, ProgressRule, Sound,
    StateSpec, Trigger,
};

/// Blob moods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Calm,
    Looming,
    FadeOut,
    Respawning,
}

/// Mood cycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodCycleConfig {
    /// Disengagement tolerated in Calm before escalating
    pub patience: Duration,
    pub looming: Duration,
    pub fade_out: Duration,
    pub respawn: Duration,
    /// Gaze streaks that earn a compliment in Calm
    pub bright_after: Duration,
    pub cool_after: Duration,
    pub favorite_after: Duration,
    /// Gaze streak that earns the once-per-session confetti
    pub confetti_after: Duration,
}

impl Default for MoodCycleConfig {
    fn default() -> Self {
        Self {
            patience: Duration::from_secs(2),
            looming: Duration::from_secs(3),
            fade_out: Duration::from_secs(10),
            respawn: Duration::from_secs(2),
            bright_after: Duration::from_secs(10),
            cool_after: Duration::from_secs(15),
            favorite_after: Duration::from_secs(20),
            confetti_after: Duration::from_secs(7),
        }
    }
}

/// Build the mood cycle behavior table
pub fn mood_cycle(config: &MoodCycleConfig) -> CycleConfig<Mood> {
    let states = vec![
        StateSpec::new(Mood::Calm, config.patience, ProgressRule::WhileDisengaged),
        StateSpec::new(Mood::Looming, config.looming, ProgressRule::Elapsed)
            .exit(ExitRule::ReturnToEntryWhenEngaged),
        StateSpec::new(Mood::FadeOut, config.fade_out, ProgressRule::Elapsed)
            .exit(ExitRule::ReturnToEntryWhenEngaged),
        StateSpec::new(Mood::Respawning, config.respawn, ProgressRule::Elapsed)
            .exit(ExitRule::ReturnToEntryWhenEngaged),
    ];

    let entered = |name, mood, message: &str| {
        MilestoneRule::new(name, Trigger::Entered, Cue::chat(message)).in_state(mood)
    };
    let streak = |name, after, cue| {
        MilestoneRule::new(name, Trigger::EngagedFor(after), cue).in_state(Mood::Calm)
    };

    CycleConfig::new(states, Completion::Wrap)
        .with_milestone(entered("calm", Mood::Calm, "Yay! You're looking at me!"))
        .with_milestone(entered("looming", Mood::Looming, "😡 Why aren't you looking at me?"))
        .with_milestone(entered("fade-out", Mood::FadeOut, "😢 Stop ignoring me!"))
        .with_milestone(entered("respawn", Mood::Respawning, "💥 Boom—I'm back!"))
        .with_milestone(
            MilestoneRule::new("scream", Trigger::InState, Cue::Sound(Sound::Scream))
                .in_state(Mood::Respawning),
        )
        .with_milestone(streak("bright", config.bright_after, Cue::chat("😊 I'm feeling bright!")))
        .with_milestone(streak("cool", config.cool_after, Cue::chat("💙 So cool and calm...")))
        .with_milestone(streak(
            "favorite",
            config.favorite_after,
            Cue::chat("🌟 You're my favorite human!"),
        ))
        .with_milestone(streak(
            "bounce",
            config.favorite_after,
            Cue::Celebrate(Celebration::Bounce),
        ))
        .with_milestone(
            MilestoneRule::new(
                "confetti",
                Trigger::EngagedFor(config.confetti_after),
                Cue::Celebrate(Celebration::Confetti),
            )
            .once_per_session(),
        )
}
