//! Attune State - The engagement automaton
//!
//! One configurable state machine drives every character:
//! - `CycleConfig` is the behavior table (states, durations, progress and
//!   exit rules, growth profiles, milestone rules)
//! - `Automaton` consumes one engaged/not-engaged observation per frame
//! - `growth_cycle` and `mood_cycle` are the two shipped tables
//!
//! # Invariants
//!
//! - dwell accumulator ∈ [0, state duration]
//! - growth scalar ∈ [0, 1]
//! - at most one transition per frame
//! - a milestone fires at most once per entry into its scope

pub mod automaton;
pub mod cycle;
pub mod growth;
pub mod milestone;
pub mod mood;

pub use automaton::*;
pub use cycle::*;
pub use growth::*;
pub use milestone::*;
pub use mood::*;
