//! Attune Time - Frame clock and delayed events
//!
//! This crate implements the session's notion of time:
//! - A frame clock that advances once per rendered frame, never jumps
//! - A scheduler for one-shot delayed events, keyed to the session
//!   generation so nothing scheduled before a reset can fire after it

pub mod clock;
pub mod scheduler;

pub use clock::*;
pub use scheduler::*;
