//! Attune Test Harness - Deterministic simulation of whole sessions
//!
//! This crate provides:
//! - Scripted gaze feeds (`GazeScript`, `FeedModel`)
//! - A fixed-step frame simulator over a real `Session`
//! - Invariant checks on every simulated frame
//! - Scenario presets for both characters

pub mod gaze;
pub mod simulator;

pub use gaze::*;
pub use simulator::*;
