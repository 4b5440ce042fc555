//! Attune Sense - Engagement from landmarks
//!
//! Converts the face tracker's landmark stream into a per-frame
//! centered/not-centered signal.
//!
//! - `LandmarkLatch` holds the most recent delivery until superseded
//! - `CoordinateMap` scales capture coordinates into display coordinates
//! - `DetectionRegion` is where the subject must look to count as engaged
//! - `detect` is the pure per-frame test

pub mod detector;
pub mod landmark;

pub use detector::*;
pub use landmark::*;
