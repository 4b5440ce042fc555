//! Attune Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every Attune crate:
//! - Session time (SessionTime)
//! - Geometry (Point2D, Size2D, Rect, Frame2D)
//! - Landmark samples delivered by the face tracker
//! - Session generations and scheduled task ids
//! - The error taxonomy

pub mod error;
pub mod geometry;
pub mod id;
pub mod sample;
pub mod time;

pub use error::*;
pub use geometry::*;
pub use id::*;
pub use sample::*;
pub use time::*;
