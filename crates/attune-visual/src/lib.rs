//! Attune Visual - Procedural animation as pure projection
//!
//! Automaton output goes in, a `Scene` comes out. Nothing here owns
//! simulation state except the tree's branch table and the blob's
//! smoothing filter values.
//!
//! - `tree`: recursive growth structure with depth-staggered reveal
//! - `blob`: one silhouette smoothed toward per-mood targets
//! - `particles`: sparks and confetti
//! - `bubble`, `overlay`: chat bubble, end-of-session panel, loading screen

pub mod blob;
pub mod bubble;
pub mod color;
pub mod overlay;
pub mod particles;
pub mod scene;
pub mod tree;

pub use blob::*;
pub use bubble::*;
pub use color::*;
pub use overlay::*;
pub use particles::*;
pub use scene::*;
pub use tree::*;
