//! Attune Runtime - Characters and sessions
//!
//! - `Character`: automaton + animation driver + particles behind one trait
//! - `TreeCharacter`, `BlobCharacter`: the two shipped characters
//! - `Session`: staged per-frame loop, input routing, end/retry/exit
//! - `CueSink`: where chat, sound and celebration cues are delivered

pub mod blob;
pub mod character;
pub mod session;
pub mod sink;
pub mod tree;

pub use blob::*;
pub use character::*;
pub use session::*;
pub use sink::*;
pub use tree::*;
