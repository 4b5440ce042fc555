//! Cue sinks - where milestone notifications go
//!
//! Chat presentation, audio and celebrations live outside the engine. A
//! session hands every delivered cue to one sink.

use attune_state::{Celebration, Cue, Sound};
use tracing::info;

/// Receiver for delivered cues
pub trait CueSink {
    fn deliver(&mut self, cue: &Cue);
}

/// Keeps every cue, in delivery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    pub cues: Vec<Cue>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chat messages only
    pub fn chats(&self) -> Vec<&str> {
        self.cues
            .iter()
            .filter_map(|c| match c {
                Cue::Chat(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count_chat(&self, message: &str) -> usize {
        self.chats().into_iter().filter(|m| *m == message).count()
    }

    pub fn count_sound(&self, sound: Sound) -> usize {
        self.cues.iter().filter(|c| **c == Cue::Sound(sound)).count()
    }

    pub fn count_celebration(&self, celebration: Celebration) -> usize {
        self.cues
            .iter()
            .filter(|c| **c == Cue::Celebrate(celebration))
            .count()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn clear(&mut self) {
        self.cues.clear();
    }
}

impl CueSink for RecordingSink {
    fn deliver(&mut self, cue: &Cue) {
        self.cues.push(cue.clone());
    }
}

/// Logs every cue at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl CueSink for TracingSink {
    fn deliver(&mut self, cue: &Cue) {
        match cue {
            Cue::Chat(message) => info!(target: "attune::cue", %message, "chat"),
            Cue::Sound(sound) => info!(target: "attune::cue", ?sound, "sound"),
            Cue::Celebrate(celebration) => info!(target: "attune::cue", ?celebration, "celebrate"),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CueSink for NullSink {
    fn deliver(&mut self, _cue: &Cue) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_filters() {
        let mut sink = RecordingSink::new();
        sink.deliver(&Cue::chat("hello"));
        sink.deliver(&Cue::Sound(Sound::Scream));
        sink.deliver(&Cue::Celebrate(Celebration::Confetti));
        sink.deliver(&Cue::chat("hello"));

        assert_eq!(sink.len(), 4);
        assert_eq!(sink.chats(), vec!["hello", "hello"]);
        assert_eq!(sink.count_chat("hello"), 2);
        assert_eq!(sink.count_sound(Sound::Scream), 1);
        assert_eq!(sink.count_celebration(Celebration::Confetti), 1);
        assert_eq!(sink.count_celebration(Celebration::Bounce), 0);

        sink.clear();
        assert!(sink.is_empty());
    }
}
