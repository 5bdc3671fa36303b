//! Session lifecycle state.
//!
//! Recording and recognition are mutually exclusive: the engine is in
//! exactly one [`SessionState`] at a time, and starting one mode while the
//! other is active is a no-op. Everything mutable that belongs to one
//! session lives in a [`SessionContext`] constructed fresh at session start,
//! so nothing leaks across sessions.

use crate::pose::normalize::SessionReference;

/// Mutually exclusive run modes of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Recognizing,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }

    pub fn is_recognizing(&self) -> bool {
        matches!(self, SessionState::Recognizing)
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Recognizing => "recognizing",
        }
    }
}

/// Per-session context for one recognition session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Reference frame captured from the head pose at session start.
    pub reference: SessionReference,
    sample_counter: u64,
}

impl SessionContext {
    pub fn new(reference: SessionReference) -> Self {
        Self {
            reference,
            sample_counter: 0,
        }
    }

    /// Take the next per-session sample index.
    ///
    /// The counter is shared across trackers, so indices order samples
    /// globally within the session.
    pub fn next_sample_index(&mut self) -> u64 {
        let index = self.sample_counter;
        self.sample_counter += 1;
        index
    }

    /// Samples ingested so far in this session.
    pub fn samples_seen(&self) -> u64 {
        self.sample_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::normalize::REFERENCE_HEIGHT;
    use crate::pose::types::{Quat, Vec3};

    #[test]
    fn test_default_state_is_idle() {
        let state = SessionState::default();
        assert!(state.is_idle());
        assert!(!state.is_recording());
        assert!(!state.is_recognizing());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(SessionState::Idle.name(), "idle");
        assert_eq!(SessionState::Recording.name(), "recording");
        assert_eq!(SessionState::Recognizing.name(), "recognizing");
    }

    #[test]
    fn test_sample_indices_are_sequential() {
        let reference = SessionReference::capture(
            Vec3::new(0.0, REFERENCE_HEIGHT, 0.0),
            Quat::identity(),
            REFERENCE_HEIGHT,
        );
        let mut context = SessionContext::new(reference);
        assert_eq!(context.next_sample_index(), 0);
        assert_eq!(context.next_sample_index(), 1);
        assert_eq!(context.next_sample_index(), 2);
        assert_eq!(context.samples_seen(), 3);
    }
}
