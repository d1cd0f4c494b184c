//! Held-key repeat suppression for terminal environments.
//!
//! A held key must emit its action exactly once. Terminals that support the
//! enhanced keyboard protocol report releases, which re-arm the key directly;
//! for terminals that only echo press events, a timeout auto-releases keys
//! once the repeat stream stops.

use arrayvec::ArrayVec;

use blockfall_types::Action;
use crossterm::event::KeyCode;

use crate::map::action_for_key;

// Terminal auto-repeat typically fires every 30-50ms, so a short gap in the
// press stream means the key was let go.
const DEFAULT_RELEASE_TIMEOUT_MS: u64 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldKey {
    code: KeyCode,
    age_ms: u64,
}

/// Tracks pressed keys and filters out auto-repeat.
#[derive(Debug, Clone)]
pub struct RepeatGuard {
    held: ArrayVec<HeldKey, 8>,
    release_timeout_ms: u64,
}

impl RepeatGuard {
    pub fn new() -> Self {
        Self::with_release_timeout_ms(DEFAULT_RELEASE_TIMEOUT_MS)
    }

    pub fn with_release_timeout_ms(release_timeout_ms: u64) -> Self {
        Self {
            held: ArrayVec::new(),
            release_timeout_ms,
        }
    }

    /// Handle a press event; returns the mapped action only on the first
    /// press of a key that is not currently held.
    pub fn key_press(&mut self, code: KeyCode) -> Option<Action> {
        if let Some(held) = self.held.iter_mut().find(|h| h.code == code) {
            // Repeat press of a held key keeps it alive but emits nothing.
            held.age_ms = 0;
            return None;
        }

        let action = action_for_key(code)?;
        let _ = self.held.try_push(HeldKey { code, age_ms: 0 });
        Some(action)
    }

    /// Handle a release event, re-arming the key immediately.
    pub fn key_release(&mut self, code: KeyCode) {
        self.held.retain(|h| h.code != code);
    }

    /// Advance the auto-release clock. Keys whose press stream has gone
    /// quiet for the timeout are treated as released.
    pub fn update(&mut self, elapsed_ms: u64) {
        for held in &mut self.held {
            held.age_ms += elapsed_ms;
        }
        let timeout = self.release_timeout_ms;
        self.held.retain(|h| h.age_ms <= timeout);
    }

    pub fn reset(&mut self) {
        self.held.clear();
    }
}

impl Default for RepeatGuard {
    fn default() -> Self {
        Self::new()
    }
}
