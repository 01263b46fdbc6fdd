//! Wall-clock flap debouncer.
//!
//! A raised hand is classified as "activate" on every frame it is visible.
//! The debouncer turns that stream into at most one [`FlapEvent`] per
//! cooldown window, measured in wall-clock time so behaviour does not depend
//! on camera or tick rate.

use super::types::FlapEvent;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FlapDebouncer {
    cooldown: Duration,
    last_emit: Option<Instant>,
}

impl FlapDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emit: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_emit(&self) -> Option<Instant> {
        self.last_emit
    }

    /// Emit a flap if `activate` is set and strictly more than the cooldown
    /// has elapsed since the last emitted flap.
    pub fn tick(&mut self, activate: bool, now: Instant) -> Option<FlapEvent> {
        if !activate {
            return None;
        }
        let ready = match self.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
        };
        if !ready {
            return None;
        }
        self.last_emit = Some(now);
        Some(FlapEvent { at: now })
    }

    /// Forget the last emission.
    pub fn reset(&mut self) {
        self.last_emit = None;
    }
}

impl Default for FlapDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::core::constants::FLAP_COOLDOWN_MS))
    }
}
