//! Per-tick gesture stage: classify the latest pose, then debounce.

use super::classifier::GestureClassifier;
use super::debounce::FlapDebouncer;
use super::types::{FlapEvent, GestureResult, HandPose};
use crate::core::config::GestureConfig;
use crate::flappy::GamePhase;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct GestureController {
    classifier: GestureClassifier,
    debouncer: FlapDebouncer,
}

impl GestureController {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            classifier: GestureClassifier::new(config.min_fingers_for_flap),
            debouncer: FlapDebouncer::new(config.flap_cooldown()),
        }
    }

    /// Gestures only drive the game from the menu or while playing.
    pub fn accepts_gestures(phase: GamePhase) -> bool {
        matches!(phase, GamePhase::Menu | GamePhase::Playing)
    }

    /// Classify `pose` (always, for display) and return a flap if the gesture
    /// activates, the phase listens to gestures, and the cooldown has passed.
    pub fn step(
        &mut self,
        pose: Option<&HandPose>,
        phase: GamePhase,
        now: Instant,
    ) -> (GestureResult, Option<FlapEvent>) {
        let result = self.classifier.classify(pose);
        if !Self::accepts_gestures(phase) {
            return (result, None);
        }
        let flap = self.debouncer.tick(result.activate, now);
        if flap.is_some() {
            tracing::debug!(gesture = %result.label, fingers = result.finger_count, "gesture flap");
        }
        (result, flap)
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::classifier::test_poses::pose;
    use crate::gesture::types::GestureLabel;
    use std::time::Duration;

    #[test]
    fn test_peace_sign_flaps_in_menu_and_playing() {
        let config = GestureConfig::default();
        let peace = pose([false, true, true, false, false]);
        let t0 = Instant::now();

        for phase in [GamePhase::Menu, GamePhase::Playing] {
            let mut controller = GestureController::new(&config);
            let (result, flap) = controller.step(Some(&peace), phase, t0);
            assert_eq!(result.label, GestureLabel::Peace);
            assert!(flap.is_some());
        }
    }

    #[test]
    fn test_gestures_ignored_when_paused_or_game_over() {
        let config = GestureConfig::default();
        let open = pose([true; 5]);
        let t0 = Instant::now();

        for phase in [GamePhase::Paused, GamePhase::GameOver] {
            let mut controller = GestureController::new(&config);
            let (result, flap) = controller.step(Some(&open), phase, t0);
            assert!(result.activate);
            assert!(flap.is_none());
        }
    }

    #[test]
    fn test_held_gesture_is_debounced() {
        let config = GestureConfig::default();
        let mut controller = GestureController::new(&config);
        let open = pose([true; 5]);
        let t0 = Instant::now();

        // 60 ticks (~1s) with the hand held open.
        let flaps = (0..60u64)
            .filter(|i| {
                let now = t0 + Duration::from_micros(i * 16_667);
                controller.step(Some(&open), GamePhase::Playing, now).1.is_some()
            })
            .count();
        assert_eq!(flaps, 4);
    }

    #[test]
    fn test_no_hand_no_flap() {
        let mut controller = GestureController::new(&GestureConfig::default());
        let (result, flap) = controller.step(None, GamePhase::Playing, Instant::now());
        assert_eq!(result, GestureResult::absent());
        assert!(flap.is_none());
    }
}
