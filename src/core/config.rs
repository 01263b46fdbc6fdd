//! Runtime configuration.
//!
//! Every tunable constant has a default in [`crate::core::constants`]; a JSON
//! file and command-line flags can override any of them. Degenerate values are
//! clamped by [`Config::sanitized`] rather than rejected.

use crate::core::constants::*;
use crate::utils::persistence;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// World, physics and pipe tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: f64,
    pub screen_height: f64,
    /// Velocity added every tick (positive = downward).
    pub gravity: f64,
    /// Velocity a flap resets the bird to (negative = upward).
    pub jump_impulse: f64,
    pub bird_radius: f64,
    pub bird_start_x: f64,
    pub bird_start_y: f64,
    pub pipe_speed: f64,
    pub pipe_gap: f64,
    pub pipe_width: f64,
    pub spawn_delay_ticks: u32,
    /// Random gap_start is drawn from `[gap_margin, screen_height - pipe_gap - gap_margin]`.
    pub gap_margin: f64,
    pub first_pipe_offset: f64,
    pub background_speed: f64,
    pub ticks_per_second: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            bird_radius: BIRD_RADIUS,
            bird_start_x: BIRD_START_X,
            bird_start_y: BIRD_START_Y,
            pipe_speed: PIPE_SPEED,
            pipe_gap: PIPE_GAP,
            pipe_width: PIPE_WIDTH,
            spawn_delay_ticks: PIPE_SPAWN_DELAY_TICKS,
            gap_margin: PIPE_GAP_MARGIN,
            first_pipe_offset: FIRST_PIPE_OFFSET,
            background_speed: BACKGROUND_SPEED,
            ticks_per_second: TICKS_PER_SECOND,
        }
    }
}

impl GameConfig {
    /// Inclusive range for a new pipe's gap_start.
    pub fn gap_start_range(&self) -> (f64, f64) {
        let min = self.gap_margin;
        let max = (self.screen_height - self.pipe_gap - self.gap_margin).max(min);
        (min, max)
    }

    /// Fixed timestep of the game loop.
    pub fn tick_interval(&self) -> Duration {
        let rate = if self.ticks_per_second.is_nan() {
            TICKS_PER_SECOND
        } else {
            self.ticks_per_second
                .clamp(MIN_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND)
        };
        Duration::from_secs_f64(1.0 / rate)
    }
}

/// Gesture classification and debouncing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Raised fingers needed for the finger-count fallback rule to flap.
    pub min_fingers_for_flap: u8,
    pub flap_cooldown_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_fingers_for_flap: MIN_FINGERS_FOR_FLAP,
            flap_cooldown_ms: FLAP_COOLDOWN_MS,
        }
    }
}

impl GestureConfig {
    pub fn flap_cooldown(&self) -> Duration {
        Duration::from_millis(self.flap_cooldown_ms)
    }
}

/// External landmark detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Detector command; `None` means keyboard-only play.
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Passed through to the detector and applied to per-hand scores.
    pub min_detection_confidence: f32,
    /// Passed through to the detector only.
    pub min_tracking_confidence: f32,
    pub camera_width: f32,
    pub camera_height: f32,
    /// Flip x so the image is the camera-facing mirror view.
    pub mirror: bool,
    pub pose_max_age_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            min_detection_confidence: MIN_DETECTION_CONFIDENCE,
            min_tracking_confidence: MIN_TRACKING_CONFIDENCE,
            camera_width: CAMERA_WIDTH,
            camera_height: CAMERA_HEIGHT,
            mirror: true,
            pose_max_age_ms: POSE_MAX_AGE_MS,
        }
    }
}

impl TrackerConfig {
    pub fn pose_max_age(&self) -> Duration {
        Duration::from_millis(self.pose_max_age_ms)
    }
}

/// Complete configuration surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub gesture: GestureConfig,
    pub tracker: TrackerConfig,
}

impl Config {
    /// Load from a JSON file, falling back to defaults if it is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        let config: Config = persistence::load_json_or_default_at(path);
        tracing::info!(path = %path.display(), "configuration loaded");
        config
    }

    /// Load `~/.handflap/config.json`, or defaults if the home directory is unknown.
    pub fn load_default_location() -> Self {
        match persistence::save_path(CONFIG_FILE) {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::warn!("no config directory ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Clamp values that would make the game degenerate.
    pub fn sanitized(mut self) -> Self {
        let defaults = GameConfig::default();
        let g = &mut self.game;
        if !(g.screen_width > 0.0) {
            g.screen_width = defaults.screen_width;
        }
        if !(g.screen_height > 0.0) {
            g.screen_height = defaults.screen_height;
        }
        if !(g.bird_radius > 0.0) || g.bird_radius * 2.0 >= g.screen_height {
            g.bird_radius = (g.screen_height / 4.0).min(defaults.bird_radius);
        }
        g.bird_start_y = g
            .bird_start_y
            .clamp(g.bird_radius, g.screen_height - g.bird_radius);
        if !(g.pipe_width > 0.0) {
            g.pipe_width = defaults.pipe_width;
        }
        g.pipe_gap = g.pipe_gap.clamp(0.0, g.screen_height);
        g.gap_margin = g.gap_margin.max(0.0);
        if !(g.pipe_speed > 0.0) {
            g.pipe_speed = defaults.pipe_speed;
        }
        g.spawn_delay_ticks = g.spawn_delay_ticks.max(1);
        // Consecutive pipes must not overlap, and the seeded pipe must stay
        // ahead of the first spawned one.
        let min_delay = ((g.pipe_width / g.pipe_speed).floor() as u32).saturating_add(1);
        g.spawn_delay_ticks = g.spawn_delay_ticks.max(min_delay);
        let spacing = g.spawn_delay_ticks as f64 * g.pipe_speed;
        g.first_pipe_offset = g
            .first_pipe_offset
            .clamp(0.0, (spacing - g.pipe_width).max(0.0));
        if !(g.ticks_per_second > 0.0) {
            g.ticks_per_second = defaults.ticks_per_second;
        }
        g.ticks_per_second = g
            .ticks_per_second
            .clamp(MIN_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND);

        self.gesture.min_fingers_for_flap = self.gesture.min_fingers_for_flap.min(5);

        let t = &mut self.tracker;
        t.min_detection_confidence = t.min_detection_confidence.clamp(0.0, 1.0);
        t.min_tracking_confidence = t.min_tracking_confidence.clamp(0.0, 1.0);
        if !(t.camera_width > 0.0) {
            t.camera_width = CAMERA_WIDTH;
        }
        if !(t.camera_height > 0.0) {
            t.camera_height = CAMERA_HEIGHT;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.game.screen_width, 800.0);
        assert_eq!(config.game.screen_height, 600.0);
        assert_eq!(config.game.gravity, 0.9);
        assert_eq!(config.game.jump_impulse, -11.0);
        assert_eq!(config.game.spawn_delay_ticks, 120);
        assert_eq!(config.gesture.min_fingers_for_flap, 2);
        assert_eq!(config.gesture.flap_cooldown(), Duration::from_millis(300));
        assert!(config.tracker.command.is_none());
    }

    #[test]
    fn test_gap_start_range_default() {
        let (min, max) = GameConfig::default().gap_start_range();
        assert_eq!(min, 100.0);
        assert_eq!(max, 320.0);
    }

    #[test]
    fn test_gap_start_range_never_inverted() {
        let game = GameConfig {
            pipe_gap: 500.0,
            ..Default::default()
        };
        let (min, max) = game.gap_start_range();
        assert!(max >= min);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"game": {"gravity": 0.5}, "gesture": {"flap_cooldown_ms": 150}}"#)
                .expect("valid json");
        assert_eq!(config.game.gravity, 0.5);
        assert_eq!(config.game.jump_impulse, -11.0);
        assert_eq!(config.gesture.flap_cooldown_ms, 150);
        assert_eq!(config.gesture.min_fingers_for_flap, 2);
        assert!(config.tracker.mirror);
    }

    #[test]
    fn test_sanitized_clamps_degenerate_values() {
        let mut config = Config::default();
        config.game.spawn_delay_ticks = 0;
        config.game.ticks_per_second = 0.0;
        config.game.pipe_gap = 10_000.0;
        config.gesture.min_fingers_for_flap = 9;
        config.tracker.min_detection_confidence = 3.0;

        let config = config.sanitized();
        // Raised until consecutive 50-wide pipes moving 3/tick cannot overlap.
        assert_eq!(config.game.spawn_delay_ticks, 17);
        assert!(config.game.first_pipe_offset <= 17.0 * 3.0 - 50.0);
        assert_eq!(config.game.ticks_per_second, TICKS_PER_SECOND);
        assert_eq!(config.game.pipe_gap, config.game.screen_height);
        assert_eq!(config.gesture.min_fingers_for_flap, 5);
        assert_eq!(config.tracker.min_detection_confidence, 1.0);
    }

    #[test]
    fn test_sanitized_survives_extreme_values() {
        let mut config = Config::default();
        config.game.pipe_speed = 1e-300;
        config.game.ticks_per_second = 1e-300;
        let config = config.sanitized();
        assert_eq!(config.game.spawn_delay_ticks, u32::MAX);
        assert_eq!(config.game.ticks_per_second, MIN_TICKS_PER_SECOND);
        assert_eq!(config.game.tick_interval(), Duration::from_secs(1));

        let mut config = Config::default();
        config.game.ticks_per_second = 1e9;
        let config = config.sanitized();
        assert_eq!(config.game.ticks_per_second, MAX_TICKS_PER_SECOND);
        assert_eq!(config.game.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_tick_interval_of_unsanitized_rate() {
        let game = GameConfig {
            ticks_per_second: f64::NAN,
            ..Default::default()
        };
        assert_eq!(game.tick_interval(), GameConfig::default().tick_interval());
    }

    #[test]
    fn test_sanitized_keeps_defaults_intact() {
        assert_eq!(Config::default().sanitized(), Config::default());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("handflap_missing_config_98765.json");
        let config = Config::load_from(&path);
        assert_eq!(config, Config::default());
    }
}
