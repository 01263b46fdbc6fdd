//! Tuning constants, configuration, and the per-frame orchestration.

pub mod config;
pub mod constants;
pub mod tick;

pub use config::{Config, GameConfig, GestureConfig, TrackerConfig};
pub use tick::{game_tick, TickResult};
