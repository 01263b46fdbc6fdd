//! Flappy Bird world.
//!
//! A real-time action game where the player keeps a bird airborne between
//! scrolling pipe pairs. Gravity pulls the bird down each tick; a flap resets
//! its velocity upward. Hitting a pipe or the floor ends the run.

pub mod logic;
pub mod persistence;
pub mod types;

pub use logic::*;
pub use types::*;
