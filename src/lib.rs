//! Handflap - Flappy Bird in the terminal, flown with hand gestures.
//!
//! This library exposes the game core (gesture recognition, world state
//! machine, landmark plumbing) for the binary and for integration tests.

pub mod core;
pub mod flappy;
pub mod gesture;
pub mod input;
pub mod landmarks;
pub mod utils;
