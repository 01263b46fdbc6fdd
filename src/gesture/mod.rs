//! Hand gesture recognition.
//!
//! A [`HandPose`] (21 keypoints from the landmark detector) is classified
//! into a [`GestureLabel`] by a pure rule table, then a wall-clock debouncer
//! turns repeated activations into discrete [`FlapEvent`]s.

pub mod classifier;
pub mod controller;
pub mod debounce;
pub mod types;

pub use classifier::{GestureClassifier, HandShape};
pub use controller::GestureController;
pub use debounce::FlapDebouncer;
pub use types::*;
