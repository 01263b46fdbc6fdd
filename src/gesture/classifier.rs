//! Stateless hand-pose → gesture classifier.
//!
//! Each finger is first read as raised, folded, or level (tip and reference
//! joint at the same coordinate). Gestures are then matched against
//! [`GESTURE_RULES`] in order and the first match wins:
//!
//! 1. peace      - index + middle raised, ring + pinky folded (thumb ignored)
//! 2. thumbs_up  - thumb raised, other four folded
//! 3. fist       - all five folded (recognised, never activates)
//! 4. N_fingers  - at least `min_fingers` raised
//!
//! Anything else is `none`.

use super::types::{Finger, GestureLabel, GestureResult, HandPose, LandmarkId};

/// How a single finger reads in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Raised,
    Folded,
    Level,
}

impl Extension {
    pub fn is_raised(self) -> bool {
        self == Self::Raised
    }

    pub fn is_folded(self) -> bool {
        self == Self::Folded
    }
}

/// Per-finger readings for one pose, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandShape {
    pub fingers: [Extension; 5],
}

impl HandShape {
    pub fn from_pose(pose: &HandPose) -> Self {
        let mut fingers = [Extension::Level; 5];
        for (slot, finger) in fingers.iter_mut().zip(Finger::ALL) {
            *slot = read_finger(pose, finger);
        }
        Self { fingers }
    }

    pub fn get(&self, finger: Finger) -> Extension {
        self.fingers[finger as usize]
    }

    pub fn raised_count(&self) -> u8 {
        self.fingers.iter().filter(|e| e.is_raised()).count() as u8
    }

    fn four_folded(&self) -> bool {
        self.fingers[1..].iter().all(|e| e.is_folded())
    }
}

/// Thumb compares horizontally (tip further out in the mirrored frame is
/// raised); the other fingers compare vertically (tip above the joint is raised).
fn read_finger(pose: &HandPose, finger: Finger) -> Extension {
    let tip = pose.get(finger.tip());
    let pip = pose.get(finger.pip());
    let (outward, inward) = match finger {
        Finger::Thumb => (tip.x > pip.x, tip.x < pip.x),
        _ => (tip.y < pip.y, tip.y > pip.y),
    };
    if outward {
        Extension::Raised
    } else if inward {
        Extension::Folded
    } else {
        Extension::Level
    }
}

type RuleFn = fn(&HandShape, u8) -> Option<GestureLabel>;

/// Ordered gesture rules. Order is the tie-break policy.
pub const GESTURE_RULES: [(&str, RuleFn); 4] = [
    ("peace", peace_rule),
    ("thumbs_up", thumbs_up_rule),
    ("fist", fist_rule),
    ("finger_count", finger_count_rule),
];

fn peace_rule(shape: &HandShape, _min_fingers: u8) -> Option<GestureLabel> {
    let matched = shape.get(Finger::Index).is_raised()
        && shape.get(Finger::Middle).is_raised()
        && shape.get(Finger::Ring).is_folded()
        && shape.get(Finger::Pinky).is_folded();
    matched.then_some(GestureLabel::Peace)
}

fn thumbs_up_rule(shape: &HandShape, _min_fingers: u8) -> Option<GestureLabel> {
    (shape.get(Finger::Thumb).is_raised() && shape.four_folded()).then_some(GestureLabel::ThumbsUp)
}

fn fist_rule(shape: &HandShape, _min_fingers: u8) -> Option<GestureLabel> {
    (shape.get(Finger::Thumb).is_folded() && shape.four_folded()).then_some(GestureLabel::Fist)
}

fn finger_count_rule(shape: &HandShape, min_fingers: u8) -> Option<GestureLabel> {
    let count = shape.raised_count();
    (count >= min_fingers).then_some(GestureLabel::Fingers(count))
}

/// Evaluate [`GESTURE_RULES`] in order.
pub fn match_gesture(shape: &HandShape, min_fingers: u8) -> GestureLabel {
    GESTURE_RULES
        .iter()
        .find_map(|(_, rule)| rule(shape, min_fingers))
        .unwrap_or(GestureLabel::None)
}

/// Pure classifier; output depends only on the pose passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureClassifier {
    min_fingers: u8,
}

impl GestureClassifier {
    pub fn new(min_fingers: u8) -> Self {
        Self { min_fingers }
    }

    pub fn min_fingers(&self) -> u8 {
        self.min_fingers
    }

    pub fn classify(&self, pose: Option<&HandPose>) -> GestureResult {
        let Some(pose) = pose else {
            return GestureResult::absent();
        };

        let shape = HandShape::from_pose(pose);
        let label = match_gesture(&shape, self.min_fingers);
        let center = pose
            .get(LandmarkId::Wrist)
            .midpoint(pose.get(LandmarkId::MiddleTip));

        GestureResult {
            label,
            finger_count: shape.raised_count(),
            activate: label.activates(),
            hand_center: Some(center),
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(crate::core::constants::MIN_FINGERS_FOR_FLAP)
    }
}
