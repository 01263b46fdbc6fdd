//! Hand pose and gesture data structures.

use std::fmt;
use std::time::Instant;

/// Number of keypoints in a hand pose (MediaPipe hand model convention).
pub const NUM_LANDMARKS: usize = 21;

/// Named role of each of the 21 keypoints, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkId {
    Wrist = 0,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkId {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The five fingers, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn tip(self) -> LandmarkId {
        match self {
            Self::Thumb => LandmarkId::ThumbTip,
            Self::Index => LandmarkId::IndexTip,
            Self::Middle => LandmarkId::MiddleTip,
            Self::Ring => LandmarkId::RingTip,
            Self::Pinky => LandmarkId::PinkyTip,
        }
    }

    /// Reference joint for the up/down test. The thumb has no PIP joint, so its
    /// IP joint plays that role.
    pub fn pip(self) -> LandmarkId {
        match self {
            Self::Thumb => LandmarkId::ThumbIp,
            Self::Index => LandmarkId::IndexPip,
            Self::Middle => LandmarkId::MiddlePip,
            Self::Ring => LandmarkId::RingPip,
            Self::Pinky => LandmarkId::PinkyPip,
        }
    }
}

/// A 2D position in image-pixel space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Keypoint) -> Keypoint {
        Keypoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Exactly 21 keypoints from one camera frame, indexed by [`LandmarkId`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    keypoints: [Keypoint; NUM_LANDMARKS],
}

impl HandPose {
    pub fn new(keypoints: [Keypoint; NUM_LANDMARKS]) -> Self {
        Self { keypoints }
    }

    /// Build from an ordered point list. Returns `None` unless there are exactly 21.
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        if points.len() != NUM_LANDMARKS {
            return None;
        }
        let mut keypoints = [Keypoint::default(); NUM_LANDMARKS];
        for (slot, &(x, y)) in keypoints.iter_mut().zip(points) {
            *slot = Keypoint::new(x, y);
        }
        Some(Self { keypoints })
    }

    pub fn get(&self, id: LandmarkId) -> Keypoint {
        self.keypoints[id.index()]
    }

    pub fn set(&mut self, id: LandmarkId, point: Keypoint) {
        self.keypoints[id.index()] = point;
    }

    pub fn keypoints(&self) -> &[Keypoint; NUM_LANDMARKS] {
        &self.keypoints
    }
}

/// Discrete gesture recognised from a single pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureLabel {
    None,
    Peace,
    ThumbsUp,
    Fist,
    /// Finger-count fallback, carrying the count.
    Fingers(u8),
}

impl GestureLabel {
    /// Whether this gesture requests a flap. A fist is recognised but inert.
    pub fn activates(self) -> bool {
        matches!(self, Self::Peace | Self::ThumbsUp | Self::Fingers(_))
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Peace => write!(f, "peace"),
            Self::ThumbsUp => write!(f, "thumbs_up"),
            Self::Fist => write!(f, "fist"),
            Self::Fingers(n) => write!(f, "{}_fingers", n),
        }
    }
}

/// Classifier output for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureResult {
    pub label: GestureLabel,
    /// Raised fingers, 0-5.
    pub finger_count: u8,
    pub activate: bool,
    /// Midpoint of wrist and middle fingertip.
    pub hand_center: Option<Keypoint>,
}

impl GestureResult {
    /// The "no hand visible" result.
    pub fn absent() -> Self {
        Self {
            label: GestureLabel::None,
            finger_count: 0,
            activate: false,
            hand_center: None,
        }
    }
}

impl Default for GestureResult {
    fn default() -> Self {
        Self::absent()
    }
}

/// A debounced flap trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlapEvent {
    pub at: Instant,
}
