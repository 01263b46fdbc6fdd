//! Hand landmark input: an external detector process (or a recording)
//! feeding poses to the game through a background worker.

pub mod feed;
pub mod source;

pub use feed::{spawn_pose_worker, PoseFeed};
pub use source::{
    parse_pose_line, FrameGeometry, LandmarkSource, ReplaySource, StopHandle,
    SubprocessSource,
};
