//! Hand landmark sources.
//!
//! The detector itself (camera capture + hand landmark model) runs outside
//! this crate. It reports one JSON object per processed frame:
//!
//! ```text
//! {"landmarks": [[0.51, 0.80], ... 21 pairs ...], "score": 0.93}
//! {"landmarks": null}
//! {"error": "camera unavailable"}
//! ```
//!
//! Coordinates are normalised to [0, 1] and converted to image pixels here.
//! Extra per-point values (e.g. depth) are ignored.

use crate::core::config::TrackerConfig;
use crate::gesture::types::HandPose;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can produce one hand pose per camera frame.
pub trait LandmarkSource: Send + 'static {
    /// Block until the next frame has been processed. `Ok(None)` means no
    /// hand was visible; `Err` means the source is finished or broken.
    fn detect(&mut self) -> io::Result<Option<HandPose>>;

    /// Handle that stops the source from another thread, for sources whose
    /// `detect` can block indefinitely.
    fn stop_handle(&self) -> Option<StopHandle> {
        None
    }
}

/// Kills a detector process from outside the thread reading it. Killing
/// closes its stdout, so a blocked `detect` returns end of stream.
#[derive(Debug, Clone)]
pub struct StopHandle {
    child: Arc<Mutex<Child>>,
}

impl StopHandle {
    /// Kill and reap the process. Safe to call more than once.
    pub fn stop(&self) {
        let Ok(mut child) = self.child.lock() else {
            return;
        };
        if let Ok(Some(_)) = child.try_wait() {
            return;
        }
        if let Err(e) = child.kill() {
            debug!(pid = child.id(), "detector kill failed: {}", e);
        }
        let _ = child.wait();
        info!(pid = child.id(), "landmark detector stopped");
    }
}

/// Camera frame size and orientation for normalised → pixel conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    pub width: f32,
    pub height: f32,
    /// Flip horizontally to the camera-facing mirror view.
    pub mirror: bool,
    /// Hands reported with a lower score are treated as absent.
    pub min_confidence: f32,
}

impl FrameGeometry {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            width: config.camera_width,
            height: config.camera_height,
            mirror: config.mirror,
            min_confidence: config.min_detection_confidence,
        }
    }

    pub fn to_pixels(&self, nx: f32, ny: f32) -> (f32, f32) {
        let nx = if self.mirror { 1.0 - nx } else { nx };
        (nx * self.width, ny * self.height)
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}

#[derive(Deserialize, Debug)]
struct PoseLine {
    #[serde(default)]
    landmarks: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one detector output line. Anything unusable reads as "no hand".
pub fn parse_pose_line(line: &str, geometry: &FrameGeometry) -> Option<HandPose> {
    let parsed: PoseLine = match serde_json::from_str(line) {
        Ok(p) => p,
        Err(e) => {
            debug!("skipping non-pose line {:?}: {}", line, e);
            return None;
        }
    };

    if let Some(error) = parsed.error {
        warn!("landmark detector error: {}", error);
        return None;
    }
    if let Some(score) = parsed.score {
        if score < geometry.min_confidence {
            return None;
        }
    }

    let landmarks = parsed.landmarks?;
    let mut points = Vec::with_capacity(landmarks.len());
    for lm in &landmarks {
        match lm.as_slice() {
            [x, y, ..] => points.push(geometry.to_pixels(*x, *y)),
            _ => return None,
        }
    }
    let pose = HandPose::from_points(&points);
    if pose.is_none() {
        warn!("expected 21 landmarks, got {}", points.len());
    }
    pose
}

/// Reads detector output lines from any buffered reader.
pub struct ReplaySource<R> {
    reader: R,
    geometry: FrameGeometry,
    /// Delay before each frame, to replay a recording at camera speed.
    frame_interval: Option<Duration>,
    line: String,
}

impl<R: BufRead + Send + 'static> ReplaySource<R> {
    pub fn new(reader: R, geometry: FrameGeometry) -> Self {
        Self {
            reader,
            geometry,
            frame_interval: None,
            line: String::new(),
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }
}

impl ReplaySource<BufReader<File>> {
    /// Open a recorded `.jsonl` file.
    pub fn open(path: &Path, geometry: FrameGeometry) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), geometry))
    }
}

impl<R: BufRead + Send + 'static> LandmarkSource for ReplaySource<R> {
    fn detect(&mut self) -> io::Result<Option<HandPose>> {
        if let Some(interval) = self.frame_interval {
            thread::sleep(interval);
        }
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "landmark stream ended",
                ));
            }
            let line = self.line.trim();
            if !line.is_empty() {
                return Ok(parse_pose_line(line, &self.geometry));
            }
        }
    }
}

/// External detector process whose stdout carries pose lines.
pub struct SubprocessSource {
    child: StopHandle,
    lines: ReplaySource<BufReader<ChildStdout>>,
}

impl SubprocessSource {
    /// Launch `program args... --min-detection-confidence D --min-tracking-confidence T`.
    pub fn spawn(program: &str, config: &TrackerConfig) -> io::Result<Self> {
        let mut child = Command::new(program)
            .args(&config.args)
            .arg("--min-detection-confidence")
            .arg(config.min_detection_confidence.to_string())
            .arg("--min-tracking-confidence")
            .arg(config.min_tracking_confidence.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "detector has no stdout"))?;

        info!(program, pid = child.id(), "landmark detector started");
        Ok(Self {
            child: StopHandle {
                child: Arc::new(Mutex::new(child)),
            },
            lines: ReplaySource::new(BufReader::new(stdout), FrameGeometry::from_config(config)),
        })
    }
}

impl LandmarkSource for SubprocessSource {
    fn detect(&mut self) -> io::Result<Option<HandPose>> {
        self.lines.detect()
    }

    fn stop_handle(&self) -> Option<StopHandle> {
        Some(self.child.clone())
    }
}

impl Drop for SubprocessSource {
    fn drop(&mut self) {
        self.child.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::types::LandmarkId;
    use std::io::Cursor;

    fn line_with(points: &[[f32; 2]], score: Option<f32>) -> String {
        let landmarks: Vec<Vec<f32>> = points.iter().map(|p| p.to_vec()).collect();
        let mut value = serde_json::json!({ "landmarks": landmarks });
        if let Some(score) = score {
            value["score"] = serde_json::json!(score);
        }
        value.to_string()
    }

    fn unmirrored() -> FrameGeometry {
        FrameGeometry {
            width: 640.0,
            height: 480.0,
            mirror: false,
            min_confidence: 0.7,
        }
    }

    #[test]
    fn test_parse_converts_to_pixels() {
        let mut points = [[0.5, 0.5]; 21];
        points[LandmarkId::Wrist.index()] = [0.25, 0.75];
        let pose = parse_pose_line(&line_with(&points, None), &unmirrored()).expect("pose");
        let wrist = pose.get(LandmarkId::Wrist);
        assert_eq!((wrist.x, wrist.y), (160.0, 360.0));
    }

    #[test]
    fn test_mirror_flips_x() {
        let geometry = FrameGeometry {
            mirror: true,
            ..unmirrored()
        };
        assert_eq!(geometry.to_pixels(0.25, 0.5), (480.0, 240.0));
    }

    #[test]
    fn test_extra_depth_value_is_ignored() {
        let line = format!(r#"{{"landmarks": [{}]}}"#, vec!["[0.1, 0.2, -0.05]"; 21].join(","));
        assert!(parse_pose_line(&line, &unmirrored()).is_some());
    }

    #[test]
    fn test_absent_and_malformed_lines() {
        let g = unmirrored();
        assert!(parse_pose_line(r#"{"landmarks": null}"#, &g).is_none());
        assert!(parse_pose_line("{}", &g).is_none());
        assert!(parse_pose_line("READY", &g).is_none());
        assert!(parse_pose_line(r#"{"error": "no camera"}"#, &g).is_none());
        assert!(parse_pose_line(&line_with(&[[0.5, 0.5]; 20], None), &g).is_none());
        assert!(parse_pose_line(r#"{"landmarks": [[0.5]]}"#, &g).is_none());
    }

    #[test]
    fn test_low_confidence_hand_is_absent() {
        let g = unmirrored();
        let points = [[0.5, 0.5]; 21];
        assert!(parse_pose_line(&line_with(&points, Some(0.4)), &g).is_none());
        assert!(parse_pose_line(&line_with(&points, Some(0.9)), &g).is_some());
    }

    #[test]
    fn test_replay_source_reads_frames_then_ends() {
        let points = [[0.5, 0.5]; 21];
        let input = format!(
            "{}\n\n{}\n",
            line_with(&points, None),
            r#"{"landmarks": null}"#
        );
        let mut source = ReplaySource::new(Cursor::new(input.into_bytes()), unmirrored());

        assert!(source.detect().unwrap().is_some());
        assert!(source.detect().unwrap().is_none());
        let err = source.detect().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_missing_detector_program_fails_to_spawn() {
        let result = SubprocessSource::spawn(
            "handflap-no-such-detector-binary",
            &TrackerConfig::default(),
        );
        assert!(result.is_err());
    }
}
