//! Background landmark worker.
//!
//! Detection runs on its own thread so a slow camera never stalls the game
//! loop. Only the newest pose is kept; the game samples it once per tick and
//! older frames are simply overwritten.

use super::source::{LandmarkSource, StopHandle};
use crate::gesture::types::HandPose;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Stamped {
    pose: Option<HandPose>,
    at: Instant,
}

#[derive(Debug, Default)]
struct Shared {
    latest: Mutex<Option<Stamped>>,
    connected: AtomicBool,
    stop: AtomicBool,
    /// Stops a source that may be blocked inside `detect`.
    stopper: Mutex<Option<StopHandle>>,
}

/// Read side of the landmark worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PoseFeed {
    shared: Arc<Shared>,
    max_age: Duration,
}

impl PoseFeed {
    /// A feed with no camera behind it; always reports no hand.
    pub fn disconnected() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            max_age: Duration::ZERO,
        }
    }

    fn connected(max_age: Duration) -> Self {
        let feed = Self {
            shared: Arc::new(Shared::default()),
            max_age,
        };
        feed.shared.connected.store(true, Ordering::SeqCst);
        feed
    }

    /// Replace the stored pose.
    pub fn publish(&self, pose: Option<HandPose>, at: Instant) {
        if let Ok(mut latest) = self.shared.latest.lock() {
            *latest = Some(Stamped { pose, at });
        }
    }

    /// Newest pose, unless it is older than the max age at `now`.
    pub fn latest(&self, now: Instant) -> Option<HandPose> {
        let latest = self.shared.latest.lock().ok()?;
        let stamped = (*latest)?;
        if now.saturating_duration_since(stamped.at) > self.max_age {
            return None;
        }
        stamped.pose
    }

    /// False once the source has ended or failed (or there never was one).
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Stop the worker. A detector process is killed and reaped here so a
    /// read blocked on it ends now rather than at its next frame.
    pub fn shutdown(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        let stopper = match self.shared.stopper.lock() {
            Ok(mut stopper) => stopper.take(),
            Err(_) => None,
        };
        if let Some(stopper) = stopper {
            stopper.stop();
        }
    }

    fn mark_disconnected(&self) {
        self.shared.connected.store(false, Ordering::SeqCst);
        if let Ok(mut latest) = self.shared.latest.lock() {
            *latest = None;
        }
    }
}

/// Run `source` on a dedicated thread, publishing each frame's pose.
pub fn spawn_pose_worker<S: LandmarkSource>(mut source: S, max_age: Duration) -> io::Result<PoseFeed> {
    let feed = PoseFeed::connected(max_age);
    if let Ok(mut stopper) = feed.shared.stopper.lock() {
        *stopper = source.stop_handle();
    }
    let worker_feed = feed.clone();

    thread::Builder::new()
        .name("landmarks".to_string())
        .spawn(move || {
            let mut frames: u64 = 0;
            while !worker_feed.shared.stop.load(Ordering::SeqCst) {
                match source.detect() {
                    Ok(pose) => {
                        worker_feed.publish(pose, Instant::now());
                        frames += 1;
                    }
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                        tracing::info!(frames, "landmark source finished");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(frames, "landmark source failed: {}", e);
                        break;
                    }
                }
            }
            worker_feed.mark_disconnected();
        })?;

    Ok(feed)
}
