// Screen (world units are pixels of an 800x600 playfield)
pub const SCREEN_WIDTH: f64 = 800.0;
pub const SCREEN_HEIGHT: f64 = 600.0;

// Tick and timing
pub const TICKS_PER_SECOND: f64 = 60.0;
pub const MIN_TICKS_PER_SECOND: f64 = 1.0;
pub const MAX_TICKS_PER_SECOND: f64 = 1000.0;

// Bird physics (per tick)
pub const GRAVITY: f64 = 0.9;
pub const JUMP_IMPULSE: f64 = -11.0;
pub const BIRD_RADIUS: f64 = 20.0;
pub const BIRD_START_X: f64 = 100.0;
pub const BIRD_START_Y: f64 = SCREEN_HEIGHT / 2.0;

// Pipes
pub const PIPE_SPEED: f64 = 3.0;
pub const PIPE_GAP: f64 = 180.0;
pub const PIPE_WIDTH: f64 = 50.0;
pub const PIPE_SPAWN_DELAY_TICKS: u32 = 120;
/// Minimum distance between a gap edge and the ceiling/floor.
pub const PIPE_GAP_MARGIN: f64 = 100.0;
/// The pipe seeded on reset starts this far past the right edge.
pub const FIRST_PIPE_OFFSET: f64 = 200.0;

// Cosmetic background scroll
pub const BACKGROUND_SPEED: f64 = 1.0;

// Gesture control
pub const MIN_FINGERS_FOR_FLAP: u8 = 2;
pub const FLAP_COOLDOWN_MS: u64 = 300;
pub const MIN_DETECTION_CONFIDENCE: f32 = 0.7;
pub const MIN_TRACKING_CONFIDENCE: f32 = 0.5;

// Camera frame geometry for normalised -> pixel conversion
pub const CAMERA_WIDTH: f32 = 640.0;
pub const CAMERA_HEIGHT: f32 = 480.0;
/// Poses older than this are treated as "no hand" by the tick loop.
pub const POSE_MAX_AGE_MS: u64 = 100;
/// Frame pacing for `--replay`, roughly a 30 fps webcam.
pub const REPLAY_FRAME_MS: u64 = 33;

// Files under ~/.handflap/
pub const DATA_DIR_NAME: &str = ".handflap";
pub const HIGH_SCORE_FILE: &str = "high_score.json";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "handflap.log";
