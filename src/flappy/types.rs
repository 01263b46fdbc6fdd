//! Flappy Bird world data structures.
//!
//! World units are pixels of the configured playfield (800x600 by default),
//! with y growing downward.

use crate::core::config::GameConfig;
use rand::Rng;

/// Game phase. `Menu` is the initial phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

impl GamePhase {
    pub const ALL: [GamePhase; 4] = [
        GamePhase::Menu,
        GamePhase::Playing,
        GamePhase::Paused,
        GamePhase::GameOver,
    ];
}

/// Command vocabulary shared by keyboard and gesture input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameCommand {
    Flap,
    PauseToggle,
    Restart,
    Quit,
    ReturnToMenu,
}

impl GameCommand {
    pub const ALL: [GameCommand; 5] = [
        GameCommand::Flap,
        GameCommand::PauseToggle,
        GameCommand::Restart,
        GameCommand::Quit,
        GameCommand::ReturnToMenu,
    ];
}

/// What ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashCause {
    Ground,
    Pipe,
}

/// Axis-aligned rectangle, `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Strict overlap; rectangles that only share an edge do not intersect.
    /// Empty rectangles never intersect anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0.0
            && self.h > 0.0
            && other.w > 0.0
            && other.h > 0.0
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// The player. `x` never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    /// Vertical velocity per tick (positive = downward).
    pub velocity: f64,
    pub radius: f64,
}

impl Bird {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: config.bird_start_x,
            y: config.bird_start_y,
            velocity: 0.0,
            radius: config.bird_radius,
        }
    }

    /// Collision box around the circle.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x - self.radius,
            self.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// A pipe pair with a passable gap between `gap_start` and `gap_end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Leading (left) edge.
    pub x: f64,
    pub width: f64,
    pub gap_start: f64,
    pub gap_end: f64,
    /// Whether the bird has passed this pipe (for scoring).
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: f64, gap_start: f64, config: &GameConfig) -> Self {
        Self {
            x,
            width: config.pipe_width,
            gap_start,
            gap_end: gap_start + config.pipe_gap,
            passed: false,
        }
    }

    /// Pipe at `x` with gap_start drawn uniformly from the configured range.
    pub fn random<R: Rng>(x: f64, config: &GameConfig, rng: &mut R) -> Self {
        let (min, max) = config.gap_start_range();
        let gap_start = if max > min {
            rng.gen_range(min..=max)
        } else {
            min
        };
        Self::new(x, gap_start, config)
    }

    pub fn trailing_edge(&self) -> f64 {
        self.x + self.width
    }

    pub fn is_off_screen(&self) -> bool {
        self.trailing_edge() < 0.0
    }

    /// Upper and lower barrier rectangles.
    pub fn collision_rects(&self, screen_height: f64) -> (Rect, Rect) {
        let top = Rect::new(self.x, 0.0, self.width, self.gap_start);
        let bottom = Rect::new(
            self.x,
            self.gap_end,
            self.width,
            screen_height - self.gap_end,
        );
        (top, bottom)
    }
}

/// Current and best score. `best` never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub current: u32,
    pub best: u32,
}

impl Score {
    pub fn with_best(best: u32) -> Self {
        Self { current: 0, best }
    }

    /// Fold the current run into `best`. Returns true on a new record.
    pub fn fold_best(&mut self) -> bool {
        if self.current > self.best {
            self.best = self.current;
            true
        } else {
            false
        }
    }
}

/// Two-panel scrolling backdrop. Cosmetic only.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub x1: f64,
    pub x2: f64,
    pub speed: f64,
    width: f64,
}

impl Background {
    pub fn new(width: f64, speed: f64) -> Self {
        Self {
            x1: 0.0,
            x2: width,
            speed,
            width,
        }
    }

    pub fn advance(&mut self) {
        self.x1 -= self.speed;
        self.x2 -= self.speed;
        if self.x1 <= -self.width {
            self.x1 = self.width;
        }
        if self.x2 <= -self.width {
            self.x2 = self.width;
        }
    }
}

/// The whole game: bird, pipes (in spawn order), score and phase.
///
/// Mutated only by [`crate::flappy::logic::process_command`] and
/// [`crate::flappy::logic::process_tick`]; renderers borrow it read-only.
#[derive(Debug, Clone)]
pub struct WorldState {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub bird: Bird,
    /// Oldest first; x strictly increases with index.
    pub pipes: Vec<Pipe>,
    pub score: Score,
    pub background: Background,
    /// Ticks since the last spawn.
    pub spawn_timer: u32,
    /// Flap waiting to be consumed by the next tick.
    pub flap_queued: bool,
    /// Ticks simulated in the current run.
    pub tick_count: u64,
}

impl WorldState {
    /// A world sitting in the menu, with `best` loaded from storage.
    pub fn new(config: GameConfig, best: u32) -> Self {
        Self {
            phase: GamePhase::Menu,
            bird: Bird::new(&config),
            pipes: Vec::new(),
            score: Score::with_best(best),
            background: Background::new(config.screen_width, config.background_speed),
            spawn_timer: 0,
            flap_queued: false,
            tick_count: 0,
            config,
        }
    }

    /// Start-of-run state: bird at rest at the start position, a single pipe
    /// far off-screen, counters and current score zeroed. `best` is kept.
    pub fn reset_run<R: Rng>(&mut self, rng: &mut R) {
        self.bird = Bird::new(&self.config);
        self.pipes.clear();
        let first_x = self.config.screen_width + self.config.first_pipe_offset;
        self.pipes.push(Pipe::random(first_x, &self.config, rng));
        self.spawn_timer = 0;
        self.flap_queued = false;
        self.tick_count = 0;
        self.score.current = 0;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Playing | GamePhase::Paused)
    }
}
