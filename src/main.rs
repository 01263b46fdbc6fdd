mod ui;

use clap::Parser;
use crossterm::cursor;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use handflap::core::config::{Config, TrackerConfig};
use handflap::core::constants::{LOG_FILE, REPLAY_FRAME_MS};
use handflap::core::tick::game_tick;
use handflap::flappy::persistence::HighScoreFile;
use handflap::flappy::{GameCommand, WorldEvent, WorldState};
use handflap::gesture::GestureController;
use handflap::input::{map_key, CommandBus, InputSource};
use handflap::landmarks::{
    spawn_pose_worker, FrameGeometry, PoseFeed, ReplaySource, SubprocessSource,
};
use handflap::utils::{build_info, persistence};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use ui::{CameraStatus, Hud};

#[derive(Parser, Debug)]
#[command(name = "handflap", about = "Flappy Bird in the terminal, flown with hand gestures")]
struct Cli {
    /// Config file (default: ~/.handflap/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hand landmark detector command (prints one JSON line per frame)
    #[arg(long)]
    tracker_cmd: Option<String>,

    /// Extra argument passed to the detector (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    tracker_arg: Vec<String>,

    /// Replay recorded landmark lines instead of running a detector
    #[arg(long, conflicts_with = "tracker_cmd")]
    replay: Option<PathBuf>,

    /// Raised fingers needed for a finger-count flap
    #[arg(long)]
    min_fingers: Option<u8>,

    /// Minimum milliseconds between gesture flaps
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Seed for pipe placement
    #[arg(long)]
    seed: Option<u64>,

    /// Game ticks per second
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", build_info::version_string());
        return Ok(());
    }

    init_logging();
    info!("{} starting", build_info::version_string());

    let config = load_config(&cli);
    let high_scores = HighScoreFile::default_location();
    let best = high_scores.load_best();
    let feed = start_pose_feed(cli.replay.as_deref(), &config.tracker);
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut app = App::new(config, feed, high_scores, best, rng);

    enable_raw_mode()?;
    let result = run_terminal(&mut app);
    let restored = restore_terminal();
    app.shutdown();

    if let Err(e) = &result {
        warn!("game loop failed: {}", e);
    }
    info!(best = app.world.score.best, "exiting");
    result.and(restored)
}

/// Log to ~/.handflap/handflap.log; the terminal belongs to the game.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "handflap=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    let log_file = persistence::save_path(LOG_FILE)
        .and_then(|path| OpenOptions::new().create(true).append(true).open(path));
    match log_file {
        Ok(file) => builder.with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(io::sink).init(),
    }
}

/// Defaults, then the config file, then command-line overrides.
fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load_default_location(),
    };

    if let Some(command) = &cli.tracker_cmd {
        config.tracker.command = Some(command.clone());
    }
    if !cli.tracker_arg.is_empty() {
        config.tracker.args = cli.tracker_arg.clone();
    }
    if let Some(n) = cli.min_fingers {
        config.gesture.min_fingers_for_flap = n;
    }
    if let Some(ms) = cli.cooldown_ms {
        config.gesture.flap_cooldown_ms = ms;
    }
    if let Some(rate) = cli.tick_rate {
        config.game.ticks_per_second = rate;
    }
    config.sanitized()
}

/// Start the landmark worker. Any failure leaves a disconnected feed, so
/// the game falls back to keyboard play.
fn start_pose_feed(replay: Option<&Path>, tracker: &TrackerConfig) -> PoseFeed {
    let max_age = tracker.pose_max_age();
    let started = if let Some(path) = replay {
        info!(path = %path.display(), "replaying landmarks");
        ReplaySource::open(path, FrameGeometry::from_config(tracker)).and_then(|source| {
            let source = source.with_frame_interval(Duration::from_millis(REPLAY_FRAME_MS));
            spawn_pose_worker(source, max_age)
        })
    } else if let Some(command) = &tracker.command {
        SubprocessSource::spawn(command, tracker).and_then(|source| spawn_pose_worker(source, max_age))
    } else {
        info!("no hand tracker configured, keyboard only");
        return PoseFeed::disconnected();
    };

    match started {
        Ok(feed) => feed,
        Err(e) => {
            warn!("hand tracker unavailable, keyboard only: {}", e);
            PoseFeed::disconnected()
        }
    }
}

struct App {
    world: WorldState,
    gestures: GestureController,
    commands: CommandBus,
    feed: PoseFeed,
    /// The feed was live at startup.
    tracker_started: bool,
    high_scores: HighScoreFile,
    hud: Hud,
    rng: StdRng,
    tick_interval: Duration,
}

impl App {
    fn new(
        config: Config,
        feed: PoseFeed,
        high_scores: HighScoreFile,
        best: u32,
        rng: StdRng,
    ) -> Self {
        let tracker_started = feed.is_connected();
        let camera = if tracker_started {
            CameraStatus::Live
        } else {
            CameraStatus::Off
        };
        Self {
            gestures: GestureController::new(&config.gesture),
            commands: CommandBus::new(),
            tracker_started,
            high_scores,
            hud: Hud::new(camera, config.gesture.min_fingers_for_flap),
            rng,
            tick_interval: config.game.tick_interval(),
            world: WorldState::new(config.game, best),
            feed,
        }
    }

    fn camera_status(&self) -> CameraStatus {
        if self.feed.is_connected() {
            CameraStatus::Live
        } else if self.tracker_started {
            CameraStatus::Lost
        } else {
            CameraStatus::Off
        }
    }

    fn handle_key(&mut self, key: event::KeyEvent) {
        if let Some(command) = map_key(key, self.world.phase) {
            if command == GameCommand::Flap {
                self.hud.last_flap = Some(InputSource::Keyboard);
            }
            self.commands.push(command, InputSource::Keyboard);
        }
    }

    /// Advance one frame. Returns true when the player quit.
    fn step(&mut self, now: Instant) -> bool {
        let pose = self.feed.latest(now);
        let result = game_tick(
            &mut self.world,
            &mut self.gestures,
            pose.as_ref(),
            &self.commands,
            now,
            &mut self.rng,
        );

        self.hud.gesture = result.gesture;
        self.hud.camera = self.camera_status();
        if result.gesture_flap.is_some() {
            self.hud.last_flap = Some(InputSource::Gesture);
        }
        for event in &result.events {
            if let WorldEvent::Crashed { new_best, .. } = event {
                self.hud.new_best = *new_best;
            }
        }
        if result.should_save_best() {
            self.high_scores.save_best(self.world.score.best);
        }
        result.quit
    }

    /// Keep any unfinished run's score and stop the landmark worker.
    fn shutdown(&mut self) {
        if self.world.is_running() && self.world.score.fold_best() {
            self.high_scores.save_best(self.world.score.best);
        }
        self.feed.shutdown();
    }
}

fn run_terminal(app: &mut App) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    run(&mut terminal, app)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(LeaveAlternateScreen)?;
    stdout.execute(cursor::Show)?;
    Ok(())
}

/// Fixed-step loop: input is collected between ticks, the world advances
/// once per tick interval.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::draw(frame, &app.world, &app.hud))?;

        let timeout = app.tick_interval.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if last_tick.elapsed() >= app.tick_interval {
            last_tick = Instant::now();
            if app.step(last_tick) {
                return Ok(());
            }
        }
    }
}
