//! Game logic for the Flappy Bird world: phase transitions, bird physics,
//! pipe scrolling and spawning, scoring, and collision detection.

use super::types::{CrashCause, GameCommand, GamePhase, Pipe, WorldState};
use rand::Rng;
use tracing::{debug, info};

/// Phase transition table. `None` means the command does not change phase
/// (it may still have an effect, e.g. flap while playing or quit).
pub fn next_phase(phase: GamePhase, command: GameCommand) -> Option<GamePhase> {
    use GameCommand::*;
    use GamePhase::*;

    match (phase, command) {
        (Menu, Flap) => Some(Playing),
        (Playing, PauseToggle) => Some(Paused),
        (Playing, ReturnToMenu) => Some(Menu),
        (Paused, PauseToggle) => Some(Playing),
        (Paused, ReturnToMenu) => Some(Menu),
        (GameOver, Restart) => Some(Playing),
        (GameOver, ReturnToMenu) => Some(Menu),
        _ => None,
    }
}

/// Result of applying one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Not valid in the current phase.
    Ignored,
    /// Flap buffered for the next tick.
    FlapQueued,
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// The player asked to quit. Any run in progress has been folded into best.
    Quit,
}

impl CommandOutcome {
    /// True when a run was left for the menu before crashing.
    pub fn abandoned_run(&self) -> bool {
        matches!(
            self,
            Self::PhaseChanged {
                from: GamePhase::Playing | GamePhase::Paused,
                to: GamePhase::Menu,
            }
        )
    }
}

/// Apply a single command to the world.
pub fn process_command<R: Rng>(
    world: &mut WorldState,
    command: GameCommand,
    rng: &mut R,
) -> CommandOutcome {
    if command == GameCommand::Quit {
        if world.is_running() {
            world.score.fold_best();
        }
        info!(phase = ?world.phase, "quit requested");
        return CommandOutcome::Quit;
    }

    if world.phase == GamePhase::Playing && command == GameCommand::Flap {
        world.flap_queued = true;
        return CommandOutcome::FlapQueued;
    }

    let Some(to) = next_phase(world.phase, command) else {
        debug!(phase = ?world.phase, ?command, "command ignored");
        return CommandOutcome::Ignored;
    };
    let from = world.phase;

    match (from, to) {
        (GamePhase::Menu | GamePhase::GameOver, GamePhase::Playing) => {
            world.reset_run(rng);
        }
        (GamePhase::Playing | GamePhase::Paused, GamePhase::Menu) => {
            world.score.fold_best();
        }
        // A flap belongs to the tick it arrived for, not the one after resume.
        (GamePhase::Playing, GamePhase::Paused) => {
            world.flap_queued = false;
        }
        _ => {}
    }

    world.phase = to;
    info!(?from, ?to, "phase changed");
    CommandOutcome::PhaseChanged { from, to }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    PipePassed { score: u32 },
    PipeSpawned { gap_start: f64 },
    PipeRemoved,
    Crashed {
        cause: CrashCause,
        final_score: u32,
        best: u32,
        new_best: bool,
    },
}

/// Advance the world one fixed tick. Does nothing unless playing.
///
/// Order: bird physics, background, pipes (move, score, cull), spawning,
/// collisions.
pub fn process_tick<R: Rng>(world: &mut WorldState, rng: &mut R) -> Vec<WorldEvent> {
    let mut events = Vec::new();
    if world.phase != GamePhase::Playing {
        return events;
    }
    world.tick_count += 1;

    apply_bird_physics(world);
    world.background.advance();
    update_pipes(world, &mut events);
    spawn_pipes(world, rng, &mut events);

    if let Some(cause) = check_collision(world) {
        let new_best = world.score.fold_best();
        world.phase = GamePhase::GameOver;
        info!(
            ?cause,
            score = world.score.current,
            best = world.score.best,
            ticks = world.tick_count,
            "game over"
        );
        events.push(WorldEvent::Crashed {
            cause,
            final_score: world.score.current,
            best: world.score.best,
            new_best,
        });
    }

    events
}

/// Gravity integration. A queued flap replaces the velocity before gravity
/// is added; the bird is clamped to the playfield with velocity zeroed.
fn apply_bird_physics(world: &mut WorldState) {
    let config = &world.config;
    let bird = &mut world.bird;

    if world.flap_queued {
        bird.velocity = config.jump_impulse;
        world.flap_queued = false;
    }
    bird.velocity += config.gravity;
    bird.y += bird.velocity;

    let floor = config.screen_height - bird.radius;
    if bird.y < bird.radius {
        bird.y = bird.radius;
        bird.velocity = 0.0;
    } else if bird.y > floor {
        bird.y = floor;
        bird.velocity = 0.0;
    }
}

fn update_pipes(world: &mut WorldState, events: &mut Vec<WorldEvent>) {
    let speed = world.config.pipe_speed;
    let bird_x = world.bird.x;

    for pipe in &mut world.pipes {
        pipe.x -= speed;
        if !pipe.passed && pipe.trailing_edge() < bird_x {
            pipe.passed = true;
            world.score.current += 1;
            events.push(WorldEvent::PipePassed {
                score: world.score.current,
            });
        }
    }

    let before = world.pipes.len();
    world.pipes.retain(|p| !p.is_off_screen());
    for _ in world.pipes.len()..before {
        events.push(WorldEvent::PipeRemoved);
    }
}

fn spawn_pipes<R: Rng>(world: &mut WorldState, rng: &mut R, events: &mut Vec<WorldEvent>) {
    world.spawn_timer += 1;
    if world.spawn_timer < world.config.spawn_delay_ticks {
        return;
    }
    let pipe = Pipe::random(world.config.screen_width, &world.config, rng);
    events.push(WorldEvent::PipeSpawned {
        gap_start: pipe.gap_start,
    });
    world.pipes.push(pipe);
    world.spawn_timer = 0;
}

/// Ground first, then any pipe overlapping the bird horizontally.
fn check_collision(world: &WorldState) -> Option<CrashCause> {
    let bird = &world.bird;
    let screen_height = world.config.screen_height;

    if bird.y + bird.radius >= screen_height {
        return Some(CrashCause::Ground);
    }

    let bounds = bird.bounds();
    for pipe in &world.pipes {
        let overlaps_x = bounds.x < pipe.trailing_edge() && pipe.x < bounds.right();
        if !overlaps_x {
            continue;
        }
        let (top, bottom) = pipe.collision_rects(screen_height);
        if bounds.intersects(&top) || bounds.intersects(&bottom) {
            return Some(CrashCause::Pipe);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f64 = 1e-9;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn playing_world(config: GameConfig) -> (WorldState, ChaCha8Rng) {
        let mut rng = rng();
        let mut world = WorldState::new(config, 0);
        process_command(&mut world, GameCommand::Flap, &mut rng);
        assert_eq!(world.phase, GamePhase::Playing);
        (world, rng)
    }

    /// Zero gravity, full-height gap, no spawning: the bird hovers forever.
    fn hover_config() -> GameConfig {
        GameConfig {
            gravity: 0.0,
            pipe_gap: 600.0,
            gap_margin: 0.0,
            spawn_delay_ticks: 100_000,
            ..Default::default()
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    #[test]
    fn test_transition_table_is_exhaustive() {
        use GameCommand::*;
        use GamePhase::*;

        let allowed = [
            (Menu, Flap, Playing),
            (Playing, PauseToggle, Paused),
            (Playing, ReturnToMenu, Menu),
            (Paused, PauseToggle, Playing),
            (Paused, ReturnToMenu, Menu),
            (GameOver, Restart, Playing),
            (GameOver, ReturnToMenu, Menu),
        ];
        for phase in GamePhase::ALL {
            for command in GameCommand::ALL {
                let expected = allowed
                    .iter()
                    .find(|(p, c, _)| *p == phase && *c == command)
                    .map(|(_, _, to)| *to);
                assert_eq!(next_phase(phase, command), expected, "{phase:?} + {command:?}");
            }
        }
    }

    #[test]
    fn test_invalid_commands_are_ignored() {
        let mut rng = rng();
        let mut world = WorldState::new(GameConfig::default(), 0);
        for command in [
            GameCommand::PauseToggle,
            GameCommand::Restart,
            GameCommand::ReturnToMenu,
        ] {
            assert_eq!(
                process_command(&mut world, command, &mut rng),
                CommandOutcome::Ignored
            );
            assert_eq!(world.phase, GamePhase::Menu);
        }

        process_command(&mut world, GameCommand::Flap, &mut rng);
        assert_eq!(
            process_command(&mut world, GameCommand::Restart, &mut rng),
            CommandOutcome::Ignored
        );
        assert_eq!(world.phase, GamePhase::Playing);
    }

    #[test]
    fn test_flap_in_menu_starts_without_queueing() {
        let (world, _) = playing_world(GameConfig::default());
        assert!(!world.flap_queued);
        assert_eq!(world.pipes.len(), 1);
        assert_eq!(world.pipes[0].x, 1000.0);
    }

    #[test]
    fn test_flap_while_playing_is_queued() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        assert_eq!(
            process_command(&mut world, GameCommand::Flap, &mut rng),
            CommandOutcome::FlapQueued
        );
        assert!(world.flap_queued);
        process_tick(&mut world, &mut rng);
        assert!(!world.flap_queued);
    }

    #[test]
    fn test_pause_toggle_preserves_world() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        for _ in 0..10 {
            process_tick(&mut world, &mut rng);
        }
        let bird = world.bird.clone();
        let pipes = world.pipes.clone();

        process_command(&mut world, GameCommand::PauseToggle, &mut rng);
        assert_eq!(world.phase, GamePhase::Paused);
        for _ in 0..50 {
            assert!(process_tick(&mut world, &mut rng).is_empty());
        }
        assert_eq!(world.bird, bird);
        assert_eq!(world.pipes, pipes);

        process_command(&mut world, GameCommand::PauseToggle, &mut rng);
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.bird, bird);
    }

    #[test]
    fn test_flap_ignored_while_paused() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        process_command(&mut world, GameCommand::PauseToggle, &mut rng);
        assert_eq!(
            process_command(&mut world, GameCommand::Flap, &mut rng),
            CommandOutcome::Ignored
        );
        assert!(!world.flap_queued);
    }

    #[test]
    fn test_pause_drops_pending_flap() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        process_command(&mut world, GameCommand::Flap, &mut rng);
        process_command(&mut world, GameCommand::PauseToggle, &mut rng);
        assert!(!world.flap_queued);

        process_command(&mut world, GameCommand::PauseToggle, &mut rng);
        process_tick(&mut world, &mut rng);
        // Plain gravity from rest on the first tick after resume.
        assert_eq!(world.bird.velocity, world.config.gravity);
    }

    #[test]
    fn test_restart_after_game_over_resets_run() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        world.score.current = 4;
        world.bird.y = 579.0;
        world.bird.velocity = 5.0;
        process_tick(&mut world, &mut rng);
        assert_eq!(world.phase, GamePhase::GameOver);
        assert_eq!(world.score.best, 4);

        let outcome = process_command(&mut world, GameCommand::Restart, &mut rng);
        assert_eq!(
            outcome,
            CommandOutcome::PhaseChanged {
                from: GamePhase::GameOver,
                to: GamePhase::Playing
            }
        );
        assert_eq!(world.score.current, 0);
        assert_eq!(world.score.best, 4);
        assert_eq!(world.bird.y, 300.0);
        assert_eq!(world.bird.velocity, 0.0);
        assert_eq!(world.pipes.len(), 1);
        assert_eq!(world.spawn_timer, 0);
    }

    #[test]
    fn test_return_to_menu_folds_best() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        world.score.current = 9;
        process_command(&mut world, GameCommand::PauseToggle, &mut rng);
        let outcome = process_command(&mut world, GameCommand::ReturnToMenu, &mut rng);
        assert!(outcome.abandoned_run());
        assert_eq!(world.phase, GamePhase::Menu);
        assert_eq!(world.score.best, 9);
    }

    #[test]
    fn test_quit_is_accepted_in_every_phase() {
        let mut rng = rng();
        for phase in GamePhase::ALL {
            let mut world = WorldState::new(GameConfig::default(), 0);
            world.phase = phase;
            world.score.current = 3;
            assert_eq!(
                process_command(&mut world, GameCommand::Quit, &mut rng),
                CommandOutcome::Quit
            );
            let folded = matches!(phase, GamePhase::Playing | GamePhase::Paused);
            assert_eq!(world.score.best, if folded { 3 } else { 0 });
        }
    }

    // ── Physics ──────────────────────────────────────────────────────

    #[test]
    fn test_one_tick_from_rest_without_flap() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        process_tick(&mut world, &mut rng);
        assert!((world.bird.velocity - 0.9).abs() < EPS);
        assert!((world.bird.y - 300.9).abs() < EPS);
    }

    #[test]
    fn test_flap_overrides_velocity_then_gravity_applies() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        world.bird.velocity = 7.0;

        process_command(&mut world, GameCommand::Flap, &mut rng);
        process_tick(&mut world, &mut rng);
        assert!((world.bird.velocity - (-10.1)).abs() < EPS);
    }

    #[test]
    fn test_two_tick_scenario() {
        let (mut world, mut rng) = playing_world(GameConfig::default());

        process_command(&mut world, GameCommand::Flap, &mut rng);
        process_tick(&mut world, &mut rng);
        assert!((world.bird.velocity - (-10.1)).abs() < EPS);
        assert!((world.bird.y - 289.9).abs() < EPS);

        process_tick(&mut world, &mut rng);
        assert!((world.bird.velocity - (-9.2)).abs() < EPS);
        assert!((world.bird.y - 280.7).abs() < EPS);
    }

    #[test]
    fn test_ceiling_clamp_kills_velocity_but_not_bird() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        world.bird.y = 22.0;
        world.bird.velocity = -10.0;
        let events = process_tick(&mut world, &mut rng);
        assert_eq!(world.bird.y, 20.0);
        assert_eq!(world.bird.velocity, 0.0);
        assert_eq!(world.phase, GamePhase::Playing);
        assert!(events.is_empty());
    }

    #[test]
    fn test_floor_clamp_ends_game() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        world.score.best = 2;
        world.score.current = 5;
        world.bird.y = 579.0;
        world.bird.velocity = 5.0;

        let events = process_tick(&mut world, &mut rng);
        assert_eq!(world.bird.y, 580.0);
        assert_eq!(world.bird.velocity, 0.0);
        assert_eq!(world.phase, GamePhase::GameOver);
        assert_eq!(
            events.last(),
            Some(&WorldEvent::Crashed {
                cause: CrashCause::Ground,
                final_score: 5,
                best: 5,
                new_best: true,
            })
        );
    }

    #[test]
    fn test_best_not_lowered_by_worse_run() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        world.score.best = 10;
        world.score.current = 1;
        world.bird.y = 590.0;
        let events = process_tick(&mut world, &mut rng);
        assert_eq!(world.score.best, 10);
        assert!(matches!(
            events.last(),
            Some(WorldEvent::Crashed { new_best: false, best: 10, .. })
        ));
    }

    #[test]
    fn test_no_ticking_outside_playing() {
        let mut rng = rng();
        let mut world = WorldState::new(GameConfig::default(), 0);
        let y = world.bird.y;
        process_tick(&mut world, &mut rng);
        assert_eq!(world.bird.y, y);
        assert_eq!(world.tick_count, 0);
    }

    // ── Pipes ────────────────────────────────────────────────────────

    #[test]
    fn test_scoring_once_per_pipe() {
        let (mut world, mut rng) = playing_world(hover_config());
        world.pipes = vec![Pipe::new(52.0, 0.0, &world.config)];

        let events = process_tick(&mut world, &mut rng);
        assert_eq!(world.score.current, 1);
        assert!(world.pipes[0].passed);
        assert!(events.contains(&WorldEvent::PipePassed { score: 1 }));

        for _ in 0..10 {
            process_tick(&mut world, &mut rng);
        }
        assert_eq!(world.score.current, 1);
    }

    #[test]
    fn test_trailing_edge_level_with_bird_does_not_score() {
        let (mut world, mut rng) = playing_world(hover_config());
        // After one tick the trailing edge sits exactly at bird.x.
        world.pipes = vec![Pipe::new(53.0, 0.0, &world.config)];
        process_tick(&mut world, &mut rng);
        assert_eq!(world.pipes[0].trailing_edge(), 100.0);
        assert_eq!(world.score.current, 0);
        process_tick(&mut world, &mut rng);
        assert_eq!(world.score.current, 1);
    }

    #[test]
    fn test_pipe_removed_exactly_when_fully_off_screen() {
        let (mut world, mut rng) = playing_world(hover_config());
        world.pipes = vec![Pipe::new(850.0, 0.0, &world.config)];

        for _ in 0..300 {
            process_tick(&mut world, &mut rng);
        }
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.pipes.len(), 1);
        assert_eq!(world.pipes[0].trailing_edge(), 0.0);

        let events = process_tick(&mut world, &mut rng);
        assert!(world.pipes.is_empty());
        assert!(events.contains(&WorldEvent::PipeRemoved));
    }

    #[test]
    fn test_spawn_every_delay_ticks_at_right_edge() {
        let config = GameConfig {
            spawn_delay_ticks: 120,
            ..hover_config()
        };
        let (mut world, mut rng) = playing_world(config);
        world.pipes.clear();

        for _ in 0..119 {
            process_tick(&mut world, &mut rng);
        }
        assert!(world.pipes.is_empty());

        let events = process_tick(&mut world, &mut rng);
        assert_eq!(world.pipes.len(), 1);
        assert_eq!(world.pipes[0].x, 800.0);
        assert_eq!(world.spawn_timer, 0);
        assert!(matches!(events[0], WorldEvent::PipeSpawned { .. }));

        for _ in 0..120 {
            process_tick(&mut world, &mut rng);
        }
        assert_eq!(world.pipes.len(), 2);
    }

    #[test]
    fn test_pipes_stay_in_spawn_order_without_overlap() {
        let config = GameConfig {
            gravity: 0.0,
            pipe_gap: 600.0,
            gap_margin: 0.0,
            ..Default::default()
        };
        let (mut world, mut rng) = playing_world(config);
        for _ in 0..2000 {
            process_tick(&mut world, &mut rng);
            for pair in world.pipes.windows(2) {
                assert!(pair[0].trailing_edge() < pair[1].x);
            }
        }
        assert_eq!(world.phase, GamePhase::Playing);
    }

    // ── Collisions ───────────────────────────────────────────────────

    #[test]
    fn test_pipe_collision_outside_gap() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        // Gap 400..580 is below the bird at y~300.
        world.pipes = vec![Pipe::new(93.0, 400.0, &world.config)];
        let events = process_tick(&mut world, &mut rng);
        assert_eq!(world.phase, GamePhase::GameOver);
        assert!(matches!(
            events.last(),
            Some(WorldEvent::Crashed { cause: CrashCause::Pipe, .. })
        ));
    }

    #[test]
    fn test_no_collision_inside_gap() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        world.pipes = vec![Pipe::new(93.0, 200.0, &world.config)];
        process_tick(&mut world, &mut rng);
        assert_eq!(world.phase, GamePhase::Playing);
    }

    #[test]
    fn test_pipe_not_yet_reached_does_not_collide() {
        let (mut world, mut rng) = playing_world(GameConfig::default());
        // Leading edge ends at 123, bird spans 80..120.
        world.pipes = vec![Pipe::new(126.0, 500.0, &world.config)];
        process_tick(&mut world, &mut rng);
        assert_eq!(world.phase, GamePhase::Playing);
    }
}
