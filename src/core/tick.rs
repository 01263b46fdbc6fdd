//! One fixed-timestep frame.
//!
//! `game_tick()` runs the gesture stage on the newest hand pose, merges any
//! resulting flap into the command bus behind keyboard input, applies every
//! queued command in order, and finally advances the world. It returns a
//! [`TickResult`] so the binary can persist and render without the core
//! doing any I/O.

use crate::flappy::logic::{process_command, process_tick, CommandOutcome, WorldEvent};
use crate::flappy::types::{GameCommand, GamePhase, WorldState};
use crate::gesture::controller::GestureController;
use crate::gesture::types::{FlapEvent, GestureResult, HandPose};
use crate::input::{CommandBus, InputSource};
use rand::Rng;
use std::time::Instant;

const GAME_STARTED: CommandOutcome = CommandOutcome::PhaseChanged {
    from: GamePhase::Menu,
    to: GamePhase::Playing,
};

/// Everything that happened during one frame.
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    /// Classification of this frame's hand pose (for the HUD).
    pub gesture: GestureResult,
    /// Flap produced by the gesture stage, if any.
    pub gesture_flap: Option<FlapEvent>,
    /// One outcome per command applied, in order.
    pub outcomes: Vec<CommandOutcome>,
    /// World events from the physics step.
    pub events: Vec<WorldEvent>,
    /// A quit command was applied; the world was not advanced.
    pub quit: bool,
}

impl TickResult {
    pub fn crashed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, WorldEvent::Crashed { .. }))
    }

    /// The best score may have changed and should be written out.
    pub fn should_save_best(&self) -> bool {
        self.quit || self.crashed() || self.outcomes.iter().any(|o| o.abandoned_run())
    }
}

/// Run one frame: gesture stage, command stream, world step.
pub fn game_tick<R: Rng>(
    world: &mut WorldState,
    gestures: &mut GestureController,
    pose: Option<&HandPose>,
    commands: &CommandBus,
    now: Instant,
    rng: &mut R,
) -> TickResult {
    let mut result = TickResult::default();

    // ── 1. Gesture stage ────────────────────────────────────────
    let (gesture, flap) = gestures.step(pose, world.phase, now);
    result.gesture = gesture;
    result.gesture_flap = flap;
    if flap.is_some() {
        commands.push(GameCommand::Flap, InputSource::Gesture);
    }

    // ── 2. Merged command stream ────────────────────────────────
    for queued in commands.drain() {
        let outcome = process_command(world, queued.command, rng);
        if outcome != CommandOutcome::Ignored {
            tracing::debug!(command = ?queued.command, source = ?queued.source, ?outcome, "command applied");
        }
        result.outcomes.push(outcome);
        if outcome == CommandOutcome::Quit {
            result.quit = true;
            return result;
        }
        // A gesture that starts the game also flaps on its first tick.
        if queued.source == InputSource::Gesture && outcome == GAME_STARTED {
            result.outcomes.push(process_command(world, GameCommand::Flap, rng));
        }
    }

    // ── 3. World step ───────────────────────────────────────────
    result.events = process_tick(world, rng);
    result
}
