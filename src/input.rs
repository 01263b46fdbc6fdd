//! Input plumbing: keyboard mapping and the merged command stream.
//!
//! Keyboard keys and gesture flaps are both reduced to [`GameCommand`]s and
//! pushed onto one [`CommandBus`]. The tick drains the bus in arrival order,
//! so the world sees a single serialized input stream.

use crate::flappy::{GameCommand, GamePhase};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::{self, Receiver, Sender};

/// Where a command came from (for logging and the HUD).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Gesture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedCommand {
    pub command: GameCommand,
    pub source: InputSource,
}

/// Map a key press to a command for the current phase.
pub fn map_key(key: KeyEvent, phase: GamePhase) -> Option<GameCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(GameCommand::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(GameCommand::Flap),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(GameCommand::PauseToggle),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameCommand::Restart),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(GameCommand::Quit),
        KeyCode::Esc if phase == GamePhase::Paused => Some(GameCommand::PauseToggle),
        KeyCode::Esc => Some(GameCommand::ReturnToMenu),
        _ => None,
    }
}

/// Producer handle for the command bus. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<QueuedCommand>,
}

impl CommandSender {
    /// Returns false if the bus has been dropped.
    pub fn send(&self, command: GameCommand, source: InputSource) -> bool {
        self.tx.send(QueuedCommand { command, source }).is_ok()
    }
}

/// Single consumer of every input source.
#[derive(Debug)]
pub struct CommandBus {
    tx: Sender<QueuedCommand>,
    rx: Receiver<QueuedCommand>,
}

impl CommandBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, command: GameCommand, source: InputSource) {
        // The bus holds its own receiver, so this cannot fail.
        let _ = self.tx.send(QueuedCommand { command, source });
    }

    /// Everything queued since the last drain, oldest first.
    pub fn drain(&self) -> Vec<QueuedCommand> {
        self.rx.try_iter().collect()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}
