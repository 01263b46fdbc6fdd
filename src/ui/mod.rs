pub mod flappy_scene;
pub mod game_common;

use handflap::flappy::WorldState;
use handflap::gesture::GestureResult;
use handflap::input::InputSource;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

const MIN_COLS: u16 = 40;
const MIN_ROWS: u16 = 14;

/// State of the hand tracker as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStatus {
    /// No tracker configured.
    Off,
    Live,
    /// The tracker was running and has stopped.
    Lost,
}

impl CameraStatus {
    pub fn label(self) -> &'static str {
        match self {
            CameraStatus::Off => "not available",
            CameraStatus::Live => "live",
            CameraStatus::Lost => "lost",
        }
    }

    pub fn color(self) -> Color {
        match self {
            CameraStatus::Off => Color::DarkGray,
            CameraStatus::Live => Color::Green,
            CameraStatus::Lost => Color::Red,
        }
    }
}

/// Per-frame presentation state that is not part of the world.
#[derive(Debug, Clone)]
pub struct Hud {
    pub gesture: GestureResult,
    pub camera: CameraStatus,
    pub last_flap: Option<InputSource>,
    /// The last crash set a new best score.
    pub new_best: bool,
    /// Raised fingers needed for a finger-count flap.
    pub min_fingers: u8,
}

impl Hud {
    pub fn new(camera: CameraStatus, min_fingers: u8) -> Self {
        Self {
            gesture: GestureResult::absent(),
            camera,
            last_flap: None,
            new_best: false,
            min_fingers,
        }
    }
}

/// Main UI drawing function.
pub fn draw(frame: &mut Frame, world: &WorldState, hud: &Hud) {
    let area = frame.size();
    if area.width < MIN_COLS || area.height < MIN_ROWS {
        render_too_small(frame);
        return;
    }
    flappy_scene::render_flappy(frame, area, world, hud);
}

fn render_too_small(frame: &mut Frame) {
    let area = frame.size();
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Terminal too small",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "Need: {}x{}   Have: {}x{}",
                MIN_COLS, MIN_ROWS, area.width, area.height
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(text, area);
}
