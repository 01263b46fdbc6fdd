//! UI rendering for the Flappy Bird world.

use super::game_common::{
    create_game_layout, render_info_panel_frame, render_modal, render_status_bar,
};
use super::Hud;
use handflap::flappy::{GamePhase, WorldState};
use handflap::gesture::GestureLabel;
use handflap::input::InputSource;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const INFO_PANEL_WIDTH: u16 = 24;
const TEXTURE_SPACING: i64 = 12;

/// Render the whole scene for the current phase.
pub fn render_flappy(frame: &mut Frame, area: Rect, world: &WorldState, hud: &Hud) {
    let layout = create_game_layout(frame, area, " Handflap ", Color::Cyan, INFO_PANEL_WIDTH);

    let dimmed = matches!(world.phase, GamePhase::Paused | GamePhase::GameOver);
    render_play_area(frame, layout.content, world, dimmed);
    render_status_bar_content(frame, layout.status_bar, world);
    render_info_panel(frame, layout.info_panel, world, hud);

    match world.phase {
        GamePhase::Menu => render_menu_overlay(frame, layout.content, hud),
        GamePhase::Paused => render_modal(
            frame,
            layout.content,
            Color::Yellow,
            vec![
                Line::from(Span::styled(
                    "PAUSED",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press P to resume",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        ),
        GamePhase::GameOver => render_game_over_overlay(frame, layout.content, world, hud),
        GamePhase::Playing => {}
    }
}

/// Maps world coordinates onto terminal cells.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    cols: u16,
    rows: u16,
    x_scale: f64,
    y_scale: f64,
}

impl Viewport {
    fn new(area: Rect, world_width: f64, world_height: f64) -> Self {
        Self {
            cols: area.width,
            rows: area.height,
            x_scale: area.width as f64 / world_width,
            y_scale: area.height as f64 / world_height,
        }
    }

    fn col(&self, x: f64) -> i64 {
        (x * self.x_scale).floor() as i64
    }

    fn row(&self, y: f64) -> i64 {
        (y * self.y_scale).floor() as i64
    }

    /// World y at the vertical centre of a display row.
    fn row_center(&self, row: u16) -> f64 {
        (row as f64 + 0.5) / self.y_scale
    }

    /// Display columns covered by `[x, x + width)`; at least one column.
    fn col_span(&self, x: f64, width: f64) -> (i64, i64) {
        let start = self.col(x);
        let end = ((x + width) * self.x_scale).ceil() as i64;
        (start, end.max(start + 1))
    }

    /// Bird cell, clamped to the grid.
    fn cell(&self, x: f64, y: f64) -> (u16, u16) {
        let col = self.col(x).clamp(0, self.cols as i64 - 1);
        let row = self.row(y).clamp(0, self.rows as i64 - 1);
        (col as u16, row as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Texture,
    Pipe,
    PipeCap,
    Bird,
}

/// Build the grid of cells for the current world.
fn rasterize(world: &WorldState, view: &Viewport) -> Vec<Vec<Cell>> {
    let cols = view.cols as usize;
    let rows = view.rows as usize;
    let mut grid = vec![vec![Cell::Empty; cols]; rows];

    let scroll = view.col(-world.background.x1);
    for (r, row) in grid.iter_mut().enumerate() {
        if r % 4 != 1 {
            continue;
        }
        for (c, cell) in row.iter_mut().enumerate() {
            if (c as i64 + scroll + r as i64 * 5).rem_euclid(TEXTURE_SPACING) == 0 {
                *cell = Cell::Texture;
            }
        }
    }

    let cap_depth = 1.0 / view.y_scale;
    for pipe in &world.pipes {
        let (start, end) = view.col_span(pipe.x, pipe.width);
        for c in start.max(0)..end.min(cols as i64) {
            for (r, row) in grid.iter_mut().enumerate() {
                let y = view.row_center(r as u16);
                let cell = if y < pipe.gap_start - cap_depth || y >= pipe.gap_end + cap_depth {
                    Cell::Pipe
                } else if y < pipe.gap_start || y >= pipe.gap_end {
                    Cell::PipeCap
                } else {
                    continue;
                };
                row[c as usize] = cell;
            }
        }
    }

    if cols > 0 && rows > 0 {
        let (c, r) = view.cell(world.bird.x, world.bird.y);
        grid[r as usize][c as usize] = Cell::Bird;
    }
    grid
}

fn bird_glyph(world: &WorldState) -> &'static str {
    if world.phase == GamePhase::GameOver {
        "✖"
    } else if world.bird.velocity < -1.0 {
        "▲" // Flapping up
    } else if world.bird.velocity > 4.0 {
        "▼" // Falling fast
    } else {
        "►"
    }
}

/// Render the main play area with bird and pipes.
fn render_play_area(frame: &mut Frame, area: Rect, world: &WorldState, dimmed: bool) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let view = Viewport::new(area, world.config.screen_width, world.config.screen_height);
    let dim = if dimmed {
        Modifier::DIM
    } else {
        Modifier::empty()
    };

    let lines: Vec<Line> = rasterize(world, &view)
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    Cell::Empty => Span::raw(" "),
                    Cell::Texture => Span::styled("·", Style::default().fg(Color::DarkGray)),
                    Cell::Pipe => {
                        Span::styled("█", Style::default().fg(Color::Green).add_modifier(dim))
                    }
                    Cell::PipeCap => Span::styled(
                        "▓",
                        Style::default().fg(Color::LightGreen).add_modifier(dim),
                    ),
                    Cell::Bird => Span::styled(
                        bird_glyph(world),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the status bar at the bottom.
fn render_status_bar_content(frame: &mut Frame, area: Rect, world: &WorldState) {
    match world.phase {
        GamePhase::Menu => render_status_bar(
            frame,
            area,
            "Show a gesture or press Space to start!",
            Color::Yellow,
            &[("[Space]", "Start"), ("[Q]", "Quit")],
        ),
        GamePhase::Playing => render_status_bar(
            frame,
            area,
            &format!("Score: {}   Best: {}", world.score.current, world.score.best),
            Color::Green,
            &[
                ("[Space]", "Flap"),
                ("[P]", "Pause"),
                ("[Esc]", "Menu"),
                ("[Q]", "Quit"),
            ],
        ),
        GamePhase::Paused => render_status_bar(
            frame,
            area,
            "Paused",
            Color::Yellow,
            &[("[P/Esc]", "Resume"), ("[Q]", "Quit")],
        ),
        GamePhase::GameOver => render_status_bar(
            frame,
            area,
            "Crashed!",
            Color::Red,
            &[("[R]", "Restart"), ("[Esc]", "Menu"), ("[Q]", "Quit")],
        ),
    }
}

fn gesture_color(hud: &Hud) -> Color {
    match hud.gesture.label {
        GestureLabel::None => Color::DarkGray,
        _ if hud.gesture.activate => Color::Green,
        _ => Color::White,
    }
}

/// Render the info panel on the right.
fn render_info_panel(frame: &mut Frame, area: Rect, world: &WorldState, hud: &Hud) {
    let inner = render_info_panel_frame(frame, area);

    if inner.height < 2 || inner.width < 4 {
        return;
    }

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Score: ", label),
            Span::styled(
                format!("{}", world.score.current),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Best:  ", label),
            Span::styled(
                format!("{}", world.score.best),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Camera:  ", label),
            Span::styled(hud.camera.label(), Style::default().fg(hud.camera.color())),
        ]),
        Line::from(vec![
            Span::styled(" Gesture: ", label),
            Span::styled(
                hud.gesture.label.to_string(),
                Style::default().fg(gesture_color(hud)),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Fingers: ", label),
            Span::styled(
                format!("{}", hud.gesture.finger_count),
                Style::default().fg(Color::White),
            ),
        ]),
    ];

    if let Some(source) = hud.last_flap {
        let source = match source {
            InputSource::Keyboard => "keyboard",
            InputSource::Gesture => "gesture",
        };
        lines.push(Line::from(vec![
            Span::styled(" Flap:    ", label),
            Span::styled(source, Style::default().fg(Color::Cyan)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_menu_overlay(frame: &mut Frame, area: Rect, hud: &Hud) {
    let hint = Style::default().fg(Color::DarkGray);
    render_modal(
        frame,
        area,
        Color::Cyan,
        vec![
            Line::from(Span::styled(
                "HANDFLAP",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Flap with a peace sign, a thumbs up,",
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                format!("or {}+ raised fingers", hud.min_fingers),
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled("Keyboard: Space / Up / Enter", hint)),
            Line::from(""),
            Line::from(vec![
                Span::styled("Camera: ", hint),
                Span::styled(hud.camera.label(), Style::default().fg(hud.camera.color())),
            ]),
        ],
    );
}

fn render_game_over_overlay(frame: &mut Frame, area: Rect, world: &WorldState, hud: &Hud) {
    let mut lines = vec![
        Line::from(Span::styled(
            "GAME OVER",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Score: {}", world.score.current),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            format!("Best:  {}", world.score.best),
            Style::default().fg(Color::Yellow),
        )),
    ];
    if hud.new_best {
        lines.push(Line::from(Span::styled(
            "NEW BEST!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[R] Restart  [Esc] Menu  [Q] Quit",
        Style::default().fg(Color::DarkGray),
    )));
    render_modal(frame, area, Color::Red, lines);
}
