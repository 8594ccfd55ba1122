//! # Display Management
//!
//! Terminal-style text rendering with macroquad.

use crate::game::RunOutcome;
use crate::rendering::{Display, LineId};
use macroquad::prelude::*;
use std::collections::VecDeque;

/// Characters revealed per second by default.
pub const DEFAULT_REVEAL_RATE: f32 = 45.0;

const TERMINAL_GREEN: Color = Color::new(0.2, 1.0, 0.4, 1.0);
const DIM_GREEN: Color = Color::new(0.1, 0.5, 0.2, 1.0);
const STATUS_AMBER: Color = Color::new(1.0, 0.75, 0.2, 1.0);

#[derive(Debug, Clone)]
struct RevealedLine {
    id: LineId,
    text: String,
    total_chars: usize,
    revealed: f32,
}

impl RevealedLine {
    fn is_complete(&self) -> bool {
        self.revealed as usize >= self.total_chars
    }

    fn visible_text(&self) -> String {
        self.text.chars().take(self.revealed as usize).collect()
    }
}

/// Macroquad display with a typewriter reveal.
///
/// Lines appear one character at a time, oldest first. Construction does not
/// touch the graphics context; only [`MacroquadDisplay::render`] does.
pub struct MacroquadDisplay {
    /// Characters revealed per second
    pub reveal_rate: f32,
    /// Font size in pixels
    pub font_size: f32,
    /// Maximum number of lines to keep
    pub max_messages: usize,
    messages: VecDeque<RevealedLine>,
    status: Option<String>,
    ending: Option<RunOutcome>,
    next_id: u64,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_RATE)
    }
}

impl MacroquadDisplay {
    pub fn new(reveal_rate: f32) -> Self {
        Self {
            reveal_rate,
            font_size: 22.0,
            max_messages: 100,
            messages: VecDeque::new(),
            status: None,
            ending: None,
            next_id: 0,
        }
    }

    /// Advances the reveal by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let mut budget = dt * self.reveal_rate;
        for line in self.messages.iter_mut().filter(|line| !line.is_complete()) {
            let missing = line.total_chars as f32 - line.revealed;
            let step = budget.min(missing);
            line.revealed += step;
            budget -= step;
            if budget <= 0.0 {
                break;
            }
        }
    }

    /// Switches to the ending screen for `outcome`.
    pub fn show_ending(&mut self, outcome: RunOutcome) {
        self.ending = Some(outcome);
    }

    pub fn ending(&self) -> Option<RunOutcome> {
        self.ending
    }

    /// Drops every line, the status and the ending screen.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.status = None;
        self.ending = None;
    }

    /// Draws the current frame.
    pub fn render(&self) {
        clear_background(BLACK);

        let width = screen_width();
        let height = screen_height();
        let line_height = self.font_size * 1.2;
        let margin = 20.0;
        let status_area = line_height * 2.0;

        // Newest rows at the bottom; older rows scroll off the top.
        let rows: Vec<String> = self
            .messages
            .iter()
            .flat_map(|line| {
                line.visible_text()
                    .split('\n')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        let capacity = ((height - status_area - margin) / line_height).max(1.0) as usize;
        let start = rows.len().saturating_sub(capacity);

        for (i, row) in rows[start..].iter().enumerate() {
            let y = margin + (i as f32 + 1.0) * line_height;
            let color = if i + start + 1 == rows.len() {
                TERMINAL_GREEN
            } else {
                DIM_GREEN
            };
            draw_text(row, margin, y, self.font_size, color);
        }

        if let Some(status) = &self.status {
            draw_rectangle(
                0.0,
                height - status_area,
                width,
                status_area,
                Color::new(0.0, 0.0, 0.0, 0.85),
            );
            draw_text(
                status,
                margin,
                height - status_area / 2.0 + self.font_size / 3.0,
                self.font_size,
                STATUS_AMBER,
            );
        }

        if let Some(outcome) = self.ending {
            self.render_ending(outcome, width, height);
        }
    }

    fn render_ending(&self, outcome: RunOutcome, width: f32, height: f32) {
        draw_rectangle(0.0, 0.0, width, height, Color::new(0.0, 0.0, 0.0, 0.75));

        let (title, color) = match outcome {
            RunOutcome::Victory => ("CONTAINMENT RESTORED", TERMINAL_GREEN),
            RunOutcome::Defeat => ("SIGNAL LOST", RED),
            RunOutcome::Quit => ("SESSION SUSPENDED", STATUS_AMBER),
        };
        let title_size = self.font_size * 2.0;
        let title_width = measure_text(title, None, title_size as u16, 1.0).width;
        draw_text(
            title,
            (width - title_width) / 2.0,
            height / 2.0,
            title_size,
            color,
        );

        let hint = match outcome {
            RunOutcome::Victory => "N: new run    ESC: exit",
            _ => "N: new run    C: continue    ESC: exit",
        };
        let hint_width = measure_text(hint, None, self.font_size as u16, 1.0).width;
        draw_text(
            hint,
            (width - hint_width) / 2.0,
            height / 2.0 + title_size,
            self.font_size,
            WHITE,
        );
    }
}

impl Display for MacroquadDisplay {
    fn show_line(&mut self, text: &str) -> LineId {
        self.next_id += 1;
        let id = LineId(self.next_id);
        self.messages.push_back(RevealedLine {
            id,
            text: text.to_string(),
            total_chars: text.chars().count(),
            revealed: 0.0,
        });
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
        id
    }

    fn is_complete(&self, id: LineId) -> bool {
        self.messages
            .iter()
            .find(|line| line.id == id)
            .map_or(true, RevealedLine::is_complete)
    }

    fn skip(&mut self, id: LineId) {
        // Skipping a line also finishes everything queued before it.
        for line in self.messages.iter_mut().filter(|line| line.id <= id) {
            line.revealed = line.total_chars as f32;
        }
    }

    fn show_status(&mut self, text: &str) {
        self.status = Some(text.to_string());
    }
}
