use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::components::{Pos, Tile};
use crate::session::{SessionOutcome, Snapshot};

const CELL_W: usize = 2;
const BELL: char = '\u{7}';

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Pursuer,
    Wall,
    Empty,
    Collectible,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

/// Draws snapshots to a terminal, only touching cells that changed since the
/// previous frame.
pub struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Cell>,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![BLANK; width * height],
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces the next frame to repaint everything.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn draw(
        &mut self,
        out: &mut impl Write,
        snapshot: &Snapshot<'_>,
        sound: &Sound,
        (term_w, term_h): (u16, u16),
    ) -> io::Result<()> {
        let needed_w = self.width.saturating_mul(CELL_W);
        let needed_h = self.height.saturating_add(2);

        out.queue(MoveTo(0, 0))?;
        let fits = match (u16::try_from(needed_w), u16::try_from(needed_h)) {
            (Ok(w), Ok(h)) if w <= term_w && h <= term_h => Some((w, h)),
            _ => None,
        };
        let Some((needed_w, needed_h)) = fits else {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        };

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = format!(
            "Score: {}  Dots: {}  Sound: {}  (arrows/hjkl move, m sound, r restart, q quit)",
            snapshot.score,
            snapshot.remaining,
            if sound.is_enabled() { "on" } else { "off" },
        );
        if self.needs_full || hud != self.last_hud {
            self.draw_line(out, self.origin_y - 1, Color::White, &hud)?;
            self.last_hud = hud;
        }

        for (y, row) in snapshot.map.rows().enumerate() {
            for (x, &tile) in row.iter().enumerate() {
                let cell = cell_for(snapshot, Pos::new(x, y), tile);
                let idx = y * self.width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, x, y, cell)?;
                }
            }
        }

        let status = status_line(snapshot.outcome);
        if self.needs_full || status != self.last_status {
            let color = match snapshot.outcome {
                SessionOutcome::Won(_) => Color::Green,
                _ => Color::Red,
            };
            self.draw_line(out, self.origin_y + self.height as u16, color, &status)?;
            self.last_status = status;
        }
        self.needs_full = false;

        out.flush()
    }

    fn draw_line(&self, out: &mut impl Write, y: u16, color: Color, text: &str) -> io::Result<()> {
        out.queue(MoveTo(self.origin_x, y))?;
        out.queue(SetForegroundColor(color))?;
        out.queue(Clear(ClearType::CurrentLine))?;
        out.queue(Print(text))?;
        out.queue(ResetColor)?;
        Ok(())
    }

    fn draw_cell(&self, out: &mut impl Write, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Pursuer => "👻",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Collectible => "· ",
        };
        // The board was checked to fit the terminal, so these stay in range.
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            out.queue(Print(' '))?;
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

fn cell_for(snapshot: &Snapshot<'_>, pos: Pos, tile: Tile) -> Cell {
    if pos == snapshot.player.pos {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if pos == snapshot.pursuer.pos {
        return Cell {
            glyph: Glyph::Pursuer,
            color: Color::Red,
        };
    }
    match tile {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Tile::Empty => BLANK,
        Tile::Collectible => Cell {
            glyph: Glyph::Collectible,
            color: Color::White,
        },
    }
}

fn status_line(outcome: SessionOutcome) -> String {
    match outcome {
        SessionOutcome::InProgress => String::new(),
        SessionOutcome::Won(score) => {
            format!("YOU WIN - Final Score: {score} (r to restart, q to quit)")
        }
        SessionOutcome::Lost(score) => {
            format!("GAME OVER - Final Score: {score} (r to restart, q to quit)")
        }
    }
}

/// Terminal-bell cues for scoring and for the end of a session.
pub struct Sound {
    enabled: bool,
    last_score: u32,
    last_outcome: SessionOutcome,
}

impl Sound {
    pub fn new() -> Self {
        Self {
            enabled: true,
            last_score: 0,
            last_outcome: SessionOutcome::InProgress,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Forgets what was heard, for a fresh session.
    pub fn reset(&mut self) {
        self.last_score = 0;
        self.last_outcome = SessionOutcome::InProgress;
    }

    /// Rings the bell if the score went up or the session just ended.
    /// Returns whether it rang.
    pub fn observe(&mut self, out: &mut impl Write, snapshot: &Snapshot<'_>) -> io::Result<bool> {
        let ended = snapshot.outcome.is_terminal() && !self.last_outcome.is_terminal();
        let cue = snapshot.score > self.last_score || ended;
        self.last_score = snapshot.score;
        self.last_outcome = snapshot.outcome;

        if !(cue && self.enabled) {
            return Ok(false);
        }
        out.queue(Print(BELL))?;
        Ok(true)
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self::new()
    }
}
