/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Board contents arrive as `RenderCommand`s from `sim::frame`; this
/// module only decides colors, the border and the text screens.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Outcome, MAX_NAME_CHARS};
use crate::domain::geometry::Position;
use crate::sim::frame::{self, ColorId, RenderCommand};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Self::BASE_BG }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Signed variant for absolute board cells; off-screen cells are dropped.
    fn set_at(&mut self, col: i32, row: i32, cell: Cell) {
        if col >= 0 && row >= 0 {
            self.set(col as usize, row as usize, cell);
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg));
        }
    }

    /// Write a string horizontally centered on row `y`.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg);
    }
}

// ── Palette ──

const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const ALERT: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const DIM: Color = Color::DarkGrey;

fn color_of(id: ColorId) -> Color {
    match id {
        ColorId::Mine      => Color::Rgb { r: 255, g: 90, b: 90 },
        ColorId::Person    => Color::Rgb { r: 255, g: 220, b: 50 },
        ColorId::RobotBody => Color::Rgb { r: 100, g: 200, b: 255 },
        ColorId::RobotHead => Color::Rgb { r: 80, g: 255, b: 80 },
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Terminal size in cells (columns, rows).
    pub fn size(&self) -> (i32, i32) {
        (self.term_w as i32, self.term_h as i32)
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_board(world),
            Phase::LifeLost => {
                self.compose_board(world);
                let lives = format!("Lives left: {}", world.player.lives);
                self.compose_banner(world, &["OUCH! You lost a life.", lives.as_str()], ALERT);
            }
            Phase::LevelUp => {
                self.compose_board(world);
                let level = format!("Level {}  ·  {} mines", world.player.level, world.mine_count);
                self.compose_banner(world, &["NEW LEVEL!", level.as_str()], GOLD);
            }
            Phase::GameOver(outcome) => self.compose_game_over(world, outcome),
        }

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the
        // terminal default, which may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  ___      _            ___                         ",
            r" | _ \___ | |__  ___   | _ \___ ___ __ _  _ ___ ___ ",
            r" |   / _ \| '_ \/ _ \  |   / -_|_-</ _| || / -_|_-< ",
            r" |_|_\___/|_.__/\___/  |_|_\___/__/\__|\_,_\___/__/ ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_centered(2 + i, line, GOLD);
        }

        let story = [
            "Mines have been scattered across the field.",
            "Steer the robot to each stranded person (o) and avoid the mines (.).",
            "Leave the controls alone and the autopilot takes over.",
        ];
        for (i, line) in story.iter().enumerate() {
            self.front.put_centered(8 + i, line, Color::White);
        }

        let row = 13;
        let field = format!("{:<width$}", w.name_input, width = MAX_NAME_CHARS);
        let prompt = format!("Enter your name: [{}]", field);
        self.front.put_centered(row, &prompt, HI);

        let help = [
            "Controls",
            "  ←→↑↓ / WASD   Steer",
            "  (no key)      Autopilot",
            "  Q / ESC       Quit",
            "",
            "ENTER  Start",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { GOLD } else { DIM };
            self.front.put_centered(row + 2 + i, line, color);
        }
    }

    fn compose_board(&mut self, w: &WorldState) {
        let g = &w.geom;
        let top_left = g.to_absolute(Position::new(-g.cols / 2, -g.rows / 2));
        let bottom_right = g.to_absolute(Position::new(g.cols / 2, g.rows / 2));
        let (x0, y0) = (top_left.x, top_left.y);
        let (x1, y1) = (bottom_right.x, bottom_right.y);

        // Border: the drawn cells are exactly the wall cells
        for x in x0..=x1 {
            self.front.set_at(x, y0, Cell::new('-', DIM));
            self.front.set_at(x, y1, Cell::new('-', DIM));
        }
        for y in y0..=y1 {
            self.front.set_at(x0, y, Cell::new('|', DIM));
            self.front.set_at(x1, y, Cell::new('|', DIM));
        }
        for (x, y) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
            self.front.set_at(x, y, Cell::new('+', DIM));
        }

        let status_row = (y1 + 1).max(0) as usize;
        let left = x0.max(0) as usize;
        for cmd in frame::compose(w) {
            match cmd {
                RenderCommand::Glyph { row, col, glyph, color } => {
                    self.front.set_at(col, row, Cell::new(glyph, color_of(color)));
                }
                RenderCommand::StatusLine { name, lives, score, level } => {
                    let status = format!(
                        " {}   Lives: {}   Score: {}   Level: {} ",
                        name, lives, score, level,
                    );
                    self.front.put_str(left, status_row, &status, Color::White);
                }
                RenderCommand::Advisory(text) => {
                    self.front.put_str(left, status_row + 1, &format!(" {}", text), GOLD);
                }
                RenderCommand::Message(text) => {
                    // Right-aligned so it never covers the advisory
                    let col = (x1 - text.chars().count() as i32).max(x0).max(0) as usize;
                    self.front.put_str(col, status_row + 1, &text, HI);
                }
            }
        }
    }

    /// Boxed message in the middle of the board.
    fn compose_banner(&mut self, w: &WorldState, lines: &[&str], color: Color) {
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let mut rows: Vec<String> = Vec::with_capacity(lines.len() + 4);
        rows.push(format!("+{}+", "-".repeat(inner)));
        for l in lines {
            rows.push(format!("|{:^inner$}|", l, inner = inner));
        }
        rows.push(format!("|{:^inner$}|", "", inner = inner));
        rows.push(format!("|{:^inner$}|", "press any key", inner = inner));
        rows.push(format!("+{}+", "-".repeat(inner)));

        let center = w.geom.to_absolute(Position::default());
        let top = (center.y - rows.len() as i32 / 2).max(0) as usize;
        let left = (center.x - (inner as i32 + 2) / 2).max(0) as usize;
        for (i, r) in rows.iter().enumerate() {
            let fg = if i == 1 { color } else { Color::White };
            self.front.put_str(left, top + i, r, fg);
        }
    }

    fn compose_game_over(&mut self, w: &WorldState, outcome: Outcome) {
        let (headline, color) = match outcome {
            Outcome::Lost => ("GAME OVER", ALERT),
            Outcome::Won  => ("YOU WIN! Maximum level reached.", GOLD),
            Outcome::Quit => ("Session ended.", Color::White),
        };
        self.front.put_centered(2, headline, color);

        let summary = format!(
            "{}  ·  Score: {}  ·  Level: {}",
            w.player.name, w.player.score, w.player.level,
        );
        self.front.put_centered(4, &summary, Color::White);

        self.front.put_centered(7, "── LEADERBOARD ──", GOLD);
        for (i, e) in w.ranking.iter().enumerate() {
            let line = format!("{:>2}. {:<width$} {:>6}", i + 1, e.name, e.score, width = MAX_NAME_CHARS);
            let fg = if e.name == w.player.name && e.score == w.player.score { HI } else { Color::White };
            self.front.put_centered(9 + i, &line, fg);
        }
        if w.ranking.is_empty() {
            self.front.put_centered(9, "(no scores yet)", DIM);
        }

        let footer = 9 + w.ranking.len().max(1) + 2;
        self.front.put_centered(footer, "ENTER: Play again    Q / ESC: Quit", DIM);
    }
}
