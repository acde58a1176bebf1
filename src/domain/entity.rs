/// Entities: Robot, Player, and the per-tick input symbol.
/// Mines and the person are plain absolute `Position`s held by the world.

use super::geometry::{BoardGeometry, Direction, Position};

pub const START_LIVES: u32 = 3;
pub const START_LEVEL: u32 = 1;

/// Longest name kept, in characters.
pub const MAX_NAME_CHARS: usize = 19;

/// One raw input per tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputSymbol {
    Up,
    Down,
    Left,
    Right,
    None,
    Quit,
}

impl InputSymbol {
    /// Facing requested by a directional symbol.
    pub fn direction(self) -> Option<Direction> {
        match self {
            InputSymbol::Up    => Some(Direction::North),
            InputSymbol::Down  => Some(Direction::South),
            InputSymbol::Left  => Some(Direction::West),
            InputSymbol::Right => Some(Direction::East),
            InputSymbol::None | InputSymbol::Quit => None,
        }
    }
}

/// How a session ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Lost,
    /// Mine count would pass the cap: maximum level reached.
    Won,
    Quit,
}

#[derive(Clone, Debug)]
pub struct Robot {
    /// Board-relative; (0, 0) is the board center.
    pub offset: Position,
    pub facing: Direction,
}

impl Robot {
    pub fn new() -> Self {
        Robot { offset: Position::default(), facing: Direction::North }
    }

    /// Back to the board center. Facing is kept.
    pub fn recenter(&mut self) {
        self.offset = Position::default();
    }

    /// One unit step in the current facing.
    pub fn advance(&mut self) {
        self.offset = self.offset.offset(self.facing);
    }

    #[inline]
    pub fn absolute(&self, geom: &BoardGeometry) -> Position {
        geom.to_absolute(self.offset)
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub name: String,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Player {
            name: sanitize_name(name),
            score: 0,
            lives: START_LIVES,
            level: START_LEVEL,
        }
    }
}

/// Strip control characters, trim, cap at `MAX_NAME_CHARS`.
/// The leaderboard is line-based, so a newline in a name would corrupt it.
pub fn sanitize_name(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
    let trimmed: String = cleaned.trim().chars().take(MAX_NAME_CHARS).collect();
    let trimmed = trimmed.trim_end().to_string();
    if trimmed.is_empty() { "Robot".to_string() } else { trimmed }
}
