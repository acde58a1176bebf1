/// WorldState: the complete snapshot of a running session.
///
/// ## Coordinates
///
/// The robot is stored as a board-relative offset; mines and the person
/// as absolute screen cells. `geom` converts between the two and is fixed
/// for the whole session (no global terminal queries).
///
/// ## Randomness
///
/// One `SmallRng` per session, seeded in `start_session()`. Every
/// placement borrows it; nothing reseeds per call.

use std::time::Duration;

use tracing::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::entity::{Outcome, Player, Robot};
use crate::domain::geometry::{BoardGeometry, Position};
use crate::domain::placement::{self, PlacementError};
use crate::sim::leaderboard::Entry;

/// Hard cap on active mines.
pub const MAX_MINES: usize = 50;
/// Mines added per level-up.
pub const MINES_PER_LEVEL: usize = 2;
/// A level-up every this many rescues.
pub const LEVEL_EVERY: u32 = 5;
/// Mines move every this many rescues.
pub const RESHUFFLE_EVERY: u32 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Name entry.
    Title,
    Playing,
    /// Informational pause after a collision; any key resumes.
    LifeLost,
    /// "NEW LEVEL!" pause; any key resumes.
    LevelUp,
    GameOver(Outcome),
}

/// Session constants taken from the config at startup.
#[derive(Clone, Debug)]
pub struct SessionParams {
    pub geom: BoardGeometry,
    pub initial_mines: usize,
    pub start_delay: Duration,
    pub min_delay: Duration,
    pub seed: Option<u64>,
    pub max_attempts: u32,
}

impl SessionParams {
    pub fn from_config(cfg: &GameConfig, geom: BoardGeometry) -> Self {
        SessionParams {
            geom,
            initial_mines: cfg.board.initial_mines,
            start_delay: cfg.speed.start_delay,
            min_delay: cfg.speed.min_delay,
            seed: cfg.seed,
            max_attempts: cfg.max_placement_attempts,
        }
    }
}

pub struct WorldState {
    pub params: SessionParams,
    pub geom: BoardGeometry,

    // ── Entities ──
    pub player: Player,
    pub robot: Robot,
    /// Absolute cell of the rescue target.
    pub person: Position,
    /// Absolute cells; `mines.len() == mine_count` once placed.
    pub mines: Vec<Position>,
    pub mine_count: usize,

    // ── Progress ──
    pub delay: Duration,
    /// Score at which the last level-up fired.
    pub level_checkpoint: u32,
    /// Score at which mines were last reshuffled.
    pub reshuffle_checkpoint: u32,
    pub tick: u64,

    // ── Meta ──
    pub phase: Phase,
    pub rng: SmallRng,

    // ── UI ──
    /// Set when the autopilot held this tick.
    pub advisory: Option<String>,
    /// Transient line under the status bar, cleared when the timer runs out.
    pub message: String,
    pub message_timer: u32,
    pub name_input: String,
    /// Ranked leaderboard for the game over screen (top 10).
    pub ranking: Vec<Entry>,
}

// ── Construction ──

impl WorldState {
    pub fn new(params: SessionParams) -> Self {
        let geom = params.geom;
        let delay = params.start_delay;
        let mine_count = params.initial_mines.min(MAX_MINES);
        WorldState {
            params,
            geom,
            player: Player::new(""),
            robot: Robot::new(),
            person: Position::default(),
            mines: Vec::with_capacity(MAX_MINES),
            mine_count,
            delay,
            level_checkpoint: 0,
            reshuffle_checkpoint: 0,
            tick: 0,
            phase: Phase::Title,
            rng: SmallRng::seed_from_u64(0),
            advisory: None,
            message: String::new(),
            message_timer: 0,
            name_input: String::new(),
            ranking: vec![],
        }
    }

    /// Begin a run for `name`: seed the RNG, reset progress, place mines
    /// and the first person.
    pub fn start_session(&mut self, name: &str) -> Result<(), PlacementError> {
        self.rng = match self.params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.player = Player::new(name);
        self.robot = Robot::new();
        self.mine_count = self.params.initial_mines.min(MAX_MINES);
        self.delay = self.params.start_delay;
        self.level_checkpoint = 0;
        self.reshuffle_checkpoint = 0;
        self.tick = 0;
        self.advisory = None;
        self.message.clear();
        self.message_timer = 0;
        self.ranking.clear();

        // Mines first (no person yet), then the person around them.
        self.mines.clear();
        self.replace_mines(None);
        self.relocate_person()?;

        self.phase = Phase::Playing;
        info!(
            "session start: player={} board={}x{} mines={} delay={:?}",
            self.player.name, self.geom.cols, self.geom.rows, self.mine_count, self.delay,
        );
        Ok(())
    }

    /// Leave a LifeLost / LevelUp pause.
    pub fn resume(&mut self) {
        if matches!(self.phase, Phase::LifeLost | Phase::LevelUp) {
            self.phase = Phase::Playing;
        }
    }

    pub fn robot_absolute(&self) -> Position {
        self.robot.absolute(&self.geom)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    /// Show `msg` for `frames` frames.
    pub fn set_message(&mut self, msg: &str, frames: u32) {
        self.message = msg.to_string();
        self.message_timer = frames;
    }

    /// Count the message down by one frame.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }
}

// ── Placement wrappers ──

impl WorldState {
    /// Clear and re-place all `mine_count` mines.
    /// `person` is `None` only before the first person exists.
    /// A board too small for `mine_count` lowers it to what fit.
    pub fn replace_mines(&mut self, person: Option<Position>) {
        let robot = self.robot_absolute();
        self.mines = placement::place_mines(
            &self.geom, self.mine_count, person, robot,
            self.params.max_attempts, &mut self.rng,
        );
        if self.mines.len() < self.mine_count {
            warn!("board full: mine count lowered from {} to {}", self.mine_count, self.mines.len());
            self.mine_count = self.mines.len();
        }
    }

    pub fn relocate_person(&mut self) -> Result<(), PlacementError> {
        let robot = self.robot_absolute();
        self.person = placement::place_person(
            &self.geom, &self.mines, robot,
            self.params.max_attempts, &mut self.rng,
        )?;
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// 100x20 board centered on a 120x30 screen, fixed seed.
    pub fn params() -> SessionParams {
        SessionParams {
            geom: BoardGeometry::centered(120, 30, 100, 20),
            initial_mines: 5,
            start_delay: Duration::from_millis(250),
            min_delay: Duration::from_millis(5),
            seed: Some(1234),
            max_attempts: 10_000,
        }
    }

    pub fn started_world() -> WorldState {
        let mut w = WorldState::new(params());
        w.start_session("tester").unwrap();
        w
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn session_start_state() {
        let w = started_world();
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player.name, "tester");
        assert_eq!((w.player.lives, w.player.level, w.player.score), (3, 1, 0));
        assert_eq!(w.mines.len(), 5);
        assert_eq!(w.robot.offset, Position::new(0, 0));
        assert!(!w.mines.contains(&w.person));
        assert!(!w.mines.contains(&w.robot_absolute()));
        assert_ne!(w.person, w.robot_absolute());
        assert!(w.geom.is_interior(w.person));
    }

    #[test]
    fn seeded_sessions_repeat() {
        let a = started_world();
        let b = started_world();
        assert_eq!(a.mines, b.mines);
        assert_eq!(a.person, b.person);
    }

    #[test]
    fn resume_only_from_pauses() {
        let mut w = started_world();
        w.phase = Phase::LifeLost;
        w.resume();
        assert_eq!(w.phase, Phase::Playing);
        w.phase = Phase::GameOver(Outcome::Lost);
        w.resume();
        assert_eq!(w.phase, Phase::GameOver(Outcome::Lost));
    }

    #[test]
    fn crowded_board_lowers_mine_count() {
        let mut p = params();
        p.geom = BoardGeometry::centered(20, 12, 8, 8);
        let mut w = WorldState::new(p);
        w.start_session("tester").unwrap();
        w.mine_count = 40;
        w.replace_mines(Some(w.person));
        assert_eq!(w.mines.len(), w.mine_count);
        assert!(w.mine_count < 40);
        assert!(!w.mines.contains(&w.person));
        assert!(!w.mines.contains(&w.robot_absolute()));
    }

    #[test]
    fn message_expires() {
        let mut w = started_world();
        w.set_message("hello", 2);
        w.tick_message();
        assert_eq!(w.message, "hello");
        w.tick_message();
        assert!(w.message.is_empty());
        assert_eq!(w.message_timer, 0);
        w.tick_message();
        assert_eq!(w.message_timer, 0);
    }
}
