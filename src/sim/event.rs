/// Events emitted during a simulation step.
/// The loop turns them into on-screen messages and persists the score
/// on `SessionEnded`.

use crate::domain::entity::Outcome;
use crate::domain::geometry::Position;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PersonRescued { at: Position, score: u32 },
    HitWall,
    HitMine { at: Position },
    LifeLost { lives_left: u32 },
    LevelUp { level: u32, mine_count: usize },
    MinesReshuffled,
    /// Autopilot found no legal move and held position.
    NoValidMove,
    SessionEnded(Outcome),
}

impl GameEvent {
    /// Short line for the message row. `None` for events with their own
    /// display (advisory, game over screen).
    pub fn message(&self) -> Option<String> {
        match self {
            GameEvent::PersonRescued { at, score } => {
                Some(format!("Rescued at ({}, {})! Score {}", at.x, at.y, score))
            }
            GameEvent::HitWall => Some("Hit the wall!".to_string()),
            GameEvent::HitMine { at } => Some(format!("Mine at ({}, {})!", at.x, at.y)),
            GameEvent::LifeLost { lives_left } => Some(match lives_left {
                1 => "1 life left".to_string(),
                n => format!("{} lives left", n),
            }),
            GameEvent::LevelUp { level, mine_count } => {
                Some(format!("Level {}: {} mines", level, mine_count))
            }
            GameEvent::MinesReshuffled => Some("The mines have moved".to_string()),
            GameEvent::NoValidMove | GameEvent::SessionEnded(_) => None,
        }
    }
}
