/// Random, non-overlapping placement of mines and the rescue target.
///
/// Rejection sampling inside an interior band (3 cells in for mines,
/// 2 for the person). Every draw is capped. When the cap is hit the
/// constraint is relaxed step by step:
///   mines:  own band scan → wider person band scan → fewer mines
///   person: own band scan → any interior cell
/// Only a person with no free interior cell at all is an error.
///
/// The RNG is owned by the session and passed in, never reseeded here.

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use super::geometry::{BoardGeometry, Position};

pub const MINE_MARGIN: i32 = 3;
pub const PERSON_MARGIN: i32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no free cell left for {what} after {attempts} random attempts and a full scan")]
    Exhausted { what: &'static str, attempts: u32 },
}

/// Place up to `count` mines. Excludes the person (if already placed),
/// the robot's absolute cell and mines placed earlier in the same call.
/// A board too crowded for `count` gets as many mines as fit.
pub fn place_mines<R: Rng>(
    geom: &BoardGeometry,
    count: usize,
    person: Option<Position>,
    robot: Position,
    max_attempts: u32,
    rng: &mut R,
) -> Vec<Position> {
    let mut mines: Vec<Position> = Vec::with_capacity(count);
    for _ in 0..count {
        let taken = |p: Position| {
            p == robot || person == Some(p) || mines.contains(&p)
        };
        let pos = draw(geom, MINE_MARGIN, max_attempts, rng, &taken)
            .or_else(|| scan(geom, MINE_MARGIN, &taken))
            .or_else(|| {
                warn!("mine band full, widening to the person band");
                scan(geom, PERSON_MARGIN, &taken)
            });
        match pos {
            Some(pos) => {
                debug_assert!(geom.is_interior(pos));
                mines.push(pos);
            }
            None => {
                warn!("no free cell for mine {} of {}, placing {}", mines.len() + 1, count, mines.len());
                break;
            }
        }
    }
    mines
}

/// Place the rescue target away from the robot and every mine.
pub fn place_person<R: Rng>(
    geom: &BoardGeometry,
    mines: &[Position],
    robot: Position,
    max_attempts: u32,
    rng: &mut R,
) -> Result<Position, PlacementError> {
    let taken = |p: Position| p == robot || mines.contains(&p);
    draw(geom, PERSON_MARGIN, max_attempts, rng, &taken)
        .or_else(|| scan(geom, PERSON_MARGIN, &taken))
        .or_else(|| {
            warn!("person band full, using any interior cell");
            scan_interior(geom, &taken)
        })
        .ok_or(PlacementError::Exhausted { what: "person", attempts: max_attempts })
}

// ── Helpers ──

fn draw<R, F>(geom: &BoardGeometry, margin: i32, max_attempts: u32, rng: &mut R, taken: &F) -> Option<Position>
where
    R: Rng,
    F: Fn(Position) -> bool,
{
    let (x0, x1) = geom.x_band(margin);
    let (y0, y1) = geom.y_band(margin);
    for _ in 0..max_attempts {
        let p = Position::new(rng.random_range(x0..x1), rng.random_range(y0..y1));
        if !taken(p) {
            return Some(p);
        }
    }
    None
}

/// Row-major scan of the band for the first free cell.
fn scan<F>(geom: &BoardGeometry, margin: i32, taken: &F) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    let (x0, x1) = geom.x_band(margin);
    let (y0, y1) = geom.y_band(margin);
    (y0..y1)
        .flat_map(|y| (x0..x1).map(move |x| Position::new(x, y)))
        .find(|&p| !taken(p))
}

/// Row-major scan of every cell inside the border.
fn scan_interior<F>(geom: &BoardGeometry, taken: &F) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    let (hx, hy) = (geom.cols / 2 - 1, geom.rows / 2 - 1);
    (-hy..=hy)
        .flat_map(|y| (-hx..=hx).map(move |x| Position::new(x, y)))
        .map(|offset| geom.to_absolute(offset))
        .find(|&p| !taken(p))
}
