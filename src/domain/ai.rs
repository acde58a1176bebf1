/// Robot autopilot: single-step greedy navigator.
///
/// Used whenever a tick has no directional input. Each candidate move is
/// rejected if it would
///   1. touch the board wall,
///   2. land on a known mine,
///   3. reverse the previous direction (no 180° turns).
/// Among the survivors the one closest (Manhattan, absolute cells) to the
/// target wins. Ties go to the earlier candidate in `Direction::ALL`
/// (N, E, S, W), so the result is fully deterministic.

use super::geometry::{distance_from_offset, BoardGeometry, Direction, Position};

/// Navigator verdict for one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Choice {
    /// Take a step in this direction.
    Move(Direction),
    /// Nothing legal: keep the previous direction and stay put this tick.
    Hold(Direction),
}

impl Choice {
    pub fn direction(self) -> Direction {
        match self {
            Choice::Move(d) | Choice::Hold(d) => d,
        }
    }
}

pub const NO_VALID_MOVE: &str = "No valid move. Staying in place.";

pub fn choose_direction(
    geom: &BoardGeometry,
    robot: Position,
    target: Position,
    mines: &[Position],
    last: Direction,
) -> Choice {
    let forbidden = last.reverse();
    let mut best: Option<(i32, Direction)> = None;

    for dir in Direction::ALL {
        if dir == forbidden { continue; }

        let next = robot.offset(dir);
        if geom.is_wall(next) { continue; }
        if mines.contains(&geom.to_absolute(next)) { continue; }

        let dist = distance_from_offset(geom, next, target);
        // Strict `<`: the first minimal candidate keeps the slot.
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, dir));
        }
    }

    match best {
        Some((_, dir)) => Choice::Move(dir),
        None => Choice::Hold(last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardGeometry {
        BoardGeometry::centered(120, 30, 100, 20)
    }

    fn at(g: &BoardGeometry, x: i32, y: i32) -> Position {
        g.to_absolute(Position::new(x, y))
    }

    #[test]
    fn tie_prefers_north_over_east() {
        // Target 3 east, 2 north: N and E both leave distance 4.
        let g = board();
        let target = at(&g, 3, -2);
        let c = choose_direction(&g, Position::new(0, 0), target, &[], Direction::North);
        assert_eq!(c, Choice::Move(Direction::North));
    }

    #[test]
    fn strictly_closer_wins() {
        let g = board();
        let target = at(&g, 10, 0);
        let c = choose_direction(&g, Position::new(0, 0), target, &[], Direction::North);
        assert_eq!(c, Choice::Move(Direction::East));
    }

    #[test]
    fn never_reverses_when_alternatives_exist() {
        // Target straight behind: best would be South, but we came North.
        let g = board();
        let target = at(&g, 0, 5);
        let c = choose_direction(&g, Position::new(0, 0), target, &[], Direction::North);
        assert_ne!(c.direction(), Direction::South);
        assert!(matches!(c, Choice::Move(_)));
        // N, E and W all leave distance 6; N comes first.
        assert_eq!(c, Choice::Move(Direction::North));
    }

    #[test]
    fn avoids_mines() {
        let g = board();
        let target = at(&g, 0, -5);
        let mines = [at(&g, 0, -1)];
        let c = choose_direction(&g, Position::new(0, 0), target, &mines, Direction::North);
        // North is mined; E and W tie, E first.
        assert_eq!(c, Choice::Move(Direction::East));
    }

    #[test]
    fn avoids_walls() {
        let g = board();
        // Robot next to the east wall, target beyond it.
        let target = at(&g, 49, 0);
        let c = choose_direction(&g, Position::new(49, 0), target, &[], Direction::East);
        assert_ne!(c.direction(), Direction::East);
        assert_ne!(c.direction(), Direction::West);
        assert_eq!(c, Choice::Move(Direction::North));
    }

    #[test]
    fn boxed_in_holds_previous_direction() {
        let g = board();
        let robot = Position::new(0, 0);
        // Mines N, E, W; South is the reverse of North.
        let mines = [at(&g, 0, -1), at(&g, 1, 0), at(&g, -1, 0)];
        let target = at(&g, 20, 5);
        let c = choose_direction(&g, robot, target, &mines, Direction::North);
        assert_eq!(c, Choice::Hold(Direction::North));
    }

    #[test]
    fn deterministic() {
        let g = board();
        let mines = [at(&g, 2, 2), at(&g, -3, 1), at(&g, 0, -4)];
        let target = at(&g, -7, 3);
        let first = choose_direction(&g, Position::new(1, -1), target, &mines, Direction::West);
        for _ in 0..100 {
            assert_eq!(
                choose_direction(&g, Position::new(1, -1), target, &mines, Direction::West),
                first,
            );
        }
    }
}
