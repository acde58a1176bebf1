/// The step function: advances the session by one tick.
///
/// Processing order:
///   1. Direction (input, or the autopilot when there is none)
///   2. Movement (one unit step in the facing)
///   3. Collision (wall / mine → life lost)
///   4. Rescue (score, relocate the person)
///   5. Level-up (speed, mine count, win cap)
///   6. Mine reshuffle (every second rescue)
///
/// A colliding tick stops after step 3.

use tracing::{debug, info};

use crate::domain::ai::{self, Choice, NO_VALID_MOVE};
use crate::domain::entity::{InputSymbol, Outcome};
use crate::domain::placement::PlacementError;
use super::event::GameEvent;
use super::world::{
    Phase, WorldState, LEVEL_EVERY, MAX_MINES, MINES_PER_LEVEL, RESHUFFLE_EVERY,
};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: InputSymbol) -> Result<Vec<GameEvent>, PlacementError> {
    if world.phase != Phase::Playing { return Ok(vec![]); }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.advisory = None;

    if input == InputSymbol::Quit {
        end_session(world, Outcome::Quit, &mut events);
        return Ok(events);
    }

    if resolve_direction(world, input, &mut events) {
        world.robot.advance();
    }
    if resolve_collision(world, &mut events)? { return Ok(events); }
    resolve_rescue(world, &mut events)?;
    resolve_level_up(world, &mut events)?;
    if world.is_over() { return Ok(events); }
    resolve_reshuffle(world, &mut events);

    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// Direction
// ══════════════════════════════════════════════════════════════

/// Returns whether the robot should move this tick.
fn resolve_direction(world: &mut WorldState, input: InputSymbol, events: &mut Vec<GameEvent>) -> bool {
    if let Some(dir) = input.direction() {
        world.robot.facing = dir;
        return true;
    }

    let choice = ai::choose_direction(
        &world.geom, world.robot.offset, world.person, &world.mines, world.robot.facing,
    );
    world.robot.facing = choice.direction();
    match choice {
        Choice::Move(_) => true,
        Choice::Hold(_) => {
            world.advisory = Some(NO_VALID_MOVE.to_string());
            events.push(GameEvent::NoValidMove);
            false
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Collision
// ══════════════════════════════════════════════════════════════

/// Returns true if a life was lost this tick.
fn resolve_collision(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Result<bool, PlacementError> {
    let here = world.robot_absolute();
    if world.geom.is_wall(world.robot.offset) {
        events.push(GameEvent::HitWall);
    } else if world.mines.contains(&here) {
        events.push(GameEvent::HitMine { at: here });
    } else {
        return Ok(false);
    }

    world.player.lives = world.player.lives.saturating_sub(1);
    recenter_robot(world)?;
    events.push(GameEvent::LifeLost { lives_left: world.player.lives });
    debug!("collision at {:?}, lives left {}", here, world.player.lives);

    if world.player.lives == 0 {
        end_session(world, Outcome::Lost, events);
    } else {
        world.phase = Phase::LifeLost;
    }
    Ok(true)
}

// ══════════════════════════════════════════════════════════════
// Rescue
// ══════════════════════════════════════════════════════════════

fn resolve_rescue(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Result<(), PlacementError> {
    let here = world.robot_absolute();
    if here != world.person { return Ok(()); }

    world.player.score += 1;
    events.push(GameEvent::PersonRescued { at: here, score: world.player.score });
    debug!("rescue #{} at {:?}", world.player.score, here);
    world.relocate_person()
}

// ══════════════════════════════════════════════════════════════
// Level-up / reshuffle
// ══════════════════════════════════════════════════════════════

fn resolve_level_up(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Result<(), PlacementError> {
    let score = world.player.score;
    if score == 0 || score % LEVEL_EVERY != 0 || score == world.level_checkpoint {
        return Ok(());
    }
    world.level_checkpoint = score;
    world.player.level += 1;
    world.delay = (world.delay / 2).max(world.params.min_delay);

    let next = world.mine_count + MINES_PER_LEVEL;
    if next > MAX_MINES {
        info!("maximum level reached at level {}", world.player.level);
        end_session(world, Outcome::Won, events);
        return Ok(());
    }
    world.mine_count = next;
    recenter_robot(world)?;
    world.replace_mines(Some(world.person));

    world.phase = Phase::LevelUp;
    events.push(GameEvent::LevelUp { level: world.player.level, mine_count: world.mine_count });
    info!(
        "level {} reached: mines={} delay={:?}",
        world.player.level, world.mine_count, world.delay,
    );
    Ok(())
}

fn resolve_reshuffle(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let score = world.player.score;
    if score == 0 || score % RESHUFFLE_EVERY != 0 || score == world.reshuffle_checkpoint {
        return;
    }
    world.reshuffle_checkpoint = score;
    world.replace_mines(Some(world.person));
    events.push(GameEvent::MinesReshuffled);
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

/// Back to the center. A person left on the center cell moves away.
fn recenter_robot(world: &mut WorldState) -> Result<(), PlacementError> {
    world.robot.recenter();
    if world.person == world.robot_absolute() {
        world.relocate_person()?;
    }
    Ok(())
}

fn end_session(world: &mut WorldState, outcome: Outcome, events: &mut Vec<GameEvent>) {
    world.phase = Phase::GameOver(outcome);
    events.push(GameEvent::SessionEnded(outcome));
    info!(
        "session end: {:?} player={} score={} level={}",
        outcome, world.player.name, world.player.score, world.player.level,
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::geometry::{BoardGeometry, Direction, Position};
    use crate::sim::world::testing::{params, started_world};

    /// World with no mines and the person parked far away in a corner.
    fn quiet_world() -> WorldState {
        let mut w = started_world();
        w.mines.clear();
        w.person = w.geom.to_absolute(Position::new(-45, 8));
        w
    }

    fn at(w: &WorldState, x: i32, y: i32) -> Position {
        w.geom.to_absolute(Position::new(x, y))
    }

    #[test]
    fn input_sets_facing_and_moves() {
        let mut w = quiet_world();
        step(&mut w, InputSymbol::Right).unwrap();
        assert_eq!(w.robot.facing, Direction::East);
        assert_eq!(w.robot.offset, Position::new(1, 0));
        step(&mut w, InputSymbol::Down).unwrap();
        assert_eq!(w.robot.offset, Position::new(1, 1));
    }

    #[test]
    fn no_input_uses_autopilot() {
        let mut w = quiet_world();
        w.person = at(&w, 3, -2);
        w.robot.facing = Direction::North;
        step(&mut w, InputSymbol::None).unwrap();
        assert_eq!(w.robot.facing, Direction::North);
        assert_eq!(w.robot.offset, Position::new(0, -1));
    }

    #[test]
    fn autopilot_hold_keeps_position_and_advises() {
        let mut w = quiet_world();
        w.robot.facing = Direction::North;
        w.mines = vec![at(&w, 0, -1), at(&w, 1, 0), at(&w, -1, 0)];
        let events = step(&mut w, InputSymbol::None).unwrap();
        assert!(events.contains(&GameEvent::NoValidMove));
        assert_eq!(w.robot.offset, Position::new(0, 0));
        assert_eq!(w.robot.facing, Direction::North);
        assert_eq!(w.advisory.as_deref(), Some(NO_VALID_MOVE));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn mine_hit_on_last_life_ends_session() {
        let mut w = quiet_world();
        w.player.lives = 1;
        w.mines = vec![at(&w, 0, -1)];
        let events = step(&mut w, InputSymbol::Up).unwrap();
        assert_eq!(w.player.lives, 0);
        assert_eq!(w.phase, Phase::GameOver(Outcome::Lost));
        assert!(events.contains(&GameEvent::SessionEnded(Outcome::Lost)));
        assert_eq!(w.robot.offset, Position::new(0, 0));
    }

    #[test]
    fn wall_hit_costs_a_life_and_pauses() {
        let mut w = quiet_world();
        w.robot.offset = Position::new(0, -9);
        let events = step(&mut w, InputSymbol::Up).unwrap();
        assert!(events.contains(&GameEvent::HitWall));
        assert_eq!(w.player.lives, 2);
        assert_eq!(w.robot.offset, Position::new(0, 0));
        assert_eq!(w.phase, Phase::LifeLost);

        // Paused: ticks do nothing until resumed
        assert!(step(&mut w, InputSymbol::Up).unwrap().is_empty());
        w.resume();
        step(&mut w, InputSymbol::Up).unwrap();
        assert_eq!(w.robot.offset, Position::new(0, -1));
    }

    #[test]
    fn lives_stay_in_range() {
        let mut w = quiet_world();
        w.person = at(&w, -45, 8);
        // Ten steps from the center to the north wall, three lives
        for _ in 0..100 {
            if w.is_over() { break; }
            w.resume();
            // Walk straight into the north wall repeatedly
            step(&mut w, InputSymbol::Up).unwrap();
            assert!(w.player.lives <= 3);
            assert!(w.mine_count <= MAX_MINES);
        }
        assert_eq!(w.phase, Phase::GameOver(Outcome::Lost));
        assert_eq!(w.player.lives, 0);
    }

    #[test]
    fn rescue_scores_and_relocates() {
        let mut w = quiet_world();
        w.person = at(&w, 1, 0);
        let events = step(&mut w, InputSymbol::Right).unwrap();
        assert_eq!(w.player.score, 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PersonRescued { score: 1, .. })));
        assert_ne!(w.person, w.robot_absolute());
        assert!(!w.mines.contains(&w.person));
    }

    #[test]
    fn every_second_rescue_reshuffles() {
        let mut w = quiet_world();
        w.player.score = 1;
        w.mines = vec![at(&w, -40, 5)];
        w.person = at(&w, 1, 0);
        let events = step(&mut w, InputSymbol::Right).unwrap();
        assert_eq!(w.player.score, 2);
        assert!(events.contains(&GameEvent::MinesReshuffled));
        assert_eq!(w.mines.len(), w.mine_count);
        assert_eq!(w.reshuffle_checkpoint, 2);
        assert!(!w.mines.contains(&w.person));
        assert!(!w.mines.contains(&w.robot_absolute()));
    }

    #[test]
    fn fifth_rescue_levels_up() {
        let mut w = quiet_world();
        w.player.score = 4;
        w.reshuffle_checkpoint = 4;
        w.person = at(&w, 1, 0);
        let events = step(&mut w, InputSymbol::Right).unwrap();
        assert_eq!(w.player.score, 5);
        assert_eq!(w.player.level, 2);
        assert_eq!(w.mine_count, 7);
        assert_eq!(w.mines.len(), 7);
        assert_eq!(w.delay, Duration::from_millis(125));
        assert_eq!(w.robot.offset, Position::new(0, 0));
        assert_eq!(w.phase, Phase::LevelUp);
        assert!(events.contains(&GameEvent::LevelUp { level: 2, mine_count: 7 }));
    }

    #[test]
    fn level_up_formula() {
        // After k level-ups: delay = max(min, D / 2^k), mines = min(50, 5 + 2k)
        let mut w = quiet_world();
        let start = w.params.start_delay;
        let min = w.params.min_delay;
        for k in 1..=22u32 {
            w.player.score = k * LEVEL_EVERY - 1;
            w.reshuffle_checkpoint = w.player.score + 1;
            w.robot.recenter();
            w.mines.clear();
            w.person = at(&w, 1, 0);
            w.resume();
            step(&mut w, InputSymbol::Right).unwrap();
            assert_eq!(w.player.level, 1 + k);
            assert_eq!(w.mine_count, (5 + 2 * k as usize).min(MAX_MINES));
            let expected = (start / 2u32.pow(k.min(31))).max(min);
            assert_eq!(w.delay, expected);
        }
        assert_eq!(w.phase, Phase::LevelUp);
    }

    #[test]
    fn passing_mine_cap_wins() {
        let mut w = quiet_world();
        w.mine_count = 49;
        w.player.score = 114;
        w.reshuffle_checkpoint = 115;
        w.person = at(&w, 1, 0);
        let events = step(&mut w, InputSymbol::Right).unwrap();
        assert_eq!(w.phase, Phase::GameOver(Outcome::Won));
        assert_eq!(w.mine_count, 49);
        assert!(events.contains(&GameEvent::SessionEnded(Outcome::Won)));
    }

    #[test]
    fn reaching_exactly_fifty_is_allowed() {
        let mut w = quiet_world();
        w.mine_count = 48;
        w.player.score = 4;
        w.reshuffle_checkpoint = 4;
        w.person = at(&w, 1, 0);
        step(&mut w, InputSymbol::Right).unwrap();
        assert_eq!(w.mine_count, MAX_MINES);
        assert_eq!(w.phase, Phase::LevelUp);
    }

    #[test]
    fn quit_ends_session() {
        let mut w = quiet_world();
        let events = step(&mut w, InputSymbol::Quit).unwrap();
        assert_eq!(w.phase, Phase::GameOver(Outcome::Quit));
        assert_eq!(events, vec![GameEvent::SessionEnded(Outcome::Quit)]);
    }

    #[test]
    fn person_on_center_moves_after_collision() {
        let mut w = quiet_world();
        w.person = at(&w, 0, 0);
        w.robot.offset = Position::new(0, -9);
        step(&mut w, InputSymbol::Up).unwrap();
        assert_eq!(w.phase, Phase::LifeLost);
        assert_eq!(w.robot.offset, Position::new(0, 0));
        assert_ne!(w.person, w.robot_absolute());
        assert!(w.geom.is_interior(w.person));
    }

    #[test]
    fn recenter_moves_person_off_center() {
        let mut w = quiet_world();
        w.robot.offset = Position::new(3, 0);
        w.person = at(&w, 0, 0);
        recenter_robot(&mut w).unwrap();
        assert_eq!(w.robot.offset, Position::new(0, 0));
        assert_ne!(w.person, w.robot_absolute());
        assert!(!w.mines.contains(&w.person));

        // A person elsewhere stays put
        let kept = at(&w, 5, 5);
        w.person = kept;
        w.robot.offset = Position::new(3, 0);
        recenter_robot(&mut w).unwrap();
        assert_eq!(w.person, kept);
    }

    #[test]
    fn small_board_survives_repeated_level_ups() {
        let mut p = params();
        p.geom = BoardGeometry::centered(20, 12, 8, 8);
        let mut w = WorldState::new(p);
        w.start_session("tester").unwrap();

        for k in 1..=10u32 {
            w.player.score = k * LEVEL_EVERY - 1;
            w.reshuffle_checkpoint = w.player.score + 1;
            w.robot.recenter();
            let target = at(&w, 1, 0);
            w.mines.retain(|&m| m != target);
            w.person = target;
            w.resume();

            let events = step(&mut w, InputSymbol::Right);
            assert!(events.is_ok(), "level-up {k} failed: {events:?}");
            assert_eq!(w.phase, Phase::LevelUp);
            assert_eq!(w.player.level, 1 + k);
            assert_eq!(w.mines.len(), w.mine_count);
            assert!(w.mine_count <= 5 + 2 * k as usize);

            let robot = w.robot_absolute();
            assert_ne!(w.person, robot);
            assert!(!w.mines.contains(&w.person));
            assert!(!w.mines.contains(&robot));
            for (i, m) in w.mines.iter().enumerate() {
                assert!(w.geom.is_interior(*m));
                assert!(!w.mines[i + 1..].contains(m));
            }
        }
        // 25 mines do not fit next to the robot and the person
        assert!(w.mine_count < 25);
    }
}
