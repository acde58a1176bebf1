/// Entry point and game loop.

mod config;
mod domain;
mod logger;
mod sim;
mod ui;

use std::error::Error;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{error, info, warn};

use config::GameConfig;
use domain::entity::{InputSymbol, MAX_NAME_CHARS};
use domain::geometry::BoardGeometry;
use sim::event::GameEvent;
use sim::leaderboard::{self, Leaderboard, LeaderboardError, SHOW_TOP};
use sim::step;
use sim::world::{Phase, SessionParams, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{self as keys, InputState};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// How long an event message stays on screen, in frames.
const MESSAGE_FRAMES: u32 = 300;

/// Rows needed below the board for the status line and advisory.
const STATUS_ROWS: i32 = 2;

fn main() {
    let config = GameConfig::load();
    logger::init(&config.log_path, config.log_level);
    info!("roborescue {} starting", env!("CARGO_PKG_VERSION"));

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        std::process::exit(1);
    }

    let (tw, th) = renderer.size();
    let geom = BoardGeometry::centered(tw, th - STATUS_ROWS, config.board.cols, config.board.rows);
    if tw <= config.board.cols || th < config.board.rows + 1 + STATUS_ROWS {
        warn!("terminal {}x{} is smaller than the {}x{} board", tw, th, config.board.cols, config.board.rows);
    }

    let mut world = WorldState::new(SessionParams::from_config(&config, geom));
    let board = Leaderboard::new(&config.leaderboard_path);

    let result = game_loop(&mut world, &mut renderer, &board, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("fatal: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    if !world.player.name.is_empty() {
        println!();
        println!("Thanks for playing Robo Rescue, {}!", world.player.name);
        println!("Final Score: {}", world.player.score);
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    board: &Leaderboard,
    config: &GameConfig,
) -> Result<(), Box<dyn Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        match world.phase {
            Phase::Title => {
                if kb.ctrl_c_pressed() || kb.was_pressed(KeyCode::Esc) || gp.quit_pressed() {
                    break;
                }
                let entered = keys::edit_name(&mut world.name_input, &kb.raw_events, MAX_NAME_CHARS);
                if entered || gp.confirm_pressed() {
                    let name = world.name_input.clone();
                    world.start_session(&name)?;
                    kb.clear_pending();
                    last_tick = Instant::now();
                }
            }
            Phase::Playing => {
                kb.record_for_tick();
                if let Some(sym) = gp.symbol() {
                    kb.push(sym);
                }
                world.tick_message();
                if last_tick.elapsed() >= world.delay {
                    let events = step::step(world, kb.take_pending())?;
                    process_events(world, &events);
                    after_tick(world, board, &events)?;
                    last_tick = Instant::now();
                }
            }
            Phase::LifeLost | Phase::LevelUp => {
                if kb.quit_pressed() || gp.quit_pressed() {
                    world.resume();
                    let events = step::step(world, InputSymbol::Quit)?;
                    after_tick(world, board, &events)?;
                } else if kb.any_key_pressed() || gp.any_pressed() {
                    world.resume();
                    kb.clear_pending();
                    last_tick = Instant::now();
                }
            }
            Phase::GameOver(_) => {
                if kb.quit_pressed() || gp.quit_pressed() {
                    break;
                }
                if kb.was_pressed(KeyCode::Enter) || gp.confirm_pressed() {
                    world.phase = Phase::Title;
                }
            }
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Show the newest event message. Later events in a tick win.
fn process_events(world: &mut WorldState, events: &[GameEvent]) {
    if let Some(msg) = events.iter().filter_map(GameEvent::message).last() {
        world.set_message(&msg, MESSAGE_FRAMES);
    }
}

/// Persist the score once the session has ended and load the ranking
/// for the game over screen.
fn after_tick(world: &mut WorldState, board: &Leaderboard, events: &[GameEvent]) -> Result<(), LeaderboardError> {
    if !events.iter().any(|e| matches!(e, GameEvent::SessionEnded(_))) {
        return Ok(());
    }
    board.append(&world.player.name, world.player.score)?;
    let ranked = board.load_and_rank()?;
    info!("leaderboard {} holds {} records", board.path().display(), ranked.len());
    world.ranking = leaderboard::top(&ranked, SHOW_TOP);
    Ok(())
}
