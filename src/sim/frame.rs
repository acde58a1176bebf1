/// Render commands: what to draw this frame, without knowing how.
///
/// `compose()` flattens the world into glyphs at absolute screen cells
/// plus the status line and message row. The terminal renderer is the only consumer.

use crate::domain::geometry::Direction;
use super::world::WorldState;

pub const MINE_GLYPH: char = '.';
pub const PERSON_GLYPH: char = 'o';
pub const BODY_GLYPH: char = 'o';

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorId {
    Mine,
    Person,
    RobotBody,
    RobotHead,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RenderCommand {
    Glyph { row: i32, col: i32, glyph: char, color: ColorId },
    StatusLine { name: String, lives: u32, score: u32, level: u32 },
    Advisory(String),
    /// Transient event message, see `WorldState::set_message`.
    Message(String),
}

pub fn head_glyph(facing: Direction) -> char {
    match facing {
        Direction::North => '^',
        Direction::South => 'v',
        Direction::East  => '>',
        Direction::West  => '<',
    }
}

/// Draw order: mines, person, robot head, robot body.
pub fn compose(w: &WorldState) -> Vec<RenderCommand> {
    let mut cmds = Vec::with_capacity(w.mines.len() + 5);

    for m in &w.mines {
        cmds.push(RenderCommand::Glyph { row: m.y, col: m.x, glyph: MINE_GLYPH, color: ColorId::Mine });
    }
    cmds.push(RenderCommand::Glyph {
        row: w.person.y, col: w.person.x, glyph: PERSON_GLYPH, color: ColorId::Person,
    });

    let head = w.geom.to_absolute(w.robot.offset.offset(w.robot.facing));
    cmds.push(RenderCommand::Glyph {
        row: head.y, col: head.x, glyph: head_glyph(w.robot.facing), color: ColorId::RobotHead,
    });
    let body = w.robot_absolute();
    cmds.push(RenderCommand::Glyph {
        row: body.y, col: body.x, glyph: BODY_GLYPH, color: ColorId::RobotBody,
    });

    cmds.push(RenderCommand::StatusLine {
        name: w.player.name.clone(),
        lives: w.player.lives,
        score: w.player.score,
        level: w.player.level,
    });
    if let Some(text) = &w.advisory {
        cmds.push(RenderCommand::Advisory(text.clone()));
    }
    if !w.message.is_empty() {
        cmds.push(RenderCommand::Message(w.message.clone()));
    }
    cmds
}
