/// Keyboard input tracker.
///
/// The simulation consumes one `InputSymbol` per tick, but frames run
/// much faster than ticks. Presses collected between two ticks are
/// folded into a single pending symbol (the latest direction wins, Quit
/// beats everything) and handed over with `take_pending()`.
///
/// Name entry on the title screen reads the raw characters instead.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::InputSymbol;

pub struct InputState {
    /// Key presses (and repeats) seen by the most recent drain_events().
    pub raw_events: Vec<KeyEvent>,

    /// Symbol waiting for the next tick.
    pending: InputSymbol,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            raw_events: Vec::with_capacity(8),
            pending: InputSymbol::None,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                // Release events only show up with keyboard enhancement
                if key.kind == KeyEventKind::Release { continue; }
                self.raw_events.push(key);
            }
        }
    }

    /// Fold this frame's presses into the pending tick symbol.
    pub fn record_for_tick(&mut self) {
        let symbols: Vec<InputSymbol> = self.raw_events.iter().filter_map(symbol_for_key).collect();
        for sym in symbols {
            self.push(sym);
        }
    }

    /// Queue a symbol from another source (gamepad). Quit is never overwritten.
    pub fn push(&mut self, sym: InputSymbol) {
        if self.pending != InputSymbol::Quit {
            self.pending = sym;
        }
    }

    /// Hand the pending symbol to the tick and reset it.
    pub fn take_pending(&mut self) -> InputSymbol {
        std::mem::replace(&mut self.pending, InputSymbol::None)
    }

    pub fn clear_pending(&mut self) {
        self.pending = InputSymbol::None;
    }

    pub fn any_key_pressed(&self) -> bool {
        !self.raw_events.is_empty()
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.raw_events.iter().any(|k| k.code == code)
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(is_ctrl_c)
    }

    /// Quit keys outside of text entry: q, Esc, Ctrl+C.
    pub fn quit_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| symbol_for_key(k) == Some(InputSymbol::Quit))
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL)
        && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
}

/// Map one key to a tick symbol. Keys with no meaning in play return None.
pub fn symbol_for_key(key: &KeyEvent) -> Option<InputSymbol> {
    if is_ctrl_c(key) { return Some(InputSymbol::Quit); }
    match key.code {
        KeyCode::Up    | KeyCode::Char('w') | KeyCode::Char('W') => Some(InputSymbol::Up),
        KeyCode::Down  | KeyCode::Char('s') | KeyCode::Char('S') => Some(InputSymbol::Down),
        KeyCode::Left  | KeyCode::Char('a') | KeyCode::Char('A') => Some(InputSymbol::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(InputSymbol::Right),
        KeyCode::Esc   | KeyCode::Char('q') | KeyCode::Char('Q') => Some(InputSymbol::Quit),
        _ => None,
    }
}

/// Apply this frame's keys to a name being typed.
/// Returns true when Enter was pressed.
pub fn edit_name(name: &mut String, keys: &[KeyEvent], max_chars: usize) -> bool {
    for key in keys {
        match key.code {
            KeyCode::Enter => return true,
            KeyCode::Backspace => { name.pop(); }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) && !c.is_control() => {
                if name.chars().count() < max_chars {
                    name.push(c);
                }
            }
            _ => {}
        }
    }
    false
}
