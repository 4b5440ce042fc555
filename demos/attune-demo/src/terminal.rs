//! Terminal plumbing: raw mode, key bindings and the one-line status surface

use std::io;

use attune_visual::{Scene, Surface};
use crossterm::cursor::MoveToColumn;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::execute;

use crate::feed::NUDGE_PX;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Nudge(f32, f32),
    ToggleFace,
    ToggleMouth,
    Bloom,
    Escape,
    Retry,
    Quit,
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let command = match key.code {
        KeyCode::Left => Command::Nudge(-NUDGE_PX, 0.0),
        KeyCode::Right => Command::Nudge(NUDGE_PX, 0.0),
        KeyCode::Up => Command::Nudge(0.0, -NUDGE_PX),
        KeyCode::Down => Command::Nudge(0.0, NUDGE_PX),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char('f') => Command::ToggleFace,
        KeyCode::Char('m') => Command::ToggleMouth,
        KeyCode::Char('b') => Command::Bloom,
        KeyCode::Char('r') => Command::Retry,
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Esc => Command::Escape,
        _ => return None,
    };
    Some(command)
}

/// Raw mode for as long as the guard lives
pub struct RawMode;

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        println!();
    }
}

/// Renders a scene as one rewritten terminal line: session status plus the scene's text
#[derive(Debug, Default)]
pub struct StatusLine {
    status: String,
    last: String,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    fn compose(&self, scene: &Scene, width: usize) -> String {
        let texts: Vec<&str> = scene.texts().collect();
        let line = if texts.is_empty() {
            self.status.clone()
        } else {
            format!("{} │ {}", self.status, texts.join(" · "))
        };
        line.chars().take(width).collect()
    }
}

impl Surface for StatusLine {
    fn present(&mut self, scene: &Scene) {
        let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(120);
        let line = self.compose(scene, width);
        if line == self.last {
            return;
        }
        let _ = execute!(io::stdout(), MoveToColumn(0), Clear(ClearType::CurrentLine), Print(&line));
        self.last = line;
    }
}
