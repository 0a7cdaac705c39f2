use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Size};

/// Everything a player can do at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Left button pressed: lift the card under the pointer.
    PickUp(Position),
    /// Pointer moved with the button held.
    Drag(Position),
    /// Left button released: drop the held card here.
    Drop(Position),
    /// Right click: send the card under the pointer to its best place.
    PlayToBest(Position),
    /// Play the rest of the game automatically.
    AutoFinish,
    /// Deal a new random game.
    NewGame,
    /// Deal the current game again from the start.
    RestartDeal,
    /// Show or hide the help panel.
    Help,
    /// The terminal changed size.
    Resize(Size),
    Quit,
}

/// Translate a terminal event into a command, if it means anything here.
pub fn parse_event(event: &Event) -> Option<Command> {
    match event {
        Event::Key(key) => parse_key(key),
        Event::Mouse(mouse) => parse_mouse(mouse),
        Event::Resize(width, height) => Some(Command::Resize(Size::new(*width, *height))),
        _ => None,
    }
}

fn parse_key(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Command::Quit);
    }
    match key.code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Some(Command::AutoFinish),
            'n' => Some(Command::NewGame),
            'r' => Some(Command::RestartDeal),
            'h' | '?' => Some(Command::Help),
            'q' => Some(Command::Quit),
            _ => None,
        },
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::F(1) => Some(Command::Help),
        _ => None,
    }
}

fn parse_mouse(mouse: &MouseEvent) -> Option<Command> {
    let at = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Command::PickUp(at)),
        MouseEventKind::Drag(MouseButton::Left) => Some(Command::Drag(at)),
        MouseEventKind::Up(MouseButton::Left) => Some(Command::Drop(at)),
        MouseEventKind::Down(MouseButton::Right) => Some(Command::PlayToBest(at)),
        _ => None,
    }
}
