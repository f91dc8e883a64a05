use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Select,
    ClearLevel,
    RequestCustomNode,
    RenameItem,
    DeleteItem,
    TogglePanel,
    Reload,
    Quit,
    ToggleHelp,
    OpenSettings,
    SubmitText,
    Cancel,
    Backspace,
    InputChar(char),
    Noop,
}

pub fn action_for_key(key: KeyEvent, text_mode: bool) -> Action {
    if text_mode {
        return match key.code {
            KeyCode::Enter => Action::SubmitText,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Left => Action::Move(Direction::Left),
            KeyCode::Right => Action::Move(Direction::Right),
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::Noop,
        };
    }

    match key.code {
        KeyCode::Up => Action::Move(Direction::Up),
        KeyCode::Down => Action::Move(Direction::Down),
        KeyCode::Left => Action::Move(Direction::Left),
        KeyCode::Right => Action::Move(Direction::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Tab => Action::TogglePanel,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Backspace | KeyCode::Char('x') => Action::ClearLevel,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('h') => Action::Move(Direction::Left),
        KeyCode::Char('j') => Action::Move(Direction::Down),
        KeyCode::Char('k') => Action::Move(Direction::Up),
        KeyCode::Char('l') => Action::Move(Direction::Right),
        KeyCode::Char('n') => Action::RequestCustomNode,
        KeyCode::Char('e') => Action::RenameItem,
        KeyCode::Char('D') => Action::DeleteItem,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('s') => Action::OpenSettings,
        _ => Action::Noop,
    }
}
