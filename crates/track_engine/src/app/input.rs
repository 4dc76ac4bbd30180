/// One logical key from whichever input source drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Char(char),
    /// Ctrl-C while the terminal is in raw mode.
    Interrupt,
    /// Input stream closed, or Ctrl-D on the terminal.
    EndOfInput,
}

impl KeyEvent {
    /// Keys that end the session in every role.
    pub fn is_quit(self) -> bool {
        matches!(
            self,
            KeyEvent::Char('Q') | KeyEvent::Interrupt | KeyEvent::EndOfInput
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    ShiftLeft,
    ShiftRight,
    WidenLeft,
    NarrowLeft,
    NarrowRight,
    WidenRight,
    Narrow,
    Widen,
    Quit,
}

impl EditorCommand {
    pub fn decode(key: KeyEvent) -> Option<Self> {
        if key.is_quit() {
            return Some(EditorCommand::Quit);
        }
        let KeyEvent::Char(ch) = key else {
            return None;
        };
        match ch {
            'j' => Some(EditorCommand::ShiftLeft),
            'k' => Some(EditorCommand::ShiftRight),
            's' => Some(EditorCommand::WidenLeft),
            'd' => Some(EditorCommand::NarrowLeft),
            'f' => Some(EditorCommand::NarrowRight),
            'g' => Some(EditorCommand::WidenRight),
            'c' => Some(EditorCommand::Narrow),
            'v' => Some(EditorCommand::Widen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerCommand {
    SteerLeft,
    SteerRight,
    Quit,
}

impl PlayerCommand {
    pub fn decode(key: KeyEvent) -> Option<Self> {
        match key {
            key if key.is_quit() => Some(PlayerCommand::Quit),
            KeyEvent::Char('j') => Some(PlayerCommand::SteerLeft),
            KeyEvent::Char('k') => Some(PlayerCommand::SteerRight),
            _ => None,
        }
    }
}
