use arrayvec::ArrayVec;
use blockfall_engine::{Command, Millis};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// How long a soft drop stays engaged after a key press when the terminal
/// cannot report the matching release.
const SOFT_DROP_HOLD_MS: Millis = 120;

/// Translates terminal key events into engine commands.
///
/// Terminals that report key releases get true hold semantics. Otherwise
/// a lateral key press acts as a tap (press immediately followed by
/// release) and a soft drop stays engaged for a short window that the
/// terminal's own key repeat keeps extending.
#[derive(Debug, Default)]
pub(crate) struct KeyInput {
    releases_reported: bool,
    soft_drop_until: Option<Millis>,
}

pub(crate) type Commands = ArrayVec<Command, 2>;

impl KeyInput {
    pub(crate) fn set_releases_reported(&mut self, reported: bool) {
        self.releases_reported = reported;
    }

    pub(crate) fn translate(&mut self, key: &KeyEvent, now: Millis) -> Commands {
        let mut commands = Commands::new();
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            commands.push(Command::Quit);
            return commands;
        }

        let pressed = match key.kind {
            KeyEventKind::Press => true,
            KeyEventKind::Release if self.releases_reported => false,
            // Terminal key repeat would fight the engine's own auto-repeat
            KeyEventKind::Release | KeyEventKind::Repeat => return commands,
        };

        match key.code {
            KeyCode::Left => self.hold(
                &mut commands,
                pressed,
                Command::MoveLeftPressed,
                Command::MoveLeftReleased,
            ),
            KeyCode::Right => self.hold(
                &mut commands,
                pressed,
                Command::MoveRightPressed,
                Command::MoveRightReleased,
            ),
            KeyCode::Down => {
                if pressed {
                    commands.push(Command::SoftDropPressed);
                    if !self.releases_reported {
                        self.soft_drop_until = Some(now + SOFT_DROP_HOLD_MS);
                    }
                } else {
                    commands.push(Command::SoftDropReleased);
                }
            }
            code if pressed => {
                if let Some(command) = single_shot(code) {
                    commands.push(command);
                }
            }
            _ => {}
        }
        commands
    }

    fn hold(&self, commands: &mut Commands, pressed: bool, press: Command, release: Command) {
        match (pressed, self.releases_reported) {
            (true, true) => commands.push(press),
            (true, false) => {
                commands.push(press);
                commands.push(release);
            }
            (false, _) => commands.push(release),
        }
    }

    /// Returns the release for a soft drop whose press-only hold window has run out.
    pub(crate) fn expire(&mut self, now: Millis) -> Option<Command> {
        let until = self.soft_drop_until?;
        if now < until {
            return None;
        }
        self.soft_drop_until = None;
        Some(Command::SoftDropReleased)
    }
}

fn single_shot(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Up | KeyCode::Char('x' | 'X') => Command::RotateCw,
        KeyCode::Char('z' | 'Z') => Command::RotateCcw,
        KeyCode::Char('a' | 'A') => Command::Rotate180,
        KeyCode::Char(' ') => Command::HardDrop,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}
