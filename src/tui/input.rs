use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::shared::InputEvent;

// poll the terminal for one key and map it to an input event
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code).into_iter().collect());
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode) -> Option<InputEvent> {
    let event = match code {
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char(' ') => InputEvent::PlayPress,
        KeyCode::Backspace => InputEvent::StopReset,
        KeyCode::Up => InputEvent::PrevInstrument,
        KeyCode::Down => InputEvent::NextInstrument,

        // step cells of the selected row, laid out like a 4x4 pad
        KeyCode::Char(c) if char_to_step(c).is_some() => InputEvent::ToggleStep(char_to_step(c)?),

        KeyCode::Char('[') => InputEvent::AdjustBpm(-1.0),
        KeyCode::Char(']') => InputEvent::AdjustBpm(1.0),
        KeyCode::Char('-') => InputEvent::AdjustBpm(-5.0),
        KeyCode::Char('=') => InputEvent::AdjustBpm(5.0),

        KeyCode::Char('i') => InputEvent::GeneratePattern,
        KeyCode::Char('0') => InputEvent::ClearPattern,
        KeyCode::Char('k') => InputEvent::CheckAudio,
        KeyCode::Char('b') => InputEvent::Bake,
        KeyCode::Char('m') => InputEvent::ToggleRhymes,
        KeyCode::Char('l') => InputEvent::ReloadLyrics,
        _ => return None,
    };
    Some(event)
}

fn char_to_step(c: char) -> Option<u8> {
    let idx = match c {
        '1' => 0, '2' => 1, '3' => 2, '4' => 3,
        'q' => 4, 'w' => 5, 'e' => 6, 'r' => 7,
        'a' => 8, 's' => 9, 'd' => 10, 'f' => 11,
        'z' => 12, 'x' => 13, 'c' => 14, 'v' => 15,
        _ => return None,
    };
    Some(idx)
}
