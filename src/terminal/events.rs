use anyhow::Result;
use ratatui::crossterm::event::{KeyCode, KeyEvent};

use crate::dashboard::mail_link;
use crate::refresh::RefreshController;
use crate::terminal::state::AppState;

/// Returns true when the app should quit.
pub fn handle_key(
    key: KeyEvent,
    state: &mut AppState,
    controller: &mut RefreshController,
) -> Result<bool> {
    state.status = None;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),

        // Sync Now / Retry
        KeyCode::Char('s') | KeyCode::Char('r') => {
            controller.refetch();
        }

        KeyCode::Char('f') | KeyCode::Tab => state.cycle_filter(),
        KeyCode::Char('a') | KeyCode::BackTab => state.clear_filter(),

        KeyCode::Down | KeyCode::Char('j') => state.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_selection(-1),
        KeyCode::PageDown => state.move_selection(10),
        KeyCode::PageUp => state.move_selection(-10),
        KeyCode::Home => state.select_first(),
        KeyCode::End => state.select_last(),

        KeyCode::Enter => open_selected(state),

        _ => {}
    }
    Ok(false)
}

fn open_selected(state: &mut AppState) {
    let Some(record) = state.selected_record() else {
        return;
    };
    let link = mail_link(&record.id);
    // best-effort: the dashboard keeps running if no browser is available
    if let Err(e) = open::that(&link) {
        log::warn!("could not open {link}: {e}");
        state.status = Some(format!("Could not open browser: {e}"));
    }
}
