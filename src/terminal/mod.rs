pub mod events;
pub mod state;
pub mod ui;

use anyhow::{Result, anyhow};
use ratatui::{
    DefaultTerminal,
    crossterm::event::{self, Event, KeyEventKind},
};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::refresh::{Notice, RefreshController};
use crate::terminal::state::AppState;

const FRAME: Duration = Duration::from_millis(200);

/// Interactive dashboard. `notices` is the receiving end of the controller's
/// notification sink and feeds the toasts.
pub fn run_tui(controller: &mut RefreshController, notices: Receiver<Notice>) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("failed to install error hooks: {e}"))?;

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, controller, &notices);

    ratatui::restore();
    controller.stop();

    result
}

fn run(
    terminal: &mut DefaultTerminal,
    controller: &mut RefreshController,
    notices: &Receiver<Notice>,
) -> Result<()> {
    let mut state = AppState::new(controller.interval());
    controller.start_timer();

    loop {
        let now = Instant::now();
        controller.tick(now);
        state.sync(controller.snapshot());
        for n in notices.try_iter() {
            state.push_toast(n, now);
        }
        state.expire_toasts(now);

        terminal.draw(|f| ui::render(f, &state))?;

        if event::poll(FRAME)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && events::handle_key(key, &mut state, controller)?
        {
            break;
        }
    }
    Ok(())
}
