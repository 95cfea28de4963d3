use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;

/// Spin up the terminal backend and drive the draw/poll loop until the user
/// quits. Input polling uses a short timeout so frames keep refreshing;
/// handlers run to completion on this loop, so a mutation and its reloads
/// finish before the next key is processed.
pub async fn run_app(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = loop {
        if let Err(err) = terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")
        {
            break Err(err);
        }

        let ready = match event::poll(Duration::from_millis(250)).context("event polling failed") {
            Ok(ready) => ready,
            Err(err) => break Err(err),
        };
        if !ready {
            continue;
        }

        match event::read().context("failed to read event") {
            Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                match app.handle_key(key_event.code).await {
                    Ok(true) => break Ok(()),
                    Ok(false) => {}
                    Err(err) => break Err(err),
                }
            }
            Ok(_) => {}
            Err(err) => break Err(err),
        }
    };

    cleanup_terminal(&mut terminal)?;
    result
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
