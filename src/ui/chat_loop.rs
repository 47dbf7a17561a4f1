//! Full-screen event loop.
//!
//! The loop owns the [`ChatSession`] for its whole lifetime and awaits each
//! completion inline: while a request is in flight no further input is read.

use crate::core::completion::CompletionClient;
use crate::core::session::{ChatSession, SubmitOutcome};
use crate::ui::renderer::{max_scroll_offset, ui, Screen};
use crate::ui::state::ViewState;
use crate::ui::theme::Theme;
use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{error::Error, io, time::Duration};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PAGE_ROWS: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Submit,
    Quit,
    ScrollUp(u16),
    ScrollDown(u16),
}

/// Applies editing keys to `view` and reports anything the loop must act on.
pub fn handle_key(view: &mut ViewState, key: KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => KeyAction::Quit,
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Char(_) if ctrl => KeyAction::None,
        KeyCode::Char(ch) => {
            view.insert_char(ch);
            KeyAction::None
        }
        KeyCode::Backspace => {
            view.backspace();
            KeyAction::None
        }
        KeyCode::Delete => {
            view.delete();
            KeyAction::None
        }
        KeyCode::Left => {
            view.move_left();
            KeyAction::None
        }
        KeyCode::Right => {
            view.move_right();
            KeyAction::None
        }
        KeyCode::Home => {
            view.move_home();
            KeyAction::None
        }
        KeyCode::End => {
            view.move_end();
            KeyAction::None
        }
        KeyCode::Up => KeyAction::ScrollUp(1),
        KeyCode::Down => KeyAction::ScrollDown(1),
        KeyCode::PageUp => KeyAction::ScrollUp(PAGE_ROWS),
        KeyCode::PageDown => KeyAction::ScrollDown(PAGE_ROWS),
        _ => KeyAction::None,
    }
}

/// Pasted text lands on the single input line; line breaks become spaces.
pub fn handle_paste(view: &mut ViewState, text: &str) {
    for ch in text.chars() {
        match ch {
            '\r' => {}
            '\n' | '\t' => view.insert_char(' '),
            other => view.insert_char(other),
        }
    }
}

pub async fn run_chat(
    client: CompletionClient,
    typing_delay: Duration,
) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut session = ChatSession::new();
    let result = event_loop(&mut terminal, &mut session, &client, typing_delay).await;

    // Restore the terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    debug!(entries = session.transcript().len(), "session ended");
    result
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut ChatSession,
    client: &CompletionClient,
    typing_delay: Duration,
) -> Result<(), Box<dyn Error>> {
    let theme = Theme::matrix();
    let mut view = ViewState::new();

    loop {
        draw(terminal, session, client, &view, &theme)?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match handle_key(&mut view, key) {
                    KeyAction::None => {}
                    KeyAction::Quit => view.exit_requested = true,
                    KeyAction::ScrollUp(rows) => view.scroll_up(rows),
                    KeyAction::ScrollDown(rows) => {
                        let max = current_max_scroll(terminal, session, &theme)?;
                        view.scroll_down(rows, max);
                    }
                    KeyAction::Submit => {
                        submit(terminal, session, client, &mut view, &theme, typing_delay)
                            .await?;
                    }
                }
            }
            Event::Paste(text) => handle_paste(&mut view, &text),
            _ => {}
        }

        if view.exit_requested {
            return Ok(());
        }
    }
}

/// Runs one turn. The typed text stays in the input box under the
/// processing title until the reply has been recorded.
async fn submit<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut ChatSession,
    client: &CompletionClient,
    view: &mut ViewState,
    theme: &Theme,
    typing_delay: Duration,
) -> Result<(), Box<dyn Error>> {
    if view.input.trim().is_empty() {
        view.take_input();
        return Ok(());
    }

    view.processing = true;
    draw(terminal, session, client, view, theme)?;
    if !typing_delay.is_zero() {
        tokio::time::sleep(typing_delay).await;
    }

    let text = view.input.clone();
    let outcome = session.submit(client, &text).await;
    debug!(answered = matches!(outcome, SubmitOutcome::Answered(_)), "turn finished");

    view.take_input();
    view.processing = false;
    let max = current_max_scroll(terminal, session, theme)?;
    view.scroll_to_bottom(max);
    Ok(())
}

fn draw<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &ChatSession,
    client: &CompletionClient,
    view: &ViewState,
    theme: &Theme,
) -> io::Result<()> {
    terminal.draw(|f| {
        ui(
            f,
            &Screen {
                transcript: session.transcript(),
                credential: client.credential(),
                model: client.persona().model(),
                view,
                theme,
            },
        )
    })?;
    Ok(())
}

fn current_max_scroll<B: Backend>(
    terminal: &Terminal<B>,
    session: &ChatSession,
    theme: &Theme,
) -> io::Result<u16> {
    let size = terminal.size()?;
    let area = Rect::new(0, 0, size.width, size.height);
    Ok(max_scroll_offset(session.transcript(), theme, area))
}
