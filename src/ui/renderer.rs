use crate::core::credential::Credential;
use crate::core::transcript::Transcript;
use crate::ui::state::ViewState;
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollCalculator;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const SIDEBAR_WIDTH: u16 = 36;
const INPUT_HEIGHT: u16 = 3;
const TITLE: &str = "The Matrix Chatbot";
const PROCESSING_TITLE: &str = "The Matrix is processing...";
const INPUT_TITLE: &str = "Type your message (Enter to send, Esc to quit)";

/// Everything a frame needs, borrowed from the session and the view.
pub struct Screen<'a> {
    pub transcript: &'a Transcript,
    pub credential: &'a Credential,
    pub model: &'a str,
    pub view: &'a ViewState,
    pub theme: &'a Theme,
}

pub struct ScreenAreas {
    pub sidebar: Rect,
    pub transcript: Rect,
    pub input: Rect,
}

pub fn split_areas(area: Rect) -> ScreenAreas {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_HEIGHT)])
        .split(columns[1]);

    ScreenAreas {
        sidebar: columns[0],
        transcript: rows[0],
        input: rows[1],
    }
}

/// Rows available for transcript text once the title row is taken.
pub fn transcript_viewport(area: Rect) -> (u16, u16) {
    let transcript = split_areas(area).transcript;
    (transcript.width, transcript.height.saturating_sub(1))
}

pub fn max_scroll_offset(transcript: &Transcript, theme: &Theme, area: Rect) -> u16 {
    let (width, height) = transcript_viewport(area);
    let lines = ScrollCalculator::build_display_lines(transcript.all(), theme);
    ScrollCalculator::calculate_scroll_to_bottom(&lines, width, height)
}

pub fn ui(f: &mut Frame, screen: &Screen) {
    let theme = screen.theme;
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        f.area(),
    );

    let areas = split_areas(f.area());
    render_sidebar(f, screen, areas.sidebar);
    render_transcript(f, screen, areas.transcript);
    render_input(f, screen, areas.input);
}

fn render_sidebar(f: &mut Frame, screen: &Screen, area: Rect) {
    let theme = screen.theme;
    let mut lines = vec![
        Line::from(Span::styled("About This App", theme.title_style)),
        Line::from(Span::styled(
            "A simple chatbot that sends each message to OpenAI's API and shows the reply. Type below and press Enter to chat.",
            theme.sidebar_text_style,
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Model: {}", screen.model),
            theme.sidebar_text_style,
        )),
        Line::from(""),
    ];

    if screen.credential.is_present() {
        lines.push(Line::from(Span::styled("API key: found", theme.status_ok_style)));
        lines.push(Line::from(Span::styled(
            screen.credential.status_line(),
            theme.status_ok_style,
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "API key: not found",
            theme.status_missing_style,
        )));
        lines.push(Line::from(Span::styled(
            screen.credential.status_line(),
            theme.status_missing_style,
        )));
        lines.push(Line::from(""));
        for hint in Credential::setup_hints() {
            lines.push(Line::from(Span::styled(*hint, theme.sidebar_text_style)));
        }
    }

    let sidebar = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style)
                .title(Span::styled("Matrix Chatbot", theme.title_style)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(sidebar, area);
}

fn render_transcript(f: &mut Frame, screen: &Screen, area: Rect) {
    let theme = screen.theme;
    let lines = ScrollCalculator::build_display_lines(screen.transcript.all(), theme);
    let available_height = area.height.saturating_sub(1);
    let max_offset =
        ScrollCalculator::calculate_scroll_to_bottom(&lines, area.width, available_height);
    let scroll_offset = if screen.view.auto_scroll {
        max_offset
    } else {
        screen.view.scroll_offset.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .block(
            Block::default().title(Line::from(Span::styled(TITLE, theme.title_style)).centered()),
        )
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, area);
}

fn render_input(f: &mut Frame, screen: &Screen, area: Rect) {
    let theme = screen.theme;
    let view = screen.view;

    let title = if view.processing {
        Span::styled(PROCESSING_TITLE, theme.processing_style)
    } else {
        Span::styled(INPUT_TITLE, theme.input_title_style)
    };

    // Keep the cursor inside the box by dropping leading columns of long input.
    let inner_width = usize::from(area.width.saturating_sub(2));
    let cursor_col = UnicodeWidthStr::width(view.text_before_cursor());
    let wanted_skip = cursor_col.saturating_sub(inner_width.saturating_sub(1));
    let (visible, skipped) = skip_columns(&view.input, wanted_skip);

    let input = Paragraph::new(visible)
        .style(theme.input_text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style)
                .title(title),
        );
    f.render_widget(input, area);

    if !view.processing {
        let visible_col = u16::try_from(cursor_col.saturating_sub(skipped)).unwrap_or(u16::MAX);
        f.set_cursor_position((
            area.x.saturating_add(1).saturating_add(visible_col),
            area.y.saturating_add(1),
        ));
    }
}

/// Drops whole characters from the front of `text` until at least `columns`
/// display columns are gone. Returns the rest and the columns actually dropped.
fn skip_columns(text: &str, columns: usize) -> (&str, usize) {
    let mut skipped = 0;
    for (idx, ch) in text.char_indices() {
        if skipped >= columns {
            return (&text[idx..], skipped);
        }
        skipped += UnicodeWidthChar::width(ch).unwrap_or(0);
    }
    ("", skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn draw(transcript: &Transcript, credential: &Credential, view: &ViewState) -> Vec<String> {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        let theme = Theme::matrix();
        terminal
            .draw(|f| {
                ui(
                    f,
                    &Screen {
                        transcript,
                        credential,
                        model: "gpt-3.5-turbo",
                        view,
                        theme: &theme,
                    },
                )
            })
            .expect("draw");
        rendered_rows(&terminal)
    }

    #[test]
    fn transcript_entries_are_labelled() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("Hello")).unwrap();
        transcript.append(Message::assistant("Hi there!")).unwrap();

        let rows = draw(
            &transcript,
            &Credential::from_value(Some("k".to_string())),
            &ViewState::new(),
        );

        assert!(rows.iter().any(|row| row.contains("You: Hello")));
        assert!(rows.iter().any(|row| row.contains("Matrix: Hi there!")));
        assert!(rows.iter().any(|row| row.contains("API key: found")));
    }

    #[test]
    fn missing_credential_shows_warning_and_hints() {
        let rows = draw(&Transcript::new(), &Credential::missing(), &ViewState::new());

        assert!(rows.iter().any(|row| row.contains("API key: not found")));
        assert!(rows.iter().any(|row| row.contains("OPENAI_API_KEY=your_api_key_here")));
    }

    #[test]
    fn processing_replaces_the_input_title() {
        let view = ViewState {
            processing: true,
            ..ViewState::new()
        };
        let rows = draw(&Transcript::new(), &Credential::missing(), &view);
        assert!(rows.iter().any(|row| row.contains(PROCESSING_TITLE)));
    }

    #[test]
    fn very_long_input_keeps_cursor_inside_the_box() {
        let mut view = ViewState::new();
        view.input = "a".repeat(69_999) + "z";
        view.move_end();

        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        let theme = Theme::matrix();
        let transcript = Transcript::new();
        let credential = Credential::missing();
        terminal
            .draw(|f| {
                ui(
                    f,
                    &Screen {
                        transcript: &transcript,
                        credential: &credential,
                        model: "gpt-3.5-turbo",
                        view: &view,
                        theme: &theme,
                    },
                )
            })
            .expect("draw");

        let input = split_areas(Rect::new(0, 0, 120, 30)).input;
        let cursor = terminal.get_cursor_position().expect("cursor");
        assert_eq!(cursor.y, input.y + 1);
        assert_eq!(cursor.x, input.x + input.width - 2);

        let rows = rendered_rows(&terminal);
        let input_row = &rows[usize::from(input.y + 1)];
        assert!(input_row.contains("az"));
    }

    #[test]
    fn skipping_columns_never_splits_wide_characters() {
        assert_eq!(skip_columns("abc", 0), ("abc", 0));
        assert_eq!(skip_columns("abc", 2), ("c", 2));
        assert_eq!(skip_columns("日本語", 1), ("本語", 2));
        assert_eq!(skip_columns("ab", 5), ("", 2));
    }

    #[test]
    fn viewport_excludes_sidebar_and_title_row() {
        let (width, height) = transcript_viewport(Rect::new(0, 0, 120, 30));
        assert_eq!(width, 120 - SIDEBAR_WIDTH);
        assert_eq!(height, 30 - INPUT_HEIGHT - 1);
    }
}
