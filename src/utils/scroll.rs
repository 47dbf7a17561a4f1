use crate::core::message::Message;
use crate::ui::theme::Theme;
use ratatui::text::{Line, Span};

/// Handles transcript line building and scroll calculations
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Build display lines for every message, in transcript order
    pub fn build_display_lines(messages: &[Message], theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for msg in messages {
            Self::add_message_lines(&mut lines, msg, theme);
        }
        lines
    }

    fn add_message_lines(lines: &mut Vec<Line<'static>>, msg: &Message, theme: &Theme) {
        let (prefix_style, text_style) = if msg.is_user() {
            (theme.user_prefix_style, theme.user_text_style)
        } else {
            (theme.assistant_prefix_style, theme.assistant_text_style)
        };
        let label = format!("{} ", msg.role().display_label());

        let mut content_lines = msg.content().lines();
        let first = content_lines.next().unwrap_or_default().to_string();
        lines.push(Line::from(vec![
            Span::styled(label, prefix_style),
            Span::styled(first, text_style),
        ]));
        for rest in content_lines {
            lines.push(Line::from(Span::styled(rest.to_string(), text_style)));
        }
        lines.push(Line::from(""));
    }

    /// Calculate how many rows the given lines occupy after word wrapping
    pub fn calculate_wrapped_line_count(lines: &[Line], terminal_width: u16) -> u16 {
        lines.iter().fold(0u16, |total, line| {
            let text = line.to_string();
            let trimmed = text.trim();
            let rows = if trimmed.is_empty() || terminal_width == 0 {
                1
            } else {
                Self::calculate_word_wrapped_lines(trimmed, terminal_width)
            };
            total.saturating_add(rows)
        })
    }

    fn calculate_word_wrapped_lines(text: &str, terminal_width: u16) -> u16 {
        let width = terminal_width as usize;
        let mut current_line_len = 0usize;
        let mut line_count = 1u16;

        for word in text.split_whitespace() {
            let word_len = unicode_width::UnicodeWidthStr::width(word);

            if current_line_len > 0 && current_line_len + 1 + word_len > width {
                line_count = line_count.saturating_add(1);
                current_line_len = 0;
            }
            if current_line_len > 0 {
                current_line_len += 1;
            }
            current_line_len += word_len;

            // Words wider than the pane are broken across rows
            while current_line_len > width {
                line_count = line_count.saturating_add(1);
                current_line_len -= width;
            }
        }

        line_count
    }

    /// Offset that shows the last row of the transcript at the bottom
    pub fn calculate_scroll_to_bottom(
        lines: &[Line],
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        Self::calculate_wrapped_line_count(lines, terminal_width).saturating_sub(available_height)
    }
}
