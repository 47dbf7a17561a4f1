use ratatui::style::{Color, Modifier, Style};

const MATRIX_GREEN: Color = Color::Rgb(0, 255, 0);
const DIM_GREEN: Color = Color::Rgb(0, 160, 0);

#[derive(Debug, Clone)]
pub struct Theme {
    pub background_color: Color,

    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,

    pub title_style: Style,
    pub sidebar_text_style: Style,
    pub status_ok_style: Style,
    pub status_missing_style: Style,

    pub border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub processing_style: Style,
}

impl Theme {
    /// Green-on-black palette used for every frame.
    pub fn matrix() -> Self {
        Theme {
            background_color: Color::Black,

            user_prefix_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::White),
            assistant_prefix_style: Style::default()
                .fg(MATRIX_GREEN)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(MATRIX_GREEN),

            title_style: Style::default()
                .fg(MATRIX_GREEN)
                .add_modifier(Modifier::BOLD),
            sidebar_text_style: Style::default().fg(DIM_GREEN),
            status_ok_style: Style::default().fg(MATRIX_GREEN),
            status_missing_style: Style::default().fg(Color::Red),

            border_style: Style::default().fg(MATRIX_GREEN),
            input_title_style: Style::default().fg(DIM_GREEN),
            input_text_style: Style::default().fg(MATRIX_GREEN),
            processing_style: Style::default()
                .fg(MATRIX_GREEN)
                .add_modifier(Modifier::SLOW_BLINK),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::matrix()
    }
}
