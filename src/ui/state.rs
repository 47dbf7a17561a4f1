//! Presentation-only state for the full-screen interface: the input line,
//! scroll position and the processing flag. Nothing here touches the
//! transcript.

#[derive(Debug, Clone)]
pub struct ViewState {
    pub input: String,
    /// Cursor position in characters, not bytes.
    pub cursor: usize,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub processing: bool,
    pub exit_requested: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            scroll_offset: 0,
            auto_scroll: true,
            processing: false,
            exit_requested: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.input.len())
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    pub fn insert_char(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.input.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.input.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Empties the input line, returning what was typed.
    pub fn take_input(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    /// Scrolls down, re-enabling auto-scroll once the bottom is reached.
    pub fn scroll_down(&mut self, rows: u16, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows).min(max_offset);
        if self.scroll_offset >= max_offset {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_bottom(&mut self, max_offset: u16) {
        self.scroll_offset = max_offset;
        self.auto_scroll = true;
    }

    /// Text before the cursor, used to place the terminal cursor.
    pub fn text_before_cursor(&self) -> &str {
        &self.input[..self.byte_index(self.cursor)]
    }
}
