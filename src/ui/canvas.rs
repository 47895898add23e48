use crate::ui::constants::{junction_glyph, CharBuffer, LinkBuffer, StyleBuffer, WIDE_CONTINUATION};
use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

// Buffer canvas for drawing characters and styles. Coordinates are signed so
// callers can draw boxes that are partly scrolled out of view.
pub struct BufferCanvas {
    pub char_buffer: CharBuffer,
    pub style_buffer: StyleBuffer,
    link_buffer: LinkBuffer,
    pub width: usize,
    pub height: usize,
}

impl BufferCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            char_buffer: vec![vec![' '; width]; height],
            style_buffer: vec![vec![Style::default(); width]; height],
            link_buffer: vec![vec![0; width]; height],
            width,
            height,
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (y as usize) < self.height && (x as usize) < self.width
    }

    /// Adds connector arms to a cell, merging with what is already there.
    pub fn connect(&mut self, x: i32, y: i32, arms: u8) {
        if !self.in_bounds(x, y) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        self.link_buffer[y][x] |= arms;
        let glyph = junction_glyph(self.link_buffer[y][x]);
        self.put(x, y, glyph, None);
    }

    pub fn draw_styled_text(&mut self, x: i32, y: i32, text: &str, style: Style) {
        let mut col = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            if width == 2 && self.in_bounds(col, y) && self.in_bounds(col + 1, y) {
                self.put(col as usize, y as usize, ch, Some(style));
                self.put(col as usize + 1, y as usize, WIDE_CONTINUATION, Some(style));
            } else if width == 2 {
                // Half visible: blank the visible half.
                for c in [col, col + 1] {
                    if self.in_bounds(c, y) {
                        self.put(c as usize, y as usize, ' ', Some(style));
                    }
                }
            } else if self.in_bounds(col, y) {
                self.put(col as usize, y as usize, ch, Some(style));
            }
            col += width;
        }
    }

    fn put(&mut self, x: usize, y: usize, ch: char, style: Option<Style>) {
        // Never leave half of a double-width char behind.
        if self.char_buffer[y][x] == WIDE_CONTINUATION && x > 0 {
            self.char_buffer[y][x - 1] = ' ';
        }
        if x + 1 < self.width
            && self.char_buffer[y][x + 1] == WIDE_CONTINUATION
            && ch != WIDE_CONTINUATION
        {
            self.char_buffer[y][x + 1] = ' ';
        }

        self.char_buffer[y][x] = ch;
        if let Some(style) = style {
            self.style_buffer[y][x] = style;
            self.link_buffer[y][x] = 0;
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();

        for (y, row) in self.char_buffer.iter().enumerate() {
            let mut spans = Vec::new();
            let mut current_style = Style::default();
            let mut current_text = String::new();

            for (x, &ch) in row.iter().enumerate() {
                if ch == WIDE_CONTINUATION {
                    continue;
                }
                let style = self.style_buffer[y][x];
                if style != current_style {
                    if !current_text.is_empty() {
                        spans.push(Span::styled(current_text.clone(), current_style));
                        current_text.clear();
                    }
                    current_style = style;
                }
                current_text.push(ch);
            }

            if !current_text.is_empty() {
                spans.push(Span::styled(current_text, current_style));
            }

            lines.push(Line::from(spans));
        }

        lines
    }
}
