use ratatui::style::Style;

// Type aliases for clarity
pub type CharBuffer = Vec<Vec<char>>;
pub type StyleBuffer = Vec<Vec<Style>>;
pub type LinkBuffer = Vec<Vec<u8>>;

// Constants for rendering
pub const CURSOR_INDICATOR: char = '▌';
pub const STATUS_EDIT_PREFIX: &str = "Edit: ";
pub const STATUS_REORGANIZING: &str = "Reorganizing…";
/// Occupies the second cell of a double-width char.
pub const WIDE_CONTINUATION: char = '\0';
/// Columns between a node's box and the next level.
pub const LEVEL_GAP: f64 = 4.0;
/// Cells kept around the focused node when scrolling.
pub const SCROLL_MARGIN_X: f64 = 4.0;
pub const SCROLL_MARGIN_Y: f64 = 2.0;

// Connector arms, combined per cell
pub mod arms {
    pub const UP: u8 = 1;
    pub const DOWN: u8 = 2;
    pub const LEFT: u8 = 4;
    pub const RIGHT: u8 = 8;
}

// Junction characters
pub mod junction {
    pub const HORIZONTAL: char = '─';
    pub const VERTICAL: char = '│';
    pub const TOP_CORNER: char = '╭';
    pub const BOTTOM_CORNER: char = '╰';
    pub const TOP_RIGHT: char = '╮';
    pub const BOTTOM_RIGHT: char = '╯';
    pub const MIDDLE_LEFT: char = '├';
    pub const MIDDLE_RIGHT: char = '┤';
    pub const CROSS: char = '┼';
    pub const TOP_TEE: char = '┬';
    pub const BOTTOM_TEE: char = '┴';
}

/// Box-drawing glyph for a set of connector arms.
pub fn junction_glyph(mask: u8) -> char {
    use arms::*;

    match mask {
        m if m == UP | DOWN => junction::VERTICAL,
        m if m == DOWN | RIGHT => junction::TOP_CORNER,
        m if m == UP | RIGHT => junction::BOTTOM_CORNER,
        m if m == LEFT | DOWN => junction::TOP_RIGHT,
        m if m == LEFT | UP => junction::BOTTOM_RIGHT,
        m if m == UP | DOWN | RIGHT => junction::MIDDLE_LEFT,
        m if m == UP | DOWN | LEFT => junction::MIDDLE_RIGHT,
        m if m == LEFT | RIGHT | DOWN => junction::TOP_TEE,
        m if m == LEFT | RIGHT | UP => junction::BOTTOM_TEE,
        m if m == UP | DOWN | LEFT | RIGHT => junction::CROSS,
        m if m == UP || m == DOWN => junction::VERTICAL,
        0 => ' ',
        _ => junction::HORIZONTAL,
    }
}
