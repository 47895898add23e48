use crate::app::{AppMode, AppState};
use crate::ui::constants::{CURSOR_INDICATOR, STATUS_EDIT_PREFIX, STATUS_REORGANIZING};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

// Status line renderer
pub struct StatusLineRenderer;

impl StatusLineRenderer {
    pub fn render(frame: &mut Frame, app: &AppState, area: Rect) {
        let (content, style) = Self::content_and_style(app, area);
        frame.render_widget(Paragraph::new(content).style(style), area);
    }

    pub fn content_and_style(app: &AppState, area: Rect) -> (String, Style) {
        match &app.mode {
            AppMode::Normal => Self::render_normal_mode(app),
            AppMode::Editing { buffer, cursor_pos, .. } => {
                Self::render_edit_mode(buffer, *cursor_pos, area.width)
            }
            AppMode::Help => Self::render_help_mode(),
        }
    }

    fn render_normal_mode(app: &AppState) -> (String, Style) {
        if let Some(ref msg) = app.message {
            let style = Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD);
            return (msg.clone(), style);
        }
        if app.is_reorganizing() {
            let style = Style::default().fg(Color::Black).bg(Color::Yellow);
            return (STATUS_REORGANIZING.to_string(), style);
        }

        let session = &app.session;
        let history = session.history();
        let content = format!(
            "zenmap | {} | {} nodes | undo {} redo {} | ? for help",
            session.project().unwrap_or("-"),
            session.map().node_count(),
            history.undo_len(),
            history.redo_len(),
        );
        (content, Style::default().fg(Color::Gray).bg(Color::Black))
    }

    // Scrolls long buffers so the cursor stays on screen. Positions are in chars.
    fn render_edit_mode(buffer: &str, cursor_pos: usize, width: u16) -> (String, Style) {
        let chars: Vec<char> = buffer.chars().collect();
        let available_width =
            (width as usize).saturating_sub(STATUS_EDIT_PREFIX.chars().count() + 1);
        let text_start = if chars.len() > available_width
            && cursor_pos > available_width.saturating_sub(10)
        {
            cursor_pos.saturating_sub(available_width / 2)
        } else {
            0
        };
        let text_end = (text_start + available_width).min(chars.len());
        let cursor = cursor_pos.clamp(text_start, text_end) - text_start;
        let visible = &chars[text_start..text_end];

        let mut display = String::from(STATUS_EDIT_PREFIX);
        display.extend(&visible[..cursor]);
        display.push(CURSOR_INDICATOR);
        display.extend(&visible[cursor..]);

        let style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        (display, style)
    }

    fn render_help_mode() -> (String, Style) {
        let content = String::from("Press ESC or q to close help");
        let style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        (content, style)
    }
}
