use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

// Help section structure
pub struct HelpSection {
    pub title: &'static str,
    pub items: &'static [(&'static str, &'static str)],
}

// Help section definitions
pub const SECTIONS: &[HelpSection] = &[
    HelpSection {
        title: "Navigation:",
        items: &[
            ("h/←", "Parent"),
            ("j/↓", "Next sibling"),
            ("k/↑", "Previous sibling"),
            ("l/→", "First child"),
            ("m/~", "Go to root"),
            ("click", "Focus node, click again to edit"),
        ],
    },
    HelpSection {
        title: "Editing:",
        items: &[
            ("⇥    ", "Add child"),
            ("⏎    ", "Add sibling"),
            ("␣/e  ", "Edit node (append)"),
            ("E    ", "Edit node (replace)"),
            ("d/⌫  ", "Delete node"),
            ("K/J  ", "Move node up/down"),
        ],
    },
    HelpSection {
        title: "History:",
        items: &[("u/^Z ", "Undo"), ("^Y/^R", "Redo")],
    },
    HelpSection {
        title: "Projects:",
        items: &[
            ("[/]", "Previous/next project"),
            ("R  ", "Reorganize inbox into the map"),
            ("q  ", "Quit"),
        ],
    },
];

// Help renderer
pub struct HelpRenderer;

impl HelpRenderer {
    pub fn render(frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Help ");
        let paragraph = Paragraph::new(Self::build_help_text())
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, area);
    }

    fn build_help_text() -> Vec<Line<'static>> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![Span::styled("zenmap Help", bold)]),
            Line::from(""),
        ];

        for section in SECTIONS {
            lines.push(Line::from(vec![Span::styled(section.title, bold)]));
            for (key, desc) in section.items {
                lines.push(Line::from(format!("  {}  {}", key, desc)));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from("Changes are saved automatically."));
        lines
    }
}
