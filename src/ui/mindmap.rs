use crate::app::AppState;
use crate::layout::{Edge, MapLayout, NodeBox, Point};
use crate::ui::canvas::BufferCanvas;
use crate::ui::constants::arms::{DOWN, LEFT, RIGHT, UP};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

// Mind map renderer
pub struct MindMapRenderer<'a> {
    app: &'a AppState,
    layout: &'a MapLayout,
}

impl<'a> MindMapRenderer<'a> {
    pub fn new(app: &'a AppState, layout: &'a MapLayout) -> Self {
        Self { app, layout }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let canvas = self.draw(area);
        frame.render_widget(Paragraph::new(canvas.to_lines()), area);
    }

    /// Connectors first, then node labels on top.
    pub fn draw(&self, area: Rect) -> BufferCanvas {
        let mut canvas = BufferCanvas::new(area.width as usize, area.height as usize);

        for edge in &self.layout.edges {
            self.draw_edge(&mut canvas, edge);
        }

        let map = self.app.session.map();
        for handle in map.root.descendants(&map.tree) {
            let Some(node) = map.get(handle) else {
                continue;
            };
            let Some(node_box) = self.layout.node(&node.id) else {
                continue;
            };
            let style = self.node_style(&node.id);
            self.draw_node(&mut canvas, node_box, &node.topic, style);
        }

        canvas
    }

    fn cell(&self, point: Point) -> (i32, i32) {
        (
            (point.x - self.app.viewport_left).round() as i32,
            (point.y - self.app.viewport_top).round() as i32,
        )
    }

    // Horizontal out of the parent, one vertical run in the column just
    // before the child, horizontal into the child. Siblings share the run.
    fn draw_edge(&self, canvas: &mut BufferCanvas, edge: &Edge) {
        let (from_x, from_y) = self.cell(edge.from);
        let (to_x, to_y) = self.cell(edge.to);
        let elbow = (to_x - 2).max(from_x);

        for x in from_x..elbow {
            canvas.connect(x, from_y, LEFT | RIGHT);
        }

        if from_y == to_y {
            for x in elbow..to_x {
                canvas.connect(x, from_y, LEFT | RIGHT);
            }
            return;
        }

        let (leave, arrive) = if to_y > from_y { (DOWN, UP) } else { (UP, DOWN) };
        canvas.connect(elbow, from_y, LEFT | leave);
        for y in from_y.min(to_y) + 1..from_y.max(to_y) {
            canvas.connect(elbow, y, UP | DOWN);
        }
        canvas.connect(elbow, to_y, arrive | RIGHT);
        for x in elbow + 1..to_x {
            canvas.connect(x, to_y, LEFT | RIGHT);
        }
    }

    fn draw_node(&self, canvas: &mut BufferCanvas, node_box: &NodeBox, topic: &str, style: Style) {
        let (x, y) = self.cell(Point {
            x: node_box.x,
            y: node_box.y,
        });
        let padding = self.app.config.horizontal_padding.max(0.0).round() as usize;
        let left = padding / 2;
        let label = format!("{}{}{}", " ".repeat(left), topic, " ".repeat(padding - left));
        canvas.draw_styled_text(x, y, &label, style);
    }

    fn node_style(&self, id: &str) -> Style {
        if self.app.session.selection().is_focused(id) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if id == self.app.session.map().root_id() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    }
}
