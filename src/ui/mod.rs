pub mod canvas;
pub mod constants;
pub mod help;
pub mod mindmap;
pub mod status_line;

use crate::app::{AppMode, AppState};
use crate::layout::{self, LabelMeasurer, MapLayout, UnicodeMeasurer};
use constants::{LEVEL_GAP, SCROLL_MARGIN_X, SCROLL_MARGIN_Y};
use help::HelpRenderer;
use mindmap::MindMapRenderer;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};
use status_line::StatusLineRenderer;

// Main render function
pub fn render(frame: &mut Frame, app: &mut AppState) {
    let size = frame.area();
    app.terminal_width = size.width;
    app.terminal_height = size.height;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(size);

    if app.mode == AppMode::Help {
        HelpRenderer::render(frame, chunks[0]);
    } else {
        let layout = map_layout(app, chunks[0]);
        ensure_focus_visible(app, &layout, chunks[0]);
        MindMapRenderer::new(app, &layout).render(frame, chunks[0]);
    }

    StatusLineRenderer::render(frame, app, chunks[1]);
}

/// Lays the map out over the visible area, growing it when the tree needs
/// more rows or columns than the terminal has.
pub fn map_layout(app: &AppState, area: Rect) -> MapLayout {
    let options = app.config.layout_options();
    let map = app.session.map();
    let measurer = UnicodeMeasurer;

    let widest = map
        .root
        .descendants(&map.tree)
        .filter_map(|handle| map.get(handle))
        .map(|node| measurer.measure(&node.topic).width)
        .fold(0.0, f64::max);
    let level_width = widest + options.horizontal_padding + LEVEL_GAP;
    let width = (area.width as f64).max(map.depth() as f64 * level_width + options.reserved_width);
    // One spare row keeps adjacent leaves on distinct rows after rounding.
    let needed = layout::min_viewport_height(map, &measurer, &options) + 1.0;
    let height = (area.height as f64).max(needed.ceil());

    layout::layout(map, width, height, &measurer, &options)
}

/// The node drawn at a terminal cell, if any. Uses the same layout and
/// viewport as the last frame.
pub fn node_at(app: &AppState, column: u16, row: u16) -> Option<String> {
    let area = Rect::new(0, 0, app.terminal_width, app.terminal_height.saturating_sub(1));
    if row >= area.height || column >= area.width {
        return None;
    }

    let layout = map_layout(app, area);
    let (column, row) = (column as f64, row as f64);
    layout
        .nodes
        .iter()
        .find(|(_, node_box)| {
            let left = (node_box.x - app.viewport_left).round();
            let top = (node_box.y - app.viewport_top).round();
            row == top && column >= left && column < left + node_box.width.round()
        })
        .map(|(id, _)| id.clone())
}

/// Scrolls just enough to keep the focused node inside the area.
pub fn ensure_focus_visible(app: &mut AppState, layout: &MapLayout, area: Rect) {
    let Some(node_box) = app.session.focused().and_then(|id| layout.node(id)) else {
        return;
    };
    let (left, right) = (node_box.x, node_box.right());
    let (top, bottom) = (node_box.y.round(), node_box.y.round() + 1.0);
    let (width, height) = (area.width as f64, area.height as f64);

    if left < app.viewport_left + SCROLL_MARGIN_X {
        app.viewport_left = (left - SCROLL_MARGIN_X).max(0.0);
    } else if right > app.viewport_left + width - SCROLL_MARGIN_X {
        app.viewport_left = (right - width + SCROLL_MARGIN_X).min(left).max(0.0);
    }

    if top < app.viewport_top + SCROLL_MARGIN_Y {
        app.viewport_top = (top - SCROLL_MARGIN_Y).max(0.0);
    } else if bottom > app.viewport_top + height - SCROLL_MARGIN_Y {
        app.viewport_top = (bottom - height + SCROLL_MARGIN_Y).max(0.0);
    }
}
