use agenda_core::diagram::{CellRect, Diagram, DiagramView, PlacedNode, Tone};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Blue => Color::Blue,
        Tone::Yellow => Color::Yellow,
        Tone::Gray => Color::Gray,
        Tone::Purple => Color::Magenta,
        Tone::Green => Color::Green,
        Tone::Red => Color::Red,
        Tone::Slate => Color::DarkGray,
    }
}

/// Draws a laid-out parse tree as boxes joined by elbow connectors
pub struct TreeView<'a> {
    diagram: &'a Diagram,
    view: &'a DiagramView,
}

impl<'a> TreeView<'a> {
    pub fn new(diagram: &'a Diagram, view: &'a DiagramView) -> Self {
        Self { diagram, view }
    }
}

/// Writes into the buffer only when the cell falls inside `area`
fn put(buf: &mut Buffer, area: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    let inside = x >= area.x as i32
        && x < area.right() as i32
        && y >= area.y as i32
        && y < area.bottom() as i32;
    if !inside {
        return;
    }
    if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

fn put_text(buf: &mut Buffer, area: Rect, x: i32, y: i32, text: &str, max: usize, style: Style) {
    let count = text.chars().count();
    let shown: String = if count > max {
        text.chars()
            .take(max.saturating_sub(1))
            .chain(std::iter::once('…'))
            .collect()
    } else {
        text.to_string()
    };
    for (i, ch) in shown.chars().enumerate() {
        let mut symbol = [0u8; 4];
        put(buf, area, x + i as i32, y, ch.encode_utf8(&mut symbol), style);
    }
}

impl TreeView<'_> {
    fn rect(&self, node: &PlacedNode, area: Rect) -> CellRect {
        let mut rect = self.view.project(self.diagram, node, area.width);
        rect.x += area.x as i32;
        rect.y += area.y as i32;
        rect
    }

    fn draw_edge(&self, buf: &mut Buffer, area: Rect, parent: CellRect, child: CellRect) {
        let style = Style::default().fg(Color::DarkGray);
        let from_x = parent.x + parent.width as i32 / 2;
        let from_y = parent.y + parent.height as i32;
        let to_x = child.x + child.width as i32 / 2;
        let to_y = child.y - 1;
        let mid_y = (from_y + to_y) / 2;

        for y in from_y..mid_y {
            put(buf, area, from_x, y, "│", style);
        }
        let (left, right) = (from_x.min(to_x), from_x.max(to_x));
        for x in left..=right {
            put(buf, area, x, mid_y, "─", style);
        }
        if to_x == from_x {
            put(buf, area, from_x, mid_y, "│", style);
        } else {
            put(buf, area, from_x, mid_y, "┴", style);
            put(buf, area, to_x, mid_y, if to_x < from_x { "┌" } else { "┐" }, style);
        }
        for y in (mid_y + 1)..=to_y {
            put(buf, area, to_x, y, "│", style);
        }
    }

    fn draw_node(&self, buf: &mut Buffer, area: Rect, node: &PlacedNode, rect: CellRect) {
        let color = tone_color(node.style.tone);
        let selected = node.path.as_slice() == self.view.selected();
        let mut border = Style::default().fg(color);
        if selected {
            border = border.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }

        let (x0, y0) = (rect.x, rect.y);
        let x1 = rect.x + rect.width as i32 - 1;
        let y1 = rect.y + rect.height as i32 - 1;

        put(buf, area, x0, y0, "╭", border);
        put(buf, area, x1, y0, "╮", border);
        put(buf, area, x0, y1, "╰", border);
        put(buf, area, x1, y1, "╯", border);
        for x in (x0 + 1)..x1 {
            put(buf, area, x, y0, "─", border);
            put(buf, area, x, y1, "─", border);
        }
        for y in (y0 + 1)..y1 {
            put(buf, area, x0, y, "│", border);
            put(buf, area, x1, y, "│", border);
            for x in (x0 + 1)..x1 {
                put(buf, area, x, y, " ", Style::default());
            }
        }

        let inner = rect.width.saturating_sub(2) as usize;
        let mut label = node.label.clone();
        if node.hidden_children > 0 {
            label.push_str(&format!(" +{}", node.hidden_children));
        }
        let label_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        put_text(buf, area, x0 + 1, y0 + 1, &label, inner, label_style);

        if !node.value.is_empty() && y0 + 2 < y1 {
            put_text(buf, area, x0 + 1, y0 + 2, &node.value, inner, Style::default());
        }
    }
}

impl Widget for TreeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rects: Vec<CellRect> = self
            .diagram
            .nodes()
            .iter()
            .map(|node| self.rect(node, area))
            .collect();

        for (parent, child) in self.diagram.edges() {
            self.draw_edge(buf, area, rects[parent], rects[child]);
        }
        for (node, rect) in self.diagram.nodes().iter().zip(&rects) {
            self.draw_node(buf, area, node, *rect);
        }
    }
}
