//! Tree diagram geometry for an analyzed command.
//!
//! Everything here is UI-agnostic: node styling is expressed as a `Tone`, sizes
//! and positions are in abstract diagram units, and `DiagramView` holds pan,
//! zoom, collapse and selection state outside the tree it describes.

use crate::ast::{AstNode, Category};
use std::collections::HashSet;

pub const MIN_NODE_WIDTH: u32 = 120;
pub const MAX_NODE_WIDTH: u32 = 300;
pub const UNITS_PER_CHAR: u32 = 8;
pub const NODE_HEIGHT_WITH_VALUE: u32 = 80;
pub const NODE_HEIGHT_BARE: u32 = 50;

/// Distance between neighbouring slots and between levels
pub const NODE_SPACING_X: f32 = 160.0;
pub const NODE_SPACING_Y: f32 = 120.0;
pub const SIBLING_SEPARATION: f32 = 1.5;
pub const NON_SIBLING_SEPARATION: f32 = 2.0;
/// Minimum clear space between two boxes on the same row
const MIN_GAP: f32 = 20.0;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 2.0;
const ZOOM_STEP: f32 = 1.25;

/// Colour family of a node box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Blue,
    Yellow,
    Gray,
    Purple,
    Green,
    Red,
    Slate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub tone: Tone,
}

/// Fixed style table, `Slate` for anything unknown
pub fn style_for(category: &Category) -> NodeStyle {
    let tone = match category {
        Category::Comando => Tone::Blue,
        Category::Verbo => Tone::Yellow,
        Category::Palabras => Tone::Gray,
        Category::Tiempo => Tone::Purple,
        Category::Fecha => Tone::Green,
        Category::Hora => Tone::Red,
        Category::Other(_) => Tone::Slate,
    };
    NodeStyle { tone }
}

/// Box size in diagram units: `(width, height)`
pub fn node_size(node: &AstNode) -> (u32, u32) {
    let value = node.display_value();
    let text_len = node
        .category
        .as_str()
        .chars()
        .count()
        .max(value.chars().count()) as u32;

    let width = (text_len * UNITS_PER_CHAR).clamp(MIN_NODE_WIDTH, MAX_NODE_WIDTH);
    let height = if value.is_empty() {
        NODE_HEIGHT_BARE
    } else {
        NODE_HEIGHT_WITH_VALUE
    };
    (width, height)
}

/// Child-index path from the root; the root is the empty path
pub type NodePath = Vec<usize>;

/// A node with its computed position. `x`/`y` are the box centre.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub path: NodePath,
    pub parent: Option<usize>,
    pub label: String,
    pub value: String,
    pub x: f32,
    pub y: f32,
    pub width: u32,
    pub height: u32,
    pub style: NodeStyle,
    /// Children hidden by a collapse
    pub hidden_children: usize,
}

impl PlacedNode {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn left(&self) -> f32 {
        self.x - self.width as f32 / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width as f32 / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y - self.height as f32 / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height as f32 / 2.0
    }
}

/// Laid-out tree, nodes in pre-order
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    nodes: Vec<PlacedNode>,
}

struct LayoutState<'a> {
    collapsed: &'a HashSet<NodePath>,
    nodes: Vec<PlacedNode>,
    /// Right-most leaf so far: (x, width, parent)
    last_leaf: Option<(f32, u32, Option<usize>)>,
}

impl Diagram {
    /// Vertical tidy layout: leaves take consecutive slots left to right and
    /// every parent is centred over its first and last child.
    pub fn layout(root: &AstNode, collapsed: &HashSet<NodePath>) -> Self {
        let mut state = LayoutState {
            collapsed,
            nodes: Vec::with_capacity(root.node_count()),
            last_leaf: None,
        };
        place(root, Vec::new(), None, &mut state);
        Self { nodes: state.nodes }
    }

    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&PlacedNode> {
        self.nodes.first()
    }

    /// (parent, child) index pairs
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.parent.map(|p| (p, i)))
    }

    pub fn index_of(&self, path: &[usize]) -> Option<usize> {
        self.nodes.iter().position(|n| n.path == path)
    }
}

fn place(node: &AstNode, path: NodePath, parent: Option<usize>, state: &mut LayoutState) -> usize {
    let index = state.nodes.len();
    let (width, height) = node_size(node);
    let is_collapsed = !node.children.is_empty() && state.collapsed.contains(&path);

    state.nodes.push(PlacedNode {
        path: path.clone(),
        parent,
        label: node.category.as_str().to_string(),
        value: node.display_value(),
        x: 0.0,
        y: path.len() as f32 * NODE_SPACING_Y,
        width,
        height,
        style: style_for(&node.category),
        hidden_children: if is_collapsed { node.children.len() } else { 0 },
    });

    let x = if is_collapsed || node.children.is_empty() {
        let x = match state.last_leaf {
            None => 0.0,
            Some((prev_x, prev_width, prev_parent)) => {
                let separation = if prev_parent == parent {
                    SIBLING_SEPARATION
                } else {
                    NON_SIBLING_SEPARATION
                };
                let fit = (prev_width + width) as f32 / 2.0 + MIN_GAP;
                prev_x + (NODE_SPACING_X * separation).max(fit)
            }
        };
        state.last_leaf = Some((x, width, parent));
        x
    } else {
        let mut first = None;
        let mut last = 0;
        for (i, child) in node.children.iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(i);
            let child_index = place(child, child_path, Some(index), state);
            first.get_or_insert(child_index);
            last = child_index;
        }
        let first = first.unwrap_or(last);
        (state.nodes[first].x + state.nodes[last].x) / 2.0
    };

    state.nodes[index].x = x;
    index
}

/// A rectangle in terminal cells, possibly partly off-screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

/// Diagram units per terminal cell at zoom 1.0. A column matches one
/// character of the width formula; a level is six rows.
pub const UNITS_PER_COLUMN: f32 = UNITS_PER_CHAR as f32;
pub const UNITS_PER_ROW: f32 = 20.0;

/// Interactive view over a diagram: pan, zoom, collapsed nodes and the
/// selected node. Never touches the tree itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramView {
    collapsed: HashSet<NodePath>,
    selected: NodePath,
    zoom: f32,
    /// Pan offset in cells
    offset: (i32, i32),
}

impl Default for DiagramView {
    fn default() -> Self {
        Self {
            collapsed: HashSet::new(),
            selected: Vec::new(),
            zoom: 1.0,
            offset: (0, 0),
        }
    }
}

impl DiagramView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self, root: &AstNode) -> Diagram {
        Diagram::layout(root, &self.collapsed)
    }

    pub fn collapsed(&self) -> &HashSet<NodePath> {
        &self.collapsed
    }

    pub fn is_collapsed(&self, path: &[usize]) -> bool {
        self.collapsed.contains(path)
    }

    pub fn toggle_collapse(&mut self, path: &[usize]) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.to_vec());
        }
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Collapse or expand the selected node. Leaves are left alone.
    pub fn toggle_selected(&mut self, root: &AstNode) {
        let has_children = root
            .at_path(&self.selected)
            .is_some_and(|n| !n.children.is_empty());
        if has_children {
            let path = self.selected.clone();
            self.toggle_collapse(&path);
        }
    }

    /// Move the selection forward in pre-order over visible nodes
    pub fn select_next(&mut self, diagram: &Diagram) {
        self.step_selection(diagram, 1);
    }

    pub fn select_prev(&mut self, diagram: &Diagram) {
        self.step_selection(diagram, -1);
    }

    fn step_selection(&mut self, diagram: &Diagram, delta: isize) {
        let count = diagram.nodes().len();
        if count == 0 {
            return;
        }
        let current = diagram.index_of(&self.selected).unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, count as isize - 1) as usize;
        self.selected = diagram.nodes()[next].path.clone();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.offset = (self.offset.0 + dx, self.offset.1 + dy);
    }

    /// Back to the initial zoom and position; collapse state is kept
    pub fn recenter(&mut self) {
        self.zoom = 1.0;
        self.offset = (0, 0);
    }

    /// Cell rectangle of a node, relative to the top-left of a viewport of
    /// `viewport_width` columns. At zero pan the root is centred horizontally
    /// and the top of the tree sits on the first row.
    pub fn project(&self, diagram: &Diagram, node: &PlacedNode, viewport_width: u16) -> CellRect {
        let (root_x, top) = match diagram.root() {
            Some(root) => (root.x, root.top()),
            None => (0.0, 0.0),
        };
        let scale_x = self.zoom / UNITS_PER_COLUMN;
        let scale_y = self.zoom / UNITS_PER_ROW;

        let center = viewport_width as f32 / 2.0;
        let x = center + (node.left() - root_x) * scale_x;
        let y = (node.top() - top) * scale_y;

        CellRect {
            x: x.round() as i32 + self.offset.0,
            y: y.round() as i32 + self.offset.1,
            width: ((node.width as f32 * scale_x).round() as u16).max(3),
            height: ((node.height as f32 * scale_y).round() as u16).max(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_tree() -> AstNode {
        AstNode::new("COMANDO")
            .with_child(AstNode::new("VERBO").with_value("agendá"))
            .with_child(AstNode::new("PALABRAS").with_values(["reunión", "con", "Juan", "el"]))
            .with_child(
                AstNode::new("TIEMPO")
                    .with_child(AstNode::new("FECHA").with_value("viernes"))
                    .with_child(AstNode::new("HORA").with_value("15:00")),
            )
    }

    #[test]
    fn test_node_size_clamps() {
        assert_eq!(node_size(&AstNode::new("COMANDO")), (120, 50));
        assert_eq!(node_size(&AstNode::new("VERBO").with_value("agendá")), (120, 80));

        let medium = AstNode::new("PALABRAS").with_value("x".repeat(20));
        assert_eq!(node_size(&medium).0, 160);

        let long = AstNode::new("PALABRAS").with_value("x".repeat(100));
        assert_eq!(node_size(&long).0, 300);
    }

    #[test]
    fn test_node_size_counts_chars_not_bytes() {
        let accented = AstNode::new("X").with_value("ñ".repeat(20));
        assert_eq!(node_size(&accented).0, 160);
    }

    #[test]
    fn test_style_table() {
        assert_eq!(style_for(&Category::Comando).tone, Tone::Blue);
        assert_eq!(style_for(&Category::Hora).tone, Tone::Red);
        assert_eq!(style_for(&Category::Other("LUGAR".into())).tone, Tone::Slate);
    }

    #[test]
    fn test_layout_is_preorder_and_centred() {
        let diagram = Diagram::layout(&sample_tree(), &HashSet::new());
        let paths: Vec<NodePath> = diagram.nodes().iter().map(|n| n.path.clone()).collect();
        assert_eq!(
            paths,
            vec![vec![], vec![0], vec![1], vec![2], vec![2, 0], vec![2, 1]]
        );

        let nodes = diagram.nodes();
        // TIEMPO sits over FECHA and HORA
        assert_eq!(nodes[3].x, (nodes[4].x + nodes[5].x) / 2.0);
        // Root sits over its first and last child
        assert_eq!(nodes[0].x, (nodes[1].x + nodes[3].x) / 2.0);
        assert_eq!(nodes[4].y, 2.0 * NODE_SPACING_Y);
    }

    #[test]
    fn test_layout_separations() {
        let diagram = Diagram::layout(&sample_tree(), &HashSet::new());
        let nodes = diagram.nodes();
        // Siblings under the root
        assert_eq!(nodes[2].x - nodes[1].x, NODE_SPACING_X * SIBLING_SEPARATION);
        // PALABRAS (root child) to FECHA (TIEMPO child)
        assert_eq!(nodes[4].x - nodes[2].x, NODE_SPACING_X * NON_SIBLING_SEPARATION);
    }

    #[test]
    fn test_wide_leaves_do_not_overlap() {
        let tree = AstNode::new("COMANDO")
            .with_child(AstNode::new("A").with_value("x".repeat(60)))
            .with_child(AstNode::new("B").with_value("y".repeat(60)));
        let diagram = Diagram::layout(&tree, &HashSet::new());
        let nodes = diagram.nodes();
        assert!(nodes[2].left() >= nodes[1].right());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let tree = sample_tree();
        assert_eq!(
            Diagram::layout(&tree, &HashSet::new()),
            Diagram::layout(&tree, &HashSet::new())
        );
    }

    #[test]
    fn test_collapse_hides_descendants_only() {
        let tree = sample_tree();
        let mut view = DiagramView::new();
        view.toggle_collapse(&[2]);

        let diagram = view.layout(&tree);
        assert_eq!(diagram.nodes().len(), 4);
        let tiempo = &diagram.nodes()[3];
        assert_eq!(tiempo.label, "TIEMPO");
        assert_eq!(tiempo.hidden_children, 2);
        // The tree itself is untouched
        assert_eq!(tree.node_count(), 6);

        view.toggle_collapse(&[2]);
        assert_eq!(view.layout(&tree).nodes().len(), 6);
    }

    #[test]
    fn test_toggle_selected_ignores_leaves() {
        let tree = sample_tree();
        let mut view = DiagramView::new();
        let diagram = view.layout(&tree);
        view.select_next(&diagram);
        assert_eq!(view.selected(), &[0]);
        view.toggle_selected(&tree);
        assert!(view.collapsed().is_empty());
    }

    #[test]
    fn test_selection_walks_visible_nodes() {
        let tree = sample_tree();
        let mut view = DiagramView::new();
        view.toggle_collapse(&[2]);
        let diagram = view.layout(&tree);
        for _ in 0..10 {
            view.select_next(&diagram);
        }
        assert_eq!(view.selected(), &[2]);
        view.select_prev(&diagram);
        assert_eq!(view.selected(), &[1]);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = DiagramView::new();
        for _ in 0..20 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), MAX_ZOOM);
        for _ in 0..40 {
            view.zoom_out();
        }
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_projection_centres_root_and_pans() {
        let tree = AstNode::new("COMANDO").with_child(AstNode::new("VERBO").with_value("agendá"));
        let mut view = DiagramView::new();
        let diagram = view.layout(&tree);
        let root = &diagram.nodes()[0];

        let rect = view.project(&diagram, root, 80);
        // 120 units wide at 8 units per column, left edge 7.5 columns off centre
        assert_eq!(rect.width, 15);
        assert_eq!(rect.x, 33);
        assert_eq!(rect.y, 0);

        view.pan(3, -2);
        let moved = view.project(&diagram, root, 80);
        assert_eq!((moved.x, moved.y), (rect.x + 3, rect.y - 2));
    }
}
