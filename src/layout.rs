//! Layout tree for arranging windows.
//!
//! The tree alternates between layouts and windows. A layout owns an
//! ordered list of windows splitting its area along one axis; a window is
//! either a leaf (empty or holding a client) or a branch holding a nested
//! layout. Nodes live in arenas and are addressed by stable indices, so
//! parent links and focus are plain ids rather than pointers.

use ratatui::layout::Rect;

use crate::client::ClientId;
use crate::error::{Error, Result};

/// Tolerance used when checking that sibling shares add up to one.
pub const SHARE_EPSILON: f64 = 1e-9;

/// Stable handle of a window in a [`LayoutTree`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct WindowId(usize);

/// Stable handle of a layout in a [`LayoutTree`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct LayoutId(usize);

/// Direction in which a split places the new window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Children side by side, splitting the width.
    Row,
    /// Children stacked top to bottom, splitting the height.
    Column,
}

impl Axis {
    /// Parse the argument of the `split` command: anything starting with
    /// `v` places windows side by side, everything else stacks them.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(a) if a.starts_with('v') => Self::Row,
            _ => Self::Column,
        }
    }
}

/// Orientation of a layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutKind {
    /// Single child, not split yet.
    #[default]
    Undetermined,
    /// Children side by side.
    Row,
    /// Children stacked vertically.
    Column,
}

impl From<Axis> for LayoutKind {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Row => Self::Row,
            Axis::Column => Self::Column,
        }
    }
}

/// What a window holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Reusable empty leaf.
    Empty,
    /// Leaf displaying a client.
    Client(ClientId),
    /// Branch holding a nested layout.
    Layout(LayoutId),
}

#[derive(Debug)]
struct LayoutNode {
    kind: LayoutKind,
    windows: Vec<WindowId>,
    /// Branch window holding this layout, `None` for the root.
    parent: Option<WindowId>,
}

#[derive(Debug)]
struct WindowNode {
    share: f64,
    slot: Slot,
    enclosing: LayoutId,
}

/// Screen geometry computed for one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// The window.
    pub window: WindowId,
    /// Full extent assigned by the enclosing layout.
    pub rect: Rect,
    /// One-column divider carved on the left, for row children after the first.
    pub divider: Option<Rect>,
    /// Title row carved at the bottom of a leaf when several leaves are visible.
    pub title: Option<Rect>,
    /// Remaining area: the client's screen for leaves, the nested layout's area for branches.
    pub content: Rect,
    /// Whether the window is a leaf.
    pub leaf: bool,
}

/// Recursive row/column layout of windows.
#[derive(Debug)]
pub struct LayoutTree {
    layouts: Vec<LayoutNode>,
    windows: Vec<WindowNode>,
    root: LayoutId,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    /// Create a tree with an undetermined root holding one empty window.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            layouts: vec![LayoutNode {
                kind: LayoutKind::Undetermined,
                windows: Vec::new(),
                parent: None,
            }],
            windows: Vec::new(),
            root: LayoutId(0),
        };
        let first = tree.push_window(LayoutId(0), 1.0, Slot::Empty);
        tree.layouts[0].windows.push(first);
        tree
    }

    /// Root layout.
    #[must_use]
    pub fn root(&self) -> LayoutId {
        self.root
    }

    /// Orientation of a layout.
    #[must_use]
    pub fn kind(&self, layout: LayoutId) -> LayoutKind {
        self.layouts[layout.0].kind
    }

    /// Ordered children of a layout.
    #[must_use]
    pub fn windows(&self, layout: LayoutId) -> &[WindowId] {
        &self.layouts[layout.0].windows
    }

    /// Branch window holding a layout, `None` for the root.
    #[must_use]
    pub fn parent(&self, layout: LayoutId) -> Option<WindowId> {
        self.layouts[layout.0].parent
    }

    /// Layout a window belongs to.
    #[must_use]
    pub fn enclosing(&self, window: WindowId) -> LayoutId {
        self.windows[window.0].enclosing
    }

    /// Fraction of the enclosing layout's split axis held by a window.
    #[must_use]
    pub fn share(&self, window: WindowId) -> f64 {
        self.windows[window.0].share
    }

    /// What a window holds.
    #[must_use]
    pub fn slot(&self, window: WindowId) -> Slot {
        self.windows[window.0].slot
    }

    /// Client displayed by a window, if any.
    #[must_use]
    pub fn client(&self, window: WindowId) -> Option<ClientId> {
        match self.slot(window) {
            Slot::Client(id) => Some(id),
            _ => None,
        }
    }

    /// Number of layouts in the tree.
    #[must_use]
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Number of windows, leaves and branches together.
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Sum of the children's shares of a layout.
    #[must_use]
    pub fn share_sum(&self, layout: LayoutId) -> f64 {
        self.windows(layout).iter().map(|w| self.share(*w)).sum()
    }

    /// All leaf windows in depth-first order.
    #[must_use]
    pub fn leaves(&self) -> Vec<WindowId> {
        let mut leaves = Vec::new();
        self.collect_leaves(self.root, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, layout: LayoutId, leaves: &mut Vec<WindowId>) {
        for &w in self.windows(layout) {
            match self.slot(w) {
                Slot::Layout(child) => self.collect_leaves(child, leaves),
                _ => leaves.push(w),
            }
        }
    }

    /// Window currently showing a client.
    #[must_use]
    pub fn find_client(&self, client: ClientId) -> Option<WindowId> {
        self.leaves()
            .into_iter()
            .find(|w| self.client(*w) == Some(client))
    }

    /// Depth-first search for a leaf with neither client nor layout.
    #[must_use]
    pub fn find_empty(&self, layout: LayoutId) -> Option<WindowId> {
        for &w in self.windows(layout) {
            match self.slot(w) {
                Slot::Empty => return Some(w),
                Slot::Layout(child) => {
                    if let Some(found) = self.find_empty(child) {
                        return Some(found);
                    }
                }
                Slot::Client(_) => {}
            }
        }
        None
    }

    /// Place a client into an empty leaf.
    ///
    /// # Errors
    /// Returns an error if the window is not an empty leaf.
    pub fn attach(&mut self, window: WindowId, client: ClientId) -> Result<()> {
        let node = &mut self.windows[window.0];
        if node.slot != Slot::Empty {
            return Err(Error::Layout(format!("window {} is occupied", window.0)));
        }
        node.slot = Slot::Client(client);
        Ok(())
    }

    /// Empty a leaf, keeping it in the tree as a reusable slot.
    pub fn detach(&mut self, window: WindowId) -> Option<ClientId> {
        let node = &mut self.windows[window.0];
        match node.slot {
            Slot::Client(id) => {
                node.slot = Slot::Empty;
                Some(id)
            }
            _ => None,
        }
    }

    /// Split next to `target` along `axis` and return the new empty window.
    ///
    /// An undetermined layout takes the requested orientation. When the
    /// enclosing layout already runs the other way, `target` is moved into
    /// a fresh nested layout of the requested kind that takes its place,
    /// and the split happens there. Every existing sibling shrinks by
    /// `n / (n + 1)` and the new window gets the remaining `1 / (n + 1)`.
    /// Splitting a branch window splits inside its nested layout.
    pub fn split(&mut self, target: WindowId, axis: Axis) -> WindowId {
        let kind = LayoutKind::from(axis);
        let (mut layout, mut anchor) = match self.slot(target) {
            Slot::Layout(child) => {
                let last = *self.layouts[child.0]
                    .windows
                    .last()
                    .unwrap_or(&target);
                (child, last)
            }
            _ => (self.enclosing(target), target),
        };

        match self.kind(layout) {
            LayoutKind::Undetermined => self.layouts[layout.0].kind = kind,
            current if current != kind => {
                layout = self.nest(anchor, kind);
                anchor = self.windows(layout)[0];
            }
            _ => {}
        }

        let count = self.windows(layout).len();
        #[allow(clippy::cast_precision_loss)]
        let factor = count as f64 / (count + 1) as f64;
        for &w in &self.layouts[layout.0].windows {
            self.windows[w.0].share *= factor;
        }

        let new = self.push_window(layout, 1.0 - factor, Slot::Empty);
        let siblings = &mut self.layouts[layout.0].windows;
        let at = siblings
            .iter()
            .position(|w| *w == anchor)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(at, new);
        new
    }

    /// Replace `window` in its layout by a branch holding a new layout of
    /// `kind` whose only child is `window`.
    fn nest(&mut self, window: WindowId, kind: LayoutKind) -> LayoutId {
        let outer = self.enclosing(window);
        let nested = LayoutId(self.layouts.len());
        let share = self.share(window);
        let branch = self.push_window(outer, share, Slot::Layout(nested));
        self.layouts.push(LayoutNode {
            kind,
            windows: vec![window],
            parent: Some(branch),
        });

        if let Some(pos) = self.layouts[outer.0].windows.iter().position(|w| *w == window) {
            self.layouts[outer.0].windows[pos] = branch;
        }
        let node = &mut self.windows[window.0];
        node.enclosing = nested;
        node.share = 1.0;
        nested
    }

    fn push_window(&mut self, enclosing: LayoutId, share: f64, slot: Slot) -> WindowId {
        let id = WindowId(self.windows.len());
        self.windows.push(WindowNode {
            share,
            slot,
            enclosing,
        });
        id
    }

    /// Sibling after `window` in its layout.
    #[must_use]
    pub fn next_sibling(&self, window: WindowId) -> Option<WindowId> {
        let siblings = self.windows(self.enclosing(window));
        let pos = siblings.iter().position(|w| *w == window)?;
        siblings.get(pos + 1).copied()
    }

    /// Sibling before `window` in its layout.
    #[must_use]
    pub fn prev_sibling(&self, window: WindowId) -> Option<WindowId> {
        let siblings = self.windows(self.enclosing(window));
        let pos = siblings.iter().position(|w| *w == window)?;
        pos.checked_sub(1).map(|i| siblings[i])
    }

    /// Descend through branch windows to the first leaf.
    #[must_use]
    pub fn first_leaf(&self, mut window: WindowId) -> WindowId {
        while let Slot::Layout(child) = self.slot(window) {
            match self.windows(child).first() {
                Some(first) => window = *first,
                None => break,
            }
        }
        window
    }

    /// Compute the rectangle of every window for the given screen area.
    ///
    /// Along a layout's axis each child gets `round(share * extent)`,
    /// except the last which takes the exact remainder, so children always
    /// tile their parent without gaps or overlap. Title rows are only
    /// carved when more than one leaf is visible.
    #[must_use]
    pub fn arrange(&self, area: Rect) -> Vec<Placement> {
        let decorate = self.leaves().len() > 1;
        let mut placements = Vec::with_capacity(self.windows.len());
        self.arrange_layout(self.root, area, decorate, &mut placements);
        placements
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn arrange_layout(
        &self,
        layout: LayoutId,
        area: Rect,
        decorate: bool,
        placements: &mut Vec<Placement>,
    ) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let row = self.kind(layout) == LayoutKind::Row;
        let unit = if row { area.width } else { area.height };
        let children = self.windows(layout);
        let mut consumed: u16 = 0;

        for (i, &window) in children.iter().enumerate() {
            let remaining = unit - consumed;
            let extent = if i + 1 == children.len() {
                remaining
            } else {
                ((self.share(window) * f64::from(unit)).round() as u16).min(remaining)
            };

            let rect = if row {
                Rect::new(area.x + consumed, area.y, extent, area.height)
            } else {
                Rect::new(area.x, area.y + consumed, area.width, extent)
            };
            consumed += extent;

            let mut content = rect;
            let divider = if row && i > 0 && content.width > 0 {
                content.x += 1;
                content.width -= 1;
                Some(Rect::new(rect.x, rect.y, 1, rect.height))
            } else {
                None
            };

            match self.slot(window) {
                Slot::Layout(child) => {
                    placements.push(Placement {
                        window,
                        rect,
                        divider,
                        title: None,
                        content,
                        leaf: false,
                    });
                    self.arrange_layout(child, content, decorate, placements);
                }
                _ => {
                    let title = if decorate && content.height > 0 {
                        content.height -= 1;
                        Some(Rect::new(content.x, content.y + content.height, content.width, 1))
                    } else {
                        None
                    };
                    placements.push(Placement {
                        window,
                        rect,
                        divider,
                        title,
                        content,
                        leaf: true,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_shares(tree: &LayoutTree, layout: LayoutId) {
        let sum = tree.share_sum(layout);
        assert!((sum - 1.0).abs() < SHARE_EPSILON, "shares sum to {sum}");
        for &w in tree.windows(layout) {
            if let Slot::Layout(child) = tree.slot(w) {
                assert_shares(tree, child);
            }
        }
    }

    fn placement(placements: &[Placement], window: WindowId) -> Placement {
        *placements.iter().find(|p| p.window == window).unwrap()
    }

    #[test]
    fn test_new_tree_has_one_empty_window() {
        let tree = LayoutTree::new();
        let root = tree.root();

        assert_eq!(tree.kind(root), LayoutKind::Undetermined);
        assert_eq!(tree.windows(root).len(), 1);
        assert_eq!(tree.find_empty(root), Some(tree.windows(root)[0]));
    }

    #[test]
    fn test_split_sets_kind_and_halves() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        let second = tree.split(first, Axis::Column);

        assert_eq!(tree.kind(tree.root()), LayoutKind::Column);
        assert_eq!(tree.windows(tree.root()), &[first, second]);
        assert!((tree.share(first) - 0.5).abs() < SHARE_EPSILON);
        assert!((tree.share(second) - 0.5).abs() < SHARE_EPSILON);
    }

    #[test]
    fn test_split_shrinks_all_siblings_proportionally() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        let second = tree.split(first, Axis::Row);
        let third = tree.split(second, Axis::Row);

        for w in [first, second, third] {
            assert!((tree.share(w) - 1.0 / 3.0).abs() < SHARE_EPSILON);
        }
        let fourth = tree.split(first, Axis::Row);
        assert_eq!(tree.windows(tree.root()), &[first, fourth, second, third]);
        for w in [first, second, third, fourth] {
            assert!((tree.share(w) - 0.25).abs() < SHARE_EPSILON);
        }
    }

    #[test]
    fn test_shares_sum_to_one_after_many_splits() {
        let mut tree = LayoutTree::new();
        for i in 0..40 {
            let leaves = tree.leaves();
            let target = leaves[(i * 7) % leaves.len()];
            let axis = if i % 3 == 0 { Axis::Row } else { Axis::Column };
            tree.split(target, axis);
            assert_shares(&tree, tree.root());
        }
    }

    #[test]
    fn test_split_across_axis_nests_target() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        let second = tree.split(first, Axis::Column);
        let layouts = tree.layout_count();

        let third = tree.split(second, Axis::Row);

        assert_eq!(tree.layout_count(), layouts + 1);
        let nested = tree.enclosing(second);
        assert_eq!(tree.kind(nested), LayoutKind::Row);
        assert_eq!(tree.windows(nested), &[second, third]);
        assert!((tree.share(second) - 0.5).abs() < SHARE_EPSILON);
        assert!((tree.share(third) - 0.5).abs() < SHARE_EPSILON);

        let branch = tree.parent(nested).unwrap();
        assert_eq!(tree.slot(branch), Slot::Layout(nested));
        assert_eq!(tree.windows(tree.root()), &[first, branch]);
        assert!((tree.share(first) - 0.5).abs() < SHARE_EPSILON);
        assert!((tree.share(branch) - 0.5).abs() < SHARE_EPSILON);
    }

    #[test]
    fn test_find_empty_prefers_vacated_slot() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        tree.attach(first, ClientId(1)).unwrap();
        let second = tree.split(first, Axis::Column);
        tree.attach(second, ClientId(2)).unwrap();
        assert_eq!(tree.find_empty(tree.root()), None);

        assert_eq!(tree.detach(first), Some(ClientId(1)));
        let windows = tree.window_count();
        assert_eq!(tree.find_empty(tree.root()), Some(first));
        assert_eq!(tree.window_count(), windows);
    }

    #[test]
    fn test_find_empty_searches_nested_layouts() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        tree.attach(first, ClientId(1)).unwrap();
        let second = tree.split(first, Axis::Column);
        tree.attach(second, ClientId(2)).unwrap();
        let third = tree.split(second, Axis::Row);

        assert_eq!(tree.find_empty(tree.root()), Some(third));
    }

    #[test]
    fn test_attach_rejects_occupied_window() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        tree.attach(first, ClientId(1)).unwrap();
        assert!(tree.attach(first, ClientId(2)).is_err());
        assert_eq!(tree.find_client(ClientId(1)), Some(first));
    }

    #[test]
    fn test_single_window_fills_area() {
        let tree = LayoutTree::new();
        let area = Rect::new(0, 0, 100, 50);
        let placements = tree.arrange(area);

        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].content, area);
        assert_eq!(placements[0].title, None);
    }

    #[test]
    fn test_column_layout_carves_title_rows() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        let second = tree.split(first, Axis::Column);
        let placements = tree.arrange(Rect::new(0, 0, 80, 25));

        let top = placement(&placements, first);
        let bottom = placement(&placements, second);
        assert_eq!(top.rect, Rect::new(0, 0, 80, 13));
        assert_eq!(top.content, Rect::new(0, 0, 80, 12));
        assert_eq!(top.title, Some(Rect::new(0, 12, 80, 1)));
        assert_eq!(bottom.rect, Rect::new(0, 13, 80, 12));
        assert_eq!(bottom.title, Some(Rect::new(0, 24, 80, 1)));
    }

    #[test]
    fn test_row_layout_carves_dividers() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        let second = tree.split(first, Axis::Row);
        let placements = tree.arrange(Rect::new(0, 0, 100, 50));

        let left = placement(&placements, first);
        let right = placement(&placements, second);
        assert_eq!(left.divider, None);
        assert_eq!(left.rect, Rect::new(0, 0, 50, 50));
        assert_eq!(right.divider, Some(Rect::new(50, 0, 1, 50)));
        assert_eq!(right.content, Rect::new(51, 0, 49, 49));
    }

    #[test]
    fn test_children_tile_parent_exactly() {
        let mut tree = LayoutTree::new();
        for i in 0..25 {
            let leaves = tree.leaves();
            let target = leaves[(i * 5 + 3) % leaves.len()];
            let axis = if i % 2 == 0 { Axis::Row } else { Axis::Column };
            tree.split(target, axis);
        }

        for area in [
            Rect::new(0, 0, 80, 24),
            Rect::new(3, 1, 7, 5),
            Rect::new(0, 1, 211, 63),
        ] {
            let placements = tree.arrange(area);
            check_tiling(&tree, tree.root(), area, &placements);
        }
    }

    fn check_tiling(tree: &LayoutTree, layout: LayoutId, area: Rect, placements: &[Placement]) {
        let row = tree.kind(layout) == LayoutKind::Row;
        let mut offset = if row { area.x } else { area.y };
        let mut total = 0;
        for &w in tree.windows(layout) {
            let Some(p) = placements.iter().find(|p| p.window == w) else {
                continue;
            };
            if row {
                assert_eq!(p.rect.x, offset);
                assert_eq!(p.rect.height, area.height);
                offset += p.rect.width;
                total += p.rect.width;
            } else {
                assert_eq!(p.rect.y, offset);
                assert_eq!(p.rect.width, area.width);
                offset += p.rect.height;
                total += p.rect.height;
            }
            if let Slot::Layout(child) = tree.slot(w) {
                check_tiling(tree, child, p.content, placements);
            }
        }
        if area.width > 0 && area.height > 0 {
            assert_eq!(total, if row { area.width } else { area.height });
        }
    }

    #[test]
    fn test_many_small_shares_never_overflow() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        for _ in 0..9 {
            tree.split(first, Axis::Row);
        }
        let placements = tree.arrange(Rect::new(0, 0, 15, 4));
        let total: u16 = tree
            .windows(tree.root())
            .iter()
            .map(|w| placement(&placements, *w).rect.width)
            .sum();
        assert_eq!(total, 15);
    }

    #[test]
    fn test_sibling_navigation() {
        let mut tree = LayoutTree::new();
        let first = tree.leaves()[0];
        let second = tree.split(first, Axis::Row);
        let third = tree.split(second, Axis::Column);
        let branch = tree.parent(tree.enclosing(second)).unwrap();

        assert_eq!(tree.next_sibling(first), Some(branch));
        assert_eq!(tree.prev_sibling(branch), Some(first));
        assert_eq!(tree.prev_sibling(first), None);
        assert_eq!(tree.first_leaf(branch), second);
        assert_eq!(tree.next_sibling(second), Some(third));
    }
}
