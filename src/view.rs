//! Views: a layout tree plus the window that has focus in it.

use crate::error::{Error, Result};
use crate::layout::{LayoutKind, LayoutTree, WindowId};

/// Direction of a focus move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward the top.
    Up,
    /// Toward the bottom.
    Down,
    /// Toward the left.
    Left,
    /// Toward the right.
    Right,
}

impl Direction {
    /// Parse the argument of the `mov` command.
    ///
    /// # Errors
    /// Returns an error for anything but `up`, `down`, `left` or `right`.
    pub fn from_arg(arg: Option<&str>) -> Result<Self> {
        match arg {
            Some("up") => Ok(Self::Up),
            Some("down") => Ok(Self::Down),
            Some("left") => Ok(Self::Left),
            Some("right") => Ok(Self::Right),
            other => Err(Error::InvalidArgument {
                command: "mov",
                value: other.unwrap_or_default().to_string(),
            }),
        }
    }

    fn forward(self) -> bool {
        matches!(self, Self::Down | Self::Right)
    }

    /// Layout kind whose children are ordered along this direction.
    fn kind(self) -> LayoutKind {
        match self {
            Self::Up | Self::Down => LayoutKind::Column,
            Self::Left | Self::Right => LayoutKind::Row,
        }
    }
}

/// A named focus context over one layout tree.
#[derive(Debug)]
pub struct View {
    /// Name used in logs.
    pub name: String,
    /// The windows of this view.
    pub tree: LayoutTree,
    /// Focused window, always a leaf.
    pub focus: Option<WindowId>,
}

impl View {
    /// Create a view with a fresh single-window tree and no focus.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: LayoutTree::new(),
            focus: None,
        }
    }

    /// Window reached from `from` by moving `steps` times in `direction`.
    ///
    /// Moving stops early at the last window in that direction. Returns
    /// `None` when there is nothing in that direction at all.
    #[must_use]
    pub fn neighbor(&self, from: WindowId, direction: Direction, steps: u32) -> Option<WindowId> {
        let mut window = from;
        let mut moved = false;
        for _ in 0..steps.max(1) {
            let Some(next) = self.step(window, direction) else {
                break;
            };
            window = next;
            moved = true;
        }
        moved.then_some(window)
    }

    /// One move: climb out of layouts that do not run along the direction
    /// or where the window is already at the edge, move to the
    /// neighbouring sibling, and descend to its first leaf.
    fn step(&self, from: WindowId, direction: Direction) -> Option<WindowId> {
        let tree = &self.tree;
        let mut window = from;
        loop {
            let aligned = tree.kind(tree.enclosing(window)) == direction.kind();
            let sibling = if direction.forward() {
                tree.next_sibling(window)
            } else {
                tree.prev_sibling(window)
            };
            match sibling {
                Some(sibling) if aligned => return Some(tree.first_leaf(sibling)),
                _ => window = tree.parent(tree.enclosing(window))?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Axis;

    /// Two stacked windows, the lower one split side by side:
    ///
    /// ```text
    /// +-------+
    /// |   a   |
    /// +---+---+
    /// | b | c |
    /// +---+---+
    /// ```
    fn grid() -> (View, WindowId, WindowId, WindowId) {
        let mut view = View::new("main");
        let a = view.tree.leaves()[0];
        let b = view.tree.split(a, Axis::Column);
        let c = view.tree.split(b, Axis::Row);
        (view, a, b, c)
    }

    #[test]
    fn test_direction_from_arg() {
        assert_eq!(Direction::from_arg(Some("left")).unwrap(), Direction::Left);
        assert!(Direction::from_arg(Some("sideways")).is_err());
        assert!(Direction::from_arg(None).is_err());
    }

    #[test]
    fn test_move_within_layout() {
        let (view, _, b, c) = grid();
        assert_eq!(view.neighbor(b, Direction::Right, 1), Some(c));
        assert_eq!(view.neighbor(c, Direction::Left, 1), Some(b));
    }

    #[test]
    fn test_move_climbs_to_matching_layout() {
        let (view, a, b, c) = grid();
        assert_eq!(view.neighbor(c, Direction::Up, 1), Some(a));
        assert_eq!(view.neighbor(a, Direction::Down, 1), Some(b));
    }

    #[test]
    fn test_move_off_edge_finds_nothing() {
        let (view, a, _, c) = grid();
        assert_eq!(view.neighbor(a, Direction::Up, 1), None);
        assert_eq!(view.neighbor(c, Direction::Right, 1), None);
        assert_eq!(view.neighbor(a, Direction::Left, 1), None);
    }

    #[test]
    fn test_count_repeats_and_stops_at_root_edge() {
        let mut view = View::new("main");
        let first = view.tree.leaves()[0];
        let second = view.tree.split(first, Axis::Row);
        let third = view.tree.split(second, Axis::Row);

        assert_eq!(view.neighbor(first, Direction::Right, 2), Some(third));
        assert_eq!(view.neighbor(first, Direction::Right, 9), Some(third));
        assert_eq!(view.neighbor(third, Direction::Left, 0), Some(second));
    }

    #[test]
    fn test_count_stops_at_edge_of_nested_layout() {
        let (view, a, b, c) = grid();
        assert_eq!(view.neighbor(b, Direction::Right, 5), Some(c));
        assert_eq!(view.neighbor(c, Direction::Left, 5), Some(b));
        assert_eq!(view.neighbor(a, Direction::Down, 5), Some(b));
    }
}
