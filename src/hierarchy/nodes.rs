//! hierarchy::nodes — arena node table for the section hierarchy.
//!
//! Purpose
//! -------
//! Define the [`SectionNode`] record and the arena conventions used by
//! [`SectionHierarchy`](crate::hierarchy::SectionHierarchy): a flat,
//! level-major `Vec<SectionNode>` with integer parent links and contiguous
//! child ranges. This replaces fragile name-based bookkeeping with O(1)
//! ancestor traversal for rate reconstruction.
//!
//! Key behaviors
//! -------------
//! - [`SectionNode`] identifies a section by `(level, index)` and holds its
//!   depth interval, its parent's arena index (if any), and the arena range
//!   of its children.
//! - Children of a node are always contiguous in the arena, so the child list
//!   is stored as a `Range<usize>` rather than an owned vector.
//!
//! Invariants & assumptions
//! ------------------------
//! - Nodes are stored level-major: all of level 0 first (the roots), then
//!   level 1, and so on down to the finest level.
//! - `depth_top < depth_bottom` for every node, and the union of a parent's
//!   children's intervals equals the parent's interval exactly (child
//!   boundaries are taken verbatim from the shared finest-boundary grid, so
//!   the tiling holds bit-for-bit, not merely within tolerance).
//! - `parent` is `None` exactly for level-0 nodes; `children` is the empty
//!   range exactly for finest-level nodes.
//!
//! Conventions
//! -----------
//! - Depth increases downward: `depth_top` is the shallow end of the section
//!   and `depth_bottom` the deep end.
//! - Indexing is 0-based within each level and across the arena.
//!
//! Downstream usage
//! ----------------
//! - The builder (`hierarchy::builder`) is the only producer of nodes; all
//!   other modules consume them read-only through `SectionHierarchy`
//!   accessors.
//! - The parameter mapper walks `parent` links from a leaf to its level-1
//!   ancestor to assemble multiplier chains.
//!
//! Testing notes
//! -------------
//! - Structural invariants (tiling, parent/child symmetry, level-major
//!   ordering) are exercised in `hierarchy::builder` tests, where nodes are
//!   produced; this module itself carries only the plain record type.
use std::ops::Range;

/// SectionNode — one depth section at one hierarchy level.
///
/// Purpose
/// -------
/// Record the position of a section inside the hierarchy (`level`, `index`),
/// its depth interval, and its arena links: the parent's arena index and the
/// contiguous arena range of its children.
///
/// Fields
/// ------
/// - `level`: `usize`
///   Hierarchy level, 0 = coarsest.
/// - `index`: `usize`
///   0-based position within the level.
/// - `depth_top`: `f64`
///   Shallow boundary of the section.
/// - `depth_bottom`: `f64`
///   Deep boundary of the section; strictly greater than `depth_top`.
/// - `parent`: `Option<usize>`
///   Arena index of the parent node; `None` for level-0 roots. A lookup
///   index only — the arena owns all nodes.
/// - `children`: `Range<usize>`
///   Arena range of the child nodes at the next finer level; empty for
///   finest-level sections.
///
/// Invariants
/// ----------
/// - `depth_top < depth_bottom`.
/// - `children.len()` equals the branching factor of the next level for all
///   non-finest nodes, and 0 for finest nodes.
/// - Every node in `children` has `parent == Some(self's arena index)`.
///
/// Performance
/// -----------
/// - Plain value type; `children` as a `Range` keeps the node allocation-free
///   regardless of branching factor.
///
/// Notes
/// -----
/// - Nodes are produced exclusively by the hierarchy builder and are
///   immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    /// Hierarchy level (0 = coarsest).
    pub level: usize,
    /// 0-based index within the level.
    pub index: usize,
    /// Shallow boundary of the section.
    pub depth_top: f64,
    /// Deep boundary of the section.
    pub depth_bottom: f64,
    /// Arena index of the parent node (`None` for roots).
    pub parent: Option<usize>,
    /// Arena range of the children at the next finer level.
    pub children: Range<usize>,
}

impl SectionNode {
    /// Thickness of the section in depth units (`depth_bottom - depth_top`).
    #[inline]
    pub fn thickness(&self) -> f64 {
        self.depth_bottom - self.depth_top
    }

    /// Whether this node sits at the finest level (no children).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this node is a level-0 root (no parent).
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The trivial accessors on SectionNode (thickness, leaf/root flags).
    //
    // They intentionally DO NOT cover:
    // - Arena construction and tiling invariants, which are exercised in
    //   `hierarchy::builder` where nodes are produced.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `thickness`, `is_leaf`, and `is_root` report the values
    // implied by the node's fields.
    //
    // Given
    // -----
    // - A root node spanning [0, 2] with children 1..3.
    // - A leaf node spanning [1, 2] with an empty child range.
    //
    // Expect
    // ------
    // - thickness is 2.0 and 1.0 respectively.
    // - The root is a root and not a leaf; the leaf is a leaf and not a root.
    fn section_node_accessors_match_fields() {
        // Arrange
        let root = SectionNode {
            level: 0,
            index: 0,
            depth_top: 0.0,
            depth_bottom: 2.0,
            parent: None,
            children: 1..3,
        };
        let leaf = SectionNode {
            level: 1,
            index: 1,
            depth_top: 1.0,
            depth_bottom: 2.0,
            parent: Some(0),
            children: 0..0,
        };

        // Act & Assert
        assert_eq!(root.thickness(), 2.0);
        assert_eq!(leaf.thickness(), 1.0);
        assert!(root.is_root() && !root.is_leaf());
        assert!(leaf.is_leaf() && !leaf.is_root());
    }
}
