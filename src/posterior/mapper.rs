//! posterior::mapper — joining flat sampler output onto hierarchy nodes.
//!
//! Purpose
//! -------
//! Map the sampler's flat parameter vector — one overall-mean accumulation
//! rate followed by one multiplier per non-root node, ordered level-major
//! then index-within-level — onto the geometric hierarchy. The resulting
//! [`ParamLayout`] reports, for every node, its `(level, index,
//! parent_index)` triple and flat parameter position, and precomputes the
//! root-to-leaf multiplier chains used to turn draws into finest-level
//! absolute accumulation rates.
//!
//! Key behaviors
//! -------------
//! - Derive parameter positions directly from the arena's level-major order:
//!   position 0 is the overall mean; non-root node `n` sits at
//!   `1 + (arena index of n − root count)`.
//! - Precompute, per finest section, the positions of every multiplier on
//!   the path from its level-1 ancestor down to the leaf.
//! - Validate flat-vector lengths against the hierarchy's expected count,
//!   failing with [`PosteriorError::ParamLengthMismatch`] on disagreement.
//!
//! Invariants & assumptions
//! ------------------------
//! - The hierarchy is immutable, so the layout built from it never goes
//!   stale; `ParamLayout` borrows nothing and may outlive the hierarchy.
//! - Level-0 roots carry no multiplier; a single-level hierarchy therefore
//!   has empty chains and finest rates equal to the overall mean.
//!
//! Conventions
//! -----------
//! - Positions index the full flat vector (mean at 0, multipliers from 1);
//!   matrices that store only multipliers use column `position − 1`.
//!
//! Downstream usage
//! ----------------
//! - `posterior::ensemble` calls [`ParamLayout::finest_rates`] per draw when
//!   deriving the finest-level rate matrix; per-level rate reporting joins
//!   [`ParamLayout::entries`] back onto node geometry.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the level-major position assignment on the K = [2, 2]
//!   reference hierarchy, verify ancestor chains and rate products, and
//!   exercise the length-mismatch error branch.
use crate::hierarchy::SectionHierarchy;
use crate::posterior::errors::{PosteriorError, PosteriorResult};

/// NodeParam — one hierarchy node joined to its flat parameter position.
///
/// Purpose
/// -------
/// Report where a node's accumulation-rate multiplier lives in the sampler's
/// flat parameter vector, alongside the node's position in the hierarchy,
/// for per-level rate reporting and debugging of sampler output.
///
/// Fields
/// ------
/// - `level`: `usize`
///   Hierarchy level of the node (0 = coarsest).
/// - `index`: `usize`
///   0-based index within the level.
/// - `parent_index`: `Option<usize>`
///   The parent's index within its own level; `None` for level-0 roots.
/// - `position`: `Option<usize>`
///   Flat parameter position of this node's multiplier; `None` for roots
///   (which carry no multiplier). Position 0 is reserved for the overall
///   mean, so node positions start at 1.
///
/// Invariants
/// ----------
/// - `parent_index.is_none()` and `position.is_none()` exactly when
///   `level == 0`.
/// - Positions are level-major then index-within-level, contiguous from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeParam {
    /// Hierarchy level (0 = coarsest).
    pub level: usize,
    /// 0-based index within the level.
    pub index: usize,
    /// Parent's index within its level (`None` for roots).
    pub parent_index: Option<usize>,
    /// Flat parameter position of the node's multiplier (`None` for roots).
    pub position: Option<usize>,
}

/// ParamLayout — the hierarchy's view of the flat parameter vector.
///
/// Purpose
/// -------
/// Precompute everything needed to consume sampler output against a given
/// [`SectionHierarchy`]: per-node parameter positions, the expected flat
/// vector length, and per-leaf multiplier chains for absolute-rate
/// reconstruction.
///
/// Key behaviors
/// -------------
/// - Built once per hierarchy via [`ParamLayout::new`]; pure and immutable.
/// - [`ParamLayout::finest_rates`] turns one validated flat draw into the
///   `N` finest-level absolute accumulation rates (overall mean × the chain
///   of multipliers from root to leaf).
/// - [`ParamLayout::check_len`] is the single place the flat-vector length
///   contract is enforced.
///
/// Fields
/// ------
/// - `entries`: `Vec<NodeParam>`
///   One entry per node, aligned with the hierarchy's arena order.
/// - `leaf_chains`: `Vec<Vec<usize>>`
///   For each finest section, the flat positions of the multipliers on its
///   ancestor path (levels 1 through the finest level, leaf last).
/// - `expected_len`: `usize`
///   Non-root node count plus one.
///
/// Invariants
/// ----------
/// - `entries.len()` equals the hierarchy's total node count.
/// - Every chain has length `n_levels − 1` (empty for single-level
///   hierarchies).
///
/// Performance
/// -----------
/// - Construction is O(total nodes + N·L); `finest_rates` is O(N·L) per
///   draw with no allocation beyond the output vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamLayout {
    entries: Vec<NodeParam>,
    leaf_chains: Vec<Vec<usize>>,
    expected_len: usize,
}

impl ParamLayout {
    /// Build the parameter layout for a hierarchy.
    ///
    /// Parameters
    /// ----------
    /// - `hierarchy`: `&SectionHierarchy`
    ///   The section hierarchy whose arena order defines the flat layout.
    ///
    /// Returns
    /// -------
    /// `ParamLayout`
    ///   Per-node positions and per-leaf multiplier chains. Construction
    ///   cannot fail: any hierarchy is mappable, and length checks happen
    ///   when a concrete vector arrives.
    ///
    /// Notes
    /// -----
    /// - The level-major position rule falls directly out of the arena
    ///   layout: non-root node positions are the arena order shifted past
    ///   the roots and the leading overall-mean slot.
    pub fn new(hierarchy: &SectionHierarchy) -> Self {
        let n_roots = hierarchy.sections_at(0);
        let nodes = hierarchy.nodes();

        let entries: Vec<NodeParam> = nodes
            .iter()
            .enumerate()
            .map(|(arena_idx, node)| NodeParam {
                level: node.level,
                index: node.index,
                parent_index: node.parent.map(|p| nodes[p].index),
                position: if node.level == 0 { None } else { Some(1 + arena_idx - n_roots) },
            })
            .collect();

        let finest_level = hierarchy.n_levels() - 1;
        let leaf_chains: Vec<Vec<usize>> = hierarchy
            .level_nodes(finest_level)
            .iter()
            .map(|leaf| {
                let mut chain: Vec<usize> = Vec::with_capacity(finest_level);
                let mut arena_idx = hierarchy
                    .arena_index(leaf.level, leaf.index)
                    .expect("finest-level node is in range by construction");
                loop {
                    let node = &nodes[arena_idx];
                    if node.level == 0 {
                        break;
                    }
                    chain.push(
                        entries[arena_idx].position.expect("non-root node has a position"),
                    );
                    arena_idx = node.parent.expect("non-root node has a parent");
                }
                chain.reverse();
                chain
            })
            .collect();

        let expected_len = hierarchy.expected_param_len();
        ParamLayout { entries, leaf_chains, expected_len }
    }

    /// One [`NodeParam`] per node, aligned with the hierarchy's arena order.
    #[inline]
    pub fn entries(&self) -> &[NodeParam] {
        &self.entries
    }

    /// Expected flat parameter vector length (non-root count + 1).
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Per-leaf multiplier position chains, root-to-leaf order.
    #[inline]
    pub fn leaf_chains(&self) -> &[Vec<usize>] {
        &self.leaf_chains
    }

    /// Enforce the flat-vector length contract.
    ///
    /// Errors
    /// ------
    /// - `PosteriorError::ParamLengthMismatch { expected, actual }`
    ///   Returned when `actual != expected_len()`. Fatal: signals an
    ///   upstream disagreement between sampler output and hierarchy
    ///   definition.
    #[inline]
    pub fn check_len(&self, actual: usize) -> PosteriorResult<()> {
        if actual != self.expected_len {
            return Err(PosteriorError::ParamLengthMismatch {
                expected: self.expected_len,
                actual,
            });
        }
        Ok(())
    }

    /// Compute finest-level absolute accumulation rates for one flat draw.
    ///
    /// Parameters
    /// ----------
    /// - `params`: `&[f64]`
    ///   One flat posterior draw: `[overall_mean, multipliers...]`, ordered
    ///   level-major then index-within-level. Length must equal
    ///   [`Self::expected_len`].
    ///
    /// Returns
    /// -------
    /// `PosteriorResult<Vec<f64>>`
    ///   - `Ok(rates)` with one absolute rate per finest section:
    ///     `overall_mean × Π(multipliers on the root-to-leaf path)`.
    ///   - `Err(PosteriorError::ParamLengthMismatch)` on a length
    ///     disagreement.
    ///
    /// Errors
    /// ------
    /// - `PosteriorError::ParamLengthMismatch { .. }`
    ///   See [`Self::check_len`].
    ///
    /// Panics
    /// ------
    /// - Never panics for validated lengths; positions are in range by
    ///   construction.
    ///
    /// Notes
    /// -----
    /// - Value-level validation (finiteness, positivity) is performed by the
    ///   ensemble constructors, not here; this function is the pure
    ///   geometric join.
    pub fn finest_rates(&self, params: &[f64]) -> PosteriorResult<Vec<f64>> {
        self.check_len(params.len())?;
        let overall = params[0];
        Ok(self
            .leaf_chains
            .iter()
            .map(|chain| chain.iter().fold(overall, |rate, &pos| rate * params[pos]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::SectionHierarchy;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Level-major position assignment on the K = [2, 2] reference
    //   hierarchy, including parent_index triples.
    // - Root-to-leaf multiplier chains and the absolute-rate product.
    // - The ParamLengthMismatch branch for short and long vectors.
    // - The single-level degenerate case (no multipliers).
    //
    // They intentionally DO NOT cover:
    // - Value-level validation of draws (ensemble tests) or end-to-end age
    //   reconstruction (integration pipeline test).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Pin the flat layout for K = [2, 2]: roots have no position, level-1
    // nodes occupy positions 1..=4 in index order, and parent_index points
    // at the parent's within-level index.
    //
    // Given
    // -----
    // - The K = [2, 2] hierarchy over [0, 4] (2 roots, 4 leaves).
    //
    // Expect
    // ------
    // - Entries 0..2 (roots): position None, parent_index None.
    // - Entries 2..6 (leaves): positions Some(1..=4), parent_index 0,0,1,1.
    fn param_layout_positions_follow_level_major_order() {
        // Arrange
        let h = SectionHierarchy::with_branching(0.0, 4.0, &[2, 2]).unwrap();

        // Act
        let layout = ParamLayout::new(&h);

        // Assert
        assert_eq!(layout.expected_len(), 5);
        let entries = layout.entries();
        assert_eq!(entries.len(), 6);
        for root in &entries[..2] {
            assert_eq!(root.level, 0);
            assert_eq!(root.position, None);
            assert_eq!(root.parent_index, None);
        }
        let expected = [(0, Some(1), Some(0)), (1, Some(2), Some(0)), (2, Some(3), Some(1)), (3, Some(4), Some(1))];
        for (entry, (index, position, parent)) in entries[2..].iter().zip(expected) {
            assert_eq!(entry.level, 1);
            assert_eq!(entry.index, index);
            assert_eq!(entry.position, position);
            assert_eq!(entry.parent_index, parent);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify root-to-leaf chains and the finest-rate product on a 3-level
    // hierarchy, where each leaf rate multiplies the overall mean by its
    // level-1 ancestor's multiplier and its own.
    //
    // Given
    // -----
    // - K = [2, 2, 2] over [0, 8] (2 + 4 + 8 nodes, 12 non-root).
    // - A flat vector with overall mean 2.0, level-1 multipliers
    //   [1.0, 3.0, ...] and distinct leaf multipliers.
    //
    // Expect
    // ------
    // - Each chain has length 2 (levels 1 and 2).
    // - Leaf 0's rate is mean × m(level1, 0) × m(level2, 0); leaf 7's rate is
    //   mean × m(level1, 3) × m(level2, 7).
    fn param_layout_finest_rates_multiply_ancestor_chain() {
        // Arrange
        let h = SectionHierarchy::with_branching(0.0, 8.0, &[2, 2, 2]).unwrap();
        let layout = ParamLayout::new(&h);
        // positions: 1..=4 level 1, 5..=12 level 2
        let mut params = vec![1.0; 13];
        params[0] = 2.0; // overall mean
        params[1] = 1.5; // level-1 node 0
        params[4] = 3.0; // level-1 node 3
        params[5] = 0.5; // leaf 0
        params[12] = 4.0; // leaf 7

        // Act
        let rates = layout.finest_rates(&params).expect("length matches");

        // Assert
        assert_eq!(layout.leaf_chains().len(), 8);
        assert!(layout.leaf_chains().iter().all(|c| c.len() == 2));
        assert_eq!(rates.len(), 8);
        assert!((rates[0] - 2.0 * 1.5 * 0.5).abs() < 1e-12);
        assert!((rates[7] - 2.0 * 3.0 * 4.0).abs() < 1e-12);
        // A leaf with all-unit multipliers reduces to the overall mean.
        assert!((rates[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that flat vectors of the wrong length are rejected with
    // ParamLengthMismatch carrying both lengths.
    //
    // Given
    // -----
    // - The K = [2, 2] layout (expected length 5) and vectors of length 4
    //   and 6.
    //
    // Expect
    // ------
    // - Both calls fail with ParamLengthMismatch { expected: 5, actual }.
    fn param_layout_rejects_wrong_vector_length() {
        // Arrange
        let h = SectionHierarchy::with_branching(0.0, 4.0, &[2, 2]).unwrap();
        let layout = ParamLayout::new(&h);

        // Act & Assert
        for len in [4usize, 6] {
            match layout.finest_rates(&vec![1.0; len]) {
                Err(PosteriorError::ParamLengthMismatch { expected, actual }) => {
                    assert_eq!(expected, 5);
                    assert_eq!(actual, len);
                }
                other => panic!("expected ParamLengthMismatch, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Check the single-level degenerate case: all nodes are roots, chains
    // are empty, and finest rates equal the overall mean alone.
    //
    // Given
    // -----
    // - K = [3] over [0, 3]; flat vector [2.5] (mean only).
    //
    // Expect
    // ------
    // - expected_len is 1; every finest rate equals 2.5.
    fn param_layout_single_level_hierarchy_uses_mean_only() {
        // Arrange
        let h = SectionHierarchy::with_branching(0.0, 3.0, &[3]).unwrap();
        let layout = ParamLayout::new(&h);

        // Act
        let rates = layout.finest_rates(&[2.5]).expect("length matches");

        // Assert
        assert_eq!(layout.expected_len(), 1);
        assert!(layout.leaf_chains().iter().all(|c| c.is_empty()));
        assert_eq!(rates, vec![2.5, 2.5, 2.5]);
    }
}
