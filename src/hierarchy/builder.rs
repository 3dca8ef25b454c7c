//! hierarchy::builder — construction of the multi-resolution section index.
//!
//! Purpose
//! -------
//! Build [`SectionHierarchy`] values: partition a depth span `[depth_min,
//! depth_max]` into nested levels of sections, where each section at level
//! `l` subdivides into `K[l + 1]` children at level `l + 1`. Supports both an
//! explicit branching vector and an auto-selection policy targeting roughly
//! one depth unit per finest section, capped at 900 finest sections.
//!
//! Key behaviors
//! -------------
//! - Validate branching factors and depth bounds up front, returning
//!   [`HierarchyError`] on any configuration problem.
//! - Lay out all nodes level-major in a single arena with integer
//!   parent/child links (see `hierarchy::nodes`).
//! - Derive every section boundary from the shared finest-resolution grid so
//!   that parent intervals equal the union of their children exactly.
//! - Choose the number of levels and a common branching factor automatically
//!   when no `K` is supplied, balancing hierarchy depth against breadth.
//!
//! Invariants & assumptions
//! ------------------------
//! - `K[i] ≥ 1` for all levels; `depth_max > depth_min`; both bounds finite.
//! - Section count at level `l` equals `K[0]·…·K[l]`; the finest level has
//!   `N = product(K)` equal-width sections tiling the span contiguously.
//! - Construction is pure and deterministic; the hierarchy is immutable once
//!   built.
//!
//! Conventions
//! -----------
//! - Level 0 is the coarsest level and its sections are the roots (plural —
//!   there are `K[0]` of them); the finest level is `K.len() - 1`.
//! - Finest boundary `j` sits at `depth_min + j · span / N`, with the last
//!   boundary pinned to `depth_max` exactly.
//!
//! Downstream usage
//! ----------------
//! - The parameter mapper (`posterior::mapper`) joins sampler output onto the
//!   arena produced here; the age model reads the finest boundaries as its
//!   modelled depths.
//! - Plotting layers consume [`SectionHierarchy::hierarchy_depths`] for
//!   per-level tick marks and overlays.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the explicit-K happy path (including the K = [2, 2]
//!   reference layout over [0, 4]), configuration error branches, exact
//!   parent/child tiling, thickness totals, and the auto-selection policy
//!   (balance preference and the 900-section cap).
use crate::hierarchy::errors::{HierarchyError, HierarchyResult};
use crate::hierarchy::nodes::SectionNode;

/// Hard cap on the number of finest-level sections chosen by the
/// auto-selection policy.
pub const MAX_FINEST_SECTIONS: usize = 900;

/// Target finest-section thickness (depth units) for the auto policy.
pub const TARGET_SECTION_THICKNESS: f64 = 1.0;

/// Deepest hierarchy the auto policy will consider.
const MAX_AUTO_LEVELS: usize = 8;

/// SectionHierarchy — immutable nested section index over a depth span.
///
/// Purpose
/// -------
/// Represent a hierarchical multi-resolution discretization of
/// `[depth_min, depth_max]`: an ordered sequence of levels `0..L-1`
/// (0 = coarsest), a branching vector `K` with one factor per level, and an
/// arena of [`SectionNode`] records laid out level-major with integer
/// parent/child links.
///
/// Key behaviors
/// -------------
/// - Built once via [`SectionHierarchy::with_branching`] or
///   [`SectionHierarchy::auto`]; immutable thereafter.
/// - Exposes the finest-resolution boundary grid shared by all age
///   realizations, per-level boundary sequences, and O(1) node lookup by
///   `(level, index)` or arena index.
/// - Reports the non-root node count that fixes the sampler's flat parameter
///   vector length (one overall mean plus one multiplier per non-root node).
///
/// Fields
/// ------
/// - `branching`: `Vec<usize>`
///   The branching vector `K`; `branching.len()` is the number of levels.
/// - `depth_min`, `depth_max`: `f64`
///   The modelled depth span.
/// - `finest_boundaries`: `Vec<f64>`
///   `N + 1` boundary depths of the finest level, strictly increasing.
/// - `nodes`: `Vec<SectionNode>`
///   All sections across all levels, level-major.
/// - `level_offsets`: `Vec<usize>`
///   `L + 1` arena offsets; level `l` occupies
///   `level_offsets[l]..level_offsets[l + 1]`.
///
/// Invariants
/// ----------
/// - Section count at level `l` equals `K[0]·…·K[l]`.
/// - Every non-finest node has exactly `K[level + 1]` children whose depth
///   intervals tile the parent's interval exactly (boundaries are shared
///   with the finest grid, so no gaps or overlaps, bit-for-bit).
/// - `finest_boundaries[0] == depth_min` and
///   `finest_boundaries[N] == depth_max` exactly.
///
/// Performance
/// -----------
/// - Construction is O(total node count); all lookups are O(1).
/// - The arena holds one allocation for nodes and one for boundaries; nodes
///   store child links as ranges and allocate nothing per node.
///
/// Notes
/// -----
/// - The arena layout replaces the original system's recovery of parent
///   links by parsing flat parameter names; ancestor traversal for rate
///   reconstruction is a chain of integer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionHierarchy {
    branching: Vec<usize>,
    depth_min: f64,
    depth_max: f64,
    finest_boundaries: Vec<f64>,
    nodes: Vec<SectionNode>,
    level_offsets: Vec<usize>,
}

impl SectionHierarchy {
    /// Build a hierarchy from an explicit branching vector.
    ///
    /// Parameters
    /// ----------
    /// - `depth_min`: `f64`
    ///   Shallow end of the modelled span; must be finite.
    /// - `depth_max`: `f64`
    ///   Deep end of the modelled span; must be finite and strictly greater
    ///   than `depth_min`.
    /// - `branching`: `&[usize]`
    ///   Branching vector `K`, one factor per level; non-empty with every
    ///   entry ≥ 1.
    ///
    /// Returns
    /// -------
    /// `HierarchyResult<SectionHierarchy>`
    ///   - `Ok(hierarchy)` when all configuration constraints hold.
    ///   - `Err(HierarchyError)` otherwise.
    ///
    /// Errors
    /// ------
    /// - `HierarchyError::EmptyBranching`
    ///   Returned when `branching` is empty.
    /// - `HierarchyError::ZeroBranching { level }`
    ///   Returned when `branching[level] == 0`.
    /// - `HierarchyError::NonFiniteDepth { value }`
    ///   Returned when either depth bound is NaN or ±∞.
    /// - `HierarchyError::InvalidDepthSpan { .. }`
    ///   Returned when `depth_max ≤ depth_min`.
    ///
    /// Panics
    /// ------
    /// - Never panics; all invalid configurations are reported as errors.
    ///
    /// Notes
    /// -----
    /// - Finest boundaries are computed directly as
    ///   `depth_min + j · span / N` (not cumulatively), with the last
    ///   boundary pinned to `depth_max`, so coarser levels that reuse the
    ///   grid tile the span exactly.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// use rust_agedepth::hierarchy::SectionHierarchy;
    ///
    /// let h = SectionHierarchy::with_branching(0.0, 4.0, &[2, 2]).unwrap();
    /// assert_eq!(h.n_sections(), 4);
    /// assert_eq!(h.sections_at(0), 2);
    /// assert_eq!(h.finest_boundaries(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    /// ```
    pub fn with_branching(
        depth_min: f64, depth_max: f64, branching: &[usize],
    ) -> HierarchyResult<Self> {
        validate_config(depth_min, depth_max, branching)?;

        let n_levels = branching.len();

        // Cumulative section counts per level: counts[l] = K[0]·…·K[l].
        let mut counts: Vec<usize> = Vec::with_capacity(n_levels);
        let mut running = 1usize;
        for &k in branching {
            running *= k;
            counts.push(running);
        }
        let n_finest = running;

        let span = depth_max - depth_min;
        let mut finest_boundaries: Vec<f64> = (0..=n_finest)
            .map(|j| depth_min + (j as f64) * span / (n_finest as f64))
            .collect();
        finest_boundaries[0] = depth_min;
        finest_boundaries[n_finest] = depth_max;

        let mut level_offsets: Vec<usize> = Vec::with_capacity(n_levels + 1);
        level_offsets.push(0);
        for &count in &counts {
            level_offsets.push(level_offsets.last().copied().unwrap_or(0) + count);
        }

        let mut nodes: Vec<SectionNode> = Vec::with_capacity(level_offsets[n_levels]);
        for level in 0..n_levels {
            // Finest sections covered by one node at this level.
            let group = n_finest / counts[level];
            for index in 0..counts[level] {
                let parent = if level == 0 {
                    None
                } else {
                    Some(level_offsets[level - 1] + index / branching[level])
                };
                let children = if level + 1 < n_levels {
                    let k_child = branching[level + 1];
                    let start = level_offsets[level + 1] + index * k_child;
                    start..start + k_child
                } else {
                    0..0
                };
                nodes.push(SectionNode {
                    level,
                    index,
                    depth_top: finest_boundaries[index * group],
                    depth_bottom: finest_boundaries[(index + 1) * group],
                    parent,
                    children,
                });
            }
        }

        Ok(SectionHierarchy {
            branching: branching.to_vec(),
            depth_min,
            depth_max,
            finest_boundaries,
            nodes,
            level_offsets,
        })
    }

    /// Build a hierarchy with an automatically selected branching vector.
    ///
    /// Parameters
    /// ----------
    /// - `depth_min`, `depth_max`: `f64`
    ///   The modelled depth span; same constraints as
    ///   [`SectionHierarchy::with_branching`].
    ///
    /// Returns
    /// -------
    /// `HierarchyResult<SectionHierarchy>`
    ///   A hierarchy whose finest resolution approximates
    ///   [`TARGET_SECTION_THICKNESS`] (one depth unit per section), capped at
    ///   [`MAX_FINEST_SECTIONS`] sections, using a common per-level branching
    ///   factor chosen to balance depth against breadth.
    ///
    /// Errors
    /// ------
    /// - `HierarchyError::NonFiniteDepth { .. }` /
    ///   `HierarchyError::InvalidDepthSpan { .. }`
    ///   As for the explicit constructor.
    ///
    /// Notes
    /// -----
    /// - Selection rule: with target count
    ///   `N* = clamp(round(span), 1, 900)`, evaluate `L = 1..=8` with
    ///   `b = round(N*^(1/L))` (reduced while `b^L > 900`), and keep the
    ///   `(L, b)` minimizing `(|b^L − N*|, |b − L|, L)` lexicographically.
    ///   Matching the target count dominates; `|b − L|` then prefers a
    ///   4-level × branching-4 hierarchy over 2-level × branching-16.
    pub fn auto(depth_min: f64, depth_max: f64) -> HierarchyResult<Self> {
        validate_depths(depth_min, depth_max)?;
        let branching = choose_branching(depth_max - depth_min);
        Self::with_branching(depth_min, depth_max, &branching)
    }

    /// The branching vector `K`.
    #[inline]
    pub fn branching(&self) -> &[usize] {
        &self.branching
    }

    /// Number of hierarchy levels (`K.len()`).
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.branching.len()
    }

    /// Shallow end of the modelled span.
    #[inline]
    pub fn depth_min(&self) -> f64 {
        self.depth_min
    }

    /// Deep end of the modelled span.
    #[inline]
    pub fn depth_max(&self) -> f64 {
        self.depth_max
    }

    /// Total depth span (`depth_max - depth_min`).
    #[inline]
    pub fn span(&self) -> f64 {
        self.depth_max - self.depth_min
    }

    /// Number of finest-level sections (`product(K)`).
    #[inline]
    pub fn n_sections(&self) -> usize {
        self.finest_boundaries.len() - 1
    }

    /// Number of sections at a given level (`K[0]·…·K[level]`).
    ///
    /// Panics
    /// ------
    /// - Panics if `level >= n_levels()`; levels are a structural property
    ///   fixed at construction, so an out-of-range level is a programming
    ///   error rather than a recoverable condition.
    #[inline]
    pub fn sections_at(&self, level: usize) -> usize {
        self.level_offsets[level + 1] - self.level_offsets[level]
    }

    /// The `N + 1` finest-level boundary depths, strictly increasing.
    #[inline]
    pub fn finest_boundaries(&self) -> &[f64] {
        &self.finest_boundaries
    }

    /// All nodes, level-major.
    #[inline]
    pub fn nodes(&self) -> &[SectionNode] {
        &self.nodes
    }

    /// The nodes of one level as a contiguous slice.
    ///
    /// Panics
    /// ------
    /// - Panics if `level >= n_levels()` (see [`Self::sections_at`]).
    #[inline]
    pub fn level_nodes(&self, level: usize) -> &[SectionNode] {
        &self.nodes[self.level_offsets[level]..self.level_offsets[level + 1]]
    }

    /// Look up a node by `(level, index)`; `None` when out of range.
    pub fn node(&self, level: usize, index: usize) -> Option<&SectionNode> {
        if level >= self.n_levels() || index >= self.sections_at(level) {
            return None;
        }
        Some(&self.nodes[self.level_offsets[level] + index])
    }

    /// Arena index of node `(level, index)`; `None` when out of range.
    pub fn arena_index(&self, level: usize, index: usize) -> Option<usize> {
        if level >= self.n_levels() || index >= self.sections_at(level) {
            return None;
        }
        Some(self.level_offsets[level] + index)
    }

    /// Boundary depths of one level (section count + 1 entries).
    ///
    /// Boundaries are read off the shared finest grid, so coarser levels
    /// tile the span exactly.
    ///
    /// Panics
    /// ------
    /// - Panics if `level >= n_levels()` (see [`Self::sections_at`]).
    pub fn level_boundaries(&self, level: usize) -> Vec<f64> {
        let count = self.sections_at(level);
        let group = self.n_sections() / count;
        (0..=count).map(|i| self.finest_boundaries[i * group]).collect()
    }

    /// Per-level boundary depth sequences, coarsest first.
    ///
    /// This is the surface consumed by external tick-mark / overlay
    /// rendering.
    pub fn hierarchy_depths(&self) -> Vec<Vec<f64>> {
        (0..self.n_levels()).map(|level| self.level_boundaries(level)).collect()
    }

    /// Number of non-root nodes (all nodes at levels ≥ 1).
    ///
    /// One accumulation-rate multiplier is expected per non-root node.
    #[inline]
    pub fn non_root_count(&self) -> usize {
        self.nodes.len() - self.sections_at(0)
    }

    /// Expected length of the sampler's flat parameter vector: one overall
    /// mean followed by one multiplier per non-root node.
    #[inline]
    pub fn expected_param_len(&self) -> usize {
        self.non_root_count() + 1
    }

    /// Thicknesses of the finest-level sections, in depth order.
    pub fn section_thicknesses(&self) -> Vec<f64> {
        self.finest_boundaries.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// Validate depth bounds shared by both constructors.
fn validate_depths(depth_min: f64, depth_max: f64) -> HierarchyResult<()> {
    for value in [depth_min, depth_max] {
        if !value.is_finite() {
            return Err(HierarchyError::NonFiniteDepth { value });
        }
    }
    if depth_max <= depth_min {
        return Err(HierarchyError::InvalidDepthSpan { depth_min, depth_max });
    }
    Ok(())
}

/// Validate the full explicit configuration (depths plus branching vector).
fn validate_config(depth_min: f64, depth_max: f64, branching: &[usize]) -> HierarchyResult<()> {
    validate_depths(depth_min, depth_max)?;
    if branching.is_empty() {
        return Err(HierarchyError::EmptyBranching);
    }
    for (level, &k) in branching.iter().enumerate() {
        if k == 0 {
            return Err(HierarchyError::ZeroBranching { level });
        }
    }
    Ok(())
}

/// Choose a branching vector for a depth span under the auto policy.
///
/// Parameters
/// ----------
/// - `span`: `f64`
///   Positive depth span (`depth_max - depth_min`).
///
/// Returns
/// -------
/// `Vec<usize>`
///   `L` copies of a common branching factor `b`, per the rule documented on
///   [`SectionHierarchy::auto`].
///
/// Notes
/// -----
/// - Candidates are scored lexicographically by
///   `(|b^L − N*|, |b − L|, L)`; iterating `L` in ascending order with a
///   strict comparison keeps the shallowest hierarchy among exact ties.
fn choose_branching(span: f64) -> Vec<usize> {
    let natural = (span / TARGET_SECTION_THICKNESS).round() as i64;
    let target = natural.clamp(1, MAX_FINEST_SECTIONS as i64) as u64;

    let mut best: Option<(u64, u64, usize, usize)> = None;
    for n_levels in 1..=MAX_AUTO_LEVELS {
        let mut factor =
            ((target as f64).powf(1.0 / n_levels as f64).round() as u64).max(1);
        while factor > 1 && factor.pow(n_levels as u32) > MAX_FINEST_SECTIONS as u64 {
            factor -= 1;
        }
        let count = factor.pow(n_levels as u32);
        let score = (
            count.abs_diff(target),
            factor.abs_diff(n_levels as u64),
            n_levels,
            factor as usize,
        );
        match best {
            Some((d, b, l, _)) if (d, b, l) <= (score.0, score.1, score.2) => {}
            _ => best = Some(score),
        }
    }

    let (_, _, n_levels, factor) = best.expect("at least one candidate level count");
    vec![factor; n_levels]
}
