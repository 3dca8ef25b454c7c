//! hierarchy — multi-resolution section index over a depth span.
//!
//! Purpose
//! -------
//! Provide the geometric backbone of the age-depth model: a nested,
//! immutable partition of `[depth_min, depth_max]` into levels of sections,
//! where each parent section subdivides into a fixed number of children at
//! the next finer level. Everything downstream (parameter mapping, age
//! reconstruction, summarization) is expressed against this index.
//!
//! Key behaviors
//! -------------
//! - Build hierarchies from an explicit branching vector `K` or from the
//!   auto-selection policy (≈ one depth unit per finest section, capped at
//!   900 sections) via [`SectionHierarchy`].
//! - Store all sections level-major in one arena of [`SectionNode`] records
//!   with integer parent links and contiguous child ranges.
//! - Expose the finest boundary grid, per-level boundary sequences, and the
//!   non-root node count that fixes the sampler's parameter vector length.
//!
//! Invariants & assumptions
//! ------------------------
//! - `K[i] ≥ 1` and `depth_max > depth_min`, enforced at construction via
//!   [`HierarchyError`].
//! - Section count at level `l` is `K[0]·…·K[l]`; finest sections tile the
//!   span contiguously with no gaps or overlaps, and coarser boundaries are
//!   shared with the finest grid bit-for-bit.
//! - Hierarchies are pure values: construction is deterministic and the
//!   result is immutable.
//!
//! Conventions
//! -----------
//! - Level 0 is the coarsest; its `K[0]` sections are the roots. Depth
//!   increases downward.
//!
//! Downstream usage
//! ----------------
//! - `posterior::mapper` joins flat sampler output onto the arena;
//!   `agemodel` reads the finest boundaries as its modelled depths and
//!   `hierarchy_depths` feeds external overlay rendering.
//!
//! Testing notes
//! -------------
//! - `builder` tests cover construction, validation, tiling invariants, and
//!   the auto policy; `nodes` and `errors` carry their own focused tests.

pub mod builder;
pub mod errors;
pub mod nodes;

pub use self::builder::{MAX_FINEST_SECTIONS, SectionHierarchy, TARGET_SECTION_THICKNESS};
pub use self::errors::{HierarchyError, HierarchyResult};
pub use self::nodes::SectionNode;
