//! posterior — sampler output: ensembles, parameter mapping, and errors.
//!
//! Purpose
//! -------
//! Bridge the out-of-scope sampling engine and the geometric hierarchy.
//! The sampler returns opaque numeric arrays (overall mean rate, per-node
//! multipliers, memory parameter, chain ids); this module validates them
//! once, joins them onto hierarchy nodes, and derives the finest-level
//! absolute accumulation rates the age model consumes.
//!
//! Key behaviors
//! -------------
//! - [`ParamLayout`] maps the flat, level-major parameter vector onto
//!   `(level, index, parent_index)` triples and precomputes root-to-leaf
//!   multiplier chains.
//! - [`PosteriorEnsemble`] holds the validated draw matrices plus chain
//!   metadata and the derived rate matrix, immutable after construction.
//! - [`PosteriorError`] covers the sampler ↔ hierarchy contract: length
//!   mismatches are fatal and abort with no partial output.
//!
//! Invariants & assumptions
//! ------------------------
//! - Draws are independent samples and are never reordered relative to
//!   their chain metadata.
//! - Rate parameters are strictly positive; the memory parameter lies in
//!   `[0, 1]`; chains are equal-length.
//!
//! Downstream usage
//! ----------------
//! - `agemodel::model` combines an ensemble with its hierarchy into an
//!   immutable fit result for prediction and summarization.
//!
//! Testing notes
//! -------------
//! - `mapper` tests pin the flat layout and rate products; `ensemble` tests
//!   cover ingestion and every validation branch.

pub mod ensemble;
pub mod errors;
pub mod mapper;

pub use self::ensemble::PosteriorEnsemble;
pub use self::errors::{PosteriorError, PosteriorResult};
pub use self::mapper::{NodeParam, ParamLayout};
