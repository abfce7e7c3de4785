//! Canonical minimizer index and coverage-driven path-cover construction
//! for bidirected sequence graphs.
//!
//! The crate has two halves that share only the kmer/canonical-key
//! machinery:
//!
//! - [`index`] stores `minimizer -> {graph position}` mappings in an
//!   open-addressing hash table with a compact single/multi-value cell
//!   encoding.
//! - [`path_cover`] walks a [`graph::HandleGraph`] and greedily builds a
//!   small set of paths that cover every node and every k-window of
//!   consecutive nodes as evenly as possible.
//!
//! Both the underlying path-compressed sequence index and the bidirected
//! graph itself are external collaborators: this crate only produces the
//! minimizer positions and the paths, it does not store sequences.

/* mod declaration */
pub mod canonical;
pub mod error;
pub mod graph;
pub mod index;
pub mod kmer;
pub mod minimizer;
pub mod path_cover;
pub mod position;

/* public use */
pub use error::GraphIndexError;
pub use index::{MinimizerIndex, MinimizerIndexParams};
pub use minimizer::{Minimizer, MinimizerIter};
pub use path_cover::{generic_path_cover, try_generic_path_cover, PathCoverParams};
pub use position::GraphPosition;

#[cfg(test)]
extern crate quickcheck;

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
