// crates/picnic3-tree/src/lib.rs

//! Tree primitives for selective reveal.
//!
//! Two trees share one heap-array layout (children of `i` at `2i+1`/`2i+2`,
//! all leaves on the last level):
//!
//! - [`SeedTree`]: a GGM-style PRG tree. Revealing the complement of a few
//!   leaves costs a logarithmic number of inner seeds.
//! - [`MerkleTree`]: a salted hash tree over commitment digests, with
//!   openings that let a verifier holding a *subset* of the leaves recompute
//!   the root.
//!
//! Opening sizes are pure functions of the tree geometry and the hidden /
//! missing index lists, so decoders can pre-compute every length without
//! trusting the wire.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod merkle;
mod seed;
mod shape;

pub use merkle::MerkleTree;
pub use seed::SeedTree;

use thiserror::Error;

/// Structural failure while consuming tree data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A hide/missing list entry points past the last leaf.
    #[error("hide list contains an out-of-range leaf index")]
    BadLeafIndex,
    /// The opening blob does not have the exact computed length.
    #[error("opening data has the wrong length")]
    OpeningSize,
    /// A node was provided twice (or collides with a computed node).
    #[error("tree node already present")]
    NodeConflict,
    /// The provided nodes do not suffice to reach the root.
    #[error("tree cannot be completed from the provided nodes")]
    Incomplete,
}
