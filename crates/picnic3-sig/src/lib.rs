// crates/picnic3-sig/src/lib.rs

//! Picnic3 signing and verification.
//!
//! The scheme proves knowledge of a LowMC key with MPC-in-the-Head plus
//! pre-processing, made non-interactive via Fiat–Shamir. A signature runs
//! `T` independent MPC repetitions; the challenge opens `τ` of them and
//! withholds one party per opened repetition. The pipeline per repetition:
//! seed-tree expansion into party tapes, an offline phase fixing the
//! multiplication masks, an online simulation producing broadcast
//! transcripts, two-level commitments hashed into a Merkle tree, challenge
//! expansion into the opened-round and unopened-party lists, selective
//! reveal, and a bit-exact wire encoding.
//!
//! Entry point: [`Picnic3`].

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

mod api;
mod challenge;
mod commit;
mod error;
mod sign;
mod tape;
mod types;
mod verify;
mod wire;

pub use api::Picnic3;
pub use error::Error;

// Re-export the parameter surface so callers need only this crate.
pub use picnic3_core::{ParamSet, Params, PICNIC3_L1, PICNIC3_L3, PICNIC3_L5};
