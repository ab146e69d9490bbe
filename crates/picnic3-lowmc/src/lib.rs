// crates/picnic3-lowmc/src/lib.rs

//! LowMC, as Picnic3 consumes it.
//!
//! Three views of the same cipher live here:
//!
//! - [`eval::encrypt`]: the plain block cipher (public keys are ciphertexts
//!   of the public plaintext under the private key);
//! - [`mpc::compute_aux`]: the offline phase that fixes the last party's
//!   multiplication-gate helper bits so the mask invariant holds;
//! - [`mpc::simulate_online`]: the online phase that replays the masked
//!   evaluation and produces every party's broadcast transcript.
//!
//! The round matrices and constants are derived deterministically from a
//! SHAKE stream per shape (see [`instance::LowmcInstance::derive`]); linear
//! layers are rejection-sampled to be invertible, as the cipher requires.

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

pub mod eval;
pub mod gf2;
pub mod instance;
pub mod mpc;

pub use eval::encrypt;
pub use gf2::{BitMatrix, BitVec};
pub use instance::LowmcInstance;
pub use mpc::{compute_aux, simulate_online, SimulationError};
