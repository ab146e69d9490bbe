//! Error surface.
//!
//! Verification failures carry an internal kind so debug builds can say what
//! went wrong, but the public API collapses every kind into one opaque
//! rejection: a verifier must not tell the forger *why*.

use picnic3_core::ParamError;
use thiserror::Error;

/// Public error type of the caller surface.
#[derive(Debug, Error)]
pub enum Error {
    /// The signature was rejected. All verification failure modes collapse
    /// into this one variant.
    #[error("invalid signature")]
    InvalidSignature,
    /// Signing hit an internal inconsistency (a bug, not an input property).
    #[error("signing failed")]
    SigningFailed,
    /// A key, plaintext, or signature buffer has the wrong length for the
    /// parameter set.
    #[error("input has the wrong length for the parameter set")]
    InputLength,
    /// The parameter bundle violates a protocol invariant.
    #[error("invalid parameters")]
    InvalidParameters(#[from] ParamError),
}

/// Internal verification failure taxonomy.
#[derive(Debug, Error)]
pub(crate) enum VerifyError {
    #[error("signature length mismatch")]
    MalformedSize,
    #[error("nonzero padding bits")]
    MalformedPadding,
    #[error("seed-tree opening failed")]
    MalformedSeedOpening,
    #[error("online simulation rejected")]
    SimulationFail,
    #[error("merkle opening mismatch")]
    MerkleFail,
    #[error("recomputed challenge differs")]
    ChallengeMismatch,
}

/// Collapse an internal kind into the public rejection.
///
/// Debug builds log the kind; release builds must not distinguish them.
pub(crate) fn reject(kind: VerifyError) -> Error {
    #[cfg(debug_assertions)]
    tracing::debug!("rejecting signature: {kind}");
    let _ = kind;
    Error::InvalidSignature
}
