//! Parameter sets for the Picnic3 instances.
//!
//! A [`Params`] bundle fixes everything the protocol needs: digest and seed
//! widths, the MPC geometry (parties, rounds, opened rounds) and the LowMC
//! shape `(n, m, r)` with a full S-box layer (`n == 3·m`). The three named
//! instances carry the Picnic3 parameter-table values; tests may build small
//! custom bundles as long as [`Params::validate`] accepts them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::bits::{ceil_log2, num_bytes};

/// Salt width in bytes, fixed across all parameter sets.
pub const SALT_SIZE: usize = 32;

/// One immutable parameter bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    /// Digest size `D` in bytes.
    pub digest_size: usize,
    /// Seed size `S` in bytes.
    pub seed_size: usize,
    /// Number of MPC parties `N` (multiple of 4, at most 64).
    pub num_parties: usize,
    /// Total MPC repetitions `T`.
    pub num_rounds: usize,
    /// Opened repetitions `τ` (strictly less than `T`).
    pub num_opened: usize,
    /// LowMC state/key width `n` in bits.
    pub state_bits: usize,
    /// LowMC S-boxes per round `m` (`n == 3·m`).
    pub sboxes: usize,
    /// LowMC rounds `r`.
    pub rounds: usize,
}

impl Params {
    /// Input/output byte width `⌈n/8⌉` (may carry zero padding bits).
    #[inline]
    #[must_use]
    pub const fn io_size(&self) -> usize {
        num_bytes(self.state_bits)
    }

    /// Per-party transcript width `⌈3·r·m/8⌉` in bytes.
    #[inline]
    #[must_use]
    pub const fn view_size(&self) -> usize {
        num_bytes(self.view_bits())
    }

    /// Semantic transcript width `3·r·m` in bits (one bit per AND gate).
    #[inline]
    #[must_use]
    pub const fn view_bits(&self) -> usize {
        3 * self.rounds * self.sboxes
    }

    /// Random-tape length `2·view_size` in bytes per party.
    #[inline]
    #[must_use]
    pub const fn tape_len(&self) -> usize {
        2 * self.view_size()
    }

    /// Check the joint invariants the protocol relies on.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.num_parties % 4 != 0 || self.num_parties == 0 {
            return Err(ParamError::Parties);
        }
        if self.num_parties > 64 {
            // Mask shares are tracked as one bit per party in a u64 word.
            return Err(ParamError::Parties);
        }
        if self.num_opened == 0 || self.num_opened >= self.num_rounds {
            return Err(ParamError::OpenedRounds);
        }
        if ceil_log2(self.num_rounds) < 4 || ceil_log2(self.num_parties) < 4 {
            return Err(ParamError::ChallengeChunks);
        }
        if self.state_bits != 3 * self.sboxes || self.rounds < 2 {
            return Err(ParamError::LowmcShape);
        }
        if self.digest_size == 0 || self.seed_size == 0 {
            return Err(ParamError::HashWidths);
        }
        // The seed/Merkle trees address nodes with u16 indices.
        if self.num_rounds > u16::MAX as usize / 2 {
            return Err(ParamError::OpenedRounds);
        }
        Ok(())
    }
}

/// Violated parameter invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("number of parties must be a positive multiple of 4, at most 64")]
    Parties,
    #[error("opened rounds must satisfy 0 < tau < T")]
    OpenedRounds,
    #[error("challenge expansion needs ceil(log2(T)) >= 4 and ceil(log2(N)) >= 4")]
    ChallengeChunks,
    #[error("LowMC shape must have a full S-box layer (n == 3m) and r >= 2")]
    LowmcShape,
    #[error("digest and seed sizes must be nonzero")]
    HashWidths,
}

/// picnic3-L1: 128-bit classical security.
pub const PICNIC3_L1: Params = Params {
    digest_size: 32,
    seed_size: 16,
    num_parties: 16,
    num_rounds: 250,
    num_opened: 36,
    state_bits: 129,
    sboxes: 43,
    rounds: 4,
};

/// picnic3-L3: 192-bit classical security.
pub const PICNIC3_L3: Params = Params {
    digest_size: 48,
    seed_size: 24,
    num_parties: 16,
    num_rounds: 419,
    num_opened: 52,
    state_bits: 192,
    sboxes: 64,
    rounds: 4,
};

/// picnic3-L5: 256-bit classical security.
pub const PICNIC3_L5: Params = Params {
    digest_size: 64,
    seed_size: 32,
    num_parties: 16,
    num_rounds: 601,
    num_opened: 68,
    state_bits: 255,
    sboxes: 85,
    rounds: 4,
};

/// Named Picnic3 instance selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamSet {
    /// picnic3-L1
    Picnic3L1,
    /// picnic3-L3
    Picnic3L3,
    /// picnic3-L5
    Picnic3L5,
}

impl ParamSet {
    /// The parameter bundle for this instance.
    #[must_use]
    pub const fn params(self) -> &'static Params {
        match self {
            Self::Picnic3L1 => &PICNIC3_L1,
            Self::Picnic3L3 => &PICNIC3_L3,
            Self::Picnic3L5 => &PICNIC3_L5,
        }
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Picnic3L1 => "picnic3-L1",
            Self::Picnic3L3 => "picnic3-L3",
            Self::Picnic3L5 => "picnic3-L5",
        };
        f.write_str(name)
    }
}
