//! Signature object and challenge index lists.

use picnic3_core::SALT_SIZE;

/// A decoded (or freshly produced) signature.
///
/// The object exclusively owns its heap slices; moving it across an API
/// boundary moves the openings with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Signature {
    /// Fiat–Shamir digest, `digest_size` bytes.
    pub challenge: Vec<u8>,
    /// Signing salt.
    pub salt: [u8; SALT_SIZE],
    /// Seed-tree opening for the initial seeds of the unopened rounds.
    pub iseed_info: Vec<u8>,
    /// Merkle opening covering the unopened rounds' view commitments.
    pub cv_info: Vec<u8>,
    /// One entry per round; `Some` exactly for opened rounds.
    pub proofs: Vec<Option<RoundProof>>,
}

/// Reveal data for one opened round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RoundProof {
    /// Per-round seed-tree opening hiding the unopened party.
    pub seed_info: Vec<u8>,
    /// Auxiliary bits; present iff the unopened party is not the last.
    pub aux: Option<Vec<u8>>,
    /// Masked key input, `io_size` bytes.
    pub input: Vec<u8>,
    /// The unopened party's broadcast transcript, `view_size` bytes.
    pub msgs: Vec<u8>,
    /// The unopened party's commitment digest.
    pub commitment: Vec<u8>,
    /// Index of the unopened party.
    pub unopened: u16,
}

/// The two expanded challenge lists.
///
/// `c` is a set (unique entries, insertion order = hash-chunk order); `p` is
/// a sequence indexed in lockstep with `c`, duplicates allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChallengeLists {
    /// Opened rounds, `num_opened` distinct values in `[0, T)`.
    pub c: Vec<u16>,
    /// Unopened party per opened round, `num_opened` values in `[0, N)`.
    pub p: Vec<u16>,
}

impl ChallengeLists {
    /// The unopened party for round `t`, or `None` when `t` is not opened.
    pub fn unopened_for(&self, t: u16) -> Option<u16> {
        self.c.iter().position(|&x| x == t).map(|i| self.p[i])
    }

    /// Rounds *not* opened, ascending: the Merkle leaves a verifier cannot
    /// recompute.
    pub fn missing_rounds(&self, num_rounds: usize) -> Vec<u16> {
        (0..num_rounds as u16)
            .filter(|t| !self.c.contains(t))
            .collect()
    }
}
