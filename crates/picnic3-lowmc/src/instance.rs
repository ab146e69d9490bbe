//! Deterministic LowMC instance derivation.
//!
//! Round-key matrices, linear layers, and round constants are expanded from
//! one SHAKE256 stream seeded with a fixed domain string and the cipher
//! shape. Matrices that the cipher requires to be invertible are
//! rejection-sampled from the stream; the inverse of the final linear layer
//! is kept because the offline phase needs it.

use picnic3_core::bits::num_bytes;
use picnic3_core::Params;
use picnic3_hash::{HashCtx, HashReader};

use crate::gf2::{BitMatrix, BitVec};

const INSTANCE_DOMAIN: &[u8] = b"picnic3-lowmc-instance-v1";

/// A fully expanded LowMC instance for one `(n, m, r)` shape.
#[derive(Clone, Debug)]
pub struct LowmcInstance {
    /// State/key width in bits.
    pub state_bits: usize,
    /// S-boxes per round (`state_bits == 3 * sboxes`).
    pub sboxes: usize,
    /// Number of rounds.
    pub rounds: usize,

    key_mats: Vec<BitMatrix>, // K_0 ..= K_r
    lin_mats: Vec<BitMatrix>, // L_1 ..= L_r, stored 0-indexed per round
    lin_last_inv: BitMatrix,
    consts: Vec<BitVec>, // C_1 ..= C_r, stored 0-indexed per round
}

impl LowmcInstance {
    /// Expand the instance for `params`' LowMC shape.
    #[must_use]
    pub fn derive(params: &Params) -> Self {
        let (n, m, r) = (params.state_bits, params.sboxes, params.rounds);
        debug_assert_eq!(n, 3 * m);

        let mut ctx = HashCtx::new(64);
        ctx.update(INSTANCE_DOMAIN);
        ctx.update_u16_le(n as u16);
        ctx.update_u16_le(m as u16);
        ctx.update_u16_le(r as u16);
        let mut rdr = ctx.finalize();

        let key_mats: Vec<BitMatrix> =
            (0..=r).map(|_| sample_invertible(&mut rdr, n).0).collect();
        let mut lin_mats = Vec::with_capacity(r);
        let mut lin_last_inv = BitMatrix::identity(n);
        for j in 0..r {
            let (mat, inv) = sample_invertible(&mut rdr, n);
            if j == r - 1 {
                lin_last_inv = inv;
            }
            lin_mats.push(mat);
        }
        let mut const_buf = vec![0u8; num_bytes(n)];
        let consts = (0..r)
            .map(|_| {
                rdr.squeeze(&mut const_buf);
                BitVec::from_bytes(&const_buf, n)
            })
            .collect();

        Self {
            state_bits: n,
            sboxes: m,
            rounds: r,
            key_mats,
            lin_mats,
            lin_last_inv,
            consts,
        }
    }

    /// Round-key matrix `K_i`, `i ∈ [0, r]`.
    #[inline]
    #[must_use]
    pub fn key_matrix(&self, i: usize) -> &BitMatrix {
        &self.key_mats[i]
    }

    /// Linear layer of round `j` (0-indexed).
    #[inline]
    #[must_use]
    pub fn round_matrix(&self, j: usize) -> &BitMatrix {
        &self.lin_mats[j]
    }

    /// Inverse of the final round's linear layer.
    #[inline]
    #[must_use]
    pub fn last_round_inverse(&self) -> &BitMatrix {
        &self.lin_last_inv
    }

    /// Round constant of round `j` (0-indexed).
    #[inline]
    #[must_use]
    pub fn round_constant(&self, j: usize) -> &BitVec {
        &self.consts[j]
    }
}

fn sample_invertible(rdr: &mut HashReader, n: usize) -> (BitMatrix, BitMatrix) {
    loop {
        let cand = BitMatrix::from_reader(rdr, n, n);
        if let Some(inv) = cand.inverse() {
            return (cand, inv);
        }
    }
}
