// crates/picnic3-hash/src/lib.rs

//! SHAKE-based XOF contexts for the Picnic3 workspace.
//!
//! Every hash in the scheme is an extendable-output SHAKE instance selected
//! by the digest width: 32-byte digests use SHAKE128, wider digests use
//! SHAKE256. Domain separation is structural (the absorb order *is* the
//! domain tag), except for a handful of single-byte prefixes absorbed first.
//!
//! The 4-lane context ([`HashCtx4`]) batches four independent streams with
//! the same state shape. It is a scalar rendition of the interleaved variant:
//! the contractual surface is the per-lane absorb content and order, which is
//! byte-identical to four scalar contexts.

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

use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128, Shake128Reader, Shake256, Shake256Reader,
};

/// Domain prefix for challenge re-hashing and seed-tree expansion.
pub const HASH_PREFIX_1: u8 = 0x01;

/// Domain prefix for Merkle-node compression.
pub const HASH_PREFIX_3: u8 = 0x03;

enum Ctx {
    Shake128(Shake128),
    Shake256(Shake256),
}

/// One XOF absorb context.
pub struct HashCtx(Ctx);

impl HashCtx {
    /// Create a context for a hash of `digest_size` bytes.
    ///
    /// 32-byte digests (the L1 instance) select SHAKE128; anything wider
    /// selects SHAKE256.
    #[must_use]
    pub fn new(digest_size: usize) -> Self {
        if digest_size <= 32 {
            Self(Ctx::Shake128(Shake128::default()))
        } else {
            Self(Ctx::Shake256(Shake256::default()))
        }
    }

    /// Create a context and absorb a single domain-prefix byte first.
    #[must_use]
    pub fn with_prefix(digest_size: usize, prefix: u8) -> Self {
        let mut ctx = Self::new(digest_size);
        ctx.update(&[prefix]);
        ctx
    }

    /// Absorb raw bytes.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.0 {
            Ctx::Shake128(h) => h.update(data),
            Ctx::Shake256(h) => h.update(data),
        }
    }

    /// Absorb a `u16` little-endian.
    pub fn update_u16_le(&mut self, v: u16) {
        self.update(&v.to_le_bytes());
    }

    /// Finish absorbing; the reader squeezes arbitrarily many output bytes.
    #[must_use]
    pub fn finalize(self) -> HashReader {
        match self.0 {
            Ctx::Shake128(h) => HashReader(Rdr::Shake128(h.finalize_xof())),
            Ctx::Shake256(h) => HashReader(Rdr::Shake256(h.finalize_xof())),
        }
    }
}

enum Rdr {
    Shake128(Shake128Reader),
    Shake256(Shake256Reader),
}

/// Squeeze side of a finalized [`HashCtx`].
pub struct HashReader(Rdr);

impl HashReader {
    /// Fill `out` with the next output bytes.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        match &mut self.0 {
            Rdr::Shake128(r) => r.read(out),
            Rdr::Shake256(r) => r.read(out),
        }
    }

    /// Squeeze `len` fresh bytes.
    #[must_use]
    pub fn squeeze_vec(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.squeeze(&mut out);
        out
    }
}

/// Four independent XOF lanes driven in lockstep.
pub struct HashCtx4([HashCtx; 4]);

impl HashCtx4 {
    /// Create four lanes for a hash of `digest_size` bytes.
    #[must_use]
    pub fn new(digest_size: usize) -> Self {
        Self([
            HashCtx::new(digest_size),
            HashCtx::new(digest_size),
            HashCtx::new(digest_size),
            HashCtx::new(digest_size),
        ])
    }

    /// Absorb a distinct payload into each lane.
    pub fn update4(&mut self, parts: [&[u8]; 4]) {
        for (lane, part) in self.0.iter_mut().zip(parts) {
            lane.update(part);
        }
    }

    /// Absorb the same payload into every lane.
    pub fn update_all(&mut self, data: &[u8]) {
        for lane in &mut self.0 {
            lane.update(data);
        }
    }

    /// Absorb the same `u16` (little-endian) into every lane.
    pub fn update_u16_le_all(&mut self, v: u16) {
        self.update_all(&v.to_le_bytes());
    }

    /// Absorb a distinct `u16` (little-endian) into each lane.
    pub fn update_u16s_le(&mut self, vs: [u16; 4]) {
        for (lane, v) in self.0.iter_mut().zip(vs) {
            lane.update(&v.to_le_bytes());
        }
    }

    /// Finish absorbing all four lanes.
    #[must_use]
    pub fn finalize4(self) -> [HashReader; 4] {
        self.0.map(HashCtx::finalize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism() {
        let mut a = HashCtx::new(32);
        a.update(b"payload");
        let mut b = HashCtx::new(32);
        b.update(b"payload");
        assert_eq!(a.finalize().squeeze_vec(32), b.finalize().squeeze_vec(32));
    }

    #[test]
    fn prefix_changes_output() {
        let mut plain = HashCtx::new(32);
        plain.update(b"x");
        let mut prefixed = HashCtx::with_prefix(32, HASH_PREFIX_1);
        prefixed.update(b"x");
        assert_ne!(
            plain.finalize().squeeze_vec(32),
            prefixed.finalize().squeeze_vec(32)
        );
    }

    #[test]
    fn digest_width_selects_the_sponge() {
        let mut narrow = HashCtx::new(32);
        narrow.update(b"x");
        let mut wide = HashCtx::new(48);
        wide.update(b"x");
        assert_ne!(
            narrow.finalize().squeeze_vec(32),
            wide.finalize().squeeze_vec(32)
        );
    }

    #[test]
    fn squeeze_is_streaming() {
        let mut a = HashCtx::new(32);
        a.update(b"stream");
        let mut r = a.finalize();
        let mut first = [0u8; 16];
        let mut second = [0u8; 16];
        r.squeeze(&mut first);
        r.squeeze(&mut second);

        let mut b = HashCtx::new(32);
        b.update(b"stream");
        let whole = b.finalize().squeeze_vec(32);
        assert_eq!(&whole[..16], &first);
        assert_eq!(&whole[16..], &second);
    }

    #[test]
    fn four_lanes_match_four_scalar_contexts() {
        let payloads: [&[u8]; 4] = [b"a", b"bb", b"ccc", b"dddd"];
        let mut x4 = HashCtx4::new(32);
        x4.update4(payloads);
        x4.update_all(b"shared");
        x4.update_u16_le_all(7);
        x4.update_u16s_le([0, 1, 2, 3]);
        let mut readers = x4.finalize4();

        for (i, payload) in payloads.iter().enumerate() {
            let mut scalar = HashCtx::new(32);
            scalar.update(payload);
            scalar.update(b"shared");
            scalar.update_u16_le(7);
            scalar.update_u16_le(i as u16);
            assert_eq!(
                scalar.finalize().squeeze_vec(32),
                readers[i].squeeze_vec(32),
                "lane {i} diverged from its scalar counterpart"
            );
        }
    }
}
