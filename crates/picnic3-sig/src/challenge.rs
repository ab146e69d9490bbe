//! Fiat–Shamir challenge derivation and expansion.
//!
//! `hcp` hashes the whole transcript into the signature challenge; the
//! challenge then expands into the opened-round list (`challengeC`, a set)
//! and the unopened-party list (`challengeP`, a sequence). Expansion walks a
//! rolling digest in little-endian bit chunks and re-hashes with the `0x01`
//! domain prefix whenever a digest is exhausted. The re-hash at the end of
//! every outer iteration is unconditional: it fires even when the iteration
//! just filled its list, and phase P starts from that re-hashed state. That
//! detail is load-bearing for interop; do not "optimize" it away.

use picnic3_core::bits::{ceil_log2, get_bit};
use picnic3_core::{declassify, Params};
use picnic3_hash::{HashCtx, HASH_PREFIX_1};

use crate::types::ChallengeLists;

/// The Fiat–Shamir hash over the full transcript.
///
/// Absorbs `Ch[0..T)`, the Merkle root over the view commitments, the salt,
/// the public key, the plaintext, and the message; the digest is declassified
/// because it ships in the signature.
pub(crate) fn hcp(
    params: &Params,
    ch_hashes: &[Vec<u8>],
    h_cv: &[u8],
    salt: &[u8],
    pub_key: &[u8],
    plaintext: &[u8],
    message: &[u8],
) -> Vec<u8> {
    debug_assert_eq!(ch_hashes.len(), params.num_rounds);
    let mut ctx = HashCtx::new(params.digest_size);
    for h in ch_hashes {
        ctx.update(h);
    }
    ctx.update(h_cv);
    ctx.update(salt);
    ctx.update(pub_key);
    ctx.update(plaintext);
    ctx.update(message);
    let digest = ctx.finalize().squeeze_vec(params.digest_size);
    declassify(&digest);
    digest
}

/// Split `h` into `⌊len·8 / chunk_bits⌋` little-endian chunks.
fn bits_to_chunks(chunk_bits: u32, h: &[u8]) -> Vec<u16> {
    debug_assert!(chunk_bits >= 1 && chunk_bits <= 16);
    let chunk_bits = chunk_bits as usize;
    let count = (h.len() * 8) / chunk_bits;
    (0..count)
        .map(|i| {
            let mut v = 0u16;
            for j in 0..chunk_bits {
                v |= u16::from(get_bit(h, i * chunk_bits + j)) << j;
            }
            v
        })
        .collect()
}

fn rehash(params: &Params, h: &[u8]) -> Vec<u8> {
    let mut ctx = HashCtx::with_prefix(params.digest_size, HASH_PREFIX_1);
    ctx.update(h);
    ctx.finalize().squeeze_vec(params.digest_size)
}

/// Expand the signature challenge into the two index lists.
pub(crate) fn expand_challenge(params: &Params, sig_h: &[u8]) -> ChallengeLists {
    let bits_c = ceil_log2(params.num_rounds);
    let bits_p = ceil_log2(params.num_parties);
    debug_assert!(bits_c >= 4 && bits_p >= 4);

    let tau = params.num_opened;
    let mut h = sig_h.to_vec();

    let mut c: Vec<u16> = Vec::with_capacity(tau);
    while c.len() < tau {
        for v in bits_to_chunks(bits_c, &h) {
            if (v as usize) < params.num_rounds && !c.contains(&v) {
                c.push(v);
            }
            if c.len() == tau {
                break;
            }
        }
        h = rehash(params, &h);
    }

    let mut p: Vec<u16> = Vec::with_capacity(tau);
    while p.len() < tau {
        for v in bits_to_chunks(bits_p, &h) {
            if (v as usize) < params.num_parties {
                p.push(v);
            }
            if p.len() == tau {
                break;
            }
        }
        h = rehash(params, &h);
    }

    ChallengeLists { c, p }
}
