//! Commitment layer.
//!
//! Three flavors, all over the same XOF and domain-separated purely by the
//! structure of what they absorb:
//!
//! - `commit` / `commit_x4`: per-party `C[t][j]` over seed (and, for the
//!   last party, the aux bits), salt, round, and party index;
//! - `commit_h` / `commit_h_x4`: `Ch[t]` over all party commitments of a
//!   round, parties in ascending order;
//! - `commit_v` / `commit_v_x4`: `Cv[t]` over the masked input and every
//!   party's broadcast transcript.
//!
//! The `x4` forms never absorb aux bits; the last party is always handled
//! by a scalar `commit`.

use picnic3_core::bits::num_bytes;
use picnic3_core::{Msgs, Params};
use picnic3_hash::{HashCtx, HashCtx4};

/// Per-party commitment `C[t][j]`.
pub(crate) fn commit(
    params: &Params,
    seed: &[u8],
    aux: Option<&[u8]>,
    salt: &[u8],
    t: u16,
    j: u16,
) -> Vec<u8> {
    let mut ctx = HashCtx::new(params.digest_size);
    ctx.update(seed);
    if let Some(aux) = aux {
        ctx.update(aux);
    }
    ctx.update(salt);
    ctx.update_u16_le(t);
    ctx.update_u16_le(j);
    ctx.finalize().squeeze_vec(params.digest_size)
}

/// Four per-party commitments for parties `j..j+4` of one round.
pub(crate) fn commit_x4(
    params: &Params,
    seeds: [&[u8]; 4],
    salt: &[u8],
    t: u16,
    j: u16,
) -> [Vec<u8>; 4] {
    let mut ctx = HashCtx4::new(params.digest_size);
    ctx.update4(seeds);
    ctx.update_all(salt);
    ctx.update_u16_le_all(t);
    ctx.update_u16s_le([j, j + 1, j + 2, j + 3]);
    ctx.finalize4()
        .map(|mut rdr| rdr.squeeze_vec(params.digest_size))
}

/// Round commitment `Ch[t]` over all party commitments.
pub(crate) fn commit_h(params: &Params, hashes: &[Vec<u8>]) -> Vec<u8> {
    let mut ctx = HashCtx::new(params.digest_size);
    for h in hashes {
        ctx.update(h);
    }
    ctx.finalize().squeeze_vec(params.digest_size)
}

/// `Ch` for four consecutive rounds, party arrays absorbed in lockstep.
pub(crate) fn commit_h_x4(params: &Params, rounds: [&[Vec<u8>]; 4]) -> [Vec<u8>; 4] {
    let mut ctx = HashCtx4::new(params.digest_size);
    for i in 0..params.num_parties {
        ctx.update4([
            &rounds[0][i],
            &rounds[1][i],
            &rounds[2][i],
            &rounds[3][i],
        ]);
    }
    ctx.finalize4()
        .map(|mut rdr| rdr.squeeze_vec(params.digest_size))
}

/// View commitment `Cv[t]` over the masked input and all transcripts.
pub(crate) fn commit_v(params: &Params, input: &[u8], msgs: &Msgs) -> Vec<u8> {
    let mut ctx = HashCtx::new(params.digest_size);
    ctx.update(input);
    let len = num_bytes(msgs.pos);
    for m in &msgs.msgs {
        ctx.update(&m[..len]);
    }
    ctx.finalize().squeeze_vec(params.digest_size)
}

/// `Cv` for four consecutive rounds in lockstep.
pub(crate) fn commit_v_x4(
    params: &Params,
    inputs: [&[u8]; 4],
    msgs: [&Msgs; 4],
) -> [Vec<u8>; 4] {
    debug_assert!(msgs.iter().all(|m| m.pos == msgs[0].pos));
    let mut ctx = HashCtx4::new(params.digest_size);
    ctx.update4(inputs);
    let len = num_bytes(msgs[0].pos);
    for i in 0..params.num_parties {
        ctx.update4([
            &msgs[0].msgs[i][..len],
            &msgs[1].msgs[i][..len],
            &msgs[2].msgs[i][..len],
            &msgs[3].msgs[i][..len],
        ]);
    }
    ctx.finalize4()
        .map(|mut rdr| rdr.squeeze_vec(params.digest_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use picnic3_core::PICNIC3_L1;

    #[test]
    fn batched_commitments_match_scalar() {
        let p = PICNIC3_L1;
        let salt = [9u8; 32];
        let seeds: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; p.seed_size]).collect();

        let batched = commit_x4(
            &p,
            [&seeds[0], &seeds[1], &seeds[2], &seeds[3]],
            &salt,
            11,
            4,
        );
        for (k, b) in batched.iter().enumerate() {
            let scalar = commit(&p, &seeds[k], None, &salt, 11, 4 + k as u16);
            assert_eq!(b, &scalar);
        }
    }

    #[test]
    fn aux_changes_the_commitment() {
        let p = PICNIC3_L1;
        let salt = [0u8; 32];
        let seed = vec![1u8; p.seed_size];
        let aux = vec![2u8; p.view_size()];
        assert_ne!(
            commit(&p, &seed, None, &salt, 0, 15),
            commit(&p, &seed, Some(&aux), &salt, 0, 15)
        );
    }

    #[test]
    fn round_and_party_indices_separate_domains() {
        let p = PICNIC3_L1;
        let salt = [0u8; 32];
        let seed = vec![7u8; p.seed_size];
        let base = commit(&p, &seed, None, &salt, 1, 2);
        assert_ne!(base, commit(&p, &seed, None, &salt, 2, 1));
        assert_ne!(base, commit(&p, &seed, None, &salt, 1, 3));
    }

    #[test]
    fn view_commitment_covers_every_transcript() {
        let p = PICNIC3_L1;
        let input = vec![3u8; p.io_size()];
        let mut msgs = Msgs::new(&p);
        msgs.pos = p.view_bits();
        let base = commit_v(&p, &input, &msgs);
        msgs.msgs[p.num_parties - 1][0] ^= 1;
        assert_ne!(base, commit_v(&p, &input, &msgs));
    }
}
