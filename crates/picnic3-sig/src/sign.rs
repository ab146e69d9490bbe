//! Signing driver.
//!
//! Phases: derive salt and root seed from the inputs (no external entropy,
//! so signing is deterministic), expand the initial-seeds tree, run the
//! offline phase and per-party commitments for every round,
//! simulate every round online, aggregate the two commitment levels (four
//! rounds at a time, scalar remainder), build the Merkle tree over the view
//! commitments, derive the challenge, and assemble the openings.

use picnic3_core::bits::{set_bit, xor_into};
use picnic3_core::{Msgs, Params, RandomTape, SALT_SIZE};
use picnic3_hash::HashCtx;
use picnic3_lowmc::{simulate_online, BitVec, LowmcInstance};
use picnic3_tree::{MerkleTree, SeedTree};

use crate::challenge::{expand_challenge, hcp};
use crate::commit::{commit, commit_h, commit_h_x4, commit_v, commit_v_x4, commit_x4};
use crate::error::Error;
use crate::tape::{compute_aux_tape, create_random_tapes};
use crate::types::{RoundProof, Signature};
use crate::wire;

fn signing_bug() -> Error {
    #[cfg(debug_assertions)]
    tracing::debug!("internal inconsistency while signing");
    Error::SigningFailed
}

/// Produce a serialized signature.
pub(crate) fn sign(
    params: &Params,
    inst: &LowmcInstance,
    private_key: &[u8],
    pub_key: &[u8],
    plaintext: &[u8],
    message: &[u8],
) -> Result<Vec<u8>, Error> {
    debug_assert_eq!(params.num_parties % 4, 0);
    let num_rounds = params.num_rounds;
    let last = params.num_parties - 1;

    // Salt and root seed from the private key, message, and public pair.
    let mut ctx = HashCtx::new(params.digest_size);
    ctx.update(private_key);
    ctx.update(message);
    ctx.update(pub_key);
    ctx.update(plaintext);
    ctx.update_u16_le(params.state_bits as u16);
    let mut rdr = ctx.finalize();
    let mut salt = [0u8; SALT_SIZE];
    rdr.squeeze(&mut salt);
    let root_seed = rdr.squeeze_vec(params.seed_size);

    let iseeds = SeedTree::generate(num_rounds, &root_seed, &salt, 0, params);

    // Offline phase and per-party commitments, round by round.
    let mut seeds: Vec<SeedTree> = Vec::with_capacity(num_rounds);
    let mut tapes: Vec<RandomTape> = Vec::with_capacity(num_rounds);
    let mut inputs: Vec<Vec<u8>> = vec![vec![0u8; params.io_size()]; num_rounds];
    let mut party_commits: Vec<Vec<Vec<u8>>> = Vec::with_capacity(num_rounds);

    for t in 0..num_rounds {
        let iseed = iseeds.leaf(t).ok_or_else(signing_bug)?;
        let tree = SeedTree::generate(params.num_parties, iseed, &salt, t as u16, params);
        let mut tape = create_random_tapes(params, &tree, &salt, t as u16);
        compute_aux_tape(params, inst, &mut tape, Some(&mut inputs[t]));

        let mut hashes: Vec<Vec<u8>> = Vec::with_capacity(params.num_parties);
        for j in (0..params.num_parties).step_by(4) {
            let leaf = |k: usize| tree.leaf(j + k).ok_or_else(signing_bug);
            hashes.extend(commit_x4(
                params,
                [leaf(0)?, leaf(1)?, leaf(2)?, leaf(3)?],
                &salt,
                t as u16,
                j as u16,
            ));
        }
        hashes[last] = commit(
            params,
            tree.leaf(last).ok_or_else(signing_bug)?,
            Some(&tape.aux_bits),
            &salt,
            t as u16,
            last as u16,
        );

        party_commits.push(hashes);
        seeds.push(tree);
        tapes.push(tape);
    }

    // Online phase: finalize the masked keys and simulate each round.
    let pt_bits = BitVec::from_bytes(plaintext, params.state_bits);
    let mut msgs_all: Vec<Msgs> = Vec::with_capacity(num_rounds);
    for t in 0..num_rounds {
        let masked = &mut inputs[t];
        xor_into(masked, private_key);
        for i in params.state_bits..params.io_size() * 8 {
            set_bit(masked, i, false);
        }
        let masked_key = BitVec::from_bytes(masked, params.state_bits);

        let mut msgs = Msgs::new(params);
        simulate_online(
            inst,
            &masked_key,
            &mut tapes[t],
            &mut msgs,
            &pt_bits,
            pub_key,
            params,
        )
        .map_err(|_| signing_bug())?;
        msgs_all.push(msgs);
    }

    // Commitment aggregation: four rounds per batch, scalar remainder.
    let mut ch_hashes: Vec<Vec<u8>> = vec![Vec::new(); num_rounds];
    let mut cv_hashes: Vec<Vec<u8>> = vec![Vec::new(); num_rounds];
    let full = num_rounds / 4 * 4;
    for t in (0..full).step_by(4) {
        let hs = commit_h_x4(
            params,
            [
                &party_commits[t],
                &party_commits[t + 1],
                &party_commits[t + 2],
                &party_commits[t + 3],
            ],
        );
        let vs = commit_v_x4(
            params,
            [&inputs[t], &inputs[t + 1], &inputs[t + 2], &inputs[t + 3]],
            [&msgs_all[t], &msgs_all[t + 1], &msgs_all[t + 2], &msgs_all[t + 3]],
        );
        for (k, (h, v)) in hs.into_iter().zip(vs).enumerate() {
            ch_hashes[t + k] = h;
            cv_hashes[t + k] = v;
        }
    }
    for t in full..num_rounds {
        ch_hashes[t] = commit_h(params, &party_commits[t]);
        cv_hashes[t] = commit_v(params, &inputs[t], &msgs_all[t]);
    }

    // Merkle tree over the view commitments, then the challenge.
    let tree_cv = MerkleTree::build(&cv_hashes, &salt, params);
    let challenge = hcp(
        params,
        &ch_hashes,
        tree_cv.root(),
        &salt,
        pub_key,
        plaintext,
        message,
    );
    let lists = expand_challenge(params, &challenge);

    // Openings: Merkle nodes for the unopened rounds, the initial-seed
    // frontier, and one proof per opened round.
    let missing = lists.missing_rounds(num_rounds);
    let cv_info = tree_cv.open(&missing).ok_or_else(signing_bug)?;
    let iseed_info = iseeds.reveal(&lists.c).ok_or_else(signing_bug)?;

    let mut proofs: Vec<Option<RoundProof>> = vec![None; num_rounds];
    for (i, &tc) in lists.c.iter().enumerate() {
        let t = tc as usize;
        let u = lists.p[i] as usize;

        let seed_info = seeds[t].reveal(&[u as u16]).ok_or_else(signing_bug)?;
        let aux = (u != last).then(|| tapes[t].aux_bits.clone());

        // The unopened party's commitment was not retained; recompute it.
        let commitment = commit(
            params,
            seeds[t].leaf(u).ok_or_else(signing_bug)?,
            (u == last).then_some(&tapes[t].aux_bits[..]),
            &salt,
            t as u16,
            u as u16,
        );

        proofs[t] = Some(RoundProof {
            seed_info,
            aux,
            input: inputs[t].clone(),
            msgs: msgs_all[t].msgs[u].clone(),
            commitment,
            unopened: u as u16,
        });
    }

    let sig = Signature {
        challenge,
        salt,
        iseed_info,
        cv_info,
        proofs,
    };
    Ok(wire::serialize(params, &sig))
}
