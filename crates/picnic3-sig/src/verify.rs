//! Verification driver.
//!
//! Mirrors signing with the punctured data: reconstruct the initial seeds,
//! recompute every round's party commitments (from scratch for unopened
//! rounds, from the reveal plus the installed commitment for opened ones),
//! replay the online simulation for the opened rounds with the unopened
//! party zeroed, rebuild the Merkle root from the opening, and compare the
//! recomputed Fiat–Shamir challenge byte for byte. Every failure collapses
//! into the same rejection at the API boundary.

use picnic3_core::{Msgs, Params, RandomTape};
use picnic3_lowmc::{simulate_online, BitVec, LowmcInstance};
use picnic3_tree::{MerkleTree, SeedTree};

use crate::challenge::hcp;
use crate::commit::{commit, commit_h, commit_h_x4, commit_v, commit_x4};
use crate::error::{reject, Error, VerifyError};
use crate::tape::{compute_aux_tape, create_random_tapes};
use crate::types::{RoundProof, Signature};
use crate::wire;

/// Check a serialized signature.
pub(crate) fn verify(
    params: &Params,
    inst: &LowmcInstance,
    pub_key: &[u8],
    plaintext: &[u8],
    message: &[u8],
    sig_bytes: &[u8],
) -> Result<(), Error> {
    let (sig, lists) = wire::deserialize(params, sig_bytes).map_err(reject)?;
    let num_rounds = params.num_rounds;
    let last = params.num_parties - 1;

    let iseeds = SeedTree::reconstruct(
        num_rounds,
        &lists.c,
        &sig.iseed_info,
        &sig.salt,
        0,
        params,
    )
    .map_err(|_| reject(VerifyError::MalformedSeedOpening))?;

    // Recompute per-party commitments and aggregate Ch, four rounds a batch.
    let mut ch_hashes: Vec<Vec<u8>> = vec![Vec::new(); num_rounds];
    let mut recent: [Vec<Vec<u8>>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
    let mut tapes_all: Vec<RandomTape> = Vec::with_capacity(num_rounds);
    let full = num_rounds / 4 * 4;

    for t in 0..num_rounds {
        let opened = lists.unopened_for(t as u16);
        let tree = match opened {
            None => {
                let iseed = iseeds
                    .leaf(t)
                    .ok_or_else(|| reject(VerifyError::MalformedSeedOpening))?;
                SeedTree::generate(params.num_parties, iseed, &sig.salt, t as u16, params)
            }
            Some(u) => {
                let proof = round_proof(&sig, t)?;
                SeedTree::reconstruct(
                    params.num_parties,
                    &[u],
                    &proof.seed_info,
                    &sig.salt,
                    t as u16,
                    params,
                )
                .map_err(|_| reject(VerifyError::MalformedSeedOpening))?
            }
        };

        let mut tape = create_random_tapes(params, &tree, &sig.salt, t as u16);

        // Commit to every party; the unopened party's lane carries the bogus
        // zero seed and is overwritten by the commitment from the signature.
        let zero_seed = vec![0u8; params.seed_size];
        let mut hashes: Vec<Vec<u8>> = Vec::with_capacity(params.num_parties);
        let commit_groups =
            |hashes: &mut Vec<Vec<u8>>, tree: &SeedTree| {
                for j in (0..params.num_parties).step_by(4) {
                    let leaf = |k: usize| tree.leaf(j + k).unwrap_or(&zero_seed);
                    hashes.extend(commit_x4(
                        params,
                        [leaf(0), leaf(1), leaf(2), leaf(3)],
                        &sig.salt,
                        t as u16,
                        j as u16,
                    ));
                }
            };

        match opened {
            None => {
                // Aux recomputed from scratch so the last party's commitment
                // can be checked.
                compute_aux_tape(params, inst, &mut tape, None);
                commit_groups(&mut hashes, &tree);
                hashes[last] = commit(
                    params,
                    tree.leaf(last)
                        .ok_or_else(|| reject(VerifyError::MalformedSeedOpening))?,
                    Some(&tape.aux_bits),
                    &sig.salt,
                    t as u16,
                    last as u16,
                );
            }
            Some(u) => {
                let proof = round_proof(&sig, t)?;
                commit_groups(&mut hashes, &tree);
                if u as usize != last {
                    let aux = proof
                        .aux
                        .as_deref()
                        .ok_or_else(|| reject(VerifyError::MalformedSize))?;
                    hashes[last] = commit(
                        params,
                        tree.leaf(last)
                            .ok_or_else(|| reject(VerifyError::MalformedSeedOpening))?,
                        Some(aux),
                        &sig.salt,
                        t as u16,
                        last as u16,
                    );
                }
                hashes[u as usize] = proof.commitment.clone();
            }
        }

        recent[t % 4] = hashes;
        if t >= full {
            ch_hashes[t] = commit_h(params, &recent[t % 4]);
        } else if (t + 1) % 4 == 0 {
            let hs = commit_h_x4(params, [&recent[0], &recent[1], &recent[2], &recent[3]]);
            for (k, h) in hs.into_iter().enumerate() {
                ch_hashes[t - 3 + k] = h;
            }
        }
        tapes_all.push(tape);
        // The per-round seed tree drops here; only the tapes survive.
    }

    // Replay the online phase for every opened round.
    let pt_bits = BitVec::from_bytes(plaintext, params.state_bits);
    let mut cv_hashes: Vec<Option<Vec<u8>>> = vec![None; num_rounds];
    for (i, &tc) in lists.c.iter().enumerate() {
        let t = tc as usize;
        let u = lists.p[i] as usize;
        let proof = round_proof(&sig, t)?;
        let tape = &mut tapes_all[t];

        if let Some(aux) = &proof.aux {
            tape.set_aux_bits(aux, params);
        }
        // The unopened party contributes nothing but its recorded messages.
        tape.tapes[u].iter_mut().for_each(|b| *b = 0);
        tape.pos = 0;

        let mut msgs = Msgs::new(params);
        msgs.msgs[u].copy_from_slice(&proof.msgs);
        msgs.unopened = Some(u);
        msgs.pos = 0;

        let masked_key = BitVec::from_bytes(&proof.input, params.state_bits);
        simulate_online(
            inst,
            &masked_key,
            tape,
            &mut msgs,
            &pt_bits,
            pub_key,
            params,
        )
        .map_err(|_| reject(VerifyError::SimulationFail))?;

        cv_hashes[t] = Some(commit_v(params, &proof.input, &msgs));
    }

    // Rebuild the Merkle root from the opening and the recomputed leaves.
    let missing = lists.missing_rounds(num_rounds);
    let mut tree_cv = MerkleTree::new(num_rounds, params);
    tree_cv
        .add_nodes(&missing, &sig.cv_info)
        .map_err(|_| reject(VerifyError::MerkleFail))?;
    tree_cv
        .verify(&cv_hashes, &sig.salt)
        .map_err(|_| reject(VerifyError::MerkleFail))?;

    // Recompute the challenge and compare byte for byte.
    let expected = hcp(
        params,
        &ch_hashes,
        tree_cv.root(),
        &sig.salt,
        pub_key,
        plaintext,
        message,
    );
    if expected == sig.challenge {
        Ok(())
    } else {
        Err(reject(VerifyError::ChallengeMismatch))
    }
}

fn round_proof(sig: &Signature, t: usize) -> Result<&RoundProof, Error> {
    sig.proofs[t]
        .as_ref()
        .ok_or_else(|| reject(VerifyError::MalformedSize))
}
