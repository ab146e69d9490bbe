//! Masked MPC evaluation of LowMC.
//!
//! Every wire value `z` is carried as a public masked value `ẑ = z ⊕ λ_z`
//! with the mask `λ_z` additively shared across the parties; the shares are
//! the parties' tape bits, so linear layers act on the masked state publicly
//! and on the share words locally. Multiplication gates consume two tape
//! bits per party: a helper share (whose parity the offline phase pins to
//! the product of the input masks) and a fresh output-mask share. The
//! exception is the final round, where both are merged into one bit and
//! the offline phase pins the parity so the mask of the *output* state
//! cancels to zero. That cancellation is what lets both signer and verifier
//! compare the final masked state directly against the public key.
//!
//! Tape positions are contractual and shared with
//! `RandomTape::set_aux_bits`: key-mask shares at `[0, n)`, then per round
//! `j` the helper block at `[n + 2nj, n + 2nj + n)` followed (for all but
//! the last round) by the fresh block of the same width.

use picnic3_core::bits::{get_bit, set_bit};
use picnic3_core::{Msgs, Params, RandomTape};
use thiserror::Error;

use crate::gf2::BitVec;
use crate::instance::LowmcInstance;

/// Online simulation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// The unmasked output does not match the public key.
    #[error("masked output does not match the public key")]
    OutputMismatch,
}

/// Offline phase: fix the last party's helper bits so the multiplication
/// invariant holds, appending each fixed bit to the aux accumulator.
///
/// Expects the caller to have XOR-reduced the tapes into the parity buffer,
/// set `pos` to `n`, reset `aux_pos`, and cleared `aux_bits`; `key_mask` is
/// the plain key mask (parity of the first `n` tape bits).
pub fn compute_aux(
    inst: &LowmcInstance,
    key_mask: &BitVec,
    tapes: &mut RandomTape,
    params: &Params,
) {
    let n = inst.state_bits;
    let last = params.num_parties - 1;
    debug_assert_eq!(tapes.pos, n);

    // Plain mask of the state entering the first S-box layer.
    let mut mask = inst.key_matrix(0).mul_vec(key_mask);

    for j in 0..inst.rounds {
        let helper_base = tapes.pos;
        let final_round = j == inst.rounds - 1;

        // Output masks for this round's gates.
        let fresh: Vec<bool> = if final_round {
            // Choose gate-output masks so the post-linear-layer mask equals
            // K_r·λ_key, cancelling the key-schedule term exactly.
            let req = inst
                .last_round_inverse()
                .mul_vec(&inst.key_matrix(inst.rounds).mul_vec(key_mask));
            let mut v = vec![false; n];
            for s in 0..inst.sboxes {
                let (a, b, c) = (mask.get(3 * s), mask.get(3 * s + 1), mask.get(3 * s + 2));
                v[3 * s] = req.get(3 * s) ^ a;
                v[3 * s + 1] = req.get(3 * s + 1) ^ a ^ b;
                v[3 * s + 2] = req.get(3 * s + 2) ^ a ^ b ^ c;
            }
            v
        } else {
            (0..n)
                .map(|g| tapes.parity_bit(helper_base + n + g))
                .collect()
        };

        // Pin each gate's helper parity.
        for s in 0..inst.sboxes {
            let (a, b, c) = (mask.get(3 * s), mask.get(3 * s + 1), mask.get(3 * s + 2));
            let products = [b & c, c & a, a & b];
            for (k, product) in products.into_iter().enumerate() {
                let g = 3 * s + k;
                let want = if final_round {
                    product ^ fresh[g]
                } else {
                    product
                };
                let pos = helper_base + g;
                let current = tapes.parity_bit(pos);
                let fixed = tapes.tape_bit(last, pos) ^ current ^ want;
                tapes.set_tape_bit(last, pos, fixed);
                tapes.push_aux_bit(fixed);
            }
        }

        if final_round {
            tapes.pos += n;
        } else {
            // Masks after the S-box layer, then through the linear part.
            let mut out = BitVec::zero(n);
            for s in 0..inst.sboxes {
                let (a, b, c) = (mask.get(3 * s), mask.get(3 * s + 1), mask.get(3 * s + 2));
                out.set(3 * s, a ^ fresh[3 * s]);
                out.set(3 * s + 1, a ^ b ^ fresh[3 * s + 1]);
                out.set(3 * s + 2, a ^ b ^ c ^ fresh[3 * s + 2]);
            }
            mask = inst.round_matrix(j).mul_vec(&out);
            mask.xor_assign(&inst.key_matrix(j + 1).mul_vec(key_mask));
            tapes.pos += 2 * n;
        }
    }
    debug_assert_eq!(tapes.aux_pos, inst.rounds * n);
}

/// Online phase: replay the masked evaluation, recording every party's
/// broadcast bit per multiplication gate.
///
/// For `msgs.unopened`, broadcast bits are read from the installed
/// transcript instead of recomputed. Returns an error when the final masked
/// state differs from `pub_key`.
///
/// # Errors
/// [`SimulationError::OutputMismatch`]: during signing this indicates an
/// internal inconsistency; during verification, an invalid signature.
pub fn simulate_online(
    inst: &LowmcInstance,
    masked_key: &BitVec,
    tapes: &mut RandomTape,
    msgs: &mut Msgs,
    plaintext: &BitVec,
    pub_key: &[u8],
    params: &Params,
) -> Result<(), SimulationError> {
    let n = inst.state_bits;
    let parties = params.num_parties;
    debug_assert!(parties <= 64);
    debug_assert_eq!(tapes.pos, 0);

    // Key-mask shares, one word per key bit (bit p = party p's share).
    let key_shares: Vec<u64> = (0..n).map(|_| tapes.read_word()).collect();

    // Masked state and its mask shares entering round 0.
    let mut state = plaintext.clone();
    state.xor_assign(&inst.key_matrix(0).mul_vec(masked_key));
    let mut shares = inst.key_matrix(0).mul_shares(&key_shares);

    for j in 0..inst.rounds {
        let final_round = j == inst.rounds - 1;
        let helper: Vec<u64> = (0..n).map(|_| tapes.read_word()).collect();
        let fresh: Option<Vec<u64>> =
            (!final_round).then(|| (0..n).map(|_| tapes.read_word()).collect());

        let mut out = BitVec::zero(n);
        let mut out_shares = vec![0u64; n];
        for s in 0..inst.sboxes {
            let (ia, ib, ic) = (3 * s, 3 * s + 1, 3 * s + 2);
            let (av, bv, cv) = (state.get(ia), state.get(ib), state.get(ic));
            let (aw, bw, cw) = (shares[ia], shares[ib], shares[ic]);

            // Gates in (bc, ca, ab) order, matching the offline phase.
            let gates = [(bv, cv, bw, cw), (cv, av, cw, aw), (av, bv, aw, bw)];
            let mut masked_product = [false; 3];
            for (k, (xv, yv, xw, yw)) in gates.into_iter().enumerate() {
                let g = 3 * s + k;
                let mut word = helper[g];
                if xv {
                    word ^= yw;
                }
                if yv {
                    word ^= xw;
                }
                if let Some(f) = &fresh {
                    word ^= f[g];
                }
                let word = exchange(msgs, word, parties);
                masked_product[k] = (word.count_ones() & 1 == 1) ^ (xv & yv);
            }

            out.set(ia, av ^ masked_product[0]);
            out.set(ib, av ^ bv ^ masked_product[1]);
            out.set(ic, av ^ bv ^ cv ^ masked_product[2]);
            if let Some(f) = &fresh {
                out_shares[ia] = aw ^ f[ia];
                out_shares[ib] = aw ^ bw ^ f[ib];
                out_shares[ic] = aw ^ bw ^ cw ^ f[ic];
            }
        }

        state = inst.round_matrix(j).mul_vec(&out);
        state.xor_assign(inst.round_constant(j));
        state.xor_assign(&inst.key_matrix(j + 1).mul_vec(masked_key));
        if !final_round {
            shares = inst.round_matrix(j).mul_shares(&out_shares);
            for (dst, src) in shares
                .iter_mut()
                .zip(inst.key_matrix(j + 1).mul_shares(&key_shares))
            {
                *dst ^= src;
            }
        }
    }

    // The offline phase arranged a zero output mask, so the masked state is
    // the plain ciphertext.
    if state.to_bytes(params.io_size()) == pub_key {
        Ok(())
    } else {
        Err(SimulationError::OutputMismatch)
    }
}

/// Record one broadcast bit per party at the shared cursor; the unopened
/// party's bit is read back from its installed transcript.
fn exchange(msgs: &mut Msgs, mut word: u64, parties: usize) -> u64 {
    let pos = msgs.pos;
    msgs.pos += 1;
    for p in 0..parties {
        if msgs.unopened == Some(p) {
            let bit = get_bit(&msgs.msgs[p], pos);
            word = (word & !(1u64 << p)) | (u64::from(bit) << p);
        } else {
            set_bit(&mut msgs.msgs[p], pos, (word >> p) & 1 == 1);
        }
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::encrypt;
    use picnic3_core::Params;
    use picnic3_hash::HashCtx;

    // A small shape keeps the test fast while exercising every code path
    // (multiple rounds, fresh and merged helper blocks, padding bits).
    const SMALL: Params = Params {
        digest_size: 32,
        seed_size: 16,
        num_parties: 16,
        num_rounds: 19,
        num_opened: 6,
        state_bits: 9,
        sboxes: 3,
        rounds: 4,
    };

    fn filled_tapes(params: &Params, tag: u8) -> RandomTape {
        let mut tapes = RandomTape::new(params);
        for (p, tape) in tapes.tapes.iter_mut().enumerate() {
            let mut ctx = HashCtx::new(32);
            ctx.update(&[tag, p as u8]);
            ctx.finalize().squeeze(tape);
        }
        tapes
    }

    fn offline(inst: &LowmcInstance, params: &Params, tapes: &mut RandomTape) -> BitVec {
        tapes.accumulate_parity();
        let key_mask = BitVec::from_bytes(&tapes.parity, params.state_bits);
        tapes.pos = params.state_bits;
        tapes.aux_pos = 0;
        tapes.aux_bits.iter_mut().for_each(|b| *b = 0);
        compute_aux(inst, &key_mask, tapes, params);
        tapes.pos = 0;
        key_mask
    }

    #[test]
    fn honest_simulation_reproduces_the_ciphertext() {
        let params = SMALL;
        params.validate().unwrap();
        let inst = LowmcInstance::derive(&params);

        let key = BitVec::from_bytes(&[0x3A, 0x01], params.state_bits);
        let pt = BitVec::from_bytes(&[0xC4, 0x00], params.state_bits);
        let pk = encrypt(&inst, &key, &pt).to_bytes(params.io_size());

        let mut tapes = filled_tapes(&params, 1);
        let key_mask = offline(&inst, &params, &mut tapes);

        let mut masked_key = key.clone();
        masked_key.xor_assign(&key_mask);

        let mut msgs = Msgs::new(&params);
        simulate_online(&inst, &masked_key, &mut tapes, &mut msgs, &pt, &pk, &params)
            .unwrap();
        assert_eq!(msgs.pos, params.view_bits());

        // Every party transcript was written and padding stays clear.
        for m in &msgs.msgs {
            assert!(picnic3_core::bits::are_padding_bits_zero(
                m,
                params.view_bits()
            ));
        }
    }

    #[test]
    fn wrong_public_key_is_detected() {
        let params = SMALL;
        let inst = LowmcInstance::derive(&params);

        let key = BitVec::from_bytes(&[0x11, 0x00], params.state_bits);
        let pt = BitVec::zero(params.state_bits);
        let mut pk = encrypt(&inst, &key, &pt).to_bytes(params.io_size());
        pk[0] ^= 1;

        let mut tapes = filled_tapes(&params, 2);
        let key_mask = offline(&inst, &params, &mut tapes);
        let mut masked_key = key;
        masked_key.xor_assign(&key_mask);

        let mut msgs = Msgs::new(&params);
        assert_eq!(
            simulate_online(&inst, &masked_key, &mut tapes, &mut msgs, &pt, &pk, &params),
            Err(SimulationError::OutputMismatch)
        );
    }

    #[test]
    fn replay_with_zeroed_party_matches() {
        // Verifier view: drop one party's tape, replay its transcript.
        let params = SMALL;
        let inst = LowmcInstance::derive(&params);

        let key = BitVec::from_bytes(&[0xFF, 0x01], params.state_bits);
        let pt = BitVec::from_bytes(&[0x0F, 0x00], params.state_bits);
        let pk = encrypt(&inst, &key, &pt).to_bytes(params.io_size());

        let mut tapes = filled_tapes(&params, 3);
        let key_mask = offline(&inst, &params, &mut tapes);
        let mut masked_key = key;
        masked_key.xor_assign(&key_mask);

        let mut signer_msgs = Msgs::new(&params);
        let mut signer_tapes = tapes.clone();
        simulate_online(
            &inst,
            &masked_key,
            &mut signer_tapes,
            &mut signer_msgs,
            &pt,
            &pk,
            &params,
        )
        .unwrap();

        for unopened in [0usize, 7, params.num_parties - 1] {
            let mut vtapes = tapes.clone();
            vtapes.pos = 0;
            vtapes.tapes[unopened].iter_mut().for_each(|b| *b = 0);

            let mut vmsgs = Msgs::new(&params);
            vmsgs.msgs[unopened] = signer_msgs.msgs[unopened].clone();
            vmsgs.unopened = Some(unopened);
            vmsgs.pos = 0;

            simulate_online(
                &inst,
                &masked_key,
                &mut vtapes,
                &mut vmsgs,
                &pt,
                &pk,
                &params,
            )
            .unwrap();
            assert_eq!(vmsgs.msgs, signer_msgs.msgs, "unopened={unopened}");
        }
    }
}
