//! Plain (unmasked) LowMC evaluation.

use crate::gf2::BitVec;
use crate::instance::LowmcInstance;

/// Encrypt `plaintext` under `key`.
///
/// The public key of a Picnic3 key pair is `encrypt(private_key, plaintext)`.
#[must_use]
pub fn encrypt(inst: &LowmcInstance, key: &BitVec, plaintext: &BitVec) -> BitVec {
    let mut state = plaintext.clone();
    state.xor_assign(&inst.key_matrix(0).mul_vec(key));
    for j in 0..inst.rounds {
        sbox_layer(&mut state, inst.sboxes);
        state = inst.round_matrix(j).mul_vec(&state);
        state.xor_assign(inst.round_constant(j));
        state.xor_assign(&inst.key_matrix(j + 1).mul_vec(key));
    }
    state
}

/// Full S-box layer: each triple `(a, b, c)` at bits `(3s, 3s+1, 3s+2)` maps
/// to `(a ⊕ bc, a ⊕ b ⊕ ca, a ⊕ b ⊕ c ⊕ ab)`.
pub(crate) fn sbox_layer(state: &mut BitVec, sboxes: usize) {
    for s in 0..sboxes {
        let (a, b, c) = (state.get(3 * s), state.get(3 * s + 1), state.get(3 * s + 2));
        state.set(3 * s, a ^ (b & c));
        state.set(3 * s + 1, a ^ b ^ (c & a));
        state.set(3 * s + 2, a ^ b ^ c ^ (a & b));
    }
}
