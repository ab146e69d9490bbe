//! Bit-exact signature encoding.
//!
//! Layout (no separators, all lengths implied):
//!
//! ```text
//! challenge[D] ‖ salt[32] ‖ iSeedInfo ‖ cvInfo
//!   ‖ for each opened round t ascending:
//!       seedInfo ‖ (aux[V] iff unopened ≠ N−1) ‖ input[IO] ‖ msgs[V] ‖ C[D]
//! ```
//!
//! The decoder never reads a length from the wire: the challenge lists come
//! from re-expanding the challenge digest, and every opening length is a
//! pure function of the tree geometry. A total-length mismatch, an invalid
//! size computation, or a nonzero padding bit rejects the signature.

use picnic3_core::bits::are_padding_bits_zero;
use picnic3_core::{Params, SALT_SIZE};
use picnic3_tree::{MerkleTree, SeedTree};

use crate::challenge::expand_challenge;
use crate::error::VerifyError;
use crate::types::{ChallengeLists, RoundProof, Signature};

/// Serialize; the proofs' `Some` slots are exactly the opened rounds.
pub(crate) fn serialize(params: &Params, sig: &Signature) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        params.digest_size + SALT_SIZE + sig.iseed_info.len() + sig.cv_info.len(),
    );
    out.extend_from_slice(&sig.challenge);
    out.extend_from_slice(&sig.salt);
    out.extend_from_slice(&sig.iseed_info);
    out.extend_from_slice(&sig.cv_info);
    for proof in sig.proofs.iter().flatten() {
        out.extend_from_slice(&proof.seed_info);
        if let Some(aux) = &proof.aux {
            out.extend_from_slice(aux);
        }
        out.extend_from_slice(&proof.input);
        out.extend_from_slice(&proof.msgs);
        out.extend_from_slice(&proof.commitment);
    }
    out
}

/// Decode and length-validate a signature.
pub(crate) fn deserialize(
    params: &Params,
    bytes: &[u8],
) -> Result<(Signature, ChallengeLists), VerifyError> {
    let d = params.digest_size;
    let io = params.io_size();
    let view = params.view_size();
    let last = (params.num_parties - 1) as u16;

    if bytes.len() < d + SALT_SIZE {
        return Err(VerifyError::MalformedSize);
    }
    let challenge = bytes[..d].to_vec();
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&bytes[d..d + SALT_SIZE]);

    let lists = expand_challenge(params, &challenge);

    // Every length is recomputed, never trusted from the wire.
    let iseed_len = SeedTree::reveal_size(params.num_rounds, &lists.c, params)
        .ok_or(VerifyError::MalformedSize)?;
    let missing = lists.missing_rounds(params.num_rounds);
    let cv_len = MerkleTree::open_size(params.num_rounds, &missing, params)
        .ok_or(VerifyError::MalformedSize)?;
    // One hidden leaf in a power-of-two party tree always reveals the same
    // number of seeds, so one representative hide list sizes every proof.
    let seed_info_len = SeedTree::reveal_size(params.num_parties, &[0], params)
        .ok_or(VerifyError::MalformedSize)?;

    let mut required = d + SALT_SIZE + iseed_len + cv_len;
    for &u in &lists.p {
        required += seed_info_len + io + view + d;
        if u != last {
            required += view;
        }
    }
    if bytes.len() != required {
        return Err(VerifyError::MalformedSize);
    }

    let mut off = d + SALT_SIZE;
    let iseed_info = bytes[off..off + iseed_len].to_vec();
    off += iseed_len;
    let cv_info = bytes[off..off + cv_len].to_vec();
    off += cv_len;

    let mut proofs: Vec<Option<RoundProof>> = vec![None; params.num_rounds];
    for t in 0..params.num_rounds as u16 {
        let Some(u) = lists.unopened_for(t) else {
            continue;
        };

        let seed_info = bytes[off..off + seed_info_len].to_vec();
        off += seed_info_len;

        let aux = if u != last {
            let aux = bytes[off..off + view].to_vec();
            off += view;
            if !are_padding_bits_zero(&aux, params.view_bits()) {
                return Err(VerifyError::MalformedPadding);
            }
            Some(aux)
        } else {
            None
        };

        let input = bytes[off..off + io].to_vec();
        off += io;
        if !are_padding_bits_zero(&input, params.state_bits) {
            return Err(VerifyError::MalformedPadding);
        }

        let msgs = bytes[off..off + view].to_vec();
        off += view;
        if !are_padding_bits_zero(&msgs, params.view_bits()) {
            return Err(VerifyError::MalformedPadding);
        }

        let commitment = bytes[off..off + d].to_vec();
        off += d;

        proofs[t as usize] = Some(RoundProof {
            seed_info,
            aux,
            input,
            msgs,
            commitment,
            unopened: u,
        });
    }
    debug_assert_eq!(off, bytes.len());

    Ok((
        Signature {
            challenge,
            salt,
            iseed_info,
            cv_info,
            proofs,
        },
        lists,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign;
    use picnic3_core::Params;
    use picnic3_lowmc::{encrypt, BitVec, LowmcInstance};

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

    fn keypair(inst: &LowmcInstance, params: &Params) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let sk = vec![0x2B, 0x01];
        let pt = vec![0x9C, 0x00];
        let pk = encrypt(
            inst,
            &BitVec::from_bytes(&sk, params.state_bits),
            &BitVec::from_bytes(&pt, params.state_bits),
        )
        .to_bytes(params.io_size());
        (sk, pt, pk)
    }

    #[test]
    fn decode_then_encode_is_identity() {
        let params = SMALL;
        let inst = LowmcInstance::derive(&params);
        let (sk, pt, pk) = keypair(&inst, &params);
        let bytes = sign::sign(&params, &inst, &sk, &pk, &pt, b"roundtrip").unwrap();

        let (sig, _) = deserialize(&params, &bytes).unwrap();
        assert_eq!(serialize(&params, &sig), bytes);
    }

    #[test]
    fn aux_is_present_iff_unopened_is_not_last() {
        let params = SMALL;
        let inst = LowmcInstance::derive(&params);
        let (sk, pt, pk) = keypair(&inst, &params);
        let bytes = sign::sign(&params, &inst, &sk, &pk, &pt, b"aux-shape").unwrap();

        let (sig, lists) = deserialize(&params, &bytes).unwrap();
        let last = (params.num_parties - 1) as u16;
        for (i, &t) in lists.c.iter().enumerate() {
            let proof = sig.proofs[t as usize].as_ref().unwrap();
            assert_eq!(proof.unopened, lists.p[i]);
            assert_eq!(proof.aux.is_some(), lists.p[i] != last);
        }
        // Unopened rounds carry no proof.
        for t in lists.missing_rounds(params.num_rounds) {
            assert!(sig.proofs[t as usize].is_none());
        }
    }

    #[test]
    fn truncation_is_a_size_error() {
        let params = SMALL;
        let inst = LowmcInstance::derive(&params);
        let (sk, pt, pk) = keypair(&inst, &params);
        let bytes = sign::sign(&params, &inst, &sk, &pk, &pt, b"short").unwrap();

        assert!(matches!(
            deserialize(&params, &bytes[..bytes.len() - 1]),
            Err(VerifyError::MalformedSize)
        ));
        let mut extended = bytes;
        extended.push(0);
        assert!(matches!(
            deserialize(&params, &extended),
            Err(VerifyError::MalformedSize)
        ));
    }

    #[test]
    fn nonzero_padding_is_rejected() {
        let params = SMALL;
        let inst = LowmcInstance::derive(&params);
        let (sk, pt, pk) = keypair(&inst, &params);
        let bytes = sign::sign(&params, &inst, &sk, &pk, &pt, b"padding").unwrap();
        let (sig, lists) = deserialize(&params, &bytes).unwrap();

        // Locate the first opened round's input field and set a padding bit.
        let first_open = (0..params.num_rounds as u16)
            .find(|&t| lists.unopened_for(t).is_some())
            .unwrap();
        let u = lists.unopened_for(first_open).unwrap();
        let mut off = params.digest_size + SALT_SIZE + sig.iseed_info.len() + sig.cv_info.len();
        off += sig.proofs[first_open as usize]
            .as_ref()
            .unwrap()
            .seed_info
            .len();
        if u != (params.num_parties - 1) as u16 {
            off += params.view_size();
        }
        // Highest bit of the input's last byte is padding (9 bits in 2 bytes).
        let mut tampered = bytes;
        tampered[off + params.io_size() - 1] |= 0x80;
        assert!(matches!(
            deserialize(&params, &tampered),
            Err(VerifyError::MalformedPadding)
        ));
    }
}
