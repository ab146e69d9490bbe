//! Tape engine: expand per-party seeds into random tapes and run the
//! offline phase that fixes the multiplication masks.

use picnic3_core::{Params, RandomTape};
use picnic3_hash::HashCtx4;
use picnic3_lowmc::{compute_aux, BitVec, LowmcInstance};
use picnic3_tree::SeedTree;

/// Expand all `N` party tapes for round `t`, four lanes at a time.
///
/// Each lane absorbs its seed, then the shared salt, the round index, and
/// its own party index (both u16 LE). A missing leaf (the unopened party
/// during verification) contributes an all-zero seed; that party's tape is
/// never used.
pub(crate) fn create_random_tapes(
    params: &Params,
    seeds: &SeedTree,
    salt: &[u8],
    t: u16,
) -> RandomTape {
    debug_assert_eq!(params.num_parties % 4, 0);
    let mut tapes = RandomTape::new(params);
    let zero_seed = vec![0u8; params.seed_size];

    for i in (0..params.num_parties).step_by(4) {
        let mut ctx = HashCtx4::new(params.digest_size);
        let lane_seed = |k: usize| seeds.leaf(i + k).unwrap_or(&zero_seed);
        ctx.update4([lane_seed(0), lane_seed(1), lane_seed(2), lane_seed(3)]);
        ctx.update_all(salt);
        ctx.update_u16_le_all(t);
        ctx.update_u16s_le([i as u16, (i + 1) as u16, (i + 2) as u16, (i + 3) as u16]);

        let readers = ctx.finalize4();
        for (lane, mut rdr) in readers.into_iter().enumerate() {
            rdr.squeeze(&mut tapes.tapes[i + lane]);
        }
    }
    tapes
}

/// Offline phase for one round.
///
/// XOR-reduces the tapes, interprets the first `io_size` bytes as the plain
/// key mask, lets LowMC fix the last party's helper bits, optionally emits
/// the key mask into `input_masks`, and rewinds the online cursor so the
/// simulation replays the very same bits.
pub(crate) fn compute_aux_tape(
    params: &Params,
    inst: &LowmcInstance,
    tapes: &mut RandomTape,
    input_masks: Option<&mut [u8]>,
) {
    tapes.accumulate_parity();
    let key_mask = BitVec::from_bytes(&tapes.parity[..params.io_size()], params.state_bits);

    tapes.pos = params.state_bits;
    tapes.aux_pos = 0;
    tapes.aux_bits.iter_mut().for_each(|b| *b = 0);

    compute_aux(inst, &key_mask, tapes, params);

    if let Some(out) = input_masks {
        out.copy_from_slice(&key_mask.to_bytes(params.io_size()));
    }
    tapes.pos = 0;
}
