//! GGM seed tree: expand a root seed into per-leaf seeds, then reveal every
//! leaf except a hidden few by publishing a logarithmic frontier of inner
//! seeds.

use picnic3_core::Params;
use picnic3_hash::{HashCtx, HASH_PREFIX_1};

use crate::shape::TreeShape;
use crate::TreeError;

/// A (possibly punctured) seed tree.
#[derive(Clone, Debug)]
pub struct SeedTree {
    shape: TreeShape,
    seed_size: usize,
    nodes: Vec<u8>,
    have: Vec<bool>,
}

impl SeedTree {
    fn empty(num_leaves: usize, seed_size: usize) -> Self {
        let shape = TreeShape::new(num_leaves);
        let num_nodes = shape.num_nodes;
        Self {
            shape,
            seed_size,
            nodes: vec![0u8; num_nodes * seed_size],
            have: vec![false; num_nodes],
        }
    }

    /// Expand `root_seed` into `num_leaves` leaf seeds.
    ///
    /// `rep` is the repetition index bound into every derivation (0 for the
    /// initial-seeds tree, the round index for per-round trees).
    #[must_use]
    pub fn generate(
        num_leaves: usize,
        root_seed: &[u8],
        salt: &[u8],
        rep: u16,
        params: &Params,
    ) -> Self {
        let mut tree = Self::empty(num_leaves, params.seed_size);
        tree.nodes[..tree.seed_size].copy_from_slice(root_seed);
        tree.have[0] = true;
        tree.expand(salt, rep, params);
        tree
    }

    /// Derive children for every present node, top-down.
    fn expand(&mut self, salt: &[u8], rep: u16, params: &Params) {
        let s = self.seed_size;
        for i in 0..self.shape.num_nodes {
            let l = TreeShape::left(i);
            if !self.have[i] || !self.shape.exists(l) {
                continue;
            }
            let mut ctx = HashCtx::with_prefix(params.digest_size, HASH_PREFIX_1);
            ctx.update(&self.nodes[i * s..(i + 1) * s]);
            ctx.update(salt);
            ctx.update_u16_le(rep);
            ctx.update_u16_le(i as u16);
            let mut rdr = ctx.finalize();
            let pair = rdr.squeeze_vec(2 * s);

            self.nodes[l * s..(l + 1) * s].copy_from_slice(&pair[..s]);
            self.have[l] = true;
            if self.shape.exists(l + 1) {
                self.nodes[(l + 1) * s..(l + 2) * s].copy_from_slice(&pair[s..]);
                self.have[l + 1] = true;
            }
        }
    }

    /// Seed of leaf `i`, or `None` if it was punctured away.
    #[must_use]
    pub fn leaf(&self, i: usize) -> Option<&[u8]> {
        let node = self.shape.leaf_node(i);
        if self.have[node] {
            let s = self.seed_size;
            Some(&self.nodes[node * s..(node + 1) * s])
        } else {
            None
        }
    }

    /// The nodes a reveal publishes: every node that is off every hidden
    /// path, whose parent is on one, and whose subtree actually holds leaves.
    /// Increasing node index, so both sides agree on the order.
    fn revealed_nodes(shape: &TreeShape, hide: &[u16]) -> Option<Vec<usize>> {
        if hide.is_empty() {
            // Nothing hidden: the root alone reveals everything.
            return Some(vec![0]);
        }
        let marked = shape.mark_paths(hide)?;
        let fertile = shape.fertile();
        Some(
            (1..shape.num_nodes)
                .filter(|&i| !marked[i] && marked[TreeShape::parent(i)] && fertile[i])
                .collect(),
        )
    }

    /// Byte size of a reveal for the given geometry, without any seeds.
    ///
    /// `None` mirrors the reference `SIZE_MAX`: the hide list is malformed.
    #[must_use]
    pub fn reveal_size(num_leaves: usize, hide: &[u16], params: &Params) -> Option<usize> {
        let shape = TreeShape::new(num_leaves);
        Self::revealed_nodes(&shape, hide).map(|nodes| nodes.len() * params.seed_size)
    }

    /// Serialize the seeds revealing every leaf not in `hide`.
    #[must_use]
    pub fn reveal(&self, hide: &[u16]) -> Option<Vec<u8>> {
        let nodes = Self::revealed_nodes(&self.shape, hide)?;
        let s = self.seed_size;
        let mut out = Vec::with_capacity(nodes.len() * s);
        for i in nodes {
            if !self.have[i] {
                return None;
            }
            out.extend_from_slice(&self.nodes[i * s..(i + 1) * s]);
        }
        Some(out)
    }

    /// Rebuild a punctured tree from a reveal.
    ///
    /// Yields every leaf except the hidden ones; the hidden leaves stay
    /// unavailable.
    ///
    /// # Errors
    /// [`TreeError::BadLeafIndex`] for malformed hide lists and
    /// [`TreeError::OpeningSize`] when `data` is not exactly the computed
    /// reveal size.
    pub fn reconstruct(
        num_leaves: usize,
        hide: &[u16],
        data: &[u8],
        salt: &[u8],
        rep: u16,
        params: &Params,
    ) -> Result<Self, TreeError> {
        let mut tree = Self::empty(num_leaves, params.seed_size);
        let nodes =
            Self::revealed_nodes(&tree.shape, hide).ok_or(TreeError::BadLeafIndex)?;
        let s = tree.seed_size;
        if data.len() != nodes.len() * s {
            return Err(TreeError::OpeningSize);
        }
        for (chunk, &i) in data.chunks_exact(s).zip(nodes.iter()) {
            tree.nodes[i * s..(i + 1) * s].copy_from_slice(chunk);
            tree.have[i] = true;
        }
        tree.expand(salt, rep, params);
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picnic3_core::PICNIC3_L1;

    fn params() -> Params {
        PICNIC3_L1
    }

    #[test]
    fn reveal_then_reconstruct_recovers_all_but_hidden() {
        let p = params();
        let salt = [7u8; 32];
        let root = [1u8; 16];
        for (leaves, hide) in [
            (16usize, vec![3u16]),
            (16, vec![0, 15, 7]),
            (250, vec![0, 1, 249, 100]),
            (19, vec![5]),
        ] {
            let tree = SeedTree::generate(leaves, &root, &salt, 4, &p);
            let blob = tree.reveal(&hide).unwrap();
            assert_eq!(
                blob.len(),
                SeedTree::reveal_size(leaves, &hide, &p).unwrap()
            );

            let rec = SeedTree::reconstruct(leaves, &hide, &blob, &salt, 4, &p).unwrap();
            for i in 0..leaves {
                if hide.contains(&(i as u16)) {
                    assert!(rec.leaf(i).is_none(), "hidden leaf {i} must stay hidden");
                } else {
                    assert_eq!(rec.leaf(i), tree.leaf(i), "leaf {i} must survive");
                }
            }
        }
    }

    #[test]
    fn out_of_range_hide_is_rejected() {
        let p = params();
        assert_eq!(SeedTree::reveal_size(16, &[16], &p), None);
        assert!(matches!(
            SeedTree::reconstruct(16, &[16], &[], &[0u8; 32], 0, &p),
            Err(TreeError::BadLeafIndex)
        ));
    }

    #[test]
    fn wrong_opening_length_is_rejected() {
        let p = params();
        let salt = [0u8; 32];
        let tree = SeedTree::generate(16, &[9u8; 16], &salt, 0, &p);
        let mut blob = tree.reveal(&[2]).unwrap();
        blob.pop();
        assert!(matches!(
            SeedTree::reconstruct(16, &[2], &blob, &salt, 0, &p),
            Err(TreeError::OpeningSize)
        ));
    }

    #[test]
    fn distinct_repetitions_give_distinct_leaves() {
        let p = params();
        let salt = [0u8; 32];
        let a = SeedTree::generate(16, &[9u8; 16], &salt, 0, &p);
        let b = SeedTree::generate(16, &[9u8; 16], &salt, 1, &p);
        assert_ne!(a.leaf(0), b.leaf(0));
    }

    #[test]
    fn single_hidden_leaf_reveal_is_log_sized() {
        let p = params();
        // Power-of-two leaf count: one hidden leaf costs exactly log2(N) seeds.
        let size = SeedTree::reveal_size(16, &[11], &p).unwrap();
        assert_eq!(size, 4 * p.seed_size);
    }
}
