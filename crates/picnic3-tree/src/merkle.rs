//! Salted Merkle tree over commitment digests.
//!
//! The signer commits to all `T` leaves and opens the subset the verifier
//! cannot recompute; the verifier installs those nodes, fills in the leaves
//! it derived itself, and recomputes the root bottom-up.

use picnic3_core::Params;
use picnic3_hash::{HashCtx, HASH_PREFIX_3};

use crate::shape::TreeShape;
use crate::TreeError;

/// A (possibly partial) Merkle tree; the root is node 0.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    shape: TreeShape,
    fertile: Vec<bool>,
    digest_size: usize,
    nodes: Vec<u8>,
    have: Vec<bool>,
}

impl MerkleTree {
    /// Allocate an empty tree (verification side).
    #[must_use]
    pub fn new(num_leaves: usize, params: &Params) -> Self {
        let shape = TreeShape::new(num_leaves);
        let fertile = shape.fertile();
        let num_nodes = shape.num_nodes;
        Self {
            shape,
            fertile,
            digest_size: params.digest_size,
            nodes: vec![0u8; num_nodes * params.digest_size],
            have: vec![false; num_nodes],
        }
    }

    /// Build the full tree over `leaf_hashes` (signing side).
    #[must_use]
    pub fn build(leaf_hashes: &[Vec<u8>], salt: &[u8], params: &Params) -> Self {
        let mut tree = Self::new(leaf_hashes.len(), params);
        let d = tree.digest_size;
        for (i, h) in leaf_hashes.iter().enumerate() {
            let node = tree.shape.leaf_node(i);
            tree.nodes[node * d..(node + 1) * d].copy_from_slice(h);
            tree.have[node] = true;
        }
        for i in (0..tree.shape.first_leaf).rev() {
            tree.compute_parent(i, salt);
        }
        debug_assert!(tree.have[0]);
        tree
    }

    /// The root digest. Only meaningful once the tree is complete.
    #[must_use]
    pub fn root(&self) -> &[u8] {
        &self.nodes[..self.digest_size]
    }

    /// Hash node `i` from its children, if they are available.
    ///
    /// A child subtree without leaves never carries a value and is skipped;
    /// a fertile child that is still missing blocks the computation.
    fn compute_parent(&mut self, i: usize, salt: &[u8]) -> bool {
        let l = TreeShape::left(i);
        let d = self.digest_size;
        if !self.shape.exists(l) || !self.fertile[i] {
            return false;
        }
        // A fertile parent always has a fertile left child in this layout.
        debug_assert!(self.fertile[l]);
        if !self.have[l] {
            return false;
        }
        let r = l + 1;
        let absorb_right = self.shape.exists(r) && self.fertile[r];
        if absorb_right && !self.have[r] {
            return false;
        }

        let mut ctx = HashCtx::with_prefix(d, HASH_PREFIX_3);
        ctx.update(salt);
        ctx.update(&self.nodes[l * d..(l + 1) * d]);
        if absorb_right {
            ctx.update(&self.nodes[r * d..(r + 1) * d]);
        }
        ctx.update_u16_le(i as u16);
        let digest = ctx.finalize().squeeze_vec(d);
        self.nodes[i * d..(i + 1) * d].copy_from_slice(&digest);
        self.have[i] = true;
        true
    }

    /// Nodes a verifier holding every leaf *except* `missing` cannot derive:
    /// the maximal subtrees whose leaves are all missing. Depth-first
    /// pre-order (left before right), so both sides serialize identically.
    fn needed_nodes(
        shape: &TreeShape,
        fertile: &[bool],
        missing: &[u16],
    ) -> Option<Vec<usize>> {
        let mut known = vec![true; shape.num_leaves];
        for &m in missing {
            if m as usize >= shape.num_leaves {
                return None;
            }
            known[m as usize] = false;
        }

        // derivable[i]: every leaf below i is known; has_known[i]: some is.
        let mut derivable = vec![false; shape.num_nodes];
        let mut has_known = vec![false; shape.num_nodes];
        for i in (0..shape.num_nodes).rev() {
            if shape.is_leaf(i) {
                derivable[i] = known[i - shape.first_leaf];
                has_known[i] = derivable[i];
            } else if fertile[i] {
                let l = TreeShape::left(i);
                let mut all = true;
                let mut any = false;
                for c in [l, l + 1] {
                    if shape.exists(c) && fertile[c] {
                        all &= derivable[c];
                        any |= has_known[c];
                    }
                }
                derivable[i] = all;
                has_known[i] = any;
            }
        }

        let mut out = Vec::new();
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            if !fertile[i] || derivable[i] {
                continue;
            }
            if !has_known[i] {
                out.push(i);
                continue;
            }
            let l = TreeShape::left(i);
            if shape.exists(l + 1) {
                stack.push(l + 1);
            }
            stack.push(l);
        }
        Some(out)
    }

    /// Byte size of an opening for the given geometry (`None` on a malformed
    /// missing list, mirroring the reference `SIZE_MAX`).
    #[must_use]
    pub fn open_size(num_leaves: usize, missing: &[u16], params: &Params) -> Option<usize> {
        let shape = TreeShape::new(num_leaves);
        let fertile = shape.fertile();
        Self::needed_nodes(&shape, &fertile, missing).map(|n| n.len() * params.digest_size)
    }

    /// Serialize the opening covering `missing` (signing side).
    #[must_use]
    pub fn open(&self, missing: &[u16]) -> Option<Vec<u8>> {
        let nodes = Self::needed_nodes(&self.shape, &self.fertile, missing)?;
        let d = self.digest_size;
        let mut out = Vec::with_capacity(nodes.len() * d);
        for i in nodes {
            if !self.have[i] {
                return None;
            }
            out.extend_from_slice(&self.nodes[i * d..(i + 1) * d]);
        }
        Some(out)
    }

    /// Install an opening produced by [`MerkleTree::open`].
    ///
    /// # Errors
    /// [`TreeError::BadLeafIndex`], [`TreeError::OpeningSize`], or
    /// [`TreeError::NodeConflict`] when a slot is already occupied.
    pub fn add_nodes(&mut self, missing: &[u16], data: &[u8]) -> Result<(), TreeError> {
        let nodes = Self::needed_nodes(&self.shape, &self.fertile, missing)
            .ok_or(TreeError::BadLeafIndex)?;
        let d = self.digest_size;
        if data.len() != nodes.len() * d {
            return Err(TreeError::OpeningSize);
        }
        for (chunk, &i) in data.chunks_exact(d).zip(nodes.iter()) {
            if self.have[i] {
                return Err(TreeError::NodeConflict);
            }
            self.nodes[i * d..(i + 1) * d].copy_from_slice(chunk);
            self.have[i] = true;
        }
        Ok(())
    }

    /// Install the derived leaves and recompute every reachable node.
    ///
    /// # Errors
    /// [`TreeError::NodeConflict`] if a leaf slot is already occupied and
    /// [`TreeError::Incomplete`] if the root stays underivable.
    pub fn verify(
        &mut self,
        leaf_hashes: &[Option<Vec<u8>>],
        salt: &[u8],
    ) -> Result<(), TreeError> {
        debug_assert_eq!(leaf_hashes.len(), self.shape.num_leaves);
        let d = self.digest_size;
        for (i, leaf) in leaf_hashes.iter().enumerate() {
            if let Some(h) = leaf {
                let node = self.shape.leaf_node(i);
                if self.have[node] {
                    return Err(TreeError::NodeConflict);
                }
                self.nodes[node * d..(node + 1) * d].copy_from_slice(h);
                self.have[node] = true;
            }
        }
        for i in (0..self.shape.first_leaf).rev() {
            if !self.have[i] {
                self.compute_parent(i, salt);
            }
        }
        if self.have[0] {
            Ok(())
        } else {
            Err(TreeError::Incomplete)
        }
    }
}
