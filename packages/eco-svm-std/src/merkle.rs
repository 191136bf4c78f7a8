//! Binary Merkle tree over [`Bytes32`] leaves.
//!
//! Pairs are hashed sorted, `keccak(min(a, b) ‖ max(a, b))`, and odd layers are padded
//! with the zero hash, so a proof is just the list of siblings from leaf to root.

use anchor_lang::prelude::*;
use derive_more::Deref;

use crate::{keccak, Bytes32};

#[derive(AnchorSerialize, AnchorDeserialize, Deref, Clone, Debug, Default, PartialEq, Eq)]
pub struct MerkleProof(Vec<Bytes32>);

impl From<Vec<Bytes32>> for MerkleProof {
    fn from(siblings: Vec<Bytes32>) -> Self {
        Self(siblings)
    }
}

impl MerkleProof {
    pub fn compute_root(&self, leaf: &Bytes32) -> Bytes32 {
        self.0
            .iter()
            .fold(*leaf, |node, sibling| hash_pair(&node, sibling))
    }

    pub fn verify(&self, root: &Bytes32, leaf: &Bytes32) -> bool {
        self.compute_root(leaf) == *root
    }
}

#[derive(Debug, Clone)]
pub struct MerkleTree {
    layers: Vec<Vec<Bytes32>>,
}

impl MerkleTree {
    pub fn new(leaves: Vec<Bytes32>) -> Self {
        let mut layers = vec![leaves];

        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let next = layer
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&Bytes32::ZERO)))
                .collect();

            layers.push(next);
        }

        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root of the tree; the zero hash for an empty tree.
    pub fn root(&self) -> Bytes32 {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.len() {
            return None;
        }

        let siblings = self.layers[..self.layers.len() - 1]
            .iter()
            .scan(index, |index, layer| {
                let sibling = layer.get(*index ^ 1).copied().unwrap_or_default();
                *index /= 2;

                Some(sibling)
            })
            .collect::<Vec<_>>();

        Some(siblings.into())
    }
}

fn hash_pair(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };

    keccak([first.as_ref(), second.as_ref()])
}
