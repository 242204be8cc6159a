//! Critical pairs (spec §3 "SPair").

use crate::hashtable::MonomId;

#[derive(Clone, Debug)]
pub struct SPair {
    pub poly1: usize,
    pub poly2: usize,
    /// `None` marks a pair pruned by Gebauer–Möller (spec §3: "an lcm of 0
    /// marks a pair to be discarded"; we use `Option` instead of a sentinel
    /// id, since monomial id `0` is otherwise a perfectly ordinary id here).
    pub lcm: Option<MonomId>,
    pub deg: u32,
}

impl SPair {
    pub fn is_live(&self) -> bool {
        self.lcm.is_some()
    }
}

#[derive(Default)]
pub struct Pairset {
    pairs: Vec<SPair>,
}

impl Pairset {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn push(&mut self, pair: SPair) {
        self.pairs.push(pair);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.iter().all(|p| !p.is_live())
    }

    pub fn len(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_live()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SPair> {
        self.pairs.iter().filter(|p| p.is_live())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SPair> {
        self.pairs.iter_mut()
    }

    /// Drop every pair with `lcm == None` (spec §4.3: "compact the pairset
    /// afterwards").
    pub fn compact(&mut self) {
        self.pairs.retain(SPair::is_live);
    }

    /// Remove and return the pairs at `indices` (already-live indices into
    /// the compacted pairset), used by critical-pair selection to take a
    /// degree block out of circulation (spec §4.4: "the block is removed
    /// from the pairset").
    pub fn take(&mut self, mut indices: Vec<usize>) -> Vec<SPair> {
        indices.sort_unstable_by(|a, b| b.cmp(a));
        let mut taken = Vec::with_capacity(indices.len());
        for idx in indices {
            taken.push(self.pairs.remove(idx));
        }
        taken.reverse();
        taken
    }

    pub fn live_pairs(&self) -> Vec<SPair> {
        self.pairs.iter().filter(|p| p.is_live()).cloned().collect()
    }

    pub fn set_pairs(&mut self, pairs: Vec<SPair>) {
        self.pairs = pairs;
    }
}
