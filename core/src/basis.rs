//! The basis (spec §3 "Basis"): polynomials as parallel vectors of
//! `(MonomId list, coefficient list)`, plus redundancy bookkeeping.
//!
//! Only the `nfilled`/`nprocessed`/`nnonredundant` model is implemented
//! (spec §9 Open Question: the source's older `ndone/ntotal/nlead` duplicate
//! is deliberately not reproduced).

use groebner_field::types::Field;

use crate::hashtable::MonomId;

pub struct Basis<F: Field> {
    monoms: Vec<Vec<MonomId>>,
    coeffs: Vec<Vec<F>>,
    is_redundant: Vec<bool>,
    /// Indices (into `monoms`/`coeffs`) of currently non-redundant elements.
    nonredundant: Vec<usize>,
    /// Leading-term divmask of the k-th non-redundant polynomial, a cache
    /// copy kept parallel to `nonredundant` for locality (spec §3).
    divmasks: Vec<u32>,
    /// How many of `monoms`/`coeffs` have already gone through `update`
    /// (spec §4.3: "polynomials added [nprocessed+1 .. nfilled]").
    pub nprocessed: usize,
}

impl<F: Field> Basis<F> {
    pub fn new() -> Self {
        Self {
            monoms: Vec::new(),
            coeffs: Vec::new(),
            is_redundant: Vec::new(),
            nonredundant: Vec::new(),
            divmasks: Vec::new(),
            nprocessed: 0,
        }
    }

    /// `nfilled`: total number of polynomials ever added, including
    /// redundant ones.
    pub fn nfilled(&self) -> usize {
        self.monoms.len()
    }

    pub fn nnonredundant(&self) -> usize {
        self.nonredundant.len()
    }

    pub fn nonredundant_indices(&self) -> &[usize] {
        &self.nonredundant
    }

    pub fn divmask_of_nonredundant(&self, k: usize) -> u32 {
        self.divmasks[k]
    }

    pub fn is_redundant(&self, i: usize) -> bool {
        self.is_redundant[i]
    }

    pub fn mark_redundant(&mut self, i: usize) {
        self.is_redundant[i] = true;
    }

    pub fn monoms(&self, i: usize) -> &[MonomId] {
        &self.monoms[i]
    }

    pub fn coeffs(&self, i: usize) -> &[F] {
        &self.coeffs[i]
    }

    pub fn leading_monom(&self, i: usize) -> MonomId {
        self.monoms[i][0]
    }

    pub fn leading_coeff(&self, i: usize) -> F {
        self.coeffs[i][0]
    }

    pub fn len_of(&self, i: usize) -> usize {
        self.monoms[i].len()
    }

    /// Append a new polynomial, returning its index. `monoms[0]` must be the
    /// leading term; `monoms.len() == coeffs.len()` (spec §3 invariant).
    pub fn push(&mut self, monoms: Vec<MonomId>, coeffs: Vec<F>) -> usize {
        assert_eq!(monoms.len(), coeffs.len());
        assert!(!monoms.is_empty(), "zero polynomial cannot enter the basis");
        let idx = self.monoms.len();
        self.monoms.push(monoms);
        self.coeffs.push(coeffs);
        self.is_redundant.push(false);
        idx
    }

    /// Mark `i` as a currently non-redundant generator, caching its leading
    /// divmask.
    pub fn register_nonredundant(&mut self, i: usize, divmask: u32) {
        self.nonredundant.push(i);
        self.divmasks.push(divmask);
    }

    /// Make polynomial `i` monic: divide every coefficient by the leading
    /// coefficient (spec §4.8: "polynomials are made monic").
    pub fn make_monic(&mut self, i: usize) {
        let lead = self.coeffs[i][0];
        if lead == F::one(lead.modulus()) {
            return;
        }
        let inv = lead.inverse().expect("leading coefficient of a basis polynomial cannot be zero");
        for c in &mut self.coeffs[i] {
            *c = c.mul(inv);
        }
    }

    /// Re-check every currently non-redundant generator against every other
    /// one (spec §4.8 postprocessing "sweep redundant elements"): catches
    /// redundancies that can be missed incrementally, e.g. a generator whose
    /// lead only becomes divisible once a *later* generator's lead is itself
    /// recognized as non-redundant.
    pub fn sweep<M: crate::monomial::Monomial>(&mut self, ht: &crate::hashtable::MonomialHashtable<M>) {
        let candidates = self.nonredundant.clone();
        for &i in &candidates {
            if self.is_redundant[i] {
                continue;
            }
            let lm_i = self.monoms[i][0];
            for &j in &candidates {
                if i == j || self.is_redundant[j] {
                    continue;
                }
                let lm_j = self.monoms[j][0];
                if lm_i != lm_j && ht.get(lm_i).is_divisible(ht.get(lm_j)) {
                    self.is_redundant[i] = true;
                    break;
                }
            }
        }
    }

    /// Drop redundant entries and compact the survivors to contiguous
    /// indices `0..k`, sorted ascending by leading monomial (spec §4.8
    /// "Standardize").
    pub fn standardize<M: crate::monomial::Monomial>(&mut self, ht: &crate::hashtable::MonomialHashtable<M>) {
        let mut order: Vec<usize> = self
            .nonredundant
            .iter()
            .copied()
            .filter(|&i| !self.is_redundant[i])
            .collect();
        order.sort_by(|&a, &b| ht.isless(self.monoms[a][0], self.monoms[b][0]));

        let mut new_monoms = Vec::with_capacity(order.len());
        let mut new_coeffs = Vec::with_capacity(order.len());
        for &i in &order {
            new_monoms.push(core::mem::take(&mut self.monoms[i]));
            new_coeffs.push(core::mem::take(&mut self.coeffs[i]));
        }
        self.monoms = new_monoms;
        self.coeffs = new_coeffs;
        self.is_redundant = vec![false; order.len()];
        self.nonredundant = (0..order.len()).collect();
        self.divmasks = self
            .monoms
            .iter()
            .map(|m| ht.hashvalue(m[0]).divmask)
            .collect();
        self.nprocessed = self.monoms.len();
    }

    pub fn iter_nonredundant(&self) -> impl Iterator<Item = usize> + '_ {
        self.nonredundant.iter().copied()
    }
}

impl<F: Field> Default for Basis<F> {
    fn default() -> Self {
        Self::new()
    }
}
