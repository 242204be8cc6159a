//! Sparse exponent vector: `(variable, exponent)` pairs, non-zero exponents
//! only, sorted by variable index. Matches `Options::monoms = sparse` (spec
//! §6) for high-arity inputs where most monomials touch only a handful of
//! the `n` variables.

use groebner_field::exponent::{checked_add, checked_total_degree, ExponentOverflow};

use super::{divmask::DivMap, Monomial, MonomialOrdering};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SparseMonomial {
    nvars: usize,
    terms: Vec<(u32, u32)>, // (var, exponent), sorted by var, exponent != 0
    deg: u32,
}

impl SparseMonomial {
    fn dense(&self) -> Vec<u32> {
        let mut out = vec![0u32; self.nvars];
        for &(v, e) in &self.terms {
            out[v as usize] = e;
        }
        out
    }
}

impl Monomial for SparseMonomial {
    fn from_exponents(exps: &[u32]) -> Result<Self, ExponentOverflow> {
        let deg = checked_total_degree(exps)?;
        let terms = exps
            .iter()
            .enumerate()
            .filter(|&(_, &e)| e != 0)
            .map(|(v, &e)| (v as u32, e))
            .collect();
        Ok(Self {
            nvars: exps.len(),
            terms,
            deg,
        })
    }

    fn nvars(&self) -> usize {
        self.nvars
    }

    fn exponents(&self) -> Vec<u32> {
        self.dense()
    }

    fn totaldeg(&self) -> u32 {
        self.deg
    }

    fn product(&self, other: &Self) -> Result<Self, ExponentOverflow> {
        debug_assert_eq!(self.nvars, other.nvars);
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(self.terms.len() + other.terms.len());
        let (mut i, mut j) = (0, 0);
        while i < self.terms.len() && j < other.terms.len() {
            let (va, ea) = self.terms[i];
            let (vb, eb) = other.terms[j];
            match va.cmp(&vb) {
                core::cmp::Ordering::Less => {
                    merged.push((va, ea));
                    i += 1;
                }
                core::cmp::Ordering::Greater => {
                    merged.push((vb, eb));
                    j += 1;
                }
                core::cmp::Ordering::Equal => {
                    merged.push((va, checked_add(ea, eb)?));
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.terms[i..]);
        merged.extend_from_slice(&other.terms[j..]);
        let deg = checked_add(self.deg, other.deg)?;
        Ok(Self {
            nvars: self.nvars,
            terms: merged,
            deg,
        })
    }

    fn quotient(&self, other: &Self) -> Self {
        let a = self.dense();
        let b = other.dense();
        let exps: Vec<u32> = a
            .iter()
            .zip(&b)
            .map(|(&x, &y)| {
                assert!(x >= y, "sparse exponent underflow: non-divisible quotient");
                x - y
            })
            .collect();
        Self::from_exponents(&exps).expect("quotient of valid monomials cannot overflow")
    }

    fn lcm(&self, other: &Self) -> Result<Self, ExponentOverflow> {
        let a = self.dense();
        let b = other.dense();
        let exps: Vec<u32> = a.iter().zip(&b).map(|(&x, &y)| x.max(y)).collect();
        Self::from_exponents(&exps)
    }

    fn is_divisible(&self, other: &Self) -> bool {
        // Every term of `other` must be present in `self` with >= exponent.
        other.terms.iter().all(|&(v, e)| {
            self.terms
                .binary_search_by_key(&v, |&(sv, _)| sv)
                .map(|idx| self.terms[idx].1 >= e)
                .unwrap_or(false)
        })
    }

    fn hash(&self, hash_vector: &[u64]) -> u64 {
        self.terms.iter().fold(0u64, |acc, &(v, e)| {
            acc.wrapping_add(hash_vector[v as usize].wrapping_mul(e as u64))
        })
    }

    fn isless(&self, other: &Self, ordering: &MonomialOrdering) -> core::cmp::Ordering {
        debug_assert_eq!(self.nvars, other.nvars);
        ordering.compare(&self.dense(), &other.dense(), self.deg, other.deg)
    }

    fn create_divmask(&self, divmap: &DivMap) -> u32 {
        divmap.compute(&self.dense())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_merges_sorted_terms() {
        let a = SparseMonomial::from_exponents(&[1, 0, 3]).unwrap();
        let b = SparseMonomial::from_exponents(&[0, 2, 1]).unwrap();
        let p = a.product(&b).unwrap();
        assert_eq!(p.exponents(), vec![1, 2, 4]);
    }

    #[test]
    fn divisibility() {
        let a = SparseMonomial::from_exponents(&[3, 0, 5]).unwrap();
        let b = SparseMonomial::from_exponents(&[1, 0, 2]).unwrap();
        assert!(a.is_divisible(&b));
        assert!(!b.is_divisible(&a));
    }

    #[test]
    fn hash_additive() {
        let hv = [5u64, 9, 13];
        let a = SparseMonomial::from_exponents(&[1, 0, 3]).unwrap();
        let b = SparseMonomial::from_exponents(&[0, 2, 1]).unwrap();
        let p = a.product(&b).unwrap();
        assert_eq!(p.hash(&hv), a.hash(&hv).wrapping_add(b.hash(&hv)));
    }
}
