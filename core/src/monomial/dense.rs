//! Dense exponent-vector monomial (spec §3: "Dense exponent vectors support
//! lex, deglex, degrevlex, and product/weighted orderings").

use groebner_field::exponent::{checked_add, checked_total_degree, is_divisible, sub_assume_ge, ExponentOverflow};

use super::{divmask::DivMap, linear_hash, Monomial, MonomialOrdering};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DenseMonomial {
    exps: Vec<u32>,
    deg: u32,
}

impl DenseMonomial {
    pub fn exps_slice(&self) -> &[u32] {
        &self.exps
    }
}

impl Monomial for DenseMonomial {
    fn from_exponents(exps: &[u32]) -> Result<Self, ExponentOverflow> {
        let deg = checked_total_degree(exps)?;
        Ok(Self {
            exps: exps.to_vec(),
            deg,
        })
    }

    fn nvars(&self) -> usize {
        self.exps.len()
    }

    fn exponents(&self) -> Vec<u32> {
        self.exps.clone()
    }

    fn totaldeg(&self) -> u32 {
        self.deg
    }

    fn product(&self, other: &Self) -> Result<Self, ExponentOverflow> {
        debug_assert_eq!(self.exps.len(), other.exps.len());
        let mut exps = Vec::with_capacity(self.exps.len());
        for (&a, &b) in self.exps.iter().zip(&other.exps) {
            exps.push(checked_add(a, b)?);
        }
        let deg = checked_add(self.deg, other.deg)?;
        Ok(Self { exps, deg })
    }

    fn quotient(&self, other: &Self) -> Self {
        let exps: Vec<u32> = self
            .exps
            .iter()
            .zip(&other.exps)
            .map(|(&a, &b)| sub_assume_ge(a, b))
            .collect();
        let deg = sub_assume_ge(self.deg, other.deg);
        Self { exps, deg }
    }

    fn lcm(&self, other: &Self) -> Result<Self, ExponentOverflow> {
        let exps: Vec<u32> = self
            .exps
            .iter()
            .zip(&other.exps)
            .map(|(&a, &b)| a.max(b))
            .collect();
        let deg = checked_total_degree(&exps)?;
        Ok(Self { exps, deg })
    }

    fn is_divisible(&self, other: &Self) -> bool {
        is_divisible(&self.exps, &other.exps)
    }

    fn hash(&self, hash_vector: &[u64]) -> u64 {
        linear_hash(&self.exps, hash_vector)
    }

    fn isless(&self, other: &Self, ordering: &MonomialOrdering) -> core::cmp::Ordering {
        ordering.compare(&self.exps, &other.exps, self.deg, other.deg)
    }

    fn create_divmask(&self, divmap: &DivMap) -> u32 {
        divmap.compute(&self.exps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_and_quotient_roundtrip() {
        let a = DenseMonomial::from_exponents(&[1, 2, 0]).unwrap();
        let b = DenseMonomial::from_exponents(&[0, 1, 3]).unwrap();
        let p = a.product(&b).unwrap();
        assert_eq!(p.exponents(), vec![1, 3, 3]);
        assert_eq!(p.quotient(&a).exponents(), vec![0, 1, 3]);
    }

    #[test]
    fn lcm_is_componentwise_max() {
        let a = DenseMonomial::from_exponents(&[3, 0]).unwrap();
        let b = DenseMonomial::from_exponents(&[1, 5]).unwrap();
        assert_eq!(a.lcm(&b).unwrap().exponents(), vec![3, 5]);
    }

    #[test]
    fn overflow_is_detected() {
        let big = u32::MAX;
        assert!(DenseMonomial::from_exponents(&[big, big]).is_err());
    }

    #[test]
    fn hash_is_additive_over_product() {
        let hv = [3u64, 7, 11];
        let a = DenseMonomial::from_exponents(&[1, 2, 0]).unwrap();
        let b = DenseMonomial::from_exponents(&[0, 1, 3]).unwrap();
        let p = a.product(&b).unwrap();
        assert_eq!(p.hash(&hv), a.hash(&hv).wrapping_add(b.hash(&hv)));
    }
}
