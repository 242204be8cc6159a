//! Homogenize / dehomogenize (spec §6 `homogenize` option: "homogenize then
//! dehomogenize for lex-like orderings").
//!
//! Implemented as a mechanical two-pass wrapper around the ordinary engine
//! rather than a new code path inside it: `groebner::groebner` (see `lib.rs`)
//! homogenizes the input, runs the core computation once to get a *homogeneous*
//! Gröbner basis, dehomogenizes that basis's generators back to `nvars`
//! variables, and runs the core computation a second time (with
//! `homogenize` forced off, so this cannot recurse) on the dehomogenized
//! generating set to produce the final reduced basis under the requested
//! ordering. This keeps the hard part of the crate — the F4 engine itself —
//! entirely unaware of homogenization; it only ever sees ordinary input
//! polynomials over some number of variables, one extra for the first pass.

/// Pure exponent/coefficient-merge capability used when dehomogenizing:
/// terms that only differed in the homogenizing variable's exponent can
/// collapse to the same monomial and must have their coefficients summed
/// (and the term dropped if the sum cancels to zero).
pub trait MergeCoeff: Clone {
    fn is_zero_coeff(&self) -> bool;
    fn add_coeff(&self, other: &Self) -> Self;
}

impl MergeCoeff for groebner_field::modulus::Zp {
    fn is_zero_coeff(&self) -> bool {
        groebner_field::types::Field::is_zero(self)
    }
    fn add_coeff(&self, other: &Self) -> Self {
        groebner_field::types::Field::add(*self, *other)
    }
}

impl MergeCoeff for num_rational::BigRational {
    fn is_zero_coeff(&self) -> bool {
        num_traits::Zero::is_zero(self)
    }
    fn add_coeff(&self, other: &Self) -> Self {
        self + other
    }
}

/// Append one homogenizing variable (index `nvars`) to every monomial of one
/// input polynomial, so every term reaches the polynomial's own top total
/// degree.
pub fn homogenize_poly(monoms: &[Vec<u32>]) -> Vec<Vec<u32>> {
    let maxdeg = monoms.iter().map(|m| m.iter().sum::<u32>()).max().unwrap_or(0);
    monoms
        .iter()
        .map(|m| {
            let d: u32 = m.iter().sum();
            let mut padded = m.clone();
            padded.push(maxdeg - d);
            padded
        })
        .collect()
}

/// Substitute the homogenizing variable with `1` (drop its exponent
/// component) and merge terms that become identical, summing coefficients
/// and dropping any that cancel to zero.
pub fn dehomogenize_poly<C: MergeCoeff>(monoms: &[Vec<u32>], coeffs: &[C]) -> (Vec<Vec<u32>>, Vec<C>) {
    let mut merged: Vec<(Vec<u32>, C)> = Vec::new();
    for (m, c) in monoms.iter().zip(coeffs) {
        let dropped = m[..m.len() - 1].to_vec();
        if let Some(slot) = merged.iter_mut().find(|(em, _)| *em == dropped) {
            slot.1 = slot.1.add_coeff(c);
        } else {
            merged.push((dropped, c.clone()));
        }
    }
    merged.retain(|(_, c)| !c.is_zero_coeff());
    let out_monoms = merged.iter().map(|(m, _)| m.clone()).collect();
    let out_coeffs = merged.into_iter().map(|(_, c)| c).collect();
    (out_monoms, out_coeffs)
}

/// Resolve `Options::homogenize`'s `auto` setting: homogenization mainly
/// helps non-graded orderings, where F4's selection-by-degree machinery
/// otherwise has no natural termination signal for the *output* order (spec
/// §6: "for lex-like orderings").
pub fn should_homogenize(setting: crate::options::Homogenize, ordering: &crate::monomial::MonomialOrdering) -> bool {
    use crate::monomial::MonomialOrdering as O;
    use crate::options::Homogenize;
    match setting {
        Homogenize::Yes => true,
        Homogenize::No => false,
        Homogenize::Auto => matches!(ordering, O::Lex | O::Weighted(_)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homogenize_pads_every_term_to_the_top_degree() {
        let monoms = vec![vec![2, 0], vec![1, 0], vec![0, 0]];
        let h = homogenize_poly(&monoms);
        for m in &h {
            assert_eq!(m.iter().sum::<u32>(), 2);
        }
        assert_eq!(h[0], vec![2, 0, 0]);
        assert_eq!(h[1], vec![1, 0, 1]);
        assert_eq!(h[2], vec![0, 0, 2]);
    }

    #[test]
    fn dehomogenize_merges_collapsed_terms() {
        use groebner_field::modulus::{Modulus, Zp};
        let m = Modulus::new(101);
        let monoms = vec![vec![1, 0, 0], vec![0, 1, 1]];
        let coeffs = vec![Zp::new(1, m), Zp::new(1, m)];
        let (out_monoms, out_coeffs) = dehomogenize_poly(&monoms, &coeffs);
        assert_eq!(out_monoms, vec![vec![1, 0], vec![0, 1]]);
        assert_eq!(out_coeffs.len(), 2);
    }

    #[test]
    fn dehomogenize_drops_terms_that_cancel() {
        use groebner_field::modulus::{Modulus, Zp};
        let m = Modulus::new(101);
        let monoms = vec![vec![1, 0], vec![1, 0]];
        let coeffs = vec![Zp::new(1, m), Zp::new(100, m)];
        let (out_monoms, out_coeffs) = dehomogenize_poly(&monoms, &coeffs);
        assert!(out_monoms.is_empty());
        assert!(out_coeffs.is_empty());
    }
}
