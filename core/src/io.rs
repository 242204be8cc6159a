//! Polynomial I/O format (spec §6 "Polynomial I/O format") and the
//! conversions between it and the engine's internal `(Hashtable, Basis)`
//! representation.

use num_traits::Zero;

use groebner_field::types::Field;

use crate::basis::Basis;
use crate::error::{GroebnerError, Result};
use crate::hashtable::MonomialHashtable;
use crate::monomial::{DivMap, Monomial, MonomialOrdering};

/// One input/output polynomial: exponent vectors of length `nvars`, paired
/// with nonzero coefficients, monomials in descending order (spec §6:
/// "monomials in the input ordering descending").
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial<C> {
    pub monoms: Vec<Vec<u32>>,
    pub coeffs: Vec<C>,
}

impl<C> Polynomial<C> {
    pub fn new(monoms: Vec<Vec<u32>>, coeffs: Vec<C>) -> Self {
        assert_eq!(monoms.len(), coeffs.len(), "|monoms| must equal |coeffs|");
        Self { monoms, coeffs }
    }

    pub fn is_empty(&self) -> bool {
        self.monoms.is_empty()
    }
}

/// Validate arity consistency across a polynomial list and return `nvars`
/// (spec §7 "Input errors": empty list; zero generators only; inconsistent
/// arities).
pub(crate) fn validate_input<C: Zero>(polys: &[Polynomial<C>]) -> Result<usize> {
    if polys.is_empty() {
        return Err(GroebnerError::EmptyInput);
    }
    let has_nonzero_term = polys.iter().any(|p| p.coeffs.iter().any(|c| !c.is_zero()));
    if !has_nonzero_term {
        return Err(GroebnerError::ZeroGenerators);
    }
    let nvars = polys
        .iter()
        .flat_map(|p| p.monoms.first())
        .map(|m| m.len())
        .next()
        .ok_or(GroebnerError::ZeroGenerators)?;
    for p in polys {
        for m in &p.monoms {
            if m.len() != nvars {
                return Err(GroebnerError::InconsistentArity {
                    expected: nvars,
                    found: m.len(),
                });
            }
        }
    }
    Ok(nvars)
}

/// Build a fresh hashtable + basis from input polynomials over a field `F`,
/// sorting each polynomial's terms into descending order under `ordering`
/// and dropping explicit zero coefficients (spec §6 "coefficient nonzero").
pub(crate) fn build_hashtable_and_basis<M: Monomial, F: Field>(
    polys: &[Polynomial<F>],
    nvars: usize,
    ordering: MonomialOrdering,
    seed: u64,
) -> Result<(MonomialHashtable<M>, Basis<F>)> {
    let sample: Vec<Vec<u32>> = polys.iter().flat_map(|p| p.monoms.iter().cloned()).collect();
    let divmap = DivMap::build(nvars, &sample);
    let mut ht: MonomialHashtable<M> = MonomialHashtable::new(nvars, ordering.clone(), divmap, seed);
    let mut basis: Basis<F> = Basis::new();

    for p in polys {
        let mut terms: Vec<(Vec<u32>, F)> = p
            .monoms
            .iter()
            .cloned()
            .zip(p.coeffs.iter().copied())
            .filter(|(_, c)| !c.is_zero())
            .collect();
        if terms.is_empty() {
            continue;
        }
        terms.sort_by(|a, b| {
            let deg_a: u32 = a.0.iter().sum();
            let deg_b: u32 = b.0.iter().sum();
            ordering.compare(&b.0, &a.0, deg_b, deg_a)
        });

        let mut ids = Vec::with_capacity(terms.len());
        let mut coeffs = Vec::with_capacity(terms.len());
        for (exps, c) in terms {
            let monom = M::from_exponents(&exps).map_err(|_| GroebnerError::MonomialDegreeOverflow)?;
            ids.push(ht.insert(monom));
            coeffs.push(c);
        }
        let idx = basis.push(ids, coeffs);
        basis.make_monic(idx);
    }

    Ok((ht, basis))
}

/// Read the non-redundant generators of a finished basis back out as
/// `Polynomial`s (spec §4.8 postconditions: "sorted by ordering ascending on
/// lead monomials").
pub(crate) fn extract_basis<M: Monomial, F: Field>(
    basis: &Basis<F>,
    ht: &MonomialHashtable<M>,
) -> Vec<Polynomial<F>> {
    basis
        .iter_nonredundant()
        .filter(|&i| !basis.is_redundant(i))
        .map(|i| {
            let monoms = basis.monoms(i).iter().map(|&id| ht.get(id).exponents()).collect();
            let coeffs = basis.coeffs(i).to_vec();
            Polynomial::new(monoms, coeffs)
        })
        .collect()
}
