//! A Gröbner basis engine built around F4 (spec §1 OVERVIEW): a
//! Macaulay-matrix reducer over a hashtable of packed/dense/sparse
//! monomials, driven either directly over a prime field or, for ℚ
//! coefficients, through a multi-modular CRT + rational-reconstruction
//! pipeline (see `modular`).
//!
//! This module is the wiring the rest of the crate assumes exists: it picks
//! a concrete monomial representation for a given [`Options`], builds the
//! `(Hashtable, Basis)` pair, drives the F4 main loop (or its trace
//! learn/apply variants), and exposes the five operations of spec §6 —
//! `groebner`, `normal_form`, `is_groebner`, `groebner_learn`,
//! `groebner_apply` — as free functions. The ℚ-facing `groebner`/
//! `normal_form`/`is_groebner` are thin forwards to `modular`; the
//! prime-field entry points (`groebner_modp` and friends) are what `modular`
//! itself calls once per lucky prime, and are also the public surface for
//! callers already working over a fixed Z/pZ.

pub mod basis;
pub mod error;
pub mod f4;
pub mod hashtable;
pub mod homogenize;
pub mod io;
pub mod linalg;
pub mod matrix;
pub mod modular;
pub mod monomial;
pub mod options;
pub mod pairset;
pub mod primes;
pub mod selection;
pub mod symbolic;
pub mod trace;
pub mod update;

pub use error::{GroebnerError, Result};
pub use io::Polynomial;
pub use modular::{groebner_rational, is_groebner_rational, normal_form_rational};
pub use monomial::MonomialOrdering;
pub use options::{Arithmetic, Homogenize as HomogenizeSetting, Linalg, ModularStrategy, MonomialRepr, Options, Threaded};
pub use trace::Trace;

use groebner_field::modulus::{Modulus, Zp};
use groebner_field::types::Field;

use basis::Basis;
use hashtable::MonomialHashtable;
use linalg::Purpose;
use matrix::MatrixRow;
use monomial::Monomial;
use options::Homogenize;
use pairset::Pairset;
use trace::RunDescriptor;

/// Which concrete `Monomial` implementation a call resolved to (spec §6
/// `monoms`; §4.1 "three representations").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ResolvedRepr {
    Dense,
    Packed,
    Sparse,
}

/// Resolve `Options::monoms` against the chosen ordering (spec §6: packed
/// monomials only support `degrevlex`, spec §4.1). `Auto` prefers packed
/// whenever the ordering allows it, since it is the fastest representation
/// (SWAR divisibility, spec §4.1), and otherwise falls back to dense.
fn resolve_repr(options: &Options) -> Result<ResolvedRepr> {
    match options.monoms {
        MonomialRepr::Auto => {
            if options.ordering.supports_packed() {
                Ok(ResolvedRepr::Packed)
            } else {
                Ok(ResolvedRepr::Dense)
            }
        }
        MonomialRepr::Dense => Ok(ResolvedRepr::Dense),
        MonomialRepr::Packed => {
            if !options.ordering.supports_packed() {
                return Err(GroebnerError::UnsupportedOrdering {
                    ordering: options.ordering.name(),
                    representation: "packed",
                });
            }
            Ok(ResolvedRepr::Packed)
        }
        MonomialRepr::Sparse => Ok(ResolvedRepr::Sparse),
    }
}

/// Dispatch a block of code generic over `M: Monomial` to whichever concrete
/// representation `$repr` resolved to, without boxing a trait object (spec
/// §9 "Polymorphism over monomial representations": the parametric route).
macro_rules! with_monom_repr {
    ($repr:expr, $M:ident => $body:expr) => {
        match $repr {
            ResolvedRepr::Dense => {
                type $M = crate::monomial::dense::DenseMonomial;
                $body
            }
            ResolvedRepr::Packed => {
                type $M = crate::monomial::packed::PackedMonomial;
                $body
            }
            ResolvedRepr::Sparse => {
                type $M = crate::monomial::sparse::SparseMonomial;
                $body
            }
        }
    };
}

/// A strictly wider representation to retry under on overflow (spec §7:
/// "the top-level driver catches [`MonomialDegreeOverflow`] and restarts
/// with a wider representation (≥32-bit components)"). Packed's 8-bit lanes
/// are the only representation narrower than dense's 32-bit components;
/// dense and sparse are already as wide as this engine gets, so there is
/// nowhere further to widen to.
fn widen_repr(repr: ResolvedRepr) -> Option<ResolvedRepr> {
    match repr {
        ResolvedRepr::Packed => Some(ResolvedRepr::Dense),
        ResolvedRepr::Dense | ResolvedRepr::Sparse => None,
    }
}

/// Like `with_monom_repr!`, but on a `MonomialDegreeOverflow` from `$body`
/// retries once under `widen_repr`'s wider representation instead of
/// propagating the error outright (spec §7). `$body` must evaluate to a
/// `Result<_, GroebnerError>`.
macro_rules! with_repr_retry {
    ($repr:expr, $M:ident => $body:expr) => {{
        let __primary = $repr;
        match with_monom_repr!(__primary, $M => $body) {
            Err(GroebnerError::MonomialDegreeOverflow) => match widen_repr(__primary) {
                Some(__wider) => {
                    log::warn!("monomial degree overflow under the resolved representation; retrying with a wider representation");
                    with_monom_repr!(__wider, $M => $body)
                }
                None => Err(GroebnerError::MonomialDegreeOverflow),
            },
            other => other,
        }
    }};
}

fn to_zp_polys(polys: &[Polynomial<u64>], modulus: Modulus) -> Vec<Polynomial<Zp>> {
    polys
        .iter()
        .map(|p| Polynomial::new(p.monoms.clone(), p.coeffs.iter().map(|&c| Zp::new(c, modulus)).collect()))
        .collect()
}

fn from_zp_polys(polys: Vec<Polynomial<Zp>>) -> Vec<Polynomial<u64>> {
    polys
        .into_iter()
        .map(|p| Polynomial::new(p.monoms, p.coeffs.into_iter().map(|c| c.value()).collect()))
        .collect()
}

/// Build the `(Hashtable, Basis, Pairset)` triple for a fresh input and run
/// `update` once over the whole input range, the shared setup every
/// operation below needs (spec §4.3 "initial update pass").
fn setup<M: Monomial, F: Field>(
    polys: &[Polynomial<F>],
    nvars: usize,
    options: &Options,
) -> Result<(MonomialHashtable<M>, Basis<F>, Pairset)> {
    let (mut ht, mut basis) = io::build_hashtable_and_basis(polys, nvars, options.ordering.clone(), options.seed)?;
    let mut pairset = Pairset::new();
    update::update(&mut basis, &mut pairset, &mut ht, 0..basis.nfilled());
    Ok((ht, basis, pairset))
}

fn compute_groebner<M: Monomial, F: Field>(polys: &[Polynomial<F>], nvars: usize, options: &Options) -> Result<Vec<Polynomial<F>>> {
    let (mut ht, mut basis, mut pairset) = setup::<M, F>(polys, nvars, options)?;
    let config = options.f4_config();
    f4::run(&mut ht, &mut basis, &mut pairset, &config, None)?;
    Ok(io::extract_basis(&basis, &ht))
}

fn compute_groebner_learn<M: Monomial, F: Field>(
    polys: &[Polynomial<F>],
    nvars: usize,
    options: &Options,
) -> Result<(Trace, Vec<Polynomial<F>>)> {
    let (mut ht, mut basis, mut pairset) = setup::<M, F>(polys, nvars, options)?;
    let mut trace = Trace::new(RunDescriptor {
        nvars,
        ninputs: polys.len(),
        homogenized: false,
    });
    let config = options.f4_config();
    f4::run(&mut ht, &mut basis, &mut pairset, &config, Some(&mut trace))?;
    Ok((trace, io::extract_basis(&basis, &ht)))
}

fn compute_groebner_apply<M: Monomial, F: Field>(
    trace: &Trace,
    polys: &[Polynomial<F>],
    nvars: usize,
    options: &Options,
) -> Result<(bool, Vec<Polynomial<F>>)> {
    let (mut ht, mut basis, mut pairset) = setup::<M, F>(polys, nvars, options)?;
    let config = options.f4_config();
    let ok = f4::run_apply(&mut ht, &mut basis, &mut pairset, &config, trace)?;
    Ok((ok, io::extract_basis(&basis, &ht)))
}

/// Drain the pairset checking every S-polynomial reduces to zero (spec
/// §4.10 "is_groebner"): each block is processed exactly like an F4
/// iteration's matrix reduction, but in `IsGroebner` mode, which returns
/// false the moment one row survives reduction nonzero instead of promoting
/// it to a new basis element. No new polynomials are ever added, so this
/// terminates once the (finite, Gebauer–Möller-pruned) pairset is empty.
fn compute_is_groebner_inner<M: Monomial, F: Field>(
    ht: &mut MonomialHashtable<M>,
    basis: &mut Basis<F>,
    pairset: &mut Pairset,
    options: &Options,
) -> Result<bool> {
    let mut iterations = 0usize;
    while !pairset.is_empty() {
        iterations += 1;
        if iterations > f4::ITERATION_CAP {
            return Err(GroebnerError::IterationCapExceeded { cap: f4::ITERATION_CAP });
        }
        let sel = selection::select(pairset, basis, ht, options.selection, options.maxpairs);
        let pre = symbolic::preprocess(&sel, basis, ht);
        let matrix = matrix::build_matrix(&pre, basis);
        let outcome = linalg::reduce(matrix, Purpose::IsGroebner);
        if !outcome.is_groebner {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compute_is_groebner<M: Monomial, F: Field>(polys: &[Polynomial<F>], nvars: usize, options: &Options) -> Result<bool> {
    let (mut ht, mut basis, mut pairset) = setup::<M, F>(polys, nvars, options)?;
    compute_is_groebner_inner(&mut ht, &mut basis, &mut pairset, options)
}

/// Re-express a fully reduced matrix row as a `Polynomial` (spec §4.9): read
/// its columns directly out of `symbol_ht` rather than re-inserting into the
/// primary table, since normal-form output never needs to persist in the
/// engine's own hashtable.
fn row_to_polynomial<M: Monomial, F: Field>(
    row: &MatrixRow<F>,
    id_of_col: &[hashtable::MonomId],
    symbol_ht: &MonomialHashtable<M>,
) -> Polynomial<F> {
    let monoms = row.cols.iter().map(|&c| symbol_ht.get(id_of_col[c as usize]).exponents()).collect();
    Polynomial::new(monoms, row.coeffs.clone())
}

/// Reduce `targets` against `basis_polys` (spec §4.9 "normal_form"):
/// pushes each target into the basis as a row marked redundant on arrival
/// (so it can never itself serve as a reducer, only the actual generators
/// can), builds one combined symbolic-preprocessing/matrix/reduce pass over
/// all targets at once, and reads the reduced residues back out.
fn compute_normal_form<M: Monomial, F: Field>(
    basis_polys: &[Polynomial<F>],
    targets: &[Polynomial<F>],
    nvars: usize,
    options: &Options,
) -> Result<Vec<Polynomial<F>>> {
    let (mut ht, mut basis, mut pairset) = setup::<M, F>(basis_polys, nvars, options)?;

    if options.check && !compute_is_groebner_inner(&mut ht, &mut basis, &mut pairset, options)? {
        return Err(GroebnerError::NotAGroebnerBasis);
    }

    let identity_exps = vec![0u32; nvars];
    let identity = ht.insert(M::from_exponents(&identity_exps).map_err(|_| GroebnerError::MonomialDegreeOverflow)?);

    let mut target_idx: Vec<Option<usize>> = Vec::with_capacity(targets.len());
    let mut lower = Vec::new();
    for t in targets {
        let mut terms: Vec<(Vec<u32>, F)> = t
            .monoms
            .iter()
            .cloned()
            .zip(t.coeffs.iter().copied())
            .filter(|(_, c)| !c.is_zero())
            .collect();
        if terms.is_empty() {
            target_idx.push(None);
            continue;
        }
        terms.sort_by(|a, b| {
            let deg_a: u32 = a.0.iter().sum();
            let deg_b: u32 = b.0.iter().sum();
            options.ordering.compare(&b.0, &a.0, deg_b, deg_a)
        });

        let mut ids = Vec::with_capacity(terms.len());
        let mut coeffs = Vec::with_capacity(terms.len());
        for (exps, c) in terms {
            let monom = M::from_exponents(&exps).map_err(|_| GroebnerError::MonomialDegreeOverflow)?;
            ids.push(ht.insert(monom));
            coeffs.push(c);
        }
        let idx = basis.push(ids, coeffs);
        // Never eligible as a reducer for anyone (itself or other targets).
        basis.mark_redundant(idx);
        target_idx.push(Some(idx));
        lower.push(selection::LowerRow { multiplier: identity, poly: idx });
    }

    if lower.is_empty() {
        return Ok(target_idx.iter().map(|_| Polynomial::new(Vec::new(), Vec::new())).collect());
    }

    let sel = selection::Selection {
        upper: Vec::new(),
        lower,
        taken: Vec::new(),
        group_reducers: Vec::new(),
    };
    let pre = symbolic::preprocess(&sel, &basis, &mut ht);
    let matrix = matrix::build_matrix(&pre, &basis);
    let id_of_col = matrix.id_of_col.clone();
    let outcome = linalg::reduce(matrix, Purpose::NormalForm);

    let mut by_poly: std::collections::HashMap<usize, MatrixRow<F>> = std::collections::HashMap::new();
    for row in outcome.rows {
        by_poly.insert(row.poly, row);
    }

    Ok(target_idx
        .into_iter()
        .map(|idx| match idx.and_then(|i| by_poly.get(&i)) {
            Some(row) => row_to_polynomial(row, &id_of_col, &pre.symbol_ht),
            None => Polynomial::new(Vec::new(), Vec::new()),
        })
        .collect())
}

/// One pass of the actual engine, forced non-homogenizing (spec
/// `homogenize.rs`: the two-pass wrapper must never recurse).
fn groebner_modp_core(polys: &[Polynomial<u64>], p: u64, options: &Options) -> Result<Vec<Polynomial<u64>>> {
    let nvars = io::validate_input(polys)?;
    let modulus = Modulus::new(p);
    let zp_polys = to_zp_polys(polys, modulus);
    let repr = resolve_repr(options)?;
    let out = with_repr_retry!(repr, M => compute_groebner::<M, Zp>(&zp_polys, nvars, options))?;
    Ok(from_zp_polys(out))
}

/// Homogenize, run once under a forced `degrevlex` (graded, so termination
/// needs no help from the requested order), dehomogenize the resulting
/// generators, then run a second forced-non-homogenizing pass under the
/// originally requested ordering to reduce them properly (spec
/// `homogenize.rs` module doc).
fn groebner_modp_homogenized(polys: &[Polynomial<u64>], nvars: usize, p: u64, options: &Options) -> Result<Vec<Polynomial<u64>>> {
    let homog_polys: Vec<Polynomial<u64>> = polys
        .iter()
        .map(|poly| Polynomial::new(homogenize::homogenize_poly(&poly.monoms), poly.coeffs.clone()))
        .collect();
    let pass1_options = options
        .clone()
        .with_ordering(MonomialOrdering::Degrevlex)
        .with_homogenize(Homogenize::No);
    let homog_basis = groebner_modp_core(&homog_polys, p, &pass1_options)?;

    let modulus = Modulus::new(p);
    let dehomog: Vec<Polynomial<u64>> = homog_basis
        .into_iter()
        .map(|poly| {
            let zp_coeffs: Vec<Zp> = poly.coeffs.iter().map(|&c| Zp::new(c, modulus)).collect();
            let (monoms, coeffs) = homogenize::dehomogenize_poly(&poly.monoms, &zp_coeffs);
            Polynomial::new(monoms, coeffs.into_iter().map(|c| c.value()).collect())
        })
        .collect();

    let _ = nvars; // dehomogenized generators already carry the original arity
    let pass2_options = options.clone().with_homogenize(Homogenize::No);
    groebner_modp_core(&dehomog, p, &pass2_options)
}

/// Gröbner basis of `polys` over `Z/pZ` (spec §6 `groebner`, prime-field
/// realization): the entry point the multi-modular ℚ driver calls once per
/// lucky prime.
pub fn groebner_modp(polys: &[Polynomial<u64>], p: u64, options: &Options) -> Result<Vec<Polynomial<u64>>> {
    let nvars = io::validate_input(polys)?;
    if homogenize::should_homogenize(options.homogenize, &options.ordering) {
        groebner_modp_homogenized(polys, nvars, p, options)
    } else {
        groebner_modp_core(polys, p, options)
    }
}

/// `true` iff `polys` is already a Gröbner basis over `Z/pZ` (spec §6
/// `is_groebner`, prime-field realization).
pub fn is_groebner_modp(polys: &[Polynomial<u64>], p: u64, options: &Options) -> Result<bool> {
    let nvars = io::validate_input(polys)?;
    let modulus = Modulus::new(p);
    let zp_polys = to_zp_polys(polys, modulus);
    let repr = resolve_repr(options)?;
    with_repr_retry!(repr, M => compute_is_groebner::<M, Zp>(&zp_polys, nvars, options))
}

/// Reduce `targets` against `basis`, a Gröbner basis over `Z/pZ` (spec §6
/// `normal_form`, prime-field realization); checks `basis` actually is one
/// first when `options.check` is set.
pub fn normal_form_modp(basis: &[Polynomial<u64>], p: u64, targets: &[Polynomial<u64>], options: &Options) -> Result<Vec<Polynomial<u64>>> {
    let nvars = io::validate_input(basis)?;
    let modulus = Modulus::new(p);
    let zp_basis = to_zp_polys(basis, modulus);
    let zp_targets = to_zp_polys(targets, modulus);
    let repr = resolve_repr(options)?;
    let out = with_repr_retry!(repr, M => compute_normal_form::<M, Zp>(&zp_basis, &zp_targets, nvars, options))?;
    Ok(from_zp_polys(out))
}

/// Record a trace while computing a Gröbner basis over `Z/pZ` (spec §4.11
/// "learn"): every pair-selection and symbolic-preprocessing decision is
/// logged so a structurally identical input, over a different prime, can
/// replay it with `groebner_apply` instead of re-searching.
///
/// Homogenization is intentionally not wrapped here (unlike `groebner_modp`):
/// a learn/apply trace is only meaningful across *structurally identical*
/// reruns of the same pipeline, and the two-pass homogenize/dehomogenize
/// wrapper is two separate F4 runs glued together, not one. Callers who need
/// both homogenization and learn/apply should homogenize the input
/// themselves and pass `Options::homogenize(No)` here.
pub fn groebner_learn(polys: &[Polynomial<u64>], p: u64, options: &Options) -> Result<(Trace, Vec<Polynomial<u64>>)> {
    let nvars = io::validate_input(polys)?;
    let modulus = Modulus::new(p);
    let zp_polys = to_zp_polys(polys, modulus);
    let repr = resolve_repr(options)?;
    let (trace, out) = with_repr_retry!(repr, M => compute_groebner_learn::<M, Zp>(&zp_polys, nvars, options))?;
    Ok((trace, from_zp_polys(out)))
}

/// Replay `trace` against `polys` over `Z/pZ` (spec §4.11 "apply"): returns
/// `Ok(false)` (not an error) if the trace cannot be replayed faithfully —
/// an unlucky prime, which the multi-modular driver (`modular`) is expected
/// to fall back from, not surface to its own caller.
pub fn groebner_apply(trace: &Trace, polys: &[Polynomial<u64>], p: u64, options: &Options) -> Result<(bool, Vec<Polynomial<u64>>)> {
    let nvars = io::validate_input(polys)?;
    let modulus = Modulus::new(p);
    let zp_polys = to_zp_polys(polys, modulus);
    let repr = resolve_repr(options)?;
    let (ok, out) = with_repr_retry!(repr, M => compute_groebner_apply::<M, Zp>(trace, &zp_polys, nvars, options))?;
    Ok((ok, from_zp_polys(out)))
}

/// Gröbner basis of `polys` over ℚ (spec §6 `groebner`): the multi-modular
/// CRT + rational-reconstruction driver (see `modular::groebner_rational`).
pub fn groebner(polys: &[Polynomial<num_rational::BigRational>], options: &Options) -> Result<Vec<Polynomial<num_rational::BigRational>>> {
    modular::groebner_rational(polys, options)
}

/// `true` iff `polys` is already a Gröbner basis over ℚ (spec §6
/// `is_groebner`).
pub fn is_groebner(polys: &[Polynomial<num_rational::BigRational>], options: &Options) -> Result<bool> {
    modular::is_groebner_rational(polys, options)
}

/// Reduce `targets` against `basis`, a Gröbner basis over ℚ (spec §6
/// `normal_form`).
pub fn normal_form(
    basis: &[Polynomial<num_rational::BigRational>],
    targets: &[Polynomial<num_rational::BigRational>],
    options: &Options,
) -> Result<Vec<Polynomial<num_rational::BigRational>>> {
    modular::normal_form_rational(basis, targets, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(monoms: &[&[u32]], coeffs: &[u64]) -> Polynomial<u64> {
        Polynomial::new(monoms.iter().map(|m| m.to_vec()).collect(), coeffs.to_vec())
    }

    #[test]
    fn groebner_modp_reduces_a_simple_binomial_ideal() {
        // I = <y, xy + x> over F_101, degrevlex: y reduces xy+x to x, so the
        // reduced Gröbner basis is {x, y} regardless of variable order.
        let polys = vec![poly(&[&[0, 1]], &[1]), poly(&[&[1, 1], &[1, 0]], &[1, 1])];
        let options = Options::default();
        let basis = groebner_modp(&polys, 101, &options).unwrap();
        let mut leads: Vec<Vec<u32>> = basis.iter().map(|p| p.monoms[0].clone()).collect();
        leads.sort();
        assert_eq!(leads, vec![vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn is_groebner_modp_detects_a_non_groebner_basis() {
        // {x^2+5, 2y^2+3}-style coprime-lead pair is already a Gröbner
        // basis (coprime leads => trivial S-poly by the first criterion);
        // adding a generator whose S-polynomial does *not* reduce to zero
        // must flip the answer to false.
        let coprime = vec![poly(&[&[2, 0]], &[1]), poly(&[&[0, 2]], &[1])];
        let options = Options::default();
        assert!(is_groebner_modp(&coprime, 101, &options).unwrap());

        let not_groebner = vec![poly(&[&[1, 1]], &[1]), poly(&[&[0, 2], &[1, 0]], &[1, 1])];
        assert!(!is_groebner_modp(&not_groebner, 101, &options).unwrap());
    }

    #[test]
    fn normal_form_modp_reduces_targets_against_a_groebner_basis() {
        let basis = vec![poly(&[&[0, 1]], &[1]), poly(&[&[1, 0]], &[1])];
        let targets = vec![poly(&[&[1, 1], &[2, 0]], &[1, 1]), poly(&[&[0, 0]], &[5])];
        let options = Options::default();
        let reduced = normal_form_modp(&basis, 101, &targets, &options).unwrap();
        assert!(reduced[0].is_empty());
        assert_eq!(reduced[1].monoms, vec![vec![0, 0]]);
        assert_eq!(reduced[1].coeffs, vec![5]);
    }

    #[test]
    fn groebner_learn_and_apply_agree_on_structurally_identical_input() {
        let polys = vec![poly(&[&[2, 0]], &[1]), poly(&[&[1, 1]], &[1]), poly(&[&[0, 2]], &[1])];
        let options = Options::default();
        let (trace, learned) = groebner_learn(&polys, 32003, &options).unwrap();
        let (ok, applied) = groebner_apply(&trace, &polys, 40009, &options).unwrap();
        assert!(ok);
        assert_eq!(learned.len(), applied.len());
        for (l, a) in learned.iter().zip(&applied) {
            assert_eq!(l.monoms, a.monoms);
        }
    }

    #[test]
    fn packed_monomials_rejected_under_lex_ordering() {
        let polys = vec![poly(&[&[1, 0]], &[1])];
        let options = Options::default().with_ordering(MonomialOrdering::Lex).with_monoms(MonomialRepr::Packed);
        let err = groebner_modp(&polys, 101, &options).unwrap_err();
        assert!(matches!(err, GroebnerError::UnsupportedOrdering { .. }));
    }
}
