//! The F4 main loop (spec §4.8).

use groebner_field::types::Field;

use crate::basis::Basis;
use crate::error::{GroebnerError, Result};
use crate::hashtable::MonomialHashtable;
use crate::linalg::{self, Purpose};
use crate::matrix::{self, MatrixRow};
use crate::monomial::Monomial;
use crate::pairset::Pairset;
use crate::selection::{self, SelectionStrategy};
use crate::symbolic;
use crate::trace::{IterationRecord, Trace};
use crate::update;

pub const ITERATION_CAP: usize = 10_000;

#[derive(Clone, Debug)]
pub struct F4Config {
    pub maxpairs: Option<usize>,
    pub selection: SelectionStrategy,
    pub reduced: bool,
    pub sweep: bool,
}

impl Default for F4Config {
    fn default() -> Self {
        Self {
            maxpairs: None,
            selection: SelectionStrategy::Normal,
            reduced: true,
            sweep: true,
        }
    }
}

/// Re-express a reduced matrix row's columns back as primary-hashtable
/// MonomIds, re-inserting each monomial if `primary_ht` has not seen it
/// under this id before (spec §4.7 "converted back to (MonomId list, coeff
/// list) by looking up column → monomial and re-inserting the monomials
/// into the primary hashtable if needed").
fn row_to_basis_poly<M: Monomial>(
    row: MatrixRow<impl Field>,
    id_of_col: &[crate::hashtable::MonomId],
    symbol_ht: &MonomialHashtable<M>,
    primary_ht: &mut MonomialHashtable<M>,
) -> (Vec<crate::hashtable::MonomId>, Vec<impl Field>) {
    let monoms = row
        .cols
        .iter()
        .map(|&col| {
            let symbol_id = id_of_col[col as usize];
            primary_ht.insert(symbol_ht.get(symbol_id).clone())
        })
        .collect();
    (monoms, row.coeffs)
}

/// Run one F4 iteration: select, preprocess, reduce, update. Returns `true`
/// if new (nonzero) rows were produced, used to drive trace significance
/// (spec §4.8 step 6, §4.11).
fn run_iteration<M: Monomial, F: Field>(
    ht: &mut MonomialHashtable<M>,
    basis: &mut Basis<F>,
    pairset: &mut Pairset,
    config: &F4Config,
    trace: Option<&mut Trace>,
) -> bool {
    let sel = selection::select(pairset, basis, ht, config.selection, config.maxpairs);
    let pre = symbolic::preprocess(&sel, basis, ht);
    let shape = (pre.upper.len(), pre.lower.len(), pre.symbol_ht.len());
    let matrix = matrix::build_matrix(&pre, basis);
    let id_of_col = matrix.id_of_col.clone();
    let outcome = linalg::reduce(matrix, Purpose::Build);

    let produced = !outcome.rows.is_empty();
    let new_range_start = basis.nfilled();
    for row in outcome.rows {
        let (monoms, coeffs) = row_to_basis_poly(row, &id_of_col, &pre.symbol_ht, ht);
        let idx = basis.push(monoms, coeffs);
        basis.make_monic(idx);
    }
    update::update(basis, pairset, ht, new_range_start..basis.nfilled());

    if let Some(trace) = trace {
        trace.push(IterationRecord {
            taken: sel.taken.clone(),
            group_reducers: sel.group_reducers.clone(),
            reducer_log: pre.reducer_log.clone(),
            column_permutation: id_of_col,
            shape,
            empty: !produced,
        });
    }

    produced
}

/// Run F4 to completion, mutating `basis`/`pairset`/`ht` in place, optionally
/// recording a trace for later replay (spec §4.11).
pub fn run<M: Monomial, F: Field>(
    ht: &mut MonomialHashtable<M>,
    basis: &mut Basis<F>,
    pairset: &mut Pairset,
    config: &F4Config,
    mut trace: Option<&mut Trace>,
) -> Result<()> {
    let mut iterations = 0usize;
    while !pairset.is_empty() {
        iterations += 1;
        if iterations > ITERATION_CAP {
            return Err(GroebnerError::IterationCapExceeded { cap: ITERATION_CAP });
        }
        log::debug!("f4 iteration {iterations}, {} live pairs", pairset.len());
        run_iteration(ht, basis, pairset, config, trace.as_deref_mut());
    }

    if config.sweep {
        basis.sweep(ht);
    }
    if config.reduced {
        autoreduce(ht, basis);
    }
    basis.standardize(ht);
    log::info!(
        "f4 finished in {iterations} iterations, {} non-redundant generators",
        basis.nnonredundant()
    );
    Ok(())
}

/// Replay a previously recorded trace against a structurally identical
/// input (spec §4.11 "Apply"): every iteration's pair selection and
/// symbolic-preprocessing search is skipped in favour of the recorded
/// choices, and only the linear-algebra reduction runs with the new
/// coefficients.
///
/// Returns `Ok(true)` if every recorded iteration replayed faithfully,
/// `Ok(false)` on the first iteration that cannot be (spec §4.11 "apply
/// returns (false, partial)"); the caller (the multi-modular driver) then
/// discards this prime rather than trusting a partial result.
pub fn run_apply<M: Monomial, F: Field>(
    ht: &mut MonomialHashtable<M>,
    basis: &mut Basis<F>,
    pairset: &mut Pairset,
    config: &F4Config,
    trace: &Trace,
) -> Result<bool> {
    for (iteration, record) in trace.iter().enumerate() {
        if record.empty {
            // spec §4.8 step 2 "discard_normal": drop the lowest-degree
            // block without building the matrix at all.
            selection::discard_normal(pairset, record.taken.len());
            continue;
        }

        let Some(sel) = selection::select_apply(&record.taken, &record.group_reducers, basis, ht) else {
            log::warn!("trace apply: pair selection replay failed at iteration {iteration}");
            return Ok(false);
        };
        let Some(pre) = symbolic::preprocess_apply(&sel.upper, &sel.lower, &record.reducer_log, basis, ht) else {
            log::warn!("trace apply: symbolic preprocessing replay failed at iteration {iteration}");
            return Ok(false);
        };
        if pre.symbol_ht.len() != record.column_permutation.len() {
            log::warn!("trace apply: column count mismatch at iteration {iteration}");
            return Ok(false);
        }
        let matrix = matrix::build_matrix_with_order(&pre, basis, record.column_permutation.clone());
        let outcome = linalg::reduce(matrix, Purpose::Build);

        let new_range_start = basis.nfilled();
        for row in outcome.rows {
            let (monoms, coeffs) = row_to_basis_poly(row, &record.column_permutation, &pre.symbol_ht, ht);
            let idx = basis.push(monoms, coeffs);
            basis.make_monic(idx);
        }
        update::update(basis, pairset, ht, new_range_start..basis.nfilled());
    }

    if !pairset.is_empty() {
        log::warn!("trace apply: pairset not exhausted after replaying the recorded trace");
        return Ok(false);
    }

    if config.sweep {
        basis.sweep(ht);
    }
    if config.reduced {
        autoreduce(ht, basis);
    }
    basis.standardize(ht);
    Ok(true)
}

/// One more full reduction pass: every non-redundant generator's tail is
/// reduced against every *other* non-redundant generator, producing the
/// reduced Gröbner basis (spec §4.8 "autoreduce ... mutually reduces the
/// non-redundant leads to reduced Gröbner form").
///
/// `current` tracks the *live* index for each original position, and is
/// updated in place as each position is reduced: position `pos`'s reducer
/// set is `current` with `pos` itself excluded, so earlier positions
/// contribute their just-computed replacement (not their since-superseded
/// original), and later positions still contribute their pre-pass form.
/// Without this, a fixed snapshot taken before the pass starts would dangle
/// a processed position's replacement out of every later reduction, and the
/// final position would end up reduced against nothing at all.
fn autoreduce<M: Monomial, F: Field>(ht: &mut MonomialHashtable<M>, basis: &mut Basis<F>) {
    let mut current: Vec<usize> = basis
        .nonredundant_indices()
        .iter()
        .copied()
        .filter(|&i| !basis.is_redundant(i))
        .collect();

    for pos in 0..current.len() {
        let i = current[pos];
        let mut upper_rows = Vec::new();
        for &j in &current {
            if j == i {
                continue;
            }
            upper_rows.push(selection::UpperRow {
                multiplier: ht.insert(M::from_exponents(&vec![0u32; ht.nvars()]).expect("zero exponent never overflows")),
                poly: j,
            });
        }
        let sel = crate::selection::Selection {
            upper: upper_rows,
            lower: vec![selection::LowerRow {
                multiplier: ht.insert(M::from_exponents(&vec![0u32; ht.nvars()]).expect("zero exponent never overflows")),
                poly: i,
            }],
            taken: vec![],
            group_reducers: vec![],
        };
        let pre = symbolic::preprocess(&sel, basis, ht);
        let id_of_col_matrix = matrix::build_matrix(&pre, basis);
        let id_of_col = id_of_col_matrix.id_of_col.clone();
        let outcome = linalg::reduce(id_of_col_matrix, Purpose::NormalForm);
        if let Some(row) = outcome.rows.into_iter().next() {
            if !row.is_empty() {
                let (monoms, coeffs) = row_to_basis_poly(row, &id_of_col, &pre.symbol_ht, ht);
                let new_idx = basis.push(monoms, coeffs);
                basis.make_monic(new_idx);
                basis.mark_redundant(i);
                basis.register_nonredundant(new_idx, ht.hashvalue(basis.leading_monom(new_idx)).divmask);
                current[pos] = new_idx;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::{dense::DenseMonomial, DivMap, MonomialOrdering};
    use groebner_field::modulus::{Modulus, Zp};

    fn push_input(
        basis: &mut Basis<Zp>,
        ht: &mut MonomialHashtable<DenseMonomial>,
        monoms: &[&[u32]],
        coeffs: &[u64],
        modulus: Modulus,
    ) -> usize {
        let monom_ids = monoms
            .iter()
            .map(|e| ht.insert(DenseMonomial::from_exponents(e).unwrap()))
            .collect();
        let coeff_vals = coeffs.iter().map(|&c| Zp::new(c, modulus)).collect();
        basis.push(monom_ids, coeff_vals)
    }

    #[test]
    fn two_coprime_monomial_generators_produce_no_new_polynomials() {
        let modulus = Modulus::new(32003);
        let divmap = DivMap::build(2, &[]);
        let mut ht = MonomialHashtable::<DenseMonomial>::new(2, MonomialOrdering::Degrevlex, divmap, 1);
        let mut basis: Basis<Zp> = Basis::new();
        let mut pairset = Pairset::new();

        let i0 = push_input(&mut basis, &mut ht, &[&[1, 0]], &[1], modulus);
        update::update(&mut basis, &mut pairset, &mut ht, i0..i0 + 1);
        let i1 = push_input(&mut basis, &mut ht, &[&[0, 1]], &[1], modulus);
        update::update(&mut basis, &mut pairset, &mut ht, i1..i1 + 1);

        assert!(pairset.is_empty());
        let config = F4Config::default();
        run(&mut ht, &mut basis, &mut pairset, &config, None).unwrap();
        assert_eq!(basis.nnonredundant(), 2);
    }
}
