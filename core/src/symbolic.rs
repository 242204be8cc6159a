//! Symbolic preprocessing (spec §4.5): find a reducer for every monomial
//! that will appear in the matrix.

use groebner_field::types::Field;

use crate::basis::Basis;
use crate::hashtable::{MonomId, MonomialHashtable, PivotFlag};
use crate::monomial::{divmask::may_divide, Monomial};
use crate::selection::Selection;

/// One matrix row to build: `multiplier * basis[poly]`, expressed as a list
/// of `symbol_ht` column ids parallel to `basis.coeffs(poly)`.
#[derive(Clone, Debug)]
pub struct Row {
    pub poly: usize,
    pub multiplier: MonomId,
    pub cols: Vec<MonomId>,
}

/// Result of preprocessing one selected block: the row plan (now fully
/// expressed over `symbol_ht` column ids) plus the secondary hashtable
/// itself, whose contents become the matrix's columns (spec §4.6).
pub struct Preprocessed<M: Monomial> {
    pub upper: Vec<Row>,
    pub lower: Vec<Row>,
    pub symbol_ht: MonomialHashtable<M>,
    /// Basis indices of the reducers found by the search loop, in the order
    /// the loop visited their columns (spec §4.11: "the symbolic-
    /// preprocessing pivot decisions as the sequence of (monomial-id,
    /// chosen basis-index) pairs" — the monomial-id half of that pair is
    /// implicit in loop position, since insertion order is deterministic
    /// given identical monomial structure; `preprocess_apply` below replays
    /// by consuming this sequence positionally instead of searching).
    pub reducer_log: Vec<usize>,
}

fn build_row<M: Monomial>(
    multiplier: MonomId,
    poly: usize,
    poly_monoms: &[MonomId],
    primary_ht: &MonomialHashtable<M>,
    symbol_ht: &mut MonomialHashtable<M>,
) -> Row {
    let mult_monom = primary_ht.get(multiplier).clone();
    let mut cols = Vec::with_capacity(poly_monoms.len());
    for (k, &term_id) in poly_monoms.iter().enumerate() {
        let term_monom = primary_ht.get(term_id);
        let product = mult_monom
            .product(term_monom)
            .expect("row monomial cannot overflow the representation");
        let sid = symbol_ht.insert(product);
        if k == 0 {
            symbol_ht.hashvalue_mut(sid).flag = PivotFlag::PivotColumn;
        } else if symbol_ht.hashvalue(sid).flag == PivotFlag::NonPivotColumn {
            symbol_ht.hashvalue_mut(sid).flag = PivotFlag::UnknownPivotColumn;
        }
        cols.push(sid);
    }
    Row { poly, multiplier, cols }
}

/// Run preprocessing for a selected block. `primary_ht` must be mutable:
/// every newly discovered multiplier monomial is inserted there (spec §4.5:
/// "compute the multiplier ... in the primary hashtable").
pub fn preprocess<M: Monomial, F: Field>(
    selection: &Selection,
    basis: &Basis<F>,
    primary_ht: &mut MonomialHashtable<M>,
) -> Preprocessed<M> {
    let mut symbol_ht = MonomialHashtable::new_secondary(primary_ht);
    let mut upper = Vec::with_capacity(selection.upper.len());
    let mut lower = Vec::with_capacity(selection.lower.len());

    for u in &selection.upper {
        upper.push(build_row(u.multiplier, u.poly, basis.monoms(u.poly), primary_ht, &mut symbol_ht));
    }
    for l in &selection.lower {
        lower.push(build_row(l.multiplier, l.poly, basis.monoms(l.poly), primary_ht, &mut symbol_ht));
    }

    let mut reducer_log = Vec::new();
    let mut i: usize = 0;
    while i < symbol_ht.len() {
        let sid = i as MonomId;
        i += 1;
        if symbol_ht.hashvalue(sid).flag != PivotFlag::UnknownPivotColumn {
            continue;
        }

        let divmask = symbol_ht.hashvalue(sid).divmask;
        let target = symbol_ht.get(sid).clone();
        let reducer = (0..basis.nfilled()).find(|&g| {
            if basis.is_redundant(g) {
                return false;
            }
            let lm_g = basis.leading_monom(g);
            let dm_g = primary_ht.hashvalue(lm_g).divmask;
            may_divide(dm_g, divmask) && target.is_divisible(primary_ht.get(lm_g))
        });

        let Some(g) = reducer else {
            continue; // leave UnknownPivotColumn, becomes non-pivot after linear algebra
        };
        let lm_g = basis.leading_monom(g);
        let mult_monom = target.quotient(primary_ht.get(lm_g));
        let mult_id = primary_ht.insert(mult_monom);
        let row = build_row(mult_id, g, basis.monoms(g), primary_ht, &mut symbol_ht);
        symbol_ht.hashvalue_mut(sid).flag = PivotFlag::PivotColumn;
        reducer_log.push(g);
        upper.push(row);
    }

    Preprocessed {
        upper,
        lower,
        symbol_ht,
        reducer_log,
    }
}

/// Replay a previously recorded preprocessing pass with no search: `upper`
/// and `lower` come from the recorded selection (spec §4.11 "select pairs
/// without search: use the recorded block"), and `reducer_sequence` is the
/// recorded `reducer_log` from the learn run, consumed positionally instead
/// of re-searching the basis.
///
/// Returns `None` if the replay cannot be completed faithfully: the
/// sequence runs out, a recorded basis index is out of range or now
/// redundant, or a recorded reducer no longer divides its column (spec
/// §4.11 "apply returns (false, partial) if any reducer lookup maps to a
/// position that is zero in the new basis").
pub fn preprocess_apply<M: Monomial, F: Field>(
    upper_plan: &[crate::selection::UpperRow],
    lower_plan: &[crate::selection::LowerRow],
    reducer_sequence: &[usize],
    basis: &Basis<F>,
    primary_ht: &mut MonomialHashtable<M>,
) -> Option<Preprocessed<M>> {
    let mut symbol_ht = MonomialHashtable::new_secondary(primary_ht);
    let mut upper = Vec::with_capacity(upper_plan.len());
    let mut lower = Vec::with_capacity(lower_plan.len());

    for u in upper_plan {
        upper.push(build_row(u.multiplier, u.poly, basis.monoms(u.poly), primary_ht, &mut symbol_ht));
    }
    for l in lower_plan {
        lower.push(build_row(l.multiplier, l.poly, basis.monoms(l.poly), primary_ht, &mut symbol_ht));
    }

    let mut cursor = 0usize;
    let mut i: usize = 0;
    while i < symbol_ht.len() {
        let sid = i as MonomId;
        i += 1;
        if symbol_ht.hashvalue(sid).flag != PivotFlag::UnknownPivotColumn {
            continue;
        }
        let &g = reducer_sequence.get(cursor)?;
        cursor += 1;
        if g >= basis.nfilled() || basis.is_redundant(g) {
            return None;
        }
        let lm_g = basis.leading_monom(g);
        let target = symbol_ht.get(sid).clone();
        if !target.is_divisible(primary_ht.get(lm_g)) {
            return None;
        }
        let mult_monom = target.quotient(primary_ht.get(lm_g));
        let mult_id = primary_ht.insert(mult_monom);
        let row = build_row(mult_id, g, basis.monoms(g), primary_ht, &mut symbol_ht);
        symbol_ht.hashvalue_mut(sid).flag = PivotFlag::PivotColumn;
        upper.push(row);
    }

    if cursor != reducer_sequence.len() {
        return None;
    }

    Some(Preprocessed {
        upper,
        lower,
        symbol_ht,
        reducer_log: reducer_sequence.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::{dense::DenseMonomial, DivMap, MonomialOrdering};
    use crate::selection::UpperRow;
    use groebner_field::modulus::{Modulus, Zp};

    fn ht_2vars() -> MonomialHashtable<DenseMonomial> {
        let divmap = DivMap::build(2, &[]);
        MonomialHashtable::new(2, MonomialOrdering::Degrevlex, divmap, 5)
    }

    #[test]
    fn search_loop_finds_a_reducer_for_a_nonleading_column() {
        let modulus = Modulus::new(101);
        let mut ht = ht_2vars();
        let mut basis: Basis<Zp> = Basis::new();

        let one_id = ht.insert(DenseMonomial::from_exponents(&[0, 0]).unwrap());
        let x2_id = ht.insert(DenseMonomial::from_exponents(&[2, 0]).unwrap());
        let y_id = ht.insert(DenseMonomial::from_exponents(&[0, 1]).unwrap());

        // g1 = x^2 + y, the row under reduction; g2 = y, its reducer.
        let g1 = basis.push(vec![x2_id, y_id], vec![Zp::one(modulus), Zp::one(modulus)]);
        let g2 = basis.push(vec![y_id], vec![Zp::one(modulus)]);

        let sel = Selection {
            upper: vec![UpperRow { multiplier: one_id, poly: g1 }],
            lower: vec![],
            taken: vec![],
            group_reducers: vec![],
        };

        let pre = preprocess(&sel, &basis, &mut ht);

        assert_eq!(pre.upper.len(), 2);
        assert_eq!(pre.reducer_log, vec![g2]);
        for id in 0..pre.symbol_ht.len() as u32 {
            assert_ne!(pre.symbol_ht.hashvalue(id).flag, PivotFlag::UnknownPivotColumn);
        }
    }
}
