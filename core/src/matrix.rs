//! Column enumeration (spec §4.6) and the Macaulay matrix itself (spec §4.7
//! data layout; the actual row reduction lives in `linalg`).

use std::collections::HashMap;

use groebner_field::types::Field;

use crate::basis::Basis;
use crate::hashtable::{MonomId, MonomialHashtable};
use crate::monomial::Monomial;
use crate::symbolic::{Preprocessed, Row};

/// One matrix row, columns ascending (column 0 = the row's pivot = the
/// largest monomial, per spec §4.6 "column index 1 = largest monomial").
#[derive(Clone, Debug)]
pub struct MatrixRow<F> {
    pub cols: Vec<u32>,
    pub coeffs: Vec<F>,
    pub poly: usize,
}

impl<F: Field> MatrixRow<F> {
    pub fn pivot_col(&self) -> Option<u32> {
        self.cols.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }
}

pub struct Matrix<F> {
    pub upper: Vec<MatrixRow<F>>,
    pub lower: Vec<MatrixRow<F>>,
    /// column index -> the monomial id (in `symbol_ht`'s id space) it stands for.
    pub id_of_col: Vec<MonomId>,
}

/// Sort `symbol_ht`'s identifiers by the monomial ordering, descending, and
/// return the permutation both ways (spec §4.6).
fn enumerate_columns<M: Monomial>(symbol_ht: &MonomialHashtable<M>) -> (Vec<MonomId>, HashMap<MonomId, u32>) {
    let mut ids: Vec<MonomId> = symbol_ht.ids().collect();
    ids.sort_by(|&a, &b| symbol_ht.isless(b, a));
    let col_of_id = ids.iter().enumerate().map(|(c, &id)| (id, c as u32)).collect();
    (ids, col_of_id)
}

fn to_matrix_row<F: Field>(row: &Row, coeffs: &[F], col_of_id: &HashMap<MonomId, u32>) -> MatrixRow<F> {
    let mut pairs: Vec<(u32, F)> = row
        .cols
        .iter()
        .zip(coeffs)
        .map(|(id, &c)| (col_of_id[id], c))
        .collect();
    pairs.sort_by_key(|&(c, _)| c);
    let cols = pairs.iter().map(|&(c, _)| c).collect();
    let coeffs = pairs.into_iter().map(|(_, c)| c).collect();
    MatrixRow { cols, coeffs, poly: row.poly }
}

pub fn build_matrix<M: Monomial, F: Field>(pre: &Preprocessed<M>, basis: &Basis<F>) -> Matrix<F> {
    let (id_of_col, col_of_id) = enumerate_columns(&pre.symbol_ht);
    build_matrix_with_order(pre, basis, id_of_col)
}

/// Build the matrix using a caller-supplied column order instead of
/// re-deriving it by sorting — used by trace apply (spec §4.11 "use the
/// recorded column permutation") to skip the re-sort, which is pure
/// overhead once the permutation is already known.
pub fn build_matrix_with_order<M: Monomial, F: Field>(
    pre: &Preprocessed<M>,
    basis: &Basis<F>,
    id_of_col: Vec<MonomId>,
) -> Matrix<F> {
    let col_of_id: HashMap<MonomId, u32> = id_of_col.iter().enumerate().map(|(c, &id)| (id, c as u32)).collect();

    let upper: Vec<MatrixRow<F>> = pre
        .upper
        .iter()
        .map(|r| to_matrix_row(r, basis.coeffs(r.poly), &col_of_id))
        .collect();
    let lower: Vec<MatrixRow<F>> = pre
        .lower
        .iter()
        .map(|r| to_matrix_row(r, basis.coeffs(r.poly), &col_of_id))
        .collect();

    for row in &upper {
        debug_assert_eq!(
            row.cols.first().copied(),
            row.cols.iter().min().copied(),
            "an upper row's pivot must be its smallest column index"
        );
    }

    Matrix { upper, lower, id_of_col }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::{dense::DenseMonomial, DivMap, MonomialOrdering};
    use crate::selection::{Selection, UpperRow};
    use crate::symbolic::preprocess;
    use groebner_field::modulus::{Modulus, Zp};

    #[test]
    fn column_zero_is_the_largest_monomial() {
        let modulus = Modulus::new(101);
        let divmap = DivMap::build(2, &[]);
        let mut ht = MonomialHashtable::<DenseMonomial>::new(2, MonomialOrdering::Degrevlex, divmap, 3);
        let mut basis: Basis<Zp> = Basis::new();

        let one_id = ht.insert(DenseMonomial::from_exponents(&[0, 0]).unwrap());
        let x2_id = ht.insert(DenseMonomial::from_exponents(&[2, 0]).unwrap());
        let y_id = ht.insert(DenseMonomial::from_exponents(&[0, 1]).unwrap());
        let g = basis.push(vec![x2_id, y_id], vec![Zp::one(modulus), Zp::one(modulus)]);

        let sel = Selection {
            upper: vec![UpperRow { multiplier: one_id, poly: g }],
            lower: vec![],
            taken: vec![],
            group_reducers: vec![],
        };
        let pre = preprocess(&sel, &basis, &mut ht);
        let matrix = build_matrix(&pre, &basis);

        let largest_id = matrix.id_of_col[0];
        let x2_monom = DenseMonomial::from_exponents(&[2, 0]).unwrap();
        assert_eq!(pre.symbol_ht.get(largest_id), &x2_monom);
    }
}
