//! Linear algebra over the Macaulay matrix (spec §4.7).
//!
//! Only the `deterministic` backend is implemented. `randomized` batching is
//! a documented extension point (spec §4.7: "cheaper when rows share many
//! monomials ... forbidden when char(F) < 500") that this engine does not
//! yet perform — every run behaves as if `linalg = deterministic`, which is
//! always correct, just not the fast path for huge coprime systems.

use std::collections::HashMap;

use groebner_field::types::Field;

use crate::matrix::{Matrix, MatrixRow};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purpose {
    /// Ordinary F4 iteration: promote nonzero residues to new pivots.
    Build,
    /// Reduce against the fixed upper set only, never promoting; export every residue.
    NormalForm,
    /// Like `NormalForm`, but stops at the first nonzero residue.
    IsGroebner,
}

pub struct ReduceOutcome<F> {
    /// For `Build`: the newly produced basis rows (nonzero residues that became
    /// pivots). For `NormalForm`: every residue, in the input lower-row order,
    /// including exact zeros (meaning the corresponding input polynomial lies
    /// in the ideal). Unused for `IsGroebner`.
    pub rows: Vec<MatrixRow<F>>,
    /// Meaningful for `IsGroebner` only.
    pub is_groebner: bool,
}

/// Subtract `(row[c] / pivot[c]) * pivot` from `row`, where `c` is `row`'s
/// current pivot column, via a sparse merge-by-column (spec §4.7 "over a
/// prime field this is a scalar multiply-add per non-zero in u").
fn eliminate<F: Field>(row: &mut MatrixRow<F>, pivot: &MatrixRow<F>) {
    let factor = row.coeffs[0].div(pivot.coeffs[0]);

    let mut cols = Vec::with_capacity(row.cols.len() + pivot.cols.len());
    let mut coeffs = Vec::with_capacity(cols.capacity());
    let (mut i, mut j) = (0, 0);
    while i < row.cols.len() && j < pivot.cols.len() {
        match row.cols[i].cmp(&pivot.cols[j]) {
            core::cmp::Ordering::Less => {
                cols.push(row.cols[i]);
                coeffs.push(row.coeffs[i]);
                i += 1;
            }
            core::cmp::Ordering::Greater => {
                cols.push(pivot.cols[j]);
                coeffs.push(pivot.coeffs[j].mul(factor).neg());
                j += 1;
            }
            core::cmp::Ordering::Equal => {
                let v = row.coeffs[i].sub(factor.mul(pivot.coeffs[j]));
                if !v.is_zero() {
                    cols.push(row.cols[i]);
                    coeffs.push(v);
                }
                i += 1;
                j += 1;
            }
        }
    }
    cols.extend_from_slice(&row.cols[i..]);
    coeffs.extend_from_slice(&row.coeffs[i..]);
    for &c in &pivot.cols[j..] {
        cols.push(c);
    }
    for &co in &pivot.coeffs[j..] {
        coeffs.push(co.mul(factor).neg());
    }

    row.cols = cols;
    row.coeffs = coeffs;
}

/// Run the deterministic reducer over `matrix` for the given `purpose` (spec
/// §4.7). Consumes the matrix: rows are mutated and filtered in place.
pub fn reduce<F: Field>(matrix: Matrix<F>, purpose: Purpose) -> ReduceOutcome<F> {
    let mut pivots: HashMap<u32, MatrixRow<F>> = HashMap::with_capacity(matrix.upper.len());
    for u in matrix.upper {
        let c = u.pivot_col().expect("an upper row can never be empty");
        pivots.insert(c, u);
    }

    let mut lower = matrix.lower;
    lower.sort_by_key(|r| r.pivot_col());

    let mut rows = Vec::new();

    for mut row in lower {
        loop {
            let Some(c) = row.pivot_col() else { break };
            let Some(pivot) = pivots.get(&c) else { break };
            eliminate(&mut row, pivot);
        }

        if row.is_empty() {
            if purpose == Purpose::NormalForm {
                rows.push(row);
            }
            continue;
        }

        match purpose {
            Purpose::Build => {
                let c = row.pivot_col().unwrap();
                pivots.insert(c, row.clone());
                rows.push(row);
            }
            Purpose::NormalForm => rows.push(row),
            Purpose::IsGroebner => {
                return ReduceOutcome { rows, is_groebner: false };
            }
        }
    }

    ReduceOutcome { rows, is_groebner: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groebner_field::modulus::{Modulus, Zp};

    fn row(cols: &[u32], coeffs: &[u64], modulus: Modulus) -> MatrixRow<Zp> {
        MatrixRow {
            cols: cols.to_vec(),
            coeffs: coeffs.iter().map(|&v| Zp::new(v, modulus)).collect(),
            poly: 0,
        }
    }

    #[test]
    fn lower_row_reduces_against_matching_upper_pivot() {
        let modulus = Modulus::new(101);
        // upper: column 0 has coeff 1 (pivot row: 1*col0 + 2*col1)
        let upper = row(&[0, 1], &[1, 2], modulus);
        // lower: 3*col0 + 1*col1, should reduce to (1 - 3*2) * col1 = -5 * col1
        let lower = row(&[0, 1], &[3, 1], modulus);
        let matrix = Matrix {
            upper: vec![upper],
            lower: vec![lower],
            id_of_col: vec![0, 1],
        };
        let out = reduce(matrix, Purpose::Build);
        assert_eq!(out.rows.len(), 1);
        let r = &out.rows[0];
        assert_eq!(r.cols, vec![1]);
        assert_eq!(r.coeffs[0], Zp::new(1, modulus).sub(Zp::new(6, modulus)));
    }

    #[test]
    fn row_that_fully_cancels_is_dropped_in_build_mode() {
        let modulus = Modulus::new(101);
        let upper = row(&[0], &[1], modulus);
        let lower = row(&[0], &[5], modulus);
        let matrix = Matrix {
            upper: vec![upper],
            lower: vec![lower],
            id_of_col: vec![0],
        };
        let out = reduce(matrix, Purpose::Build);
        assert!(out.rows.is_empty());
    }

    #[test]
    fn is_groebner_mode_stops_at_first_nonzero_residue() {
        let modulus = Modulus::new(101);
        let upper = row(&[0], &[1], modulus);
        let lower_zero = row(&[0], &[1], modulus);
        let lower_nonzero = row(&[0, 1], &[1, 1], modulus);
        let matrix = Matrix {
            upper: vec![upper],
            lower: vec![lower_zero, lower_nonzero],
            id_of_col: vec![0, 1],
        };
        let out = reduce(matrix, Purpose::IsGroebner);
        assert!(!out.is_groebner);
    }
}
