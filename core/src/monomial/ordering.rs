//! Monomial orderings (spec §3 GLOSSARY, §4.1, §6 `ordering` option).

use core::cmp::Ordering as CmpOrdering;
use serde::{Deserialize, Serialize};

/// A total order on monomials compatible with multiplication.
///
/// Packed monomial representations only support `Degrevlex` (spec §4.1:
/// "Orderings supported by packed representations: degrevlex only");
/// `Dense`/`Sparse` support all four.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MonomialOrdering {
    Lex,
    Deglex,
    Degrevlex,
    /// Weighted order: compare `Σ w_i e_i` first, then break ties
    /// lexicographically. A length-`nvars` weight vector.
    Weighted(Vec<i64>),
}

impl MonomialOrdering {
    pub fn name(&self) -> &'static str {
        match self {
            MonomialOrdering::Lex => "lex",
            MonomialOrdering::Deglex => "deglex",
            MonomialOrdering::Degrevlex => "degrevlex",
            MonomialOrdering::Weighted(_) => "weighted",
        }
    }

    pub fn supports_packed(&self) -> bool {
        matches!(self, MonomialOrdering::Degrevlex)
    }

    /// Compare two exponent vectors of the same length under this ordering.
    /// `deg_a`/`deg_b` are precomputed total degrees (cheap to pass since
    /// every representation keeps them around).
    pub fn compare(&self, a: &[u32], b: &[u32], deg_a: u32, deg_b: u32) -> CmpOrdering {
        match self {
            MonomialOrdering::Lex => compare_lex(a, b),
            MonomialOrdering::Deglex => deg_a.cmp(&deg_b).then_with(|| compare_lex(a, b)),
            MonomialOrdering::Degrevlex => {
                deg_a.cmp(&deg_b).then_with(|| compare_revlex_tiebreak(a, b))
            }
            MonomialOrdering::Weighted(w) => {
                let wa: i64 = a.iter().zip(w).map(|(&e, &wi)| e as i64 * wi).sum();
                let wb: i64 = b.iter().zip(w).map(|(&e, &wi)| e as i64 * wi).sum();
                wa.cmp(&wb).then_with(|| compare_lex(a, b))
            }
        }
    }
}

fn compare_lex(a: &[u32], b: &[u32]) -> CmpOrdering {
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        match ai.cmp(&bi) {
            CmpOrdering::Equal => continue,
            other => return other,
        }
    }
    CmpOrdering::Equal
}

/// Degrevlex tie-break: among equal-degree monomials, the one with the
/// *smaller* exponent in the *last* variable that differs is considered
/// larger (reverse lexicographic, compared from the last variable back).
fn compare_revlex_tiebreak(a: &[u32], b: &[u32]) -> CmpOrdering {
    for (&ai, &bi) in a.iter().zip(b.iter()).rev() {
        match ai.cmp(&bi) {
            CmpOrdering::Equal => continue,
            CmpOrdering::Less => return CmpOrdering::Greater,
            CmpOrdering::Greater => return CmpOrdering::Less,
        }
    }
    CmpOrdering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrevlex_orders_by_degree_first() {
        let o = MonomialOrdering::Degrevlex;
        // x^2 (deg 2) vs xy (deg 2) vs y^3 (deg 3), n=2 vars [x,y]
        assert_eq!(o.compare(&[2, 0], &[0, 3], 2, 3), CmpOrdering::Less);
    }

    #[test]
    fn degrevlex_tiebreak() {
        let o = MonomialOrdering::Degrevlex;
        // x^2 vs xy: both degree 2. Revlex: compare last var first (y): 0 vs 1 -> y-exponent
        // smaller is "greater" under degrevlex, so x^2 (y^0) > xy (y^1).
        assert_eq!(o.compare(&[2, 0], &[1, 1], 2, 2), CmpOrdering::Greater);
    }

    #[test]
    fn lex_pure() {
        let o = MonomialOrdering::Lex;
        assert_eq!(o.compare(&[1, 5], &[2, 0], 6, 2), CmpOrdering::Less);
    }
}
