//! Update basis + pairset after an F4 iteration adds new polynomials (spec
//! §4.3 "Basis & pairset update (Gebauer–Möller)").

use core::ops::Range;

use groebner_field::types::Field;

use crate::basis::Basis;
use crate::hashtable::MonomialHashtable;
use crate::monomial::{divmask::may_divide, Monomial};
use crate::pairset::{Pairset, SPair};

fn coprime(a: &[u32], b: &[u32]) -> bool {
    a.iter().zip(b).all(|(&x, &y)| x == 0 || y == 0)
}

/// Apply §4.3 steps 1–6 to the polynomials in `new_range` (typically
/// `basis.nprocessed .. basis.nfilled()`).
pub fn update<M: Monomial, F: Field>(
    basis: &mut Basis<F>,
    pairset: &mut Pairset,
    ht: &mut MonomialHashtable<M>,
    new_range: Range<usize>,
) {
    for i in new_range {
        let lm_i = basis.leading_monom(i);
        let lm_i_exp = ht.get(lm_i).exponents();
        let divmask_i = ht.hashvalue(lm_i).divmask;

        // Step 1: redundancy test against the currently non-redundant set —
        // `i` is redundant if some existing non-redundant lead divides it.
        let redundant = basis.iter_nonredundant().any(|j| {
            if basis.is_redundant(j) {
                return false;
            }
            let lm_j = basis.leading_monom(j);
            let dm_j = ht.hashvalue(lm_j).divmask;
            may_divide(dm_j, divmask_i) && ht.get(lm_i).is_divisible(ht.get(lm_j))
        });
        if redundant {
            basis.mark_redundant(i);
            continue;
        }

        // Step 2: candidate pairs against every existing non-redundant poly.
        let mut candidates: Vec<SPair> = Vec::new();
        for &j in basis.nonredundant_indices() {
            if basis.is_redundant(j) || j == i {
                continue;
            }
            let lm_j = basis.leading_monom(j);
            let lm_j_exp = ht.get(lm_j).exponents();

            // Buchberger's first (coprime) criterion: if the leading terms
            // share no variable, the S-pair reduces to zero unconditionally
            // and the pair can be dropped outright.
            if coprime(&lm_j_exp, &lm_i_exp) {
                continue;
            }

            let lcm_monom = ht.get(lm_j).lcm(ht.get(lm_i)).expect("lcm of two valid monomials cannot overflow");
            let lcm_id = ht.insert(lcm_monom);
            let deg = ht.hashvalue(lcm_id).deg;
            candidates.push(SPair {
                poly1: j.min(i),
                poly2: j.max(i),
                lcm: Some(lcm_id),
                deg,
            });
        }

        // Tie-break: among candidates with equal lcm, keep the
        // lexicographically-smallest (poly1, poly2) (spec §4.3 last line).
        candidates.sort_by(|a, b| {
            a.lcm
                .cmp(&b.lcm)
                .then(a.poly1.cmp(&b.poly1))
                .then(a.poly2.cmp(&b.poly2))
        });
        candidates.dedup_by(|a, b| a.lcm == b.lcm);

        // Step 3 (the M/F criterion, among the new candidates themselves):
        // drop any candidate whose lcm is strictly divisible by another
        // surviving candidate's lcm. Divisibility already implies the
        // divisor's degree is not greater, so that half of the spec's
        // wording is automatic once the divisibility test holds.
        let lcms: Vec<_> = candidates.iter().map(|c| c.lcm.expect("candidates always carry an lcm")).collect();
        let keep: Vec<bool> = (0..candidates.len())
            .map(|k| {
                !(0..candidates.len()).any(|other| {
                    other != k && lcms[other] != lcms[k] && ht.get(lcms[k]).is_divisible(ht.get(lcms[other]))
                })
            })
            .collect();
        let mut keep_iter = keep.into_iter();
        candidates.retain(|_| keep_iter.next().unwrap());

        // Step 3 (LCM criterion, against already-present pairs): drop any
        // existing pair (a,b) whose lcm is divisible by lm_i and whose
        // degree exceeds max(deg_lcm(a,i), deg_lcm(b,i)).
        for pair in pairset.iter_mut() {
            let Some(pair_lcm) = pair.lcm else { continue };
            if pair.poly1 == i || pair.poly2 == i {
                continue;
            }
            if !ht.get(pair_lcm).is_divisible(ht.get(lm_i)) {
                continue;
            }
            let lm_a = basis.leading_monom(pair.poly1);
            let lm_b = basis.leading_monom(pair.poly2);
            let deg_ai = ht
                .get(lm_a)
                .lcm(ht.get(lm_i))
                .map(|m| m.totaldeg())
                .unwrap_or(u32::MAX);
            let deg_bi = ht
                .get(lm_b)
                .lcm(ht.get(lm_i))
                .map(|m| m.totaldeg())
                .unwrap_or(u32::MAX);
            if pair.deg > deg_ai.max(deg_bi) {
                pair.lcm = None;
            }
        }
        pairset.compact();

        for c in candidates {
            pairset.push(c);
        }

        // Step 4: any old non-redundant poly whose lead becomes divisible by
        // lm_i is now redundant.
        for &j in basis.nonredundant_indices().to_vec().iter() {
            if j == i || basis.is_redundant(j) {
                continue;
            }
            let lm_j = basis.leading_monom(j);
            if ht.get(lm_j).is_divisible(ht.get(lm_i)) {
                basis.mark_redundant(j);
            }
        }

        basis.register_nonredundant(i, divmask_i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::{dense::DenseMonomial, DivMap, MonomialOrdering};
    use groebner_field::modulus::{Modulus, Zp};

    fn ht_2vars() -> MonomialHashtable<DenseMonomial> {
        let divmap = DivMap::build(2, &[]);
        MonomialHashtable::new(2, MonomialOrdering::Degrevlex, divmap, 7)
    }

    fn ht_3vars() -> MonomialHashtable<DenseMonomial> {
        let divmap = DivMap::build(3, &[]);
        MonomialHashtable::new(3, MonomialOrdering::Degrevlex, divmap, 7)
    }

    fn push_monomial_poly(
        basis: &mut Basis<Zp>,
        ht: &mut MonomialHashtable<DenseMonomial>,
        exps: &[u32],
        modulus: Modulus,
    ) -> usize {
        let id = ht.insert(DenseMonomial::from_exponents(exps).unwrap());
        basis.push(vec![id], vec![Zp::one(modulus)])
    }

    #[test]
    fn coprime_leads_produce_no_pair() {
        let modulus = Modulus::new(101);
        let mut ht = ht_2vars();
        let mut basis: Basis<Zp> = Basis::new();
        let mut pairset = Pairset::new();

        let i0 = push_monomial_poly(&mut basis, &mut ht, &[1, 0], modulus);
        update(&mut basis, &mut pairset, &mut ht, i0..i0 + 1);

        let i1 = push_monomial_poly(&mut basis, &mut ht, &[0, 1], modulus);
        update(&mut basis, &mut pairset, &mut ht, i1..i1 + 1);

        assert_eq!(pairset.len(), 0);
        assert_eq!(basis.nnonredundant(), 2);
    }

    #[test]
    fn overlapping_leads_produce_a_pair_with_correct_lcm() {
        let modulus = Modulus::new(101);
        let mut ht = ht_2vars();
        let mut basis: Basis<Zp> = Basis::new();
        let mut pairset = Pairset::new();

        let i0 = push_monomial_poly(&mut basis, &mut ht, &[2, 0], modulus);
        update(&mut basis, &mut pairset, &mut ht, i0..i0 + 1);

        let i1 = push_monomial_poly(&mut basis, &mut ht, &[1, 1], modulus);
        update(&mut basis, &mut pairset, &mut ht, i1..i1 + 1);

        assert_eq!(pairset.len(), 1);
        let pair = pairset.iter().next().unwrap();
        let lcm_id = pair.lcm.unwrap();
        assert_eq!(ht.get(lcm_id).exponents(), vec![2, 1]);
    }

    #[test]
    fn new_divisor_of_existing_lead_marks_it_redundant() {
        let modulus = Modulus::new(101);
        let mut ht = ht_2vars();
        let mut basis: Basis<Zp> = Basis::new();
        let mut pairset = Pairset::new();

        let i0 = push_monomial_poly(&mut basis, &mut ht, &[2, 0], modulus);
        update(&mut basis, &mut pairset, &mut ht, i0..i0 + 1);

        // x divides x^2: the existing generator becomes redundant.
        let i1 = push_monomial_poly(&mut basis, &mut ht, &[1, 0], modulus);
        update(&mut basis, &mut pairset, &mut ht, i1..i1 + 1);

        assert!(basis.is_redundant(i0));
        assert!(!basis.is_redundant(i1));
    }

    #[test]
    fn new_poly_divisible_by_existing_is_marked_redundant_itself() {
        let modulus = Modulus::new(101);
        let mut ht = ht_2vars();
        let mut basis: Basis<Zp> = Basis::new();
        let mut pairset = Pairset::new();

        let i0 = push_monomial_poly(&mut basis, &mut ht, &[1, 0], modulus);
        update(&mut basis, &mut pairset, &mut ht, i0..i0 + 1);

        let i1 = push_monomial_poly(&mut basis, &mut ht, &[2, 0], modulus);
        update(&mut basis, &mut pairset, &mut ht, i1..i1 + 1);

        assert!(basis.is_redundant(i1));
        assert_eq!(basis.nnonredundant(), 1);
    }

    #[test]
    fn mf_criterion_prunes_a_new_candidate_whose_lcm_is_strictly_divisible_by_anothers() {
        let modulus = Modulus::new(101);
        let mut ht = ht_3vars();
        let mut basis: Basis<Zp> = Basis::new();
        let mut pairset = Pairset::new();

        // j1, j2 independent (neither lead divides the other); i shares a
        // variable with both, so both candidate pairs pass the coprime
        // criterion, but lcm(j1, i) = [2,1,5] strictly divides
        // lcm(j2, i) = [2,2,5] — the (j2, i) pair should be pruned.
        let j1 = push_monomial_poly(&mut basis, &mut ht, &[2, 0, 3], modulus);
        update(&mut basis, &mut pairset, &mut ht, j1..j1 + 1);
        let j2 = push_monomial_poly(&mut basis, &mut ht, &[2, 2, 0], modulus);
        update(&mut basis, &mut pairset, &mut ht, j2..j2 + 1);

        let i = push_monomial_poly(&mut basis, &mut ht, &[1, 1, 5], modulus);
        update(&mut basis, &mut pairset, &mut ht, i..i + 1);

        let lcms: Vec<Vec<u32>> = pairset.iter().map(|p| ht.get(p.lcm.unwrap()).exponents()).collect();
        assert!(lcms.contains(&vec![2, 1, 5]), "expected the surviving pair's lcm, got {lcms:?}");
        assert!(!lcms.contains(&vec![2, 2, 5]), "the strictly-divisible pair should have been pruned, got {lcms:?}");
        assert_eq!(pairset.len(), 2, "pair against j1 survives plus the pre-existing (j1, j2) pair");
    }
}
