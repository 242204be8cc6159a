//! Critical-pair selection (spec §4.4).
//!
//! Only the `normal` strategy is actually implemented; `sugar` is accepted as
//! an `Options` value but degrades to `normal` (spec §4.4: "declared in
//! configuration but is permitted to fall back to normal" — we make that
//! fallback explicit rather than a silent alias, see `SelectionStrategy`).

use groebner_field::types::Field;

use crate::basis::Basis;
use crate::hashtable::{MonomId, MonomialHashtable};
use crate::monomial::{divmask::may_divide, Monomial};
use crate::pairset::{Pairset, SPair};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    #[default]
    Normal,
    /// Accepted, but every selection call below runs the `normal` strategy;
    /// we warn (spec §6 `selection` key) rather than pretend it is
    /// implemented.
    Sugar,
}

/// An upper (pivot/reducer) row to build: `multiplier * basis[poly]`.
#[derive(Clone, Copy, Debug)]
pub struct UpperRow {
    pub multiplier: MonomId,
    pub poly: usize,
}

/// A lower (to-reduce) row to build: `multiplier * basis[poly]`.
#[derive(Clone, Copy, Debug)]
pub struct LowerRow {
    pub multiplier: MonomId,
    pub poly: usize,
}

#[derive(Default)]
pub struct Selection {
    pub upper: Vec<UpperRow>,
    pub lower: Vec<LowerRow>,
    /// The S-pairs consumed by this selection, for bookkeeping/trace
    /// recording (spec §4.11: "the chosen critical-pair block").
    pub taken: Vec<SPair>,
    /// The basis index picked as reducer for each distinct lcm group, in the
    /// order groups were visited (spec §4.11: pair selection must itself be
    /// replayable "without search" on apply, not just symbolic
    /// preprocessing's reducer search).
    pub group_reducers: Vec<usize>,
}

impl Selection {
    fn is_empty(&self) -> bool {
        self.upper.is_empty() && self.lower.is_empty() && self.taken.is_empty()
    }
}

/// Drop the lowest-degree block of `count` pairs without building any rows
/// (spec §4.8 step 2 "discard_normal"): used when a trace marks the
/// iteration as empty, so replaying it needs only to keep the pairset's
/// contents in lockstep with the learn run, not to actually reduce anything.
pub fn discard_normal(pairset: &mut Pairset, count: usize) {
    pairset.compact();
    let pairs = pairset.live_pairs();
    if pairs.is_empty() || count == 0 {
        return;
    }
    let min_deg = pairs.iter().map(|p| p.deg).min().unwrap();
    let mut block: Vec<usize> = (0..pairs.len()).filter(|&i| pairs[i].deg == min_deg).collect();
    block.truncate(count.min(block.len()));
    pairset.take(block);
}

/// Select the lowest-degree block from `pairset` and remove it (spec §4.4
/// steps 1–3), then build the upper/lower row plan for it (step 4).
pub fn select<M: Monomial, F: Field>(
    pairset: &mut Pairset,
    basis: &Basis<F>,
    ht: &mut MonomialHashtable<M>,
    strategy: SelectionStrategy,
    maxpairs: Option<usize>,
) -> Selection {
    let _ = strategy; // both variants run the same selection, see module docs
    pairset.compact();
    let pairs = pairset.live_pairs();
    if pairs.is_empty() {
        return Selection::default();
    }

    let min_deg = pairs.iter().map(|p| p.deg).min().unwrap();
    let mut block: Vec<usize> = (0..pairs.len()).filter(|&i| pairs[i].deg == min_deg).collect();
    block.sort_by(|&a, &b| ht.isless(pairs[a].lcm.unwrap(), pairs[b].lcm.unwrap()));

    if let Some(cap) = maxpairs {
        if cap > 0 && block.len() > cap {
            let boundary_lcm = pairs[block[cap - 1]].lcm;
            let extend = block[cap..]
                .iter()
                .take_while(|&&i| pairs[i].lcm == boundary_lcm)
                .count();
            block.truncate(cap + extend);
        }
    }

    // Group the block's indices by lcm (they are already sorted by lcm, so
    // each group is a contiguous run).
    let mut groups: Vec<(MonomId, Vec<usize>)> = Vec::new();
    for &idx in &block {
        let lcm = pairs[idx].lcm.unwrap();
        match groups.last_mut() {
            Some((last_lcm, members)) if *last_lcm == lcm => members.push(idx),
            _ => groups.push((lcm, vec![idx])),
        }
    }

    let mut upper = Vec::new();
    let mut lower = Vec::new();
    let mut group_reducers = Vec::new();

    for (lcm, members) in &groups {
        let lcm_exp = ht.get(*lcm).clone();
        let divmask_lcm = ht.hashvalue(*lcm).divmask;

        let reducer = (0..basis.nfilled()).find(|&g| {
            if basis.is_redundant(g) {
                return false;
            }
            let lm_g = basis.leading_monom(g);
            let dm_g = ht.hashvalue(lm_g).divmask;
            may_divide(dm_g, divmask_lcm) && lcm_exp.is_divisible(ht.get(lm_g))
        });

        let Some(reducer) = reducer else {
            // No generator reduces this lcm: every pair in the group S-reduces
            // against each other directly with no pivot row, which cannot
            // happen once the basis contains the pair's own two generators
            // (both trivially divide their own lcm) — defensive only.
            continue;
        };
        group_reducers.push(reducer);
        let lm_reducer = basis.leading_monom(reducer);
        let mult_reducer = ht.insert(lcm_exp.quotient(ht.get(lm_reducer)));
        upper.push(UpperRow {
            multiplier: mult_reducer,
            poly: reducer,
        });

        let mut lower_polys: Vec<usize> = Vec::new();
        for &idx in members {
            for poly in [pairs[idx].poly1, pairs[idx].poly2] {
                if poly != reducer && !lower_polys.contains(&poly) {
                    lower_polys.push(poly);
                }
            }
        }
        for poly in lower_polys {
            let lm_poly = basis.leading_monom(poly);
            let mult = ht.insert(lcm_exp.quotient(ht.get(lm_poly)));
            lower.push(LowerRow {
                multiplier: mult,
                poly,
            });
        }
    }

    let taken = pairset.take(block);
    let selection = Selection {
        upper,
        lower,
        taken,
        group_reducers,
    };
    debug_assert!(!selection.is_empty() || pairs.is_empty());
    selection
}

/// Replay a previously recorded selection with no search over the basis
/// (spec §4.11 "select pairs without search: use the recorded block"):
/// the taken pairs are regrouped by lcm exactly as `select` would group
/// them (deterministic given a structurally identical basis and
/// hashtable), and `group_reducers` supplies the reducer choice positionally
/// instead of re-running the `find` search.
///
/// Returns `None` if replay cannot be completed faithfully: a recorded
/// reducer index is out of range, now redundant, or no longer divides its
/// group's lcm (spec §4.11 "unlucky specialization").
pub fn select_apply<M: Monomial, F: Field>(
    taken: &[SPair],
    group_reducers: &[usize],
    basis: &Basis<F>,
    ht: &mut MonomialHashtable<M>,
) -> Option<Selection> {
    let mut sorted = taken.to_vec();
    sorted.sort_by(|a, b| ht.isless(a.lcm.unwrap(), b.lcm.unwrap()));

    let mut groups: Vec<(MonomId, Vec<usize>)> = Vec::new();
    for (idx, pair) in sorted.iter().enumerate() {
        let lcm = pair.lcm.unwrap();
        match groups.last_mut() {
            Some((last_lcm, members)) if *last_lcm == lcm => members.push(idx),
            _ => groups.push((lcm, vec![idx])),
        }
    }

    if groups.len() != group_reducers.len() {
        return None;
    }

    let mut upper = Vec::new();
    let mut lower = Vec::new();

    for ((lcm, members), &reducer) in groups.iter().zip(group_reducers) {
        if reducer >= basis.nfilled() || basis.is_redundant(reducer) {
            return None;
        }
        let lcm_exp = ht.get(*lcm).clone();
        let lm_reducer = basis.leading_monom(reducer);
        if !lcm_exp.is_divisible(ht.get(lm_reducer)) {
            return None;
        }
        let mult_reducer = ht.insert(lcm_exp.quotient(ht.get(lm_reducer)));
        upper.push(UpperRow {
            multiplier: mult_reducer,
            poly: reducer,
        });

        let mut lower_polys: Vec<usize> = Vec::new();
        for &idx in members {
            for poly in [sorted[idx].poly1, sorted[idx].poly2] {
                if poly != reducer && !lower_polys.contains(&poly) {
                    lower_polys.push(poly);
                }
            }
        }
        for poly in lower_polys {
            let lm_poly = basis.leading_monom(poly);
            let mult = ht.insert(lcm_exp.quotient(ht.get(lm_poly)));
            lower.push(LowerRow {
                multiplier: mult,
                poly,
            });
        }
    }

    Some(Selection {
        upper,
        lower,
        taken: sorted,
        group_reducers: group_reducers.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::{dense::DenseMonomial, DivMap, MonomialOrdering};
    use groebner_field::modulus::{Modulus, Zp};

    fn ht_2vars() -> MonomialHashtable<DenseMonomial> {
        let divmap = DivMap::build(2, &[]);
        MonomialHashtable::new(2, MonomialOrdering::Degrevlex, divmap, 11)
    }

    fn push(basis: &mut Basis<Zp>, ht: &mut MonomialHashtable<DenseMonomial>, exps: &[u32], modulus: Modulus) -> usize {
        let id = ht.insert(DenseMonomial::from_exponents(exps).unwrap());
        basis.push(vec![id], vec![Zp::one(modulus)])
    }

    #[test]
    fn selects_single_lowest_degree_pair_and_builds_rows() {
        let modulus = Modulus::new(101);
        let mut ht = ht_2vars();
        let mut basis: Basis<Zp> = Basis::new();
        let mut pairset = Pairset::new();

        let i0 = push(&mut basis, &mut ht, &[2, 0], modulus);
        crate::update::update(&mut basis, &mut pairset, &mut ht, i0..i0 + 1);
        let i1 = push(&mut basis, &mut ht, &[1, 1], modulus);
        crate::update::update(&mut basis, &mut pairset, &mut ht, i1..i1 + 1);

        assert_eq!(pairset.len(), 1);
        let sel = select(&mut pairset, &basis, &mut ht, SelectionStrategy::Normal, None);
        assert_eq!(pairset.len(), 0);
        assert_eq!(sel.upper.len(), 1);
        assert_eq!(sel.lower.len(), 1);
        assert_eq!(sel.taken.len(), 1);
    }
}
