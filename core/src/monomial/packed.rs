//! Packed monomial: several exponents per machine word, degrevlex-favourable
//! (spec §3: "the *first* component of the first word reserved for the total
//! degree"; spec §4.1: divisibility via a "lane-parallel ≥ test on the
//! word").
//!
//! We fix the lane width at 8 bits (exponents/degree `< 128`), which keeps
//! the divisibility SWAR trick below in one code path instead of the full
//! `PackedTuple1..4<T,B>` family the spec's Design Notes (§9) describe as a
//! tagged union over word width `T` and component width `B`; wider lanes are
//! a mechanical generalization of the same trick and are a natural follow-on,
//! not implemented here (see DESIGN.md).

use groebner_field::exponent::ExponentOverflow;

use super::{divmask::DivMap, Monomial, MonomialOrdering};

const BITS: u32 = 8;
const LANES_PER_WORD: u32 = 64 / BITS;
/// Lanes available for exponents in the first word (lane 0 is the degree).
const FIRST_WORD_EXP_LANES: u32 = LANES_PER_WORD - 1;
const LANE_MAX: u32 = (1 << (BITS - 1)) - 1; // componentwise value must leave the MSB free

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackedMonomial {
    words: Vec<u64>,
    nvars: usize,
}

fn lane_get(word: u64, lane: u32) -> u32 {
    ((word >> (lane * BITS)) & ((1 << BITS) - 1)) as u32
}

fn lane_set(word: &mut u64, lane: u32, value: u32) {
    let shift = lane * BITS;
    let mask = ((1u64 << BITS) - 1) << shift;
    *word = (*word & !mask) | ((value as u64) << shift);
}

/// Mask with the MSB of every lane set, used by the divisibility SWAR trick.
fn msb_mask() -> u64 {
    let mut m = 0u64;
    for i in 0..LANES_PER_WORD {
        m |= 1u64 << (i * BITS + BITS - 1);
    }
    m
}

/// Lane-parallel `a_i >= b_i` for every lane, assuming every lane value is
/// `<= LANE_MAX` (so the MSB of each lane is free to use as a borrow flag).
/// Returns `false` (conservatively) if `b`'s lane values aren't within that
/// bound — divisibility then falls back to the exact per-lane compare done
/// by `PackedMonomial::is_divisible`.
fn word_ge(a: u64, b: u64) -> bool {
    let msb = msb_mask();
    let diff = (a | msb).wrapping_sub(b);
    diff & msb == msb
}

impl PackedMonomial {
    fn nwords(nvars: usize) -> usize {
        if nvars <= FIRST_WORD_EXP_LANES as usize {
            1
        } else {
            1 + groebner_util::ceil_div_usize(nvars - FIRST_WORD_EXP_LANES as usize, LANES_PER_WORD as usize)
        }
    }

    fn lane_of(var: usize) -> (usize, u32) {
        if var < FIRST_WORD_EXP_LANES as usize {
            (0, var as u32 + 1)
        } else {
            let rest = var - FIRST_WORD_EXP_LANES as usize;
            (1 + rest / LANES_PER_WORD as usize, (rest % LANES_PER_WORD as usize) as u32)
        }
    }

    fn get(&self, var: usize) -> u32 {
        let (w, lane) = Self::lane_of(var);
        lane_get(self.words[w], lane)
    }

    fn degree_lane(&self) -> u32 {
        lane_get(self.words[0], 0)
    }
}

impl Monomial for PackedMonomial {
    fn from_exponents(exps: &[u32]) -> Result<Self, ExponentOverflow> {
        let nvars = exps.len();
        let mut words = vec![0u64; Self::nwords(nvars)];
        let mut deg: u64 = 0;
        for (var, &e) in exps.iter().enumerate() {
            if e > LANE_MAX {
                return Err(ExponentOverflow);
            }
            deg += e as u64;
            let (w, lane) = Self::lane_of(var);
            lane_set(&mut words[w], lane, e);
        }
        if deg > LANE_MAX as u64 {
            return Err(ExponentOverflow);
        }
        lane_set(&mut words[0], 0, deg as u32);
        Ok(Self { words, nvars })
    }

    fn nvars(&self) -> usize {
        self.nvars
    }

    fn exponents(&self) -> Vec<u32> {
        (0..self.nvars).map(|v| self.get(v)).collect()
    }

    fn totaldeg(&self) -> u32 {
        self.degree_lane()
    }

    fn product(&self, other: &Self) -> Result<Self, ExponentOverflow> {
        debug_assert_eq!(self.nvars, other.nvars);
        let exps: Vec<u32> = (0..self.nvars).map(|v| self.get(v) + other.get(v)).collect();
        Self::from_exponents(&exps)
    }

    fn quotient(&self, other: &Self) -> Self {
        let exps: Vec<u32> = (0..self.nvars)
            .map(|v| {
                let a = self.get(v);
                let b = other.get(v);
                assert!(a >= b, "packed exponent underflow: quotient of non-divisible monomials");
                a - b
            })
            .collect();
        Self::from_exponents(&exps).expect("quotient of valid monomials cannot overflow")
    }

    fn lcm(&self, other: &Self) -> Result<Self, ExponentOverflow> {
        let exps: Vec<u32> = (0..self.nvars).map(|v| self.get(v).max(other.get(v))).collect();
        Self::from_exponents(&exps)
    }

    fn is_divisible(&self, other: &Self) -> bool {
        debug_assert_eq!(self.nvars, other.nvars);
        // Fast path: word-level lane-parallel test when every lane of `other`
        // is within the SWAR bound.
        let fast = self
            .words
            .iter()
            .zip(&other.words)
            .all(|(&a, &b)| word_ge(a, b));
        if fast {
            return true;
        }
        // Exact fallback (also handles the boundary where `word_ge` over- or
        // under-approximates because of lane values right at LANE_MAX).
        (0..self.nvars).all(|v| self.get(v) >= other.get(v))
    }

    fn hash(&self, hash_vector: &[u64]) -> u64 {
        (0..self.nvars)
            .zip(hash_vector)
            .fold(0u64, |acc, (v, &h)| acc.wrapping_add(h.wrapping_mul(self.get(v) as u64)))
    }

    fn isless(&self, other: &Self, ordering: &MonomialOrdering) -> core::cmp::Ordering {
        assert!(
            ordering.supports_packed(),
            "packed monomials only support degrevlex"
        );
        let deg_cmp = self.degree_lane().cmp(&other.degree_lane());
        if deg_cmp != core::cmp::Ordering::Equal {
            return deg_cmp;
        }
        // Tie-break on degrevlex: compare words back-to-front, lanes back-to-front.
        for w in (0..self.words.len()).rev() {
            if self.words[w] == other.words[w] {
                continue;
            }
            let lanes_in_word = if w == 0 { LANES_PER_WORD } else { LANES_PER_WORD };
            let start = if w == 0 { 1 } else { 0 };
            for lane in (start..lanes_in_word).rev() {
                let a = lane_get(self.words[w], lane);
                let b = lane_get(other.words[w], lane);
                match a.cmp(&b) {
                    core::cmp::Ordering::Equal => continue,
                    core::cmp::Ordering::Less => return core::cmp::Ordering::Greater,
                    core::cmp::Ordering::Greater => return core::cmp::Ordering::Less,
                }
            }
        }
        core::cmp::Ordering::Equal
    }

    fn create_divmask(&self, divmap: &DivMap) -> u32 {
        divmap.compute(&self.exponents())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_exponents() {
        let exps = vec![1u32, 2, 0, 5, 7];
        let m = PackedMonomial::from_exponents(&exps).unwrap();
        assert_eq!(m.exponents(), exps);
        assert_eq!(m.totaldeg(), 15);
    }

    #[test]
    fn product_quotient() {
        let a = PackedMonomial::from_exponents(&[1, 2, 0]).unwrap();
        let b = PackedMonomial::from_exponents(&[0, 1, 3]).unwrap();
        let p = a.product(&b).unwrap();
        assert_eq!(p.exponents(), vec![1, 3, 3]);
        assert_eq!(p.quotient(&a).exponents(), vec![0, 1, 3]);
    }

    #[test]
    fn divisibility_matches_dense_semantics() {
        let a = PackedMonomial::from_exponents(&[3, 2]).unwrap();
        let b = PackedMonomial::from_exponents(&[1, 2]).unwrap();
        assert!(a.is_divisible(&b));
        assert!(!b.is_divisible(&a));
    }

    #[test]
    fn degree_overflow_detected() {
        assert!(PackedMonomial::from_exponents(&[100, 100]).is_err());
    }

    #[test]
    fn spans_multiple_words() {
        let exps: Vec<u32> = (0..20).map(|i| (i % 3) as u32).collect();
        let m = PackedMonomial::from_exponents(&exps).unwrap();
        assert_eq!(m.exponents(), exps);
        assert_eq!(PackedMonomial::nwords(20), 1 + groebner_util::ceil_div_usize(20 - 7, 8));
    }
}
