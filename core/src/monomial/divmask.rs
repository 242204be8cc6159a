//! Divisibility masks (spec §3 "Divmask", §4.1 `create_divmask`).
//!
//! A divmask is a one-sided filter: `a.divmask & !b.divmask == 0` whenever
//! `a` divides `b`, but the converse need not hold. It lets
//! `is_divisible` short-circuit most non-divisor candidates with a single
//! word AND before paying for the full componentwise compare.

pub const DIVMASK_BITS: u32 = 32;

/// Per-variable exponent thresholds used to compute divmasks.
///
/// Built once per F4 run from a sample of the input's exponents: each of the
/// first `ndivvars` variables gets `ndivbits` threshold buckets, roughly
/// evenly spaced between 1 and that variable's observed maximum exponent
/// (spec §4.1: "for each of the first ndivvars variables and each of ndivbits
/// thresholds, set the corresponding bit if a_v >= divmap[v,t]").
#[derive(Debug, Clone)]
pub struct DivMap {
    ndivvars: usize,
    nbits_per_var: u32,
    /// thresholds[v * nbits_per_var + t]
    thresholds: Vec<u32>,
}

impl DivMap {
    pub fn build(nvars: usize, sample: &[Vec<u32>]) -> Self {
        let ndivvars = nvars.min(DIVMASK_BITS as usize);
        let nbits_per_var = if ndivvars == 0 {
            0
        } else {
            DIVMASK_BITS / ndivvars as u32
        };
        let mut maxima = vec![0u32; ndivvars];
        for exps in sample {
            for v in 0..ndivvars {
                maxima[v] = maxima[v].max(exps.get(v).copied().unwrap_or(0));
            }
        }
        let mut thresholds = vec![0u32; ndivvars * nbits_per_var as usize];
        for v in 0..ndivvars {
            let max = maxima[v].max(1);
            for t in 0..nbits_per_var {
                // Evenly spaced thresholds in [1, max], densest bucket first so that low
                // exponents still discriminate.
                let frac = (t as u64 + 1) * max as u64 / (nbits_per_var as u64 + 1);
                thresholds[v * nbits_per_var as usize + t as usize] = (frac as u32).max(1);
            }
        }
        Self {
            ndivvars,
            nbits_per_var,
            thresholds,
        }
    }

    pub fn compute(&self, exps: &[u32]) -> u32 {
        let mut mask = 0u32;
        let mut bit = 0u32;
        for v in 0..self.ndivvars {
            let ev = exps.get(v).copied().unwrap_or(0);
            for t in 0..self.nbits_per_var {
                if ev >= self.thresholds[v * self.nbits_per_var as usize + t as usize] {
                    mask |= 1 << bit;
                }
                bit += 1;
            }
        }
        mask
    }
}

/// `a` is a divmask for a divisor candidate, `b` for the dividend. If this
/// returns `false`, `a` definitely does not divide `b` and the caller can
/// skip the full exponent compare.
#[inline(always)]
pub fn may_divide(a_divmask: u32, b_divmask: u32) -> bool {
    a_divmask & !b_divmask == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divmask_is_one_sided_filter() {
        let sample = vec![vec![5, 3], vec![2, 8]];
        let map = DivMap::build(2, &sample);
        let a = vec![1u32, 1];
        let b = vec![3u32, 4];
        let ma = map.compute(&a);
        let mb = map.compute(&b);
        // a divides b componentwise, so the mask must claim "maybe divides".
        assert!(may_divide(ma, mb));
    }

    #[test]
    fn non_divisor_often_filtered() {
        let sample = vec![vec![10, 10]];
        let map = DivMap::build(2, &sample);
        let a = vec![9u32, 9];
        let b = vec![1u32, 1];
        let ma = map.compute(&a);
        let mb = map.compute(&b);
        assert!(!may_divide(ma, mb));
    }
}
