//! Lane-parallel arithmetic over four independent prime moduli at once —
//! the "composite batch" backend of spec §4.7, which "packs coefficients
//! into one SIMD lane per prime".
//!
//! The teacher crate gets its SIMD speedup by packing several elements of
//! *the same* field into one vector register (`field/src/packed.rs`,
//! `arch/x86_64/avx2_goldilocks_field.rs`). Here the four lanes hold the
//! *same coefficient* reduced modulo four *different* lucky primes, because
//! the multi-modular driver runs identical row-reduction arithmetic across
//! primes in a batch (spec §4.12 step 3a) and that arithmetic is exactly
//! the elementwise pattern lane-parallel fields are built for. We don't
//! reach for target-specific intrinsics (the teacher's `arch/` module) since
//! portability across the primes chosen at runtime matters more here than
//! the last constant factor; this is a safe, portable four-wide softvec.

use crate::modulus::Modulus;

pub const LANES: usize = 4;

/// Four lucky primes' reduction contexts, batched.
#[derive(Copy, Clone, Debug)]
pub struct PackedModulus {
    pub lanes: [Modulus; LANES],
}

impl PackedModulus {
    pub fn new(primes: [u64; LANES]) -> Self {
        Self {
            lanes: primes.map(Modulus::new),
        }
    }
}

/// A length-4 vector of field elements, one per lane, of possibly-distinct
/// moduli (the "batched" `Options::batched` backend, spec §6).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Packed4 {
    pub vals: [u64; LANES],
}

impl Packed4 {
    pub fn zero() -> Self {
        Self { vals: [0; LANES] }
    }

    pub fn splat_reduce(x: u64, pm: &PackedModulus) -> Self {
        let mut vals = [0u64; LANES];
        for i in 0..LANES {
            vals[i] = x % pm.lanes[i].value();
        }
        Self { vals }
    }

    pub fn add(self, other: Self, pm: &PackedModulus) -> Self {
        let mut vals = [0u64; LANES];
        for i in 0..LANES {
            vals[i] = pm.lanes[i].add(self.vals[i], other.vals[i]);
        }
        Self { vals }
    }

    pub fn sub(self, other: Self, pm: &PackedModulus) -> Self {
        let mut vals = [0u64; LANES];
        for i in 0..LANES {
            vals[i] = pm.lanes[i].sub(self.vals[i], other.vals[i]);
        }
        Self { vals }
    }

    pub fn mul(self, other: Self, pm: &PackedModulus) -> Self {
        let mut vals = [0u64; LANES];
        for i in 0..LANES {
            vals[i] = pm.lanes[i].mul(self.vals[i], other.vals[i]);
        }
        Self { vals }
    }

    /// `self + a * b`, the matrix reducer's inner loop, four primes at once.
    pub fn add_mul(self, a: Self, b: Self, pm: &PackedModulus) -> Self {
        let mut vals = [0u64; LANES];
        for i in 0..LANES {
            let prod = pm.lanes[i].mul(a.vals[i], b.vals[i]);
            vals[i] = pm.lanes[i].add(self.vals[i], prod);
        }
        Self { vals }
    }

    pub fn inverse(self, pm: &PackedModulus) -> Option<Self> {
        let mut vals = [0u64; LANES];
        for i in 0..LANES {
            vals[i] = pm.lanes[i].inverse(self.vals[i])?;
        }
        Some(Self { vals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanewise_matches_scalar() {
        let primes = [2147483647u64, 2013265921, 998244353, 1000000007];
        let pm = PackedModulus::new(primes);
        let a = Packed4::splat_reduce(123456789, &pm);
        let b = Packed4::splat_reduce(987654321, &pm);
        let c = a.mul(b, &pm);
        for i in 0..LANES {
            let expected = (123456789u128 * 987654321u128 % primes[i] as u128) as u64;
            assert_eq!(c.vals[i], expected);
        }
    }
}
