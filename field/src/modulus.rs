//! Runtime prime modulus with Barrett reduction, and the `Zp` coefficient
//! element type built on top of it.
//!
//! Unlike the teacher crate's fields (`GoldilocksField` and friends), which
//! fix their modulus at the type level, the multi-modular driver (spec §4.12)
//! runs the same F4 engine over a new prime for every batch, so the modulus
//! has to be a runtime value carried alongside the element. `Modulus`
//! precomputes the Barrett constant once per prime; every field op after that
//! is a multiply plus a correction subtraction, the "native modular with
//! precomputed inverse" option of spec §4.7.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::inversion::try_inverse_u64;

/// A prime modulus `p` fitting in 63 bits, with a precomputed Barrett
/// reduction constant `mu = floor(2^126 / p)`.
///
/// 126 (not 128) bits of headroom keeps every intermediate product
/// `a * b < p^2 < 2^126` representable in a `u128` without overflow when we
/// then multiply by `mu` (also < 2^126), at the cost of restricting `p` to 63
/// bits; spec §4.7 allows 8/16/32/63-bit moduli, so this is within budget.
#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Modulus {
    p: u64,
    mu: u128,
}

const BARRETT_SHIFT: u32 = 126;

impl Modulus {
    pub fn new(p: u64) -> Self {
        assert!(p > 1, "modulus must be > 1");
        assert!(p >> 63 == 0, "modulus must fit in 63 bits");
        let mu = (1u128 << BARRETT_SHIFT) / (p as u128);
        Self { p, mu }
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.p
    }

    /// Reduce `x < p^2` to its canonical representative in `[0, p)`.
    #[inline]
    pub fn reduce(&self, x: u128) -> u64 {
        debug_assert!(x < 1u128 << BARRETT_SHIFT, "Barrett reduction input out of range");
        let q = (x * self.mu) >> BARRETT_SHIFT;
        let mut r = (x - q * self.p as u128) as u64;
        while r >= self.p {
            r -= self.p;
        }
        r
    }

    #[inline]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        let s = a + b;
        if s >= self.p {
            s - self.p
        } else {
            s
        }
    }

    #[inline]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            self.p - (b - a)
        }
    }

    #[inline]
    pub fn neg(&self, a: u64) -> u64 {
        if a == 0 {
            0
        } else {
            self.p - a
        }
    }

    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        self.reduce(a as u128 * b as u128)
    }

    pub fn pow(&self, mut base: u64, mut exp: u64) -> u64 {
        let mut acc = 1u64 % self.p;
        base %= self.p;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = self.mul(acc, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }
        acc
    }

    pub fn inverse(&self, a: u64) -> Option<u64> {
        try_inverse_u64(a % self.p, self.p)
    }

    /// True iff `a` is divisible by `p`, i.e. `p` divides the leading
    /// coefficient `a` (used by the multi-modular driver to skip primes
    /// dividing a leading coefficient, spec §4.12 step 3a).
    pub fn divides(&self, a: u64) -> bool {
        a % self.p == 0
    }
}

impl fmt::Debug for Modulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modulus({})", self.p)
    }
}

/// A field element of `Z/pZ`, tagged with the modulus it belongs to.
///
/// Arithmetic between elements of different moduli panics in debug builds;
/// callers (the matrix / linear-algebra code) only ever mix elements drawn
/// from a single F4 run's modulus, so this is a logic-bug assertion, not a
/// recoverable error (spec §7: "arithmetic underflow ... a logic bug").
#[derive(Copy, Clone, Serialize, Deserialize)]
pub struct Zp {
    val: u64,
    modulus: Modulus,
}

impl Zp {
    #[inline]
    pub fn new(val: u64, modulus: Modulus) -> Self {
        Self {
            val: val % modulus.value().max(1),
            modulus,
        }
    }

    #[inline]
    pub fn zero(modulus: Modulus) -> Self {
        Self { val: 0, modulus }
    }

    #[inline]
    pub fn one(modulus: Modulus) -> Self {
        Self {
            val: 1 % modulus.value(),
            modulus,
        }
    }

    #[inline]
    pub fn modulus(&self) -> Modulus {
        self.modulus
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.val
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.val == 0
    }

    #[inline]
    fn check_compat(&self, other: &Self) {
        debug_assert_eq!(
            self.modulus.value(),
            other.modulus.value(),
            "mixed-modulus arithmetic"
        );
    }

    #[inline]
    pub fn add(self, other: Self) -> Self {
        self.check_compat(&other);
        Self {
            val: self.modulus.add(self.val, other.val),
            modulus: self.modulus,
        }
    }

    #[inline]
    pub fn sub(self, other: Self) -> Self {
        self.check_compat(&other);
        Self {
            val: self.modulus.sub(self.val, other.val),
            modulus: self.modulus,
        }
    }

    #[inline]
    pub fn neg(self) -> Self {
        Self {
            val: self.modulus.neg(self.val),
            modulus: self.modulus,
        }
    }

    #[inline]
    pub fn mul(self, other: Self) -> Self {
        self.check_compat(&other);
        Self {
            val: self.modulus.mul(self.val, other.val),
            modulus: self.modulus,
        }
    }

    /// Multiply-add: `self + a * b`. Hot path of the matrix reducer
    /// (spec §4.7: "scalar multiply-add per non-zero in u").
    #[inline]
    pub fn add_mul(self, a: Self, b: Self) -> Self {
        self.check_compat(&a);
        let prod = self.modulus.mul(a.val, b.val);
        Self {
            val: self.modulus.add(self.val, prod),
            modulus: self.modulus,
        }
    }

    pub fn inverse(&self) -> Option<Self> {
        self.modulus.inverse(self.val).map(|v| Self {
            val: v,
            modulus: self.modulus,
        })
    }

    pub fn pow(&self, exp: u64) -> Self {
        Self {
            val: self.modulus.pow(self.val, exp),
            modulus: self.modulus,
        }
    }
}

impl PartialEq for Zp {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val && self.modulus.value() == other.modulus.value()
    }
}
impl Eq for Zp {}

impl Hash for Zp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.val.hash(state);
    }
}

impl fmt::Debug for Zp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (mod {})", self.val, self.modulus.value())
    }
}

impl fmt::Display for Zp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_roundtrip() {
        let m = Modulus::new((1u64 << 31) - 1);
        let a = Zp::new(10, m);
        let b = Zp::new(20, m);
        assert_eq!(a.add(b).sub(b), a);
    }

    #[test]
    fn inverse_roundtrip() {
        let m = Modulus::new(2147483647);
        for v in [1u64, 2, 3, 12345, 2147483646] {
            let a = Zp::new(v, m);
            let inv = a.inverse().unwrap();
            assert_eq!(a.mul(inv), Zp::one(m));
        }
    }

    #[test]
    fn mul_matches_naive() {
        let m = Modulus::new(1_000_003);
        let a = Zp::new(999_999, m);
        let b = Zp::new(500_001, m);
        let expected = (999_999u128 * 500_001u128 % 1_000_003u128) as u64;
        assert_eq!(a.mul(b).value(), expected);
    }
}
