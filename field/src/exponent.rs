//! Overflow-checked exponent-vector arithmetic (spec §4.1).
//!
//! This is pure integer arithmetic over whatever small unsigned component
//! type `B` a monomial representation picks (`u8`/`u16`/`u32`/`u64`), so it
//! lives next to the other arithmetic primitives in this crate rather than in
//! `groebner-core`'s monomial module, which only picks layouts.

use core::fmt::Debug;

use num::traits::CheckedAdd;
use num::Zero;

/// Signalled when a monomial operation would exceed the component-bit
/// budget of the chosen representation (spec §3: "Invariant ... overflow in
/// any component is detected and signalled"; spec §7: surfaces as
/// `MonomialDegreeOverflow`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentOverflow;

/// Sum exponents, failing on overflow of the component type (or the
/// accumulator, if different — callers pass a wider accumulator type when a
/// packed representation's reserved degree slot is wider than each lane).
pub fn checked_total_degree<T>(exps: &[T]) -> Result<T, ExponentOverflow>
where
    T: Copy + Zero + CheckedAdd,
{
    let mut acc = T::zero();
    for &e in exps {
        acc = acc.checked_add(&e).ok_or(ExponentOverflow)?;
    }
    Ok(acc)
}

/// `a + b`, checked. Used by `product`/`lcm`.
pub fn checked_add<T: CheckedAdd>(a: T, b: T) -> Result<T, ExponentOverflow> {
    a.checked_add(&b).ok_or(ExponentOverflow)
}

/// `a - b`, assuming `a >= b` componentwise (the caller has already verified
/// divisibility — spec §4.1: "quotient assumes divisibility"). An underflow
/// here is a logic bug elsewhere, not a recoverable condition (spec §7), so
/// this panics rather than returning a `Result`.
pub fn sub_assume_ge<T>(a: T, b: T) -> T
where
    T: Copy + Debug + PartialOrd + core::ops::Sub<Output = T>,
{
    assert!(
        a >= b,
        "exponent underflow: {a:?} - {b:?} (quotient of non-divisible monomials)"
    );
    a - b
}

/// Componentwise max, checked against an accumulator overflow (used by `lcm`,
/// which cannot itself overflow past either operand's max, but the degree
/// recomputation that follows can).
pub fn max_component<T: PartialOrd + Copy>(a: T, b: T) -> T {
    if a >= b {
        a
    } else {
        b
    }
}

/// `a_i >= b_i` for every component, i.e. `b` divides `a`.
pub fn is_divisible<T: PartialOrd + Copy>(a: &[T], b: &[T]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).all(|(&ai, &bi)| ai >= bi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_detected() {
        let exps: [u8; 3] = [200, 100, 10];
        assert_eq!(checked_total_degree(&exps), Err(ExponentOverflow));
    }

    #[test]
    fn no_overflow() {
        let exps: [u16; 3] = [200, 100, 10];
        assert_eq!(checked_total_degree(&exps), Ok(310u16));
    }

    #[test]
    fn divisibility() {
        assert!(is_divisible(&[3u32, 2, 0], &[1, 2, 0]));
        assert!(!is_divisible(&[3u32, 2, 0], &[1, 3, 0]));
    }
}
