//! Field-axiom conformance checks, in the shape of the teacher crate's
//! `field_testing.rs` / `prime_field_testing.rs` (which the teacher includes
//! from each concrete field type's test module); here there is only one
//! concrete field (`Zp`), so the suite lives directly in this crate.

use crate::modulus::Modulus;
use crate::types::Field;

fn test_moduli() -> Vec<Modulus> {
    vec![
        Modulus::new(2),
        Modulus::new(3),
        Modulus::new(101),
        Modulus::new(2147483647),
        Modulus::new((1u64 << 61) - 1),
    ]
}

#[test]
fn additive_identity() {
    for m in test_moduli() {
        let zero = crate::modulus::Zp::zero(m);
        let a = crate::modulus::Zp::new(42, m);
        assert_eq!(a.add(zero), a);
    }
}

#[test]
fn multiplicative_identity() {
    for m in test_moduli() {
        let one = crate::modulus::Zp::one(m);
        let a = crate::modulus::Zp::new(42, m);
        assert_eq!(a.mul(one), a);
    }
}

#[test]
fn additive_inverse() {
    for m in test_moduli() {
        let a = crate::modulus::Zp::new(42, m);
        let zero = crate::modulus::Zp::zero(m);
        assert_eq!(a.add(a.neg()), zero);
    }
}

#[test]
fn distributivity() {
    for m in test_moduli() {
        if m.value() < 5 {
            continue;
        }
        let a = crate::modulus::Zp::new(7, m);
        let b = crate::modulus::Zp::new(11, m);
        let c = crate::modulus::Zp::new(13, m);
        assert_eq!(a.mul(b.add(c)), a.mul(b).add(a.mul(c)));
    }
}

#[test]
fn inverse_of_nonzero() {
    for m in test_moduli() {
        for v in 1..m.value().min(30) {
            let a = crate::modulus::Zp::new(v, m);
            let inv = a.inverse().expect("nonzero element must invert");
            assert_eq!(a.mul(inv), crate::modulus::Zp::one(m));
        }
    }
}

#[test]
fn zero_has_no_inverse() {
    for m in test_moduli() {
        let zero = crate::modulus::Zp::zero(m);
        assert!(zero.inverse().is_none());
    }
}
