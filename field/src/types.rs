//! The `Field` capability trait, in the shape of the teacher crate's
//! `field/src/types.rs::Field` but shrunk to what the F4 engine actually
//! needs (no Frobenius, no two-adicity, no `BigUint` order — those matter
//! for FFT-friendly fields, not for the "any prime" fields a lucky-prime
//! sweep uses) and adapted for a runtime modulus (see `modulus.rs`).

use core::fmt::Debug;
use core::hash::Hash;

use crate::modulus::{Modulus, Zp};

/// Sampling, mirroring the teacher's `Sample` trait: used to draw the
/// hashtable's `hash_vector` and the randomized linear-algebra backend's
/// batch coefficients.
pub trait Sample: Sized {
    fn sample<R: rand::RngCore + ?Sized>(rng: &mut R, modulus: Modulus) -> Self;

    fn sample_nonzero<R: rand::RngCore + ?Sized>(rng: &mut R, modulus: Modulus) -> Self
    where
        Self: Field,
    {
        loop {
            let x = Self::sample(rng, modulus);
            if !x.is_zero() {
                return x;
            }
        }
    }
}

/// A field element: the capability set the matrix reducer, the symbolic
/// preprocessing multiplier computation, and the trace replay are generic
/// over.
pub trait Field: Copy + Clone + Debug + PartialEq + Eq + Hash + Sample {
    fn zero(modulus: Modulus) -> Self;
    fn one(modulus: Modulus) -> Self;
    fn modulus(&self) -> Modulus;
    fn is_zero(&self) -> bool;
    fn add(self, other: Self) -> Self;
    fn sub(self, other: Self) -> Self;
    fn neg(self) -> Self;
    fn mul(self, other: Self) -> Self;
    fn add_mul(self, a: Self, b: Self) -> Self;
    fn inverse(&self) -> Option<Self>;

    fn div(self, other: Self) -> Self {
        self.mul(other.inverse().expect("division by zero field element"))
    }
}

impl Sample for Zp {
    fn sample<R: rand::RngCore + ?Sized>(rng: &mut R, modulus: Modulus) -> Self {
        let v = rng.next_u64() % modulus.value();
        Zp::new(v, modulus)
    }
}

impl Field for Zp {
    fn zero(modulus: Modulus) -> Self {
        Zp::zero(modulus)
    }
    fn one(modulus: Modulus) -> Self {
        Zp::one(modulus)
    }
    fn modulus(&self) -> Modulus {
        Zp::modulus(self)
    }
    fn is_zero(&self) -> bool {
        Zp::is_zero(self)
    }
    fn add(self, other: Self) -> Self {
        Zp::add(self, other)
    }
    fn sub(self, other: Self) -> Self {
        Zp::sub(self, other)
    }
    fn neg(self) -> Self {
        Zp::neg(self)
    }
    fn mul(self, other: Self) -> Self {
        Zp::mul(self, other)
    }
    fn add_mul(self, a: Self, b: Self) -> Self {
        Zp::add_mul(self, a, b)
    }
    fn inverse(&self) -> Option<Self> {
        Zp::inverse(self)
    }
}
