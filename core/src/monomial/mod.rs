//! Monomial representations (spec §2.1, §4.1).
//!
//! The engine is generic over a concrete `Monomial` implementation rather
//! than boxing a trait object per monomial (spec §9 "Polymorphism over
//! monomial representations": "a tagged-union ... or parametric (generic)
//! code specialized per concrete type"); we take the parametric route, the
//! way the teacher crate's `Field` trait is a capability set implemented by
//! concrete types and the rest of the crate is generic over it
//! (`field/src/types.rs`).

pub mod dense;
pub mod divmask;
pub mod ordering;
pub mod packed;
pub mod sparse;

pub use divmask::DivMap;
pub use ordering::MonomialOrdering;

use groebner_field::exponent::ExponentOverflow;

/// The capability set every monomial representation exposes (spec §4.1).
pub trait Monomial: Clone + core::fmt::Debug + Eq {
    /// Construct from an exponent vector, failing if any exponent or the
    /// total degree would overflow this representation's component width.
    fn from_exponents(exps: &[u32]) -> Result<Self, ExponentOverflow>
    where
        Self: Sized;

    fn nvars(&self) -> usize;

    /// Materialize as a plain exponent vector (used by orderings, by
    /// hashing, and at the I/O boundary).
    fn exponents(&self) -> Vec<u32>;

    fn totaldeg(&self) -> u32;

    fn product(&self, other: &Self) -> Result<Self, ExponentOverflow>
    where
        Self: Sized;

    /// `self / other`, assuming `other` divides `self` (caller-guaranteed,
    /// spec §4.1).
    fn quotient(&self, other: &Self) -> Self
    where
        Self: Sized;

    fn lcm(&self, other: &Self) -> Result<Self, ExponentOverflow>
    where
        Self: Sized;

    fn is_divisible(&self, other: &Self) -> bool;

    fn is_divisible_with(&self, other: &Self) -> Option<Self>
    where
        Self: Sized,
    {
        if self.is_divisible(other) {
            Some(self.quotient(other))
        } else {
            None
        }
    }

    /// `Σ e_i * hash_vector[i]`, wrapping in `u64`. Must satisfy
    /// `hash(a*b) = hash(a) + hash(b)` (spec §3).
    fn hash(&self, hash_vector: &[u64]) -> u64;

    fn isless(&self, other: &Self, ordering: &MonomialOrdering) -> core::cmp::Ordering;

    fn create_divmask(&self, divmap: &DivMap) -> u32;
}

/// `Σ e_i * hash_vector[i]` over exponents, the shared core of every
/// representation's `hash` impl — this is what makes hashes additive over
/// products (spec §3 linear-hash invariant): `hash(a)+hash(b)` is literally
/// the same sum split across two calls, since it's a dot product.
pub(crate) fn linear_hash(exps: &[u32], hash_vector: &[u64]) -> u64 {
    exps.iter()
        .zip(hash_vector)
        .fold(0u64, |acc, (&e, &h)| acc.wrapping_add(h.wrapping_mul(e as u64)))
}
