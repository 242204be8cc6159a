use core::ops::Mul;

/// Squaring, broken out as its own trait the way the teacher crate does so that
/// specialized field types can override the default `self * self`.
pub trait Square {
    fn square(&self) -> Self;
}

impl<F: Mul<F, Output = Self> + Copy> Square for F {
    fn square(&self) -> Self {
        *self * *self
    }
}
