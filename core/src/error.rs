use thiserror::Error;

/// Failure taxonomy of the public API (spec §6 "Failure signalling", §7
/// "Error handling design"). Every variant here is meant to be caught by the
/// caller; `UnluckyPrime` is deliberately *not* a variant — it is recovered
/// internally by the multi-modular driver and must never surface (spec §6).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroebnerError {
    #[error("input polynomial list is empty")]
    EmptyInput,

    #[error("every input polynomial is the zero polynomial")]
    ZeroGenerators,

    #[error("inconsistent variable count: expected {expected}, found {found}")]
    InconsistentArity { expected: usize, found: usize },

    #[error("ordering {ordering:?} is not supported by the {representation} monomial representation")]
    UnsupportedOrdering {
        ordering: &'static str,
        representation: &'static str,
    },

    #[error("monomial exponent or degree exceeds the representation's component width")]
    MonomialDegreeOverflow,

    #[error("the provided basis is not a Gröbner basis")]
    NotAGroebnerBasis,

    #[error("F4 exceeded the iteration cap ({cap}); this signals a bug, not a hard problem instance")]
    IterationCapExceeded { cap: usize },

    #[error("multi-modular reconstruction did not converge after exhausting the prime budget")]
    ModularReconstructionFailed,
}

pub type Result<T> = core::result::Result<T, GroebnerError>;
