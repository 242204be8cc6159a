//! `Options` (spec §6): a plain struct with `Default` and `with_*` setters,
//! in the shape of the teacher's `CircuitConfig` (plain struct, `Default`
//! impl, setter methods, no hidden globals — spec §9 "push into
//! configuration and let the caller set it").

use serde::{Deserialize, Serialize};

use crate::monomial::MonomialOrdering;
use crate::selection::SelectionStrategy;

/// Monomial representation hint (spec §6 `monoms`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonomialRepr {
    #[default]
    Auto,
    Dense,
    Packed,
    Sparse,
}

/// Modular arithmetic backend (spec §6 `arithmetic`). The engine's only
/// implemented backend is the modular one; `Floating` is accepted (and
/// rejected with `UnsupportedOrdering`-shaped clarity at the call site) since
/// float coefficients never arise in this crate's contract (spec §3: inputs
/// are prime-field or ℚ).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Arithmetic {
    #[default]
    Auto,
    Signed,
    Unsigned,
    Floating,
}

/// Linear-algebra backend (spec §6 `linalg`, §4.7). Only `Deterministic` is
/// implemented; `Randomized`/`Auto` fall back to it (mirrors the declared
/// `Sugar` fallback in `selection`, for the same reason: spec §4.7 already
/// says `randomized` "requires more rows to reach full rank" and is
/// "forbidden when char(F) < 500" — the engine treats it as a documented,
/// not-yet-built fast path rather than silently renaming it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Linalg {
    #[default]
    Auto,
    Deterministic,
    Randomized,
}

/// `modular` strategy for the ℚ driver (spec §6 `modular`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModularStrategy {
    #[default]
    ClassicModular,
    LearnAndApply,
}

/// `homogenize` option (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Homogenize {
    Yes,
    No,
    #[default]
    Auto,
}

/// `threaded` option (spec §6); resolves against `GROEBNER_DISABLE_THREADING`
/// only as a *default* (spec §9 "Global state": "the only process-wide knob
/// is a 'disable threading' switch read from environment; push into
/// configuration and let the caller set it — no hidden globals"). Once
/// `Options` is constructed the environment is never consulted again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Threaded {
    Yes,
    No,
    #[default]
    Auto,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Options {
    pub ordering: MonomialOrdering,
    pub reduced: bool,
    pub monoms: MonomialRepr,
    pub arithmetic: Arithmetic,
    pub linalg: Linalg,
    pub maxpairs: Option<usize>,
    pub selection: SelectionStrategy,
    pub homogenize: Homogenize,
    pub modular: ModularStrategy,
    pub batched: bool,
    pub threaded: Threaded,
    pub certify: bool,
    pub seed: u64,
    pub sweep: bool,
    /// `normal_form`'s `check` sub-key (spec §6 table footnote / §6 "External
    /// interfaces": `normal_form(polys, basis, options) -> reduced_polys`
    /// "requires basis to actually be a Gröbner basis (optional check via
    /// options.check)").
    pub check: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ordering: MonomialOrdering::Degrevlex,
            reduced: true,
            monoms: MonomialRepr::Auto,
            arithmetic: Arithmetic::Auto,
            linalg: Linalg::Auto,
            maxpairs: None,
            selection: SelectionStrategy::Normal,
            homogenize: Homogenize::Auto,
            modular: ModularStrategy::ClassicModular,
            batched: false,
            threaded: Threaded::Auto,
            certify: false,
            seed: 0,
            sweep: true,
            check: false,
        }
    }
}

impl Options {
    pub fn with_ordering(mut self, ordering: MonomialOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_reduced(mut self, reduced: bool) -> Self {
        self.reduced = reduced;
        self
    }

    pub fn with_monoms(mut self, monoms: MonomialRepr) -> Self {
        self.monoms = monoms;
        self
    }

    pub fn with_maxpairs(mut self, maxpairs: usize) -> Self {
        self.maxpairs = Some(maxpairs);
        self
    }

    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_homogenize(mut self, homogenize: Homogenize) -> Self {
        self.homogenize = homogenize;
        self
    }

    pub fn with_modular(mut self, modular: ModularStrategy) -> Self {
        self.modular = modular;
        self
    }

    pub fn with_batched(mut self, batched: bool) -> Self {
        self.batched = batched;
        self
    }

    pub fn with_threaded(mut self, threaded: Threaded) -> Self {
        self.threaded = threaded;
        self
    }

    pub fn with_certify(mut self, certify: bool) -> Self {
        self.certify = certify;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sweep(mut self, sweep: bool) -> Self {
        self.sweep = sweep;
        self
    }

    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Resolve `threaded` to a concrete yes/no, consulting the environment
    /// only as `Auto`'s default (spec §9: env is a default, never consulted
    /// once options exist — so this is read exactly once, here, not cached
    /// process-wide).
    pub fn threading_enabled(&self) -> bool {
        match self.threaded {
            Threaded::Yes => true,
            Threaded::No => false,
            Threaded::Auto => std::env::var("GROEBNER_DISABLE_THREADING")
                .map(|v| v != "1")
                .unwrap_or(true),
        }
    }

    pub(crate) fn f4_config(&self) -> crate::f4::F4Config {
        crate::f4::F4Config {
            maxpairs: self.maxpairs,
            selection: self.selection,
            reduced: self.reduced,
            sweep: self.sweep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_defaults() {
        let o = Options::default();
        assert!(o.reduced);
        assert_eq!(o.modular, ModularStrategy::ClassicModular);
        assert_eq!(o.ordering.name(), "degrevlex");
    }

    #[test]
    fn builder_methods_chain() {
        let o = Options::default()
            .with_ordering(MonomialOrdering::Lex)
            .with_maxpairs(16)
            .with_certify(true);
        assert_eq!(o.ordering.name(), "lex");
        assert_eq!(o.maxpairs, Some(16));
        assert!(o.certify);
    }
}
