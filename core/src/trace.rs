//! Trace (learn/apply), spec §4.11.
//!
//! A `Trace` is an opaque value owned by the caller (spec §9 "Tracing":
//! "implement the trace as an opaque value owned by the caller; on apply it
//! is consumed read-only"). It is deliberately not `Serialize` — spec §9:
//! "do not serialize across versions (internal representation may change)"
//! — unlike every other config/state type in this crate, which mirrors the
//! teacher's blanket `serde` derives.

use crate::hashtable::MonomId;
use crate::pairset::SPair;

/// Everything learned during one F4 iteration, sufficient to replay it
/// without searching (spec §4.11).
#[derive(Clone, Debug)]
pub struct IterationRecord {
    /// The critical-pair block consumed this iteration.
    pub taken: Vec<SPair>,
    /// Per-distinct-lcm-group reducer choice, in the order `select` visited
    /// groups (feeds `selection::select_apply`).
    pub group_reducers: Vec<usize>,
    /// Symbolic preprocessing's reducer choices, in visitation order (feeds
    /// `symbolic::preprocess_apply`).
    pub reducer_log: Vec<usize>,
    /// The column permutation chosen for this iteration's matrix (spec
    /// §4.11 "use the recorded column permutation").
    pub column_permutation: Vec<MonomId>,
    /// Matrix shape `(nup, nlow, ncols)` (spec §3 "ComputationTrace").
    pub shape: (usize, usize, usize),
    /// True iff this iteration produced no new pivot rows (spec §4.8 step 6,
    /// §4.8 step 2 "discard_normal" uses this to skip rebuilding the matrix
    /// on structurally identical re-runs).
    pub empty: bool,
}

/// Immutable, run-wide descriptors recorded once at the start of learn
/// (spec §3 "Plus immutable: input permutation; homogenization/sort
/// permutations; polynomial representation descriptor").
#[derive(Clone, Debug)]
pub struct RunDescriptor {
    pub nvars: usize,
    pub ninputs: usize,
    /// Whether learn ran the two-pass homogenize/dehomogenize pipeline
    /// (spec §6 `homogenize` option) — apply must use the same setting,
    /// since a structurally identical input is only structurally identical
    /// *after* the same preprocessing is applied to it.
    pub homogenized: bool,
}

/// A recorded F4 run, replayable on a structurally identical input (spec
/// §4.11).
#[derive(Clone, Debug)]
pub struct Trace {
    pub descriptor: RunDescriptor,
    iterations: Vec<IterationRecord>,
}

impl Trace {
    pub fn new(descriptor: RunDescriptor) -> Self {
        Self {
            descriptor,
            iterations: Vec::new(),
        }
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.iterations.push(record);
    }

    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IterationRecord> {
        self.iterations.iter()
    }

    /// The `i`-th recorded iteration, used by apply to drive the replay
    /// loop one recorded iteration at a time.
    pub fn get(&self, i: usize) -> Option<&IterationRecord> {
        self.iterations.get(i)
    }
}
