//! Compile-time constants for the hot path (§9A): values that must be
//! branchless in the requote/book-update loop live here as `const`, not in
//! the runtime TOML config in [`super::types`].

/// Default `BookSide` capacity (§3: "bounded capacity `maxDepth` (default 5000)").
pub const DEFAULT_MAX_DEPTH: usize = 5000;

/// Default SPSC/MPSC ring buffer capacity. Must be a power of two (§4.1) so
/// the index mask `capacity - 1` replaces a modulo on the hot path.
pub const DEFAULT_RING_CAPACITY: usize = 16_384;

/// Basis-point denominator used throughout spread/skew/grouping math (§4.4).
pub const BP_SCALE: i64 = 10_000;

/// Default lazy-deregistration FIFO capacity (§4.6: "capacity K, default ~20").
pub const DEFAULT_DEREGISTRATION_CAPACITY: usize = 20;

/// Default cooldown after a full fill before the engine resumes quoting
/// (§4.4, §8 scenario 3: "typical 3 s").
pub const DEFAULT_COOLDOWN_AFTER_FULL_FILL_SECS: f64 = 3.0;

/// Default near-mid band for `GroupedSingle`'s chase-avoidance check (§4.5:
/// "±3 bp of current midpoint").
pub const DEFAULT_NEAR_MID_BAND_BP: i64 = 3;

/// Default stabilisation delay before redeploying retired instances after a
/// feed reconnect (§4.7: "short stabilisation delay (≈5 s)").
pub const DEFAULT_RECONNECT_STABILISATION_SECS: f64 = 5.0;

/// Default BFS hop limit for the reference `FxRateService` (§6: "BFS-finds
/// a ≤2-hop path").
pub const DEFAULT_FX_MAX_HOPS: usize = 2;
