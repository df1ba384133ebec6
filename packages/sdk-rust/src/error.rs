//! SDK error type.

/// All errors returned by the farmcalc SDK.
///
/// Every calculation error is recoverable: callers resolve it to an
/// "unavailable" / "N/A" state rather than propagating it to a user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // ── Arithmetic ───────────────────────────────────────────────────────────
    /// A division had a zero denominator.
    #[error("Division by zero")]
    DivisionByZero,

    // ── Swap quoting ─────────────────────────────────────────────────────────
    /// One or both reserves are below the smallest representable unit.
    #[error("Pool is not initialized: reserves are empty, rate unavailable")]
    PoolUninitialized,

    /// The requested output cannot be provided by the pool.
    #[error("Insufficient liquidity: requested {requested}, pool can provide less than {available}")]
    InsufficientLiquidity { requested: String, available: String },

    // ── Farm accounting ──────────────────────────────────────────────────────
    /// The farm has no staked LP tokens, so per-share accrual and APR are undefined.
    #[error("Farm has no staked liquidity")]
    NoStakedLiquidity,

    /// A computed reward or accumulator went negative; the snapshot mixes old and new state.
    #[error("Stale snapshot: {0} went negative")]
    StaleSnapshotInconsistency(String),

    // ── Parsing ──────────────────────────────────────────────────────────────
    /// A string could not be parsed as a decimal number.
    #[error("Invalid decimal '{0}'")]
    InvalidDecimal(String),

    /// A snapshot document could not be decoded.
    #[error("Snapshot parse error at {path}: {reason}")]
    ParseError { path: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
