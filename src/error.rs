/// Fatal errors the simulation core can raise. There are no retry loops:
/// every variant here aborts the run (before it starts, for
/// `Configuration`/`InputFormat`; at the offending tick, for `Numeric`).
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// `end_time <= start_time`, an undersized relationship/perception
    /// table, or any other structural problem discovered while assembling
    /// a `Configuration`.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A malformed input document or an unresolved UUID reference.
    #[error("input format error: {0}")]
    InputFormat(String),

    /// A raw activation or score computation produced NaN or infinity;
    /// must not be allowed to propagate into `activations` or `actions`.
    #[error("numeric error: {0}")]
    Numeric(String),
}

pub type SimResult<T> = Result<T, SimError>;
