/// Errors produced by the `press-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// The requested job count was zero, negative, or does not fit in a `u32`.
    #[error("invalid jobs value {value}: must be an integer >= 1")]
    InvalidJobs { value: i64 },

    /// A variable key cannot be passed to the compiler as `key=value`.
    #[error("invalid variable key '{key}': {reason}")]
    InvalidVariableKey { key: String, reason: &'static str },
}
