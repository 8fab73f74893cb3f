// error.rs - Errors raised at the configuration edge
//
// The simulations themselves never fail: bad numbers are respawned or
// skipped in place. Only parsing and validation report errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GardenError {
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown rain category `{0}`")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, GardenError>;
