//! Errors raised at the boundary of the likelihood engine.
//! The numeric core itself never fails; everything here is a rejected precondition.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FluoroseqError {
    /// A parameter of the error model is out of its range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Inputs disagree on the number of channels or timesteps.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// Negative or non-finite intensity.
    #[error("invalid intensity {value} at timestep {timestep}, channel {channel}")]
    InvalidIntensity {
        timestep: usize,
        channel: usize,
        value: f64,
    },
    /// Malformed dye sequence or radiometry text.
    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, FluoroseqError>;
