//! The parametric error model of fluorosequencing.
use crate::error::{FluoroseqError, Result};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Unchecked parameters, as they come from a config file or a command line.
/// Turn them into an [`ErrorModel`] by `ErrorModel::new` (or `TryFrom`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorModelParams {
    /// Pr{an Edman cycle removes the outermost position}.
    pub edman_eff: f64,
    /// Pr{a dye bleaches during a cycle}.
    pub bleach_rate: f64,
    /// Pr{a dye never fluoresces}.
    pub dud_rate: f64,
    /// Mean intensity of a single dye.
    pub mu: f64,
    /// Standard deviation of a single dye.
    pub sigma: f64,
    /// Rate of the exponential background. Zero means no background at all.
    pub bg_lambda: f64,
    /// Pr{the whole molecule detaches during a cycle}.
    #[serde(default)]
    pub detach_rate: f64,
    /// If true, intensities of active dyes are log-normal instead of normal.
    #[serde(default)]
    pub lognormal: bool,
}

impl std::default::Default for ErrorModelParams {
    fn default() -> Self {
        Self {
            edman_eff: 0.94,
            bleach_rate: 0.05,
            dud_rate: 0.07,
            mu: 1.0,
            sigma: 0.16,
            bg_lambda: 0.0,
            detach_rate: 0.05,
            lognormal: false,
        }
    }
}

/// Validated, immutable error model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorModelParams", into = "ErrorModelParams")]
pub struct ErrorModel {
    edman_eff: f64,
    bleach_rate: f64,
    dud_rate: f64,
    mu: f64,
    sigma: f64,
    bg_lambda: f64,
    detach_rate: f64,
    lognormal: bool,
    log_mu: f64,
}

fn invalid(name: &str, value: f64, range: &str) -> FluoroseqError {
    FluoroseqError::InvalidParameter(format!("{} must be in {}, got {}", name, range, value))
}

impl ErrorModel {
    pub fn new(params: ErrorModelParams) -> Result<Self> {
        let ErrorModelParams {
            edman_eff,
            bleach_rate,
            dud_rate,
            mu,
            sigma,
            bg_lambda,
            detach_rate,
            lognormal,
        } = params;
        // NaN fails every comparison below, so it is rejected as well.
        if !(0f64 < edman_eff && edman_eff <= 1f64) {
            return Err(invalid("edman_eff", edman_eff, "(0,1]"));
        }
        for &(name, rate) in &[
            ("bleach_rate", bleach_rate),
            ("dud_rate", dud_rate),
            ("detach_rate", detach_rate),
        ] {
            if !(0f64 <= rate && rate < 1f64) {
                return Err(invalid(name, rate, "[0,1)"));
            }
        }
        if !(0f64 < mu && mu.is_finite()) {
            return Err(invalid("mu", mu, "(0,inf)"));
        }
        if !(0f64 <= sigma && sigma.is_finite()) {
            return Err(invalid("sigma", sigma, "[0,inf)"));
        }
        if !(0f64 <= bg_lambda && bg_lambda.is_finite()) {
            return Err(invalid("bg_lambda", bg_lambda, "[0,inf)"));
        }
        if lognormal && 0f64 < bg_lambda {
            return Err(FluoroseqError::InvalidParameter(
                "log-normal intensities require bg_lambda == 0".to_string(),
            ));
        }
        Ok(Self {
            edman_eff,
            bleach_rate,
            dud_rate,
            mu,
            sigma,
            bg_lambda,
            detach_rate,
            lognormal,
            log_mu: mu.ln(),
        })
    }
    pub fn edman_eff(&self) -> f64 {
        self.edman_eff
    }
    pub fn bleach_rate(&self) -> f64 {
        self.bleach_rate
    }
    pub fn dud_rate(&self) -> f64 {
        self.dud_rate
    }
    pub fn mu(&self) -> f64 {
        self.mu
    }
    /// ln(mu), the location of a single dye in the log-normal model.
    pub fn log_mu(&self) -> f64 {
        self.log_mu
    }
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
    pub fn bg_lambda(&self) -> f64 {
        self.bg_lambda
    }
    pub fn detach_rate(&self) -> f64 {
        self.detach_rate
    }
    pub fn is_lognormal(&self) -> bool {
        self.lognormal
    }
    pub fn params(&self) -> ErrorModelParams {
        ErrorModelParams::from(*self)
    }
}

impl TryFrom<ErrorModelParams> for ErrorModel {
    type Error = FluoroseqError;
    fn try_from(params: ErrorModelParams) -> Result<Self> {
        Self::new(params)
    }
}

impl std::convert::From<ErrorModel> for ErrorModelParams {
    fn from(model: ErrorModel) -> Self {
        Self {
            edman_eff: model.edman_eff,
            bleach_rate: model.bleach_rate,
            dud_rate: model.dud_rate,
            mu: model.mu,
            sigma: model.sigma,
            bg_lambda: model.bg_lambda,
            detach_rate: model.detach_rate,
            lognormal: model.lognormal,
        }
    }
}

impl std::default::Default for ErrorModel {
    fn default() -> Self {
        let ErrorModelParams {
            edman_eff,
            bleach_rate,
            dud_rate,
            mu,
            sigma,
            bg_lambda,
            detach_rate,
            lognormal,
        } = ErrorModelParams::default();
        Self {
            edman_eff,
            bleach_rate,
            dud_rate,
            mu,
            sigma,
            bg_lambda,
            detach_rate,
            lognormal,
            log_mu: mu.ln(),
        }
    }
}

impl std::fmt::Display for ErrorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "CHEM:{:.3}\t{:.3}\t{:.3}\t{:.3}",
            self.edman_eff, self.bleach_rate, self.dud_rate, self.detach_rate
        )?;
        let dist = if self.lognormal { "LogNormal" } else { "Normal" };
        write!(
            f,
            "OBS:{}\t{:.3}\t{:.3}\t{:.3}",
            dist, self.mu, self.sigma, self.bg_lambda
        )
    }
}
