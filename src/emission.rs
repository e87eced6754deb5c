//! Emission: likelihood of an observed intensity given the number of active dyes.
use crate::model::ErrorModel;
use crate::tensor::ProbTensor;
use statrs::distribution::{Continuous, Exp, LogNormal, Normal};

/// Which density to use. It is decided by the model, not by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionKind {
    /// Exponential background for no dye, normal for one or more dyes.
    /// Valid only if bg_lambda > 0.
    General,
    /// No background: zero intensity iff no active dye.
    /// Supports log-normal intensities.
    Safe,
}

impl EmissionKind {
    pub fn of(model: &ErrorModel) -> Self {
        if 0f64 < model.bg_lambda() {
            EmissionKind::General
        } else {
            EmissionKind::Safe
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Emission<'a> {
    model: &'a ErrorModel,
    kind: EmissionKind,
}

impl<'a> Emission<'a> {
    pub fn new(model: &'a ErrorModel) -> Self {
        Self {
            model,
            kind: EmissionKind::of(model),
        }
    }
    pub fn kind(&self) -> EmissionKind {
        self.kind
    }
    /// `[k]` is the density of `intensity` given k active dyes, for k in `0..len`.
    pub fn likelihoods(&self, intensity: f64, len: usize) -> Vec<f64> {
        match self.kind {
            EmissionKind::General => self.general(intensity, len),
            EmissionKind::Safe => self.safe(intensity, len),
        }
    }
    fn general(&self, intensity: f64, len: usize) -> Vec<f64> {
        let (mu, sigma) = (self.model.mu(), self.model.sigma());
        let mut pdfs = Vec::with_capacity(len);
        pdfs.push(exp_pdf(intensity, self.model.bg_lambda()));
        pdfs.extend((1..len).map(|k| {
            let k = k as f64;
            normal_pdf(intensity, mu * k, sigma * k.sqrt())
        }));
        pdfs
    }
    fn safe(&self, intensity: f64, len: usize) -> Vec<f64> {
        let mut pdfs = vec![0f64; len];
        if intensity == 0f64 {
            pdfs[0] = 1f64;
            return pdfs;
        }
        let (mu, sigma) = (self.model.mu(), self.model.sigma());
        let log_mu = self.model.log_mu();
        let lognormal = self.model.is_lognormal();
        for (k, pdf) in pdfs.iter_mut().enumerate().skip(1) {
            let k = k as f64;
            *pdf = match lognormal {
                true => lognormal_pdf(intensity, log_mu + k.ln(), sigma),
                false => normal_pdf(intensity, mu * k, sigma * k.sqrt()),
            };
        }
        pdfs
    }
    /// Multiply the first `rows` rows by the likelihood of `intensities`, one per channel.
    pub fn observe(&self, tensor: &mut ProbTensor, rows: usize, intensities: &[f64]) {
        assert_eq!(intensities.len(), tensor.num_channels());
        for (c, &intensity) in intensities.iter().enumerate() {
            let pdfs = self.likelihoods(intensity, tensor.channel_len(c));
            tensor.scale_channel(rows, c, &pdfs);
        }
    }
}

// Zero spread is the limit of a vanishing variance: all mass sits on the center.
fn degenerate(x: f64, center: f64) -> f64 {
    let tolerance = 4f64 * f64::EPSILON * center.abs().max(1f64);
    if (x - center).abs() <= tolerance {
        1f64
    } else {
        0f64
    }
}

pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    if sd == 0f64 {
        return degenerate(x, mean);
    }
    Normal::new(mean, sd).map(|d| d.pdf(x)).unwrap_or(0f64)
}

pub fn lognormal_pdf(x: f64, location: f64, scale: f64) -> f64 {
    if x <= 0f64 {
        0f64
    } else if scale == 0f64 {
        degenerate(x, location.exp())
    } else {
        LogNormal::new(location, scale)
            .map(|d| d.pdf(x))
            .unwrap_or(0f64)
    }
}

pub fn exp_pdf(x: f64, rate: f64) -> f64 {
    Exp::new(rate).map(|d| d.pdf(x)).unwrap_or(0f64)
}
