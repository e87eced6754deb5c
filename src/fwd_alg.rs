//! The forward algorithm over (Edman cycles, active dyes per channel).
//! All the computation is done in the linear scale with f64, not in the log scale:
//! detachment sums the mass over every state at each timestep, which is cheap here and
//! costly with log-sum-exp. A tiny likelihood can underflow to 0, which is not an error.
use crate::dye_seq::DyeSeq;
use crate::dye_track::DyeTrack;
use crate::emission::Emission;
use crate::error::{FluoroseqError, Result};
use crate::model::ErrorModel;
use crate::radiometry::Radiometry;
use crate::tensor::ProbTensor;
use crate::transition::{cleave, detach, remove_dye, RemovalTensor};
use std::borrow::Cow;

/// Forward algorithm with dud and bleach kernels built once and shared by every call.
#[derive(Debug, Clone)]
pub struct ForwardAlgorithm {
    model: ErrorModel,
    dud: RemovalTensor,
    bleach: RemovalTensor,
}

impl ForwardAlgorithm {
    /// `max_num_dyes` is the largest number of dyes in a channel among the dye sequences to be scored.
    /// A dye sequence with more dyes is still fine, but its kernels are built each time.
    pub fn new(model: ErrorModel, max_num_dyes: usize) -> Self {
        let dud = RemovalTensor::new(max_num_dyes, 1f64 - model.dud_rate());
        let bleach = RemovalTensor::new(max_num_dyes, 1f64 - model.bleach_rate());
        Self { model, dud, bleach }
    }
    pub fn model(&self) -> &ErrorModel {
        &self.model
    }
    /// Return Pr{radiometry | dye_seq, model}, summing over all the histories of
    /// duds, bleaching, detachment, and Edman failures.
    /// If you want the raw DP table, please call `forward` instead.
    pub fn likelihood(&self, dye_seq: &DyeSeq, radiometry: &Radiometry) -> Result<f64> {
        let states = self.forward(dye_seq, radiometry)?;
        Ok(states.sum())
    }
    /// Forward algorithm. Return the tensor after the last timestep.
    pub fn forward(&self, dye_seq: &DyeSeq, radiometry: &Radiometry) -> Result<ProbTensor> {
        check_shapes(dye_seq, radiometry)?;
        let (num_timesteps, num_channels) = (radiometry.num_timesteps(), radiometry.num_channels());
        let dye_track = DyeTrack::new(num_timesteps, num_channels, dye_seq);
        let max_dyes = dye_track.max_initial();
        let (dud, bleach) = match max_dyes <= self.dud.max_count() {
            true => (Cow::Borrowed(&self.dud), Cow::Borrowed(&self.bleach)),
            false => {
                debug!("FWD\tGrow kernels {}->{}", self.dud.max_count(), max_dyes);
                let dud = RemovalTensor::new(max_dyes, self.dud.survival());
                let bleach = RemovalTensor::new(max_dyes, self.bleach.survival());
                (Cow::Owned(dud), Cow::Owned(bleach))
            }
        };
        let emission = Emission::new(&self.model);
        let mut states = initialize(&dye_track);
        trace!("FWD\t{}\t{:?}\t{:?}", dye_seq, states.shape(), emission.kind());
        for c in 0..num_channels {
            remove_dye(&mut states, 1, c, &dud);
        }
        emission.observe(&mut states, 1, radiometry.timestep(0));
        for t in 1..num_timesteps {
            for c in 0..num_channels {
                remove_dye(&mut states, t, c, &bleach);
            }
            detach(&mut states, t, self.model.detach_rate());
            cleave(&mut states, t + 1, self.model.edman_eff(), dye_seq, &dye_track);
            emission.observe(&mut states, t + 1, radiometry.timestep(t));
            trace!("FWD\t{}\t{:e}", t, states.sum_rows(t + 1));
        }
        Ok(states)
    }
}

/// Likelihood of a single dye sequence. Use `ForwardAlgorithm` to score many of them.
pub fn likelihood(model: &ErrorModel, dye_seq: &DyeSeq, radiometry: &Radiometry) -> Result<f64> {
    let max_dyes = dye_seq
        .channel_counts(radiometry.num_channels())
        .into_iter()
        .max()
        .unwrap_or(0);
    ForwardAlgorithm::new(*model, max_dyes).likelihood(dye_seq, radiometry)
}

/// Unit mass at no Edman cycle and every dye active.
pub fn initialize(dye_track: &DyeTrack) -> ProbTensor {
    let mut shape = Vec::with_capacity(1 + dye_track.num_channels());
    shape.push(dye_track.num_timesteps());
    shape.extend(dye_track.timestep(0).iter().map(|&n| n + 1));
    let mut states = ProbTensor::new(&shape);
    let mut loc = shape.iter().map(|&len| len - 1).collect::<Vec<_>>();
    loc[0] = 0;
    *states.get_mut(&loc) = 1f64;
    states
}

pub fn check_shapes(dye_seq: &DyeSeq, radiometry: &Radiometry) -> Result<()> {
    match dye_seq.check_channels(radiometry.num_channels()) {
        Err(FluoroseqError::ShapeMismatch(why)) => Err(FluoroseqError::ShapeMismatch(format!(
            "{} does not fit a radiometry of {} timesteps:{}",
            dye_seq,
            radiometry.num_timesteps(),
            why
        ))),
        res => res,
    }
}
