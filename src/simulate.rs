//! This module is to generate random radiometries from dye sequences, to assess the performance.
//! Each molecule is simulated dye by dye, independently of the forward algorithm.
use crate::dye_seq::DyeSeq;
use crate::dye_track::DyeTrack;
use crate::error::{FluoroseqError, Result};
use crate::model::ErrorModel;
use crate::radiometry::Radiometry;
use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;
use statrs::distribution::{Exp, LogNormal, Normal};

/// Number of active dyes of a single molecule at each timestep.
/// Duds are removed at first. Then, at each later timestep, dyes bleach,
/// the molecule may detach (and stays dark for good), and an Edman cycle may cleave the outermost position.
pub fn generate_dye_track<R: Rng>(
    model: &ErrorModel,
    dye_seq: &DyeSeq,
    num_timesteps: usize,
    num_channels: usize,
    rng: &mut R,
) -> DyeTrack {
    let mut seq = dye_seq.clone();
    seq.remove_with_prob(model.dud_rate(), rng);
    let mut counts = Vec::with_capacity(num_timesteps * num_channels);
    for t in 0..num_timesteps {
        if 0 < t {
            seq.remove_with_prob(model.bleach_rate(), rng);
            if rng.gen::<f64>() < model.detach_rate() {
                seq = DyeSeq::default();
            }
            seq.cleave_with_eff(model.edman_eff(), rng);
        }
        counts.extend(seq.channel_counts(num_channels));
    }
    DyeTrack::from_counts(num_timesteps, num_channels, counts)
}

fn distribution_error<E: std::fmt::Debug>(why: E) -> FluoroseqError {
    FluoroseqError::InvalidParameter(format!("{:?}", why))
}

/// Intensity of `count` active dyes in a channel.
pub fn sample_intensity<R: Rng>(model: &ErrorModel, count: usize, rng: &mut R) -> Result<f64> {
    if count == 0 {
        return match 0f64 < model.bg_lambda() {
            true => Ok(Exp::new(model.bg_lambda())
                .map_err(distribution_error)?
                .sample(rng)),
            false => Ok(0f64),
        };
    }
    let k = count as f64;
    if model.sigma() == 0f64 {
        return Ok(model.mu() * k);
    }
    let intensity = match model.is_lognormal() {
        true => LogNormal::new(model.log_mu() + k.ln(), model.sigma())
            .map_err(distribution_error)?
            .sample(rng),
        false => Normal::new(model.mu() * k, model.sigma() * k.sqrt())
            .map_err(distribution_error)?
            .sample(rng),
    };
    Ok(intensity.max(0f64))
}

/// Simulate a dye track, then an intensity for each timestep and channel.
pub fn generate_radiometry<R: Rng>(
    model: &ErrorModel,
    dye_seq: &DyeSeq,
    num_timesteps: usize,
    num_channels: usize,
    rng: &mut R,
) -> Result<Radiometry> {
    dye_seq.check_channels(num_channels)?;
    let track = generate_dye_track(model, dye_seq, num_timesteps, num_channels, rng);
    let values = (0..num_timesteps)
        .flat_map(|t| track.timestep(t).to_vec())
        .map(|count| sample_intensity(model, count, rng))
        .collect::<Result<Vec<_>>>()?;
    Radiometry::from_values(num_timesteps, num_channels, values)
}

/// Simulate `num_per_dye_seq` radiometries for each dye sequence, in parallel.
/// Each element is (index of the dye sequence, radiometry). The i-th dye sequence
/// uses its own RNG seeded by `seed + i`, so the result does not depend on the number of threads.
pub fn generate_radiometries(
    model: &ErrorModel,
    dye_seqs: &[DyeSeq],
    num_timesteps: usize,
    num_channels: usize,
    num_per_dye_seq: usize,
    seed: u64,
) -> Result<Vec<(usize, Radiometry)>> {
    debug!(
        "SIM\t{}\t{}\t{}x{}",
        dye_seqs.len(),
        num_per_dye_seq,
        num_timesteps,
        num_channels
    );
    let radiometries: Vec<Vec<_>> = dye_seqs
        .par_iter()
        .enumerate()
        .map(|(i, dye_seq)| {
            let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed.wrapping_add(i as u64));
            (0..num_per_dye_seq)
                .map(|_| {
                    generate_radiometry(model, dye_seq, num_timesteps, num_channels, &mut rng)
                        .map(|rad| (i, rad))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(radiometries.into_iter().flatten().collect())
}
