//! Slow but obviously correct likelihoods, to check the forward algorithm.
use crate::dye_seq::DyeSeq;
use crate::dye_track::DyeTrack;
use crate::emission::Emission;
use crate::model::ErrorModel;
use crate::radiometry::Radiometry;
use std::collections::HashMap;

fn emit(emission: &Emission, dye_seq: &DyeSeq, intensities: &[f64]) -> f64 {
    dye_seq
        .channel_counts(intensities.len())
        .iter()
        .zip(intensities.iter())
        .map(|(&n, &x)| emission.likelihoods(x, n + 1)[n])
        .product()
}

fn labelled_positions(dye_seq: &DyeSeq) -> Vec<usize> {
    (0..dye_seq.len())
        .filter(|&i| dye_seq.get(i).is_some())
        .collect()
}

// Every way to turn off a subset of the labelled positions, each with `rate`.
fn turn_off(dye_seq: &DyeSeq, rate: f64) -> Vec<(DyeSeq, f64)> {
    let positions = labelled_positions(dye_seq);
    (0..1usize << positions.len())
        .map(|mask| {
            let mut seq = dye_seq.clone();
            let mut prob = 1f64;
            for (bit, &i) in positions.iter().enumerate() {
                if (mask >> bit) & 1 == 1 {
                    seq.set(i, None);
                    prob *= rate;
                } else {
                    prob *= 1f64 - rate;
                }
            }
            (seq, prob)
        })
        .collect()
}

/// Enumerate every history of a single molecule, dye by dye.
pub fn brute_force(model: &ErrorModel, dye_seq: &DyeSeq, radiometry: &Radiometry) -> f64 {
    let emission = Emission::new(model);
    turn_off(dye_seq, model.dud_rate())
        .into_iter()
        .map(|(seq, prob)| {
            let prob = prob * emit(&emission, &seq, radiometry.timestep(0));
            step(model, &emission, radiometry, 1, seq, prob)
        })
        .sum()
}

fn step(
    model: &ErrorModel,
    emission: &Emission,
    radiometry: &Radiometry,
    t: usize,
    seq: DyeSeq,
    prob: f64,
) -> f64 {
    if t == radiometry.num_timesteps() {
        return prob;
    }
    let detach = model.detach_rate();
    let eff = model.edman_eff();
    let mut total = 0f64;
    for (bleached, p_bleach) in turn_off(&seq, model.bleach_rate()) {
        let branches = vec![(bleached, 1f64 - detach), (DyeSeq::default(), detach)];
        for (attached, p_detach) in branches {
            let mut cleaved = attached.clone();
            cleaved.cleave();
            for (next, p_cleave) in vec![(attached, 1f64 - eff), (cleaved, eff)] {
                let p = prob * p_bleach * p_detach * p_cleave;
                let p = p * emit(emission, &next, radiometry.timestep(t));
                total += step(model, emission, radiometry, t + 1, next, p);
            }
        }
    }
    total
}

fn binomial_pmf(k: usize, n: usize, p: f64) -> f64 {
    let choose = (0..k).fold(1f64, |acc, i| acc * (n - i) as f64 / (i + 1) as f64);
    choose * p.powi(k as i32) * (1f64 - p).powi((n - k) as i32)
}

type States = HashMap<(usize, Vec<usize>), f64>;

fn remove_dyes(states: States, num_channels: usize, survival: f64) -> States {
    let mut states = states;
    for c in 0..num_channels {
        let mut next = States::new();
        for ((e, counts), prob) in states {
            for k in 0..=counts[c] {
                let mut to = counts.clone();
                to[c] = k;
                *next.entry((e, to)).or_default() += prob * binomial_pmf(k, counts[c], survival);
            }
        }
        states = next;
    }
    states
}

fn observe(states: &mut States, emission: &Emission, intensities: &[f64]) {
    for ((_, counts), prob) in states.iter_mut() {
        for (&n, &x) in counts.iter().zip(intensities.iter()) {
            *prob *= emission.likelihoods(x, n + 1)[n];
        }
    }
}

/// Forward algorithm over explicit (Edman cycles, active counts) states, one transition at a time.
pub fn naive_dp(model: &ErrorModel, dye_seq: &DyeSeq, radiometry: &Radiometry) -> f64 {
    let (num_timesteps, num_channels) = (radiometry.num_timesteps(), radiometry.num_channels());
    let track = DyeTrack::new(num_timesteps, num_channels, dye_seq);
    let emission = Emission::new(model);
    let mut states = States::new();
    states.insert((0, track.timestep(0).to_vec()), 1f64);
    states = remove_dyes(states, num_channels, 1f64 - model.dud_rate());
    observe(&mut states, &emission, radiometry.timestep(0));
    for t in 1..num_timesteps {
        states = remove_dyes(states, num_channels, 1f64 - model.bleach_rate());
        let detach = model.detach_rate();
        let detached: f64 = states.values().sum::<f64>() * detach;
        let mut next = States::new();
        for (key, prob) in states {
            *next.entry(key).or_default() += prob * (1f64 - detach);
        }
        *next.entry((0, vec![0; num_channels])).or_default() += detached;
        let eff = model.edman_eff();
        let mut cleaved = States::new();
        for ((e, counts), prob) in next {
            *cleaved.entry((e, counts.clone())).or_default() += prob * (1f64 - eff);
            match dye_seq.get(e) {
                Some(c) => {
                    let (n, active) = (track.count(e, c), counts[c]);
                    let hit = active as f64 / n as f64;
                    let mut to = counts.clone();
                    if 0 < active {
                        to[c] -= 1;
                        *cleaved.entry((e + 1, to)).or_default() += prob * eff * hit;
                    }
                    *cleaved.entry((e + 1, counts)).or_default() += prob * eff * (1f64 - hit);
                }
                None => *cleaved.entry((e + 1, counts)).or_default() += prob * eff,
            }
        }
        states = cleaved;
        observe(&mut states, &emission, radiometry.timestep(t));
    }
    states.values().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorModelParams;
    #[test]
    fn oracles_agree_on_small_case() {
        let model = ErrorModel::new(ErrorModelParams {
            bg_lambda: 1.0,
            ..ErrorModelParams::default()
        })
        .unwrap();
        let dye_seq: DyeSeq = "0.1".parse().unwrap();
        let rad = Radiometry::from_rows(&[vec![1.1, 0.9], vec![0.2, 1.0], vec![0.0, 0.8]]).unwrap();
        let x = brute_force(&model, &dye_seq, &rad);
        let y = naive_dp(&model, &dye_seq, &rad);
        assert!((x - y).abs() < 1e-9 * x.max(y), "{},{}", x, y);
    }
    #[test]
    fn binomial() {
        assert!((binomial_pmf(1, 3, 0.5) - 0.375).abs() < 1e-15);
        assert_eq!(binomial_pmf(0, 0, 0.3), 1f64);
    }
}
