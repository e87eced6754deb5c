//! Dye tracks: the number of dyes per channel at each timestep.
use crate::dye_seq::DyeSeq;

/// Number of dyes in each channel at each timestep, serialized as `[timestep][channel]`.
/// Built by `DyeTrack::new`, it is the error-free schedule: all dyes stay, every Edman cycle succeeds.
/// Row `t` is then also the number of dyes physically present after `t` successful cleavages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DyeTrack {
    num_timesteps: usize,
    num_channels: usize,
    counts: Vec<usize>,
}

impl DyeTrack {
    pub fn new(num_timesteps: usize, num_channels: usize, dye_seq: &DyeSeq) -> Self {
        let mut remaining = dye_seq.channel_counts(num_channels);
        let mut counts = Vec::with_capacity(num_timesteps * num_channels);
        for t in 0..num_timesteps {
            if 0 < t {
                if let Some(count) = dye_seq.get(t - 1).and_then(|c| remaining.get_mut(c)) {
                    *count -= 1;
                }
            }
            counts.extend(remaining.iter().copied());
        }
        Self {
            num_timesteps,
            num_channels,
            counts,
        }
    }
    /// Wrap counts serialized as `[timestep][channel]`.
    pub fn from_counts(num_timesteps: usize, num_channels: usize, counts: Vec<usize>) -> Self {
        assert_eq!(counts.len(), num_timesteps * num_channels);
        Self {
            num_timesteps,
            num_channels,
            counts,
        }
    }
    pub fn num_timesteps(&self) -> usize {
        self.num_timesteps
    }
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }
    pub fn count(&self, t: usize, c: usize) -> usize {
        self.counts[t * self.num_channels + c]
    }
    pub fn timestep(&self, t: usize) -> &[usize] {
        &self.counts[t * self.num_channels..(t + 1) * self.num_channels]
    }
    /// The largest number of dyes any channel starts with.
    pub fn max_initial(&self) -> usize {
        self.counts
            .iter()
            .take(self.num_channels)
            .copied()
            .max()
            .unwrap_or(0)
    }
}

impl std::fmt::Display for DyeTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (t, row) in self.counts.chunks(self.num_channels.max(1)).enumerate() {
            if 0 < t {
                write!(f, " ")?;
            }
            let row: Vec<_> = row.iter().map(|x| x.to_string()).collect();
            write!(f, "{}", row.join(","))?;
        }
        Ok(())
    }
}
