//! Radiometries: observed intensities of a single molecule.
use crate::error::{FluoroseqError, Result};

/// Intensities serialized as `[timestep][channel]`. Every value is finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Radiometry {
    num_timesteps: usize,
    num_channels: usize,
    intensities: Vec<f64>,
}

impl Radiometry {
    pub fn from_values(num_timesteps: usize, num_channels: usize, values: Vec<f64>) -> Result<Self> {
        if num_timesteps == 0 || num_channels == 0 {
            return Err(FluoroseqError::ShapeMismatch(format!(
                "a radiometry needs at least one timestep and one channel, got {}x{}",
                num_timesteps, num_channels
            )));
        }
        if values.len() != num_timesteps * num_channels {
            return Err(FluoroseqError::ShapeMismatch(format!(
                "{} values do not fill {} timesteps x {} channels",
                values.len(),
                num_timesteps,
                num_channels
            )));
        }
        let invalid = values
            .iter()
            .enumerate()
            .find(|(_, x)| !(x.is_finite() && 0f64 <= **x));
        if let Some((i, &value)) = invalid {
            return Err(FluoroseqError::InvalidIntensity {
                timestep: i / num_channels,
                channel: i % num_channels,
                value,
            });
        }
        Ok(Self {
            num_timesteps,
            num_channels,
            intensities: values,
        })
    }
    /// Each row is a timestep.
    pub fn from_rows<T: std::borrow::Borrow<[f64]>>(rows: &[T]) -> Result<Self> {
        let lens: Vec<usize> = rows.iter().map(|r| r.borrow().len()).collect();
        let num_channels = lens.first().copied().unwrap_or(0);
        if let Some(len) = lens.iter().find(|&&len| len != num_channels) {
            return Err(FluoroseqError::ShapeMismatch(format!(
                "ragged radiometry: rows of {} and {} channels",
                num_channels, len
            )));
        }
        let values: Vec<_> = rows.iter().flat_map(|r| r.borrow().iter().copied()).collect();
        Self::from_values(rows.len(), num_channels, values)
    }
    /// Parse whitespace- or comma-separated values, timestep-major.
    pub fn parse(line: &str, num_timesteps: usize, num_channels: usize) -> Result<Self> {
        let values = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|x| !x.is_empty())
            .map(|x| {
                x.parse::<f64>()
                    .map_err(|e| FluoroseqError::Parse(format!("{:?}:{}", x, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_values(num_timesteps, num_channels, values)
    }
    pub fn num_timesteps(&self) -> usize {
        self.num_timesteps
    }
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }
    pub fn get(&self, t: usize, c: usize) -> f64 {
        self.intensities[t * self.num_channels + c]
    }
    pub fn timestep(&self, t: usize) -> &[f64] {
        &self.intensities[t * self.num_channels..(t + 1) * self.num_channels]
    }
    pub fn values(&self) -> &[f64] {
        &self.intensities
    }
    /// Rename channel `c` to `permutation[c]`.
    pub fn relabel(&self, permutation: &[usize]) -> Self {
        let mut intensities = vec![0f64; self.intensities.len()];
        for (t, row) in self.intensities.chunks_exact(self.num_channels).enumerate() {
            for (c, &x) in row.iter().enumerate() {
                intensities[t * self.num_channels + permutation[c]] = x;
            }
        }
        Self {
            intensities,
            ..*self
        }
    }
}

impl std::fmt::Display for Radiometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<_> = self.intensities.iter().map(|x| format!("{}", x)).collect();
        write!(f, "{}", values.join(" "))
    }
}
