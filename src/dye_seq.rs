//! Dye sequences: which channel, if any, labels each position of a peptide.
use crate::error::{FluoroseqError, Result};
use rand::Rng;

/// A labelled peptide, read from the end Edman degradation attacks first.
/// `labels[0]` is the next position to be cleaved. `None` is an unlabelled position.
/// Reading past the end gives `None`, as the peptide is implicitly padded by unlabelled positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DyeSeq {
    labels: Vec<Option<usize>>,
}

impl DyeSeq {
    pub fn new(labels: Vec<Option<usize>>) -> Self {
        Self { labels }
    }
    /// Parse and check every channel is smaller than `num_channels`.
    pub fn from_str_with_channels(seq: &str, num_channels: usize) -> Result<Self> {
        let dye_seq: Self = seq.parse()?;
        dye_seq.check_channels(num_channels)?;
        Ok(dye_seq)
    }
    pub fn len(&self) -> usize {
        self.labels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }
    /// The channel at the `i`-th position, counted from the cleaved end.
    pub fn get(&self, i: usize) -> Option<usize> {
        self.labels.get(i).copied().flatten()
    }
    /// Overwrite the `i`-th position. Panics if `i` is out of the sequence.
    pub fn set(&mut self, i: usize, label: Option<usize>) {
        self.labels[i] = label;
    }
    /// The smallest number of channels this sequence is consistent with.
    pub fn min_num_channels(&self) -> usize {
        self.labels.iter().flatten().map(|&c| c + 1).max().unwrap_or(0)
    }
    pub fn check_channels(&self, num_channels: usize) -> Result<()> {
        match self.labels.iter().flatten().find(|&&c| num_channels <= c) {
            Some(c) => Err(FluoroseqError::ShapeMismatch(format!(
                "{} has channel {}, but there are {} channels",
                self, c, num_channels
            ))),
            None => Ok(()),
        }
    }
    /// Number of labels in each channel. Labels of channels `>= num_channels` are ignored.
    pub fn channel_counts(&self, num_channels: usize) -> Vec<usize> {
        let mut counts = vec![0; num_channels];
        for &c in self.labels.iter().flatten() {
            if let Some(count) = counts.get_mut(c) {
                *count += 1;
            }
        }
        counts
    }
    /// Remove each label independently with probability `prob`.
    pub fn remove_with_prob<R: Rng>(&mut self, prob: f64, rng: &mut R) {
        for label in self.labels.iter_mut().filter(|l| l.is_some()) {
            if rng.gen::<f64>() < prob {
                *label = None;
            }
        }
    }
    /// Cleave the outermost position with probability `eff`. Return true if cleaved.
    pub fn cleave_with_eff<R: Rng>(&mut self, eff: f64, rng: &mut R) -> bool {
        if !self.labels.is_empty() && rng.gen::<f64>() < eff {
            self.cleave();
            true
        } else {
            false
        }
    }
    /// Cleave the outermost position, if any.
    pub fn cleave(&mut self) {
        if !self.labels.is_empty() {
            self.labels.remove(0);
        }
    }
    /// Rename channel `c` to `permutation[c]`.
    pub fn relabel(&self, permutation: &[usize]) -> Self {
        let labels = self
            .labels
            .iter()
            .map(|l| l.map(|c| permutation[c]))
            .collect();
        Self { labels }
    }
}

impl std::str::FromStr for DyeSeq {
    type Err = FluoroseqError;
    /// `.` is an unlabelled position, a digit is a channel. The first character is cleaved first.
    fn from_str(seq: &str) -> Result<Self> {
        seq.trim()
            .chars()
            .map(|x| match x {
                '.' => Ok(None),
                _ => match x.to_digit(10) {
                    Some(c) => Ok(Some(c as usize)),
                    None => Err(FluoroseqError::Parse(format!(
                        "unexpected {:?} in dye sequence {:?}",
                        x, seq
                    ))),
                },
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}

impl std::fmt::Display for DyeSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        for label in self.labels.iter() {
            match label {
                Some(c) => write!(f, "{}", c)?,
                None => f.write_char('.')?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    #[test]
    fn parse_and_display() {
        let seq: DyeSeq = "..0.1.0".parse().unwrap();
        assert_eq!(seq.len(), 7);
        assert_eq!(seq.get(0), None);
        assert_eq!(seq.get(2), Some(0));
        assert_eq!(seq.get(4), Some(1));
        assert_eq!(seq.get(100), None);
        assert_eq!(seq.to_string(), "..0.1.0");
        assert_eq!(seq.channel_counts(2), vec![2, 1]);
        assert_eq!(seq.min_num_channels(), 2);
        assert!("..x".parse::<DyeSeq>().is_err());
        assert!(DyeSeq::from_str_with_channels("0.2", 2).is_err());
        assert!(DyeSeq::from_str_with_channels("0.1", 2).is_ok());
        let empty: DyeSeq = "".parse().unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.min_num_channels(), 0);
    }
    #[test]
    fn cleave() {
        let mut seq: DyeSeq = "0.1".parse().unwrap();
        seq.cleave();
        assert_eq!(seq.to_string(), ".1");
        seq.set(1, None);
        assert_eq!(seq.channel_counts(2), vec![0, 0]);
        seq.cleave();
        seq.cleave();
        seq.cleave();
        assert!(seq.is_empty());
    }
    #[test]
    fn stochastic_operations() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4234);
        let template: DyeSeq = "0.1.0.1.".parse().unwrap();
        let mut seq = template.clone();
        seq.remove_with_prob(0.0, &mut rng);
        assert_eq!(seq, template);
        seq.remove_with_prob(1.0, &mut rng);
        assert_eq!(seq.channel_counts(2), vec![0, 0]);
        assert_eq!(seq.len(), template.len());
        let mut seq = template.clone();
        assert!(!seq.cleave_with_eff(0.0, &mut rng));
        assert!(seq.cleave_with_eff(1.0, &mut rng));
        assert_eq!(seq.to_string(), ".1.0.1.");
        let removed = (0..1000)
            .map(|_| {
                let mut seq = template.clone();
                seq.remove_with_prob(0.3, &mut rng);
                4 - seq.channel_counts(2).iter().sum::<usize>()
            })
            .sum::<usize>();
        let frac = removed as f64 / 4000f64;
        assert!((frac - 0.3).abs() < 0.05, "{}", frac);
    }
    #[test]
    fn relabel() {
        let seq: DyeSeq = "0.1.2".parse().unwrap();
        assert_eq!(seq.relabel(&[2, 0, 1]).to_string(), "2.0.1");
    }
}
