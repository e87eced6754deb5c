//! Classify radiometries by the most likely dye sequence among candidates.
use crate::dye_seq::DyeSeq;
use crate::error::{FluoroseqError, Result};
use crate::fwd_alg::ForwardAlgorithm;
use crate::model::ErrorModel;
use crate::radiometry::Radiometry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// The best candidate for a radiometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredClassification {
    /// Index of the candidate.
    pub id: usize,
    /// Likelihood of the candidate.
    pub score: f64,
    /// Sum of likelihood times weight over all the candidates.
    pub total: f64,
}

impl ScoredClassification {
    pub fn new(id: usize, score: f64, total: f64) -> Self {
        Self { id, score, total }
    }
    /// score / total, or 0 if no candidate explains the radiometry at all.
    pub fn adjusted_score(&self) -> f64 {
        if self.total == 0f64 {
            0f64
        } else {
            self.score / self.total
        }
    }
}

impl std::fmt::Display for ScoredClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{:e}\t{:.4}",
            self.id,
            self.score,
            self.adjusted_score()
        )
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    num_channels: usize,
    forward: ForwardAlgorithm,
    candidates: Vec<(DyeSeq, f64)>,
}

impl Classifier {
    /// `candidates` are (dye sequence, weight) pairs. A weight is a prior abundance, not necessarily normalized.
    pub fn new(
        model: ErrorModel,
        num_channels: usize,
        candidates: Vec<(DyeSeq, f64)>,
    ) -> Result<Self> {
        if candidates.is_empty() {
            return Err(FluoroseqError::InvalidParameter(
                "no candidate dye sequence".to_string(),
            ));
        }
        for (dye_seq, weight) in candidates.iter() {
            if !(0f64 <= *weight && weight.is_finite()) {
                return Err(FluoroseqError::InvalidParameter(format!(
                    "weight of {} must be finite and non-negative, got {}",
                    dye_seq, weight
                )));
            }
            dye_seq.check_channels(num_channels)?;
        }
        let max_num_dyes = candidates
            .iter()
            .flat_map(|(dye_seq, _)| dye_seq.channel_counts(num_channels))
            .max()
            .unwrap_or(0);
        debug!(
            "CLS\t{} candidates\t{} channels\t{} dyes at most",
            candidates.len(),
            num_channels,
            max_num_dyes
        );
        let forward = ForwardAlgorithm::new(model, max_num_dyes);
        Ok(Self {
            num_channels,
            forward,
            candidates,
        })
    }
    pub fn candidates(&self) -> &[(DyeSeq, f64)] {
        &self.candidates
    }
    pub fn model(&self) -> &ErrorModel {
        self.forward.model()
    }
    fn check(&self, radiometry: &Radiometry) -> Result<()> {
        if radiometry.num_channels() != self.num_channels {
            Err(FluoroseqError::ShapeMismatch(format!(
                "the radiometry has {} channels, but candidates are in {} channels",
                radiometry.num_channels(),
                self.num_channels
            )))
        } else {
            Ok(())
        }
    }
    /// Likelihood of each candidate, in the same order as the candidates.
    pub fn scores(&self, radiometry: &Radiometry) -> Result<Vec<f64>> {
        self.check(radiometry)?;
        self.candidates
            .par_iter()
            .map(|(dye_seq, _)| self.forward.likelihood(dye_seq, radiometry))
            .collect()
    }
    /// The candidate with the largest likelihood. Ties go to the smaller index.
    pub fn classify(&self, radiometry: &Radiometry) -> Result<ScoredClassification> {
        let scores = self.scores(radiometry)?;
        let total: f64 = scores
            .iter()
            .zip(self.candidates.iter())
            .map(|(score, (_, weight))| score * weight)
            .sum();
        let (id, score) = scores
            .iter()
            .enumerate()
            .fold((0, scores[0]), |(argmax, max), (i, &score)| {
                if max < score {
                    (i, score)
                } else {
                    (argmax, max)
                }
            });
        trace!("CLS\t{}\t{}\t{:e}\t{:e}", radiometry, id, score, total);
        Ok(ScoredClassification::new(id, score, total))
    }
    pub fn classify_all(&self, radiometries: &[Radiometry]) -> Result<Vec<ScoredClassification>> {
        radiometries
            .par_iter()
            .map(|radiometry| self.classify(radiometry))
            .collect()
    }
}
