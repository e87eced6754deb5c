//! Likelihoods of dye sequences against fluorosequencing radiometries.
//!
//! A peptide labelled by fluorescent dyes (a [`DyeSeq`]) is degraded by Edman cycles,
//! one position per cycle, while its dyes may be duds, bleach, or detach together with the peptide.
//! The observed intensities across the cycles form a [`Radiometry`].
//! [`fwd_alg::ForwardAlgorithm`] computes Pr{radiometry | dye sequence, error model}
//! by the forward algorithm on a dense tensor over (Edman cycles, active dyes per channel).
//!
//! ```
//! use fluoroseq::{likelihood, DyeSeq, ErrorModel, Radiometry};
//! let model = ErrorModel::default();
//! let dye_seq: DyeSeq = "..0.1".parse().unwrap();
//! let radiometry = Radiometry::parse("1 1 1 1 1 1 0 1", 4, 2).unwrap();
//! let lk = likelihood(&model, &dye_seq, &radiometry).unwrap();
//! assert!(0f64 < lk);
//! ```
#[macro_use]
extern crate log;
pub mod classify;
pub mod dye_seq;
pub mod dye_track;
pub mod emission;
pub mod error;
pub mod fwd_alg;
pub mod model;
#[cfg(test)]
mod oracle;
pub mod radiometry;
pub mod simulate;
pub mod tensor;
pub mod transition;

pub use classify::{Classifier, ScoredClassification};
pub use dye_seq::DyeSeq;
pub use dye_track::DyeTrack;
pub use error::{FluoroseqError, Result};
pub use fwd_alg::{likelihood, ForwardAlgorithm};
pub use model::{ErrorModel, ErrorModelParams};
pub use radiometry::Radiometry;
