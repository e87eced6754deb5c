//! Transitions between timesteps: dye removal (dud and bleach), detachment, and Edman cycles.
//! Every operator works in place on the first `rows` rows of a `ProbTensor`;
//! rows beyond are not reachable yet and are kept as-is.
use crate::dye_seq::DyeSeq;
use crate::dye_track::DyeTrack;
use crate::tensor::{contract_axis, Matrix, ProbTensor};
use statrs::distribution::{Binomial, Discrete};

/// Binomial survival kernel: `[k][n]` is Pr{k dyes survive out of n}, each surviving with `survival`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalTensor {
    survival: f64,
    matrix: Matrix,
}

impl RemovalTensor {
    /// Kernel for up to `max_count` dyes.
    pub fn new(max_count: usize, survival: f64) -> Self {
        assert!((0f64..=1f64).contains(&survival), "{}", survival);
        let dim = max_count + 1;
        if survival == 1f64 {
            return Self {
                survival,
                matrix: Matrix::identity(dim),
            };
        }
        let mut matrix = Matrix::zeros(dim);
        for n in 0..dim {
            let binom = match Binomial::new(survival, n as u64) {
                Ok(binom) => binom,
                Err(why) => panic!("{:?} for ({},{})", why, survival, n),
            };
            for k in 0..=n {
                *matrix.get_mut(k, n) = binom.pmf(k as u64);
            }
        }
        Self { survival, matrix }
    }
    pub fn max_count(&self) -> usize {
        self.matrix.dim() - 1
    }
    pub fn survival(&self) -> f64 {
        self.survival
    }
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }
    pub fn get(&self, k: usize, n: usize) -> f64 {
        self.matrix.get(k, n)
    }
}

/// Remove dyes of the `c`-th channel independently, at the first `rows` rows.
pub fn remove_dye(tensor: &mut ProbTensor, rows: usize, c: usize, removal: &RemovalTensor) {
    tensor.contract_channel(rows, c, removal.matrix());
}

/// Detach the whole peptide with `detach_rate`. The detached mass
/// is moved to the cell with no dye and no Edman cycle, so the total mass is kept.
pub fn detach(tensor: &mut ProbTensor, rows: usize, detach_rate: f64) {
    if rows == 0 || detach_rate == 0f64 {
        return;
    }
    let block = tensor.rows_mut(rows);
    let total: f64 = block.iter().sum();
    block.iter_mut().for_each(|x| *x *= 1f64 - detach_rate);
    block[0] += detach_rate * total;
}

/// Transition of the active dye count in a channel with `n` physical dyes when one of them is cleaved.
/// `[i][i]` = (n-i)/n: the cleaved dye was inactive.
/// `[i][i+1]` = (i+1)/n: the cleaved dye was one of the i+1 active dyes.
/// With no physical dye (`n == 0`) it is the identity.
pub fn cleave_matrix(len: usize, n: usize) -> Matrix {
    if n == 0 {
        return Matrix::identity(len);
    }
    assert!(n < len, "{}>={}", n, len);
    let mut matrix = Matrix::zeros(len);
    let denom = n as f64;
    for i in 0..=n {
        *matrix.get_mut(i, i) = (n - i) as f64 / denom;
        if i < n {
            *matrix.get_mut(i, i + 1) = (i + 1) as f64 / denom;
        }
    }
    matrix
}

/// One Edman cycle over the first `rows` rows. The `e`-th row moves to the `e+1`-th with `edman_eff`,
/// cleaving the `e`-th position of `dye_seq`; `dye_track` gives the number of dyes physically there.
/// The last row of the range only receives mass.
pub fn cleave(
    tensor: &mut ProbTensor,
    rows: usize,
    edman_eff: f64,
    dye_seq: &DyeSeq,
    dye_track: &DyeTrack,
) {
    if rows == 0 {
        return;
    }
    let mut advanced = vec![0f64; tensor.row_stride()];
    // Descending, so that the e-th row is read before it is overwritten.
    for e in (0..rows - 1).rev() {
        advanced
            .iter_mut()
            .zip(tensor.row(e).iter())
            .for_each(|(x, &y)| *x = edman_eff * y);
        if let Some(c) = dye_seq.get(e) {
            let len = tensor.channel_len(c);
            let matrix = cleave_matrix(len, dye_track.count(e, c));
            contract_axis(&mut advanced, tensor.channel_stride(c), len, &matrix);
        }
        tensor
            .row_mut(e + 1)
            .iter_mut()
            .zip(advanced.iter())
            .for_each(|(x, &y)| *x = *x * (1f64 - edman_eff) + y);
    }
    tensor
        .row_mut(0)
        .iter_mut()
        .for_each(|x| *x *= 1f64 - edman_eff);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;
    fn random_tensor<R: Rng>(shape: &[usize], rows: usize, rng: &mut R) -> ProbTensor {
        let mut tensor = ProbTensor::new(shape);
        tensor
            .rows_mut(rows)
            .iter_mut()
            .for_each(|x| *x = rng.gen::<f64>());
        let total = tensor.sum();
        tensor.rows_mut(rows).iter_mut().for_each(|x| *x /= total);
        tensor
    }
    #[test]
    fn removal_tensor() {
        let removal = RemovalTensor::new(4, 0.7);
        assert_eq!(removal.max_count(), 4);
        for n in 0..=4 {
            assert!((removal.matrix().column_sum(n) - 1f64).abs() < 1e-12);
            for k in n + 1..=4 {
                assert_eq!(removal.get(k, n), 0f64);
            }
        }
        assert!((removal.get(1, 2) - 2.0 * 0.7 * 0.3).abs() < 1e-12);
        assert!((removal.get(3, 3) - 0.7f64.powi(3)).abs() < 1e-12);
        assert_eq!(RemovalTensor::new(3, 1.0).matrix(), &Matrix::identity(4));
    }
    #[test]
    fn remove_dye_keeps_mass() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(3209);
        let removal = RemovalTensor::new(5, 0.8);
        let mut tensor = random_tensor(&[3, 4, 6, 2], 2, &mut rng);
        for c in 0..3 {
            remove_dye(&mut tensor, 2, c, &removal);
        }
        assert!((tensor.sum() - 1f64).abs() < 1e-12);
        assert!(tensor.values().iter().all(|&x| 0f64 <= x));
        assert!(tensor.row(2).iter().all(|&x| x == 0f64));
    }
    #[test]
    fn remove_dye_from_full() {
        let removal = RemovalTensor::new(2, 0.5);
        let mut tensor = ProbTensor::new(&[1, 3]);
        *tensor.get_mut(&[0, 2]) = 1f64;
        remove_dye(&mut tensor, 1, 0, &removal);
        assert!((tensor.get(&[0, 0]) - 0.25).abs() < 1e-12);
        assert!((tensor.get(&[0, 1]) - 0.5).abs() < 1e-12);
        assert!((tensor.get(&[0, 2]) - 0.25).abs() < 1e-12);
    }
    #[test]
    fn detach_keeps_mass() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(9);
        for rows in 1..4 {
            let mut tensor = random_tensor(&[4, 3, 2], rows, &mut rng);
            let before = tensor.sum();
            let zero_before = tensor.get(&[0, 0, 0]);
            let rest = before - zero_before;
            detach(&mut tensor, rows, 0.2);
            assert!((tensor.sum() - before).abs() < 1e-12);
            let zero_after = tensor.get(&[0, 0, 0]);
            assert!((zero_after - (zero_before + 0.2 * rest)).abs() < 1e-12);
        }
    }
    #[test]
    fn cleave_matrix_columns() {
        let matrix = cleave_matrix(5, 3);
        for n in 0..=3 {
            assert!((matrix.column_sum(n) - 1f64).abs() < 1e-12);
        }
        assert!((matrix.get(0, 1) - 1.0 / 3.0).abs() < 1e-12);
        assert!((matrix.get(1, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(matrix.get(3, 3), 0f64);
        assert_eq!(cleave_matrix(3, 0), Matrix::identity(3));
    }
    #[test]
    fn cleave_keeps_mass() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(2);
        let dye_seq: DyeSeq = "01.1".parse().unwrap();
        let dye_track = DyeTrack::new(4, 2, &dye_seq);
        for rows in 2..=4 {
            let mut tensor = random_tensor(&[4, 2, 3], rows - 1, &mut rng);
            cleave(&mut tensor, rows, 0.9, &dye_seq, &dye_track);
            assert!((tensor.sum() - 1f64).abs() < 1e-12);
            assert!(tensor.values().iter().all(|&x| 0f64 <= x));
        }
    }
    #[test]
    fn cleave_perfectly() {
        let dye_seq: DyeSeq = "0.".parse().unwrap();
        let dye_track = DyeTrack::new(3, 1, &dye_seq);
        let mut tensor = ProbTensor::new(&[3, 2]);
        *tensor.get_mut(&[0, 1]) = 1f64;
        cleave(&mut tensor, 2, 1f64, &dye_seq, &dye_track);
        assert_eq!(tensor.get(&[1, 0]), 1f64);
        assert_eq!(tensor.sum(), 1f64);
        // Unlabelled position: the count stays.
        cleave(&mut tensor, 3, 1f64, &dye_seq, &dye_track);
        assert_eq!(tensor.get(&[2, 0]), 1f64);
        assert_eq!(tensor.sum(), 1f64);
    }
    #[test]
    fn cleave_half() {
        let dye_seq: DyeSeq = "00".parse().unwrap();
        let dye_track = DyeTrack::new(2, 1, &dye_seq);
        let mut tensor = ProbTensor::new(&[2, 3]);
        *tensor.get_mut(&[0, 1]) = 1f64;
        cleave(&mut tensor, 2, 0.5, &dye_seq, &dye_track);
        // Not cleaved.
        assert!((tensor.get(&[0, 1]) - 0.5).abs() < 1e-12);
        // Cleaved the active dye, or the inactive one.
        assert!((tensor.get(&[1, 0]) - 0.25).abs() < 1e-12);
        assert!((tensor.get(&[1, 1]) - 0.25).abs() < 1e-12);
    }
}
