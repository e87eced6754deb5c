//! Dense tensors for the forward algorithm.
//! Axis 0 is the number of successful Edman cycles, the other axes are the
//! number of active dyes in each channel.

/// A probability tensor. It is a serialized, row-major array.
/// A "row" is the slice sharing the same index along axis 0, i.e., the same number of Edman cycles.
#[derive(Debug, Clone)]
pub struct ProbTensor {
    // Total memory.
    values: Vec<f64>,
    // Shape of each axis, including axis 0.
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl ProbTensor {
    /// All-zero tensor. Every axis should be at least one long.
    pub fn new(shape: &[usize]) -> Self {
        assert!(!shape.is_empty() && shape.iter().all(|&len| 0 < len));
        let mut strides = vec![1; shape.len()];
        for axis in (0..shape.len() - 1).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }
        let total_cells = strides[0] * shape[0];
        Self {
            values: vec![0f64; total_cells],
            shape: shape.to_vec(),
            strides,
        }
    }
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn num_rows(&self) -> usize {
        self.shape[0]
    }
    pub fn num_channels(&self) -> usize {
        self.shape.len() - 1
    }
    /// Number of cells in a row.
    pub fn row_stride(&self) -> usize {
        self.strides[0]
    }
    /// Length of the `c`-th channel axis, i.e., max dyes + 1.
    pub fn channel_len(&self, c: usize) -> usize {
        self.shape[1 + c]
    }
    pub fn channel_stride(&self, c: usize) -> usize {
        self.strides[1 + c]
    }
    fn offset(&self, loc: &[usize]) -> usize {
        debug_assert_eq!(loc.len(), self.shape.len());
        loc.iter()
            .zip(self.shape.iter())
            .zip(self.strides.iter())
            .map(|((&i, &len), &stride)| {
                debug_assert!(i < len, "{:?},{:?}", loc, self.shape);
                i * stride
            })
            .sum()
    }
    /// `loc` is `[edman cycles, dyes in channel 0, dyes in channel 1, ...]`.
    pub fn get(&self, loc: &[usize]) -> f64 {
        self.values[self.offset(loc)]
    }
    pub fn get_mut(&mut self, loc: &[usize]) -> &mut f64 {
        let offset = self.offset(loc);
        &mut self.values[offset]
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    /// The first `rows` rows.
    pub fn rows(&self, rows: usize) -> &[f64] {
        &self.values[..rows * self.strides[0]]
    }
    pub fn rows_mut(&mut self, rows: usize) -> &mut [f64] {
        let end = rows * self.strides[0];
        &mut self.values[..end]
    }
    pub fn row(&self, e: usize) -> &[f64] {
        let stride = self.strides[0];
        &self.values[e * stride..(e + 1) * stride]
    }
    pub fn row_mut(&mut self, e: usize) -> &mut [f64] {
        let stride = self.strides[0];
        &mut self.values[e * stride..(e + 1) * stride]
    }
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
    pub fn sum_rows(&self, rows: usize) -> f64 {
        self.rows(rows).iter().sum()
    }
    /// Contract the `c`-th channel axis of the first `rows` rows with `matrix`.
    pub fn contract_channel(&mut self, rows: usize, c: usize, matrix: &Matrix) {
        let (stride, len) = (self.channel_stride(c), self.channel_len(c));
        contract_axis(self.rows_mut(rows), stride, len, matrix);
    }
    /// Multiply the `c`-th channel axis of the first `rows` rows by `weights`.
    pub fn scale_channel(&mut self, rows: usize, c: usize, weights: &[f64]) {
        let (stride, len) = (self.channel_stride(c), self.channel_len(c));
        scale_axis(self.rows_mut(rows), stride, len, weights);
    }
}

/// Square matrix, serialized as `[row][column]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dim: usize,
    values: Vec<f64>,
}

impl Matrix {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            values: vec![0f64; dim * dim],
        }
    }
    pub fn identity(dim: usize) -> Self {
        let mut matrix = Self::zeros(dim);
        for i in 0..dim {
            *matrix.get_mut(i, i) = 1f64;
        }
        matrix
    }
    pub fn dim(&self) -> usize {
        self.dim
    }
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.dim + j]
    }
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        &mut self.values[i * self.dim + j]
    }
    /// Sum of the `j`-th column.
    pub fn column_sum(&self, j: usize) -> f64 {
        (0..self.dim).map(|i| self.get(i, j)).sum()
    }
}

/// For each fibre along an axis with `stride` and `len` in `block`,
/// replace `x` by `matrix[..len][..len] * x`. Only the upper-left `len`x`len` part of `matrix` is used.
/// `block` should be a whole number of `stride * len` blocks, as is any set of rows of a `ProbTensor`.
pub fn contract_axis(block: &mut [f64], stride: usize, len: usize, matrix: &Matrix) {
    assert!(len <= matrix.dim(), "{}>{}", len, matrix.dim());
    let outer_stride = stride * len;
    debug_assert_eq!(block.len() % outer_stride, 0);
    let mut fibre = vec![0f64; len];
    for outer in (0..block.len()).step_by(outer_stride) {
        for inner in 0..stride {
            let base = outer + inner;
            for (i, x) in fibre.iter_mut().enumerate() {
                *x = block[base + i * stride];
            }
            for k in 0..len {
                block[base + k * stride] = fibre
                    .iter()
                    .enumerate()
                    .map(|(n, x)| matrix.get(k, n) * x)
                    .sum();
            }
        }
    }
}

/// For each fibre along an axis with `stride` and `len`, multiply the `i`-th element by `weights[i]`.
pub fn scale_axis(block: &mut [f64], stride: usize, len: usize, weights: &[f64]) {
    assert_eq!(weights.len(), len);
    for (i, x) in block.iter_mut().enumerate() {
        *x *= weights[(i / stride) % len];
    }
}
