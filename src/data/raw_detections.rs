use ndarray::{s, Array2, ArrayD, ArrayView1, ArrayView2, Axis, Ix2};
use crate::common::InferenceError;

/// Values stored per candidate: cx, cy, w, h, conf.
pub const CANDIDATE_FIELDS: usize = 5;

/// Dense detection output of the model, laid out as `[5][num_candidates]`.
///
/// Rows hold center-x, center-y, width, height and confidence. Construction
/// checks the shape, so every value of this type has exactly five rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetections(Array2<f32>);

impl RawDetections {
    /// Builds the tensor from row-major `[5][n]` values.
    pub fn from_shape_vec(num_candidates: usize, values: Vec<f32>) -> Result<Self, InferenceError> {
        let got = vec![values.len()];
        Array2::from_shape_vec((CANDIDATE_FIELDS, num_candidates), values)
            .map(Self)
            .map_err(|_| InferenceError::OutputShape { expected: num_candidates, got })
    }

    /// Builds the tensor from per-candidate `[cx, cy, w, h, conf]` rows.
    pub fn from_candidates(candidates: &[[f32; CANDIDATE_FIELDS]]) -> Self {
        let mut xs = Array2::zeros((CANDIDATE_FIELDS, candidates.len()));
        for (i, candidate) in candidates.iter().enumerate() {
            for (field, value) in candidate.iter().enumerate() {
                xs[[field, i]] = *value;
            }
        }
        Self(xs)
    }

    /// Accepts an engine output shaped `[1, 5, n]`, `[5, n]`, `[1, n, 5]` or `[n, 5]`.
    ///
    /// When both axes are 5 the channel-first reading wins.
    pub fn from_output(output: ArrayD<f32>) -> Result<Self, InferenceError> {
        let shape = output.shape().to_vec();
        let squeezed = match shape.as_slice() {
            [1, _, _] => output.index_axis_move(Axis(0), 0),
            [_, _] => output,
            _ => return Err(InferenceError::UnsupportedShape(shape)),
        };
        let xs = squeezed
            .into_dimensionality::<Ix2>()
            .map_err(|_| InferenceError::UnsupportedShape(shape.clone()))?;

        match xs.dim() {
            (CANDIDATE_FIELDS, _) => Ok(Self(xs)),
            (_, CANDIDATE_FIELDS) => Ok(Self(xs.reversed_axes().as_standard_layout().into_owned())),
            _ => Err(InferenceError::UnsupportedShape(shape)),
        }
    }

    pub fn num_candidates(&self) -> usize {
        self.0.ncols()
    }

    /// Returns `[cx, cy, w, h, conf]` of one slot.
    pub fn candidate(&self, i: usize) -> [f32; CANDIDATE_FIELDS] {
        let c = self.0.column(i);
        [c[0], c[1], c[2], c[3], c[4]]
    }

    pub fn confidences(&self) -> ArrayView1<'_, f32> {
        self.0.row(4)
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.0.view()
    }

    /// Converts pixel-unit box values into fractions of the model input.
    pub fn normalize_boxes(mut self, input_size: u32) -> Self {
        let scale = input_size as f32;
        self.0.slice_mut(s![0..4, ..]).mapv_inplace(|x| x / scale);
        self
    }
}
