use anyhow::Result;
use half::f16;
use ndarray::{Array, IxDyn};

/// Raw model output, wrapper over [`Array<f32, IxDyn>`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTensor(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for RawTensor {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for RawTensor {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn())
    }
}

impl std::ops::Deref for RawTensor {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl RawTensor {
    /// Fails when `xs.len()` does not match the shape.
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }

    /// Half precision outputs are widened to f32.
    pub fn from_shape_f16(shape: &[usize], xs: &[f16]) -> Result<Self> {
        Self::from_shape_vec(shape, xs.iter().map(|x| x.to_f32()).collect())
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }
}
