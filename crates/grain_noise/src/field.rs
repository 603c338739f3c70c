use crate::error::NoiseError;

/// Owned, row-major N-dimensional array of samples. The last axis is
/// contiguous.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    shape: Vec<usize>,
    data: Vec<f64>,
}

/// Checks a requested shape and returns the number of elements it holds.
pub fn volume(shape: &[usize]) -> Result<usize, NoiseError> {
    if shape.is_empty() {
        return Err(NoiseError::InvalidShape("shape has no axes".to_string()));
    }
    let mut volume = 1usize;
    for (axis, &extent) in shape.iter().enumerate() {
        if extent == 0 {
            return Err(NoiseError::InvalidShape(format!(
                "axis {} has zero length in {:?}",
                axis, shape
            )));
        }
        volume = volume.checked_mul(extent).ok_or_else(|| {
            NoiseError::InvalidShape(format!("shape {:?} is too large", shape))
        })?;
    }
    Ok(volume)
}

impl Field {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, NoiseError> {
        let expected = volume(&shape)?;
        if data.len() != expected {
            return Err(NoiseError::InvalidShape(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Builds a field by calling `f` with every index in row-major order.
    pub fn from_fn(
        shape: &[usize],
        mut f: impl FnMut(&[usize]) -> f64,
    ) -> Result<Self, NoiseError> {
        let len = volume(shape)?;
        let mut index = vec![0usize; shape.len()];
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(f(&index));
            increment(&mut index, shape);
        }
        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &extent) in index.iter().zip(&self.shape) {
            if i >= extent {
                return None;
            }
            offset = offset * extent + i;
        }
        Some(offset)
    }

    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.offset(index).map(|offset| self.data[offset])
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean(&self) -> f64 {
        let mut total = 0.0;
        for v in &self.data {
            total += v;
        }
        total / self.data.len() as f64
    }

    /// Quantises `[0, 1]` samples to bytes, clamping anything outside.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }
}

/// Steps a row-major index, last axis fastest. Wraps to all zeros after the
/// final index.
pub(crate) fn increment(index: &mut [usize], shape: &[usize]) {
    for axis in (0..shape.len()).rev() {
        index[axis] += 1;
        if index[axis] < shape[axis] {
            return;
        }
        index[axis] = 0;
    }
}

#[cfg(test)]
mod test {
    use crate::error::NoiseError;
    use crate::field::{Field, volume};

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(volume(&[]), Err(NoiseError::InvalidShape(_))));
        assert!(matches!(volume(&[4, 0]), Err(NoiseError::InvalidShape(_))));
        assert!(matches!(
            Field::new(vec![2, 2], vec![0.0; 3]),
            Err(NoiseError::InvalidShape(_))
        ));
        assert_eq!(volume(&[2, 3, 4]), Ok(24));
    }

    #[test]
    fn row_major_layout() {
        let field = Field::from_fn(&[2, 3], |i| (i[0] * 10 + i[1]) as f64).unwrap();
        assert_eq!(field.data(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(field.get(&[1, 2]), Some(12.0));
        assert_eq!(field.get(&[2, 0]), None);
        assert_eq!(field.get(&[0]), None);
        assert_eq!(field.offset(&[1, 0]), Some(3));
    }

    #[test]
    fn statistics() {
        let field = Field::new(vec![4], vec![0.25, -0.5, 1.5, 0.75]).unwrap();
        assert_eq!(field.min(), -0.5);
        assert_eq!(field.max(), 1.5);
        assert_eq!(field.mean(), 0.5);
        assert_eq!(field.to_u8(), vec![64, 0, 255, 191]);
    }
}
