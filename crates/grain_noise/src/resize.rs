use crate::error::NoiseError;
use crate::field::{Field, increment, volume};
use crate::interp::{Interpolation, collapse_cubic, collapse_linear};

/// Resamples `field` to `shape`.
///
/// Output index `i` on an axis reads the source at `i * (src - 1) / (dst - 1)`,
/// so the first and last samples of every axis line up. Neighbours past the
/// edge repeat the edge value. Values are not clamped.
pub fn resize(
    field: &Field,
    shape: &[usize],
    interpolation: Interpolation,
) -> Result<Field, NoiseError> {
    volume(shape)?;
    if shape.len() != field.rank() {
        return Err(NoiseError::InvalidShape(format!(
            "cannot resize rank {} field to {:?}",
            field.rank(),
            shape
        )));
    }
    if shape == field.shape() {
        return Ok(field.clone());
    }

    let rank = shape.len();
    let source = field.shape();
    let support = interpolation.support();
    let low = interpolation.low();
    let points = support.pow(rank as u32);

    let mut index = vec![0usize; rank];
    let mut cells = vec![0i64; rank];
    let mut weights = vec![0.0; rank];
    let mut values = Vec::with_capacity(points);
    let mut data = Vec::with_capacity(volume(shape)?);
    for _ in 0..volume(shape)? {
        for axis in 0..rank {
            let position = if shape[axis] == 1 {
                0.0
            } else {
                index[axis] as f64 * (source[axis] - 1) as f64 / (shape[axis] - 1) as f64
            };
            let floor = position.floor();
            cells[axis] = floor as i64;
            weights[axis] = position - floor;
        }

        values.clear();
        for point in 0..points {
            let mut offset = 0usize;
            let mut rest = point;
            for axis in 0..rank {
                let step = (rest % support) as i64 + low;
                rest /= support;
                let i = (cells[axis] + step).clamp(0, source[axis] as i64 - 1) as usize;
                offset = offset * source[axis] + i;
            }
            values.push(field.data()[offset]);
        }

        data.push(match interpolation {
            Interpolation::Linear => collapse_linear(&mut values, &weights),
            Interpolation::Cubic => collapse_cubic(&mut values, &weights),
        });
        increment(&mut index, shape);
    }
    Field::new(shape.to_vec(), data)
}
