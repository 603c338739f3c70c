use crate::error::NoiseError;

/// Maps sample positions onto the integer lattice.
///
/// `wavelength` is the size of one lattice cell in output samples, one value
/// per axis or a single value shared by all axes. When `period` is set, lattice
/// coordinates wrap before they are hashed so the field tiles every
/// `period * wavelength` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    wavelength: Vec<f64>,
    period: Option<Vec<i64>>,
}

impl Grid {
    pub fn new(wavelength: Vec<f64>, period: Option<Vec<u32>>) -> Result<Self, NoiseError> {
        if wavelength.is_empty() {
            return Err(NoiseError::InvalidShape(
                "wavelength needs at least one value".to_string(),
            ));
        }
        if let Some(w) = wavelength.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(NoiseError::parameter(
                "wavelength",
                format!("{} is not a positive finite number", w),
            ));
        }
        let period = match period {
            Some(period) if period.is_empty() => {
                return Err(NoiseError::InvalidShape(
                    "period needs at least one value".to_string(),
                ));
            }
            Some(period) if period.contains(&0) => {
                return Err(NoiseError::parameter("period", "must be at least 1"));
            }
            Some(period) => Some(period.into_iter().map(i64::from).collect()),
            None => None,
        };
        Ok(Self { wavelength, period })
    }

    pub fn uniform(wavelength: f64) -> Result<Self, NoiseError> {
        Self::new(vec![wavelength], None)
    }

    pub fn tiled(wavelength: f64, period: u32) -> Result<Self, NoiseError> {
        Self::new(vec![wavelength], Some(vec![period]))
    }

    pub fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        if self.wavelength.len() != 1 && self.wavelength.len() != rank {
            return Err(NoiseError::InvalidShape(format!(
                "{} wavelengths given for rank {}",
                self.wavelength.len(),
                rank
            )));
        }
        match &self.period {
            Some(period) if period.len() != 1 && period.len() != rank => {
                Err(NoiseError::InvalidShape(format!(
                    "{} periods given for rank {}",
                    period.len(),
                    rank
                )))
            }
            _ => Ok(()),
        }
    }

    #[inline]
    pub fn wavelength(&self, axis: usize) -> f64 {
        if self.wavelength.len() == 1 {
            self.wavelength[0]
        } else {
            self.wavelength[axis]
        }
    }

    #[inline]
    pub fn period(&self, axis: usize) -> Option<i64> {
        self.period.as_ref().map(|period| {
            if period.len() == 1 {
                period[0]
            } else {
                period[axis]
            }
        })
    }

    #[inline]
    pub fn to_lattice(&self, position: &[f64], out: &mut [f64]) {
        for (axis, (o, p)) in out.iter_mut().zip(position).enumerate() {
            *o = p / self.wavelength(axis);
        }
    }

    #[inline]
    pub fn wrap(&self, axis: usize, cell: i64) -> i64 {
        match self.period(axis) {
            Some(period) => cell.rem_euclid(period),
            None => cell,
        }
    }

    #[inline]
    pub fn wrap_all(&self, cells: &mut [i64]) {
        if self.period.is_none() {
            return;
        }
        for (axis, cell) in cells.iter_mut().enumerate() {
            *cell = self.wrap(axis, *cell);
        }
    }
}

/// Splits lattice coordinates into the containing cell and the offset inside
/// it. Integer coordinates land in the upper cell's lower corner, offset 0.
///
/// Cells saturate at the ends of `i64`; past that, and for infinite
/// coordinates, the offset is 0.
#[inline]
pub fn locate(coord: &[f64], cells: &mut [i64], offsets: &mut [f64]) {
    for ((&c, cell), offset) in coord.iter().zip(cells.iter_mut()).zip(offsets.iter_mut()) {
        let floor = c.floor();
        *cell = floor as i64;
        *offset = if floor.is_finite() { c - floor } else { 0.0 };
    }
}

/// Corner `index` of the cell at `cells`; bit `a` of the index steps axis `a`.
///
/// Steps wrap at the ends of `i64`. Table lookups only read the low bits, so
/// the lattice stays continuous across the wrap.
#[inline]
pub fn corner(cells: &[i64], index: usize, out: &mut [i64]) {
    for (axis, (o, &c)) in out.iter_mut().zip(cells).enumerate() {
        *o = c.wrapping_add(((index >> axis) & 1) as i64);
    }
}

/// Point `index` of the `width^N` block starting at `cells + low`, axis 0 as
/// the least significant digit. Wraps like [`corner`].
#[inline]
pub fn neighbor(cells: &[i64], index: usize, low: i64, width: usize, out: &mut [i64]) {
    let mut rest = index;
    for (o, &c) in out.iter_mut().zip(cells) {
        *o = c.wrapping_add(low).wrapping_add((rest % width) as i64);
        rest /= width;
    }
}
