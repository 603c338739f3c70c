use std::fmt::Debug;
use std::ops::AddAssign;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::NoiseError;
use crate::field::{Field, volume};
use crate::perlin::GradientSet;
use crate::worley::FeatureCache;

/// A generator that can be evaluated at one position at a time.
///
/// Positions are in output samples; each generator maps them onto its own
/// lattice. Implementations must be pure: the result depends only on the
/// generator and the position, never on the scratch state.
pub trait Sampler: Send + Sync + Debug {
    /// Rejects ranks the generator's configuration cannot serve.
    fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        let _ = rank;
        Ok(())
    }

    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64;
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        (**self).check_rank(rank)
    }

    #[inline]
    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        (**self).sample(position, scratch)
    }
}

/// The uniform contract every generator satisfies.
pub trait Source {
    /// Evaluates the generator on a `size` block whose first sample sits at
    /// `location`.
    fn fill(&self, size: &[usize], location: &[f64]) -> Result<Field, NoiseError>;
}

impl<S: Sampler + ?Sized> Source for S {
    fn fill(&self, size: &[usize], location: &[f64]) -> Result<Field, NoiseError> {
        sample_field(self, size, location)
    }
}

/// Counters gathered while sampling, reported once per fill.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Samples pulled back into `[0, 1]`.
    pub clamped: u64,
    /// Cellular searches that hit the radius limit.
    pub saturated: u64,
}

impl AddAssign for FillStats {
    fn add_assign(&mut self, rhs: Self) {
        self.clamped += rhs.clamped;
        self.saturated += rhs.saturated;
    }
}

/// Per-worker buffers reused between samples.
#[derive(Debug, Default)]
pub struct Scratch {
    pub(crate) lattice: Vec<f64>,
    pub(crate) cells: Vec<i64>,
    pub(crate) offsets: Vec<f64>,
    pub(crate) point: Vec<i64>,
    pub(crate) values: Vec<f64>,
    pub(crate) gradients: GradientSet,
    pub(crate) features: FeatureCache,
    pub(crate) stats: FillStats,
    spare: Vec<Vec<f64>>,
}

impl Scratch {
    /// Sizes the lattice buffers for `rank` axes.
    #[inline]
    pub(crate) fn prepare(&mut self, rank: usize) {
        self.lattice.resize(rank, 0.0);
        self.cells.resize(rank, 0);
        self.offsets.resize(rank, 0.0);
        self.point.resize(rank, 0);
    }

    /// Lends out a position buffer for wrappers that rewrite coordinates
    /// before delegating; hand it back with [`Scratch::give_position`].
    #[inline]
    pub(crate) fn take_position(&mut self, position: &[f64]) -> Vec<f64> {
        let mut buffer = self.spare.pop().unwrap_or_default();
        buffer.clear();
        buffer.extend_from_slice(position);
        buffer
    }

    #[inline]
    pub(crate) fn give_position(&mut self, buffer: Vec<f64>) {
        self.spare.push(buffer);
    }

    /// Pulls `value` into `[0, 1]`. NaN becomes 0.
    #[inline]
    pub(crate) fn clamp_unit(&mut self, value: f64) -> f64 {
        if (0.0..=1.0).contains(&value) {
            value
        } else if value.is_nan() {
            self.stats.clamped += 1;
            0.0
        } else {
            self.stats.clamped += 1;
            value.clamp(0.0, 1.0)
        }
    }

    pub fn stats(&self) -> FillStats {
        self.stats
    }

    pub fn take_stats(&mut self) -> FillStats {
        std::mem::take(&mut self.stats)
    }
}

fn check_request(size: &[usize], location: &[f64]) -> Result<usize, NoiseError> {
    let len = volume(size)?;
    if location.len() != size.len() {
        return Err(NoiseError::InvalidShape(format!(
            "size has rank {} but location has rank {}",
            size.len(),
            location.len()
        )));
    }
    if let Some(l) = location.iter().find(|l| !l.is_finite()) {
        return Err(NoiseError::InvalidShape(format!(
            "location component {} is not finite",
            l
        )));
    }
    Ok(len)
}

/// Evaluates `sampler` for every index of a `size` block at `location`.
///
/// Rows along the last axis are the unit of work. With the `parallel`
/// feature they are spread over the rayon pool; every row gets the same
/// positions either way, so the result does not depend on the schedule.
pub fn sample_field<S: Sampler + ?Sized>(
    sampler: &S,
    size: &[usize],
    location: &[f64],
) -> Result<Field, NoiseError> {
    let len = check_request(size, location)?;
    sampler.check_rank(size.len())?;

    let row_len = size[size.len() - 1];
    let mut data = vec![0.0; len];
    let stats = fill_rows(sampler, size, location, row_len, &mut data);

    debug!(
        size = ?size,
        location = ?location,
        clamped = stats.clamped,
        "Filled field"
    );
    if stats.saturated > 0 {
        warn!(
            saturated = stats.saturated,
            "Cellular search hit its radius limit, nearest features may be missing"
        );
    }
    Field::new(size.to_vec(), data)
}

#[cfg(feature = "parallel")]
fn fill_rows<S: Sampler + ?Sized>(
    sampler: &S,
    size: &[usize],
    location: &[f64],
    row_len: usize,
    data: &mut [f64],
) -> FillStats {
    data.par_chunks_mut(row_len)
        .enumerate()
        .map_init(
            || (Scratch::default(), Vec::with_capacity(size.len())),
            |(scratch, position), (row, out)| {
                fill_row(sampler, size, location, row, out, scratch, position);
                scratch.take_stats()
            },
        )
        .reduce(FillStats::default, |mut a, b| {
            a += b;
            a
        })
}

#[cfg(not(feature = "parallel"))]
fn fill_rows<S: Sampler + ?Sized>(
    sampler: &S,
    size: &[usize],
    location: &[f64],
    row_len: usize,
    data: &mut [f64],
) -> FillStats {
    fill_rows_serial(sampler, size, location, row_len, data)
}

#[cfg(any(test, not(feature = "parallel")))]
fn fill_rows_serial<S: Sampler + ?Sized>(
    sampler: &S,
    size: &[usize],
    location: &[f64],
    row_len: usize,
    data: &mut [f64],
) -> FillStats {
    let mut scratch = Scratch::default();
    let mut position = Vec::with_capacity(size.len());
    for (row, out) in data.chunks_mut(row_len).enumerate() {
        fill_row(sampler, size, location, row, out, &mut scratch, &mut position);
    }
    scratch.take_stats()
}

fn fill_row<S: Sampler + ?Sized>(
    sampler: &S,
    size: &[usize],
    location: &[f64],
    row: usize,
    out: &mut [f64],
    scratch: &mut Scratch,
    position: &mut Vec<f64>,
) {
    let rank = size.len();
    position.clear();
    position.resize(rank, 0.0);
    let mut rest = row;
    for axis in (0..rank - 1).rev() {
        position[axis] = location[axis] + (rest % size[axis]) as f64;
        rest /= size[axis];
    }
    for (i, value) in out.iter_mut().enumerate() {
        position[rank - 1] = location[rank - 1] + i as f64;
        *value = sampler.sample(position, scratch);
    }
}
