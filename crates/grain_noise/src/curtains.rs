use crate::error::NoiseError;
use crate::source::{Sampler, Scratch};

/// Pins one axis of the inner generator to zero, so the output only varies
/// across the remaining axes. With the default axis 0 on an image, every
/// row repeats the first one and the noise hangs in vertical bands.
#[derive(Clone, Debug, PartialEq)]
pub struct Curtains<S> {
    inner: S,
    axis: usize,
}

impl<S: Sampler> Curtains<S> {
    pub fn new(inner: S) -> Self {
        Self::along(inner, 0)
    }

    pub fn along(inner: S, axis: usize) -> Self {
        Self { inner, axis }
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Sampler> Sampler for Curtains<S> {
    fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        if self.axis >= rank {
            return Err(NoiseError::InvalidShape(format!(
                "curtain axis {} does not exist at rank {}",
                self.axis, rank
            )));
        }
        self.inner.check_rank(rank)
    }

    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        let mut pinned = scratch.take_position(position);
        pinned[self.axis] = 0.0;
        let value = self.inner.sample(&pinned, scratch);
        scratch.give_position(pinned);
        value
    }
}
