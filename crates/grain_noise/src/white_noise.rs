use grain_random::{Random, XoroshiroRandom};

use crate::error::NoiseError;
use crate::grid::{corner, locate};
use crate::interp::collapse_linear;
use crate::source::{Sampler, Scratch};

/// Most dot sizes an [`Embers`] field can layer.
pub const MAX_EMBER_DEPTH: usize = 16;
const EMBER_GROWTH: f64 = 1.5;

/// Uniform static: every integer sample point gets an independent value in
/// `[0, 1)`, so moving `location` slides a window over one fixed field.
#[derive(Clone, Debug, PartialEq)]
pub struct WhiteNoise {
    random: XoroshiroRandom,
}

impl WhiteNoise {
    pub fn new(seed: u64) -> Self {
        Self::from_random(XoroshiroRandom::new(seed).fork_hash("white_noise"))
    }

    fn from_random(random: XoroshiroRandom) -> Self {
        Self { random }
    }

    /// The value stored at an integer sample point.
    #[inline]
    pub fn value(&self, point: &[i64]) -> f64 {
        self.random.clone().fork_at(point).next_f64()
    }
}

impl Sampler for WhiteNoise {
    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        scratch.prepare(position.len());
        locate(position, &mut scratch.cells, &mut scratch.offsets);
        self.value(&scratch.cells)
    }
}

/// Sparse bright dots on black, like embers or stars.
///
/// Each layer keeps the static points above `threshold`, lifts them to
/// `[0.75, 1]` and spreads them over cells 1.5 times wider than the layer
/// before. Layers are merged by taking the brightest.
#[derive(Clone, Debug, PartialEq)]
pub struct Embers {
    layers: Vec<WhiteNoise>,
    threshold: f64,
}

impl Embers {
    pub fn new(seed: u64, depth: usize, threshold: f64) -> Result<Self, NoiseError> {
        if depth == 0 || depth > MAX_EMBER_DEPTH {
            return Err(NoiseError::parameter(
                "depth",
                format!("{} is outside 1..={}", depth, MAX_EMBER_DEPTH),
            ));
        }
        if !(0.0..1.0).contains(&threshold) {
            return Err(NoiseError::parameter(
                "threshold",
                format!("{} is outside [0, 1)", threshold),
            ));
        }
        let mut random = XoroshiroRandom::new(seed).fork_hash("embers");
        let layers = (0..depth)
            .map(|_| WhiteNoise::from_random(random.fork()))
            .collect();
        Ok(Self { layers, threshold })
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    fn glow(&self, value: f64) -> f64 {
        if value > self.threshold {
            0.75 + 0.25 * (value - self.threshold)
        } else {
            0.0
        }
    }
}

impl Sampler for Embers {
    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        let rank = position.len();
        scratch.prepare(rank);
        let mut scale = 1.0;
        let mut brightest = 0.0f64;
        for layer in &self.layers {
            for (l, p) in scratch.lattice.iter_mut().zip(position) {
                *l = p / scale;
            }
            locate(&scratch.lattice, &mut scratch.cells, &mut scratch.offsets);
            scratch.values.clear();
            for index in 0..1usize << rank {
                corner(&scratch.cells, index, &mut scratch.point);
                let glow = self.glow(layer.value(&scratch.point));
                scratch.values.push(glow);
            }
            let value = collapse_linear(&mut scratch.values, &scratch.offsets);
            brightest = brightest.max(value);
            scale *= EMBER_GROWTH;
        }
        scratch.clamp_unit(brightest)
    }
}
