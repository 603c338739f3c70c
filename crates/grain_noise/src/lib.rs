pub mod curtains;
pub mod error;
pub mod field;
pub mod grid;
pub mod interp;
pub mod octave;
pub mod perlin;
pub mod permutation;
pub mod resize;
pub mod source;
pub mod unit_noise;
pub mod white_noise;
pub mod worley;

#[cfg(feature = "serde")]
pub mod config;
#[cfg(feature = "serde")]
pub mod registry;

pub use crate::curtains::Curtains;
pub use crate::error::NoiseError;
pub use crate::field::Field;
pub use crate::grid::Grid;
pub use crate::interp::{Interpolation, Kernel};
pub use crate::octave::{OctaveParams, Octaves};
pub use crate::perlin::Perlin;
pub use crate::permutation::PermutationTable;
pub use crate::resize::resize;
pub use crate::source::{Sampler, Scratch, Source, sample_field};
pub use crate::unit_noise::UnitNoise;
pub use crate::white_noise::{Embers, WhiteNoise};
pub use crate::worley::{Metric, Worley, WorleyOutput, WorleyParams};

#[cfg(feature = "serde")]
pub use crate::config::ConfigError;
#[cfg(feature = "serde")]
pub use crate::registry::SourceRegistry;

pub use grain_random::Seed;

pub const DEFAULT_TABLE_SIZE: usize = 256;
