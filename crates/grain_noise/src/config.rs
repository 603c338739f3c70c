use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::NoiseError;
use crate::grid::Grid;
use crate::interp::Interpolation;
use crate::permutation::PermutationTable;
use crate::worley::{Metric, WorleyOutput, WorleyParams};
use crate::DEFAULT_TABLE_SIZE;
use grain_random::Seed;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("unknown source type `{0}`")]
    UnknownSource(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    Noise(#[from] NoiseError),
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Json(value.to_string())
    }
}

/// A value given once for every axis or once per axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Options shared by every lattice generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Integer, string or byte array. Kept raw so unusable seeds surface as
    /// [`NoiseError::SeedType`] rather than a parse error.
    pub seed: Option<Value>,
    pub wavelength: OneOrMany<f64>,
    pub period: Option<OneOrMany<u32>>,
    pub table_size: usize,
    /// A ready-made permutation, used instead of shuffling `table_size`
    /// values from the seed.
    pub table: Option<Vec<u32>>,
    pub interpolation: Interpolation,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            wavelength: OneOrMany::One(16.0),
            period: None,
            table_size: DEFAULT_TABLE_SIZE,
            table: None,
            interpolation: Interpolation::Linear,
        }
    }
}

impl LatticeConfig {
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        parse(map)
    }

    /// Resolves the seed, drawing fresh entropy when none was given.
    pub fn seed(&self) -> Result<u64, NoiseError> {
        let seed = match &self.seed {
            None | Some(Value::Null) => Seed::entropy(),
            Some(value) => seed_from_json(value)?,
        };
        Ok(seed.to_u64())
    }

    /// The supplied permutation if there is one, else a seeded shuffle.
    pub fn table(&self) -> Result<PermutationTable, NoiseError> {
        match &self.table {
            Some(values) => PermutationTable::from_values(values.clone()),
            None => PermutationTable::new(self.seed()?, self.table_size),
        }
    }

    pub fn grid(&self) -> Result<Grid, NoiseError> {
        Grid::new(
            self.wavelength.clone().into_vec(),
            self.period.clone().map(OneOrMany::into_vec),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorleyConfig {
    pub distance_metric: Metric,
    pub output: WorleyOutput,
    /// Most feature points a cell can hold.
    pub point_count: usize,
    /// Fewest feature points a cell can hold, `point_count` when absent.
    pub min_point_count: Option<usize>,
    pub jitter: f64,
}

impl Default for WorleyConfig {
    fn default() -> Self {
        let params = WorleyParams::default();
        Self {
            distance_metric: params.metric,
            output: params.output,
            point_count: params.max_points,
            min_point_count: None,
            jitter: params.jitter,
        }
    }
}

impl WorleyConfig {
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        parse(map)
    }

    pub fn params(&self) -> WorleyParams {
        WorleyParams {
            metric: self.distance_metric,
            output: self.output,
            min_points: self.min_point_count.unwrap_or(self.point_count),
            max_points: self.point_count,
            jitter: self.jitter,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurtainsConfig {
    pub axis: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbersConfig {
    pub depth: usize,
    pub threshold: f64,
}

impl Default for EmbersConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            threshold: 0.9998,
        }
    }
}

/// Reads a typed view of a source description. Unrelated keys are ignored,
/// so one object can carry the options of several layers.
pub fn parse<T: serde::de::DeserializeOwned>(map: &Map<String, Value>) -> Result<T, ConfigError> {
    Ok(serde_json::from_value(Value::Object(map.clone()))?)
}

/// Interprets a JSON seed: a non-negative integer, a string, or an array of
/// byte values.
pub fn seed_from_json(value: &Value) -> Result<Seed, NoiseError> {
    match value {
        Value::Number(number) => {
            if let Some(v) = number.as_u64() {
                Ok(Seed::Int(v))
            } else if let Some(v) = number.as_i64() {
                Ok(Seed::from_i64(v)?)
            } else {
                Err(NoiseError::SeedType(format!("{} is not an integer", number)))
            }
        }
        Value::String(text) => Ok(Seed::Text(text.clone())),
        Value::Array(items) => {
            let bytes = items
                .iter()
                .map(|item| {
                    item.as_i64()
                        .ok_or_else(|| NoiseError::SeedType(format!("{} is not a byte", item)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Seed::from_byte_values(&bytes)?)
        }
        other => Err(NoiseError::SeedType(format!(
            "{} is not an integer, string or byte array",
            other
        ))),
    }
}
