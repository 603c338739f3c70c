use std::fmt::{self, Debug, Formatter};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{
    ConfigError, CurtainsConfig, EmbersConfig, LatticeConfig, WorleyConfig, parse,
};
use crate::curtains::Curtains;
use crate::interp::Kernel;
use crate::octave::{OctaveParams, Octaves};
use crate::perlin::Perlin;
use crate::source::Sampler;
use crate::unit_noise::UnitNoise;
use crate::white_noise::{Embers, WhiteNoise};
use crate::worley::Worley;

/// Every option a built-in generator reads.
const KNOWN_OPTIONS: &[&str] = &[
    "type",
    "seed",
    "wavelength",
    "period",
    "table_size",
    "table",
    "interpolation",
    "axis",
    "distance_metric",
    "output",
    "point_count",
    "min_point_count",
    "jitter",
    "octaves",
    "persistence",
    "lacunarity",
    "base",
    "depth",
    "threshold",
];

/// Builds a generator from the options of one JSON object.
pub type Factory =
    fn(&SourceRegistry, &Map<String, Value>) -> Result<Box<dyn Sampler>, ConfigError>;

/// Generator factories by type name, in registration order.
#[derive(Clone)]
pub struct SourceRegistry {
    factories: IndexMap<String, Factory>,
}

impl Debug for SourceRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// A registry holding every built-in generator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("unit_noise", unit_noise);
        registry.register("cosine_noise", cosine_noise);
        registry.register("curtains", curtains);
        registry.register("cosine_curtains", cosine_curtains);
        registry.register("perlin", perlin);
        registry.register("worley", worley);
        registry.register("octave", octave);
        registry.register("octave_unit_noise", octave_unit_noise);
        registry.register("octave_cosine_noise", octave_cosine_noise);
        registry.register("octave_curtains", octave_curtains);
        registry.register("octave_cosine_curtains", octave_cosine_curtains);
        registry.register("octave_perlin", octave_perlin);
        registry.register("octave_worley", octave_worley);
        registry.register("noise", white_noise);
        registry.register("embers", embers);
        registry
    }

    /// Adds a factory, returning the one previously registered under `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: Factory) -> Option<Factory> {
        let name = name.into();
        debug!(name = %name, "Registered source type");
        self.factories.insert(name, factory)
    }

    pub fn get(&self, name: &str) -> Option<Factory> {
        self.factories.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds the generator a JSON object describes, dispatching on its
    /// `"type"` key.
    pub fn build(&self, description: &Value) -> Result<Box<dyn Sampler>, ConfigError> {
        let map = description.as_object().ok_or_else(|| {
            ConfigError::Json(format!("expected a source object, found {}", description))
        })?;
        let name = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ConfigError::MissingField("type"))?;
        let factory = self
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSource(name.to_string()))?;
        for option in unknown_options(map) {
            warn!(source = name, option, "Ignoring unrecognised option");
        }
        let source = factory(self, map)?;
        debug!(source = name, "Built source");
        Ok(source)
    }

    pub fn build_str(&self, description: &str) -> Result<Box<dyn Sampler>, ConfigError> {
        let value: Value = serde_json::from_str(description)?;
        self.build(&value)
    }
}

/// Keys of a description that no built-in generator reads.
pub fn unknown_options(map: &Map<String, Value>) -> Vec<&str> {
    map.keys()
        .map(String::as_str)
        .filter(|key| !KNOWN_OPTIONS.contains(key))
        .collect()
}

fn unit_noise_with(map: &Map<String, Value>, kernel: Kernel) -> Result<UnitNoise, ConfigError> {
    let lattice = LatticeConfig::from_map(map)?;
    let table = lattice.table()?;
    Ok(UnitNoise::with_table(
        table,
        lattice.grid()?,
        kernel,
        lattice.interpolation,
    ))
}

fn unit_noise(_: &SourceRegistry, map: &Map<String, Value>) -> Result<Box<dyn Sampler>, ConfigError> {
    Ok(Box::new(unit_noise_with(map, Kernel::Linear)?))
}

fn cosine_noise(
    _: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    Ok(Box::new(unit_noise_with(map, Kernel::Cosine)?))
}

fn curtains(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    let axis = parse::<CurtainsConfig>(map)?.axis;
    Ok(Box::new(Curtains::along(unit_noise(registry, map)?, axis)))
}

fn cosine_curtains(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    let axis = parse::<CurtainsConfig>(map)?.axis;
    Ok(Box::new(Curtains::along(cosine_noise(registry, map)?, axis)))
}

fn perlin(_: &SourceRegistry, map: &Map<String, Value>) -> Result<Box<dyn Sampler>, ConfigError> {
    let lattice = LatticeConfig::from_map(map)?;
    let noise = Perlin::with_table(lattice.table()?, lattice.grid()?);
    Ok(Box::new(noise))
}

fn worley(_: &SourceRegistry, map: &Map<String, Value>) -> Result<Box<dyn Sampler>, ConfigError> {
    let lattice = LatticeConfig::from_map(map)?;
    let params = WorleyConfig::from_map(map)?.params();
    let noise = Worley::new(lattice.seed()?, lattice.grid()?, lattice.table_size, params)?;
    Ok(Box::new(noise))
}

fn white_noise(
    _: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    let seed = LatticeConfig::from_map(map)?.seed()?;
    Ok(Box::new(WhiteNoise::new(seed)))
}

fn embers(_: &SourceRegistry, map: &Map<String, Value>) -> Result<Box<dyn Sampler>, ConfigError> {
    let seed = LatticeConfig::from_map(map)?.seed()?;
    let config = parse::<EmbersConfig>(map)?;
    Ok(Box::new(Embers::new(seed, config.depth, config.threshold)?))
}

/// Octaves over a nested `"base"` description.
fn octave(registry: &SourceRegistry, map: &Map<String, Value>) -> Result<Box<dyn Sampler>, ConfigError> {
    let base = map.get("base").ok_or(ConfigError::MissingField("base"))?;
    let base = registry.build(base)?;
    let params = parse::<OctaveParams>(map)?;
    Ok(Box::new(Octaves::new(base, params)?))
}

/// Octaves over a base read from the same object.
fn octave_over(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
    base: Factory,
) -> Result<Box<dyn Sampler>, ConfigError> {
    let base = base(registry, map)?;
    let params = parse::<OctaveParams>(map)?;
    Ok(Box::new(Octaves::new(base, params)?))
}

fn octave_unit_noise(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    octave_over(registry, map, unit_noise)
}

fn octave_cosine_noise(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    octave_over(registry, map, cosine_noise)
}

fn octave_curtains(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    octave_over(registry, map, curtains)
}

fn octave_cosine_curtains(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    octave_over(registry, map, cosine_curtains)
}

fn octave_perlin(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    octave_over(registry, map, perlin)
}

fn octave_worley(
    registry: &SourceRegistry,
    map: &Map<String, Value>,
) -> Result<Box<dyn Sampler>, ConfigError> {
    octave_over(registry, map, worley)
}
