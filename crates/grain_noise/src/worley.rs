use std::hash::{Hash, Hasher};

use grain_random::{Random, XoroshiroRandom};
use rustc_hash::{FxHashMap, FxHasher};

use crate::error::NoiseError;
use crate::grid::{Grid, locate, neighbor};
use crate::permutation::PermutationTable;
use crate::source::{Sampler, Scratch};

/// Upper bound for feature points per cell and for `k`.
pub const MAX_POINTS: usize = 16;
/// Cells searched in every direction before giving up on finding `k` points.
pub const MAX_SEARCH_RADIUS: i64 = 8;
const MAX_CACHED_CELLS: usize = 1 << 14;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl Metric {
    #[inline]
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Metric::Euclidean => {
                let mut total = 0.0;
                for (x, y) in a.iter().zip(b) {
                    total += (x - y) * (x - y);
                }
                total.sqrt()
            }
            Metric::Manhattan => {
                let mut total = 0.0;
                for (x, y) in a.iter().zip(b) {
                    total += (x - y).abs();
                }
                total
            }
            Metric::Chebyshev => {
                let mut max = 0.0f64;
                for (x, y) in a.iter().zip(b) {
                    max = max.max((x - y).abs());
                }
                max
            }
        }
    }

    /// Distance across a unit cell, used to bring distances into `[0, 1]`.
    pub fn diameter(self, rank: usize) -> f64 {
        match self {
            Metric::Euclidean => (rank as f64).sqrt(),
            Metric::Manhattan => rank as f64,
            Metric::Chebyshev => 1.0,
        }
    }
}

/// What a cellular sample reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WorleyOutput {
    /// Distance to the k-th nearest feature point, `k >= 1`.
    Distance(usize),
    /// F2 - F1, bright along cell borders.
    Difference,
    /// Identity of the nearest feature point in `[0, 1)`.
    Cell,
}

impl Default for WorleyOutput {
    fn default() -> Self {
        WorleyOutput::Distance(1)
    }
}

impl WorleyOutput {
    fn wanted(self) -> usize {
        match self {
            WorleyOutput::Distance(k) => k,
            WorleyOutput::Difference => 2,
            WorleyOutput::Cell => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorleyParams {
    pub metric: Metric,
    pub output: WorleyOutput,
    pub min_points: usize,
    pub max_points: usize,
    /// How far points stray from the cell centre; 1 lets them land anywhere
    /// in the cell, 0 pins them to the centre.
    pub jitter: f64,
}

impl Default for WorleyParams {
    fn default() -> Self {
        Self {
            metric: Metric::Euclidean,
            output: WorleyOutput::Distance(1),
            min_points: 1,
            max_points: 1,
            jitter: 1.0,
        }
    }
}

impl WorleyParams {
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.max_points == 0 || self.max_points > MAX_POINTS {
            return Err(NoiseError::parameter(
                "point_count",
                format!("{} is outside 1..={}", self.max_points, MAX_POINTS),
            ));
        }
        if self.min_points > self.max_points {
            return Err(NoiseError::parameter(
                "min_point_count",
                format!(
                    "{} is larger than point_count {}",
                    self.min_points, self.max_points
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(NoiseError::parameter(
                "jitter",
                format!("{} is outside [0, 1]", self.jitter),
            ));
        }
        if let WorleyOutput::Distance(k) = self.output {
            if k == 0 || k > MAX_POINTS {
                return Err(NoiseError::parameter(
                    "output",
                    format!("distance rank {} is outside 1..={}", k, MAX_POINTS),
                ));
            }
        }
        Ok(())
    }
}

/// Feature points of one cell, offsets relative to the cell's lower corner.
#[derive(Clone, Debug, PartialEq)]
struct CellFeatures {
    offsets: Vec<f64>,
    ids: Vec<f64>,
}

/// Per-worker memo of cell features keyed by wrapped cell coordinate.
///
/// Entries are only valid for the generator that produced them, so the
/// cache is emptied whenever a different generator claims it.
#[derive(Debug, Default)]
pub(crate) struct FeatureCache {
    owner: u64,
    cells: FxHashMap<Vec<i64>, CellFeatures>,
    key: Vec<i64>,
}

impl FeatureCache {
    fn claim(&mut self, owner: u64) {
        if self.owner != owner {
            self.cells.clear();
            self.owner = owner;
        }
    }

    fn lookup(&mut self, worley: &Worley, cell: &[i64]) -> &CellFeatures {
        self.key.clear();
        self.key
            .extend(cell.iter().enumerate().map(|(axis, &c)| worley.grid.wrap(axis, c)));
        if !self.cells.contains_key(self.key.as_slice()) {
            if self.cells.len() >= MAX_CACHED_CELLS {
                self.cells.clear();
            }
            let features = worley.cell_features(&self.key);
            self.cells.insert(self.key.clone(), features);
        }
        &self.cells[self.key.as_slice()]
    }
}

/// The `k` smallest distances seen so far, ascending. Ties keep the earlier
/// candidate first.
struct Nearest {
    wanted: usize,
    len: usize,
    distances: [f64; MAX_POINTS],
    ids: [f64; MAX_POINTS],
}

impl Nearest {
    fn new(wanted: usize) -> Self {
        Self {
            wanted,
            len: 0,
            distances: [f64::INFINITY; MAX_POINTS],
            ids: [0.0; MAX_POINTS],
        }
    }

    #[inline]
    fn insert(&mut self, distance: f64, id: f64) {
        if self.len == self.wanted && distance >= self.distances[self.len - 1] {
            return;
        }
        let mut i = self.len.min(self.wanted - 1);
        while i > 0 && self.distances[i - 1] > distance {
            self.distances[i] = self.distances[i - 1];
            self.ids[i] = self.ids[i - 1];
            i -= 1;
        }
        self.distances[i] = distance;
        self.ids[i] = id;
        if self.len < self.wanted {
            self.len += 1;
        }
    }

    fn is_full(&self) -> bool {
        self.len == self.wanted
    }

    fn last(&self) -> f64 {
        self.distances[self.wanted - 1]
    }
}

/// Cellular noise: distances from each sample to pseudo-random feature
/// points scattered over the lattice cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Worley {
    table: PermutationTable,
    grid: Grid,
    params: WorleyParams,
    cells_random: XoroshiroRandom,
    fingerprint: u64,
}

impl Worley {
    pub fn new(
        seed: u64,
        grid: Grid,
        table_size: usize,
        params: WorleyParams,
    ) -> Result<Self, NoiseError> {
        params.validate()?;
        let table = PermutationTable::new(seed, table_size)?;
        let cells_random = XoroshiroRandom::new(seed).fork_hash("worley_cells");

        let mut hasher = FxHasher::default();
        seed.hash(&mut hasher);
        table_size.hash(&mut hasher);
        params.min_points.hash(&mut hasher);
        params.max_points.hash(&mut hasher);
        params.jitter.to_bits().hash(&mut hasher);
        // zero marks an unclaimed cache
        let fingerprint = hasher.finish() | 1;

        Ok(Self {
            table,
            grid,
            params,
            cells_random,
            fingerprint,
        })
    }

    pub fn params(&self) -> &WorleyParams {
        &self.params
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn cell_features(&self, wrapped: &[i64]) -> CellFeatures {
        let hash = self.table.hash(wrapped);
        let spread = self.params.max_points - self.params.min_points + 1;
        let count = self.params.min_points + hash % spread;
        let mut random = self.cells_random.clone().fork_at(wrapped);
        let mut offsets = Vec::with_capacity(count * wrapped.len());
        for _ in 0..count * wrapped.len() {
            offsets.push(0.5 + self.params.jitter * (random.next_f64() - 0.5));
        }
        let ids = (0..count).map(|_| random.next_f64()).collect();
        CellFeatures { offsets, ids }
    }

    /// Feature points of a lattice cell in lattice coordinates.
    pub fn feature_points(&self, cell: &[i64]) -> Vec<Vec<f64>> {
        let wrapped: Vec<i64> = cell
            .iter()
            .enumerate()
            .map(|(axis, &c)| self.grid.wrap(axis, c))
            .collect();
        let features = self.cell_features(&wrapped);
        features
            .offsets
            .chunks(cell.len().max(1))
            .map(|local| cell.iter().zip(local).map(|(&c, o)| c as f64 + o).collect())
            .collect()
    }
}

impl Sampler for Worley {
    fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        self.grid.check_rank(rank)
    }

    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        let rank = position.len();
        scratch.prepare(rank);
        self.grid.to_lattice(position, &mut scratch.lattice);
        locate(&scratch.lattice, &mut scratch.cells, &mut scratch.offsets);
        scratch.features.claim(self.fingerprint);

        let metric = self.params.metric;
        let mut nearest = Nearest::new(self.params.output.wanted());
        scratch.values.clear();
        scratch.values.resize(rank, 0.0);

        // Every point outside the searched block is at least `radius` away
        // along some axis, so the search is exact once the k-th distance is
        // within the radius.
        let mut radius = 1i64;
        loop {
            let width = (2 * radius + 1) as usize;
            for index in 0..width.pow(rank as u32) {
                neighbor(&scratch.cells, index, -radius, width, &mut scratch.point);
                if radius > 1 && ring(&scratch.point, &scratch.cells) < radius {
                    continue;
                }
                let features = scratch.features.lookup(self, &scratch.point);
                for (local, &id) in features.offsets.chunks(rank).zip(&features.ids) {
                    // relative to the sample's cell, exact however far out it is
                    for axis in 0..rank {
                        let step = scratch.point[axis].wrapping_sub(scratch.cells[axis]);
                        scratch.values[axis] = step as f64 + local[axis];
                    }
                    let distance = metric.distance(&scratch.values, &scratch.offsets);
                    nearest.insert(distance, id);
                }
            }
            if nearest.is_full() && nearest.last() <= radius as f64 {
                break;
            }
            if radius >= MAX_SEARCH_RADIUS {
                scratch.stats.saturated += 1;
                break;
            }
            radius += 1;
        }

        if !nearest.is_full() {
            return match self.params.output {
                WorleyOutput::Cell => 0.0,
                _ => 1.0,
            };
        }
        let diameter = metric.diameter(rank);
        let value = match self.params.output {
            WorleyOutput::Distance(k) => nearest.distances[k - 1] / diameter,
            WorleyOutput::Difference => (nearest.distances[1] - nearest.distances[0]) / diameter,
            WorleyOutput::Cell => return nearest.ids[0],
        };
        scratch.clamp_unit(value)
    }
}

/// Chebyshev distance between two nearby lattice cells, across the `i64`
/// wrap if need be.
#[inline]
fn ring(point: &[i64], cells: &[i64]) -> i64 {
    let mut ring = 0;
    for (p, c) in point.iter().zip(cells) {
        ring = ring.max(p.wrapping_sub(*c).abs());
    }
    ring
}
