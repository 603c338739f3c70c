use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::NoiseError;
use crate::grid::{Grid, corner, locate};
use crate::interp::{Kernel, collapse_linear};
use crate::permutation::PermutationTable;
use crate::source::{Sampler, Scratch};

/// Unit gradient directions for one rank, stored flat with stride `rank`.
///
/// Rank 1 uses ±1. Higher ranks use every direction with exactly two
/// non-zero components, which gives 4 gradients in 2-D and the classic 12
/// edge directions in 3-D.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradientSet {
    rank: usize,
    components: Vec<f64>,
}

impl GradientSet {
    pub fn new(rank: usize) -> Self {
        let mut components = Vec::new();
        if rank == 1 {
            components.extend_from_slice(&[1.0, -1.0]);
        }
        for a in 0..rank {
            for b in a + 1..rank {
                for signs in 0..4 {
                    let start = components.len();
                    components.resize(start + rank, 0.0);
                    components[start + a] = if signs & 1 != 0 {
                        -FRAC_1_SQRT_2
                    } else {
                        FRAC_1_SQRT_2
                    };
                    components[start + b] = if signs & 2 != 0 {
                        -FRAC_1_SQRT_2
                    } else {
                        FRAC_1_SQRT_2
                    };
                }
            }
        }
        Self { rank, components }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn len(&self) -> usize {
        if self.rank == 0 {
            0
        } else {
            self.components.len() / self.rank
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> &[f64] {
        &self.components[index * self.rank..(index + 1) * self.rank]
    }
}

/// Gradient noise with quintic fading, rescaled to `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Perlin {
    table: PermutationTable,
    grid: Grid,
}

impl Perlin {
    pub fn new(seed: u64, grid: Grid, table_size: usize) -> Result<Self, NoiseError> {
        Ok(Self::with_table(PermutationTable::new(seed, table_size)?, grid))
    }

    pub fn with_table(table: PermutationTable, grid: Grid) -> Self {
        Self { table, grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl Sampler for Perlin {
    fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        self.grid.check_rank(rank)
    }

    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        let rank = position.len();
        scratch.prepare(rank);
        if scratch.gradients.rank() != rank {
            scratch.gradients = GradientSet::new(rank);
        }
        self.grid.to_lattice(position, &mut scratch.lattice);
        locate(&scratch.lattice, &mut scratch.cells, &mut scratch.offsets);

        let count = scratch.gradients.len();
        scratch.values.clear();
        for index in 0..1usize << rank {
            corner(&scratch.cells, index, &mut scratch.point);
            self.grid.wrap_all(&mut scratch.point);
            let gradient = scratch.gradients.get(self.table.hash(&scratch.point) % count);
            let mut dot = 0.0;
            for axis in 0..rank {
                let d = scratch.offsets[axis] - ((index >> axis) & 1) as f64;
                dot += gradient[axis] * d;
            }
            scratch.values.push(dot);
        }

        for offset in scratch.offsets.iter_mut() {
            *offset = Kernel::Quintic.apply(*offset);
        }
        let raw = collapse_linear(&mut scratch.values, &scratch.offsets);
        // |raw| <= sqrt(N) / 2 for unit gradients
        let value = 0.5 + raw * (1.0 / (rank as f64).sqrt());
        scratch.clamp_unit(value)
    }
}

#[cfg(test)]
mod test {
    use grain_random::{Random, XoroshiroRandom};

    use crate::grid::Grid;
    use crate::perlin::{GradientSet, Perlin};
    use crate::source::{Sampler, Scratch, Source};

    #[test]
    fn gradient_sets() {
        assert_eq!(GradientSet::new(1).len(), 2);
        assert_eq!(GradientSet::new(2).len(), 4);
        assert_eq!(GradientSet::new(3).len(), 12);
        assert_eq!(GradientSet::new(4).len(), 24);
        for rank in 1..6 {
            let set = GradientSet::new(rank);
            for i in 0..set.len() {
                let mut norm = 0.0;
                for c in set.get(i) {
                    norm += c * c;
                }
                assert!((norm - 1.0).abs() < 1e-12);
            }
        }
        let r = std::f64::consts::FRAC_1_SQRT_2;
        assert_eq!(GradientSet::new(3).get(0), &[r, r, 0.0]);
        assert_eq!(GradientSet::new(3).get(5), &[-r, 0.0, r]);
    }

    #[test]
    fn half_at_lattice_points() {
        let perlin = Perlin::new(9, Grid::uniform(16.0).unwrap(), 256).unwrap();
        let mut scratch = Scratch::default();
        for p in [[0.0, 0.0], [16.0, 48.0], [-32.0, 160.0]] {
            assert_eq!(perlin.sample(&p, &mut scratch), 0.5);
        }
    }

    #[test]
    fn sample() {
        let perlin = Perlin::new(42, Grid::uniform(32.0).unwrap(), 256).unwrap();
        let mut scratch = Scratch::default();
        assert_eq!(
            format!("{:.4}", perlin.sample(&[0.0, 1.0], &mut scratch)),
            format!("{:.4}", 0.4845205247402191)
        );
        assert_eq!(
            format!("{:.4}", perlin.sample(&[1.0, 1.0], &mut scratch)),
            format!("{:.4}", 0.4687590132336449)
        );
    }

    #[test]
    fn range_bound() {
        let mut random = XoroshiroRandom::new(1234);
        for rank in 1..=3 {
            let perlin = Perlin::new(rank as u64, Grid::uniform(7.3).unwrap(), 256).unwrap();
            let mut scratch = Scratch::default();
            let mut position = vec![0.0; rank];
            let mut inside = 0;
            for _ in 0..10_000 {
                for p in position.iter_mut() {
                    *p = (random.next_f64() - 0.5) * 1000.0;
                }
                let v = perlin.sample(&position, &mut scratch);
                assert!((0.0..=1.0).contains(&v));
                if v > 0.0 && v < 1.0 {
                    inside += 1;
                }
            }
            assert!(inside >= 9_990);
            assert_eq!(scratch.stats().clamped, 0);
        }
    }

    #[test]
    fn far_locations_are_defined() {
        for grid in [Grid::uniform(0.5).unwrap(), Grid::tiled(4.0, 3).unwrap()] {
            let perlin = Perlin::new(8, grid, 256).unwrap();
            for location in [[1e19, 0.0], [-1e21, 5.0], [f64::MAX, f64::MIN]] {
                let field = perlin.fill(&[2, 3], &location).unwrap();
                assert!(field.data().iter().all(|v| (0.0..=1.0).contains(v)));
            }
        }
        // no fractional part left that far out
        let perlin = Perlin::new(8, Grid::uniform(0.5).unwrap(), 256).unwrap();
        let field = perlin.fill(&[2, 2], &[1e19, -1e19]).unwrap();
        assert!(field.data().iter().all(|v| *v == 0.5));
    }

    #[test]
    fn tiles_with_period() {
        let perlin = Perlin::new(3, Grid::new(vec![8.0, 4.0], Some(vec![3, 6])).unwrap(), 256)
            .unwrap();
        let a = perlin.fill(&[10, 10], &[0.0, 0.0]).unwrap();
        let b = perlin.fill(&[10, 10], &[24.0, 0.0]).unwrap();
        let c = perlin.fill(&[10, 10], &[0.0, -24.0]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}
