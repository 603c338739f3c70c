use crate::error::NoiseError;
use crate::grid::{Grid, locate, neighbor};
use crate::interp::{Interpolation, Kernel, collapse_cubic, collapse_linear};
use crate::permutation::PermutationTable;
use crate::source::{Sampler, Scratch};

/// Value noise: every lattice point carries a scalar in `[0, 1]` taken from
/// the permutation table, and samples blend the surrounding points.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitNoise {
    table: PermutationTable,
    grid: Grid,
    kernel: Kernel,
    interpolation: Interpolation,
}

impl UnitNoise {
    pub fn new(
        seed: u64,
        grid: Grid,
        table_size: usize,
        interpolation: Interpolation,
    ) -> Result<Self, NoiseError> {
        Self::with_kernel(seed, grid, table_size, Kernel::Linear, interpolation)
    }

    /// Unit noise with cosine-shaped weights, softer around lattice points.
    pub fn cosine(
        seed: u64,
        grid: Grid,
        table_size: usize,
        interpolation: Interpolation,
    ) -> Result<Self, NoiseError> {
        Self::with_kernel(seed, grid, table_size, Kernel::Cosine, interpolation)
    }

    pub fn with_kernel(
        seed: u64,
        grid: Grid,
        table_size: usize,
        kernel: Kernel,
        interpolation: Interpolation,
    ) -> Result<Self, NoiseError> {
        let table = PermutationTable::new(seed, table_size)?;
        Ok(Self::with_table(table, grid, kernel, interpolation))
    }

    /// Unit noise over a caller-supplied permutation.
    pub fn with_table(
        table: PermutationTable,
        grid: Grid,
        kernel: Kernel,
        interpolation: Interpolation,
    ) -> Self {
        Self {
            table,
            grid,
            kernel,
            interpolation,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// The scalar stored at a lattice point, after wrapping.
    pub fn lattice_value(&self, point: &[i64]) -> f64 {
        let mut wrapped = point.to_vec();
        self.grid.wrap_all(&mut wrapped);
        self.table.value(self.table.hash(&wrapped))
    }
}

impl Sampler for UnitNoise {
    fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        self.grid.check_rank(rank)
    }

    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        let rank = position.len();
        scratch.prepare(rank);
        self.grid.to_lattice(position, &mut scratch.lattice);
        locate(&scratch.lattice, &mut scratch.cells, &mut scratch.offsets);

        let support = self.interpolation.support();
        let low = self.interpolation.low();
        scratch.values.clear();
        for index in 0..support.pow(rank as u32) {
            neighbor(&scratch.cells, index, low, support, &mut scratch.point);
            self.grid.wrap_all(&mut scratch.point);
            let value = self.table.value(self.table.hash(&scratch.point));
            scratch.values.push(value);
        }

        for offset in scratch.offsets.iter_mut() {
            *offset = self.kernel.apply(*offset);
        }
        let value = match self.interpolation {
            Interpolation::Linear => collapse_linear(&mut scratch.values, &scratch.offsets),
            Interpolation::Cubic => collapse_cubic(&mut scratch.values, &scratch.offsets),
        };
        scratch.clamp_unit(value)
    }
}
