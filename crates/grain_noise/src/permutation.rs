use grain_random::{Random, XoroshiroRandom};
use tracing::debug;

use crate::error::NoiseError;

const MAX_TABLE_SIZE: usize = 1 << 20;

/// Seeded shuffle of `0..P` used to hash integer lattice points.
///
/// The shuffle is stored twice in a row so a chained lookup can add the
/// previous result to a reduced coordinate without a second modulo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermutationTable {
    values: Vec<u32>,
    mask: i64,
}

fn check_size(name: &'static str, size: usize) -> Result<(), NoiseError> {
    if !size.is_power_of_two() || size < 2 || size > MAX_TABLE_SIZE {
        return Err(NoiseError::parameter(
            name,
            format!("{} is not a power of two in 2..={}", size, MAX_TABLE_SIZE),
        ));
    }
    Ok(())
}

impl PermutationTable {
    pub fn new(seed: u64, size: usize) -> Result<Self, NoiseError> {
        check_size("table_size", size)?;
        let mut random = XoroshiroRandom::new(seed).fork_hash("permutation");
        let mut values: Vec<u32> = (0..size as u32).collect();
        for i in 0..size {
            let j = random.next_u32_bound((size - i) as u32) as usize;
            values.swap(i, i + j);
        }
        values.extend_from_within(..size);
        debug!(seed, size, "Built permutation table");
        Ok(Self {
            values,
            mask: size as i64 - 1,
        })
    }

    /// Uses a caller-supplied shuffle. `values` must hold every number in
    /// `0..P` exactly once, `P` a power of two.
    pub fn from_values(mut values: Vec<u32>) -> Result<Self, NoiseError> {
        let size = values.len();
        check_size("table", size)?;
        let mut seen = vec![false; size];
        for &v in &values {
            match seen.get_mut(v as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(NoiseError::parameter(
                        "table",
                        format!("{} is repeated or outside 0..{}", v, size),
                    ));
                }
            }
        }
        values.extend_from_within(..size);
        Ok(Self {
            values,
            mask: size as i64 - 1,
        })
    }

    /// Number of distinct entries, `P`.
    pub fn size(&self) -> usize {
        self.values.len() / 2
    }

    /// The base block, a permutation of `0..P`.
    pub fn values(&self) -> &[u32] {
        &self.values[..self.size()]
    }

    /// Chains the coordinates through the table, last axis innermost.
    #[inline]
    pub fn hash(&self, coords: &[i64]) -> usize {
        let mut h = 0usize;
        for &c in coords.iter().rev() {
            h = self.values[(c & self.mask) as usize + h] as usize;
        }
        h
    }

    /// Scalar in `[0, 1]` for a hash result.
    #[inline]
    pub fn value(&self, index: usize) -> f64 {
        index as f64 / self.mask as f64
    }
}
