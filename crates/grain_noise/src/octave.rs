use crate::error::NoiseError;
use crate::source::{Sampler, Scratch};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OctaveParams {
    pub octaves: u32,
    /// Amplitude kept from one octave to the next, in `(0, 1]`.
    pub persistence: f64,
    /// Frequency multiplier between octaves, at least 1.
    pub lacunarity: f64,
}

impl Default for OctaveParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl OctaveParams {
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.octaves < 1 {
            return Err(NoiseError::parameter("octaves", "at least one octave is needed"));
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(NoiseError::parameter(
                "persistence",
                format!("{} is outside (0, 1]", self.persistence),
            ));
        }
        if !(self.lacunarity >= 1.0 && self.lacunarity.is_finite()) {
            return Err(NoiseError::parameter(
                "lacunarity",
                format!("{} is not a finite number of at least 1", self.lacunarity),
            ));
        }
        let top = self.lacunarity.powf(f64::from(self.octaves - 1));
        if !top.is_finite() {
            return Err(NoiseError::parameter(
                "octaves",
                format!(
                    "{} octaves at lacunarity {} overflow the top frequency",
                    self.octaves, self.lacunarity
                ),
            ));
        }
        Ok(())
    }
}

/// Fractal sum of one base generator sampled at rising frequencies.
///
/// Octave `k` is weighted `persistence^k` and samples the base at
/// `position * lacunarity^k`; the sum is divided by the total weight so the
/// result keeps the base's range. Every octave reads the same base field,
/// so adding octaves only adds finer detail on top of the existing ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Octaves<S> {
    base: S,
    params: OctaveParams,
    amplitudes: Vec<f64>,
    frequencies: Vec<f64>,
    total_amplitude: f64,
}

impl<S: Sampler> Octaves<S> {
    pub fn new(base: S, params: OctaveParams) -> Result<Self, NoiseError> {
        params.validate()?;
        let mut amplitudes = Vec::with_capacity(params.octaves as usize);
        let mut frequencies = Vec::with_capacity(params.octaves as usize);
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total_amplitude = 0.0;
        for _ in 0..params.octaves {
            amplitudes.push(amplitude);
            frequencies.push(frequency);
            total_amplitude += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }
        Ok(Self {
            base,
            params,
            amplitudes,
            frequencies,
            total_amplitude,
        })
    }

    pub fn base(&self) -> &S {
        &self.base
    }

    pub fn params(&self) -> &OctaveParams {
        &self.params
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn total_amplitude(&self) -> f64 {
        self.total_amplitude
    }
}

impl<S: Sampler> Sampler for Octaves<S> {
    fn check_rank(&self, rank: usize) -> Result<(), NoiseError> {
        self.base.check_rank(rank)
    }

    fn sample(&self, position: &[f64], scratch: &mut Scratch) -> f64 {
        let mut scaled = scratch.take_position(position);
        let mut total = 0.0;
        for (&amplitude, &frequency) in self.amplitudes.iter().zip(&self.frequencies) {
            for (s, p) in scaled.iter_mut().zip(position) {
                *s = p * frequency;
            }
            total += amplitude * self.base.sample(&scaled, scratch);
        }
        scratch.give_position(scaled);
        total / self.total_amplitude
    }
}

#[cfg(test)]
mod test {
    use crate::error::NoiseError;
    use crate::grid::Grid;
    use crate::interp::Interpolation;
    use crate::octave::{OctaveParams, Octaves};
    use crate::perlin::Perlin;
    use crate::source::{Sampler, Scratch, Source};
    use crate::unit_noise::UnitNoise;

    fn perlin() -> Perlin {
        Perlin::new(42, Grid::uniform(32.0).unwrap(), 256).unwrap()
    }

    #[test]
    fn single_octave_is_the_base() {
        let params = OctaveParams {
            octaves: 1,
            ..OctaveParams::default()
        };
        let octaves = Octaves::new(perlin(), params).unwrap();
        let a = octaves.fill(&[16, 16], &[5.0, -9.0]).unwrap();
        let b = perlin().fill(&[16, 16], &[5.0, -9.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn first_term_recoverable() {
        let p = 0.6;
        let f = 2.5;
        let one = Octaves::new(
            perlin(),
            OctaveParams {
                octaves: 1,
                persistence: p,
                lacunarity: f,
            },
        )
        .unwrap();
        let two = Octaves::new(
            perlin(),
            OctaveParams {
                octaves: 2,
                persistence: p,
                lacunarity: f,
            },
        )
        .unwrap();
        let base = perlin();
        let mut scratch = Scratch::default();
        for i in 0..40 {
            let position = [i as f64 * 3.1, 100.0 - i as f64 * 1.3];
            let scaled = [position[0] * f, position[1] * f];
            let recovered = (1.0 + p) * two.sample(&position, &mut scratch)
                - p * base.sample(&scaled, &mut scratch);
            assert!((recovered - one.sample(&position, &mut scratch)).abs() < 1e-12);
        }
    }

    #[test]
    fn weights() {
        let octaves = Octaves::new(perlin(), OctaveParams::default()).unwrap();
        assert_eq!(octaves.amplitudes(), &[1.0, 0.5, 0.25, 0.125]);
        assert_eq!(octaves.total_amplitude(), 1.875);
    }

    #[test]
    fn stays_in_base_range() {
        let base = UnitNoise::new(3, Grid::uniform(16.0).unwrap(), 256, Interpolation::Cubic)
            .unwrap();
        let octaves = Octaves::new(
            base,
            OctaveParams {
                octaves: 6,
                persistence: 1.0,
                lacunarity: 1.7,
            },
        )
        .unwrap();
        let field = octaves.fill(&[32, 32], &[0.0, 0.0]).unwrap();
        assert!(field.min() >= 0.0 && field.max() <= 1.0);
    }

    #[test]
    fn deep_stacks_stay_in_range() {
        let params = OctaveParams {
            octaves: 70,
            persistence: 0.5,
            lacunarity: 2.0,
        };
        let octaves = Octaves::new(perlin(), params).unwrap();
        let field = octaves.fill(&[4, 4], &[10.0, 10.0]).unwrap();
        assert!(field.data().iter().all(|v| (0.0..=1.0).contains(v)));

        // the top frequency is finite but pushes huge locations past f64
        let params = OctaveParams {
            octaves: 1000,
            persistence: 1.0,
            lacunarity: 2.0,
        };
        let octaves = Octaves::new(perlin(), params).unwrap();
        let mut scratch = Scratch::default();
        for position in [[0.0, 0.0], [1e300, -1e300], [3.5, 7.25]] {
            let v = octaves.sample(&position, &mut scratch);
            assert!((0.0..=1.0).contains(&v), "{:?} gave {}", position, v);
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        let bad = [
            OctaveParams {
                octaves: 0,
                ..OctaveParams::default()
            },
            OctaveParams {
                persistence: 0.0,
                ..OctaveParams::default()
            },
            OctaveParams {
                persistence: 1.5,
                ..OctaveParams::default()
            },
            OctaveParams {
                lacunarity: 0.5,
                ..OctaveParams::default()
            },
            OctaveParams {
                persistence: f64::NAN,
                ..OctaveParams::default()
            },
            OctaveParams {
                octaves: 1100,
                persistence: 1.0,
                lacunarity: 2.0,
            },
        ];
        for params in bad {
            assert!(matches!(
                Octaves::new(perlin(), params),
                Err(NoiseError::InvalidParameter { .. })
            ));
        }
    }
}
