use grain_noise::{
    Curtains, Grid, Interpolation, OctaveParams, Octaves, Perlin, Sampler, Source, UnitNoise,
    Worley, WorleyOutput, WorleyParams,
};

fn generators() -> Vec<Box<dyn Sampler>> {
    vec![
        Box::new(Perlin::new(42, Grid::uniform(16.0).unwrap(), 256).unwrap()),
        Box::new(
            UnitNoise::new(5, Grid::tiled(8.0, 4).unwrap(), 64, Interpolation::Cubic).unwrap(),
        ),
        Box::new(Curtains::new(
            UnitNoise::cosine(6, Grid::uniform(8.0).unwrap(), 256, Interpolation::Linear)
                .unwrap(),
        )),
        Box::new(
            Worley::new(
                7,
                Grid::uniform(8.0).unwrap(),
                256,
                WorleyParams {
                    output: WorleyOutput::Difference,
                    max_points: 3,
                    ..WorleyParams::default()
                },
            )
            .unwrap(),
        ),
        Box::new(
            Octaves::new(
                Perlin::new(9, Grid::uniform(32.0).unwrap(), 256).unwrap(),
                OctaveParams::default(),
            )
            .unwrap(),
        ),
    ]
}

#[test]
fn repeated_fills_agree() {
    let generators = generators();
    for generator in &generators {
        let first = generator.fill(&[12, 20], &[-7.0, 3.5]).unwrap();
        for other in &generators {
            other.fill(&[5, 5, 5], &[1.0, 2.0, 3.0]).unwrap();
        }
        let second = generator.fill(&[12, 20], &[-7.0, 3.5]).unwrap();
        assert_eq!(first, second, "{:?}", generator);
    }
}

#[test]
fn sub_block_matches_whole() {
    for generator in generators() {
        let whole = generator.fill(&[16, 16], &[0.0, 0.0]).unwrap();
        let part = generator.fill(&[4, 6], &[5.0, 9.0]).unwrap();
        for i in 0..4 {
            for j in 0..6 {
                assert_eq!(part.get(&[i, j]), whole.get(&[i + 5, j + 9]), "{:?}", generator);
            }
        }
    }
}

#[test]
fn concurrent_fills_agree() {
    let generators = generators();
    let expected: Vec<_> = generators
        .iter()
        .map(|g| g.fill(&[24, 24], &[100.0, -50.0]).unwrap())
        .collect();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    generators
                        .iter()
                        .map(|g| g.fill(&[24, 24], &[100.0, -50.0]).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
