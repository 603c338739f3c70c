use grain_noise::{Grid, Perlin, Source};
use serde_json::Value;

const GOLDEN: &str = include_str!("../test_assets/perlin_seed42_64x64.json");

fn numbers(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect()
}

#[test]
fn perlin_matches_golden_field() {
    let golden: Value = serde_json::from_str(GOLDEN).unwrap();
    let seed = golden["seed"].as_u64().unwrap();
    let wavelength = golden["wavelength"].as_f64().unwrap();
    let size: Vec<usize> = numbers(&golden["size"]).iter().map(|v| *v as usize).collect();
    let location = numbers(&golden["location"]);

    let perlin = Perlin::new(seed, Grid::uniform(wavelength).unwrap(), 256).unwrap();
    let field = perlin.fill(&size, &location).unwrap();

    let rows = golden["values"].as_array().unwrap();
    assert_eq!(rows.len(), size[0]);
    for (i, row) in rows.iter().enumerate() {
        let row = numbers(row);
        assert_eq!(row.len(), size[1]);
        for (j, expected) in row.iter().enumerate() {
            let actual = field.get(&[i, j]).unwrap();
            assert!(
                (actual - expected).abs() < 1e-9,
                "[{}, {}]: {} != {}",
                i,
                j,
                actual,
                expected
            );
        }
    }
}

#[test]
fn golden_field_statistics() {
    let perlin = Perlin::new(42, Grid::uniform(32.0).unwrap(), 256).unwrap();
    let field = perlin.fill(&[64, 64], &[0.0, 0.0]).unwrap();
    assert_eq!(format!("{:.4}", field.min()), "0.0943");
    assert_eq!(format!("{:.4}", field.max()), "0.7944");
    assert_eq!(format!("{:.4}", field.mean()), "0.4816");
}
