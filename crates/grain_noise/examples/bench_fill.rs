//! Benchmark for filling tiles of noise.
//!
//! Fills a square of (2*R+1)^2 tiles centered on the given tile, one `fill`
//! call per tile, the way an image or terrain pipeline requests neighbouring
//! blocks.
//!
//! Usage:
//!   cargo run --example bench_fill -p grain_noise -- [OPTIONS]
//!   cargo run --release --example bench_fill -p grain_noise -- [OPTIONS]
//!
//! Options:
//!   --source JSON        Source description (default: octave perlin, seed 0)
//!   --tile WxH           Tile size in samples (default: 256x256)
//!   --center X:Y         Center tile coordinates (default: 0:0)
//!   --radius N           Tiles around the center (default: 2)

use grain_noise::{Field, Source, SourceRegistry};
use std::time::{Duration, Instant};

const DEFAULT_SOURCE: &str = r#"{ "type": "octave_perlin", "seed": 0, "wavelength": 64.0,
    "octaves": 4, "persistence": 0.5, "lacunarity": 2.0 }"#;

fn fmt_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.3}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.3}ms", d.as_secs_f64() * 1e3)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1e6)
    }
}

fn parse_pair<T: std::str::FromStr>(value: &str, separator: char, what: &str) -> (T, T) {
    let parts: Vec<&str> = value.split(separator).collect();
    if parts.len() != 2 {
        panic!("{} must be A{}B", what, separator);
    }
    let a = parts[0].parse().unwrap_or_else(|_| panic!("Invalid {}", what));
    let b = parts[1].parse().unwrap_or_else(|_| panic!("Invalid {}", what));
    (a, b)
}

fn main() {
    let mut source = DEFAULT_SOURCE.to_string();
    let mut tile: (usize, usize) = (256, 256);
    let mut center: (i64, i64) = (0, 0);
    let mut radius: i64 = 2;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--source" => {
                i += 1;
                source = args[i].clone();
            }
            "--tile" => {
                i += 1;
                tile = parse_pair(&args[i], 'x', "tile");
                if tile.0 == 0 || tile.1 == 0 {
                    panic!("Tile must not be empty");
                }
            }
            "--center" => {
                i += 1;
                center = parse_pair(&args[i], ':', "center");
            }
            "--radius" => {
                i += 1;
                radius = args[i].parse().expect("Invalid radius");
                if radius < 0 {
                    panic!("Radius must be >= 0");
                }
            }
            "--help" | "-h" => {
                eprintln!("Usage: bench_fill [--source JSON] [--tile WxH] [--center X:Y] [--radius N]");
                eprintln!();
                eprintln!("Defaults: source=octave_perlin, tile=256x256, center=0:0, radius=2");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let registry = SourceRegistry::with_defaults();
    let t_build = Instant::now();
    let generator = registry
        .build_str(&source)
        .unwrap_or_else(|e| panic!("Failed to build source: {}", e));
    eprintln!("Built {:?} in {}", generator, fmt_duration(t_build.elapsed()));

    let side = 2 * radius + 1;
    let total_tiles = (side * side) as usize;
    let mut tiles: Vec<(i64, i64)> = Vec::with_capacity(total_tiles);
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            tiles.push((center.0 + dx, center.1 + dy));
        }
    }

    eprintln!(
        "\nFilling {}x{} = {} tiles of {}x{} samples, center ({}, {}) ...",
        side, side, total_tiles, tile.0, tile.1, center.0, center.1,
    );

    let mut times = Vec::with_capacity(total_tiles);
    let mut sum_values = 0.0;
    let t_total = Instant::now();
    for &(tx, ty) in &tiles {
        let location = [(ty * tile.1 as i64) as f64, (tx * tile.0 as i64) as f64];
        let t = Instant::now();
        let field: Field = generator
            .fill(&[tile.1, tile.0], &location)
            .unwrap_or_else(|e| panic!("Fill failed: {}", e));
        times.push(t.elapsed());
        sum_values += field.mean();
    }
    let wall_time = t_total.elapsed();

    times.sort();
    let sum: Duration = times.iter().sum();
    let mean = sum / total_tiles as u32;
    let median = times[total_tiles / 2];
    let min = times[0];
    let max = times[total_tiles - 1];
    let p95 = times[((total_tiles as f64 * 0.95) as usize).min(total_tiles - 1)];
    let samples = (tile.0 * tile.1 * total_tiles) as f64;

    eprintln!();
    eprintln!("=== Results ({} tiles) ===", total_tiles);
    eprintln!("  Wall time:     {}", fmt_duration(wall_time));
    eprintln!("  Mean value:    {:.4}", sum_values / total_tiles as f64);
    eprintln!();
    eprintln!("  Per tile:");
    eprintln!("    Mean:   {}", fmt_duration(mean));
    eprintln!("    Median: {}", fmt_duration(median));
    eprintln!("    Min:    {}", fmt_duration(min));
    eprintln!("    Max:    {}", fmt_duration(max));
    eprintln!("    P95:    {}", fmt_duration(p95));
    eprintln!();
    eprintln!(
        "  Throughput: {:.2} Msamples/sec",
        samples / wall_time.as_secs_f64() / 1e6,
    );
}
