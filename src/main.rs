use grain_noise::{Field, Interpolation, Source, SourceRegistry, resize};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_SOURCE: &str = r#"{ "type": "octave", "octaves": 4, "persistence": 0.5, "lacunarity": 2.0,
    "base": { "type": "perlin", "seed": 42, "wavelength": 32.0 } }"#;

const SHADES: &[u8] = b" .:-=+*#%@";

fn parse_size(value: &str) -> Option<Vec<usize>> {
    value
        .split('x')
        .map(|part| part.parse().ok())
        .collect::<Option<Vec<usize>>>()
}

/// Prints the first 2-D slice of `field` as text, squeezed to `columns` wide.
fn preview(field: &Field, columns: usize) -> Result<(), grain_noise::NoiseError> {
    let shape = field.shape();
    let (rows, cols) = match shape {
        [cols] => (1, *cols),
        [rows, cols, ..] => (*rows, *cols),
        [] => return Ok(()),
    };
    let plane = Field::from_fn(&[rows, cols], |index| {
        let mut full = vec![0; shape.len()];
        if shape.len() == 1 {
            full[0] = index[1];
        } else {
            full[..2].copy_from_slice(index);
        }
        field.get(&full).unwrap_or(0.0)
    })?;
    let width = columns.min(cols).max(1);
    let height = (rows * width / cols / 2).max(1);
    let small = resize(&plane, &[height, width], Interpolation::Linear)?;
    for row in small.data().chunks(width) {
        let line: String = row
            .iter()
            .map(|v| {
                let shade = (v.clamp(0.0, 1.0) * (SHADES.len() - 1) as f64).round() as usize;
                SHADES[shade] as char
            })
            .collect();
        println!("{}", line);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: grain [SOURCE_JSON] [SIZE, e.g. 128x128]");
        eprintln!();
        eprintln!("Defaults: four octaves of perlin noise, size 128x128");
        return;
    }
    let source = args.get(1).map(String::as_str).unwrap_or(DEFAULT_SOURCE);
    let size = match args.get(2).map(|s| parse_size(s)) {
        None => vec![128, 128],
        Some(Some(size)) => size,
        Some(None) => {
            error!(size = %args[2], "Size must look like 128x128");
            std::process::exit(1);
        }
    };

    let registry = SourceRegistry::with_defaults();
    let generator = match registry.build_str(source) {
        Ok(generator) => generator,
        Err(e) => {
            error!(error = %e, "Failed to build source");
            std::process::exit(1);
        }
    };

    let location = vec![0.0; size.len()];
    let start = Instant::now();
    let field = match generator.fill(&size, &location) {
        Ok(field) => field,
        Err(e) => {
            error!(error = %e, "Fill failed");
            std::process::exit(1);
        }
    };
    info!(
        size = ?field.shape(),
        min = field.min(),
        max = field.max(),
        mean = field.mean(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
        "Filled"
    );

    if let Err(e) = preview(&field, 72) {
        error!(error = %e, "Preview failed");
    }
}
