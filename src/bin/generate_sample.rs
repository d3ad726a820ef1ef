//! Write synthetic solution sets for the three default datasets.
//!
//! Each set is a cloud of `(E, n)` points scattered log-normally around a
//! centre inside the plotting range. About a third of the rows get a residual
//! above the acceptance threshold so the filter has something to discard.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Parquet,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Parquet => "parquet",
        }
    }
}

#[derive(Parser)]
#[command(name = "generate-sample", about = "Write synthetic solution-set files", version)]
struct Args {
    /// Directory receiving the files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// File format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,

    /// Rows per solution set
    #[arg(short, long, default_value_t = 2000)]
    rows: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

/// Cloud centre and log10 spread of one synthetic set.
struct Cloud {
    stem: &'static str,
    energy: f64,
    density: f64,
    spread_e: f64,
    spread_n: f64,
}

const CLOUDS: [Cloud; 3] = [
    Cloud {
        stem: "solution_set_k9+",
        energy: 120.0,
        density: 6.0e11,
        spread_e: 0.25,
        spread_n: 0.12,
    },
    Cloud {
        stem: "solution_set_k10+",
        energy: 300.0,
        density: 8.0e11,
        spread_e: 0.3,
        spread_n: 0.1,
    },
    Cloud {
        stem: "solution_set_na7+",
        energy: 180.0,
        density: 1.1e12,
        spread_e: 0.2,
        spread_n: 0.08,
    },
];

struct Rows {
    energy: Vec<f64>,
    density: Vec<f64>,
    residual: Vec<f64>,
}

/// Standard normal deviate (Box-Muller).
fn normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn sample_cloud(cloud: &Cloud, rows: usize, rng: &mut StdRng) -> Rows {
    let mut out = Rows {
        energy: Vec::with_capacity(rows),
        density: Vec::with_capacity(rows),
        residual: Vec::with_capacity(rows),
    };
    for _ in 0..rows {
        let e = cloud.energy * 10f64.powf(cloud.spread_e * normal(rng));
        let n = cloud.density * 10f64.powf(cloud.spread_n * normal(rng));
        let f = if rng.gen_bool(0.35) {
            10f64.powf(rng.gen_range(-6.0..0.0))
        } else {
            10f64.powf(rng.gen_range(-12.0..-6.5))
        };
        out.energy.push(e);
        out.density.push(n);
        out.residual.push(f);
    }
    out
}

fn write_csv(path: &Path, rows: &Rows) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["E", "n", "F"])?;
    for i in 0..rows.energy.len() {
        writer.write_record([
            rows.energy[i].to_string(),
            rows.density[i].to_string(),
            rows.residual[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &Rows) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("E", DataType::Float64, false),
        Field::new("n", DataType::Float64, false),
        Field::new("F", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(rows.energy.clone())),
            Arc::new(Float64Array::from(rows.density.clone())),
            Arc::new(Float64Array::from(rows.residual.clone())),
        ],
    )?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    for cloud in &CLOUDS {
        let rows = sample_cloud(cloud, args.rows, &mut rng);
        let path = args
            .output_dir
            .join(format!("{}.{}", cloud.stem, args.format.extension()));
        match args.format {
            Format::Csv => write_csv(&path, &rows),
            Format::Parquet => write_parquet(&path, &rows),
        }
        .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {} rows to {}", rows.energy.len(), path.display());
    }
    Ok(())
}
