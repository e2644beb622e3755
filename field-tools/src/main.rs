use clap::{Args, Parser, Subcommand};
use field_data_core::{
    codec, load_field_set, merge_z, quad_average, smooth, FieldRecord, GeometryList,
    GridDescription, HierarchyConfig, Result, SmoothConfig, Vec3,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

/// Convert, smooth, merge and sample gridded field data
#[derive(Parser, Debug)]
#[command(name = "field-tools")]
#[command(about = "Gridded electric field data tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest solver text exports and write binary fields
    Convert {
        /// Inputs are four-column `r z Er Ez` exports
        #[arg(long)]
        four_column: bool,

        /// Apply four-fold mirror averaging before writing
        #[arg(short, long)]
        average: bool,

        #[command(flatten)]
        smoothing: SmoothArgs,

        /// Text exports to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Relax binary fields towards the Laplace solution
    Smooth {
        #[command(flatten)]
        smoothing: SmoothArgs,

        /// Binary fields to smooth
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Stack two binary volumes along z
    Merge { first: PathBuf, second: PathBuf },

    /// Sample a field at one point
    Sample {
        /// Binary field, or a nested field description with --set
        file: PathBuf,

        #[arg(allow_negative_numbers = true)]
        x: f64,

        #[arg(allow_negative_numbers = true)]
        y: f64,

        #[arg(allow_negative_numbers = true)]
        z: f64,

        /// Treat FILE as a nested field description
        #[arg(short, long)]
        set: bool,
    },
}

#[derive(Args, Debug)]
struct SmoothArgs {
    /// Geometry whose interior stays fixed while smoothing
    #[arg(short, long)]
    geometry: Option<PathBuf>,

    /// Number of red/black relaxation passes
    #[arg(short, long)]
    passes: Option<usize>,
}

impl SmoothArgs {
    fn config(&self, default_passes: usize) -> SmoothConfig {
        SmoothConfig {
            passes: self.passes.unwrap_or(default_passes),
            ..SmoothConfig::default()
        }
    }

    fn geometry(&self) -> Result<Option<GeometryList>> {
        self.geometry.as_ref().map(GeometryList::load).transpose()
    }
}

/// `dir/name.txt` with `suffix` gives `dir/name<suffix>.bin`
fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "field".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}{suffix}.bin"))
}

fn convert_one(
    path: &Path,
    four_column: bool,
    average: bool,
    geometry: Option<&GeometryList>,
    config: &SmoothConfig,
) -> Result<PathBuf> {
    let (mut record, model) = if four_column {
        (FieldRecord::load_four_column(path)?, String::new())
    } else {
        let grid = GridDescription::load(path)?;
        let record = FieldRecord::from_grid(&grid)?;
        (record, grid.model_name.unwrap_or_default())
    };
    if average {
        quad_average(&mut record)?;
    }
    if config.passes > 0 {
        let report = smooth(&mut record, geometry, config)?;
        info!(
            free_points = report.free_points,
            residual = report.final_residual().unwrap_or_default(),
            "Smoothing finished"
        );
    }
    let out = output_path(path, if average { "_av" } else { "" });
    codec::save(&out, &record, &model)?;
    Ok(out)
}

fn smooth_one(path: &Path, geometry: Option<&GeometryList>, config: &SmoothConfig) -> Result<PathBuf> {
    let stored = codec::load(path)?;
    let mut record = stored.record;
    let report = smooth(&mut record, geometry, config)?;
    info!(
        free_points = report.free_points,
        residual = report.final_residual().unwrap_or_default(),
        "Smoothing finished"
    );
    let out = output_path(path, "_sm");
    codec::save(&out, &record, &stored.model_name)?;
    Ok(out)
}

fn merge(first: &Path, second: &Path) -> Result<PathBuf> {
    let a = codec::load(first)?;
    let b = codec::load(second)?;
    let merged = merge_z(&a.record, &b.record)?;
    // The merged name comes from the lower volume's source name; the file
    // goes next to the lower input.
    let lower = if b.record.axis(2).min <= a.record.axis(2).min {
        second
    } else {
        first
    };
    let out = lower.with_file_name(
        Path::new(merged.source_name())
            .file_name()
            .unwrap_or_default(),
    );
    codec::save(&out, &merged, &a.model_name)?;
    Ok(out)
}

fn sample_point(file: &Path, point: &Vec3, set: bool) -> Result<()> {
    let record = if set {
        load_field_set(file, &HierarchyConfig::default())?
    } else {
        codec::load_record(file)?
    };
    let value = record.sample(point)?;
    let source = record.source_name_at(point).unwrap_or("?");
    println!(
        "({}, {}, {}) -> ({:.6e}, {:.6e}, {:.6e}) from {}",
        point.x, point.y, point.z, value.x, value.y, value.z, source
    );
    Ok(())
}

/// Run `job` on every file, reporting failures and carrying on.
fn for_each_file(files: &[PathBuf], mut job: impl FnMut(&Path) -> Result<PathBuf>) -> usize {
    let mut failures = 0;
    for file in files {
        match job(file) {
            Ok(out) => println!("{} -> {}", file.display(), out.display()),
            Err(e) => {
                error!(file = %file.display(), "{e}");
                failures += 1;
            }
        }
    }
    failures
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let failures = match cli.command {
        Command::Convert {
            four_column,
            average,
            smoothing,
            files,
        } => match smoothing.geometry() {
            Ok(geometry) => {
                // Smoothing on convert only runs when asked for
                let default_passes = if geometry.is_some() {
                    SmoothConfig::default().passes
                } else {
                    0
                };
                let config = smoothing.config(default_passes);
                for_each_file(&files, |path| {
                    convert_one(path, four_column, average, geometry.as_ref(), &config)
                })
            }
            Err(e) => {
                error!("{e}");
                1
            }
        },
        Command::Smooth { smoothing, files } => match smoothing.geometry() {
            Ok(geometry) => {
                let config = smoothing.config(SmoothConfig::default().passes);
                for_each_file(&files, |path| smooth_one(path, geometry.as_ref(), &config))
            }
            Err(e) => {
                error!("{e}");
                1
            }
        },
        Command::Merge { first, second } => match merge(&first, &second) {
            Ok(out) => {
                println!("{} + {} -> {}", first.display(), second.display(), out.display());
                0
            }
            Err(e) => {
                error!("{e}");
                1
            }
        },
        Command::Sample { file, x, y, z, set } => match sample_point(&file, &Vec3::new(x, y, z), set) {
            Ok(()) => 0,
            Err(e) => {
                error!(file = %file.display(), "{e}");
                1
            }
        },
    };

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
