//! cfb - CIE cone-fundamental colorimetric functions
//!
//! Computes the CIE TC 1-97 cone-fundamental-based functions for a chosen
//! observer and wavelength grid, and exports them as CSV tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cfb_data::VisualData;
use cfb_engine::{Engine, Results};
use cfb_math::Mat3;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod export;

use export::TableKind;

#[derive(Parser)]
#[command(name = "cfb")]
#[command(author, version, about = "CIE cone-fundamental colorimetric functions")]
#[command(long_about = "
Computes the CIE TC 1-97 cone-fundamental-based colorimetric functions
for a user-chosen observer field size, age, and wavelength grid.

Examples:
  cfb table xyz                              # 2 deg, age 32, 390-830 nm at 1 nm
  cfb table lms --field-size 10 --age 20
  cfb table xy --lambda-step 5 -o xy.csv
  cfb info --field-size 2 --age 32           # matrices and white points
  cfb info --json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory (default: $CFB_DATA, then ./data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one coordinate table as CSV
    #[command(visible_alias = "t")]
    Table(TableArgs),

    /// Show observer metadata, transformation matrices and white points
    #[command(visible_alias = "i")]
    Info(InfoArgs),
}

#[derive(Args)]
struct ObserverArgs {
    /// Field size in degrees (1 to 10)
    #[arg(short = 'f', long, default_value = "2.0")]
    field_size: f64,

    /// Observer age in years (20 to 70)
    #[arg(short, long, default_value = "32")]
    age: u32,

    /// Lower wavelength bound, nm
    #[arg(long, default_value = "390")]
    lambda_min: f64,

    /// Upper wavelength bound, nm (clamped into [700, 830])
    #[arg(long, default_value = "830")]
    lambda_max: f64,

    /// Wavelength step, nm
    #[arg(long, default_value = "1")]
    lambda_step: f64,
}

#[derive(Args)]
struct TableArgs {
    /// Table name: lms, lms-base, xyz, xyz-n, xy, xy-n, mb, lm,
    /// purple-xyz, purple-xyz-n, purple-xy, purple-xy-n
    name: String,

    #[command(flatten)]
    observer: ObserverArgs,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    observer: ObserverArgs,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let data = match &cli.data_dir {
        Some(dir) => VisualData::from_dir(dir),
        None => VisualData::load(),
    }
    .context("loading visual data (set --data-dir or $CFB_DATA)")?;
    let engine = Engine::new(data);

    match cli.command {
        Commands::Table(args) => run_table(&engine, args),
        Commands::Info(args) => run_info(&engine, args),
    }
}

fn compute(engine: &Engine, obs: &ObserverArgs) -> Result<Results> {
    debug!(
        field_size = obs.field_size,
        age = obs.age,
        lambda_min = obs.lambda_min,
        lambda_max = obs.lambda_max,
        lambda_step = obs.lambda_step,
        "computing"
    );
    let results = engine.compute(
        obs.field_size,
        obs.age,
        obs.lambda_min,
        obs.lambda_max,
        obs.lambda_step,
    )?;
    if results.lambda_max_clamped {
        eprintln!(
            "note: upper wavelength bound adjusted to {} nm",
            results.lambda_max
        );
    }
    Ok(results)
}

fn run_table(engine: &Engine, args: TableArgs) -> Result<()> {
    let kind = TableKind::parse(&args.name)?;
    let results = compute(engine, &args.observer)?;
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            export::write_table(&mut out, &results, kind)?;
            out.flush()?;
            debug!(path = %path.display(), "table written");
        }
        None => {
            let stdout = std::io::stdout();
            export::write_table(&mut stdout.lock(), &results, kind)?;
        }
    }
    Ok(())
}

fn run_info(engine: &Engine, args: InfoArgs) -> Result<()> {
    let results = compute(engine, &args.observer)?;
    if args.json {
        print_info_json(&results);
    } else {
        print_info(&results);
    }
    Ok(())
}

fn print_info(r: &Results) {
    println!("Observer:       {} deg, age {}", r.field_size, r.age);
    println!(
        "Domain:         {} to {} nm, step {} nm{}",
        r.lambda_min,
        r.lambda_max,
        r.lambda_step,
        if r.lambda_max_clamped { " (upper bound adjusted)" } else { "" }
    );
    println!();
    println!("LMS -> XYZ:");
    print_matrix(&r.trans_mat);
    println!("LMS -> XYZ (renormalized):");
    print_matrix(&r.trans_mat_n);
    println!("Illuminant E:");
    println!("  xy:           {:.5}, {:.5}", r.xy_white[0], r.xy_white[1]);
    println!("  xy (renorm):  {:.5}, {:.5}", r.xy_white_n[0], r.xy_white_n[1]);
    println!("  MacLeod-Boynton: {:.6}, {:.6}", r.mb_white[0], r.mb_white[2]);
    println!("  Maxwellian lm:   {:.6}, {:.6}", r.lm_white[0], r.lm_white[1]);
    println!();
    println!("Purple-line termini (xy):");
    for row in &r.purple_line_cc {
        println!("  {:.1} nm: {:.5}, {:.5}", row[0], row[1], row[2]);
    }
    if let Some((lo, hi)) = r.lambda_purple {
        println!("Complementary wavelengths: {lo:.1} to {hi:.1} nm");
    }
}

fn print_matrix(m: &Mat3) {
    for row in 0..3 {
        println!(
            "  {:>12.8}  {:>12.8}  {:>12.8}",
            m[row][0], m[row][1], m[row][2]
        );
    }
}

fn print_info_json(r: &Results) {
    println!("{{");
    println!("  \"field_size\": {},", r.field_size);
    println!("  \"age\": {},", r.age);
    println!("  \"lambda_min\": {},", r.lambda_min);
    println!("  \"lambda_max\": {},", r.lambda_max);
    println!("  \"lambda_step\": {},", r.lambda_step);
    println!("  \"lambda_max_clamped\": {},", r.lambda_max_clamped);
    println!("  \"trans_mat\": {},", json_matrix(&r.trans_mat));
    println!("  \"trans_mat_n\": {},", json_matrix(&r.trans_mat_n));
    println!("  \"xy_white\": {},", json_triplet(&r.xy_white));
    println!("  \"xy_white_n\": {},", json_triplet(&r.xy_white_n));
    println!("  \"mb_white\": {},", json_triplet(&r.mb_white));
    println!("  \"lm_white\": {},", json_triplet(&r.lm_white));
    println!(
        "  \"purple_line_cc\": [{}, {}]",
        json_triplet(&r.purple_line_cc[0]),
        json_triplet(&r.purple_line_cc[1])
    );
    println!("}}");
}

fn json_matrix(m: &Mat3) -> String {
    format!(
        "[[{}, {}, {}], [{}, {}, {}], [{}, {}, {}]]",
        m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2]
    )
}

fn json_triplet(t: &[f64; 3]) -> String {
    format!("[{}, {}, {}]", t[0], t[1], t[2])
}
