use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ndarray::{s, Array2};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lloyd_kmeans::dataset::load_joined;
use lloyd_kmeans::synthetic::{generate_blobs, BlobConfig};
use lloyd_kmeans::{KMeansError, KMeansRefiner};

const DEFAULT_MAX_ITER: &str = "300";

/// Lloyd's k-means over CSV inputs or synthetic blobs.
#[derive(Parser, Debug)]
#[command(name = "kmeans")]
#[command(about = "Refine k-means centroids with Lloyd's algorithm")]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster the inner join of two keyed CSV files.
    Fit(FitArgs),
    /// Cluster randomly generated Gaussian blobs.
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct FitArgs {
    /// Number of clusters; must satisfy 1 < K < N.
    #[arg(allow_hyphen_values = true)]
    k: String,
    /// Convergence threshold on per-centroid movement.
    #[arg(allow_hyphen_values = true)]
    epsilon: String,
    /// First CSV file; column 0 is the join key.
    file1: PathBuf,
    /// Second CSV file; column 0 is the join key.
    file2: PathBuf,
    /// Iteration budget; must satisfy 1 < N < 1000.
    #[arg(long, default_value = DEFAULT_MAX_ITER, allow_hyphen_values = true)]
    max_iter: String,
}

/// Numeric `fit` arguments after validation.
#[derive(Debug, PartialEq)]
struct FitParams {
    k: usize,
    max_iter: i64,
    epsilon: f64,
}

#[derive(Args, Debug)]
struct DemoArgs {
    #[arg(long, default_value_t = 100_000)]
    samples: usize,
    #[arg(long, default_value_t = 10)]
    features: usize,
    #[arg(long, default_value_t = 5)]
    clusters: usize,
    #[arg(long, default_value_t = 25)]
    max_iter: i64,
    #[arg(long, default_value_t = 1e-4)]
    epsilon: f64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {e}");
    }

    let outcome = match cli.command {
        Command::Fit(args) => fit(&args),
        Command::Demo(args) => demo(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            match err.downcast_ref::<KMeansError>() {
                Some(KMeansError::InvalidConfig(msg)) => println!("{msg}"),
                _ => println!("An Error Has Occurred"),
            }
            ExitCode::FAILURE
        }
    }
}

fn fit(args: &FitArgs) -> Result<()> {
    let points = load_joined(&args.file1, &args.file2).with_context(|| {
        format!(
            "loading {} and {}",
            args.file1.display(),
            args.file2.display()
        )
    })?;
    let params = validate_fit_args(&args.k, &args.max_iter, &args.epsilon, points.nrows())?;
    tracing::info!(
        rows = points.nrows(),
        dim = points.ncols(),
        k = params.k,
        max_iter = params.max_iter,
        epsilon = params.epsilon,
        "loaded dataset"
    );

    let initial = points.slice(s![..params.k, ..]).to_owned();
    let refiner = KMeansRefiner::new(params.max_iter, params.epsilon)?;
    let out = refiner.fit(&points, &initial)?;
    tracing::info!(
        iterations = out.iterations,
        converged = out.converged,
        "refinement finished"
    );

    print!("{}", format_centroids(&out.centroids));
    Ok(())
}

fn demo(args: &DemoArgs) -> Result<()> {
    let config = BlobConfig {
        n_samples: args.samples,
        n_features: args.features,
        n_clusters: args.clusters,
        seed: args.seed,
        ..BlobConfig::default()
    };
    tracing::info!(
        samples = config.n_samples,
        features = config.n_features,
        clusters = config.n_clusters,
        "generating random dataset"
    );
    let blobs = generate_blobs(&config)?;
    if blobs.points.nrows() < config.n_clusters {
        return Err(KMeansError::InvalidConfig(
            "demo needs at least as many samples as clusters".into(),
        )
        .into());
    }

    let initial = blobs.points.slice(s![..config.n_clusters, ..]).to_owned();
    let refiner = KMeansRefiner::new(args.max_iter, args.epsilon)?;
    tracing::info!("starting k-means refinement");
    let out = refiner.fit(&blobs.points, &initial)?;
    tracing::info!(
        iterations = out.iterations,
        converged = out.converged,
        "clustering completed"
    );

    println!("Final Centroids:");
    print!("{}", format_centroids(&out.centroids));
    println!("Cluster Assignment Counts:");
    for cluster_id in 0..config.n_clusters {
        let count = out.labels.iter().filter(|&&x| x == cluster_id).count();
        println!("Cluster {}: {} points", cluster_id, count);
    }
    Ok(())
}

/// Checks the raw `fit` arguments in the order the messages are reported:
/// cluster count, then iteration budget, then epsilon.
fn validate_fit_args(
    k: &str,
    max_iter: &str,
    epsilon: &str,
    n_rows: usize,
) -> lloyd_kmeans::Result<FitParams> {
    let k = parse_digits(k)
        .filter(|&n| 1 < n && n < n_rows)
        .ok_or_else(|| KMeansError::InvalidConfig("Invalid number of clusters!".into()))?;
    let max_iter = parse_digits(max_iter)
        .filter(|&it| 1 < it && it < 1000)
        .ok_or_else(|| KMeansError::InvalidConfig("Invalid maximum iteration!".into()))?;
    let epsilon: f64 = epsilon.trim().parse()?;
    Ok(FitParams {
        k,
        max_iter: max_iter as i64,
        epsilon,
    })
}

/// Parses a plain run of ASCII digits; signs, decimals and blanks are rejected.
fn parse_digits(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// One centroid per line, coordinates comma-separated with four decimals.
fn format_centroids(centroids: &Array2<f64>) -> String {
    let mut out = String::new();
    for row in centroids.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}
