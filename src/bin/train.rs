use clap::Parser;
use csv::ReaderBuilder;
use gini_tree::data::dataset::Dataset;
use gini_tree::metrics::confusion::ClassificationMetrics;
use gini_tree::trees::{DecisionTreeClassifier, SplitSearch};
use nalgebra::{DMatrix, DVector};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Train a binary decision tree on a CSV dataset and report test accuracy.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with one row of features per point.
    features: PathBuf,
    /// Whitespace-separated 0/1 labels, one per CSV row. Without it the last
    /// CSV column holds the label.
    #[clap(long)]
    labels: Option<PathBuf>,
    /// The CSV file has no header row.
    #[clap(long)]
    no_header: bool,
    #[clap(long, default_value_t = 2)]
    max_depth: u16,
    /// Threads used by each split search.
    #[clap(long, default_value_t = 2)]
    workers: usize,
    /// Search splits on the calling thread only.
    #[clap(long)]
    sequential: bool,
    #[clap(long, default_value_t = 0.75)]
    train_size: f64,
    #[clap(long)]
    seed: Option<u64>,
}

fn read_features(path: &Path, header: bool) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    let mut reader = ReaderBuilder::new().has_headers(header).from_path(path)?;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|value| value.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_labels(path: &Path) -> Result<Vec<u8>, Box<dyn Error>> {
    let labels = fs::read_to_string(path)?
        .split_whitespace()
        .map(str::parse::<u8>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(labels)
}

/// Reads a label stored as a CSV number; only exactly 0 or 1 is accepted.
fn parse_label(value: f64) -> Result<u8, String> {
    match value {
        v if v == 0.0 => Ok(0),
        v if v == 1.0 => Ok(1),
        v => Err(format!("Invalid label {}, expected 0 or 1", v)),
    }
}

fn read_dataset(
    features: &Path,
    labels: Option<&Path>,
    header: bool,
) -> Result<Dataset<f64>, Box<dyn Error>> {
    let mut rows = read_features(features, header)?;
    let labels = match labels {
        Some(path) => read_labels(path)?,
        None => rows
            .iter_mut()
            .map(|row| parse_label(row.pop().ok_or("Missing label")?))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let dimension = rows.first().map_or(0, Vec::len);
    if let Some(row) = rows.iter().find(|row| row.len() != dimension) {
        return Err(format!(
            "Expected {} features per row, found a row with {}",
            dimension,
            row.len()
        )
        .into());
    }

    let feature_matrix = DMatrix::from_row_slice(rows.len(), dimension, &rows.concat());
    Ok(Dataset::new(feature_matrix, DVector::from_vec(labels))?)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let dataset = read_dataset(&cli.features, cli.labels.as_deref(), !cli.no_header)?;
    info!(
        samples = dataset.nrows(),
        features = dataset.dimension(),
        "Loaded dataset"
    );

    let (train_dataset, test_dataset) = dataset.train_test_split(cli.train_size, cli.seed)?;

    let split_search = if cli.sequential {
        SplitSearch::Sequential
    } else {
        SplitSearch::Parallel {
            workers: cli.workers,
        }
    };
    let mut classifier = DecisionTreeClassifier::with_params(Some(cli.max_depth), Some(split_search))?;
    println!("{}", classifier.fit(&train_dataset)?);

    if let Some(root) = classifier.root() {
        println!("Depth: {}, leaves: {}", root.depth(), root.num_leaves());
    }

    if test_dataset.is_empty() {
        println!("No test points left after the split.");
        return Ok(());
    }
    let predictions = classifier.predict(test_dataset.x())?;
    let accuracy = classifier.accuracy(test_dataset.y(), &predictions)?;
    println!("Accuracy: {}%", accuracy * 100.0);
    Ok(())
}
