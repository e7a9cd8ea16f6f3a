use thiserror::Error;

/// Contract violations raised while building or querying a tree.
///
/// Degenerate inputs (an empty subset reaching the split search, or no
/// improving split) are not errors; they resolve to leaves.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A feature vector does not have the dimensionality the dataset or tree expects.
    #[error("Expected a feature vector of length {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// Feature matrix rows and label vector disagree in length.
    #[error("Feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },
    /// A label other than 0 or 1.
    #[error("Label {label} at row {index} is not a binary label (0 or 1)")]
    InvalidLabel { index: usize, label: u8 },
    #[error("Feature index {index} is out of range for dimension {dimension}")]
    FeatureIndexOutOfRange { index: usize, dimension: usize },
    #[error("Cannot build a tree from an empty dataset")]
    EmptyDataset,
    /// A split produced a child with no points to build from.
    #[error("Split produced an empty partition")]
    EmptyPartition,
    #[error("Tree wasn't built yet")]
    NotFitted,
    #[error("The number of split workers must be greater than 0, got {0}")]
    InvalidWorkerCount(usize),
    #[error("Train size should be between 0.0 and 1.0, got {0}")]
    InvalidTrainSize(f64),
    #[error("Predictions and labels are of different sizes ({predictions} vs {labels})")]
    PredictionLengthMismatch { predictions: usize, labels: usize },
    #[error("Failed to build split worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
