use std::fmt;

pub type Result<T> = std::result::Result<T, PermanovaError>;

/// Why a grouping vector cannot be tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateKind {
    /// Every sample carries its own label, so there are no within-group distances.
    AllUnique,
    /// All samples share one label, so there are no between-group distances.
    SingleGroup,
}

impl fmt::Display for DegenerateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateKind::AllUnique => write!(
                f,
                "all values in the grouping vector are unique; there are no within-group distances"
            ),
            DegenerateKind::SingleGroup => write!(
                f,
                "all values in the grouping vector are the same; there are no between-group distances"
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PermanovaError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Invalid distance matrix: {0}")]
    InvalidDistanceMatrix(String),

    #[error("Grouping vector size ({grouping_len}) must match the number of samples in the distance matrix ({num_samples})")]
    GroupingSizeMismatch { grouping_len: usize, num_samples: usize },

    #[error("Degenerate grouping: {0}")]
    DegenerateGrouping(DegenerateKind),

    #[error("Number of permutations must be greater than or equal to zero, got {0}")]
    InvalidPermutations(i64),

    #[error("Sample not found: {0}")]
    MissingSample(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("File format error: {0}")]
    Format(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PermanovaError {
    pub fn invalid_distance_matrix<S: Into<String>>(msg: S) -> Self {
        PermanovaError::InvalidDistanceMatrix(msg.into())
    }

    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        PermanovaError::InvalidParameter(msg.into())
    }

    pub fn missing_sample<S: Into<String>>(sample_id: S) -> Self {
        PermanovaError::MissingSample(sample_id.into())
    }

    pub fn format<S: Into<String>>(msg: S) -> Self {
        PermanovaError::Format(msg.into())
    }
}
