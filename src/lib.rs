pub mod distance;
pub mod error;
pub mod stats;

pub use distance::SymmetricDistanceMatrix;
pub use error::{DegenerateKind, PermanovaError, Result};
pub use stats::{
    permanova, CategoricalStatsResults, Grouping, Permanova, PermutationConfig, SumOfSquares,
    DEFAULT_PERMUTATIONS,
};

pub mod prelude {
    pub use crate::distance::{grouping_for, read_distance_matrix, read_grouping, SymmetricDistanceMatrix};
    pub use crate::error::{DegenerateKind, PermanovaError, Result};
    pub use crate::stats::{
        partition_sum_of_squares, permanova, pseudo_f_statistic, CategoricalStatsResults,
        Grouping, Permanova, PermutationConfig, PermutationTest, SumOfSquares,
        DEFAULT_PERMUTATIONS,
    };
}
