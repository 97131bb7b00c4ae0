//! Distance-based categorical statistics.
//!
//! PERMANOVA tests whether samples in different groups are more dissimilar
//! than samples within the same group, given only their pairwise distances.
//! The statistic is a pure function of the squared condensed distances and a
//! per-sample group code; the permutation engine reuses it for every shuffled
//! labeling.

pub mod grouping;
pub mod permanova;
pub mod permutation;
pub mod results;
pub mod tests;

pub use grouping::Grouping;
pub use permanova::{
    partition_sum_of_squares, permanova, pseudo_f_statistic, Permanova, SumOfSquares,
};
pub use permutation::{PermutationConfig, PermutationTest, DEFAULT_PERMUTATIONS};
pub use results::CategoricalStatsResults;
