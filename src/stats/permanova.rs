//! PERMANOVA: permutational multivariate analysis of variance.
//!
//! Partitions the squared pairwise distances into within- and between-group
//! sums of squares and compares them through a pseudo-F ratio. Significance is
//! estimated by shuffling group labels across samples.

use serde::Serialize;
use std::hash::Hash;
use crate::distance::SymmetricDistanceMatrix;
use crate::error::Result;
use crate::stats::grouping::Grouping;
use crate::stats::permutation::{
    validate_permutations, PermutationConfig, PermutationTest, DEFAULT_PERMUTATIONS,
};
use crate::stats::results::CategoricalStatsResults;

pub const SHORT_METHOD_NAME: &str = "PERMANOVA";
pub const LONG_METHOD_NAME: &str = "Permutational Multivariate Analysis of Variance";
pub const TEST_STATISTIC_NAME: &str = "pseudo-F";

/// Sum-of-squares decomposition for one grouping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SumOfSquares {
    pub total: f64,
    pub within: f64,
    pub between: f64,
}

/// Partition squared distances into total, within-group and between-group
/// sums of squares.
///
/// `squared` is the condensed upper triangle of squared distances for
/// `codes.len()` samples. `codes[i]` indexes `group_sizes`; every group size
/// must be nonzero.
pub fn partition_sum_of_squares(
    squared: &[f64],
    codes: &[usize],
    group_sizes: &[usize],
) -> SumOfSquares {
    let n = codes.len();
    debug_assert_eq!(squared.len(), n * n.saturating_sub(1) / 2);

    let mut total = 0.0;
    let mut within_by_group = vec![0.0; group_sizes.len()];
    let mut k = 0;
    for (i, &gi) in codes.iter().enumerate() {
        for &gj in &codes[i + 1..] {
            let d2 = squared[k];
            total += d2;
            if gi == gj {
                within_by_group[gi] += d2;
            }
            k += 1;
        }
    }

    let total = total / n as f64;
    let within: f64 = within_by_group
        .iter()
        .zip(group_sizes)
        .map(|(&ss, &size)| ss / size as f64)
        .sum();

    SumOfSquares {
        total,
        within,
        between: total - within,
    }
}

/// Pseudo-F: `(s_A / (a - 1)) / (s_W / (N - a))`.
///
/// A zero within-group sum of squares yields an infinite or NaN ratio, which
/// is returned as-is.
pub fn pseudo_f_statistic(squared: &[f64], codes: &[usize], group_sizes: &[usize]) -> f64 {
    let ss = partition_sum_of_squares(squared, codes, group_sizes);
    let n = codes.len() as f64;
    let a = group_sizes.len() as f64;
    (ss.between / (a - 1.0)) / (ss.within / (n - a))
}

/// A PERMANOVA test bound to one distance matrix and one grouping.
///
/// The grouping is validated on construction; [`run`](Self::run) can then be
/// called any number of times.
#[derive(Debug, Clone)]
pub struct Permanova<'a, L> {
    dm: &'a SymmetricDistanceMatrix,
    grouping: Grouping<L>,
    squared: Vec<f64>,
    config: PermutationConfig,
}

impl<'a, L: Eq + Hash + Clone> Permanova<'a, L> {
    pub fn new(dm: &'a SymmetricDistanceMatrix, grouping: Vec<L>) -> Result<Self> {
        Self::with_config(dm, grouping, PermutationConfig::default())
    }

    pub fn with_config(
        dm: &'a SymmetricDistanceMatrix,
        grouping: Vec<L>,
        config: PermutationConfig,
    ) -> Result<Self> {
        let grouping = Grouping::new(grouping, dm.num_samples())?;
        let squared = dm.condensed_form().into_iter().map(|d| d * d).collect();

        Ok(Self {
            dm,
            grouping,
            squared,
            config,
        })
    }

    pub fn distance_matrix(&self) -> &SymmetricDistanceMatrix {
        self.dm
    }

    pub fn grouping(&self) -> &Grouping<L> {
        &self.grouping
    }

    pub fn config(&self) -> &PermutationConfig {
        &self.config
    }

    /// Decomposition for the grouping given at construction.
    pub fn sum_of_squares(&self) -> SumOfSquares {
        partition_sum_of_squares(&self.squared, self.grouping.codes(), self.grouping.group_sizes())
    }

    /// Pseudo-F for the grouping given at construction.
    pub fn observed_statistic(&self) -> f64 {
        pseudo_f_statistic(&self.squared, self.grouping.codes(), self.grouping.group_sizes())
    }

    /// Pseudo-F for an arbitrary grouping over the same samples.
    ///
    /// Labels are re-coded by equality, so they need not match the groups
    /// seen at construction.
    pub fn statistic(&self, labels: &[L]) -> Result<f64> {
        let candidate = Grouping::new(labels.to_vec(), self.dm.num_samples())?;
        Ok(pseudo_f_statistic(&self.squared, candidate.codes(), candidate.group_sizes()))
    }

    /// Run the test with `permutations` label shuffles.
    ///
    /// Zero permutations computes the statistic only and leaves the p-value
    /// empty.
    pub fn run(&self, permutations: i64) -> Result<CategoricalStatsResults<L>> {
        let permutations = validate_permutations(permutations)?;

        log::debug!(
            "PERMANOVA on {} samples in {} groups, {} permutations",
            self.grouping.num_samples(),
            self.grouping.num_groups(),
            permutations
        );

        let observed = self.observed_statistic();
        let squared = &self.squared;
        let group_sizes = self.grouping.group_sizes();
        let p_value = PermutationTest::new(&self.config).p_value(
            self.grouping.codes(),
            observed,
            permutations,
            |codes| pseudo_f_statistic(squared, codes, group_sizes),
        )?;

        log::info!(
            "PERMANOVA pseudo-F = {}, p-value = {:?} ({} permutations)",
            observed,
            p_value,
            permutations
        );

        Ok(CategoricalStatsResults::new(
            SHORT_METHOD_NAME,
            LONG_METHOD_NAME,
            self.grouping.num_samples(),
            self.grouping.groups().clone(),
            TEST_STATISTIC_NAME,
            observed,
            p_value,
            permutations,
        ))
    }

    /// [`run`](Self::run) with [`DEFAULT_PERMUTATIONS`].
    pub fn run_default(&self) -> Result<CategoricalStatsResults<L>> {
        self.run(DEFAULT_PERMUTATIONS)
    }
}

/// Validate, compute and test in one call.
pub fn permanova<L: Eq + Hash + Clone>(
    dm: &SymmetricDistanceMatrix,
    grouping: Vec<L>,
    permutations: i64,
    seed: Option<u64>,
) -> Result<CategoricalStatsResults<L>> {
    let config = PermutationConfig {
        seed,
        ..PermutationConfig::default()
    };
    Permanova::with_config(dm, grouping, config)?.run(permutations)
}
