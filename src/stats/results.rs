use indexmap::IndexSet;
use serde::Serialize;
use std::hash::Hash;

/// Outcome of a categorical distance-based test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalStatsResults<L: Eq + Hash> {
    pub short_method_name: &'static str,
    pub long_method_name: &'static str,
    pub sample_size: usize,
    pub groups: IndexSet<L>,
    pub test_statistic_name: &'static str,
    pub statistic: f64,
    /// `None` when the test ran without permutations.
    pub p_value: Option<f64>,
    pub permutations: usize,
}

impl<L: Eq + Hash> CategoricalStatsResults<L> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        short_method_name: &'static str,
        long_method_name: &'static str,
        sample_size: usize,
        groups: IndexSet<L>,
        test_statistic_name: &'static str,
        statistic: f64,
        p_value: Option<f64>,
        permutations: usize,
    ) -> Self {
        Self {
            short_method_name,
            long_method_name,
            sample_size,
            groups,
            test_statistic_name,
            statistic,
            p_value,
            permutations,
        }
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }
}
