use indexmap::IndexSet;
use std::hash::Hash;
use crate::error::{DegenerateKind, PermanovaError, Result};

/// A validated assignment of one categorical label per sample.
///
/// Labels are only compared for equality. Each distinct label gets a code equal
/// to its position of first appearance, and samples are stored as codes so the
/// statistic never touches the labels themselves.
#[derive(Debug, Clone)]
pub struct Grouping<L> {
    labels: Vec<L>,
    groups: IndexSet<L>,
    codes: Vec<usize>,
    group_sizes: Vec<usize>,
}

impl<L: Eq + Hash + Clone> Grouping<L> {
    /// Validate `labels` against a distance matrix with `num_samples` samples.
    pub fn new(labels: Vec<L>, num_samples: usize) -> Result<Self> {
        if labels.len() != num_samples {
            return Err(PermanovaError::GroupingSizeMismatch {
                grouping_len: labels.len(),
                num_samples,
            });
        }

        let (groups, codes) = encode(&labels);

        if groups.len() == labels.len() {
            return Err(PermanovaError::DegenerateGrouping(DegenerateKind::AllUnique));
        }
        if groups.len() == 1 {
            return Err(PermanovaError::DegenerateGrouping(DegenerateKind::SingleGroup));
        }

        let mut group_sizes = vec![0; groups.len()];
        for &code in &codes {
            group_sizes[code] += 1;
        }

        Ok(Self {
            labels,
            groups,
            codes,
            group_sizes,
        })
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Distinct labels in order of first appearance.
    pub fn groups(&self) -> &IndexSet<L> {
        &self.groups
    }

    /// Per-sample group index into [`groups`](Self::groups).
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    /// Number of samples carrying each group's label.
    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }

    pub fn num_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }
}

/// Map each label to the index of its first appearance.
pub fn encode<L: Eq + Hash + Clone>(labels: &[L]) -> (IndexSet<L>, Vec<usize>) {
    let mut groups = IndexSet::new();
    let codes = labels
        .iter()
        .map(|label| groups.insert_full(label.clone()).0)
        .collect();
    (groups, codes)
}
