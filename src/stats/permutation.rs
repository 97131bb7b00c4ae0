use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use crate::error::{PermanovaError, Result};

/// Permutation count used when the caller does not pick one.
pub const DEFAULT_PERMUTATIONS: i64 = 999;

/// Configuration for label-permutation significance tests
#[derive(Debug, Clone)]
pub struct PermutationConfig {
    pub seed: Option<u64>,
    pub parallel: bool,
    pub num_threads: usize,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: true,
            num_threads: num_cpus::get(),
        }
    }
}

impl PermutationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn serial(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }
}

/// Reject negative permutation counts.
pub fn validate_permutations(permutations: i64) -> Result<usize> {
    usize::try_from(permutations).map_err(|_| PermanovaError::InvalidPermutations(permutations))
}

/// `(extreme + 1) / (permutations + 1)`; never zero.
pub fn permutation_p_value(extreme: usize, permutations: usize) -> f64 {
    (extreme as f64 + 1.0) / (permutations as f64 + 1.0)
}

/// Drives repeated relabeling of a code vector and counts trials whose
/// statistic reaches the observed one.
///
/// Trial `i` shuffles with a generator on stream `i` of a state drawn once
/// from the master seed, so the outcome for a given seed does not depend on
/// whether trials run serially or on how many threads share them. Nothing is
/// allocated per trial.
#[derive(Debug)]
pub struct PermutationTest<'a> {
    config: &'a PermutationConfig,
}

impl<'a> PermutationTest<'a> {
    pub fn new(config: &'a PermutationConfig) -> Self {
        Self { config }
    }

    /// Returns the permutation p-value, or `None` when `permutations` is zero.
    pub fn p_value<F>(
        &self,
        codes: &[usize],
        observed: f64,
        permutations: usize,
        statistic: F,
    ) -> Result<Option<f64>>
    where
        F: Fn(&[usize]) -> f64 + Sync,
    {
        if permutations == 0 {
            return Ok(None);
        }

        let state = self.stream_state();
        let extreme = if self.config.parallel {
            self.count_extreme_parallel(codes, observed, permutations, state, &statistic)?
        } else {
            count_extreme_serial(codes, observed, permutations, state, &statistic)
        };

        log::debug!(
            "{} of {} permuted statistics >= observed {}",
            extreme,
            permutations,
            observed
        );

        Ok(Some(permutation_p_value(extreme, permutations)))
    }

    fn stream_state(&self) -> u128 {
        let mut master = match self.config.seed {
            Some(s) => Pcg64::seed_from_u64(s),
            None => Pcg64::from_entropy(),
        };
        master.gen()
    }

    fn uses_global_pool(&self) -> bool {
        self.config.num_threads == rayon::current_num_threads()
    }

    fn count_extreme_parallel<F>(
        &self,
        codes: &[usize],
        observed: f64,
        permutations: usize,
        state: u128,
        statistic: &F,
    ) -> Result<usize>
    where
        F: Fn(&[usize]) -> f64 + Sync,
    {
        if self.config.num_threads == 0 {
            return Err(PermanovaError::invalid_parameter(
                "num_threads must be greater than 0",
            ));
        }

        log::debug!(
            "Running {} permutations on {} threads",
            permutations,
            self.config.num_threads
        );

        let count = || {
            (0..permutations)
                .into_par_iter()
                .map_init(
                    || codes.to_vec(),
                    |shuffled, trial| {
                        shuffle_from(codes, shuffled, &mut trial_rng(state, trial));
                        statistic(shuffled)
                    },
                )
                .filter(|&stat| stat >= observed)
                .count()
        };

        if self.uses_global_pool() {
            return Ok(count());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| PermanovaError::ThreadPool(e.to_string()))?;
        Ok(pool.install(count))
    }
}

fn count_extreme_serial<F>(
    codes: &[usize],
    observed: f64,
    permutations: usize,
    state: u128,
    statistic: &F,
) -> usize
where
    F: Fn(&[usize]) -> f64,
{
    let mut shuffled = codes.to_vec();
    (0..permutations)
        .filter(|&trial| {
            shuffle_from(codes, &mut shuffled, &mut trial_rng(state, trial));
            statistic(&shuffled) >= observed
        })
        .count()
}

/// Generator for one trial: shared state, one stream per trial index.
pub(crate) fn trial_rng(state: u128, trial: usize) -> Pcg64 {
    Pcg64::new(state, trial as u128)
}

/// Reset `shuffled` to `codes` and apply a uniform permutation.
pub(crate) fn shuffle_from(codes: &[usize], shuffled: &mut [usize], rng: &mut Pcg64) {
    shuffled.copy_from_slice(codes);
    shuffled.shuffle(rng);
}
