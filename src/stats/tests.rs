#[cfg(test)]
mod tests {
    use crate::distance::SymmetricDistanceMatrix;
    use crate::error::{DegenerateKind, PermanovaError};
    use crate::stats::permutation::{shuffle_from, trial_rng};
    use crate::stats::{permanova, Grouping, Permanova, PermutationConfig, DEFAULT_PERMUTATIONS};
    use pretty_assertions::assert_eq;

    fn create_unit_matrix(n: usize) -> SymmetricDistanceMatrix {
        let ids: Vec<String> = (0..n).map(|i| format!("S{}", i)).collect();
        let condensed = vec![1.0; n * (n - 1) / 2];
        SymmetricDistanceMatrix::from_condensed(ids, &condensed).unwrap()
    }

    fn create_test_matrix() -> SymmetricDistanceMatrix {
        SymmetricDistanceMatrix::from_rows(
            vec!["a", "b", "c", "d"],
            &[
                vec![0.0, 1.0, 1.0, 4.0],
                vec![1.0, 0.0, 3.0, 2.0],
                vec![1.0, 3.0, 0.0, 3.0],
                vec![4.0, 2.0, 3.0, 0.0],
            ],
        )
        .unwrap()
    }

    // Two well-separated groups: {0..5} and {6..11}
    fn create_separated_matrix() -> (SymmetricDistanceMatrix, Vec<&'static str>) {
        let n = 12;
        let mut rows = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    rows[i][j] = if (i < 6) == (j < 6) { 0.1 } else { 5.0 };
                }
            }
        }
        let ids: Vec<String> = (0..n).map(|i| format!("S{}", i)).collect();
        let dm = SymmetricDistanceMatrix::from_rows(ids, &rows).unwrap();
        let grouping = vec!["control"; 6]
            .into_iter()
            .chain(vec!["treated"; 6])
            .collect();
        (dm, grouping)
    }

    fn seeded(seed: u64) -> PermutationConfig {
        PermutationConfig::default().with_seed(seed)
    }

    #[test]
    fn test_unit_distances_two_pairs() {
        // s_T = 6/4, s_W = 1/2 + 1/2, F = (0.5/1) / (1/2) = 1
        let dm = create_unit_matrix(4);
        let test = Permanova::with_config(&dm, vec!["g1", "g1", "g2", "g2"], seeded(42)).unwrap();

        let ss = test.sum_of_squares();
        assert_eq!(ss.total, 1.5);
        assert_eq!(ss.within, 1.0);
        assert_eq!(ss.between, 0.5);

        let result = test.run(99).unwrap();
        assert_eq!(result.statistic, 1.0);
        let p = result.p_value.unwrap();
        assert!(p > 0.0 && p <= 1.0, "p={}", p);
        assert_eq!(result.permutations, 99);
    }

    #[test]
    fn test_result_shape() {
        let dm = create_test_matrix();
        let result = Permanova::with_config(
            &dm,
            vec!["Treatment1", "Treatment1", "Treatment2", "Treatment2"],
            seeded(0),
        )
        .unwrap()
        .run(9)
        .unwrap();

        assert_eq!(result.short_method_name, "PERMANOVA");
        assert_eq!(
            result.long_method_name,
            "Permutational Multivariate Analysis of Variance"
        );
        assert_eq!(result.test_statistic_name, "pseudo-F");
        assert_eq!(result.sample_size, 4);
        assert_eq!(
            result.groups.iter().copied().collect::<Vec<_>>(),
            vec!["Treatment1", "Treatment2"]
        );
        assert!((result.statistic - 2.0).abs() < 1e-12, "F={}", result.statistic);
    }

    #[test]
    fn test_unequal_group_sizes() {
        // within x: 1/2; y and z are singletons. s_T = 10, s_A = 9.5,
        // F = (9.5/2) / (0.5/1) = 9.5
        let dm = create_test_matrix();
        let test = Permanova::new(&dm, vec!['x', 'x', 'y', 'z']).unwrap();
        assert!((test.observed_statistic() - 9.5).abs() < 1e-12);
        assert_eq!(test.grouping().group_sizes(), &[2, 1, 1]);
    }

    #[test]
    fn test_zero_permutations_is_descriptive() {
        let dm = create_test_matrix();
        let result = Permanova::new(&dm, vec![1, 1, 2, 2]).unwrap().run(0).unwrap();
        assert_eq!(result.p_value, None);
        assert_eq!(result.permutations, 0);
        assert!(result.statistic.is_finite());
    }

    #[test]
    fn test_negative_permutations() {
        let dm = create_test_matrix();
        let test = Permanova::new(&dm, vec![1, 1, 2, 2]).unwrap();
        assert!(matches!(
            test.run(-1),
            Err(PermanovaError::InvalidPermutations(-1))
        ));
    }

    #[test]
    fn test_grouping_size_mismatch() {
        let dm = create_test_matrix();
        let result = Permanova::new(&dm, vec!["a", "a", "b"]);
        assert!(matches!(
            result,
            Err(PermanovaError::GroupingSizeMismatch { grouping_len: 3, num_samples: 4 })
        ));
    }

    #[test]
    fn test_single_group_rejected() {
        let dm = create_test_matrix();
        let result = Permanova::new(&dm, vec!["g1", "g1", "g1", "g1"]);
        assert!(matches!(
            result,
            Err(PermanovaError::DegenerateGrouping(DegenerateKind::SingleGroup))
        ));
    }

    #[test]
    fn test_all_unique_rejected() {
        let dm = create_test_matrix();
        let result = Permanova::new(&dm, vec!["A", "B", "C", "D"]);
        assert!(matches!(
            result,
            Err(PermanovaError::DegenerateGrouping(DegenerateKind::AllUnique))
        ));
    }

    #[test]
    fn test_separated_groups_significant() {
        let (dm, grouping) = create_separated_matrix();
        let result = Permanova::with_config(&dm, grouping, seeded(42))
            .unwrap()
            .run(999)
            .unwrap();

        assert!(result.statistic > 1.0, "F={}", result.statistic);
        let p = result.p_value.unwrap();
        assert!(p < 0.05, "p={}", p);
        assert!(p >= 1.0 / 1000.0);
    }

    #[test]
    fn test_uniform_distances_not_significant() {
        // Every relabeling with the same group sizes gives the same F.
        let dm = create_unit_matrix(12);
        let grouping: Vec<usize> = (0..12).map(|i| i % 3).collect();
        let result = Permanova::with_config(&dm, grouping, seeded(42))
            .unwrap()
            .run(199)
            .unwrap();
        assert_eq!(result.p_value, Some(1.0));
    }

    #[test]
    fn test_same_seed_reproducible() {
        let (dm, grouping) = create_separated_matrix();
        let first = Permanova::with_config(&dm, grouping.clone(), seeded(11))
            .unwrap()
            .run(199)
            .unwrap();
        let second = Permanova::with_config(&dm, grouping, seeded(11))
            .unwrap()
            .run(199)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_serial_matches_parallel() {
        let dm = create_test_matrix();
        let grouping = vec!["a", "a", "b", "b"];
        let serial = Permanova::with_config(&dm, grouping.clone(), seeded(5).serial())
            .unwrap()
            .run(499)
            .unwrap();
        let parallel = Permanova::with_config(&dm, grouping, seeded(5).with_threads(3))
            .unwrap()
            .run(499)
            .unwrap();
        assert_eq!(serial.p_value, parallel.p_value);
        assert_eq!(serial.statistic, parallel.statistic);
    }

    #[test]
    fn test_statistic_recodes_labels() {
        let dm = create_test_matrix();
        let test = Permanova::new(&dm, vec!["g1", "g1", "g2", "g2"]).unwrap();

        let relabeled = test.statistic(&["x", "x", "y", "y"]).unwrap();
        assert_eq!(relabeled, test.observed_statistic());

        let swapped = test.statistic(&["g2", "g2", "g1", "g1"]).unwrap();
        assert_eq!(swapped, test.observed_statistic());

        let other = test.statistic(&["g1", "g2", "g1", "g2"]).unwrap();
        assert!(other >= 0.0);
        assert!(test.statistic(&["g1", "g1", "g1", "g1"]).is_err());
    }

    #[test]
    fn test_statistic_deterministic_and_nonnegative() {
        let (dm, grouping) = create_separated_matrix();
        let test = Permanova::new(&dm, grouping).unwrap();
        let first = test.observed_statistic();
        assert_eq!(first, test.observed_statistic());
        assert!(test.sum_of_squares().within > 0.0);
        assert!(first >= 0.0);
    }

    #[test]
    fn test_group_sizes_preserved_under_relabeling() {
        let labels = vec!["a", "b", "a", "c", "a", "b"];
        let grouping = Grouping::new(labels, 6).unwrap();
        let mut before = grouping.group_sizes().to_vec();
        before.sort_unstable();

        let mut shuffled = grouping.codes().to_vec();
        for trial in 0..20 {
            shuffle_from(grouping.codes(), &mut shuffled, &mut trial_rng(5, trial));
            let relabeled = Grouping::new(shuffled.clone(), 6).unwrap();
            assert_eq!(relabeled.num_groups(), grouping.num_groups());
            assert_eq!(relabeled.num_samples(), 6);

            let mut after = relabeled.group_sizes().to_vec();
            after.sort_unstable();
            assert_eq!(after, before);
        }
    }

    #[test]
    fn test_default_permutations() {
        let dm = create_test_matrix();
        let result = Permanova::with_config(&dm, vec![0, 0, 1, 1], seeded(1))
            .unwrap()
            .run_default()
            .unwrap();
        assert_eq!(result.permutations, DEFAULT_PERMUTATIONS as usize);
        assert!(result.p_value.unwrap() >= 1.0 / 1000.0);
    }

    #[test]
    fn test_convenience_function() {
        let dm = create_unit_matrix(4);
        let result = permanova(&dm, vec!["g1", "g1", "g2", "g2"], 99, Some(3)).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert!(result.p_value.is_some());
    }
}
