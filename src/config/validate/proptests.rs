//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

fn arb_valid_spec() -> impl Strategy<Value = TrainSpec> {
    (
        1usize..256,                                        // batch_size
        1e-6f32..1.0,                                       // lr
        1usize..100,                                        // epochs
        1usize..20,                                         // window_size
        1usize..50,                                         // n_negs
        prop_oneof![Just("adagrad"), Just("adam"), Just("sgd")], // optimizer
    )
        .prop_map(|(batch_size, lr, epochs, window_size, n_negs, name)| TrainSpec {
            model: ModelSpec::default(),
            data: DataSpec {
                train: PathBuf::from("train.txt"),
                batch_size,
                window_size,
                n_negs,
                ..Default::default()
            },
            optimizer: OptimSpec { name: name.to_string(), lr, params: HashMap::new() },
            training: TrainingParams { epochs, ..Default::default() },
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_config(&spec).is_ok());
    }

    #[test]
    fn prop_zero_batch_size_fails(spec in arb_valid_spec()) {
        let mut spec = spec;
        spec.data.batch_size = 0;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn prop_lr_above_one_fails(spec in arb_valid_spec(), lr in 1.0001f32..100.0) {
        let mut spec = spec;
        spec.optimizer.lr = lr;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidLearningRate(_))
        ));
    }

    #[test]
    fn prop_evaluate_without_valid_fails(spec in arb_valid_spec()) {
        let mut spec = spec;
        spec.training.mode = RunMode::TrainEvaluate;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::MissingValidationData)
        ));
    }
}
