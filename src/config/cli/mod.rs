//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! itemvec train config.yaml
//! itemvec train config.yaml --epochs 20 --lr 0.025
//! itemvec validate config.yaml --detailed
//! itemvec info config.yaml --format json
//! ```

mod core;
mod types;

pub use core::{apply_overrides, parse_args, Cli, Command, InfoArgs, TrainArgs, ValidateArgs};
pub use types::OutputFormat;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainSpec;
    use std::path::PathBuf;

    fn train_args() -> TrainArgs {
        TrainArgs {
            config: PathBuf::from("config.yaml"),
            output_dir: None,
            epochs: None,
            batch_size: None,
            lr: None,
            dry_run: false,
            log_every: None,
            seed: None,
        }
    }

    fn create_test_spec() -> TrainSpec {
        serde_yaml::from_str("data:\n  train: users.txt\n").unwrap()
    }

    #[test]
    fn test_parse_train_command() {
        let cli = parse_args(["itemvec", "train", "config.yaml"]).unwrap();
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.config, PathBuf::from("config.yaml"));
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_train_with_overrides() {
        let cli = parse_args([
            "itemvec",
            "train",
            "config.yaml",
            "--epochs",
            "10",
            "--batch-size",
            "32",
            "--lr",
            "0.025",
            "--output-dir",
            "./output",
            "--seed",
            "9",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.epochs, Some(10));
                assert_eq!(args.batch_size, Some(32));
                assert!((args.lr.unwrap() - 0.025).abs() < 1e-6);
                assert_eq!(args.output_dir, Some(PathBuf::from("./output")));
                assert_eq!(args.seed, Some(9));
                assert!(args.dry_run);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_validate_detailed() {
        let cli = parse_args(["itemvec", "validate", "config.yaml", "--detailed"]).unwrap();
        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.config, PathBuf::from("config.yaml"));
                assert!(args.detailed);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_parse_info_formats() {
        let cli = parse_args(["itemvec", "info", "config.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::Info(InfoArgs { format: OutputFormat::Text, .. })));

        let cli = parse_args(["itemvec", "info", "config.yaml", "--format", "JSON"]).unwrap();
        assert!(matches!(cli.command, Command::Info(InfoArgs { format: OutputFormat::Json, .. })));
    }

    #[test]
    fn test_global_flags() {
        let cli = parse_args(["itemvec", "-v", "train", "config.yaml"]).unwrap();
        assert!(cli.verbose && !cli.quiet);

        let cli = parse_args(["itemvec", "train", "config.yaml", "--quiet"]).unwrap();
        assert!(!cli.verbose && cli.quiet);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(["itemvec", "train"]).is_err());
        assert!(parse_args(["itemvec", "quantize", "model.gguf"]).is_err());
        assert!(parse_args(["itemvec", "info", "c.yaml", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_apply_overrides_none_keeps_spec() {
        let mut spec = create_test_spec();
        let before = spec.clone();
        apply_overrides(&mut spec, &train_args());
        assert_eq!(spec.training.epochs, before.training.epochs);
        assert_eq!(spec.data.batch_size, before.data.batch_size);
        assert_eq!(spec.model.seed, before.model.seed);
    }

    #[test]
    fn test_apply_overrides_all() {
        let mut spec = create_test_spec();
        let args = TrainArgs {
            output_dir: Some(PathBuf::from("./all_overrides")),
            epochs: Some(100),
            batch_size: Some(128),
            lr: Some(0.01),
            log_every: Some(50),
            seed: Some(42),
            ..train_args()
        };
        apply_overrides(&mut spec, &args);
        assert_eq!(spec.training.save_dir, PathBuf::from("./all_overrides"));
        assert_eq!(spec.training.epochs, 100);
        assert_eq!(spec.data.batch_size, 128);
        assert!((spec.optimizer.lr - 0.01).abs() < 1e-8);
        assert_eq!(spec.training.log_interval, 50);
        assert_eq!(spec.model.seed, 42);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn config_path_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_-]{0,20}\\.(yaml|yml)"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_train_command_parses(config in config_path_strategy()) {
            let cli = parse_args(["itemvec", "train", &config]).unwrap();
            match cli.command {
                Command::Train(args) => {
                    prop_assert_eq!(args.config.to_str().unwrap(), &config);
                }
                _ => prop_assert!(false, "Expected Train command"),
            }
        }

        #[test]
        fn prop_epochs_override_positive(
            config in config_path_strategy(),
            epochs in 1usize..10000
        ) {
            let epochs_str = epochs.to_string();
            let cli = parse_args(["itemvec", "train", &config, "--epochs", &epochs_str]).unwrap();
            match cli.command {
                Command::Train(args) => prop_assert_eq!(args.epochs, Some(epochs)),
                _ => prop_assert!(false, "Expected Train command"),
            }
        }

        #[test]
        fn prop_seed_override(
            config in config_path_strategy(),
            seed in 0u64..u64::MAX
        ) {
            let seed_str = seed.to_string();
            let cli = parse_args(["itemvec", "train", &config, "--seed", &seed_str]).unwrap();
            match cli.command {
                Command::Train(args) => prop_assert_eq!(args.seed, Some(seed)),
                _ => prop_assert!(false, "Expected Train command"),
            }
        }

        #[test]
        fn prop_output_format_case_insensitive(
            format in prop::sample::select(vec!["text", "TEXT", "Text", "json", "JSON", "yaml", "Yaml"])
        ) {
            prop_assert!(format.parse::<OutputFormat>().is_ok());
        }
    }
}
