//! Tests for engine configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        [bias]
        type = "constraints_low"
        constraints = ["Max", "Dep"]

        [learner]
        max_passes = 25
        collection = "first_error"
        mismatch = "strict"

        [typology]
        thread_count = "none"
        language_limit = 10
        prune_harmonically_bounded = false
    "#;

    let config = OtConfig::from_toml_str(toml).unwrap();
    assert_eq!(
        config.bias,
        BiasConfig::ConstraintsLow {
            constraints: vec!["Max".to_string(), "Dep".to_string()]
        }
    );
    assert_eq!(config.learner.max_passes, 25);
    assert_eq!(config.learner.collection, CollectionMode::FirstError);
    assert_eq!(config.learner.mismatch, MismatchRule::Strict);
    assert_eq!(config.typology.thread_count, ThreadCount::None);
    assert_eq!(config.typology.language_limit, Some(10));
    assert!(!config.typology.prune_harmonically_bounded);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        bias:
          type: markedness_low
        learner:
          mismatch: strict
        typology:
          thread_count: none
    "#;

    let config = OtConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.bias, BiasConfig::MarkednessLow);
    assert_eq!(config.learner.mismatch, MismatchRule::Strict);
    assert_eq!(config.learner.max_passes, DEFAULT_MAX_PASSES);
    assert_eq!(config.typology.thread_count, ThreadCount::None);
}

#[test]
fn test_partial_sections_use_defaults() {
    let config = OtConfig::from_toml_str("[learner]\nmax_passes = 3\n").unwrap();
    assert_eq!(config.bias, BiasConfig::Unbiased);
    assert_eq!(config.learner.collection, CollectionMode::FullPass);
    assert!(config.typology.prune_harmonically_bounded);
    assert_eq!(config.typology.thread_count, ThreadCount::Auto);
}

#[test]
fn test_invalid_values_rejected() {
    let err = OtConfig::from_toml_str("[learner]\nmax_passes = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = OtConfig::from_toml_str("[bias]\ntype = \"constraints_low\"\nconstraints = []\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = OtConfig::from_toml_str("[typology]\nthread_count = { count = 0 }\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_unknown_bias_is_parse_error() {
    let err = OtConfig::from_toml_str("[bias]\ntype = \"random\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_missing_file() {
    let err = OtConfig::load("definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_builder() {
    let config = OtConfig::new()
        .with_bias(BiasConfig::FaithfulnessLow)
        .with_max_passes(7)
        .with_thread_count(ThreadCount::Count(3))
        .with_language_limit(5);

    assert_eq!(config.bias, BiasConfig::FaithfulnessLow);
    assert_eq!(config.learner.max_passes, 7);
    assert_eq!(config.typology.thread_count, ThreadCount::Count(3));
    assert_eq!(config.typology.language_limit, Some(5));
}

#[test]
fn test_thread_count_resolve() {
    assert_eq!(ThreadCount::Count(4).resolve(10), 4);
    assert_eq!(ThreadCount::Count(10).resolve(4), 4);
    assert_eq!(ThreadCount::None.resolve(10), 1);
    assert!(ThreadCount::Auto.resolve(100) > 0);
    assert_eq!(ThreadCount::Auto.resolve(0), 1);
}

#[test]
fn test_thread_count_display() {
    assert_eq!(format!("{}", ThreadCount::Auto), "Auto");
    assert_eq!(format!("{}", ThreadCount::None), "None");
    assert_eq!(format!("{}", ThreadCount::Count(4)), "4");
}
