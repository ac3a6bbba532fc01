#![allow(missing_docs)]

use std::path::PathBuf;

use omni_stress::{RunnerSettings, load_runner_settings_from_paths};
use tempfile::TempDir;

fn write_file(path: PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write yaml");
}

#[test]
fn merge_user_overrides_system() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("packages/conf/stress.yaml");
    let user = tmp.path().join(".config/omni-dev-fusion/stress.yaml");

    write_file(
        system.clone(),
        r"
default_concurrency: 4
funnel_capacity: 32
",
    );
    write_file(user.clone(), "default_concurrency: 12\n");

    let settings = load_runner_settings_from_paths(&system, &user);
    assert_eq!(
        settings,
        RunnerSettings {
            default_concurrency: Some(12),
            funnel_capacity: Some(32),
        }
    );

    let config = settings.into_config();
    assert_eq!(config.default_concurrency, 12);
    assert_eq!(config.funnel_capacity(), 32);
    config.validate().expect("merged config should be valid");
}

#[test]
fn missing_and_invalid_files_are_ignored() {
    let tmp = TempDir::new().expect("tempdir");
    let missing = tmp.path().join("missing.yaml");
    let invalid = tmp.path().join("invalid.yaml");
    write_file(invalid.clone(), "default_concurrency: [unterminated");

    let settings = load_runner_settings_from_paths(&missing, &invalid);
    assert_eq!(settings, RunnerSettings::default());
    assert_eq!(settings.into_config().default_concurrency, 8);
}

#[test]
fn zero_concurrency_from_settings_fails_validation() {
    let settings =
        RunnerSettings::from_yaml_str("default_concurrency: 0\n").expect("yaml should parse");
    assert!(settings.into_config().validate().is_err());
}
