//! Validation rules for configuration values.
//!
//! Every rule runs; failures accumulate so a single load reports all the
//! problems in a document at once.

use super::error::ConfigViolation;
use super::{NavigatorConfig, NavigationConfig, PathsConfig, VisionConfig};
use stillwater::validation::Validation;
use std::time::Duration;
use stillwater::NonEmptyVec;

pub type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

fn ok() -> Check {
    Validation::success(())
}

fn threshold(value: f64) -> Check {
    if (0.0..=1.0).contains(&value) {
        ok()
    } else {
        Validation::fail(ConfigViolation::ThresholdOutOfRange { value })
    }
}

fn positive(field: &'static str, value: f64) -> Check {
    if !(value.is_finite() && value > 0.0) {
        return Validation::fail(ConfigViolation::NotPositive { field, value });
    }
    match Duration::try_from_secs_f64(value) {
        Ok(d) if d.is_zero() => {
            Validation::fail(ConfigViolation::DurationUnderflow { field, value })
        }
        Ok(_) => ok(),
        Err(_) => Validation::fail(ConfigViolation::DurationOverflow { field, value }),
    }
}

fn non_negative(field: &'static str, value: f64) -> Check {
    if !(value.is_finite() && value >= 0.0) {
        return Validation::fail(ConfigViolation::Negative { field, value });
    }
    match Duration::try_from_secs_f64(value) {
        Ok(_) => ok(),
        Err(_) => Validation::fail(ConfigViolation::DurationOverflow { field, value }),
    }
}

fn at_least_one(field: &'static str, value: u64) -> Check {
    if value >= 1 {
        ok()
    } else {
        Validation::fail(ConfigViolation::ZeroCount { field })
    }
}

fn not_empty(field: &'static str, value: &str) -> Check {
    if value.trim().is_empty() {
        Validation::fail(ConfigViolation::Empty { field })
    } else {
        ok()
    }
}

pub fn vision(config: &VisionConfig) -> Vec<Check> {
    vec![
        threshold(config.threshold),
        positive("vision.timeout", config.timeout),
        positive("vision.check_interval", config.check_interval),
        at_least_one("vision.retries", u64::from(config.retries)),
        non_negative("vision.delay_between_retries", config.delay_between_retries),
        non_negative("vision.post_click_delay", config.post_click_delay),
        positive("vision.probe_timeout", config.probe_timeout),
    ]
}

pub fn navigation(config: &NavigationConfig) -> Vec<Check> {
    vec![
        not_empty("navigation.initial_state", &config.initial_state),
        not_empty("navigation.recovery_state", &config.recovery_state),
        at_least_one("navigation.max_stop_count", u64::from(config.max_stop_count)),
        at_least_one("navigation.break_count", u64::from(config.break_count)),
        not_empty("navigation.fallback_key", &config.fallback_key),
        non_negative(
            "navigation.state_transition_delay",
            config.state_transition_delay,
        ),
        at_least_one("navigation.max_iterations", config.max_iterations as u64),
    ]
}

pub fn paths(config: &PathsConfig) -> Vec<Check> {
    vec![not_empty(
        "paths.images_dir",
        &config.images_dir.to_string_lossy(),
    )]
}

/// Run every rule against `config`, accumulating all violations.
pub fn validate(config: &NavigatorConfig) -> Check {
    let mut checks = vision(&config.vision);
    checks.extend(navigation(&config.navigation));
    checks.extend(paths(&config.paths));
    Validation::all_vec(checks).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_every_rule() {
        assert!(validate(&NavigatorConfig::default()).is_success());
    }

    #[test]
    fn all_violations_are_accumulated() {
        let mut config = NavigatorConfig::default();
        config.vision.threshold = 1.5;
        config.vision.timeout = 0.0;
        config.navigation.break_count = 0;
        config.navigation.fallback_key = String::new();

        match validate(&config) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigViolation::ThresholdOutOfRange { .. })));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ConfigViolation::NotPositive {
                        field: "vision.timeout",
                        ..
                    }
                )));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ConfigViolation::ZeroCount {
                        field: "navigation.break_count"
                    }
                )));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ConfigViolation::Empty {
                        field: "navigation.fallback_key"
                    }
                )));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let mut config = NavigatorConfig::default();
        config.vision.threshold = f64::NAN;

        assert!(validate(&config).is_failure());
    }

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert!(threshold(0.0).is_success());
        assert!(threshold(1.0).is_success());
        assert!(threshold(-0.01).is_failure());
    }

    #[test]
    fn zero_delays_are_allowed() {
        let mut config = NavigatorConfig::default();
        config.vision.delay_between_retries = 0.0;
        config.vision.post_click_delay = 0.0;
        config.navigation.state_transition_delay = 0.0;

        assert!(validate(&config).is_success());
    }

    #[test]
    fn durations_must_survive_conversion() {
        let mut config = NavigatorConfig::default();
        config.vision.timeout = 1e30;
        config.vision.check_interval = 1e-12;
        config.navigation.state_transition_delay = 1e30;

        match validate(&config) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ConfigViolation::DurationOverflow {
                        field: "vision.timeout",
                        ..
                    }
                )));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ConfigViolation::DurationUnderflow {
                        field: "vision.check_interval",
                        ..
                    }
                )));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ConfigViolation::DurationOverflow {
                        field: "navigation.state_transition_delay",
                        ..
                    }
                )));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn tiny_delay_may_round_to_zero() {
        assert!(non_negative("vision.post_click_delay", 1e-12).is_success());
        assert!(positive("vision.timeout", 1e-12).is_failure());
    }
}
