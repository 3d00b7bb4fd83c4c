use std::{str::FromStr, time::Duration};

use crate::{
    constants::{
        MAX_SCALE, POLL_EVERY, POLL_TIMEOUT_MS, PUSH_URL, SAMPLES, SAMPLES_LIMIT, SPEED_MS, SPEED_MS_LIMIT, STATUS_URL,
        WIDEN_STEP,
    },
    error::{DashboardError, Result},
};

/// Startup tunables. Defaults come from `constants`; each can be overridden
/// once at launch through a `PULSE_*` environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub push_url: String,
    pub status_url: String,
    pub samples: usize,
    pub speed: Duration,
    pub max_scale: u32,
    pub widen_step: usize,
    pub poll_every: u64,
    pub poll_timeout: Duration,
    pub headless: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            push_url: PUSH_URL.to_string(),
            status_url: STATUS_URL.to_string(),
            samples: SAMPLES,
            speed: Duration::from_millis(SPEED_MS),
            max_scale: MAX_SCALE,
            widen_step: WIDEN_STEP,
            poll_every: POLL_EVERY,
            poll_timeout: Duration::from_millis(POLL_TIMEOUT_MS),
            headless: false,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("PULSE_PUSH_URL") {
            config.push_url = url;
        }
        if let Some(url) = get("PULSE_STATUS_URL") {
            config.status_url = url;
        }
        if let Some(v) = get("PULSE_SAMPLES") {
            config.samples = parse("PULSE_SAMPLES", &v)?;
        }
        if let Some(v) = get("PULSE_SPEED_MS") {
            config.speed = Duration::from_millis(parse("PULSE_SPEED_MS", &v)?);
        }
        if let Some(v) = get("PULSE_MAX_SCALE") {
            config.max_scale = parse("PULSE_MAX_SCALE", &v)?;
        }
        if let Some(v) = get("PULSE_POLL_EVERY") {
            config.poll_every = parse("PULSE_POLL_EVERY", &v)?;
        }
        if let Some(v) = get("PULSE_HEADLESS") {
            config.headless = matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "YES");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("PULSE_SAMPLES", self.samples == 0 || self.samples > SAMPLES_LIMIT, self.samples.to_string()),
            (
                "PULSE_SPEED_MS",
                self.speed.is_zero() || self.speed > Duration::from_millis(SPEED_MS_LIMIT),
                self.speed.as_millis().to_string(),
            ),
            ("PULSE_MAX_SCALE", self.max_scale == 0, self.max_scale.to_string()),
            ("PULSE_POLL_EVERY", self.poll_every == 0, self.poll_every.to_string()),
        ];
        for (key, invalid, value) in checks {
            if invalid {
                return Err(DashboardError::Config { key, value });
            }
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| DashboardError::Config {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.samples, 20);
        assert_eq!(config.speed, Duration::from_millis(250));
        assert_eq!(config.max_scale, 4);
        assert_eq!(config.poll_every, 10);
        assert!(!config.headless);
    }

    #[test]
    fn overrides_apply() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("PULSE_PUSH_URL", "ws://10.0.0.2:9999/"),
            ("PULSE_SAMPLES", "40"),
            ("PULSE_SPEED_MS", " 100 "),
            ("PULSE_HEADLESS", "yes"),
        ]))
        .unwrap();
        assert_eq!(config.push_url, "ws://10.0.0.2:9999/");
        assert_eq!(config.samples, 40);
        assert_eq!(config.speed, Duration::from_millis(100));
        assert!(config.headless);
        assert_eq!(config.status_url, STATUS_URL);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = DashboardConfig::from_lookup(lookup(&[("PULSE_SAMPLES", "  ")])).unwrap();
        assert_eq!(config.samples, SAMPLES);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = DashboardConfig::from_lookup(lookup(&[("PULSE_MAX_SCALE", "lots")])).unwrap_err();
        assert!(matches!(err, DashboardError::Config { key: "PULSE_MAX_SCALE", .. }));
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let err = DashboardConfig::from_lookup(lookup(&[("PULSE_POLL_EVERY", "0")])).unwrap_err();
        assert!(matches!(err, DashboardError::Config { key: "PULSE_POLL_EVERY", .. }));
        let err = DashboardConfig::from_lookup(lookup(&[("PULSE_SPEED_MS", "0")])).unwrap_err();
        assert!(matches!(err, DashboardError::Config { key: "PULSE_SPEED_MS", .. }));
    }

    #[test]
    fn oversized_window_and_cadence_are_rejected() {
        let err = DashboardConfig::from_lookup(lookup(&[("PULSE_SPEED_MS", "18446744073709551615")])).unwrap_err();
        assert!(matches!(err, DashboardError::Config { key: "PULSE_SPEED_MS", .. }));
        let err = DashboardConfig::from_lookup(lookup(&[("PULSE_SAMPLES", "1000000000")])).unwrap_err();
        assert!(matches!(err, DashboardError::Config { key: "PULSE_SAMPLES", .. }));

        let edge = DashboardConfig::from_lookup(lookup(&[("PULSE_SPEED_MS", "3600000"), ("PULSE_SAMPLES", "10000")])).unwrap();
        assert_eq!(edge.speed, Duration::from_millis(SPEED_MS_LIMIT));
        assert_eq!(edge.samples, SAMPLES_LIMIT);
    }
}
