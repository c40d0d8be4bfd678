//! Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// Bounds and pacing for a run.
///
/// Decoded from JSON with durations in milliseconds; missing fields take
/// their defaults:
///
/// ```json
/// { "max_rounds": 500, "max_duration_ms": 2000, "record_trace": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Round budget for the sequential engines
    pub max_rounds: u64,

    /// Wall-clock budget for the concurrent engine
    #[serde(rename = "max_duration_ms", with = "millis")]
    pub max_duration: Duration,

    /// Longest the monitor waits between convergence checks when no
    /// bridge reports a change
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,

    /// Longest an idle worker waits before relaying again
    #[serde(rename = "idle_interval_ms", with = "millis")]
    pub idle_interval: Duration,

    /// How long workers get to exit after the stop signal before they are
    /// reported unresponsive
    #[serde(rename = "shutdown_grace_ms", with = "millis")]
    pub shutdown_grace: Duration,

    /// Runtime threads for the concurrent engine (default: available
    /// parallelism)
    pub worker_threads: Option<usize>,

    /// Record every route change (sequential engines only)
    pub record_trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10_000,
            max_duration: Duration::from_secs(30),
            poll_interval: Duration::from_millis(10),
            idle_interval: Duration::from_millis(5),
            shutdown_grace: Duration::from_secs(1),
            worker_threads: None,
            record_trace: false,
        }
    }
}

impl EngineConfig {
    /// Decode a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject settings no run can work with.
    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("poll_interval_ms", self.poll_interval),
            ("idle_interval_ms", self.idle_interval),
        ]
        .into_iter()
        .find(|(_, d)| d.is_zero());
        if let Some((name, _)) = zero {
            return Err(EngineError::InvalidConfig(format!("{name} must be non-zero")));
        }
        if self.worker_threads == Some(0) {
            return Err(EngineError::InvalidConfig("worker_threads must be non-zero".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = duration;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    #[must_use]
    pub fn with_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }

    /// Runtime threads to start, never zero.
    pub(crate) fn runtime_threads(&self) -> usize {
        self.worker_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "max_rounds": 7, "max_duration_ms": 250 }"#).unwrap();
        assert_eq!(config.max_rounds, 7);
        assert_eq!(config.max_duration, Duration::from_millis(250));
        assert_eq!(config.poll_interval, EngineConfig::default().poll_interval);
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "max_round": 7 }"#),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn zero_intervals_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "idle_interval_ms": 0 }"#),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(EngineConfig::default().with_worker_threads(0).validate().is_err());
    }

    #[test]
    fn serialises_back_to_millis() {
        let json = serde_json::to_value(EngineConfig::default().with_max_rounds(3)).unwrap();
        assert_eq!(json["max_rounds"], 3);
        assert_eq!(json["shutdown_grace_ms"], 1000);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "record_trace": true }"#).unwrap();
        assert!(EngineConfig::load(&path).unwrap().record_trace);
    }
}
