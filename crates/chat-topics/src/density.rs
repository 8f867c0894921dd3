//! Message density estimation for adaptive window sizing.
//!
//! Dense conversations get a short window, sparse ones a long window:
//! `density = (count - 1) / max(span_secs, 1)` looked up in the tier table.

use chat_types::{Message, TimestampUnit};
use tracing::debug;

use crate::config::{AdaptiveWindowConfig, ClusteringConfig};
use crate::error::ClusterError;

/// Picks a window size from local message density.
#[derive(Debug, Clone)]
pub struct DensityEstimator {
    adaptive: AdaptiveWindowConfig,
    default_window_secs: i64,
    unit: TimestampUnit,
}

impl DensityEstimator {
    /// Create an estimator from the clustering configuration.
    pub fn new(config: &ClusteringConfig) -> Self {
        Self {
            adaptive: config.adaptive.clone(),
            default_window_secs: config.time_window,
            unit: config.timestamp_unit,
        }
    }

    /// Messages per second over a timestamp-sorted slice.
    ///
    /// Returns `None` for a single message, where density has no meaning.
    pub fn density(&self, messages: &[&Message]) -> Result<Option<f64>, ClusterError> {
        let (first, last) = match (messages.first(), messages.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ClusterError::EmptyInput),
        };
        if messages.len() == 1 {
            return Ok(None);
        }

        let span_secs = self.unit.to_secs(last.timestamp.saturating_sub(first.timestamp));
        let density = (messages.len() - 1) as f64 / span_secs.max(1.0);
        Ok(Some(density))
    }

    /// Window in seconds for a timestamp-sorted slice.
    pub fn window_secs(&self, messages: &[&Message]) -> Result<i64, ClusterError> {
        let window = match self.density(messages)? {
            Some(density) => {
                let window = self.adaptive.window_for_density(density);
                debug!(density, window_secs = window, "Adaptive window selected");
                window
            }
            None => {
                debug!(
                    window_secs = self.default_window_secs,
                    "Single message, using default window"
                );
                self.default_window_secs
            }
        };
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages_at(timestamps: &[i64]) -> Vec<Message> {
        timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| Message::new(format!("m{i}"), ts, "u1", "A", "text"))
            .collect()
    }

    fn estimate(config: &ClusteringConfig, timestamps: &[i64]) -> Result<i64, ClusterError> {
        let messages = messages_at(timestamps);
        let refs: Vec<&Message> = messages.iter().collect();
        DensityEstimator::new(config).window_secs(&refs)
    }

    #[test]
    fn test_empty_input_is_error() {
        let config = ClusteringConfig::default();
        assert!(matches!(
            estimate(&config, &[]),
            Err(ClusterError::EmptyInput)
        ));
    }

    #[test]
    fn test_single_message_uses_default_window() {
        let config = ClusteringConfig {
            time_window: 420,
            ..Default::default()
        };
        assert_eq!(estimate(&config, &[1_000]).unwrap(), 420);
    }

    #[test]
    fn test_dense_burst_gets_short_window() {
        // 11 messages over 10 seconds: density 1.0
        let timestamps: Vec<i64> = (0..=10).collect();
        assert_eq!(
            estimate(&ClusteringConfig::default(), &timestamps).unwrap(),
            150
        );
    }

    #[test]
    fn test_medium_density_window() {
        // 4 intervals over 10 seconds: density 0.4
        assert_eq!(
            estimate(&ClusteringConfig::default(), &[0, 2, 5, 8, 10]).unwrap(),
            300
        );
    }

    #[test]
    fn test_sparse_conversation_gets_long_window() {
        // 4 intervals over 120 seconds: density ~0.033
        assert_eq!(
            estimate(&ClusteringConfig::default(), &[0, 30, 60, 90, 120]).unwrap(),
            600
        );
    }

    #[test]
    fn test_simultaneous_messages_guard_division() {
        let config = ClusteringConfig::default();
        let messages = messages_at(&[50, 50, 50]);
        let refs: Vec<&Message> = messages.iter().collect();
        let density = DensityEstimator::new(&config).density(&refs).unwrap();

        // span clamps to one second
        assert_eq!(density, Some(2.0));
    }

    #[test]
    fn test_millisecond_timestamps() {
        let config = ClusteringConfig {
            timestamp_unit: TimestampUnit::Milliseconds,
            ..Default::default()
        };
        // 11 messages over 10 seconds expressed in ms
        let timestamps: Vec<i64> = (0..=10).map(|s| s * 1000).collect();
        assert_eq!(estimate(&config, &timestamps).unwrap(), 150);
    }

    #[test]
    fn test_extreme_timestamps_saturate_span() {
        assert_eq!(
            estimate(&ClusteringConfig::default(), &[i64::MIN, 0, i64::MAX]).unwrap(),
            600
        );
    }
}
