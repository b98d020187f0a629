// src/audio/range.rs

use serde::{Deserialize, Serialize};

use crate::audio::types::TrimWindow;
use crate::error::{AudioError, Result};

/// Rules used to turn a requested (start, end) pair into a [`TrimWindow`]
///
/// Requested values arrive in ambiguous units. Anything whose magnitude is
/// above `millisecond_threshold` is read as milliseconds. This misreads a
/// legitimately long position given in seconds (e.g. 1200s into a
/// podcast); callers that know their units should pass seconds below the
/// threshold or raise it through [`crate::config::PipelineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangePolicy {
    /// Values with a magnitude above this are treated as milliseconds
    pub millisecond_threshold: f64,

    /// Selections this short (or inverted) extend to the end of the file
    pub min_span_seconds: f64,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self {
            millisecond_threshold: 1000.0,
            min_span_seconds: 0.05,
        }
    }
}

impl RangePolicy {
    /// Convert a raw requested value to seconds
    pub fn normalize_seconds(&self, raw: f64) -> f64 {
        if raw.abs() > self.millisecond_threshold {
            raw / 1000.0
        } else {
            raw
        }
    }

    /// Resolve a requested range against a known duration
    ///
    /// A missing start means 0, a missing end means `duration`. Both are
    /// clamped into `[0, duration]`; a selection of `min_span_seconds` or
    /// less becomes "from start to the end of the file".
    ///
    /// # Example
    /// ```
    /// use clipwav::audio::RangePolicy;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let window = RangePolicy::default().resolve(Some(2000.0), Some(5000.0), 10.0)?;
    /// assert_eq!(window.start_seconds(), 2.0);
    /// assert_eq!(window.end_seconds(), 5.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn resolve(&self, start: Option<f64>, end: Option<f64>, duration: f64) -> Result<TrimWindow> {
        let invalid = |start: f64, end: f64| AudioError::InvalidRange {
            start,
            end,
            duration,
        };

        if !duration.is_finite() || duration < 0.0 {
            return Err(invalid(start.unwrap_or(0.0), end.unwrap_or(duration)));
        }
        if start.is_some_and(f64::is_nan) || end.is_some_and(f64::is_nan) {
            return Err(invalid(start.unwrap_or(0.0), end.unwrap_or(duration)));
        }

        let start = start
            .map(|s| self.normalize_seconds(s))
            .unwrap_or(0.0)
            .clamp(0.0, duration);
        let mut end = end
            .map(|e| self.normalize_seconds(e))
            .unwrap_or(duration)
            .clamp(0.0, duration);

        if end - start <= self.min_span_seconds {
            tracing::warn!(
                start,
                end,
                duration,
                "selection too short, trimming to the end of the file"
            );
            end = duration;
        }

        if end <= start {
            return Err(invalid(start, end));
        }

        Ok(TrimWindow::new(start, end))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.millisecond_threshold.is_finite() && self.millisecond_threshold > 0.0) {
            return Err(AudioError::Config(format!(
                "millisecond_threshold must be a positive number, got {}",
                self.millisecond_threshold
            )));
        }
        if !(self.min_span_seconds.is_finite() && self.min_span_seconds >= 0.0) {
            return Err(AudioError::Config(format!(
                "min_span_seconds cannot be negative, got {}",
                self.min_span_seconds
            )));
        }
        Ok(())
    }
}

/// Resolve a requested range using the default policy
pub fn resolve_window(start: Option<f64>, end: Option<f64>, duration: f64) -> Result<TrimWindow> {
    RangePolicy::default().resolve(start, end, duration)
}
