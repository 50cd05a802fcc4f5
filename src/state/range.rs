//! Frequency range store and the vertical-position to pitch mapping

use crate::{Result, ToneCanvasError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pitch bounds in Hz
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min: f32,
    pub max: f32,
}

impl Default for FrequencyRange {
    fn default() -> Self {
        Self {
            min: 100.0,
            max: 1000.0,
        }
    }
}

impl FrequencyRange {
    pub fn new(min: f32, max: f32) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ToneCanvasError::ConfigError(format!(
                "Frequency bounds must be finite: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Map a 0-100 vertical coordinate linearly onto the range
    ///
    /// `pitch(0) == min` and `pitch(100) == max`.
    pub fn pitch(&self, y: f32) -> f32 {
        self.min + (self.max - self.min) * (y / 100.0)
    }
}

#[derive(Clone, Default)]
pub struct AudioRangeStore {
    inner: Arc<RwLock<FrequencyRange>>,
}

impl AudioRangeStore {
    pub fn new(range: FrequencyRange) -> Self {
        Self {
            inner: Arc::new(RwLock::new(range)),
        }
    }

    pub fn get(&self) -> FrequencyRange {
        *self.inner.read()
    }

    pub fn set(&self, range: FrequencyRange) -> Result<()> {
        range.validate()?;
        *self.inner.write() = range;
        Ok(())
    }

    pub fn pitch(&self, y: f32) -> f32 {
        self.inner.read().pitch(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_at_midpoint() {
        let range = FrequencyRange::new(100.0, 1000.0).unwrap();
        assert_eq!(range.pitch(50.0), 550.0);
    }

    #[test]
    fn test_pitch_endpoints() {
        let range = FrequencyRange::new(220.0, 880.0).unwrap();
        assert_eq!(range.pitch(0.0), 220.0);
        assert_eq!(range.pitch(100.0), 880.0);
    }

    #[test]
    fn test_pitch_is_monotonic() {
        let range = FrequencyRange::default();
        let mut last = range.pitch(0.0);
        for step in 1..=100 {
            let pitch = range.pitch(step as f32);
            assert!(pitch >= last, "pitch decreased at y={}", step);
            last = pitch;
        }
    }

    #[test]
    fn test_store_rejects_non_finite() {
        let store = AudioRangeStore::new(FrequencyRange::default());
        assert!(store
            .set(FrequencyRange {
                min: 0.0,
                max: f32::INFINITY
            })
            .is_err());
        assert_eq!(store.get(), FrequencyRange::default());

        store.set(FrequencyRange { min: 50.0, max: 150.0 }).unwrap();
        assert_eq!(store.pitch(50.0), 100.0);
    }
}
