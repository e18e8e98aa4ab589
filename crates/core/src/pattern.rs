//! Input bundle for anomaly scoring.
//!
//! A [`PatternData`] carries one optional sub-structure per behavioral signal.
//! Callers assemble it; the engine only reads it. Missing or `null` numeric
//! fields coerce to zero so that a sparse bundle never fails to decode, while
//! values of the wrong type (e.g. a non-RFC 3339 timestamp) are rejected at
//! the boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, VigilError};

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Top-level bundle ──────────────────────────────────────────

/// All behavioral signals known about one subject at one point in time.
///
/// Maps are ordered so that the JSON serialization is canonical, which the
/// cache key derivation relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    /// Standard deviation used to normalise `deviation`. Defaults to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_anomaly: Option<FrequencyAnomaly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_anomaly: Option<TimeAnomaly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_anomaly: Option<LocationAnomaly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_anomaly: Option<VelocityAnomaly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_anomaly: Option<DeviceAnomaly>,
    /// Reference instant for recency calculations. When absent, the newest
    /// `last_seen` in the device history is used instead of the wall clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnomaly {
    #[serde(default, deserialize_with = "null_as_default")]
    pub observed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expected: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAnomaly {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_hour: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unusual_hours: Option<Vec<u8>>,
    /// Historical activity count per hour of day.
    #[serde(default, deserialize_with = "null_as_default")]
    pub historical_pattern: BTreeMap<u8, f64>,
}

impl TimeAnomaly {
    /// The bundle's unusual hours, or `fallback` when none were supplied.
    pub fn unusual_hours_or<'a>(&'a self, fallback: &'a [u8]) -> &'a [u8] {
        self.unusual_hours.as_deref().unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationAnomaly {
    /// Chronologically ordered observations.
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_sequence: Vec<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Reported accuracy radius in meters.
    #[serde(default, deserialize_with = "null_as_default")]
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityAnomaly {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_velocity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub baseline_velocity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFingerprint {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalDevice {
    #[serde(flatten)]
    pub fingerprint: DeviceFingerprint,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceAnomaly {
    #[serde(default)]
    pub device_fingerprint: Option<DeviceFingerprint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub historical_devices: Vec<HistoricalDevice>,
}

// ── Decoding and validation ───────────────────────────────────

impl PatternData {
    /// Decode a JSON bundle and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: PatternData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Decode an already-parsed JSON value and validate it.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let data: PatternData = serde_json::from_value(value)?;
        data.validate()?;
        Ok(data)
    }

    /// Reject values that decode but cannot be scored meaningfully.
    pub fn validate(&self) -> Result<()> {
        finite_opt("deviation", self.deviation)?;
        finite_opt("std_dev", self.std_dev)?;

        if let Some(freq) = &self.frequency_anomaly {
            finite("frequency_anomaly.expected", freq.expected)?;
        }

        if let Some(time) = &self.time_anomaly {
            hour_in_range("time_anomaly.current_hour", time.current_hour)?;
            for &hour in time.unusual_hours.iter().flatten() {
                hour_in_range("time_anomaly.unusual_hours", hour)?;
            }
            for (&hour, &count) in &time.historical_pattern {
                hour_in_range("time_anomaly.historical_pattern", hour)?;
                finite("time_anomaly.historical_pattern", count)?;
                if count < 0.0 {
                    return Err(VigilError::validation(
                        "time_anomaly.historical_pattern",
                        format!("count for hour {hour} must not be negative, got {count}"),
                    ));
                }
            }
        }

        if let Some(location) = &self.location_anomaly {
            for (i, point) in location.location_sequence.iter().enumerate() {
                point.validate(i)?;
            }
        }

        if let Some(velocity) = &self.velocity_anomaly {
            finite("velocity_anomaly.current_velocity", velocity.current_velocity)?;
            finite("velocity_anomaly.baseline_velocity", velocity.baseline_velocity)?;
        }

        Ok(())
    }

    /// Instant that device recency is measured against.
    pub fn reference_instant(&self) -> Option<DateTime<Utc>> {
        self.observed_at.or_else(|| {
            self.device_anomaly
                .as_ref()?
                .historical_devices
                .iter()
                .filter_map(|d| d.last_seen)
                .max()
        })
    }
}

impl GeoPoint {
    fn validate(&self, index: usize) -> Result<()> {
        let field = format!("location_anomaly.location_sequence[{index}]");
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(VigilError::validation(
                field,
                format!("latitude {} outside [-90, 90]", self.latitude),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(VigilError::validation(
                field,
                format!("longitude {} outside [-180, 180]", self.longitude),
            ));
        }
        if !self.accuracy.is_finite() || self.accuracy < 0.0 {
            return Err(VigilError::validation(
                field,
                format!("accuracy must be a non-negative number, got {}", self.accuracy),
            ));
        }
        Ok(())
    }
}

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(VigilError::validation(field, format!("expected a finite number, got {value}")))
    }
}

fn finite_opt(field: &str, value: Option<f64>) -> Result<()> {
    value.map_or(Ok(()), |v| finite(field, v))
}

fn hour_in_range(field: &str, hour: u8) -> Result<()> {
    if hour <= 23 {
        Ok(())
    } else {
        Err(VigilError::validation(field, format!("hour {hour} outside 0..=23")))
    }
}
