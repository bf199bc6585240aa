// src/config/mod.rs
//! Configuration of the engine, the vital drift and the fixed-step driver

pub mod constants;
pub mod loader;

pub use crate::error::{ConfigError, ValidationError};
pub use constants::*;
pub use loader::ConfigLoader;

use crate::waveform::types::{ChannelSet, RhythmVariant, VitalTargets};
use serde::{Deserialize, Serialize};

/// Complete system configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SystemConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub drift: DriftConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

/// Initial state of the waveform engine
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "defaults::initial_rhythm")]
    pub initial_rhythm: RhythmVariant,

    #[serde(default)]
    pub vitals: VitalTargets,

    /// Fixed generator seed for reproducible traces; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

/// Per-beat physiological variation of the live targets
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DriftConfig {
    #[serde(default = "defaults::drift_enabled")]
    pub enabled: bool,

    /// Uniform draw that must be exceeded before a variation is applied
    #[serde(default = "defaults::variation_threshold")]
    pub variation_threshold: f64,

    /// Baseline heart rate divided by this gives the minimum beats between variations
    #[serde(default = "defaults::heart_divisor")]
    pub heart_divisor: f64,

    #[serde(default = "defaults::respiration_divisor")]
    pub respiration_divisor: f64,

    #[serde(default = "defaults::multiplier")]
    pub heart_multiplier: f64,

    #[serde(default = "defaults::multiplier")]
    pub pressure_multiplier: f64,

    #[serde(default = "defaults::multiplier")]
    pub o2_multiplier: f64,

    #[serde(default = "defaults::multiplier")]
    pub co2_multiplier: f64,

    #[serde(default = "defaults::multiplier")]
    pub respiration_multiplier: f64,
}

/// Fixed-step driver settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DriverConfig {
    #[serde(default = "defaults::tick_interval_ms")]
    pub tick_interval_ms: f64,

    #[serde(default)]
    pub channels: ChannelSet,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::{drift, timing};
    use crate::waveform::types::RhythmVariant;

    pub fn initial_rhythm() -> RhythmVariant { RhythmVariant::Sinus }

    pub fn drift_enabled() -> bool { true }
    pub fn variation_threshold() -> f64 { drift::DEFAULT_VARIATION_THRESHOLD }
    pub fn heart_divisor() -> f64 { drift::DEFAULT_HEART_DIVISOR }
    pub fn respiration_divisor() -> f64 { drift::DEFAULT_RESPIRATION_DIVISOR }
    pub fn multiplier() -> f64 { drift::DEFAULT_MULTIPLIER }

    pub fn tick_interval_ms() -> f64 { timing::DEFAULT_TICK_INTERVAL_MS }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_rhythm: defaults::initial_rhythm(),
            vitals: VitalTargets::default(),
            rng_seed: None,
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::drift_enabled(),
            variation_threshold: defaults::variation_threshold(),
            heart_divisor: defaults::heart_divisor(),
            respiration_divisor: defaults::respiration_divisor(),
            heart_multiplier: defaults::multiplier(),
            pressure_multiplier: defaults::multiplier(),
            o2_multiplier: defaults::multiplier(),
            co2_multiplier: defaults::multiplier(),
            respiration_multiplier: defaults::multiplier(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: defaults::tick_interval_ms(),
            channels: ChannelSet::all(),
        }
    }
}

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) {
    // NaN fails both comparisons and is reported too
    if !(value >= min && value <= max) {
        errors.push(ValidationError::out_of_range(field, value, min, max));
    }
}

impl SystemConfig {
    /// Check every range and cross-field constraint, collecting all failures
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let v = &self.engine.vitals;
        check_range(&mut errors, "engine.vitals.heart_rate", v.heart_rate, 0.0, vitals::MAX_HEART_RATE);
        check_range(&mut errors, "engine.vitals.systolic", v.systolic, 0.0, vitals::MAX_PRESSURE);
        check_range(&mut errors, "engine.vitals.diastolic", v.diastolic, 0.0, vitals::MAX_PRESSURE);
        check_range(&mut errors, "engine.vitals.o2", v.o2, 0.0, vitals::MAX_O2);
        check_range(&mut errors, "engine.vitals.co2", v.co2, 0.0, vitals::MAX_CO2);
        check_range(
            &mut errors,
            "engine.vitals.respiration_rate",
            v.respiration_rate,
            0.0,
            vitals::MAX_RESPIRATION_RATE,
        );
        if v.systolic < v.diastolic {
            errors.push(ValidationError::ConstraintViolation {
                fields: vec![
                    "engine.vitals.systolic".to_string(),
                    "engine.vitals.diastolic".to_string(),
                ],
                message: format!(
                    "systolic pressure {} is below diastolic pressure {}",
                    v.systolic, v.diastolic
                ),
            });
        }

        let d = &self.drift;
        check_range(&mut errors, "drift.variation_threshold", d.variation_threshold, 0.0, 1.0);
        check_range(&mut errors, "drift.heart_divisor", d.heart_divisor, 1.0, 100.0);
        check_range(&mut errors, "drift.respiration_divisor", d.respiration_divisor, 1.0, 100.0);
        for (field, value) in [
            ("drift.heart_multiplier", d.heart_multiplier),
            ("drift.pressure_multiplier", d.pressure_multiplier),
            ("drift.o2_multiplier", d.o2_multiplier),
            ("drift.co2_multiplier", d.co2_multiplier),
            ("drift.respiration_multiplier", d.respiration_multiplier),
        ] {
            check_range(&mut errors, field, value, 0.0, 10.0);
        }

        check_range(
            &mut errors,
            "driver.tick_interval_ms",
            self.driver.tick_interval_ms,
            timing::MIN_TICK_INTERVAL_MS,
            timing::MAX_TICK_INTERVAL_MS,
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get configuration summary
    pub fn summary(&self) -> ConfigSummary {
        let v = &self.engine.vitals;
        ConfigSummary {
            initial_rhythm: self.engine.initial_rhythm,
            heart_rate: v.heart_rate,
            pressure: format!("{}/{}", v.systolic, v.diastolic),
            drift_enabled: self.drift.enabled,
            tick_interval_ms: self.driver.tick_interval_ms,
            deterministic: self.engine.rng_seed.is_some(),
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub initial_rhythm: RhythmVariant,
    pub heart_rate: f64,
    pub pressure: String,
    pub drift_enabled: bool,
    pub tick_interval_ms: f64,
    pub deterministic: bool,
}
