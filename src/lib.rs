//! vitals-core: deterministic vital-sign waveform synthesis for patient-monitor simulators
//!
//! This library renders the curves a bedside monitor shows during resuscitation training:
//!
//! - ECG for eleven cardiac rhythms, from sinus rhythm to ventricular fibrillation
//! - Arterial blood pressure and plethysmograph curves synchronized to the ECG
//! - Capnography on an independent respiration clock
//! - Deferred rhythm changes and defibrillation
//! - Beat-to-beat drift of the vital targets and a fixed-step wall-clock driver
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vitals_core::config::EngineConfig;
//! use vitals_core::waveform::{RhythmVariant, WaveformEngine};
//!
//! let mut engine = WaveformEngine::new(&EngineConfig::default());
//! engine.request_rhythm(RhythmVariant::AbsoluteArrhythmia);
//!
//! for _ in 0..600 {
//!     let ecg = engine.sample_heart();
//!     let pressure = engine.sample_pressure();
//!     println!("{ecg:.1} {pressure:.1}");
//!     engine.advance();
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod simulation;
pub mod utils;
pub mod waveform;

// Re-export commonly used types for convenience
pub use config::{ConfigLoader, SystemConfig};
pub use error::{ConfigError, ValidationError};
pub use simulation::{BeatIndicator, MonitorDriver, PatientMonitor, VitalDrift};
pub use utils::time::TimeProvider;
pub use waveform::{
    CycleObserver, PeakObserver, RhythmVariant, SampleFrame, VitalTargets, WaveformEngine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Deterministic vital-sign waveform synthesis".to_string(),
        rhythms: RhythmVariant::ALL.len(),
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// Number of supported cardiac rhythms
    pub rhythms: usize,
}
