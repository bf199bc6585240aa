//! Monitor-side consumers of the waveform engine
//!
//! The engine itself knows nothing about wall-clock time, numeric readouts or beat
//! indicators. These live here and plug into the engine through its observer traits.

pub mod drift;
pub mod driver;
pub mod indicator;

pub use drift::VitalDrift;
pub use driver::{MonitorDriver, PatientMonitor};
pub use indicator::{BeatIndicator, BeatSource};
