// src/config/constants.rs
//! System-wide constants for the waveform engine and its surroundings

/// Waveform table and phase-clock constants
pub mod waveform {
    /// Number of control points in every waveform table
    pub const TABLE_LENGTH: usize = 100;
    /// Amount subtracted from a phase index when it wraps
    pub const WRAP_SPAN: f64 = (TABLE_LENGTH - 1) as f64;

    /// Heart rate at which one tick advances the phase by exactly 1.0
    pub const BASE_RATE: f64 = 36.0;
    /// Phase increment for mechanically paced rhythms (CPR, flutter, fibrillation)
    pub const MECHANICAL_INCREMENT: f64 = 1.0;
    /// Phase increment while the heart is asystolic
    pub const ASYSTOLE_INCREMENT: f64 = 0.3;

    /// Calibration factor of the ECG channel against the reference monitor
    pub const HEART_SCALE: f64 = 1.4;
    /// Pressure template scale applied to the pulse pressure and to the diastolic offset
    pub const PRESSURE_SCALE: f64 = 0.55;
    /// Capnography scale applied on top of the CO2 target
    pub const CO2_SCALE: f64 = 1.1;

    pub const HEART_PEAK_THRESHOLD: f64 = 50.0;
    pub const ST_ELEVATION_PEAK_THRESHOLD: f64 = 70.0;
    /// Fraction of the O2 target at which the peripheral pulse latch fires
    pub const O2_PEAK_FRACTION: f64 = 0.9;

    pub const PACEMAKER_CLAMP_THRESHOLD: f64 = 40.0;
    pub const PACEMAKER_PEAK: f64 = 98.0;
    /// The pacemaker latch re-arms once the cardiac index is back at or below this
    pub const PACEMAKER_REARM_INDEX: f64 = 10.0;

    /// Half-width of the fibrillatory baseline noise of the irregular rhythms
    pub const ATRIAL_NOISE_AMPLITUDE: f64 = 3.5;
    /// Half-width of the noise superimposed on ventricular fibrillation
    pub const VENTRICULAR_NOISE_AMPLITUDE: f64 = 3.0;
    /// Arrhythmia draws below this value select the early (shifted) beat
    pub const ARRHYTHMIA_SPLIT: f64 = 0.5;

    /// Per-cycle QRS delay of the AV-block rhythm, in table indices
    pub const AV_BLOCK_SHIFT: f64 = 6.0;
    /// Counter value of the cycle whose QRS is dropped
    pub const AV_BLOCK_DROPPED_CYCLE: u8 = 3;
    pub const AV_BLOCK_CYCLE_COUNT: u8 = 4;

    /// Residual SpO2 level shown while a beat is skipped
    pub const SKIPPED_BEAT_O2_LEVEL: f64 = 8.0;

    /// Systolic pressure at or below which the pressure curve is halved
    pub const WEAK_PULSE_SYSTOLIC: f64 = 50.0;
    /// Systolic pressure below which the SpO2 curve is damped
    pub const POOR_PERFUSION_SYSTOLIC: f64 = 70.0;
    pub const POOR_PERFUSION_DIVISOR: f64 = 20.0;
}

/// Fixed-step timing constants
pub mod timing {
    /// Simulation ticks per second of wall-clock time
    pub const TICKS_PER_SECOND: f64 = 60.0;
    /// Length of one fixed simulation step in milliseconds
    pub const DEFAULT_TICK_INTERVAL_MS: f64 = 1000.0 / TICKS_PER_SECOND;
    pub const MIN_TICK_INTERVAL_MS: f64 = 1.0;
    pub const MAX_TICK_INTERVAL_MS: f64 = 1000.0;

    pub const NANOSECONDS_PER_MILLISECOND: f64 = 1_000_000.0;
}

/// Render normalization divisors of the monitor screen
pub mod display {
    pub const HEART_DIVISOR: f64 = 250.0;
    pub const PRESSURE_DIVISOR: f64 = 170.0;
    pub const O2_DIVISOR: f64 = 250.0;
    pub const CO2_DIVISOR: f64 = 250.0;
}

/// Default vital values and plausible configuration ranges
pub mod vitals {
    pub const DEFAULT_HEART_RATE: f64 = 50.0;
    pub const DEFAULT_SYSTOLIC: f64 = 160.0;
    pub const DEFAULT_DIASTOLIC: f64 = 80.0;
    pub const DEFAULT_O2: f64 = 99.0;
    pub const DEFAULT_CO2: f64 = 40.0;
    pub const DEFAULT_RESPIRATION_RATE: f64 = 20.0;

    pub const MAX_HEART_RATE: f64 = 300.0;
    pub const MAX_PRESSURE: f64 = 300.0;
    pub const MAX_O2: f64 = 100.0;
    pub const MAX_CO2: f64 = 150.0;
    pub const MAX_RESPIRATION_RATE: f64 = 80.0;
}

/// Physiological drift constants
pub mod drift {
    /// A variation is only considered when a uniform draw exceeds this value
    pub const DEFAULT_VARIATION_THRESHOLD: f64 = 0.7;
    /// Heart rate divided by this gives the minimum beats between two variations
    pub const DEFAULT_HEART_DIVISOR: f64 = 10.0;
    /// Respiration rate divided by this gives the minimum cycles between two variations
    pub const DEFAULT_RESPIRATION_DIVISOR: f64 = 10.0;
    pub const DEFAULT_MULTIPLIER: f64 = 1.0;
}

/// Configuration file locations and environment conventions
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/local.toml";
    pub const USER_CONFIG_DIR: &str = ".vitals-core";
    pub const ENV_PREFIX: &str = "VITALS_";
}
