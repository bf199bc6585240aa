// src/waveform/tables.rs
//! Hand-authored waveform templates
//!
//! Each template is one cardiac (or respiratory) cycle of 100 control points. The
//! breakpoints below are calibrated against the reference monitor and must not be
//! re-derived: the segments are copied as-is, including the places where a later
//! segment overwrites the tail of an earlier one.

use crate::config::constants::waveform::TABLE_LENGTH;
use std::f64::consts::PI;

/// An immutable cycle template
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmTable {
    points: [f64; TABLE_LENGTH],
}

impl RhythmTable {
    fn zeroed() -> Self {
        Self {
            points: [0.0; TABLE_LENGTH],
        }
    }

    fn from_fn(f: impl Fn(usize) -> f64) -> Self {
        let mut table = Self::zeroed();
        for (k, point) in table.points.iter_mut().enumerate() {
            *point = f(k);
        }
        table
    }

    /// Writes `f(i)` for `i` in `1..=count` starting at index `start`
    fn arc(&mut self, start: usize, count: usize, f: impl Fn(f64) -> f64) -> &mut Self {
        for i in 1..=count {
            self.points[start + i - 1] = f(i as f64);
        }
        self
    }

    /// Linear ramp of `count` points starting at `start`, each `step` above its predecessor
    fn ramp(&mut self, start: usize, count: usize, step: f64) -> &mut Self {
        for k in start..start + count {
            self.points[k] = self.points[k - 1] + step;
        }
        self
    }

    fn set(&mut self, index: usize, value: f64) -> &mut Self {
        self.points[index] = value;
        self
    }

    /// Raw control point at an integer index
    #[inline]
    pub fn at(&self, index: usize) -> f64 {
        self.points[index]
    }

    /// Control point at the truncated position
    #[inline]
    pub fn at_truncated(&self, position: f64) -> f64 {
        self.points[position as usize]
    }

    /// Linearly interpolated value between the neighbouring control points
    #[inline]
    pub fn interpolate(&self, position: f64) -> f64 {
        let lower = position.floor();
        let upper = position.ceil();
        let low = self.points[lower as usize];
        if lower == upper {
            return low;
        }
        let high = self.points[upper as usize];
        low + (high - low) / (upper - lower) * (position - lower)
    }

    pub fn points(&self) -> &[f64; TABLE_LENGTH] {
        &self.points
    }
}

/// P wave and QRS complex shared by the sinus-derived templates
fn sinus_template() -> RhythmTable {
    let mut table = RhythmTable::zeroed();
    table
        .arc(27, 10, |i| 10.0 * (i * PI / 10.0).sin())
        .arc(49, 2, |i| -9.0 * (i * PI / 4.0).sin())
        .ramp(52, 12, 9.363636)
        .set(61, 93.0)
        .ramp(62, 4, -28.5)
        .arc(66, 2, |i| -20.0 * ((3.0 + i) * PI / 5.0).sin())
        .set(67, -1.2)
        .set(68, -1.0)
        .arc(81, 18, |i| 15.0 * (i * PI / 18.0).sin());
    table
}

fn paced_template() -> RhythmTable {
    let mut table = sinus_template();
    table.set(40, 80.0);
    table
}

fn left_bundle_branch_block_template() -> RhythmTable {
    let mut table = RhythmTable::zeroed();
    table
        .arc(27, 10, |i| 10.0 * (i * PI / 10.0).sin())
        .ramp(50, 3, 26.67)
        .ramp(53, 4, -2.5)
        .ramp(57, 6, 3.83)
        .ramp(63, 5, -18.6)
        .set(67, -1.2)
        .set(68, -1.0)
        .arc(72, 21, |i| -15.0 * (i * PI / 21.0).sin())
        .arc(93, 6, |i| 2.0 * (i * PI / 6.0).sin());
    table
}

fn st_elevation_template() -> RhythmTable {
    let mut table = RhythmTable::zeroed();
    table
        .arc(27, 10, |i| 10.0 * (i * PI / 10.0).sin())
        .arc(49, 2, |i| -9.0 * (i * PI / 4.0).sin())
        .ramp(52, 12, 9.363636)
        .set(61, 93.0)
        .ramp(62, 2, -28.5)
        .arc(64, 9, |_| 36.0)
        .arc(72, 21, |i| 15.0 * (i * PI / 21.0).sin() + 36.0)
        .ramp(93, 5, -6.0);
    table
}

fn pressure_template() -> RhythmTable {
    let mut table = RhythmTable::zeroed();
    table.arc(52, 48, |i| (i * PI / 48.0).sin());
    // Dicrotic run-off wraps around into the start of the next cycle
    for k in 0..45 {
        table.points[k] = 0.5 * ((45.0 + k as f64) * PI / 90.0).sin();
    }
    table
        .set(95, 0.38)
        .set(96, 0.41)
        .set(97, 0.43)
        .set(98, 0.45)
        .set(99, 0.47);
    table
}

fn spo2_template() -> RhythmTable {
    let mut table = RhythmTable::zeroed();
    for k in 0..30 {
        table.points[k] = (k as f64 * PI / 48.0).sin();
    }
    table.arc(30, 70, |i| {
        let decay = 0.9 * (-0.4 * (i - 1.0) * 2.0 * PI / 72.0).exp();
        if (25.0..=33.0).contains(&i) {
            decay * (1.0 + 0.005 * i)
        } else {
            decay
        }
    });
    table
}

fn co2_template() -> RhythmTable {
    let mut table = RhythmTable::zeroed();
    table
        .arc(44, 19, |i| i * 0.048)
        .arc(63, 28, |i| 0.9 + i * 0.003)
        .arc(91, 9, |i| 1.0 - i / 9.0);
    table
}

/// Every template the engine samples from, built once per engine
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformTables {
    pub sinus: RhythmTable,
    pub paced: RhythmTable,
    pub left_bundle_branch_block: RhythmTable,
    pub st_elevation: RhythmTable,
    pub ventricular_flutter: RhythmTable,
    pub ventricular_fibrillation: RhythmTable,
    pub cpr: RhythmTable,
    pub asystole: RhythmTable,
    /// Normalized arterial pressure pulse in `[0, 1]`
    pub pressure: RhythmTable,
    /// Normalized plethysmograph pulse
    pub spo2: RhythmTable,
    /// Normalized capnogram of one breath
    pub co2: RhythmTable,
}

impl WaveformTables {
    pub fn build() -> Self {
        Self {
            sinus: sinus_template(),
            paced: paced_template(),
            left_bundle_branch_block: left_bundle_branch_block_template(),
            st_elevation: st_elevation_template(),
            ventricular_flutter: RhythmTable::from_fn(|k| {
                (2.0 * PI * k as f64 / 12.35).sin() * 50.0 + 40.0
            }),
            ventricular_fibrillation: RhythmTable::from_fn(|k| {
                (2.0 * PI * k as f64 / 9.1).sin() * 10.0 + 5.0
            }),
            cpr: RhythmTable::from_fn(|k| (2.0 * PI * k as f64 / 33.0).sin() * 40.0 + 30.0),
            asystole: RhythmTable::from_fn(|k| (2.0 * PI * k as f64 / 99.0).sin() * 2.0),
            pressure: pressure_template(),
            spo2: spo2_template(),
            co2: co2_template(),
        }
    }
}

impl Default for WaveformTables {
    fn default() -> Self {
        Self::build()
    }
}
