// src/waveform/types.rs
//! Core types shared by the waveform engine and its consumers

use crate::config::constants::{display, vitals, waveform};
use serde::{Deserialize, Serialize};

/// Cardiac rhythm rendered by the ECG channel
///
/// Every sampler matches on this enum exhaustively, so adding a rhythm forces each
/// channel to decide how it looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhythmVariant {
    /// Normal sinus rhythm
    #[default]
    Sinus,
    /// Sinus rhythm with a pacemaker spike ahead of the QRS complex
    Paced,
    /// Left bundle branch block
    LeftBundleBranchBlock,
    /// ST-elevation myocardial infarction
    StElevation,
    /// Absolute arrhythmia (atrial fibrillation) on the sinus template
    AbsoluteArrhythmia,
    /// Absolute arrhythmia on the left bundle branch block template
    LeftBundleBranchBlockArrhythmia,
    /// Second-degree AV block: QRS drifts later every cycle, every fourth beat is dropped
    AvBlock,
    VentricularFlutter,
    VentricularFibrillation,
    /// Chest compressions during resuscitation
    Cpr,
    Asystole,
}

impl RhythmVariant {
    /// All variants in declaration order
    pub const ALL: [RhythmVariant; 11] = [
        RhythmVariant::Sinus,
        RhythmVariant::Paced,
        RhythmVariant::LeftBundleBranchBlock,
        RhythmVariant::StElevation,
        RhythmVariant::AbsoluteArrhythmia,
        RhythmVariant::LeftBundleBranchBlockArrhythmia,
        RhythmVariant::AvBlock,
        RhythmVariant::VentricularFlutter,
        RhythmVariant::VentricularFibrillation,
        RhythmVariant::Cpr,
        RhythmVariant::Asystole,
    ];

    /// Rhythms whose beats are randomly inserted or omitted per cycle
    pub fn is_irregular(self) -> bool {
        matches!(
            self,
            RhythmVariant::AbsoluteArrhythmia | RhythmVariant::LeftBundleBranchBlockArrhythmia
        )
    }

    /// Rhythms without a measurable rate, for which no vital drift is applied
    pub fn suppresses_variation(self) -> bool {
        matches!(
            self,
            RhythmVariant::Asystole
                | RhythmVariant::VentricularFlutter
                | RhythmVariant::VentricularFibrillation
        )
    }

    /// Threshold of the cardiac peak latch, or `None` when the rhythm produces no beats
    pub fn peak_threshold(self) -> Option<f64> {
        match self {
            RhythmVariant::StElevation => Some(waveform::ST_ELEVATION_PEAK_THRESHOLD),
            RhythmVariant::Sinus
            | RhythmVariant::Paced
            | RhythmVariant::LeftBundleBranchBlock
            | RhythmVariant::AbsoluteArrhythmia
            | RhythmVariant::LeftBundleBranchBlockArrhythmia
            | RhythmVariant::AvBlock => Some(waveform::HEART_PEAK_THRESHOLD),
            RhythmVariant::VentricularFlutter
            | RhythmVariant::VentricularFibrillation
            | RhythmVariant::Cpr
            | RhythmVariant::Asystole => None,
        }
    }
}

/// Peripheral perfusion pattern of the SpO2 sensor site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerfusionPattern {
    #[default]
    Normal,
    /// Cold fingers: the plethysmograph amplitude collapses
    ColdExtremity,
}

/// Current vital targets, treated by the engine as ground truth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalTargets {
    /// Beats per minute
    pub heart_rate: f64,
    /// mmHg
    pub systolic: f64,
    /// mmHg
    pub diastolic: f64,
    /// SpO2 in percent
    pub o2: f64,
    /// End-tidal CO2 in mmHg
    pub co2: f64,
    /// Breaths per minute
    pub respiration_rate: f64,
    pub perfusion: PerfusionPattern,
}

impl Default for VitalTargets {
    fn default() -> Self {
        Self {
            heart_rate: vitals::DEFAULT_HEART_RATE,
            systolic: vitals::DEFAULT_SYSTOLIC,
            diastolic: vitals::DEFAULT_DIASTOLIC,
            o2: vitals::DEFAULT_O2,
            co2: vitals::DEFAULT_CO2,
            respiration_rate: vitals::DEFAULT_RESPIRATION_RATE,
            perfusion: PerfusionPattern::Normal,
        }
    }
}

impl VitalTargets {
    /// Whether the SpO2 curve is damped by poor peripheral perfusion
    pub fn is_poorly_perfused(&self) -> bool {
        self.systolic < waveform::POOR_PERFUSION_SYSTOLIC
            || self.perfusion == PerfusionPattern::ColdExtremity
    }
}

/// Active and pending rhythm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmState {
    pub active: RhythmVariant,
    pub pending: RhythmVariant,
}

impl RhythmState {
    pub fn new(rhythm: RhythmVariant) -> Self {
        Self {
            active: rhythm,
            pending: rhythm,
        }
    }
}

/// Waveform channels of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Heart,
    Pressure,
    O2,
    Co2,
}

/// Per-channel enable flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSet {
    pub heart: bool,
    pub pressure: bool,
    pub o2: bool,
    pub co2: bool,
}

impl ChannelSet {
    pub const fn all() -> Self {
        Self {
            heart: true,
            pressure: true,
            o2: true,
            co2: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            heart: false,
            pressure: false,
            o2: false,
            co2: false,
        }
    }

    pub fn is_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Heart => self.heart,
            Channel::Pressure => self.pressure,
            Channel::O2 => self.o2,
            Channel::Co2 => self.co2,
        }
    }

    pub fn set(&mut self, channel: Channel, enabled: bool) {
        match channel {
            Channel::Heart => self.heart = enabled,
            Channel::Pressure => self.pressure = enabled,
            Channel::O2 => self.o2 = enabled,
            Channel::Co2 => self.co2 = enabled,
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::all()
    }
}

/// One sample of every channel, in physical units
///
/// A disabled channel is reported as `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleFrame {
    pub heart: f64,
    pub pressure: f64,
    pub o2: f64,
    pub co2: f64,
}

impl SampleFrame {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Heart => self.heart,
            Channel::Pressure => self.pressure,
            Channel::O2 => self.o2,
            Channel::Co2 => self.co2,
        }
    }

    /// Scale each channel into the plotting range of the monitor trace
    pub fn normalized(&self) -> SampleFrame {
        SampleFrame {
            heart: self.heart / display::HEART_DIVISOR,
            pressure: self.pressure / display::PRESSURE_DIVISOR,
            o2: self.o2 / display::O2_DIVISOR,
            co2: self.co2 / display::CO2_DIVISOR,
        }
    }
}
