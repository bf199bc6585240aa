// src/simulation/drift.rs
//! Beat-to-beat physiological variation of the vital targets
//!
//! A monitor attached to a real patient never shows perfectly constant numbers. Every
//! cycle boundary each channel counts one more cycle; once enough cycles have passed and
//! a uniform draw clears the threshold, the live target jumps to the nominal value plus
//! truncated Gaussian noise. The numeric readout follows one cycle later.

use crate::config::constants::vitals::MAX_O2;
use crate::config::DriftConfig;
use crate::waveform::traits::CycleObserver;
use crate::waveform::types::{ChannelSet, VitalTargets};
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::PI;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CycleCounters {
    heart: u32,
    pressure: u32,
    o2: u32,
    co2: u32,
    respiration: u32,
}

/// Cycle observer applying Gaussian drift around a nominal baseline
pub struct VitalDrift<R = StdRng> {
    config: DriftConfig,
    baseline: VitalTargets,
    displayed: VitalTargets,
    channels: ChannelSet,
    respiration_active: bool,
    counters: CycleCounters,
    rng: R,
}

impl<R: Rng> VitalDrift<R> {
    pub fn new(config: &DriftConfig, baseline: VitalTargets, rng: R) -> Self {
        Self {
            config: config.clone(),
            baseline,
            displayed: baseline,
            channels: ChannelSet::all(),
            respiration_active: true,
            counters: CycleCounters::default(),
            rng,
        }
    }

    /// Replace the nominal values the drift varies around
    ///
    /// The engine's live targets are not touched; callers set both.
    pub fn set_baseline(&mut self, baseline: VitalTargets) {
        self.baseline = baseline;
        self.displayed = baseline;
        self.counters = CycleCounters::default();
    }

    pub fn baseline(&self) -> &VitalTargets {
        &self.baseline
    }

    /// Values of the numeric readout, lagging the live targets by one cycle
    pub fn displayed(&self) -> &VitalTargets {
        &self.displayed
    }

    pub fn set_respiration_active(&mut self, active: bool) {
        self.respiration_active = active;
    }

    /// Standard normal sample (Box-Muller)
    fn gaussian(&mut self) -> f64 {
        // 1 - u keeps the logarithm finite
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Truncated Gaussian offset, as the readout shows whole units
    fn offset(&mut self, multiplier: f64) -> f64 {
        (self.gaussian() * multiplier).trunc()
    }

    fn should_vary(&mut self, counter: u32, nominal_rate: f64, divisor: f64) -> bool {
        // Draw first so the generator advances once per counted cycle
        let draw = self.rng.gen::<f64>();
        draw > self.config.variation_threshold
            && f64::from(counter) > (nominal_rate / divisor).trunc()
    }
}

impl<R: Rng> CycleObserver for VitalDrift<R> {
    fn on_pressure_cycle(&mut self, vitals: &mut VitalTargets) {
        if !self.config.enabled || !self.channels.pressure {
            return;
        }
        self.counters.pressure += 1;
        if self.should_vary(
            self.counters.pressure,
            self.baseline.heart_rate,
            self.config.heart_divisor,
        ) {
            let multiplier = self.config.pressure_multiplier;
            vitals.diastolic = self.baseline.diastolic + self.offset(multiplier);
            vitals.systolic = self.baseline.systolic + self.offset(multiplier);
            self.counters.pressure = 0;
            debug!(systolic = vitals.systolic, diastolic = vitals.diastolic, "pressure drift");
        }
        if self.counters.pressure == 1 {
            self.displayed.systolic = vitals.systolic;
            self.displayed.diastolic = vitals.diastolic;
        }
    }

    fn on_co2_respiration_cycle(&mut self, vitals: &mut VitalTargets) {
        if self.config.enabled && self.channels.co2 {
            self.counters.co2 += 1;
            if self.should_vary(
                self.counters.co2,
                self.baseline.respiration_rate,
                self.config.respiration_divisor,
            ) {
                vitals.co2 = self.baseline.co2 + self.offset(self.config.co2_multiplier);
                self.counters.co2 = 0;
                debug!(co2 = vitals.co2, "co2 drift");
            }
            if self.counters.co2 == 1 {
                self.displayed.co2 = vitals.co2;
            }
        }

        if self.config.enabled && self.respiration_active && self.baseline.respiration_rate > 0.0 {
            self.counters.respiration += 1;
            if self.should_vary(
                self.counters.respiration,
                self.baseline.respiration_rate,
                self.config.respiration_divisor,
            ) {
                let varied = self.baseline.respiration_rate
                    + self.offset(self.config.respiration_multiplier);
                vitals.respiration_rate = varied.max(0.0);
                self.counters.respiration = 0;
                debug!(respiration_rate = vitals.respiration_rate, "respiration drift");
            }
            if self.counters.respiration == 1 {
                self.displayed.respiration_rate = vitals.respiration_rate;
            }
        }
    }

    fn on_o2_cycle(&mut self, vitals: &mut VitalTargets) {
        if !self.config.enabled || !self.channels.o2 {
            return;
        }
        self.counters.o2 += 1;
        if self.should_vary(
            self.counters.o2,
            self.baseline.heart_rate,
            self.config.heart_divisor,
        ) {
            let varied = self.baseline.o2 + self.offset(self.config.o2_multiplier);
            vitals.o2 = varied.min(MAX_O2);
            self.counters.o2 = 0;
            debug!(o2 = vitals.o2, "o2 drift");
        }
        if self.counters.o2 == 1 {
            self.displayed.o2 = vitals.o2;
        }
    }

    fn on_heart_cycle(&mut self, vitals: &mut VitalTargets) {
        if !self.config.enabled || !self.channels.heart {
            return;
        }
        self.counters.heart += 1;
        if self.should_vary(
            self.counters.heart,
            self.baseline.heart_rate,
            self.config.heart_divisor,
        ) {
            vitals.heart_rate = self.baseline.heart_rate + self.offset(self.config.heart_multiplier);
            self.counters.heart = 0;
            debug!(heart_rate = vitals.heart_rate, "heart rate drift");
        }
        if self.counters.heart == 1 {
            self.displayed.heart_rate = vitals.heart_rate;
        }
    }

    fn on_channels_changed(&mut self, channels: ChannelSet) {
        self.channels = channels;
    }
}
