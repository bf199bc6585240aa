// src/waveform/traits.rs
//! Consumer-facing callback traits of the waveform engine

use crate::waveform::types::{ChannelSet, VitalTargets};

/// Cycle-boundary hooks, invoked once per cardiac wrap
///
/// The hooks receive the engine's live targets so a consumer can apply its own slow
/// drift without holding a reference back into the engine. They are not invoked while
/// the active rhythm has no measurable rate (asystole, flutter, fibrillation).
pub trait CycleObserver {
    fn on_pressure_cycle(&mut self, _vitals: &mut VitalTargets) {}

    fn on_co2_respiration_cycle(&mut self, _vitals: &mut VitalTargets) {}

    fn on_o2_cycle(&mut self, _vitals: &mut VitalTargets) {}

    fn on_heart_cycle(&mut self, _vitals: &mut VitalTargets) {}

    /// The set of displayed channels changed
    fn on_channels_changed(&mut self, _channels: ChannelSet) {}
}

/// Edge-triggered peak hooks, invoked at most once per excursion
pub trait PeakObserver {
    /// The ECG crossed its beat threshold
    fn on_cardiac_peak(&mut self) {}

    /// The plethysmograph crossed its pulse threshold
    fn on_peripheral_pulse_peak(&mut self) {}

    fn on_channels_changed(&mut self, _channels: ChannelSet) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CycleObserver for NoopObserver {}

impl PeakObserver for NoopObserver {}

impl<T: CycleObserver + ?Sized> CycleObserver for &mut T {
    fn on_pressure_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_pressure_cycle(vitals)
    }

    fn on_co2_respiration_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_co2_respiration_cycle(vitals)
    }

    fn on_o2_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_o2_cycle(vitals)
    }

    fn on_heart_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_heart_cycle(vitals)
    }

    fn on_channels_changed(&mut self, channels: ChannelSet) {
        (**self).on_channels_changed(channels)
    }
}

impl<T: PeakObserver + ?Sized> PeakObserver for &mut T {
    fn on_cardiac_peak(&mut self) {
        (**self).on_cardiac_peak()
    }

    fn on_peripheral_pulse_peak(&mut self) {
        (**self).on_peripheral_pulse_peak()
    }

    fn on_channels_changed(&mut self, channels: ChannelSet) {
        (**self).on_channels_changed(channels)
    }
}

impl<T: CycleObserver + ?Sized> CycleObserver for Box<T> {
    fn on_pressure_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_pressure_cycle(vitals)
    }

    fn on_co2_respiration_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_co2_respiration_cycle(vitals)
    }

    fn on_o2_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_o2_cycle(vitals)
    }

    fn on_heart_cycle(&mut self, vitals: &mut VitalTargets) {
        (**self).on_heart_cycle(vitals)
    }

    fn on_channels_changed(&mut self, channels: ChannelSet) {
        (**self).on_channels_changed(channels)
    }
}

impl<T: PeakObserver + ?Sized> PeakObserver for Box<T> {
    fn on_cardiac_peak(&mut self) {
        (**self).on_cardiac_peak()
    }

    fn on_peripheral_pulse_peak(&mut self) {
        (**self).on_peripheral_pulse_peak()
    }

    fn on_channels_changed(&mut self, channels: ChannelSet) {
        (**self).on_channels_changed(channels)
    }
}
