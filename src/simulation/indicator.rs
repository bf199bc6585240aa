// src/simulation/indicator.rs
//! Beat indicator driven by peak notifications

use crate::waveform::traits::PeakObserver;
use crate::waveform::types::ChannelSet;

/// Source of the most recent beat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatSource {
    Cardiac,
    PeripheralPulse,
}

/// Counts beats for the heart symbol and beep
///
/// The ECG is the beat source while its channel is shown. Without an ECG the
/// plethysmograph pulse takes over, so the indicator keeps blinking on SpO2 alone.
#[derive(Debug, Clone)]
pub struct BeatIndicator {
    heart_active: bool,
    beats: u64,
    unacknowledged: u32,
    last_source: Option<BeatSource>,
}

impl BeatIndicator {
    pub fn new(heart_active: bool) -> Self {
        Self {
            heart_active,
            beats: 0,
            unacknowledged: 0,
            last_source: None,
        }
    }

    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn last_source(&self) -> Option<BeatSource> {
        self.last_source
    }

    /// Returns `true` once per batch of beats since the previous call
    pub fn take_beat(&mut self) -> bool {
        let pending = self.unacknowledged > 0;
        self.unacknowledged = 0;
        pending
    }

    fn record(&mut self, source: BeatSource) {
        self.beats += 1;
        self.unacknowledged += 1;
        self.last_source = Some(source);
    }
}

impl Default for BeatIndicator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PeakObserver for BeatIndicator {
    fn on_cardiac_peak(&mut self) {
        if self.heart_active {
            self.record(BeatSource::Cardiac);
        }
    }

    fn on_peripheral_pulse_peak(&mut self) {
        if !self.heart_active {
            self.record(BeatSource::PeripheralPulse);
        }
    }

    fn on_channels_changed(&mut self, channels: ChannelSet) {
        self.heart_active = channels.heart;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecg_is_preferred_source() {
        let mut indicator = BeatIndicator::new(true);
        indicator.on_peripheral_pulse_peak();
        assert_eq!(indicator.beats(), 0);
        indicator.on_cardiac_peak();
        assert_eq!(indicator.beats(), 1);
        assert_eq!(indicator.last_source(), Some(BeatSource::Cardiac));
    }

    #[test]
    fn test_pulse_takes_over_without_ecg() {
        let mut indicator = BeatIndicator::default();
        indicator.on_channels_changed(ChannelSet {
            heart: false,
            ..ChannelSet::all()
        });
        indicator.on_peripheral_pulse_peak();
        indicator.on_peripheral_pulse_peak();
        assert_eq!(indicator.beats(), 2);
        assert_eq!(indicator.last_source(), Some(BeatSource::PeripheralPulse));
    }

    #[test]
    fn test_take_beat_acknowledges() {
        let mut indicator = BeatIndicator::new(true);
        assert!(!indicator.take_beat());
        indicator.on_cardiac_peak();
        assert!(indicator.take_beat());
        assert!(!indicator.take_beat());
    }
}
