// src/waveform/sampling.rs
//! Per-channel samplers
//!
//! Every sampler reads the current phase without advancing it. Heart and O2 sampling
//! mutate peak latches (and the heart sampler draws noise), so they take `&mut self`;
//! the order in which channels are sampled within a tick does not matter.

use crate::config::constants::waveform::{
    ARRHYTHMIA_SPLIT, ATRIAL_NOISE_AMPLITUDE, AV_BLOCK_DROPPED_CYCLE, AV_BLOCK_SHIFT, CO2_SCALE,
    HEART_SCALE, O2_PEAK_FRACTION, PACEMAKER_CLAMP_THRESHOLD, PACEMAKER_PEAK,
    PACEMAKER_REARM_INDEX, POOR_PERFUSION_DIVISOR, PRESSURE_SCALE, SKIPPED_BEAT_O2_LEVEL,
    VENTRICULAR_NOISE_AMPLITUDE, WEAK_PULSE_SYSTOLIC, WRAP_SPAN,
};
use crate::waveform::engine::{ArrhythmiaDraw, WaveformEngine};
use crate::waveform::tables::RhythmTable;
use crate::waveform::traits::{CycleObserver, PeakObserver};
use crate::waveform::types::{ChannelSet, RhythmVariant, SampleFrame};
use rand::Rng;

// Table positions of the irregular-rhythm segments
const EARLY_BEAT_END: f64 = 20.0;
const EARLY_BEAT_OFFSET: f64 = 48.0;
const QRS_WINDOW_START: f64 = 48.0;
const QRS_WINDOW_END: f64 = 68.0;

const EARLY_PULSE_OFFSET: f64 = 52.0;
const EARLY_PULSE_CARRYOVER_END: f64 = 6.0;
const SKIPPED_PULSE_END: f64 = 50.0;
const AV_BLOCK_PULSE_DROP_START: f64 = 51.0;

const EARLY_PLETH_OFFSET: f64 = 63.0;
const EARLY_PLETH_START: f64 = 66.0;

// Mechanical pressure and pleth derived from the ECG of the beatless rhythms
const FLUTTER_PRESSURE_BASELINE: f64 = 40.0;
const FLUTTER_PRESSURE_DIVISOR: f64 = 35.0;
const FIBRILLATION_PRESSURE_BASELINE: f64 = 25.0;
const FIBRILLATION_PRESSURE_DIVISOR: f64 = 25.0;
const CPR_PRESSURE_DIVISOR: f64 = 10.0;
const CPR_O2_DIVISOR: f64 = 25.0;

#[inline]
fn heart_value(table: &RhythmTable, position: f64) -> f64 {
    table.interpolate(position) * HEART_SCALE
}

#[inline]
fn uniform_noise<R: Rng>(rng: &mut R, amplitude: f64) -> f64 {
    rng.gen::<f64>() * 2.0 * amplitude - amplitude
}

/// ECG of the irregular rhythms: an early beat, a regular beat or fibrillatory baseline
fn irregular_heart<R: Rng>(
    table: &RhythmTable,
    index: f64,
    draw: ArrhythmiaDraw,
    rng: &mut R,
) -> f64 {
    let early = draw.current < ARRHYTHMIA_SPLIT;
    if index <= EARLY_BEAT_END {
        if early {
            heart_value(table, index + EARLY_BEAT_OFFSET)
        } else {
            uniform_noise(rng, ATRIAL_NOISE_AMPLITUDE)
        }
    } else if (QRS_WINDOW_START..=QRS_WINDOW_END).contains(&index) {
        if early {
            uniform_noise(rng, ATRIAL_NOISE_AMPLITUDE)
        } else {
            heart_value(table, index)
        }
    } else {
        uniform_noise(rng, ATRIAL_NOISE_AMPLITUDE)
    }
}

/// ECG of the AV block: the QRS slides later each cycle and the fourth is dropped
fn av_block_heart(table: &RhythmTable, index: f64, counter: u8) -> f64 {
    let shift = f64::from(counter) * AV_BLOCK_SHIFT;
    // Tail of the previous cycle's delayed beat spilling over the wrap
    let carryover = (f64::from(counter) - 1.0) * AV_BLOCK_SHIFT;

    if index > QRS_WINDOW_START {
        if counter == AV_BLOCK_DROPPED_CYCLE {
            0.0
        } else {
            heart_value(table, index - shift)
        }
    } else if index < carryover {
        heart_value(table, index + WRAP_SPAN - carryover)
    } else {
        heart_value(table, index)
    }
}

impl<C, P, R> WaveformEngine<C, P, R>
where
    C: CycleObserver,
    P: PeakObserver,
    R: Rng,
{
    /// ECG sample in millivolt-like display units
    pub fn sample_heart(&mut self) -> f64 {
        let index = self.cardiac_index;
        let rhythm = self.rhythm.active;
        let tables = &self.tables;

        let value = match rhythm {
            RhythmVariant::Sinus => heart_value(&tables.sinus, index),
            RhythmVariant::LeftBundleBranchBlock => {
                heart_value(&tables.left_bundle_branch_block, index)
            }
            RhythmVariant::StElevation => heart_value(&tables.st_elevation, index),
            RhythmVariant::Paced => {
                let raw = heart_value(&tables.paced, index);
                self.clamp_pacemaker_spike(raw, index)
            }
            RhythmVariant::AbsoluteArrhythmia => {
                irregular_heart(&tables.sinus, index, self.draw, &mut self.rng)
            }
            RhythmVariant::LeftBundleBranchBlockArrhythmia => irregular_heart(
                &tables.left_bundle_branch_block,
                index,
                self.draw,
                &mut self.rng,
            ),
            RhythmVariant::AvBlock => av_block_heart(&tables.sinus, index, self.av_block_counter),
            RhythmVariant::VentricularFlutter => tables.ventricular_flutter.at_truncated(index),
            RhythmVariant::VentricularFibrillation => {
                tables.ventricular_fibrillation.at_truncated(index)
                    + uniform_noise(&mut self.rng, VENTRICULAR_NOISE_AMPLITUDE)
            }
            RhythmVariant::Cpr => tables.cpr.at_truncated(index),
            RhythmVariant::Asystole => tables.asystole.at_truncated(index),
        };

        if let Some(threshold) = rhythm.peak_threshold() {
            if self.heart_latch.update(value, threshold) {
                self.peak_observer.on_cardiac_peak();
            }
        }
        value
    }

    /// Flattens the paced QRS into one full-height spike per beat
    fn clamp_pacemaker_spike(&mut self, value: f64, index: f64) -> f64 {
        if !self.pacemaker_latched {
            if value >= PACEMAKER_CLAMP_THRESHOLD {
                self.pacemaker_latched = true;
                return PACEMAKER_PEAK;
            }
        } else if index <= PACEMAKER_REARM_INDEX {
            self.pacemaker_latched = false;
        }
        value
    }

    /// Arterial blood pressure sample in mmHg
    pub fn sample_pressure(&self) -> f64 {
        let index = self.cardiac_index;
        let draw = self.draw;
        let counter = self.av_block_counter;
        let tables = &self.tables;
        let pulse_at = |position: f64| {
            tables.pressure.interpolate(position)
                * PRESSURE_SCALE
                * (self.vitals.systolic - self.vitals.diastolic)
        };

        let pulse = match self.rhythm.active {
            RhythmVariant::Sinus
            | RhythmVariant::Paced
            | RhythmVariant::LeftBundleBranchBlock
            | RhythmVariant::StElevation => pulse_at(index),
            RhythmVariant::AbsoluteArrhythmia | RhythmVariant::LeftBundleBranchBlockArrhythmia => {
                if draw.current < ARRHYTHMIA_SPLIT {
                    if draw.previous >= ARRHYTHMIA_SPLIT && index < EARLY_PULSE_CARRYOVER_END {
                        pulse_at(index)
                    } else {
                        let mut shifted = index + EARLY_PULSE_OFFSET;
                        if shifted > WRAP_SPAN {
                            shifted -= WRAP_SPAN;
                        }
                        pulse_at(shifted)
                    }
                } else if draw.previous < ARRHYTHMIA_SPLIT && index < SKIPPED_PULSE_END {
                    0.0
                } else {
                    pulse_at(index)
                }
            }
            RhythmVariant::AvBlock => {
                let dropped = (counter == AV_BLOCK_DROPPED_CYCLE
                    && index > AV_BLOCK_PULSE_DROP_START)
                    || (counter == 0 && index < SKIPPED_PULSE_END);
                if dropped {
                    0.0
                } else {
                    pulse_at(index)
                }
            }
            RhythmVariant::VentricularFlutter => {
                ((heart_value(&tables.ventricular_flutter, index) - FLUTTER_PRESSURE_BASELINE)
                    / FLUTTER_PRESSURE_DIVISOR)
                    .abs()
            }
            RhythmVariant::VentricularFibrillation => {
                ((heart_value(&tables.ventricular_fibrillation, index)
                    - FIBRILLATION_PRESSURE_BASELINE)
                    / FIBRILLATION_PRESSURE_DIVISOR)
                    .abs()
            }
            RhythmVariant::Cpr => (heart_value(&tables.cpr, index) / CPR_PRESSURE_DIVISOR).abs(),
            RhythmVariant::Asystole => 0.0,
        };

        let pulse = if self.vitals.systolic <= WEAK_PULSE_SYSTOLIC {
            pulse / 2.0
        } else {
            pulse
        };
        pulse + self.vitals.diastolic * PRESSURE_SCALE
    }

    /// Plethysmograph sample scaled to the SpO2 target
    pub fn sample_o2(&mut self) -> f64 {
        let index = self.cardiac_index;
        let draw = self.draw;
        let target = self.vitals.o2;
        let spo2 = &self.tables.spo2;
        let pleth_at = |position: f64| spo2.interpolate(position) * target;

        let pulse = match self.rhythm.active {
            RhythmVariant::VentricularFlutter
            | RhythmVariant::VentricularFibrillation
            | RhythmVariant::Asystole => return 0.0,
            RhythmVariant::Cpr => (heart_value(&self.tables.cpr, index) / CPR_O2_DIVISOR).abs(),
            RhythmVariant::AbsoluteArrhythmia | RhythmVariant::LeftBundleBranchBlockArrhythmia => {
                if draw.previous >= ARRHYTHMIA_SPLIT {
                    if draw.current < ARRHYTHMIA_SPLIT && index > EARLY_PLETH_START {
                        pleth_at(index - EARLY_PLETH_OFFSET)
                    } else {
                        pleth_at(index)
                    }
                } else if draw.current >= ARRHYTHMIA_SPLIT && index > EARLY_PLETH_OFFSET {
                    SKIPPED_BEAT_O2_LEVEL
                } else {
                    let mut shifted = index - EARLY_PLETH_OFFSET;
                    if shifted < 0.0 {
                        shifted += WRAP_SPAN;
                    }
                    pleth_at(shifted)
                }
            }
            RhythmVariant::AvBlock => {
                if self.av_block_counter == 0 {
                    SKIPPED_BEAT_O2_LEVEL
                } else {
                    pleth_at(index)
                }
            }
            RhythmVariant::Sinus
            | RhythmVariant::Paced
            | RhythmVariant::LeftBundleBranchBlock
            | RhythmVariant::StElevation => pleth_at(index),
        };

        // Latch on the undamped pulse so a cold finger still reports its beats
        if self.o2_latch.update(pulse, target * O2_PEAK_FRACTION) {
            self.peak_observer.on_peripheral_pulse_peak();
        }

        if self.vitals.is_poorly_perfused() {
            pulse / POOR_PERFUSION_DIVISOR
        } else {
            pulse
        }
    }

    /// Capnogram sample on the respiration clock
    pub fn sample_co2(&self) -> f64 {
        if self.vitals.respiration_rate <= 0.0 {
            return 0.0;
        }
        self.tables.co2.interpolate(self.respiration_index) * self.vitals.co2 * CO2_SCALE
    }

    /// Sample the enabled channels; disabled ones report `0.0` and keep their latches idle
    pub fn sample_frame(&mut self, channels: ChannelSet) -> SampleFrame {
        SampleFrame {
            heart: if channels.heart { self.sample_heart() } else { 0.0 },
            pressure: if channels.pressure {
                self.sample_pressure()
            } else {
                0.0
            },
            o2: if channels.o2 { self.sample_o2() } else { 0.0 },
            co2: if channels.co2 { self.sample_co2() } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::waveform::traits::NoopObserver;
    use crate::waveform::types::{PerfusionPattern, VitalTargets};
    use rand::rngs::mock::StepRng;

    #[derive(Default)]
    struct PeakCounter {
        cardiac: u32,
        pulse: u32,
    }

    impl PeakObserver for PeakCounter {
        fn on_cardiac_peak(&mut self) {
            self.cardiac += 1;
        }
        fn on_peripheral_pulse_peak(&mut self) {
            self.pulse += 1;
        }
    }

    fn engine(
        rhythm: RhythmVariant,
        vitals: VitalTargets,
        rng: StepRng,
    ) -> WaveformEngine<NoopObserver, PeakCounter, StepRng> {
        let config = EngineConfig {
            initial_rhythm: rhythm,
            vitals,
            rng_seed: None,
        };
        WaveformEngine::with_parts(&config, NoopObserver, PeakCounter::default(), rng)
    }

    fn low_draw() -> StepRng {
        StepRng::new(0, 0)
    }

    fn high_draw() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn vitals(heart_rate: f64, systolic: f64, diastolic: f64) -> VitalTargets {
        VitalTargets {
            heart_rate,
            systolic,
            diastolic,
            ..VitalTargets::default()
        }
    }

    #[test]
    fn test_sinus_heart_at_r_peak() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 120.0, 80.0), low_draw());
        e.seek_cardiac(61.0);
        assert!((e.sample_heart() - 93.0 * 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_one_cardiac_peak_per_sinus_cycle() {
        let mut e = engine(RhythmVariant::Sinus, vitals(72.0, 120.0, 80.0), low_draw());
        let mut wraps = 0;
        while wraps < 5 {
            e.sample_heart();
            if e.advance().cardiac_wrapped {
                wraps += 1;
            }
        }
        let peaks = e.peak_observer().cardiac;
        assert!((4..=5).contains(&peaks), "peaks = {}", peaks);
    }

    #[test]
    fn test_st_elevation_t_wave_raises_second_peak() {
        let mut e = engine(RhythmVariant::StElevation, vitals(36.0, 120.0, 80.0), low_draw());
        let mut rising_edges = 0;
        let mut above = false;
        for _ in 0..99 {
            let value = e.sample_heart();
            if value >= 70.0 && !above {
                rising_edges += 1;
            }
            above = value >= 70.0;
            e.advance();
        }
        // R wave, then the elevated T wave at 51 * 1.4
        assert_eq!(rising_edges, 2);
        assert_eq!(e.peak_observer().cardiac, 2);
    }

    #[test]
    fn test_seek_to_last_control_point_samples_every_channel() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 120.0, 80.0), low_draw());
        e.seek_cardiac(99.0);
        e.seek_respiration(99.0);
        let frame = e.sample_frame(ChannelSet::all());
        assert!((frame.heart - e.tables().sinus.at(99) * 1.4).abs() < 1e-12);
        assert!(frame.pressure.is_finite());
        assert!(frame.o2.is_finite());
        assert!(frame.co2.is_finite());
    }

    #[test]
    #[should_panic(expected = "left the table")]
    fn test_seek_between_last_points_panics() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 120.0, 80.0), low_draw());
        e.seek_cardiac(99.5);
    }

    #[test]
    fn test_pulse_peak_at_nine_tenths_of_target() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 120.0, 80.0), low_draw());
        e.set_o2_target(95.0);
        let mut fired_at = None;
        for index in 0..=40 {
            e.seek_cardiac(index as f64);
            let value = e.sample_o2();
            if e.peak_observer().pulse == 1 && fired_at.is_none() {
                fired_at = Some(value);
            }
        }
        let value = fired_at.expect("pleth never crossed the threshold");
        assert!(value >= 85.5);
        assert_eq!(e.peak_observer().pulse, 1);
    }

    #[test]
    fn test_pressure_formula() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 120.0, 80.0), low_draw());
        e.seek_cardiac(75.0);
        let expected = 1.0 * 0.55 * 40.0 + 80.0 * 0.55;
        assert!((e.sample_pressure() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_weak_pulse_halves_pulse_pressure_only() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 50.0, 30.0), low_draw());
        e.seek_cardiac(75.0);
        let expected = 0.55 * 20.0 / 2.0 + 30.0 * 0.55;
        assert!((e.sample_pressure() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_asystole_pressure_is_diastolic_baseline() {
        let mut e = engine(RhythmVariant::Asystole, vitals(60.0, 120.0, 80.0), low_draw());
        e.seek_cardiac(60.0);
        assert!((e.sample_pressure() - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_o2_starts_at_zero_and_damps_on_cold_extremity() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 120.0, 80.0), low_draw());
        assert_eq!(e.sample_o2(), 0.0);

        e.seek_cardiac(20.0);
        let warm = e.sample_o2();
        e.set_perfusion_pattern(PerfusionPattern::ColdExtremity);
        let cold = e.sample_o2();
        assert!((cold - warm / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_o2_latch_ignores_perfusion_damping() {
        let mut v = vitals(60.0, 60.0, 40.0);
        v.perfusion = PerfusionPattern::ColdExtremity;
        let mut e = engine(RhythmVariant::Sinus, v, low_draw());
        e.seek_cardiac(24.0);
        e.sample_o2();
        assert_eq!(e.peak_observer().pulse, 1);
    }

    #[test]
    fn test_beatless_rhythms_have_no_pleth() {
        for rhythm in [
            RhythmVariant::VentricularFlutter,
            RhythmVariant::VentricularFibrillation,
            RhythmVariant::Asystole,
        ] {
            let mut e = engine(rhythm, VitalTargets::default(), low_draw());
            for _ in 0..200 {
                assert_eq!(e.sample_o2(), 0.0);
                e.advance();
            }
            assert_eq!(e.peak_observer().pulse, 0);
        }
    }

    #[test]
    fn test_co2_zero_without_breathing() {
        let mut v = VitalTargets::default();
        v.respiration_rate = 0.0;
        let mut e = engine(RhythmVariant::Sinus, v, low_draw());
        for _ in 0..50 {
            assert_eq!(e.sample_co2(), 0.0);
            e.advance();
        }
    }

    #[test]
    fn test_co2_plateau() {
        let mut e = engine(RhythmVariant::Sinus, VitalTargets::default(), low_draw());
        e.seek_respiration(90.0);
        let expected = (0.9 + 28.0 * 0.003) * 40.0 * 1.1;
        assert!((e.sample_co2() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_paced_spike_clamped_once_per_beat() {
        let mut e = engine(RhythmVariant::Paced, vitals(36.0, 120.0, 80.0), low_draw());
        let mut spikes = 0;
        for _ in 0..99 {
            if e.sample_heart() == 98.0 {
                spikes += 1;
            }
            e.advance();
        }
        assert_eq!(spikes, 1);
    }

    #[test]
    fn test_irregular_heart_regular_beat_in_qrs_window() {
        let mut e = engine(
            RhythmVariant::AbsoluteArrhythmia,
            vitals(60.0, 120.0, 80.0),
            high_draw(),
        );
        e.seek_cardiac(61.0);
        assert!((e.sample_heart() - 93.0 * 1.4).abs() < 1e-9);
        e.seek_cardiac(10.0);
        let noise = e.sample_heart();
        assert!(noise.abs() <= 3.5);
    }

    #[test]
    fn test_irregular_heart_early_beat() {
        let mut e = engine(
            RhythmVariant::AbsoluteArrhythmia,
            vitals(60.0, 120.0, 80.0),
            low_draw(),
        );
        e.seek_cardiac(13.0);
        assert!((e.sample_heart() - 93.0 * 1.4).abs() < 1e-9);
        e.seek_cardiac(61.0);
        assert!(e.sample_heart().abs() <= 3.5);
    }

    #[test]
    fn test_irregular_o2_skipped_beat_level() {
        let mut e = engine(
            RhythmVariant::AbsoluteArrhythmia,
            vitals(60.0, 120.0, 80.0),
            low_draw(),
        );
        // previous < 0.5 and current >= 0.5 selects the residual level past index 63
        e.draw = ArrhythmiaDraw {
            current: 0.9,
            previous: 0.1,
        };
        e.seek_cardiac(70.0);
        assert_eq!(e.sample_o2(), 8.0);
    }

    #[test]
    fn test_irregular_pressure_skipped_beat() {
        let mut e = engine(
            RhythmVariant::LeftBundleBranchBlockArrhythmia,
            vitals(60.0, 120.0, 80.0),
            low_draw(),
        );
        e.draw = ArrhythmiaDraw {
            current: 0.9,
            previous: 0.1,
        };
        e.seek_cardiac(30.0);
        assert!((e.sample_pressure() - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_av_block_drops_qrs_on_third_cycle() {
        let mut e = engine(RhythmVariant::AvBlock, vitals(60.0, 120.0, 80.0), low_draw());
        e.av_block_counter = 3;
        e.seek_cardiac(70.0);
        assert_eq!(e.sample_heart(), 0.0);
        assert!((e.sample_pressure() - 44.0).abs() < 1e-9);

        e.av_block_counter = 2;
        e.seek_cardiac(73.0);
        assert!((e.sample_heart() - 93.0 * 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_av_block_pleth_residual_on_counter_zero() {
        let mut e = engine(RhythmVariant::AvBlock, vitals(60.0, 120.0, 80.0), low_draw());
        e.av_block_counter = 0;
        e.seek_cardiac(40.0);
        assert_eq!(e.sample_o2(), 8.0);
    }

    #[test]
    fn test_fixed_rhythms_read_truncated_tables() {
        let mut e = engine(RhythmVariant::Cpr, VitalTargets::default(), low_draw());
        e.seek_cardiac(8.7);
        let expected = e.tables().cpr.at(8);
        assert_eq!(e.sample_heart(), expected);
    }

    #[test]
    fn test_fibrillation_noise_bounded() {
        let mut e = engine(
            RhythmVariant::VentricularFibrillation,
            VitalTargets::default(),
            StepRng::new(0, 0x0123_4567_89ab_cdef),
        );
        for _ in 0..300 {
            let index = e.cardiac_index() as usize;
            let base = e.tables().ventricular_fibrillation.at(index);
            let value = e.sample_heart();
            assert!((value - base).abs() <= 3.0 + 1e-9);
            e.advance();
        }
        assert_eq!(e.peak_observer().cardiac, 0);
    }

    #[test]
    fn test_disabled_channels_report_zero() {
        let mut e = engine(RhythmVariant::Sinus, vitals(60.0, 120.0, 80.0), low_draw());
        e.seek_cardiac(61.0);
        let frame = e.sample_frame(ChannelSet {
            heart: false,
            pressure: true,
            o2: false,
            co2: false,
        });
        assert_eq!(frame.heart, 0.0);
        assert_eq!(frame.o2, 0.0);
        assert!(frame.pressure > 0.0);
        assert_eq!(e.peak_observer().cardiac, 0);
    }
}
