// tests/rhythm_scenarios.rs
//! End-to-end rhythm scenarios as they appear during a resuscitation exercise

use rand::rngs::StdRng;
use rand::SeedableRng;
use vitals_core::config::EngineConfig;
use vitals_core::waveform::{
    NoopObserver, PeakObserver, PerfusionPattern, RhythmVariant, VitalTargets, WaveformEngine,
};

#[derive(Default)]
struct PeakLog {
    cardiac: u32,
    pulse: u32,
}

impl PeakObserver for PeakLog {
    fn on_cardiac_peak(&mut self) {
        self.cardiac += 1;
    }

    fn on_peripheral_pulse_peak(&mut self) {
        self.pulse += 1;
    }
}

fn monitored(rhythm: RhythmVariant, vitals: VitalTargets, seed: u64) -> WaveformEngine<NoopObserver, PeakLog, StdRng> {
    let config = EngineConfig {
        initial_rhythm: rhythm,
        vitals,
        rng_seed: None,
    };
    WaveformEngine::with_parts(&config, NoopObserver, PeakLog::default(), StdRng::seed_from_u64(seed))
}

/// Largest ECG amplitude of each completed cycle
fn cycle_maxima<P: PeakObserver>(
    engine: &mut WaveformEngine<NoopObserver, P, StdRng>,
    cycles: usize,
) -> Vec<f64> {
    let mut maxima = Vec::with_capacity(cycles);
    let mut current = f64::MIN;
    while maxima.len() < cycles {
        current = current.max(engine.sample_heart());
        engine.sample_pressure();
        engine.sample_o2();
        if engine.advance().cardiac_wrapped {
            maxima.push(current);
            current = f64::MIN;
        }
    }
    maxima
}

#[test]
fn sinus_rhythm_one_beat_per_cycle() {
    let mut engine = monitored(RhythmVariant::Sinus, VitalTargets::default(), 1);
    let maxima = cycle_maxima(&mut engine, 10);
    assert!(maxima.iter().all(|&m| m > 100.0));
    assert_eq!(engine.peak_observer().cardiac, 10);
    assert_eq!(engine.peak_observer().pulse, 10);
}

#[test]
fn st_elevation_counts_r_and_t_wave() {
    let mut engine = monitored(RhythmVariant::StElevation, VitalTargets::default(), 1);
    cycle_maxima(&mut engine, 8);
    // The elevated T wave crosses the raised threshold after the plateau re-arms it
    assert_eq!(engine.peak_observer().cardiac, 16);
}

#[test]
fn av_block_drops_every_fourth_qrs() {
    let vitals = VitalTargets {
        heart_rate: 60.0,
        ..VitalTargets::default()
    };
    let mut engine = monitored(RhythmVariant::AvBlock, vitals, 1);
    assert_eq!(engine.av_block_counter(), 0);

    let maxima = cycle_maxima(&mut engine, 8);
    let dropped: Vec<usize> = maxima
        .iter()
        .enumerate()
        .filter(|(_, &m)| m < 50.0)
        .map(|(i, _)| i)
        .collect();
    // Counter values per cycle run 0, 1, 2, 3, 0, ...
    assert_eq!(dropped, vec![3, 7]);
    assert_eq!(engine.peak_observer().cardiac, 6);
}

#[test]
fn absolute_arrhythmia_mixes_early_and_regular_beats() {
    let mut engine = monitored(RhythmVariant::AbsoluteArrhythmia, VitalTargets::default(), 2024);
    let mut early = 0;
    let mut regular = 0;
    for _ in 0..40 {
        if engine.arrhythmia_draw().current < 0.5 {
            early += 1;
        } else {
            regular += 1;
        }
        while !engine.advance().cardiac_wrapped {
            let value = engine.sample_heart();
            assert!(value.is_finite());
        }
    }
    assert!(early > 0 && regular > 0, "early {} regular {}", early, regular);
}

#[test]
fn arrhythmia_noise_stays_small_outside_beats() {
    let mut engine = monitored(RhythmVariant::LeftBundleBranchBlockArrhythmia, VitalTargets::default(), 9);
    for _ in 0..2_000 {
        let index = engine.cardiac_index();
        let value = engine.sample_heart();
        if index > 20.0 && !(48.0..=68.0).contains(&index) {
            assert!(value.abs() <= 3.5, "index {} value {}", index, value);
        }
        engine.advance();
    }
}

#[test]
fn beatless_rhythms_raise_no_cardiac_peaks() {
    for rhythm in [
        RhythmVariant::VentricularFlutter,
        RhythmVariant::VentricularFibrillation,
        RhythmVariant::Cpr,
        RhythmVariant::Asystole,
    ] {
        let mut engine = monitored(rhythm, VitalTargets::default(), 4);
        for _ in 0..1_000 {
            engine.sample_heart();
            engine.advance();
        }
        assert_eq!(engine.peak_observer().cardiac, 0, "{:?}", rhythm);
    }
}

#[test]
fn cpr_produces_pulsatile_pressure() {
    let mut engine = monitored(RhythmVariant::Cpr, VitalTargets::default(), 4);
    let baseline = VitalTargets::default().diastolic * 0.55;
    let mut peak = baseline;
    for _ in 0..99 {
        peak = peak.max(engine.sample_pressure());
        assert!(engine.sample_o2() >= 0.0);
        engine.advance();
    }
    assert!(peak > baseline + 5.0);
}

#[test]
fn defibrillation_sequence() {
    let mut engine = monitored(RhythmVariant::VentricularFibrillation, VitalTargets::default(), 6);
    for _ in 0..150 {
        engine.sample_heart();
        engine.advance();
    }

    engine.shock();
    assert_eq!(engine.active_rhythm(), RhythmVariant::Asystole);
    for _ in 0..30 {
        assert!(engine.sample_heart().abs() <= 2.0);
        assert_eq!(engine.sample_o2(), 0.0);
        engine.advance();
    }

    // The instructor converts to sinus while the monitor shows the flat line
    engine.request_rhythm(RhythmVariant::Sinus);
    assert_eq!(engine.active_rhythm(), RhythmVariant::Sinus);
    assert_eq!(engine.cardiac_index(), 0.0);
    cycle_maxima(&mut engine, 3);
    assert_eq!(engine.peak_observer().cardiac, 3);
}

#[test]
fn unconverted_shock_resumes_previous_rhythm() {
    let mut engine = monitored(RhythmVariant::VentricularFlutter, VitalTargets::default(), 6);
    engine.shock();
    let mut ticks = 0;
    while !engine.advance().cardiac_wrapped {
        ticks += 1;
    }
    // 0.3 per tick through the flat line
    assert!((329..=330).contains(&ticks), "ticks {}", ticks);
    assert_eq!(engine.active_rhythm(), RhythmVariant::VentricularFlutter);
}

#[test]
fn cold_extremity_damps_pleth_but_keeps_pulse() {
    let vitals = VitalTargets {
        perfusion: PerfusionPattern::ColdExtremity,
        ..VitalTargets::default()
    };
    let mut engine = monitored(RhythmVariant::Sinus, vitals, 8);
    let mut highest: f64 = 0.0;
    for _ in 0..600 {
        highest = highest.max(engine.sample_o2());
        engine.advance();
    }
    assert!(highest <= 99.0 / 20.0 + 1e-9);
    assert!(engine.peak_observer().pulse > 0);
}

#[test]
fn weak_pulse_halves_amplitude() {
    let strong = VitalTargets {
        systolic: 60.0,
        diastolic: 40.0,
        ..VitalTargets::default()
    };
    let weak = VitalTargets {
        systolic: 50.0,
        diastolic: 30.0,
        ..VitalTargets::default()
    };
    let mut a = monitored(RhythmVariant::Sinus, strong, 1);
    let mut b = monitored(RhythmVariant::Sinus, weak, 1);
    a.seek_cardiac(75.0);
    b.seek_cardiac(75.0);
    let pulse_a = a.sample_pressure() - 40.0 * 0.55;
    let pulse_b = b.sample_pressure() - 30.0 * 0.55;
    assert!((pulse_b - pulse_a / 2.0).abs() < 1e-9);
}

#[test]
fn co2_follows_respiration_clock() {
    let vitals = VitalTargets {
        respiration_rate: 12.0,
        ..VitalTargets::default()
    };
    let mut engine = monitored(RhythmVariant::Sinus, vitals, 8);
    let mut breaths = 0;
    let mut maximum: f64 = 0.0;
    for _ in 0..1_000 {
        maximum = maximum.max(engine.sample_co2());
        if engine.advance().respiration_wrapped {
            breaths += 1;
        }
    }
    // 12/36 per tick over 1000 ticks
    assert_eq!(breaths, 3);
    assert!(maximum > 40.0 && maximum < 40.0 * 1.1 + 1e-9);
}
