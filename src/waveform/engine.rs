// src/waveform/engine.rs
//! Phase clocks, rhythm transitions and defibrillation
//!
//! The engine advances two phase clocks through 100-point templates: a cardiac clock
//! driving ECG, pressure and SpO2, and an independent respiration clock driving CO2.
//! A wrap subtracts the table span instead of resetting, so rate changes mid-cycle
//! never produce a visible jump. Sampling lives in [`super::sampling`].

use crate::config::constants::waveform::{
    ASYSTOLE_INCREMENT, AV_BLOCK_CYCLE_COUNT, BASE_RATE, MECHANICAL_INCREMENT, WRAP_SPAN,
};
use crate::config::EngineConfig;
use crate::waveform::latch::PeakLatch;
use crate::waveform::tables::WaveformTables;
use crate::waveform::traits::{CycleObserver, NoopObserver, PeakObserver};
use crate::waveform::types::{PerfusionPattern, RhythmState, RhythmVariant, VitalTargets};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

/// Per-cycle random draws of the irregular rhythms
///
/// A draw below 0.5 selects an early (shifted) beat, otherwise the beat lands at its
/// usual position. Pressure and SpO2 look at both the current and previous draw so the
/// mechanical pulse stays synchronized with the ECG across cycle boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrhythmiaDraw {
    pub current: f64,
    pub previous: f64,
}

impl Default for ArrhythmiaDraw {
    fn default() -> Self {
        Self {
            current: 1.0,
            previous: 1.0,
        }
    }
}

/// Which clocks wrapped during one [`WaveformEngine::advance`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseAdvance {
    pub cardiac_wrapped: bool,
    pub respiration_wrapped: bool,
}

/// Table-driven vital-sign waveform synthesizer
///
/// `C` receives cycle-boundary hooks, `P` receives peak notifications and `R` supplies
/// every random draw, so a fixed generator yields a reproducible trace.
pub struct WaveformEngine<C = NoopObserver, P = NoopObserver, R = StdRng> {
    pub(super) tables: WaveformTables,
    pub(super) vitals: VitalTargets,
    pub(super) rhythm: RhythmState,

    pub(super) cardiac_index: f64,
    pub(super) previous_cardiac_index: f64,
    pub(super) respiration_index: f64,

    pub(super) av_block_counter: u8,
    pub(super) draw: ArrhythmiaDraw,

    pub(super) heart_latch: PeakLatch,
    pub(super) o2_latch: PeakLatch,
    pub(super) pacemaker_latched: bool,

    pub(super) cycle_observer: C,
    pub(super) peak_observer: P,
    pub(super) rng: R,
}

impl WaveformEngine {
    /// Engine without observers, seeded from the configuration or from entropy
    pub fn new(config: &EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        WaveformEngine::with_parts(config, NoopObserver, NoopObserver, rng)
    }
}

impl Default for WaveformEngine {
    fn default() -> Self {
        WaveformEngine::new(&EngineConfig::default())
    }
}

impl<C, P, R> WaveformEngine<C, P, R>
where
    C: CycleObserver,
    P: PeakObserver,
    R: Rng,
{
    /// Build the tables and initialize every clock and latch
    pub fn with_parts(config: &EngineConfig, cycle_observer: C, peak_observer: P, rng: R) -> Self {
        let mut engine = Self {
            tables: WaveformTables::build(),
            vitals: config.vitals,
            rhythm: RhythmState::new(config.initial_rhythm),
            cardiac_index: 0.0,
            previous_cardiac_index: 0.0,
            respiration_index: 0.0,
            av_block_counter: 0,
            draw: ArrhythmiaDraw::default(),
            heart_latch: PeakLatch::new(),
            o2_latch: PeakLatch::new(),
            pacemaker_latched: false,
            cycle_observer,
            peak_observer,
            rng,
        };
        if engine.rhythm.active.is_irregular() {
            engine.redraw_arrhythmia();
        }
        debug!(rhythm = ?engine.rhythm.active, "waveform engine initialized");
        engine
    }

    /// Request a new rhythm
    ///
    /// The change takes effect at the next cardiac wrap so the current cycle completes.
    /// While the heart is asystolic there is no waveform to protect and the rhythm
    /// starts immediately from the beginning of both clocks.
    pub fn request_rhythm(&mut self, rhythm: RhythmVariant) {
        self.rhythm.pending = rhythm;
        if self.rhythm.active == RhythmVariant::Asystole {
            self.rhythm.active = rhythm;
            self.reset_phase();
            if rhythm.is_irregular() {
                self.redraw_arrhythmia();
            }
            debug!(?rhythm, "rhythm applied immediately from asystole");
        } else {
            debug!(?rhythm, active = ?self.rhythm.active, "rhythm change deferred to next cycle");
        }
    }

    /// Defibrillation: transient flatline, then the pre-shock rhythm on the next wrap
    pub fn shock(&mut self) {
        let resumed = self.rhythm.active;
        self.rhythm.pending = resumed;
        self.rhythm.active = RhythmVariant::Asystole;
        self.reset_phase();
        info!(?resumed, "defibrillation shock delivered");
    }

    pub fn set_heart_rate(&mut self, bpm: f64) {
        self.vitals.heart_rate = bpm;
    }

    pub fn set_pressure(&mut self, systolic: f64, diastolic: f64) {
        self.vitals.systolic = systolic;
        self.vitals.diastolic = diastolic;
    }

    pub fn set_perfusion_pattern(&mut self, pattern: PerfusionPattern) {
        self.vitals.perfusion = pattern;
    }

    pub fn set_o2_target(&mut self, percent: f64) {
        self.vitals.o2 = percent;
    }

    pub fn set_respiration_rate(&mut self, bpm: f64) {
        self.vitals.respiration_rate = bpm;
    }

    pub fn set_co2_target(&mut self, value: f64) {
        self.vitals.co2 = value;
    }

    /// Replace every vital target at once
    pub fn set_vitals(&mut self, vitals: VitalTargets) {
        self.vitals = vitals;
    }

    /// Advance both phase clocks by one fixed tick
    pub fn advance(&mut self) -> PhaseAdvance {
        self.previous_cardiac_index = self.cardiac_index;
        self.cardiac_index += self.cardiac_increment();
        self.respiration_index += self.vitals.respiration_rate / BASE_RATE;

        let mut outcome = PhaseAdvance::default();

        if self.cardiac_index > WRAP_SPAN {
            self.cardiac_index -= WRAP_SPAN;
            self.complete_cardiac_cycle();
            outcome.cardiac_wrapped = true;
        }

        if self.respiration_index > WRAP_SPAN {
            self.respiration_index -= WRAP_SPAN;
            trace!(index = self.respiration_index, "respiration cycle wrapped");
            outcome.respiration_wrapped = true;
        }

        assert_phase_in_range("cardiac", self.cardiac_index);
        assert_phase_in_range("respiration", self.respiration_index);
        outcome
    }

    fn cardiac_increment(&self) -> f64 {
        match self.rhythm.active {
            RhythmVariant::Cpr
            | RhythmVariant::VentricularFlutter
            | RhythmVariant::VentricularFibrillation => MECHANICAL_INCREMENT,
            RhythmVariant::Asystole => ASYSTOLE_INCREMENT,
            RhythmVariant::Sinus
            | RhythmVariant::Paced
            | RhythmVariant::LeftBundleBranchBlock
            | RhythmVariant::StElevation
            | RhythmVariant::AbsoluteArrhythmia
            | RhythmVariant::LeftBundleBranchBlockArrhythmia
            | RhythmVariant::AvBlock => self.vitals.heart_rate / BASE_RATE,
        }
    }

    fn complete_cardiac_cycle(&mut self) {
        if self.rhythm.active != self.rhythm.pending {
            debug!(from = ?self.rhythm.active, to = ?self.rhythm.pending, "rhythm committed at cycle boundary");
        }
        self.rhythm.active = self.rhythm.pending;
        self.av_block_counter = (self.av_block_counter + 1) % AV_BLOCK_CYCLE_COUNT;

        if self.rhythm.active.is_irregular() {
            self.redraw_arrhythmia();
        }

        trace!(
            index = self.cardiac_index,
            av_block_counter = self.av_block_counter,
            "cardiac cycle wrapped"
        );

        if !self.rhythm.active.suppresses_variation() {
            let vitals = &mut self.vitals;
            self.cycle_observer.on_pressure_cycle(vitals);
            self.cycle_observer.on_co2_respiration_cycle(vitals);
            self.cycle_observer.on_o2_cycle(vitals);
            self.cycle_observer.on_heart_cycle(vitals);
        }
    }

    fn redraw_arrhythmia(&mut self) {
        self.draw.previous = self.draw.current;
        self.draw.current = self.rng.gen::<f64>();
    }

    fn reset_phase(&mut self) {
        self.cardiac_index = 0.0;
        self.previous_cardiac_index = 0.0;
        self.respiration_index = 0.0;
    }

    /// Move the cardiac clock to an explicit position, e.g. to scrub a frozen trace
    ///
    /// # Panics
    /// Panics if `index` lies outside `0.0..=99.0`.
    pub fn seek_cardiac(&mut self, index: f64) {
        assert_phase_in_range("cardiac", index);
        self.previous_cardiac_index = self.cardiac_index;
        self.cardiac_index = index;
    }

    /// Move the respiration clock to an explicit position
    ///
    /// # Panics
    /// Panics if `index` lies outside `0.0..=99.0`.
    pub fn seek_respiration(&mut self, index: f64) {
        assert_phase_in_range("respiration", index);
        self.respiration_index = index;
    }
}

impl<C, P, R> WaveformEngine<C, P, R> {
    pub fn active_rhythm(&self) -> RhythmVariant {
        self.rhythm.active
    }

    pub fn pending_rhythm(&self) -> RhythmVariant {
        self.rhythm.pending
    }

    pub fn rhythm_state(&self) -> RhythmState {
        self.rhythm
    }

    pub fn cardiac_index(&self) -> f64 {
        self.cardiac_index
    }

    /// Cardiac index before the most recent advance
    pub fn previous_cardiac_index(&self) -> f64 {
        self.previous_cardiac_index
    }

    pub fn respiration_index(&self) -> f64 {
        self.respiration_index
    }

    pub fn av_block_counter(&self) -> u8 {
        self.av_block_counter
    }

    pub fn arrhythmia_draw(&self) -> ArrhythmiaDraw {
        self.draw
    }

    pub fn vitals(&self) -> &VitalTargets {
        &self.vitals
    }

    pub fn tables(&self) -> &WaveformTables {
        &self.tables
    }

    pub fn cycle_observer(&self) -> &C {
        &self.cycle_observer
    }

    pub fn cycle_observer_mut(&mut self) -> &mut C {
        &mut self.cycle_observer
    }

    pub fn peak_observer(&self) -> &P {
        &self.peak_observer
    }

    pub fn peak_observer_mut(&mut self) -> &mut P {
        &mut self.peak_observer
    }
}

/// A phase index outside the table is an arithmetic defect, never a runtime condition
#[inline]
fn assert_phase_in_range(clock: &str, index: f64) {
    assert!(
        (0.0..=WRAP_SPAN).contains(&index),
        "{} phase index {} left the table",
        clock,
        index
    );
}
