// src/simulation/driver.rs
//! Fixed-step driver
//!
//! Wall-clock time is accumulated and converted into whole engine ticks. Each tick
//! samples every enabled channel and then advances the phase clocks, so the first
//! frame shows the engine's initial phase. Leftover time below one tick carries over
//! to the next pump.

use crate::config::constants::timing::NANOSECONDS_PER_MILLISECOND;
use crate::config::{DriverConfig, SystemConfig};
use crate::simulation::drift::VitalDrift;
use crate::simulation::indicator::BeatIndicator;
use crate::utils::time::{MonotonicTimeProvider, TimeProvider};
use crate::waveform::engine::WaveformEngine;
use crate::waveform::traits::{CycleObserver, NoopObserver, PeakObserver};
use crate::waveform::types::{Channel, ChannelSet, SampleFrame, VitalTargets};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Engine with drift and beat indicator, as assembled by [`MonitorDriver::from_config`]
pub type PatientMonitor<T = MonotonicTimeProvider> =
    MonitorDriver<VitalDrift<StdRng>, BeatIndicator, StdRng, T>;

/// Converts elapsed wall-clock time into sampled engine ticks
pub struct MonitorDriver<C = NoopObserver, P = NoopObserver, R = StdRng, T = MonotonicTimeProvider>
{
    engine: WaveformEngine<C, P, R>,
    clock: T,
    tick_interval_ms: f64,
    channels: ChannelSet,
    accumulated_ms: f64,
    last_nanos: Option<u64>,
    ticks: u64,
}

impl<T: TimeProvider> PatientMonitor<T> {
    /// Assemble engine, drift and indicator from one configuration
    ///
    /// With a configured seed the drift generator is derived from it, so the whole
    /// monitor is reproducible.
    pub fn from_config(config: &SystemConfig, clock: T) -> Self {
        let (engine_rng, drift_rng) = match config.engine.rng_seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_entropy(), StdRng::from_entropy()),
        };
        let drift = VitalDrift::new(&config.drift, config.engine.vitals, drift_rng);
        let indicator = BeatIndicator::new(config.driver.channels.heart);
        let engine = WaveformEngine::with_parts(&config.engine, drift, indicator, engine_rng);
        MonitorDriver::new(engine, clock, &config.driver)
    }

    /// Set the nominal vitals on the engine and on the drift baseline
    pub fn set_nominal_vitals(&mut self, vitals: VitalTargets) {
        self.engine.set_vitals(vitals);
        self.engine.cycle_observer_mut().set_baseline(vitals);
    }

    pub fn displayed_vitals(&self) -> &VitalTargets {
        self.engine.cycle_observer().displayed()
    }

    pub fn indicator_mut(&mut self) -> &mut BeatIndicator {
        self.engine.peak_observer_mut()
    }
}

impl<C, P, R, T> MonitorDriver<C, P, R, T>
where
    C: CycleObserver,
    P: PeakObserver,
    R: Rng,
    T: TimeProvider,
{
    pub fn new(engine: WaveformEngine<C, P, R>, clock: T, config: &DriverConfig) -> Self {
        let mut driver = Self {
            engine,
            clock,
            tick_interval_ms: config.tick_interval_ms,
            channels: config.channels,
            accumulated_ms: 0.0,
            last_nanos: None,
            ticks: 0,
        };
        driver.notify_channels();
        driver
    }

    /// Emit one frame per elapsed tick into `frames`; returns the number emitted
    ///
    /// The first call only records the current time.
    pub fn pump(&mut self, frames: &mut Vec<SampleFrame>) -> usize {
        let now = self.clock.now_nanos();
        let Some(last) = self.last_nanos.replace(now) else {
            trace!("driver clock primed");
            return 0;
        };
        self.accumulated_ms += now.saturating_sub(last) as f64 / NANOSECONDS_PER_MILLISECOND;

        let mut produced = 0;
        while self.accumulated_ms > self.tick_interval_ms {
            frames.push(self.step());
            self.accumulated_ms -= self.tick_interval_ms;
            produced += 1;
        }
        produced
    }

    /// Sample then advance once, independent of the clock
    pub fn step(&mut self) -> SampleFrame {
        let frame = self.engine.sample_frame(self.channels);
        self.engine.advance();
        self.ticks += 1;
        frame
    }

    /// Forget the last timestamp, e.g. after the simulation was paused
    pub fn reset_clock(&mut self) {
        self.last_nanos = None;
        self.accumulated_ms = 0.0;
    }

    pub fn set_channel(&mut self, channel: Channel, enabled: bool) {
        self.channels.set(channel, enabled);
        debug!(?channel, enabled, "channel toggled");
        self.notify_channels();
    }

    fn notify_channels(&mut self) {
        let channels = self.channels;
        CycleObserver::on_channels_changed(self.engine.cycle_observer_mut(), channels);
        PeakObserver::on_channels_changed(self.engine.peak_observer_mut(), channels);
    }
}

impl<C, P, R, T> MonitorDriver<C, P, R, T> {
    pub fn channels(&self) -> ChannelSet {
        self.channels
    }

    pub fn tick_interval_ms(&self) -> f64 {
        self.tick_interval_ms
    }

    /// Ticks emitted since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn engine(&self) -> &WaveformEngine<C, P, R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut WaveformEngine<C, P, R> {
        &mut self.engine
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }
}
