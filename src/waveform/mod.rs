//! Table-driven vital-sign waveform synthesis
//!
//! - [`tables`]: the hand-authored cycle templates
//! - [`engine`]: phase clocks, rhythm transitions and defibrillation
//! - [`sampling`]: per-channel sample computation
//! - [`traits`]: cycle and peak callbacks for consumers

pub mod engine;
pub mod latch;
pub mod sampling;
pub mod tables;
pub mod traits;
pub mod types;

pub use engine::{ArrhythmiaDraw, PhaseAdvance, WaveformEngine};
pub use latch::PeakLatch;
pub use tables::{RhythmTable, WaveformTables};
pub use traits::{CycleObserver, NoopObserver, PeakObserver};
pub use types::{
    Channel, ChannelSet, PerfusionPattern, RhythmState, RhythmVariant, SampleFrame, VitalTargets,
};
