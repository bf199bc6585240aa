// src/waveform/latch.rs
//! Edge-triggered threshold latch

/// Fires once when a signal rises to a threshold and re-arms once it falls back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeakLatch {
    latched: bool,
}

impl PeakLatch {
    pub const fn new() -> Self {
        Self { latched: false }
    }

    /// Feed one sample; returns `true` on the rising edge only
    #[inline]
    pub fn update(&mut self, value: f64, threshold: f64) -> bool {
        if !self.latched {
            if value >= threshold {
                self.latched = true;
                return true;
            }
        } else if value <= threshold {
            self.latched = false;
        }
        false
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }
}
