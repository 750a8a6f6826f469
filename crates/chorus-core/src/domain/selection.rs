//! Baseline/effective bookkeeping for a chorus under construction.
//!
//! The baseline is what the user entered and is authoritative. The
//! effective list is derived from it with [`apply_adjustments`] after every
//! mutation, so `effective().len() == baseline().len()` always holds.
//!
//! A selection belongs to a single caller context; sharing it between
//! threads needs external synchronisation.

use super::adjust::{Tuning, apply_adjustments};
use super::profile::{RATE_RANGE, VoiceProfile, clamp_f64};

/// A chorus selection: baseline profiles, global sliders, effective profiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChorusSelection {
    baseline: Vec<VoiceProfile>,
    tuning: Tuning,
    effective: Vec<VoiceProfile>,
}

impl ChorusSelection {
    /// Create a selection from a baseline and slider values.
    pub fn new(baseline: Vec<VoiceProfile>, tuning: Tuning) -> Self {
        let mut selection = Self {
            baseline,
            tuning,
            effective: Vec::new(),
        };
        selection.recompute();
        selection
    }

    /// The user-entered profiles.
    pub fn baseline(&self) -> &[VoiceProfile] {
        &self.baseline
    }

    /// The profiles a chorus should actually speak with.
    pub fn effective(&self) -> &[VoiceProfile] {
        &self.effective
    }

    /// Current slider values.
    pub const fn tuning(&self) -> Tuning {
        self.tuning
    }

    /// Number of voices in the selection.
    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    /// Whether the selection has no voices.
    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    /// Change the global sliders.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
        self.recompute();
    }

    /// Append a voice. Duplicate ids are always allowed.
    pub fn add(&mut self, profile: VoiceProfile) {
        self.baseline.push(profile);
        self.recompute();
    }

    /// Replace the row at `index`. Returns `false` if the index is out of range.
    pub fn replace(&mut self, index: usize, profile: VoiceProfile) -> bool {
        let Some(slot) = self.baseline.get_mut(index) else {
            return false;
        };
        *slot = profile;
        self.recompute();
        true
    }

    /// Remove the row at `index`, returning its baseline profile.
    pub fn remove(&mut self, index: usize) -> Option<VoiceProfile> {
        if index >= self.baseline.len() {
            return None;
        }
        let removed = self.baseline.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Set the baseline rate of the row at `index` (clamped to `[0, 1]`).
    ///
    /// Used to store a calibrated rate. Returns `false` if the index is out
    /// of range.
    pub fn set_rate(&mut self, index: usize, rate: f64) -> bool {
        let Some(slot) = self.baseline.get_mut(index) else {
            return false;
        };
        slot.rate = clamp_f64(rate, &RATE_RANGE);
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        self.effective = apply_adjustments(
            &self.baseline,
            self.tuning.rate_scale,
            self.tuning.pitch_offset,
        );
    }
}
