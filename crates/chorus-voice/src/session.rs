//! Chorus session: the caller-side context tying selection, chorus and
//! calibration together.
//!
//! The session owns the baseline/effective [`ChorusSelection`], a [`Chorus`]
//! for playback, a [`ClipPlayer`] for one-shot clips, and the cancellation
//! token of the calibration in flight. All methods take `&self`, so an
//! `Arc<ChorusSession>` can be stopped from a signal handler while a chorus
//! or calibration is running.
//!
//! With [`ChorusSession::with_cancel_token`] a single token drives all
//! three: cancelling it stops the chorus, ends the calibration and fails
//! every pending clip waiter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chorus_core::{
    CalibrationObserver, CalibrationSettings, ChorusSelection, EngineFactory, NoopObserver,
    seed_engine_profile, tuned_profile, validate_calibration_settings,
};
use tokio_util::sync::CancellationToken;

use crate::calibrator::{CalibrationResult, TempoCalibrator};
use crate::chorus::{Chorus, ChorusReport};
use crate::clip::{ClipPlayer, NoopClipDriver};
use crate::error::VoiceError;
use crate::waiters::WaiterPolicy;

/// Owns the chorus selection and drives choruses, calibrations and clips
/// for it.
pub struct ChorusSession {
    factory: Arc<dyn EngineFactory>,
    parent: Option<CancellationToken>,
    chorus: Chorus,
    clips: ClipPlayer,
    settings: CalibrationSettings,
    observer: Arc<dyn CalibrationObserver>,
    selection: Mutex<ChorusSelection>,
    calibration: Mutex<Option<(u64, CancellationToken)>>,
    next_calibration: AtomicU64,
    last_chorus: Mutex<Option<Duration>>,
}

impl ChorusSession {
    /// Create a session with an empty selection.
    ///
    /// The clip player starts on a no-op driver whose waiters resolve as
    /// soon as they are registered; see [`with_clip_player`](Self::with_clip_player).
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        settings: CalibrationSettings,
    ) -> Result<Self, VoiceError> {
        validate_calibration_settings(&settings)?;
        Ok(Self {
            chorus: Chorus::new(Arc::clone(&factory)),
            clips: ClipPlayer::new(Arc::new(NoopClipDriver), WaiterPolicy::ResumeOnRegister),
            factory,
            parent: None,
            settings,
            observer: Arc::new(NoopObserver),
            selection: Mutex::new(ChorusSelection::default()),
            calibration: Mutex::new(None),
            next_calibration: AtomicU64::new(0),
            last_chorus: Mutex::new(None),
        })
    }

    /// Start from `selection` instead of an empty one.
    #[must_use]
    pub fn with_selection(mut self, selection: ChorusSelection) -> Self {
        self.selection = Mutex::new(selection);
        self
    }

    /// Derive every chorus run, calibration and clip from `token`.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.chorus = Chorus::new(Arc::clone(&self.factory)).with_cancel_token(token.clone());
        self.clips = self.clips.with_cancel_token(token.child_token());
        self.parent = Some(token);
        self
    }

    /// Replace the clip player. It inherits the session's cancel token.
    #[must_use]
    pub fn with_clip_player(mut self, player: ClipPlayer) -> Self {
        self.clips = match &self.parent {
            Some(token) => player.with_cancel_token(token.child_token()),
            None => player,
        };
        self
    }

    /// Report calibration progress to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CalibrationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Snapshot of the current selection.
    pub fn selection(&self) -> ChorusSelection {
        lock(&self.selection).clone()
    }

    /// Mutate the selection in place.
    pub fn edit_selection<R>(&self, edit: impl FnOnce(&mut ChorusSelection) -> R) -> R {
        edit(&mut lock(&self.selection))
    }

    /// Wall time of the last completed chorus.
    pub fn last_chorus_duration(&self) -> Option<Duration> {
        *lock(&self.last_chorus)
    }

    /// The session's clip player.
    pub fn clips(&self) -> &ClipPlayer {
        &self.clips
    }

    /// Whether a chorus is running. Clips are reported by [`clips`](Self::clips).
    pub fn is_playing(&self) -> bool {
        self.chorus.is_running()
    }

    /// Whether a calibration is in progress.
    pub fn is_calibrating(&self) -> bool {
        lock(&self.calibration).is_some()
    }

    /// Speak `text` with the effective profiles.
    pub async fn start_chorus(&self, text: &str) -> ChorusReport {
        let profiles = lock(&self.selection).effective().to_vec();
        let report = self.chorus.speak_all(text, &profiles).await;
        *lock(&self.last_chorus) = Some(report.elapsed);
        report
    }

    /// Calibrate the baseline voice at `index` and write the tuned profile
    /// back into that row.
    ///
    /// The calibration runs on a fresh engine seeded with the row's
    /// profile. The row is only updated if it still holds the same voice
    /// when calibration ends.
    pub async fn calibrate(
        &self,
        index: usize,
        phrase: &str,
        target_seconds: f64,
    ) -> Result<CalibrationResult, VoiceError> {
        let profile = lock(&self.selection)
            .baseline()
            .get(index)
            .cloned()
            .ok_or(VoiceError::NoSuchVoice(index))?;

        let engine = self.factory.make_engine();
        seed_engine_profile(engine.as_ref(), &profile);

        let run = self.next_calibration.fetch_add(1, Ordering::Relaxed);
        let token = self
            .parent
            .as_ref()
            .map_or_else(CancellationToken::new, CancellationToken::child_token);
        if let Some((_, previous)) = lock(&self.calibration).replace((run, token.clone())) {
            tracing::debug!("Cancelling previous calibration");
            previous.cancel();
        }

        let calibrator = TempoCalibrator::new(self.settings)?
            .with_cancel_token(token.clone())
            .with_observer(Arc::clone(&self.observer));
        let outcome = calibrator
            .fit_rate(engine.as_ref(), &profile.id, phrase, target_seconds)
            .await;

        {
            let mut slot = lock(&self.calibration);
            if slot.as_ref().is_some_and(|(current, _)| *current == run) {
                *slot = None;
            }
        }
        let result = outcome?;

        let tuned = tuned_profile(engine.as_ref(), &profile.id);
        self.edit_selection(|selection| {
            if selection.baseline().get(index).is_some_and(|p| p.id == profile.id) {
                selection.replace(index, tuned);
            } else {
                tracing::warn!(index, voice = %profile.id, "Row changed during calibration; not updating");
            }
        });
        Ok(result)
    }

    /// Cancel any calibration, stop the chorus and stop the clip. Safe to
    /// call when idle.
    pub fn stop_all(&self) {
        if let Some((_, token)) = lock(&self.calibration).take() {
            token.cancel();
        }
        self.chorus.stop();
        self.clips.stop_clip();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
