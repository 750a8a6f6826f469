//! One-shot clip playback with interruption handling.
//!
//! [`ClipPlayer`] plays a prepared audio clip through a [`ClipDriver`] and
//! parks the caller on a [`ClipWaiter`](crate::waiters::ClipWaiter) until
//! the driver reports completion, the clip is stopped, or the audio session
//! takes it away.
//!
//! Session events arrive over a [`PlaybackEvents`] channel. The player keeps
//! its interruption state in an explicit [`ClipSessionState`] record and
//! runs one observer task per subscription; [`ClipPlayer::unsubscribe`] ends
//! it, and dropping the player aborts it.
//!
//! A player built [`with_cancel_token`](ClipPlayer::with_cancel_token) stops
//! its clip and fails every pending waiter with `Stopped` once the token
//! fires. After that it refuses to play.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chorus_core::{ClipError, PlaybackEvent, PlaybackEvents, RouteChangeReason, VoiceEngine};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::VoiceError;
use crate::waiters::{ClipWaiterRegistry, WaiterPolicy};

// ── Driver port ────────────────────────────────────────────────────

/// The platform player a clip is handed to.
///
/// Completion is reported back by calling [`ClipPlayer::finish_clip`].
pub trait ClipDriver: Send + Sync {
    /// Load `path` with `gain_db` of boost, replacing any previous clip.
    fn load(&self, path: &Path, gain_db: f32) -> anyhow::Result<()>;

    /// Start (or restart) the loaded clip.
    fn play(&self) -> anyhow::Result<()>;

    /// Stop playback. Safe to call when idle.
    fn stop(&self);
}

/// A driver that accepts everything and plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClipDriver;

impl ClipDriver for NoopClipDriver {
    fn load(&self, _path: &Path, _gain_db: f32) -> anyhow::Result<()> {
        Ok(())
    }

    fn play(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn stop(&self) {}
}

// ── State ──────────────────────────────────────────────────────────

/// A clip ready to play.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedClip {
    /// Audio file handed to the driver.
    pub path: PathBuf,
    /// Playback gain in decibels.
    pub gain_db: f32,
}

/// Interruption bookkeeping for one player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipSessionState {
    /// Loaded clip, if any.
    pub prepared: Option<PreparedClip>,

    /// A clip is currently playing.
    pub playing: bool,

    /// An interruption has begun and not yet ended.
    pub was_interrupted: bool,

    /// A clip was playing when the current interruption began.
    pub was_playing_clip: bool,
}

struct Shared {
    driver: Arc<dyn ClipDriver>,
    waiters: ClipWaiterRegistry,
    state: Mutex<ClipSessionState>,
    speech: Option<Arc<dyn VoiceEngine>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ClipSessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) {
        self.state().playing = false;
        self.driver.stop();
        self.waiters.clear();
    }

    fn handle_event(&self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::InterruptionBegan => {
                let was_playing = {
                    let mut state = self.state();
                    state.was_interrupted = true;
                    state.was_playing_clip = state.playing;
                    state.playing = false;
                    state.was_playing_clip
                };
                tracing::info!(was_playing, "Audio interruption began");
                if was_playing {
                    self.driver.stop();
                }
                if let Some(speech) = &self.speech {
                    speech.stop_all();
                }
                self.waiters.resolve_all(Err(ClipError::Interrupted));
            }
            PlaybackEvent::InterruptionEnded { should_resume } => {
                let resume = {
                    let mut state = self.state();
                    if !state.was_interrupted {
                        tracing::debug!("Interruption ended without one beginning; ignoring");
                        return;
                    }
                    let resume = should_resume && state.was_playing_clip;
                    state.was_interrupted = false;
                    state.was_playing_clip = false;
                    state.playing = resume;
                    resume
                };
                tracing::info!(should_resume, resume, "Audio interruption ended");
                if resume {
                    if let Err(e) = self.driver.play() {
                        tracing::warn!(error = %e, "Failed to resume clip after interruption");
                        self.state().playing = false;
                    }
                }
            }
            PlaybackEvent::RouteChanged {
                reason: RouteChangeReason::OldDeviceUnavailable,
            } => {
                let was_playing = std::mem::replace(&mut self.state().playing, false);
                if was_playing {
                    tracing::info!("Output device went away; stopping clip");
                    self.driver.stop();
                    self.waiters.resolve_all(Err(ClipError::RouteChanged));
                }
            }
            PlaybackEvent::RouteChanged { reason } => {
                tracing::debug!(?reason, "Ignoring route change");
            }
        }
    }
}

// ── Player ─────────────────────────────────────────────────────────

/// Plays one clip at a time and resolves its waiters.
pub struct ClipPlayer {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    observer: Mutex<Option<JoinHandle<()>>>,
}

impl ClipPlayer {
    /// Create a player over `driver` using the given waiter policy.
    pub fn new(driver: Arc<dyn ClipDriver>, policy: WaiterPolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                driver,
                waiters: ClipWaiterRegistry::new(policy),
                state: Mutex::new(ClipSessionState::default()),
                speech: None,
            }),
            cancel: CancellationToken::new(),
            observer: Mutex::new(None),
        }
    }

    /// Also silence `engine` when an interruption begins.
    ///
    /// Must be called before [`subscribe`](Self::subscribe).
    #[must_use]
    pub fn with_speech_engine(mut self, engine: Arc<dyn VoiceEngine>) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.speech = Some(engine);
        } else {
            tracing::warn!("Speech engine attached after subscribe; ignoring");
        }
        self
    }

    /// Stop playback and fail pending waiters when `token` is cancelled.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that stops this player when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Load a clip for the next [`play_clip`](Self::play_clip).
    pub fn prepare_clip(&self, path: impl Into<PathBuf>, gain_db: f32) -> Result<(), VoiceError> {
        let path = path.into();
        self.shared
            .driver
            .load(&path, gain_db)
            .map_err(|source| VoiceError::Driver {
                action: "load clip",
                source,
            })?;
        tracing::debug!(path = %path.display(), gain_db, "Clip prepared");
        self.shared.state().prepared = Some(PreparedClip { path, gain_db });
        Ok(())
    }

    /// Play the prepared clip and wait until it finishes or is cut short.
    pub async fn play_clip(&self) -> Result<(), VoiceError> {
        if self.shared.state().prepared.is_none() {
            return Err(VoiceError::NoClipPrepared);
        }
        if self.cancel.is_cancelled() {
            return Err(ClipError::Stopped.into());
        }

        // Register before starting the driver so an immediate completion
        // cannot slip past.
        let waiter = self.shared.waiters.register();
        // Without a completion signal the clip never counts as playing.
        self.shared.state().playing = self.shared.waiters.policy() == WaiterPolicy::DrainOnStop;

        if let Err(source) = self.shared.driver.play() {
            self.shared.state().playing = false;
            self.shared
                .waiters
                .resolve(waiter.id(), Err(ClipError::Stopped));
            return Err(VoiceError::Driver {
                action: "play clip",
                source,
            });
        }

        tokio::select! {
            biased;
            outcome = waiter.wait() => outcome?,
            () = self.cancel.cancelled() => {
                tracing::debug!("Clip cancelled");
                self.shared.stop();
                return Err(ClipError::Stopped.into());
            }
        }
        Ok(())
    }

    /// Driver callback: the clip played to the end.
    pub fn finish_clip(&self) {
        self.shared.state().playing = false;
        self.shared.waiters.resolve_all(Ok(()));
    }

    /// Stop playback and fail every pending waiter with `Stopped`.
    pub fn stop_clip(&self) {
        self.shared.stop();
    }

    /// Apply one session event directly.
    pub fn handle_event(&self, event: PlaybackEvent) {
        self.shared.handle_event(event);
    }

    /// Start observing `events`. Replaces any previous subscription.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self, events: &PlaybackEvents) {
        let mut rx = events.subscribe();
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        shared.stop();
                        break;
                    }
                    received = rx.recv() => received,
                };
                match received {
                    Ok(event) => shared.handle_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Playback event observer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        if let Some(old) = self.observer_slot().replace(handle) {
            old.abort();
        }
    }

    /// Stop observing session events.
    pub fn unsubscribe(&self) {
        if let Some(handle) = self.observer_slot().take() {
            handle.abort();
        }
    }

    /// Whether an observer task is still consuming session events.
    pub fn is_subscribed(&self) -> bool {
        self.observer_slot()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Whether the driver was told to play and has not finished or stopped.
    pub fn is_playing(&self) -> bool {
        self.shared.state().playing
    }

    /// Snapshot of the interruption bookkeeping.
    pub fn session_state(&self) -> ClipSessionState {
        self.shared.state().clone()
    }

    /// Callers of [`play_clip`](Self::play_clip) still waiting for an outcome.
    pub fn pending_waiters(&self) -> usize {
        self.shared.waiters.pending_count()
    }

    fn observer_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ClipPlayer {
    fn drop(&mut self) {
        self.unsubscribe();
        self.shared.waiters.clear();
    }
}
