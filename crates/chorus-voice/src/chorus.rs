//! Chorus orchestrator: one engine per voice, all speaking at once.
//!
//! [`Chorus::speak_all`] builds a fresh engine for every profile through the
//! injected [`EngineFactory`], seeds it with that profile, and runs every
//! voice as its own task. The call returns only after every task has
//! finished, failed or been cancelled.
//!
//! ## Stopping
//!
//! Each run owns a [`CancellationToken`]. [`Chorus::stop`] cancels every
//! active run's token and also calls `stop_all` on each of its engines, so
//! audio goes quiet even before a task observes the cancellation. The same
//! happens when a parent token passed to [`Chorus::with_cancel_token`]
//! fires.
//!
//! Engines are never pooled. The engine set of a run belongs to that run
//! alone and is dropped when the run ends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chorus_core::{EngineError, EngineFactory, VoiceEngine, VoiceProfile, seed_engine_profile};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

// ── Reports ────────────────────────────────────────────────────────

/// How one voice's unit of work ended.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOutcome {
    /// The voice finished speaking.
    Spoke { seconds: f64 },
    /// The engine failed. Sibling voices are unaffected.
    Failed(EngineError),
    /// The run was stopped before this voice finished.
    Cancelled,
}

/// Result for one voice, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceReport {
    /// Position of the profile in the input slice.
    pub index: usize,
    pub voice_id: String,
    /// How this voice's utterance ended.
    pub outcome: VoiceOutcome,
}

/// Result of one [`Chorus::speak_all`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChorusReport {
    /// One entry per input profile, in input order.
    pub voices: Vec<VoiceReport>,
    /// Wall time from start until the last voice finished.
    pub elapsed: Duration,
    /// The run was stopped or its parent token fired.
    pub cancelled: bool,
}

impl ChorusReport {
    /// Voices that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&VoiceReport, &EngineError)> {
        self.voices.iter().filter_map(|v| match &v.outcome {
            VoiceOutcome::Failed(e) => Some((v, e)),
            _ => None,
        })
    }

    /// Every voice spoke to the end.
    pub fn all_spoke(&self) -> bool {
        self.voices
            .iter()
            .all(|v| matches!(v.outcome, VoiceOutcome::Spoke { .. }))
    }
}

// ── Orchestrator ───────────────────────────────────────────────────

struct ActiveRun {
    token: CancellationToken,
    engines: Vec<Arc<dyn VoiceEngine>>,
}

/// Runs a phrase across many voices concurrently.
pub struct Chorus {
    factory: Arc<dyn EngineFactory>,
    parent: Option<CancellationToken>,
    runs: Mutex<HashMap<u64, ActiveRun>>,
    next_run: AtomicU64,
}

impl Chorus {
    /// Create an idle chorus that builds one engine per voice from `factory`.
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            parent: None,
            runs: Mutex::new(HashMap::new()),
            next_run: AtomicU64::new(0),
        }
    }

    /// Derive every run's token from `token`, so cancelling it stops all runs.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.parent = Some(token);
        self
    }

    fn runs(&self) -> MutexGuard<'_, HashMap<u64, ActiveRun>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether any run is in progress.
    pub fn is_running(&self) -> bool {
        !self.runs().is_empty()
    }

    /// Number of [`speak_all`](Self::speak_all) calls still in progress.
    pub fn active_runs(&self) -> usize {
        self.runs().len()
    }

    /// Speak `text` with every profile at once and wait for all of them.
    ///
    /// Duplicate voice ids are allowed; each profile gets its own engine
    /// and its own entry in the report.
    pub async fn speak_all(&self, text: &str, profiles: &[VoiceProfile]) -> ChorusReport {
        let started = Instant::now();
        let run_id = self.next_run.fetch_add(1, Ordering::Relaxed);
        let token = self
            .parent
            .as_ref()
            .map_or_else(CancellationToken::new, CancellationToken::child_token);

        let engines: Vec<Arc<dyn VoiceEngine>> = profiles
            .iter()
            .map(|profile| {
                let engine = self.factory.make_engine();
                seed_engine_profile(engine.as_ref(), profile);
                engine
            })
            .collect();

        self.runs().insert(
            run_id,
            ActiveRun {
                token: token.clone(),
                engines: engines.clone(),
            },
        );
        let mut guard = RunGuard {
            chorus: self,
            run_id,
            finished: false,
        };

        tracing::info!(run = run_id, voices = profiles.len(), "Chorus started");

        let text: Arc<str> = Arc::from(text);
        let mut tasks = JoinSet::new();
        for (index, (engine, profile)) in engines.iter().zip(profiles).enumerate() {
            let engine = Arc::clone(engine);
            let token = token.clone();
            let text = Arc::clone(&text);
            let voice_id = profile.id.clone();
            tasks.spawn(async move {
                let outcome = tokio::select! {
                    biased;
                    () = token.cancelled() => VoiceOutcome::Cancelled,
                    result = engine.speak(&text, &voice_id) => match result {
                        Ok(seconds) => VoiceOutcome::Spoke { seconds },
                        Err(EngineError::Interrupted) if token.is_cancelled() => {
                            VoiceOutcome::Cancelled
                        }
                        Err(e) => VoiceOutcome::Failed(e),
                    },
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<VoiceOutcome>> = vec![None; profiles.len()];
        let mut silenced = false;
        loop {
            tokio::select! {
                biased;
                () = token.cancelled(), if !silenced => {
                    silenced = true;
                    tracing::debug!(run = run_id, "Chorus cancelled; silencing engines");
                    for engine in &engines {
                        engine.stop_all();
                    }
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((index, outcome))) => outcomes[index] = Some(outcome),
                    Some(Err(e)) => {
                        tracing::warn!(run = run_id, error = %e, "Chorus voice task ended abnormally");
                    }
                },
            }
        }
        guard.finished = true;
        drop(guard);

        let voices: Vec<VoiceReport> = profiles
            .iter()
            .zip(outcomes)
            .enumerate()
            .map(|(index, (profile, outcome))| VoiceReport {
                index,
                voice_id: profile.id.clone(),
                outcome: outcome.unwrap_or_else(|| {
                    VoiceOutcome::Failed(EngineError::Synthesis(
                        "voice task ended unexpectedly".to_string(),
                    ))
                }),
            })
            .collect();

        let report = ChorusReport {
            voices,
            elapsed: started.elapsed(),
            cancelled: token.is_cancelled(),
        };
        for (voice, error) in report.failures() {
            tracing::warn!(
                run = run_id,
                index = voice.index,
                voice = %voice.voice_id,
                error = %error,
                "Chorus voice failed"
            );
        }
        tracing::info!(
            run = run_id,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            cancelled = report.cancelled,
            "Chorus finished"
        );
        report
    }

    /// Stop every active run. A no-op when nothing is running.
    pub fn stop(&self) {
        let runs: Vec<(CancellationToken, Vec<Arc<dyn VoiceEngine>>)> = self
            .runs()
            .values()
            .map(|run| (run.token.clone(), run.engines.clone()))
            .collect();

        if runs.is_empty() {
            tracing::debug!("Chorus stop requested while idle");
            return;
        }

        tracing::info!(runs = runs.len(), "Stopping chorus");
        for (token, engines) in runs {
            token.cancel();
            for engine in engines {
                engine.stop_all();
            }
        }
    }
}

/// Removes a run from the active set, silencing its engines if the
/// `speak_all` future was dropped before finishing.
struct RunGuard<'a> {
    chorus: &'a Chorus,
    run_id: u64,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let Some(run) = self.chorus.runs().remove(&self.run_id) else {
            return;
        };
        if !self.finished {
            run.token.cancel();
            for engine in &run.engines {
                engine.stop_all();
            }
        }
    }
}
