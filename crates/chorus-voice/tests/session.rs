//! ChorusSession: selection, calibration write-back and stop.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chorus_core::{CalibrationSettings, ChorusSelection, ClipError, Tuning};
use chorus_voice::{
    CalibrationStop, CancellationToken, ChorusSession, ClipPlayer, SimulatedConfig,
    SimulatedEngineFactory, VoiceError, WaiterPolicy,
};
use common::{FakeDriver, FakeFactory, Speech, profile};

fn session(factory: Arc<FakeFactory>) -> ChorusSession {
    ChorusSession::new(factory, CalibrationSettings::default()).unwrap()
}

#[tokio::test]
async fn chorus_uses_the_effective_profiles() {
    let factory = FakeFactory::uniform(Speech::Fixed(1.0));
    let session = session(factory.clone()).with_selection(ChorusSelection::new(
        vec![profile("v.a", 0.5)],
        Tuning::new(2.0, 0.0),
    ));

    let report = session.start_chorus("hello").await;

    assert!(report.all_spoke());
    let engine = &factory.engines()[0];
    assert_eq!(engine.spoken_rates(), vec![1.0]);
    assert!(session.last_chorus_duration().is_some());
}

#[tokio::test]
async fn calibration_writes_the_tuned_rate_back() {
    let factory = FakeFactory::uniform(Speech::PhraseOverRate { length: 3.0 });
    let session = session(factory).with_selection(ChorusSelection::new(
        vec![profile("v.a", 0.2), profile("v.b", 0.5)],
        Tuning::NEUTRAL,
    ));

    let result = session.calibrate(1, "phrase", 5.0).await.unwrap();

    assert_eq!(result.stop, CalibrationStop::Converged);
    let selection = session.selection();
    assert!((selection.baseline()[1].rate - 0.6).abs() < 1e-9);
    assert!((selection.effective()[1].rate - 0.6).abs() < 1e-9);
    assert!((selection.baseline()[0].rate - 0.2).abs() < f64::EPSILON);
    assert!(!session.is_calibrating());
}

#[tokio::test]
async fn calibrating_a_missing_row_fails() {
    let session = session(FakeFactory::uniform(Speech::Fixed(1.0)));
    assert!(matches!(
        session.calibrate(3, "phrase", 5.0).await,
        Err(VoiceError::NoSuchVoice(3))
    ));
}

#[tokio::test]
async fn invalid_target_is_reported() {
    let session = session(FakeFactory::uniform(Speech::Fixed(1.0)))
        .with_selection(ChorusSelection::new(vec![profile("v.a", 0.5)], Tuning::NEUTRAL));
    assert!(matches!(
        session.calibrate(0, "phrase", -1.0).await,
        Err(VoiceError::Settings(_))
    ));
    assert!(!session.is_calibrating());
}

#[tokio::test(start_paused = true)]
async fn stop_all_cancels_calibration_and_chorus() {
    let factory = FakeFactory::uniform(Speech::Slow(Duration::from_secs(60)));
    let session = Arc::new(session(factory.clone()).with_selection(ChorusSelection::new(
        vec![profile("v.a", 0.5)],
        Tuning::NEUTRAL,
    )));

    let calibrating = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.calibrate(0, "phrase", 5.0).await })
    };
    let playing = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start_chorus("hello").await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.is_calibrating());
    assert!(session.is_playing());
    session.stop_all();

    let result = calibrating.await.unwrap().unwrap();
    assert_eq!(result.stop, CalibrationStop::Cancelled);
    assert!(playing.await.unwrap().cancelled);
    assert!(!session.is_playing());
    assert!(factory.engines().iter().all(|e| e.stop_count() >= 1));
}

#[tokio::test(start_paused = true)]
async fn one_token_stops_chorus_calibration_and_clips() {
    let factory = FakeFactory::uniform(Speech::Slow(Duration::from_secs(60)));
    let driver = Arc::new(FakeDriver::default());
    let token = CancellationToken::new();
    let player = ClipPlayer::new(driver.clone(), WaiterPolicy::DrainOnStop);
    player.prepare_clip("/sounds/chime.wav", 0.0).unwrap();
    let session = Arc::new(
        session(factory.clone())
            .with_selection(ChorusSelection::new(
                vec![profile("v.a", 0.5), profile("v.b", 0.5)],
                Tuning::NEUTRAL,
            ))
            .with_cancel_token(token.clone())
            .with_clip_player(player),
    );

    let calibrating = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.calibrate(0, "phrase", 5.0).await })
    };
    let playing = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start_chorus("hello").await })
    };
    let clip = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.clips().play_clip().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.is_calibrating());
    assert!(session.is_playing());
    assert_eq!(session.clips().pending_waiters(), 1);

    token.cancel();

    let result = calibrating.await.unwrap().unwrap();
    assert_eq!(result.stop, CalibrationStop::Cancelled);
    assert!(playing.await.unwrap().cancelled);
    assert!(matches!(
        clip.await.unwrap(),
        Err(VoiceError::Clip(ClipError::Stopped))
    ));
    assert_eq!(session.clips().pending_waiters(), 0);
    assert!(!session.is_playing());
    assert!(factory.engines().iter().all(|e| e.stop_count() >= 1));
    assert_eq!(driver.stops(), 1);
}

#[tokio::test]
async fn stop_all_fails_pending_clip_waiters() {
    let driver = Arc::new(FakeDriver::default());
    let player = ClipPlayer::new(driver.clone(), WaiterPolicy::DrainOnStop);
    player.prepare_clip("/sounds/chime.wav", 0.0).unwrap();
    let session = Arc::new(
        session(FakeFactory::uniform(Speech::Fixed(1.0))).with_clip_player(player),
    );

    let clip = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.clips().play_clip().await })
    };
    while session.clips().pending_waiters() == 0 {
        tokio::task::yield_now().await;
    }
    session.stop_all();

    assert!(matches!(
        clip.await.unwrap(),
        Err(VoiceError::Clip(ClipError::Stopped))
    ));
    assert_eq!(session.clips().pending_waiters(), 0);
}

#[test]
fn stop_all_while_idle_is_harmless() {
    let session = session(FakeFactory::uniform(Speech::Fixed(1.0)));
    session.stop_all();
    session.stop_all();
    assert!(!session.is_playing());
    assert!(!session.is_calibrating());
}

#[tokio::test(start_paused = true)]
async fn simulated_backend_converges() {
    let factory = Arc::new(SimulatedEngineFactory::new(SimulatedConfig::default()));
    let session = ChorusSession::new(factory, CalibrationSettings::default())
        .unwrap()
        .with_selection(ChorusSelection::new(
            vec![profile("v.sim", 0.5)],
            Tuning::NEUTRAL,
        ));

    // 50 chars at the nominal rate model 3 seconds.
    let phrase = "x".repeat(50);
    let result = session.calibrate(0, &phrase, 2.0).await.unwrap();

    assert!(result.converged(), "{result:?}");
    assert!(result.final_rate > 0.5);
}

#[test]
fn rejects_invalid_settings() {
    let settings = CalibrationSettings {
        tolerance: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        ChorusSession::new(FakeFactory::uniform(Speech::Fixed(1.0)), settings),
        Err(VoiceError::Settings(_))
    ));
}
