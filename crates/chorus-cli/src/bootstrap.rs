//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the voice runtime is wired together
//! for the CLI: the simulated backend becomes the engine factory, the
//! profiles document or inline voices become the chorus selection, and the
//! calibration settings are validated.
//!
//! Command handlers receive the composed [`CliContext`].

use std::path::PathBuf;
use std::sync::Arc;

use chorus_core::{
    CalibrationObserver, CalibrationSettings, ChorusSelection, ProfilesFile, StaticVoiceList, Tuning, VoiceInfo,
    VoiceProfile,
};
use chorus_voice::{ChorusSession, SimulatedConfig, SimulatedEngineFactory};

use crate::error::CliError;
use crate::parser::Cli;

/// Voices the simulated backend knows by name.
pub fn simulated_voices() -> StaticVoiceList {
    StaticVoiceList::new(vec![
        VoiceInfo::new("sim.soprano", "Soprano", "en-US"),
        VoiceInfo::new("sim.alto", "Alto", "en-US"),
        VoiceInfo::new("sim.tenor", "Tenor", "en-GB"),
        VoiceInfo::new("sim.bass", "Bass", "en-GB"),
    ])
}

/// Bootstrap configuration for the CLI.
#[derive(Clone, Default)]
pub struct CliConfig {
    /// Profiles document to read.
    pub profiles_path: Option<PathBuf>,
    /// Voices given inline, appended after the document's active voices.
    pub inline_voices: Vec<VoiceProfile>,
    /// Simulated backend configuration.
    pub simulated: SimulatedConfig,
    /// Calibration settings.
    pub calibration: CalibrationSettings,
    /// Receives calibration progress.
    pub observer: Option<Arc<dyn CalibrationObserver>>,
}

impl CliConfig {
    /// Build a config from parsed arguments, taking headless mode from the
    /// environment.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            profiles_path: cli.profiles.clone(),
            inline_voices: cli.voices.iter().map(|v| v.0.clone()).collect(),
            simulated: SimulatedConfig {
                time_scale: cli.time_scale,
                ..SimulatedConfig::from_env()
            },
            calibration: CalibrationSettings::default(),
            observer: None,
        }
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Session owning the selection, chorus and calibration.
    pub session: Arc<ChorusSession>,
    /// Display names for known voices.
    pub voices: StaticVoiceList,
}

/// Read and decode a profiles document.
pub fn load_profiles(path: &std::path::Path) -> Result<ProfilesFile, CliError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let file = ProfilesFile::from_json(&json)?;
    tracing::debug!(
        path = %path.display(),
        profiles = file.profiles_by_id.len(),
        active = file.active_voice_ids.len(),
        "Loaded profiles document"
    );
    Ok(file)
}

/// Compose the context.
///
/// Voices come from the profiles document's active list, then inline
/// `--voice` arguments. With neither, two simulated voices are used.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let mut baseline = Vec::new();
    let mut tuning = Tuning::NEUTRAL;

    if let Some(path) = &config.profiles_path {
        let file = load_profiles(path)?;
        tuning = file.tuning;
        baseline.extend(file.active_profiles());
    }
    baseline.extend(config.inline_voices.iter().cloned());

    if baseline.is_empty() {
        tracing::info!("No voices selected; using the default simulated pair");
        baseline = vec![
            VoiceProfile::with_defaults("sim.alto"),
            VoiceProfile::with_defaults("sim.tenor"),
        ];
    }

    let factory = Arc::new(SimulatedEngineFactory::new(config.simulated.clone()));
    let mut session = ChorusSession::new(factory, config.calibration)?
        .with_selection(ChorusSelection::new(baseline, tuning));
    if let Some(observer) = config.observer {
        session = session.with_observer(observer);
    }

    tracing::debug!(
        headless = config.simulated.headless,
        time_scale = config.simulated.time_scale,
        "CLI context ready"
    );

    Ok(CliContext {
        session: Arc::new(session),
        voices: simulated_voices(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_default_voices() {
        let ctx = bootstrap(CliConfig::default()).unwrap();
        let selection = ctx.session.selection();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.baseline()[0].id, "sim.alto");
    }

    #[test]
    fn missing_profiles_file_is_an_io_error() {
        let config = CliConfig {
            profiles_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        let err = bootstrap(config).err().unwrap();
        assert_eq!(err.exit_code(), 74);
    }
}
