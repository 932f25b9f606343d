//! Per-user verification session.
//!
//! Holds the loaded settings, the last successful run and its buffered
//! report. A failed run leaves the previous result in place; `clear`
//! discards it without touching settings.

use std::path::{Path, PathBuf};

use genverify_config::Settings;

use crate::pipeline::{execute, InputFile, RunError, RunOutput, RunParams};

#[derive(Debug)]
pub struct Session {
    settings: Settings,
    settings_path: PathBuf,
    current: Option<RunOutput>,
}

impl Session {
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        Self {
            settings,
            settings_path,
            current: None,
        }
    }

    /// Start a session with settings loaded from `path` (defaults if absent).
    pub fn open(path: &Path) -> Self {
        Self::new(Settings::load_from(path), path.to_path_buf())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Edits stay in memory until [`Session::save_settings`].
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn save_settings(&self) -> Result<(), String> {
        self.settings.save_to(&self.settings_path)
    }

    /// Run with parameters derived from the session settings.
    pub fn run(&mut self, pim: &InputFile, sager: &InputFile) -> Result<&RunOutput, RunError> {
        let params = RunParams::from_settings(&self.settings);
        self.run_with(pim, sager, &params)
    }

    pub fn run_with(
        &mut self,
        pim: &InputFile,
        sager: &InputFile,
        params: &RunParams,
    ) -> Result<&RunOutput, RunError> {
        match execute(pim, sager, params) {
            Ok(output) => Ok(&*self.current.insert(output)),
            Err(err) => {
                log::warn!("run failed: {err}");
                Err(err)
            }
        }
    }

    pub fn current(&self) -> Option<&RunOutput> {
        self.current.as_ref()
    }

    /// Buffered report of the last successful run
    pub fn artifact(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|o| o.artifact.as_slice())
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            log::debug!("session result cleared");
        }
    }
}
