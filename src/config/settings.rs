// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::PilotError;
use crate::fsutil::write_atomic;

pub const DEFAULT_PARAM_FILENAME: &str = "params.xml";
const SETTINGS_FILENAME: &str = "settings.json";
const LOG_FILENAME: &str = "xslt-pilot.log";
const APP_DIR: &str = "xslt-pilot";

/// Persisted key/value settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub last_param_filename: String,
    pub suppress_warnings: bool,
    pub debug: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_bin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jar_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_param_filename: DEFAULT_PARAM_FILENAME.to_owned(),
            suppress_warnings: true,
            debug: false,
            java_bin: None,
            jar_dir: None,
            locale: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform config dir>/xslt-pilot/settings.json` (`$XDG_CONFIG_HOME` or `~/.config` on Linux).
    pub fn default_location() -> Self {
        Self::new(config_dir().join(SETTINGS_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling log file used when no explicit `--log-file` is given.
    pub fn log_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(LOG_FILENAME),
            _ => PathBuf::from(LOG_FILENAME),
        }
    }

    /// Missing file means defaults; an unreadable or malformed file is an error.
    pub fn load(&self) -> Result<Settings, PilotError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no settings at {:?}, using defaults", self.path);
                return Ok(Settings::default());
            }
            Err(source) => return Err(PilotError::io(&self.path, source)),
        };
        serde_json::from_str(&raw)
            .map_err(|err| PilotError::Settings { path: self.path.clone(), message: err.to_string() })
    }

    pub fn save(&self, settings: &Settings) -> Result<(), PilotError> {
        let mut json = serde_json::to_string_pretty(settings).map_err(|err| {
            PilotError::Settings { path: self.path.clone(), message: err.to_string() }
        })?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes()).map_err(|source| PilotError::io(&self.path, source))
    }

    /// Loads, applies `update`, saves. Returns the updated settings.
    pub fn update(&self, update: impl FnOnce(&mut Settings)) -> Result<Settings, PilotError> {
        let mut settings = self.load()?;
        update(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

fn config_dir() -> PathBuf {
    app_config_dir(dirs::config_dir())
}

/// `<base>/xslt-pilot`, or a temp-dir fallback when the platform has no config directory.
pub(super) fn app_config_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(env::temp_dir).join(APP_DIR)
}
