// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Error taxonomy shared by the navigator, parameter collector and transform runner.
//!
//! `Display` is the English form used in logs. User-visible text goes through
//! [`PilotError::user_message`] so it can be localised.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::messages::Messages;

#[derive(Debug, Error)]
pub enum PilotError {
    #[error("java runtime not available: {detail}")]
    JavaUnavailable { detail: String, install_hint: String },

    #[error("missing processor libraries in {jar_dir:?}: {}", .missing.join(", "))]
    LibrariesMissing { jar_dir: PathBuf, missing: Vec<String>, setup_hint: String },

    #[error("invalid directory: {0:?}")]
    InvalidDirectory(PathBuf),

    #[error("no directories or {kind} files found in {dir:?}")]
    NavigationEmpty { dir: PathBuf, kind: &'static str },

    #[error("selected file is missing: {0:?}")]
    MissingSelection(PathBuf),

    #[error("{path:?} is not well-formed XML: {source}")]
    InputInvalid {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("cannot parse parameter file {path:?}: {source}")]
    ParamFileInvalid {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("cannot write parameter file {path:?}: {message}")]
    ParamFileWrite { path: PathBuf, message: String },

    #[error("parameter file name is empty")]
    ParamFileNameEmpty,

    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("settings error at {path:?}: {message}")]
    Settings { path: PathBuf, message: String },

    #[error("cannot launch {program}: {source}")]
    Dispatch {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl PilotError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Missing interpreter or libraries: the user has to fix the installation.
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, Self::JavaUnavailable { .. } | Self::LibrariesMissing { .. })
    }

    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            Self::JavaUnavailable { detail, install_hint } => {
                messages.format("error.java_unavailable", &[detail, install_hint])
            }
            Self::LibrariesMissing { jar_dir, missing, setup_hint } => messages.format(
                "error.libraries_missing",
                &[&jar_dir.display(), &missing.join(", "), setup_hint],
            ),
            Self::InvalidDirectory(dir) => {
                messages.format("error.invalid_directory", &[&dir.display()])
            }
            Self::NavigationEmpty { dir, kind } => {
                messages.format("error.navigation_empty", &[&dir.display(), kind])
            }
            Self::MissingSelection(path) => {
                messages.format("error.missing_selection", &[&path.display()])
            }
            Self::InputInvalid { path, source } => {
                messages.format("error.input_invalid", &[&path.display(), source])
            }
            Self::ParamFileInvalid { path, source } => {
                messages.format("error.param_file_invalid", &[&path.display(), source])
            }
            Self::ParamFileWrite { path, message } => {
                messages.format("error.param_file_write", &[&path.display(), message])
            }
            Self::ParamFileNameEmpty => messages.text("error.param_file_name_empty"),
            Self::Io { path, source } => messages.format("error.io", &[&path.display(), source]),
            Self::Settings { path, message } => {
                messages.format("error.settings", &[&path.display(), message])
            }
            Self::Dispatch { program, source } => {
                messages.format("error.dispatch", &[program, source])
            }
        }
    }
}
