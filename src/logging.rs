// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Log setup. The terminal is owned by the UI, so records go to a file.

use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::error::PilotError;

pub fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Appends to `log_file`. `RUST_LOG` wins over the `debug` switch.
pub fn init(log_file: &Path, debug: bool) -> Result<(), PilotError> {
    if let Some(parent) = log_file.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PilotError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|source| PilotError::io(log_file, source))?;

    let mut builder = Builder::new();
    builder.filter_level(default_level(debug));
    builder.parse_env(Env::default());
    builder.target(Target::Pipe(Box::new(file)));
    builder.format_timestamp_millis();
    // A second init (tests, re-entry) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}
